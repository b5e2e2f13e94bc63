//! Response and request shapes for the REST surface.
//!
//! Only the fields the client exercises are modeled; everything else in a
//! payload is ignored on deserialize. Most fields are optional because the
//! API omits them freely depending on context.

use serde::{Deserialize, Serialize};

/// Numeric status carried by every response envelope; `0` is success.
pub const STATUS_SUCCESS: i64 = 0;

/// The outer envelope every API response carries.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "api:statuscode")]
    pub status_code: i64,
    #[serde(rename = "api:message", default)]
    pub message: Option<String>,
    #[serde(rename = "api:duration", default)]
    pub duration: Option<String>,
    #[serde(rename = "api:timestamp", default)]
    pub timestamp: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    /// `"0 "` followed by the password.
    pub secret: String,
    #[serde(rename = "clientType")]
    pub client_type: i64,
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub action: String,
    /// Milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub sid: String,
    #[serde(default)]
    pub auid: Option<String>,
    #[serde(default)]
    pub account: Option<Account>,
    #[serde(rename = "userProfile", default)]
    pub user_profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub uid: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "aminoId", default)]
    pub amino_id: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub role: Option<i64>,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub reputation: Option<i64>,
    #[serde(default)]
    pub role: Option<i64>,
    #[serde(rename = "ndcId", default)]
    pub ndc_id: Option<i64>,
    #[serde(rename = "membersCount", default)]
    pub members_count: Option<i64>,
    #[serde(rename = "aminoId", default)]
    pub amino_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfileResponse {
    #[serde(rename = "userProfile")]
    pub user_profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub account: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Community {
    #[serde(rename = "ndcId", default)]
    pub ndc_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(rename = "membersCount", default)]
    pub members_count: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityResponse {
    pub community: Community,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "membersCount", default)]
    pub members_count: Option<i64>,
    #[serde(default, rename = "type")]
    pub thread_type: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadResponse {
    pub thread: Thread,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadListResponse {
    #[serde(rename = "threadList", default)]
    pub thread_list: Vec<Thread>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "type", default)]
    pub message_type: i64,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageResponse {
    pub message: ChatMessage,
}

/// A user mentioned in an outgoing message.
#[derive(Debug, Clone, Serialize)]
pub struct Mention {
    pub uid: String,
}

/// Parameters for [`send_message`](crate::rest::AminoRestClient::send_message).
#[derive(Debug, Clone, Default)]
pub struct MessageParams {
    pub thread_id: String,
    pub text: Option<String>,
    /// Message id this message replies to.
    pub reply_to: Option<String>,
    pub mentions: Vec<Mention>,
    /// Message type; `0` is a plain text message.
    pub message_type: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessageRequest {
    #[serde(rename = "type")]
    pub message_type: i64,
    pub timestamp: i64,
    #[serde(rename = "replyMessageId", skip_serializing_if = "Option::is_none")]
    pub reply_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<MessageRequestExtensions>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessageRequestExtensions {
    #[serde(rename = "mentionedArray")]
    pub mentioned_array: Vec<Mention>,
}
