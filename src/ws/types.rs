//! Inbound realtime frame shapes.

use serde::Deserialize;

use crate::rest::types::ChatMessage;

/// Frame category tag for chat messages.
pub const FRAME_CHAT: i64 = 1000;

/// Chat message type for plain text ("default") messages.
pub const CHAT_MESSAGE_DEFAULT: i64 = 0;

/// One decoded realtime frame: a numeric category tag `t` plus a
/// category-specific payload `o`. Only the chat category is modeled
/// further; everything else stays raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub t: i64,
    #[serde(default)]
    pub o: serde_json::Value,
}

impl InboundFrame {
    /// Whether this frame carries a chat payload.
    pub fn is_chat(&self) -> bool {
        self.t == FRAME_CHAT
    }

    /// Parse the payload as a chat envelope.
    pub fn parse_chat(&self) -> Result<ChatEnvelope, serde_json::Error> {
        serde_json::from_value(self.o.clone())
    }
}

/// Payload of a chat-category frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEnvelope {
    #[serde(rename = "ndcId", default)]
    pub ndc_id: i64,
    #[serde(rename = "chatMessage")]
    pub chat_message: ChatMessage,
    #[serde(rename = "alertOption", default)]
    pub alert_option: Option<i64>,
    #[serde(rename = "membershipStatus", default)]
    pub membership_status: Option<i64>,
}
