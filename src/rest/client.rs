use crate::auth;
use crate::env::{endpoint_base, NDC_GLOBAL, USER_AGENT};
use crate::error::AminoError;
use crate::rest::types::*;
use crate::session::Session;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT as UA};
use reqwest::{Client, Method, Proxy, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub(crate) const HEADER_DEVICE_ID: HeaderName = HeaderName::from_static("ndcdeviceid");
pub(crate) const HEADER_AUTH: HeaderName = HeaderName::from_static("ndcauth");
pub(crate) const HEADER_MSG_SIG: HeaderName = HeaderName::from_static("ndc-msg-sig");

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json";

/// Client type tag sent at login (standard mobile client).
const CLIENT_TYPE: i64 = 100;

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Parameters for one REST call.
///
/// `ndc_id` selects the host/path per [`endpoint_base`]. When
/// `ensure_success` is set, any non-200 response (other than 403, which
/// always wins) is turned into [`AminoError::Api`] labeled with
/// `failure_label`.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub method: Method,
    pub ndc_id: i64,
    pub content_type: Option<&'static str>,
    pub body: Option<Vec<u8>>,
    pub ensure_success: bool,
    pub failure_label: &'static str,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            ndc_id: NDC_GLOBAL,
            content_type: None,
            body: None,
            ensure_success: false,
            failure_label: "request failed",
        }
    }
}

/// Raw outcome of a REST call that passed classification.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Deserialize the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AminoError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Classification order is fixed: 403 always raises `TemporaryBan`, before
/// and regardless of strict enforcement; only then does the strict non-200
/// check run, pulling the optional `api:message` out of the envelope.
fn classify_response(
    status: StatusCode,
    body: String,
    ensure_success: bool,
    failure_label: &'static str,
) -> Result<ApiResponse, AminoError> {
    if status == StatusCode::FORBIDDEN {
        return Err(AminoError::TemporaryBan { raw_body: body });
    }

    if ensure_success && status != StatusCode::OK {
        let message = serde_json::from_str::<ApiEnvelope>(&body)
            .ok()
            .and_then(|env| env.message);
        return Err(AminoError::Api {
            label: failure_label,
            status,
            message,
            raw_body: body,
        });
    }

    Ok(ApiResponse { status, body })
}

/// Builder for [`AminoRestClient`] with transport customization.
#[derive(Debug, Clone, Default)]
pub struct AminoRestClientBuilder {
    device_id: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    proxy: Option<Proxy>,
    http_client: Option<Client>,
}

impl AminoRestClientBuilder {
    /// Use a fixed device id instead of generating a fresh one.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<AminoRestClient, AminoError> {
        let http = if let Some(client) = self.http_client {
            client
        } else {
            let mut builder = Client::builder();
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(proxy) = self.proxy {
                builder = builder.proxy(proxy);
            }
            builder.build()?
        };

        Ok(AminoRestClient {
            http,
            device_id: Arc::new(self.device_id.unwrap_or_else(auth::generate_device_id)),
            user_agent: Arc::new(self.user_agent.unwrap_or_else(|| USER_AGENT.to_owned())),
            session: Arc::new(RwLock::new(None)),
        })
    }
}

/// Async HTTP client for the REST API.
///
/// The device identity is fixed at construction; the session is installed
/// by [`login_with_email`](Self::login_with_email) or
/// [`login_with_sid`](Self::login_with_sid) and from then on attached to
/// every call. Clones share the same session.
///
/// Every endpoint takes the target NDC id explicitly; there is no ambient
/// "current community" state to race on.
#[derive(Debug, Clone)]
pub struct AminoRestClient {
    http: Client,
    device_id: Arc<String>,
    user_agent: Arc<String>,
    session: Arc<RwLock<Option<Session>>>,
}

impl AminoRestClient {
    /// Start a configurable client builder.
    pub fn builder() -> AminoRestClientBuilder {
        AminoRestClientBuilder::default()
    }

    /// Create a client with a freshly generated device id and default
    /// transport settings.
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("default rest client builder should not fail")
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Snapshot of the current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        self.session.read().expect("session lock").clone()
    }

    fn install_session(&self, session: Session) {
        *self.session.write().expect("session lock") = Some(session);
    }

    /// Make one authenticated REST call.
    ///
    /// Builds headers (device id and user agent always, `NDCAUTH` when a
    /// session exists, `Content-Type` and `NDC-MSG-SIG` when a body is
    /// supplied), resolves the host from `opts.ndc_id`, dispatches, and
    /// classifies the response. See [`CallOptions`].
    pub async fn call(&self, path: &str, opts: CallOptions) -> Result<ApiResponse, AminoError> {
        let url = format!("{}{}", endpoint_base(opts.ndc_id), path);

        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_DEVICE_ID,
            HeaderValue::from_str(&self.device_id)
                .map_err(|e| AminoError::Header(e.to_string()))?,
        );
        headers.insert(
            UA,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| AminoError::Header(e.to_string()))?,
        );
        if let Some(session) = self.session() {
            headers.insert(
                HEADER_AUTH,
                HeaderValue::from_str(&session.auth_header())
                    .map_err(|e| AminoError::Header(e.to_string()))?,
            );
        }
        if let Some(content_type) = opts.content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if let Some(body) = &opts.body {
            // The signature covers the exact bytes that go on the wire.
            headers.insert(
                HEADER_MSG_SIG,
                HeaderValue::from_str(&auth::sign(body))
                    .map_err(|e| AminoError::Header(e.to_string()))?,
            );
        }

        let mut req = self.http.request(opts.method.clone(), &url).headers(headers);
        if let Some(body) = opts.body {
            req = req.body(body);
        }

        tracing::debug!(method = %opts.method, %url, ndc_id = opts.ndc_id, "rest call");

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        tracing::debug!(%status, "rest response");

        classify_response(status, body, opts.ensure_success, opts.failure_label)
    }

    // -----------------------------------------------
    // Auth
    // -----------------------------------------------

    /// Login with email and password. On success the returned sid is
    /// decoded and installed as the active session.
    pub async fn login_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AminoError> {
        let body = LoginRequest {
            email: email.to_owned(),
            secret: format!("0 {password}"),
            client_type: CLIENT_TYPE,
            device_id: self.device_id.as_ref().clone(),
            action: "normal".to_owned(),
            timestamp: now_ms(),
        };

        let resp = self
            .call(
                "/auth/login",
                CallOptions {
                    method: Method::POST,
                    ndc_id: NDC_GLOBAL,
                    content_type: Some(CONTENT_TYPE_JSON),
                    body: Some(serde_json::to_vec(&body)?),
                    ensure_success: true,
                    failure_label: "email login error",
                },
            )
            .await?;

        let login: LoginResponse = resp.json()?;
        self.install_session(Session::from_sid(login.sid.clone())?);
        tracing::debug!(uid = ?login.user_profile.as_ref().map(|p| &p.uid), "logged in (email)");
        Ok(login)
    }

    /// Install an existing sid as the active session, decoding its claims.
    pub fn login_with_sid(&self, sid: impl Into<String>) -> Result<Session, AminoError> {
        let session = Session::from_sid(sid)?;
        tracing::debug!(uid = %session.claims.uid, "logged in (sid)");
        self.install_session(session.clone());
        Ok(session)
    }

    // -----------------------------------------------
    // Chat
    // -----------------------------------------------

    /// Send a chat message into a thread in the given community.
    pub async fn send_message(
        &self,
        ndc_id: i64,
        params: MessageParams,
    ) -> Result<ChatMessage, AminoError> {
        let body = MessageRequest {
            message_type: params.message_type,
            timestamp: now_ms(),
            reply_message_id: params.reply_to,
            content: params.text,
            extensions: if params.mentions.is_empty() {
                None
            } else {
                Some(MessageRequestExtensions {
                    mentioned_array: params.mentions,
                })
            },
        };

        let resp = self
            .call(
                &format!("/chat/thread/{}/message", params.thread_id),
                CallOptions {
                    method: Method::POST,
                    ndc_id,
                    content_type: Some(CONTENT_TYPE_JSON),
                    body: Some(serde_json::to_vec(&body)?),
                    ensure_success: true,
                    failure_label: "send message error",
                },
            )
            .await?;

        Ok(resp.json::<ChatMessageResponse>()?.message)
    }

    /// Get chat thread information.
    pub async fn get_thread_info(
        &self,
        ndc_id: i64,
        thread_id: &str,
    ) -> Result<ThreadResponse, AminoError> {
        let resp = self
            .call(
                &format!("/chat/thread/{thread_id}"),
                CallOptions {
                    ndc_id,
                    ensure_success: true,
                    failure_label: "get chat thread info error",
                    ..Default::default()
                },
            )
            .await?;
        resp.json()
    }

    /// List chat threads the account has joined.
    pub async fn get_threads(
        &self,
        ndc_id: i64,
        start: u32,
        size: u32,
    ) -> Result<ThreadListResponse, AminoError> {
        let resp = self
            .call(
                &format!("/chat/thread?type=joined-me&start={start}&size={size}"),
                CallOptions {
                    ndc_id,
                    ensure_success: true,
                    failure_label: "get chat threads info error",
                    ..Default::default()
                },
            )
            .await?;
        resp.json()
    }

    // -----------------------------------------------
    // Profiles & communities
    // -----------------------------------------------

    /// Get community information. Community lookups go through the global
    /// host with a negated NDC id.
    pub async fn get_community_info(&self, ndc_id: i64) -> Result<CommunityResponse, AminoError> {
        let resp = self
            .call(
                "/community/info?withInfluencerList=1&withTopicList=true&influencerListOrderStrategy=fansCount",
                CallOptions {
                    ndc_id: -ndc_id.abs(),
                    ensure_success: true,
                    failure_label: "get community info error",
                    ..Default::default()
                },
            )
            .await?;
        resp.json()
    }

    /// Get the logged-in account's information.
    pub async fn get_account_info(&self, ndc_id: i64) -> Result<AccountResponse, AminoError> {
        let resp = self
            .call(
                "/account",
                CallOptions {
                    ndc_id,
                    ensure_success: true,
                    failure_label: "get account info error",
                    ..Default::default()
                },
            )
            .await?;
        resp.json()
    }

    /// Get a user profile.
    pub async fn get_user_profile(
        &self,
        ndc_id: i64,
        uid: &str,
    ) -> Result<UserProfileResponse, AminoError> {
        let resp = self
            .call(
                &format!("/user-profile/{uid}"),
                CallOptions {
                    ndc_id,
                    ensure_success: true,
                    failure_label: "get profile error",
                    ..Default::default()
                },
            )
            .await?;
        resp.json()
    }
}

impl Default for AminoRestClient {
    fn default() -> Self {
        Self::new()
    }
}
