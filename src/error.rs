use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for REST and realtime operations.
#[derive(Debug, Error)]
pub enum AminoError {
    /// An operation that needs an active session was attempted before login.
    #[error("authentication required: {0}")]
    AuthRequired(&'static str),

    /// HTTP 403 from the API. The service rate-bans by IP; callers must
    /// back off before retrying. Carries the raw response body.
    #[error("temporary IP ban, retry later")]
    TemporaryBan { raw_body: String },

    /// Non-success API envelope under strict enforcement.
    #[error("{label}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        label: &'static str,
        status: StatusCode,
        message: Option<String>,
        raw_body: String,
    },

    /// Malformed session token (sid).
    #[error("sid decode failed: {0}")]
    SidDecode(String),

    /// WebSocket transport failure.
    #[error("websocket error: {0}")]
    Ws(String),

    /// A header value could not be constructed.
    #[error("invalid header value: {0}")]
    Header(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
