//! Fixed service endpoints and NDC-id routing.
//!
//! The API exposes one global host and per-community ("NDC") hosts. Which
//! base a request uses is fully determined by the sign and magnitude of the
//! NDC id, see [`endpoint_base`].

/// Global API base (NDC id 0 and negative ids).
pub const API_GLOBAL: &str = "https://service.narvii.com/api/v1/g";

/// Community API base prefix; the NDC id is appended (`.../x123`).
pub const API_NDC: &str = "https://service.narvii.com/api/v1/x";

/// Realtime WebSocket host.
pub const WS_URL: &str = "wss://ws3.narvii.com";

/// NDC id of the global scope.
pub const NDC_GLOBAL: i64 = 0;

/// Default User-Agent, matching the official Android client.
pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; SM-G980F Build/QP1A.190711.020; wv) \
     AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/78.0.3904.96 Mobile Safari/537.36";

/// Resolve the base URL for an NDC id.
///
/// - `0` targets the global scope: `API_GLOBAL + "/s"`
/// - positive ids target a community: `API_NDC + id + "/s"`
/// - negative ids target the global host with the `s-x{abs}` service
///   selector (used e.g. by community-info lookups)
pub fn endpoint_base(ndc_id: i64) -> String {
    if ndc_id == NDC_GLOBAL {
        format!("{API_GLOBAL}/s")
    } else if ndc_id > NDC_GLOBAL {
        format!("{API_NDC}{ndc_id}/s")
    } else {
        format!("{API_GLOBAL}/s-x{}", ndc_id.unsigned_abs())
    }
}
