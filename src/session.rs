//! Session token (sid) handling.
//!
//! The sid returned at login is URL-safe base64 without padding. The
//! decoded bytes are not pure JSON: one envelope byte, then a JSON claims
//! object, then a trailing binary signature. [`decode_sid`] extracts and
//! parses the claims.

use base64::engine::general_purpose::URL_SAFE as BASE64_URL;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::AminoError;

/// An authenticated session: the bearer token plus its decoded claims.
#[derive(Debug, Clone)]
pub struct Session {
    pub sid: String,
    pub claims: SidClaims,
}

impl Session {
    /// Decode `sid` and build a session from it.
    pub fn from_sid(sid: impl Into<String>) -> Result<Self, AminoError> {
        let sid = sid.into();
        let claims = decode_sid(&sid)?;
        Ok(Self { sid, claims })
    }

    /// Value for the `NDCAUTH` header.
    pub(crate) fn auth_header(&self) -> String {
        format!("sid={}", self.sid)
    }
}

/// Claims embedded in a sid. Field names on the wire are bare digits;
/// anything not modeled here is kept in `extra` rather than rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct SidClaims {
    /// Account uid the session belongs to.
    #[serde(rename = "2")]
    pub uid: String,
    /// IP address the session was issued to.
    #[serde(rename = "4", default)]
    pub ip: Option<String>,
    /// Issue timestamp (seconds).
    #[serde(rename = "5", default)]
    pub created_time: Option<i64>,
    /// Numeric client-type tag (100 for the standard client).
    #[serde(rename = "6", default)]
    pub client_type: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Marks the end of the claims object in the observed token layout: the
/// last claim value ends in a digit `0` followed by the closing brace.
const CLAIMS_END: &[u8; 2] = b"0}";

/// Decode a sid into its claims.
///
/// Steps: re-pad to a multiple of 4, base64-decode (URL-safe alphabet),
/// drop the leading envelope byte, cut at the first `0}` marker after the
/// start, parse the cut as JSON. Any failure is [`AminoError::SidDecode`].
pub fn decode_sid(sid: &str) -> Result<SidClaims, AminoError> {
    let mut padded = sid.to_owned();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let raw = BASE64_URL
        .decode(&padded)
        .map_err(|e| AminoError::SidDecode(format!("base64: {e}")))?;

    // Skip the envelope byte, then search the remaining bytes for the
    // end-of-claims marker. The trailing signature is binary, so this works
    // on bytes rather than on a decoded string.
    let body = raw
        .get(1..)
        .ok_or_else(|| AminoError::SidDecode("token too short".into()))?;
    let end = body
        .windows(CLAIMS_END.len())
        .position(|w| w == CLAIMS_END)
        .ok_or_else(|| AminoError::SidDecode("claims end marker not found".into()))?;

    let claims_json = &body[..end + CLAIMS_END.len()];
    serde_json::from_slice(claims_json).map_err(|e| AminoError::SidDecode(format!("json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    fn make_sid(json: &str) -> String {
        let mut raw = vec![0x02];
        raw.extend_from_slice(json.as_bytes());
        raw.extend_from_slice(&[0u8; 20]); // trailing signature, opaque
        URL_SAFE_NO_PAD.encode(raw)
    }

    #[test]
    fn decodes_claims() {
        let sid = make_sid(
            r#"{"0":2,"1":null,"2":"user-1234","3":null,"4":"127.0.0.1","5":1693212000,"6":100}"#,
        );
        let claims = decode_sid(&sid).unwrap();
        assert_eq!(claims.uid, "user-1234");
        assert_eq!(claims.ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(claims.created_time, Some(1693212000));
        assert_eq!(claims.client_type, Some(100));
        // Unmodeled claims pass through.
        assert_eq!(claims.extra.get("0"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(
            decode_sid("!!not-base64!!"),
            Err(AminoError::SidDecode(_))
        ));
    }

    #[test]
    fn rejects_missing_marker() {
        // Claims whose last value does not end in `0` never match.
        let sid = make_sid(r#"{"2":"u","6":7}"#);
        assert!(matches!(decode_sid(&sid), Err(AminoError::SidDecode(_))));
    }

    #[test]
    fn rejects_invalid_json() {
        let sid = make_sid(r#"{"2":"u","6":10}"#.trim_start_matches('{'));
        assert!(matches!(decode_sid(&sid), Err(AminoError::SidDecode(_))));
    }

    #[test]
    fn rejects_empty_token() {
        assert!(matches!(decode_sid(""), Err(AminoError::SidDecode(_))));
    }
}
