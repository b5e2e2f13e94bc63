use amino_fast::{decode_sid, AminoError, Session};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

fn encode_sid(claims_json: &str) -> String {
    // Observed layout: one envelope byte, the JSON claims, then a trailing
    // 20-byte binary signature. URL-safe base64, no padding.
    let mut raw = vec![0x02];
    raw.extend_from_slice(claims_json.as_bytes());
    raw.extend_from_slice(&[0xAB; 20]);
    URL_SAFE_NO_PAD.encode(raw)
}

#[test]
fn decodes_full_claims() {
    let sid = encode_sid(
        r#"{"0":2,"1":null,"2":"0000-1111-2222","3":null,"4":"203.0.113.9","5":1693212000,"6":100}"#,
    );
    let claims = decode_sid(&sid).unwrap();
    assert_eq!(claims.uid, "0000-1111-2222");
    assert_eq!(claims.ip.as_deref(), Some("203.0.113.9"));
    assert_eq!(claims.created_time, Some(1693212000));
    assert_eq!(claims.client_type, Some(100));
}

#[test]
fn unknown_claims_are_preserved() {
    let sid = encode_sid(r#"{"2":"uid-x","9":"future","6":100}"#);
    let claims = decode_sid(&sid).unwrap();
    assert_eq!(claims.uid, "uid-x");
    assert_eq!(claims.extra.get("9"), Some(&serde_json::json!("future")));
}

#[test]
fn round_trips_various_tokens() {
    for (uid, client_type) in [("a", 100), ("user-42", 200), ("x-y-z", 0)] {
        let sid = encode_sid(&format!(r#"{{"2":"{uid}","6":{client_type}}}"#));
        let claims = decode_sid(&sid).unwrap();
        assert_eq!(claims.uid, uid);
        assert_eq!(claims.client_type, Some(client_type));
    }
}

#[test]
fn session_from_sid_keeps_token() {
    let sid = encode_sid(r#"{"2":"uid-1","6":100}"#);
    let session = Session::from_sid(sid.clone()).unwrap();
    assert_eq!(session.sid, sid);
    assert_eq!(session.claims.uid, "uid-1");
}

#[test]
fn malformed_tokens_fail_with_decode_error() {
    let cases = [
        "!!!not base64!!!".to_owned(),
        // Valid base64, no end marker in the claims.
        encode_sid(r#"{"2":"u","6":7}"#),
        // Marker present, JSON invalid.
        encode_sid(r#""2":"u","6":100}"#),
        String::new(),
    ];
    for sid in cases {
        assert!(
            matches!(decode_sid(&sid), Err(AminoError::SidDecode(_))),
            "expected SidDecode for {sid:?}"
        );
    }
}
