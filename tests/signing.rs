use amino_fast::auth::{device_id_from_seed, generate_device_id, sign};

#[test]
fn device_id_fixture() {
    let seed: [u8; 20] = core::array::from_fn(|i| i as u8);
    let expected =
        "42000102030405060708090A0B0C0D0E0F10111213065704341F5E54A4A8EF4FFE1FC8940A7C003BA0";
    assert_eq!(device_id_from_seed(&seed), expected);
    // Repeated calls are identical.
    assert_eq!(device_id_from_seed(&seed), expected);
}

#[test]
fn device_id_random_has_prefix_and_length() {
    let id = generate_device_id();
    // 1 prefix byte + 20 seed bytes + 20 MAC bytes = 41 bytes = 82 hex chars,
    // same length as the deterministic fixture above.
    assert_eq!(id.len(), 82);
    assert!(id.starts_with("42"));
    assert_eq!(id, id.to_uppercase());
}

#[test]
fn signature_is_deterministic() {
    let body = br#"{"email":"a@b.c","timestamp":1700000000000}"#;
    assert_eq!(sign(body), sign(body));
}

#[test]
fn signature_fixture() {
    assert_eq!(sign(b"hello amino"), "QkUyT6D1iIUFmW1f3h2sUBv6J50D");
}

#[test]
fn signature_differs_per_body() {
    // Any byte-level change must change the output.
    let a = sign(b"{\"content\":\"hi\"}");
    let b = sign(b"{\"content\":\"hi \"}");
    assert_ne!(a, b);

    let text = sign("ping".as_bytes());
    let binary = sign(&[0x70, 0x69, 0x6E, 0x67, 0x00]);
    assert_ne!(text, binary);
}

#[test]
fn signature_shape() {
    // 0x42 prefix + 20 MAC bytes = 21 bytes = 28 base64 chars.
    let sig = sign(b"anything");
    assert_eq!(sig.len(), 28);
    assert!(sig.starts_with('Q')); // leading 0x42
}
