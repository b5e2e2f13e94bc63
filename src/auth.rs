//! Device identity and request signing.
//!
//! Every request carries a device id in the `NDCDEVICEID` header, and every
//! request body is authenticated with an HMAC-SHA1 signature in the
//! `NDC-MSG-SIG` header. Both use fixed keys extracted from the official
//! client; neither depends on the session.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

type HmacSha1 = Hmac<Sha1>;

/// Prefix byte carried by device ids and signatures.
const PREFIX: u8 = 0x42;

/// Key for the device-id MAC.
const DEVICE_KEY: [u8; 20] = [
    0x02, 0xB2, 0x58, 0xC6, 0x35, 0x59, 0xD8, 0x80, 0x43, 0x21, 0xC5, 0xD5, 0x06, 0x5A, 0xF3,
    0x20, 0x35, 0x8D, 0x36, 0x6F,
];

/// Key for request-body signatures.
const SIG_KEY: [u8; 20] = [
    0xF8, 0xE7, 0xA6, 0x1A, 0xC3, 0xF7, 0x25, 0x94, 0x1E, 0x3A, 0xC7, 0xCA, 0xE2, 0xD6, 0x88,
    0xBE, 0x97, 0xF3, 0x0B, 0x93,
];

fn hmac_sha1(key: &[u8], data: &[u8]) -> [u8; 20] {
    let mut mac = HmacSha1::new_from_slice(key).expect("hmac accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Generate a device id from a fixed 20-byte seed.
///
/// Deterministic: the same seed always yields the same id. The result is
/// the uppercase hex encoding of `0x42 ∥ seed ∥ HMAC-SHA1(DEVICE_KEY,
/// 0x42 ∥ seed)` (41 bytes, 82 hex characters).
pub fn device_id_from_seed(seed: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(PREFIX);
    payload.extend_from_slice(seed);
    let mac = hmac_sha1(&DEVICE_KEY, &payload);

    let mut id = hex::encode_upper(&payload);
    id.push_str(&hex::encode_upper(mac));
    id
}

/// Generate a fresh device id from 20 cryptographically random bytes.
pub fn generate_device_id() -> String {
    let mut seed = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut seed);
    device_id_from_seed(&seed)
}

/// Sign a request or handshake body.
///
/// Returns `base64(0x42 ∥ HMAC-SHA1(SIG_KEY, body))`. The body must be the
/// exact bytes that go on the wire; JSON and binary bodies are signed the
/// same way.
pub fn sign(body: &[u8]) -> String {
    let mac = hmac_sha1(&SIG_KEY, body);
    let mut signed = Vec::with_capacity(21);
    signed.push(PREFIX);
    signed.extend_from_slice(&mac);
    BASE64.encode(signed)
}
