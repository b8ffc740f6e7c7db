//! Token minting helpers shared by unit tests.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};

use super::secret::Secret;

pub const TEST_SECRET: &[u8] = b"attestation-test-secret";
pub const NOW: u64 = 1_700_000_000;

pub fn test_secret() -> Secret {
    Secret::from_bytes(TEST_SECRET.to_vec()).unwrap()
}

pub fn sign(claims: &serde_json::Value, key: &[u8]) -> String {
    sign_with_alg(claims, key, Algorithm::HS256)
}

pub fn sign_with_alg(claims: &serde_json::Value, key: &[u8], alg: Algorithm) -> String {
    jsonwebtoken::encode(&Header::new(alg), claims, &EncodingKey::from_secret(key)).unwrap()
}

/// `alg: none` token with an empty signature segment.
pub fn unsigned(claims: &serde_json::Value) -> String {
    let header = serde_json::json!({"typ": "JWT", "alg": "none"});
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Current wall clock, for tests that go through the HTTP gate.
pub fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
