//! Attestation token verification (HS256 compact JWS).
//!
//! Pure given `(token, secret, now)`: the clock is an argument so expiry is
//! checked against the caller's notion of "now", not jsonwebtoken's.

use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::error::AuthError;
use super::secret::Secret;
use super::types::AttestationClaims;

pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 8192;

/// HS256 verifier bound to a single shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    max_token_length: usize,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .field("max_token_length", &self.max_token_length)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: &Secret, max_token_length: usize) -> Self {
        // Only HS256 is accepted; `decode` rejects any other header alg.
        let mut validation = Validation::new(Algorithm::HS256);
        // exp/nbf are checked in `verify` against the supplied clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            decoding_key: secret.decoding_key(),
            validation,
            max_token_length,
        }
    }

    /// Verify signature, algorithm and time claims; return the token claims.
    pub fn verify(&self, token: &str, now: u64) -> Result<AttestationClaims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        // Bound the work done on attacker supplied input before decoding.
        if token.len() > self.max_token_length {
            return Err(AuthError::TokenTooLong {
                len: token.len(),
                max: self.max_token_length,
            });
        }

        if !is_compact_jws(token) {
            return Err(AuthError::invalid("expected header.payload.signature"));
        }

        // `alg: none` does not even parse as a jsonwebtoken `Algorithm`.
        let header = jsonwebtoken::decode_header(token)?;
        if header.alg != Algorithm::HS256 {
            return Err(AuthError::invalid(format!(
                "unsupported alg: {:?}",
                header.alg
            )));
        }

        let data =
            jsonwebtoken::decode::<AttestationClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if now >= claims.exp {
            return Err(AuthError::ExpiredToken {
                exp: claims.exp,
                now,
            });
        }

        if let Some(nbf) = claims.nbf {
            if now < nbf {
                return Err(AuthError::NotYetValid { nbf, now });
            }
        }

        Ok(claims)
    }
}

fn is_compact_jws(token: &str) -> bool {
    let mut parts = 0;
    for part in token.split('.') {
        if part.is_empty() {
            return false;
        }
        parts += 1;
    }
    parts == 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::attestation::testing::{
        NOW, TEST_SECRET, sign, sign_with_alg, test_secret, unsigned,
    };
    use serde_json::json;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&test_secret(), DEFAULT_MAX_TOKEN_LENGTH)
    }

    #[test]
    fn accepts_valid_token() {
        let token = sign(&json!({"exp": NOW + 60, "did": "device-1"}), TEST_SECRET);

        let claims = verifier().verify(&token, NOW).unwrap();

        assert_eq!(claims.exp, NOW + 60);
        assert_eq!(claims.binding, None);
        assert_eq!(claims.extra.get("did"), Some(&json!("device-1")));
    }

    #[test]
    fn keeps_binding_claim() {
        let token = sign(&json!({"exp": NOW + 60, "pay": "abc="}), TEST_SECRET);

        let claims = verifier().verify(&token, NOW).unwrap();

        assert_eq!(claims.binding_value(), Some("abc="));
        assert!(claims.has_binding());
    }

    #[test]
    fn rejects_tokens_signed_with_other_keys() {
        for key in [
            &b"wrong"[..],
            &b"attestation-test-secreT"[..],
            &b"a much longer but still wrong key"[..],
        ] {
            let token = sign(&json!({"exp": NOW + 60}), key);
            let err = verifier().verify(&token, NOW).unwrap_err();
            assert!(
                matches!(err, AuthError::InvalidSignatureOrFormat(_)),
                "key {:?} gave {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn rejects_other_algorithms() {
        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = sign_with_alg(&json!({"exp": NOW + 60}), TEST_SECRET, alg);
            let err = verifier().verify(&token, NOW).unwrap_err();
            assert!(matches!(err, AuthError::InvalidSignatureOrFormat(_)));
        }
    }

    #[test]
    fn rejects_alg_none() {
        // With and without a trailing empty signature segment.
        let token = unsigned(&json!({"exp": NOW + 60}));
        assert!(verifier().verify(&token, NOW).is_err());

        let token = format!("{}fake", token);
        let err = verifier().verify(&token, NOW).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignatureOrFormat(_)));
    }

    #[test]
    fn rejects_expired_token_even_when_signature_is_valid() {
        for exp in [NOW - 3600, NOW - 1, NOW] {
            let token = sign(&json!({"exp": exp}), TEST_SECRET);
            let err = verifier().verify(&token, NOW).unwrap_err();
            assert!(matches!(err, AuthError::ExpiredToken { .. }), "exp {}", exp);
        }
    }

    #[test]
    fn evaluates_expiry_against_supplied_clock() {
        let token = sign(&json!({"exp": NOW + 10}), TEST_SECRET);

        assert!(verifier().verify(&token, NOW + 9).is_ok());
        assert!(verifier().verify(&token, NOW + 10).is_err());
    }

    #[test]
    fn rejects_not_yet_valid_token() {
        let token = sign(&json!({"exp": NOW + 60, "nbf": NOW + 30}), TEST_SECRET);

        let err = verifier().verify(&token, NOW).unwrap_err();

        assert!(matches!(err, AuthError::NotYetValid { .. }));
        assert!(verifier().verify(&token, NOW + 30).is_ok());
    }

    #[test]
    fn rejects_token_without_exp() {
        let token = sign(&json!({"did": "device-1"}), TEST_SECRET);

        let err = verifier().verify(&token, NOW).unwrap_err();

        assert!(matches!(err, AuthError::InvalidSignatureOrFormat(_)));
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["abc", "a.b", "a.b.c.d", "..", "a..c", "not-a-jwt.at.all"] {
            let err = verifier().verify(token, NOW).unwrap_err();
            assert!(
                matches!(err, AuthError::InvalidSignatureOrFormat(_)),
                "token {:?} gave {:?}",
                token,
                err
            );
        }
    }

    #[test]
    fn rejects_empty_token_as_missing() {
        assert!(matches!(
            verifier().verify("", NOW),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn rejects_oversized_token_before_decoding() {
        let verifier = TokenVerifier::new(&test_secret(), 32);
        let token = sign(&json!({"exp": NOW + 60}), TEST_SECRET);
        assert!(token.len() > 32);

        let err = verifier.verify(&token, NOW).unwrap_err();

        assert!(matches!(err, AuthError::TokenTooLong { max: 32, .. }));
    }

    #[test]
    fn accepts_fractional_expiry() {
        let token = sign(&json!({"exp": NOW as f64 + 0.5}), TEST_SECRET);

        assert!(verifier().verify(&token, NOW).is_ok());
        assert!(matches!(
            verifier().verify(&token, NOW + 1),
            Err(AuthError::ExpiredToken { .. })
        ));
    }
}
