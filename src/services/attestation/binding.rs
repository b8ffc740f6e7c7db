//! Token binding check.
//!
//! The mobile app hashes a chosen request header (usually `Authorization`)
//! into the `pay` claim when the token is issued. Here we recompute that
//! digest from the incoming header and compare.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::error::AuthError;
use super::types::{AttestationClaims, AuthDecision};

/// base64(SHA-256(attribute)), standard alphabet with padding.
pub fn binding_digest(attribute: impl AsRef<[u8]>) -> String {
    STANDARD.encode(Sha256::digest(attribute.as_ref()))
}

/// Check the bound attribute against the token's binding claim.
///
/// - no `pay` key: failover pass-through, the attribute is not looked at
/// - `pay` present, attribute absent or empty: `MissingBindingHeader`
/// - `pay` present but not a string, or digest differs: `BindingMismatch`
pub fn validate(
    claims: &AttestationClaims,
    bound_attribute: Option<&[u8]>,
) -> Result<AuthDecision, AuthError> {
    if !claims.has_binding() {
        return Ok(AuthDecision::PassthroughFailover);
    }

    let attribute = bound_attribute
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingBindingHeader)?;

    let Some(expected) = claims.binding_value() else {
        return Err(AuthError::BindingMismatch);
    };

    let actual = binding_digest(attribute);

    if bool::from(actual.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(AuthDecision::Authorized)
    } else {
        Err(AuthError::BindingMismatch)
    }
}
