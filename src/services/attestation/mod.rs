pub mod binding;
pub mod error;
pub mod factory;
pub mod paths;
pub mod secret;
#[cfg(test)]
pub mod testing;
pub mod token;
pub mod types;

use axum::http::HeaderName;

pub use error::AuthError;
pub use factory::build_attestation_service;
pub use paths::PathSelector;
pub use secret::Secret;
pub use token::TokenVerifier;
pub use types::{AuthDecision, VerifiedAttestation};

/// Where the gate applies and which headers it reads.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub protected_paths: PathSelector,
    pub token_header: HeaderName,
    pub binding_header: HeaderName,
    pub binding_enabled: bool,
}

/// Attestation token verifier + optional token binding check.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct AttestationService {
    verifier: TokenVerifier,
    policy: GatePolicy,
}

impl AttestationService {
    pub fn new(verifier: TokenVerifier, policy: GatePolicy) -> Self {
        Self { verifier, policy }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.policy.protected_paths.matches(path)
    }

    /// Token check, then (when enabled) the binding check.
    ///
    /// This is the recommended entry-point for middleware. It stops at the
    /// first failure; the returned error says why, for logging only.
    pub fn verify_request(
        &self,
        token: Option<&str>,
        bound_attribute: Option<&[u8]>,
        now: u64,
    ) -> Result<VerifiedAttestation, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.verifier.verify(token, now)?;

        let decision = if self.policy.binding_enabled {
            binding::validate(&claims, bound_attribute)?
        } else {
            AuthDecision::Authorized
        };

        Ok(VerifiedAttestation { claims, decision })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use super::testing::{NOW, TEST_SECRET, sign, test_secret};

    fn service(binding_enabled: bool) -> AttestationService {
        AttestationService::new(
            TokenVerifier::new(&test_secret(), token::DEFAULT_MAX_TOKEN_LENGTH),
            GatePolicy {
                protected_paths: PathSelector::all(),
                token_header: HeaderName::from_static("approov-token"),
                binding_header: axum::http::header::AUTHORIZATION,
                binding_enabled,
            },
        )
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = service(true).verify_request(None, None, NOW).unwrap_err();

        assert!(matches!(err, AuthError::MissingToken));
        assert_eq!(err.decision(), AuthDecision::Unauthenticated);
    }

    #[test]
    fn token_failure_stops_before_binding() {
        let token = sign(&json!({"exp": NOW - 1, "pay": "x"}), TEST_SECRET);

        let err = service(true)
            .verify_request(Some(token.as_str()), None, NOW)
            .unwrap_err();

        assert!(matches!(err, AuthError::ExpiredToken { .. }));
    }

    #[test]
    fn bound_token_with_matching_header_is_authorized() {
        let pay = binding::binding_digest("Bearer xyz");
        let token = sign(&json!({"exp": NOW + 60, "pay": pay}), TEST_SECRET);

        let verified = service(true)
            .verify_request(Some(token.as_str()), Some(&b"Bearer xyz"[..]), NOW)
            .unwrap();

        assert_eq!(verified.decision, AuthDecision::Authorized);
        assert_eq!(verified.claims.binding_value(), Some(pay.as_str()));
    }

    #[test]
    fn failover_token_passes_through() {
        let token = sign(&json!({"exp": NOW + 60}), TEST_SECRET);

        let verified = service(true)
            .verify_request(Some(token.as_str()), None, NOW)
            .unwrap();

        assert_eq!(verified.decision, AuthDecision::PassthroughFailover);
        assert!(!verified.claims.has_binding());
    }

    #[test]
    fn binding_disabled_ignores_binding_claim() {
        let pay = binding::binding_digest("Bearer xyz");
        let token = sign(&json!({"exp": NOW + 60, "pay": pay}), TEST_SECRET);

        let verified = service(false)
            .verify_request(Some(token.as_str()), Some(&b"Bearer other"[..]), NOW)
            .unwrap();

        assert_eq!(verified.decision, AuthDecision::Authorized);
    }

    #[test]
    fn binding_mismatch_is_rejected_when_enabled() {
        let pay = binding::binding_digest("Bearer xyz");
        let token = sign(&json!({"exp": NOW + 60, "pay": pay}), TEST_SECRET);

        let err = service(true)
            .verify_request(Some(token.as_str()), Some(&b"Bearer other"[..]), NOW)
            .unwrap_err();

        assert_eq!(err.decision(), AuthDecision::Forbidden);
    }

    #[test]
    fn null_binding_claim_does_not_pass_through() {
        let token = sign(&json!({"exp": NOW + 60, "pay": null}), TEST_SECRET);

        let err = service(true)
            .verify_request(Some(token.as_str()), None, NOW)
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingBindingHeader));

        let err = service(true)
            .verify_request(Some(token.as_str()), Some(&b"Bearer xyz"[..]), NOW)
            .unwrap_err();
        assert_eq!(err.decision(), AuthDecision::Forbidden);
    }
}
