/// Factory: build `AttestationService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::attestation::{AttestationService, GatePolicy, TokenVerifier};

pub fn build_attestation_service(config: &Config) -> Arc<AttestationService> {
    let verifier = TokenVerifier::new(&config.secret, config.max_token_length);

    let policy = GatePolicy {
        protected_paths: config.protected_paths.clone(),
        token_header: config.token_header.clone(),
        binding_header: config.binding_header.clone(),
        binding_enabled: config.token_binding_enabled,
    };

    Arc::new(AttestationService::new(verifier, policy))
}
