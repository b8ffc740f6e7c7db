use thiserror::Error;

use super::types::AuthDecision;

/// Why a request was refused by the attestation pipeline.
///
/// These reasons are for internal diagnostics only; the HTTP response is the
/// same empty 401 for every variant.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing attestation token")]
    MissingToken,
    #[error("attestation token too long: {len} bytes (max {max})")]
    TokenTooLong { len: usize, max: usize },
    #[error("invalid attestation token: {0}")]
    InvalidSignatureOrFormat(String),
    #[error("attestation token expired at {exp} (now {now})")]
    ExpiredToken { exp: u64, now: u64 },
    #[error("attestation token not valid before {nbf} (now {now})")]
    NotYetValid { nbf: u64, now: u64 },
    #[error("missing token binding header")]
    MissingBindingHeader,
    #[error("token binding mismatch")]
    BindingMismatch,
}

impl AuthError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSignatureOrFormat(reason.into())
    }

    /// The decision this failure represents.
    pub fn decision(&self) -> AuthDecision {
        match self {
            AuthError::BindingMismatch => AuthDecision::Forbidden,
            _ => AuthDecision::Unauthenticated,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidSignatureOrFormat(e.to_string())
    }
}
