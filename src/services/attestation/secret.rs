/*
 * Responsibility
 * - APPROOV_BASE64_SECRET (base64) → raw HMAC key bytes
 * - 起動時に一度だけ decode し、以降は read-only
 *
 * thiserror を使わない理由:
 * - このモジュール内で完結するエラー型なので
 */
use base64::{Engine as _, engine::general_purpose::STANDARD};
use jsonwebtoken::DecodingKey;
use std::{error::Error, fmt};

#[derive(Debug)]
pub enum SecretError {
    InvalidBase64(base64::DecodeError),
    Empty,
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretError::InvalidBase64(e) => write!(f, "secret is not valid base64: {}", e),
            SecretError::Empty => write!(f, "secret must not be empty"),
        }
    }
}

impl Error for SecretError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SecretError::InvalidBase64(e) => Some(e),
            SecretError::Empty => None,
        }
    }
}

/// Shared HMAC secret used to verify attestation tokens.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Secret {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self { bytes })
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SecretError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(SecretError::InvalidBase64)?;
        Self::from_bytes(bytes)
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.bytes)
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
