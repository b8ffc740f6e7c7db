use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::attestation::VerifiedAttestation;

/// Handler で、gate が検証した attestation を受け取るための extractor
/// middleware が VerifiedAttestation を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（保護対象外の path・ミドルウェア未設定）
/// `Option<Attested>` にすれば保護対象外の path でも使える
#[derive(Debug, Clone)]
pub struct Attested(pub VerifiedAttestation);

impl<S> FromRequestParts<S> for Attested
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedAttestation>()
            .cloned()
            .map(Attested)
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> OptionalFromRequestParts<S> for Attested
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<VerifiedAttestation>()
            .cloned()
            .map(Attested))
    }
}
