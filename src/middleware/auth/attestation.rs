//! Attestation token gate → VerifiedAttestation を extensions に入れる
//!
//! 1. path が保護対象 (PathSelector) でなければ素通し
//! 2. token header を取り出して署名 / alg / exp を検証
//! 3. (有効なら) token binding header の digest を `pay` claim と比較
//! 4. どこかで失敗したら 401 `{}`、handler は呼ばない

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::attestation::AuthError;
use crate::state::AppState;

/// Gate the given router with the attestation check.
///
/// 例：
/// ```ignore
/// let router = middleware::auth::attestation::apply(api::routes(), state.clone());
/// let app = router.with_state(state);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, attestation_middleware))
}

async fn attestation_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let service = state.attestation.as_ref();

    if !service.is_protected(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let policy = service.policy();
    let now = chrono::Utc::now().timestamp().max(0) as u64;

    let result = token_from_headers(req.headers(), &policy.token_header).and_then(|token| {
        let bound = req
            .headers()
            .get(&policy.binding_header)
            .map(|v| v.as_bytes());
        service.verify_request(token, bound, now)
    });

    let verified = match result {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(
                error = %err,
                decision = ?err.decision(),
                path = %req.uri().path(),
                "attestation check failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    tracing::debug!(
        decision = ?verified.decision,
        bound = verified.claims.has_binding(),
        "attestation check passed"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(verified);

    Ok(next.run(req).await)
}

fn token_from_headers<'a>(
    headers: &'a HeaderMap,
    name: &HeaderName,
) -> Result<Option<&'a str>, AuthError> {
    match headers.get(name) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .to_str()
            .map(Some)
            .map_err(|_| AuthError::invalid("token header is not visible ascii")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn name() -> HeaderName {
        HeaderName::from_static("approov-token")
    }

    #[test]
    fn absent_or_empty_header_is_no_token() {
        let mut headers = HeaderMap::new();
        assert!(matches!(token_from_headers(&headers, &name()), Ok(None)));

        headers.insert(name(), HeaderValue::from_static(""));
        assert!(matches!(token_from_headers(&headers, &name()), Ok(None)));
    }

    #[test]
    fn opaque_header_bytes_are_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(name(), HeaderValue::from_bytes(b"abc\xff").unwrap());

        assert!(matches!(
            token_from_headers(&headers, &name()),
            Err(AuthError::InvalidSignatureOrFormat(_))
        ));
    }

    #[test]
    fn reads_token_value() {
        let mut headers = HeaderMap::new();
        headers.insert(name(), HeaderValue::from_static("a.b.c"));

        assert!(matches!(
            token_from_headers(&headers, &name()),
            Ok(Some("a.b.c"))
        ));
    }
}
