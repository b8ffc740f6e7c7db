/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status + 空の JSON body `{}`)
 * - 失敗理由はレスポンスに載せず、error boundary がログに出す
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Attached to every response built from an `AppError`.
///
/// `denial` marks authentication failures; everything else is a fault.
/// The error boundary reads this to log the detail and normalise the body.
#[derive(Debug, Clone)]
pub struct FaultReport {
    pub denial: bool,
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_denial(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

/// The only body ever sent for a denial or a fault.
pub fn empty_body_response(status: StatusCode) -> Response {
    (status, Json(json!({}))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = FaultReport {
            denial: self.is_denial(),
            detail: format!("{:#}", self),
        };

        let mut response = empty_body_response(self.status());
        response.extensions_mut().insert(report);
        response
    }
}
