//! Error boundary around the gate and the handlers.
//!
//! Responsibility:
//! - Responses built from `AppError` carry a `FaultReport`; log it and send `{}`
//! - Denials stay 401, every other fault becomes 500
//! - Unmarked 5xx responses and handler panics also become 500 `{}`
//!
//! Nothing about the failure is ever echoed to the caller.

use std::any::Any;

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{FaultReport, empty_body_response};

pub fn apply(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(error_boundary))
}

async fn error_boundary(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut response = next.run(req).await;

    match response.extensions_mut().remove::<FaultReport>() {
        Some(report) if report.denial => {
            tracing::warn!(%method, %path, detail = %report.detail, "request denied");
            with_empty_body(response, StatusCode::UNAUTHORIZED)
        }
        Some(report) => {
            tracing::error!(%method, %path, detail = %report.detail, "request failed");
            with_empty_body(response, StatusCode::INTERNAL_SERVER_ERROR)
        }
        None if response.status().is_server_error() => {
            tracing::error!(%method, %path, status = %response.status(), "downstream fault");
            with_empty_body(response, StatusCode::INTERNAL_SERVER_ERROR)
        }
        None => response,
    }
}

// Keep headers set by outer layers; replace status and body.
fn with_empty_body(response: Response, status: StatusCode) -> Response {
    let (mut parts, _) = response.into_parts();
    parts.status = status;
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from("{}"))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    let mut response = empty_body_response(StatusCode::INTERNAL_SERVER_ERROR);
    response.extensions_mut().insert(FaultReport {
        denial: false,
        detail: format!("handler panicked: {}", detail),
    });
    response
}
