/*
 * Responsibility
 * - GET / (attestation gate の後ろにある downstream handler のサンプル)
 */
use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::api::extractors::Attested;

pub async fn hello(attested: Option<Attested>) -> impl IntoResponse {
    if let Some(Attested(verified)) = attested {
        tracing::debug!(
            decision = ?verified.decision,
            exp = verified.claims.exp,
            "serving attested request"
        );
    }

    Json(json!({"message": "Hello, World!"}))
}
