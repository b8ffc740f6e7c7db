/*
 * Responsibility
 * - URL 構造を定義
 * - attestation gate は app.rs 側で Router 全体に掛ける (保護範囲は PathSelector が決める)
 */
use axum::{Router, routing::get};

use crate::api::handlers::hello::hello;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(hello))
}
