/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::attestation (token gate), error_boundary, http (cross-cutting layers)
 */
pub mod auth;
pub mod error_boundary;
pub mod http;
