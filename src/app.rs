/*
 * Responsibility
 * - .env 読み込み → tracing 初期化 → Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (attestation gate / error boundary / http layers)
 * - axum::serve() で起動
 */
use std::panic;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppEnv, Config};
use crate::services::attestation::build_attestation_service;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing(app_env: AppEnv) {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,attestation_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);

    if app_env.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn init_panic_hook() {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        // The error boundary still answers the request with 500.
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let app_env = AppEnv::from_env();
    init_tracing(app_env);
    init_panic_hook();

    if let Err(e) = dotenv {
        if e.not_found() {
            tracing::debug!("no .env file found, using process environment");
        } else {
            tracing::warn!(error = %e, "failed to parse .env file");
        }
    }

    let config = Config::from_env()?;

    tracing::info!(
        protected_paths = ?config.protected_paths.prefixes(),
        token_binding = config.token_binding_enabled,
        "starting attestation gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    if config.protected_paths.is_empty() {
        tracing::warn!("no protected paths configured, every request bypasses the attestation check");
    }

    let state = build_state(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> AppState {
    // Process-level services are built once here and shared read-only.
    AppState::new(build_attestation_service(config))
}

pub fn build_router(state: AppState) -> Router {
    assemble(api::routes(), state)
}

fn assemble(routes: Router<AppState>, state: AppState) -> Router {
    let router = middleware::auth::attestation::apply(routes, state.clone()).with_state(state);
    let router = middleware::error_boundary::apply(router);
    middleware::http::apply(router)
}
