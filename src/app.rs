/*
 * Responsibility
 * - Config読み込み → Authenticator 生成 → Router 組み立て
 * - Middleware の適用 (http 層 / token gate)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::{
    api,
    config::{AppEnv, Config},
    middleware,
    services::auth::{Authenticator, Parser},
    state::AppState,
};

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.app_env);
    tracing::debug!(?config, "configuration loaded");

    let auth = build_authenticator(&config)?;
    tracing::info!(
        alg = auth.method().name(),
        aliases = ?config.jwt_query_aliases,
        "authenticator ready"
    );

    let state = AppState::new(Arc::new(auth), config.jwt_query_aliases.clone());
    let app = middleware::http::apply(build_router(state), config.http_limits());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(app_env: AppEnv) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(app_env.default_log_filter()));

    // production: no ANSI colours (log collectors)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!app_env.is_production())
        .init();
}

pub fn build_authenticator(config: &Config) -> Result<Authenticator> {
    let parser = Parser::new(config.parser_settings());

    Authenticator::with_parser(
        &config.jwt_algorithm,
        parser,
        config.jwt_signing_key.clone(),
        config.jwt_verify_key.clone(),
    )
    .with_context(|| format!("invalid JWT_ALGORITHM: {}", config.jwt_algorithm))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state)
}
