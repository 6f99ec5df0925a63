mod access;
mod catalog;
mod chat;
mod config;
mod db;
mod errors;
mod guard;
mod models;
mod nav;
mod routes;
mod session;
mod state;
mod stores;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::access::policy::AccessPolicy;
use crate::catalog::builtin::builtin_catalog;
use crate::chat::pipeline::ChatPipeline;
use crate::config::Config;
use crate::db::create_pool;
use crate::guard::rate_limit::{RateLimitConfig, RateLimiter};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::stores::postgres::{
    PgConversationLog, PgProfileStore, PgServiceConfigStore, PgUsageHistoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assistant v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    let catalog = Arc::new(builtin_catalog()?);
    info!("Intent catalog loaded ({} destinations)", catalog.len());

    let sessions = Arc::new(SessionStore::new(config.session_history_cap));
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        per_minute: config.rate_limit_per_minute,
        per_hour: config.rate_limit_per_hour,
    }));
    let policy = Arc::new(AccessPolicy::new(
        Arc::new(PgServiceConfigStore::new(db.clone())),
        Arc::new(PgUsageHistoryStore::new(db.clone())),
    ));

    let pipeline = Arc::new(ChatPipeline::new(
        catalog.clone(),
        sessions,
        limiter.clone(),
        policy,
        Arc::new(PgProfileStore::new(db.clone())),
        Arc::new(PgConversationLog::new(db.clone())),
        config.assistant_enabled,
    ));

    if !config.assistant_enabled {
        info!("Assistant is disabled; turns will be answered with the kill-switch reply");
    }

    // Periodic rate-limiter cleanup so idle users do not accumulate.
    let sweep_secs = config.rate_limit_sweep_secs;
    let sweep_limiter = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_secs));
        loop {
            interval.tick().await;
            sweep_limiter.sweep();
        }
    });

    let state = AppState {
        db,
        config: config.clone(),
        catalog,
        pipeline,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
