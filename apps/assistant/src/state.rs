use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::Catalog;
use crate::chat::pipeline::ChatPipeline;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub pipeline: Arc<ChatPipeline>,
}
