//! External collaborator stores.
//!
//! The core never owns durable state: profiles/credits, per-service
//! configuration, usage history and the conversation log all live behind
//! these `async_trait` seams. `AppState` carries them as `Arc<dyn …>` so the
//! Postgres adapters can be swapped for the in-memory doubles in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::access::ServiceCode;
use crate::errors::AppError;
use crate::models::user::ProfileRow;

/// Per-service configuration row, owned by the configuration store and
/// read-only to this core.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceConfig {
    pub service_code: String,
    pub display_name: String,
    pub is_active: bool,
    pub credits_cost: i64,
    pub enable_premium_limits: bool,
    /// Daily cap for active-premium users; 0 or absent means unlimited.
    pub premium_daily_limit: Option<i64>,
}

/// One appended conversation exchange. Write-only, best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLogEntry {
    pub user_id: Option<Uuid>,
    pub session_id: String,
    pub user_text: String,
    pub bot_text: String,
    pub intent_detected: Option<String>,
    pub page_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError>;
}

#[async_trait]
pub trait ServiceConfigStore: Send + Sync {
    async fn fetch(&self, service_code: ServiceCode) -> Result<Option<ServiceConfig>, AppError>;
}

#[async_trait]
pub trait UsageHistoryStore: Send + Sync {
    /// Counts recorded uses of `service_code` by `user_id` since `since`.
    async fn count_since(
        &self,
        user_id: Uuid,
        service_code: ServiceCode,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError>;
}

#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn append(&self, entry: &ConversationLogEntry) -> Result<(), AppError>;
}
