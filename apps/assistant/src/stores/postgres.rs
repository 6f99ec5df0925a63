//! Postgres adapters for the external stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::ServiceCode;
use crate::errors::AppError;
use crate::models::user::ProfileRow;
use crate::stores::{
    ConversationLog, ConversationLogEntry, ProfileStore, ServiceConfig, ServiceConfigStore,
    UsageHistoryStore,
};

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        PgProfileStore { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, is_premium, premium_expiration, credits_balance, user_type
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

pub struct PgServiceConfigStore {
    pool: PgPool,
}

impl PgServiceConfigStore {
    pub fn new(pool: PgPool) -> Self {
        PgServiceConfigStore { pool }
    }
}

#[async_trait]
impl ServiceConfigStore for PgServiceConfigStore {
    async fn fetch(&self, service_code: ServiceCode) -> Result<Option<ServiceConfig>, AppError> {
        // Inactive rows are returned too: the policy evaluator distinguishes
        // "inactive" from "not found".
        let row = sqlx::query_as::<_, ServiceConfig>(
            r#"
            SELECT service_code, display_name, is_active, credits_cost,
                   enable_premium_limits, premium_daily_limit
            FROM ia_service_config
            WHERE service_code = $1
            "#,
        )
        .bind(service_code.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

pub struct PgUsageHistoryStore {
    pool: PgPool,
}

impl PgUsageHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        PgUsageHistoryStore { pool }
    }
}

#[async_trait]
impl UsageHistoryStore for PgUsageHistoryStore {
    async fn count_since(
        &self,
        user_id: Uuid,
        service_code: ServiceCode,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM ai_service_usage_history
            WHERE user_id = $1 AND service_code = $2 AND created_at >= $3
            "#,
        )
        .bind(user_id)
        .bind(service_code.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }
}

pub struct PgConversationLog {
    pool: PgPool,
}

impl PgConversationLog {
    pub fn new(pool: PgPool) -> Self {
        PgConversationLog { pool }
    }
}

#[async_trait]
impl ConversationLog for PgConversationLog {
    async fn append(&self, entry: &ConversationLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO chatbot_conversation_logs
                (user_id, session_id, message_user, message_bot,
                 intent_detected, page_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.session_id)
        .bind(&entry.user_text)
        .bind(&entry.bot_text)
        .bind(&entry.intent_detected)
        .bind(&entry.page_url)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
