//! In-memory store doubles. Used by the test suites and handy for running
//! the pipeline without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::access::ServiceCode;
use crate::errors::AppError;
use crate::models::user::ProfileRow;
use crate::stores::{
    ConversationLog, ConversationLogEntry, ProfileStore, ServiceConfig, ServiceConfigStore,
    UsageHistoryStore,
};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<Uuid, ProfileRow>>,
}

impl MemoryProfileStore {
    pub fn insert(&self, profile: ProfileRow) {
        self.profiles
            .lock()
            .expect("profile store lock poisoned")
            .insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(self
            .profiles
            .lock()
            .expect("profile store lock poisoned")
            .get(&user_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryServiceConfigStore {
    configs: Mutex<HashMap<String, ServiceConfig>>,
}

impl MemoryServiceConfigStore {
    pub fn insert(&self, config: ServiceConfig) {
        self.configs
            .lock()
            .expect("service config lock poisoned")
            .insert(config.service_code.clone(), config);
    }
}

#[async_trait]
impl ServiceConfigStore for MemoryServiceConfigStore {
    async fn fetch(&self, service_code: ServiceCode) -> Result<Option<ServiceConfig>, AppError> {
        Ok(self
            .configs
            .lock()
            .expect("service config lock poisoned")
            .get(service_code.as_str())
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryUsageHistoryStore {
    events: Mutex<Vec<(Uuid, ServiceCode, DateTime<Utc>)>>,
}

impl MemoryUsageHistoryStore {
    pub fn record(&self, user_id: Uuid, service_code: ServiceCode, at: DateTime<Utc>) {
        self.events
            .lock()
            .expect("usage store lock poisoned")
            .push((user_id, service_code, at));
    }
}

#[async_trait]
impl UsageHistoryStore for MemoryUsageHistoryStore {
    async fn count_since(
        &self,
        user_id: Uuid,
        service_code: ServiceCode,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        Ok(self
            .events
            .lock()
            .expect("usage store lock poisoned")
            .iter()
            .filter(|(u, s, at)| *u == user_id && *s == service_code && *at >= since)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct MemoryConversationLog {
    entries: Mutex<Vec<ConversationLogEntry>>,
}

impl MemoryConversationLog {
    pub fn entries(&self) -> Vec<ConversationLogEntry> {
        self.entries
            .lock()
            .expect("conversation log lock poisoned")
            .clone()
    }
}

#[async_trait]
impl ConversationLog for MemoryConversationLog {
    async fn append(&self, entry: &ConversationLogEntry) -> Result<(), AppError> {
        self.entries
            .lock()
            .expect("conversation log lock poisoned")
            .push(entry.clone());
        Ok(())
    }
}
