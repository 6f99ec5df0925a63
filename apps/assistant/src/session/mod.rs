//! Session Context Store: bounded per-conversation memory.
//!
//! Process-wide map keyed by session id. A context is created on the first
//! message of a session and evicted by the caller when the conversation
//! ends; the store itself defines no automatic expiry.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

/// Same normalized question asked this many times triggers the
/// clarification short-circuit (on the third ask, not the second).
pub const REPEAT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub user: String,
    pub bot: String,
}

/// Mutable state for one conversation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_id: String,
    pub message_count: u64,
    pub last_intent: Option<String>,
    pub exchanges: VecDeque<Exchange>,
    repeated_questions: HashMap<String, u32>,
}

impl SessionContext {
    fn new(session_id: &str) -> Self {
        SessionContext {
            session_id: session_id.to_string(),
            message_count: 0,
            last_intent: None,
            exchanges: VecDeque::new(),
            repeated_questions: HashMap::new(),
        }
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionContext>>,
    /// FIFO cap on the rolling exchange history.
    history_cap: usize,
}

impl SessionStore {
    pub fn new(history_cap: usize) -> Self {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            history_cap,
        }
    }

    /// Snapshot of the context for `session_id`, creating it if absent.
    pub fn get_or_create(&self, session_id: &str) -> SessionContext {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id))
            .clone()
    }

    /// Bumps the per-session message counter and returns the new value.
    pub fn increment_message_count(&self, session_id: &str) -> u64 {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let ctx = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id));
        ctx.message_count += 1;
        ctx.message_count
    }

    /// Records one ask of `user_text` (normalized lowercase/trim) and reports
    /// whether the repetition threshold has been reached.
    pub fn is_repeated(&self, session_id: &str, user_text: &str) -> bool {
        let normalized = user_text.trim().to_lowercase();
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let ctx = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id));
        let count = ctx.repeated_questions.entry(normalized).or_insert(0);
        *count += 1;
        *count >= REPEAT_THRESHOLD
    }

    /// Appends one (user, bot) pair, evicting the oldest beyond the cap, and
    /// remembers the matched intent when there was one.
    pub fn record_exchange(
        &self,
        session_id: &str,
        user_text: &str,
        bot_text: &str,
        intent: Option<&str>,
    ) {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let ctx = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id));
        ctx.exchanges.push_back(Exchange {
            user: user_text.to_string(),
            bot: bot_text.to_string(),
        });
        while ctx.exchanges.len() > self.history_cap {
            ctx.exchanges.pop_front();
        }
        if let Some(intent) = intent {
            ctx.last_intent = Some(intent.to_string());
        }
    }

    pub fn clear(&self, session_id: &str) {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .remove(session_id);
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .len()
    }
}

/// Session id for an anonymous conversation.
pub fn generate_session_id() -> String {
    format!(
        "session_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_starts_empty() {
        let store = SessionStore::new(10);
        let ctx = store.get_or_create("s1");
        assert_eq!(ctx.message_count, 0);
        assert!(ctx.exchanges.is_empty());
        assert!(ctx.last_intent.is_none());
    }

    #[test]
    fn test_message_counter_increments() {
        let store = SessionStore::new(10);
        assert_eq!(store.increment_message_count("s1"), 1);
        assert_eq!(store.increment_message_count("s1"), 2);
        assert_eq!(store.increment_message_count("s2"), 1);
    }

    #[test]
    fn test_repetition_triggers_on_third_ask_not_second() {
        let store = SessionStore::new(10);
        assert!(!store.is_repeated("s1", "comment créer un cv ?"));
        assert!(!store.is_repeated("s1", "comment créer un cv ?"));
        assert!(store.is_repeated("s1", "comment créer un cv ?"));
    }

    #[test]
    fn test_repetition_normalizes_case_and_whitespace() {
        let store = SessionStore::new(10);
        assert!(!store.is_repeated("s1", "Voir les offres"));
        assert!(!store.is_repeated("s1", "  voir les offres  "));
        assert!(store.is_repeated("s1", "VOIR LES OFFRES"));
    }

    #[test]
    fn test_different_questions_do_not_accumulate() {
        let store = SessionStore::new(10);
        assert!(!store.is_repeated("s1", "question une"));
        assert!(!store.is_repeated("s1", "question deux"));
        assert!(!store.is_repeated("s1", "question trois"));
    }

    #[test]
    fn test_repetition_is_per_session() {
        let store = SessionStore::new(10);
        store.is_repeated("s1", "même question");
        store.is_repeated("s1", "même question");
        assert!(!store.is_repeated("s2", "même question"));
    }

    #[test]
    fn test_exchange_history_is_fifo_bounded() {
        let store = SessionStore::new(10);
        for i in 0..12 {
            store.record_exchange("s1", &format!("u{i}"), &format!("b{i}"), None);
        }
        let ctx = store.get_or_create("s1");
        assert_eq!(ctx.exchanges.len(), 10);
        assert_eq!(ctx.exchanges.front().unwrap().user, "u2");
        assert_eq!(ctx.exchanges.back().unwrap().user, "u11");
    }

    #[test]
    fn test_last_intent_updates_only_when_present() {
        let store = SessionStore::new(10);
        store.record_exchange("s1", "u", "b", Some("jobs"));
        store.record_exchange("s1", "u", "b", None);
        assert_eq!(store.get_or_create("s1").last_intent.as_deref(), Some("jobs"));
    }

    #[test]
    fn test_clear_evicts_the_session() {
        let store = SessionStore::new(10);
        store.increment_message_count("s1");
        assert_eq!(store.session_count(), 1);
        store.clear("s1");
        assert_eq!(store.session_count(), 0);
        assert_eq!(store.get_or_create("s1").message_count, 0);
    }

    #[test]
    fn test_generated_session_ids_are_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.starts_with("session_"));
    }
}
