//! Sliding-window rate limiter keyed by user id.
//!
//! Two windows apply: a short burst window and an hourly window. A check
//! that passes appends the current timestamp; pruning keeps only the
//! trailing hour per user, and a periodic [`RateLimiter::sweep`] drops users
//! whose whole history has aged out.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Window sizes and caps. Defaults match the production guard: 10 messages
/// per minute, 50 per hour.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub per_minute: usize,
    pub per_hour: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            per_minute: 10,
            per_hour: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Seconds until the oldest message in the burst window ages out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_secs: Option<i64>,
}

impl RateLimitOutcome {
    fn allowed() -> Self {
        RateLimitOutcome {
            allowed: true,
            reason: None,
            wait_secs: None,
        }
    }
}

pub struct RateLimiter {
    config: RateLimitConfig,
    history: Mutex<HashMap<Uuid, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiter {
            config,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Checks and records one message for `user_id` at the current time.
    pub fn check(&self, user_id: Uuid) -> RateLimitOutcome {
        self.check_at(user_id, Utc::now())
    }

    /// Clock-explicit variant of [`check`](Self::check); tests drive this
    /// directly instead of mocking time.
    pub fn check_at(&self, user_id: Uuid, now: DateTime<Utc>) -> RateLimitOutcome {
        let minute_floor = now - Duration::seconds(60);
        let hour_floor = now - Duration::seconds(3600);

        let mut history = self.history.lock().expect("rate limiter lock poisoned");
        let timestamps = history.entry(user_id).or_default();
        timestamps.retain(|&t| t > hour_floor);

        let in_minute: Vec<DateTime<Utc>> =
            timestamps.iter().copied().filter(|&t| t > minute_floor).collect();

        if in_minute.len() >= self.config.per_minute {
            // Oldest entry still inside the burst window determines the wait.
            let oldest = in_minute.iter().min().copied().unwrap_or(now);
            let wait = (oldest + Duration::seconds(60) - now).num_seconds().max(1);
            return RateLimitOutcome {
                allowed: false,
                reason: Some(format!(
                    "Trop de messages envoyés. Patientez {wait} seconde(s) avant de réessayer."
                )),
                wait_secs: Some(wait),
            };
        }

        if timestamps.len() >= self.config.per_hour {
            return RateLimitOutcome {
                allowed: false,
                reason: Some(
                    "Limite horaire de messages atteinte. Réessayez un peu plus tard.".to_string(),
                ),
                wait_secs: None,
            };
        }

        timestamps.push(now);
        RateLimitOutcome::allowed()
    }

    /// Drops users whose entire history has aged out of the trailing hour.
    /// Idempotent; run from a background interval task.
    pub fn sweep(&self) {
        self.sweep_at(Utc::now());
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) {
        let hour_floor = now - Duration::seconds(3600);
        let mut history = self.history.lock().expect("rate limiter lock poisoned");
        history.retain(|_, timestamps| {
            timestamps.retain(|&t| t > hour_floor);
            !timestamps.is_empty()
        });
    }

    /// Number of users currently tracked; exposed for sweep tests.
    pub fn tracked_users(&self) -> usize {
        self.history.lock().expect("rate limiter lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimitConfig::default())
    }

    #[test]
    fn test_eleventh_message_in_a_minute_is_rejected() {
        let rl = limiter();
        let user = Uuid::new_v4();
        let start = Utc::now();

        for i in 0..10 {
            let outcome = rl.check_at(user, start + Duration::seconds(i * 3));
            assert!(outcome.allowed, "message {i} should pass");
        }

        let eleventh = rl.check_at(user, start + Duration::seconds(30));
        assert!(!eleventh.allowed);
        assert!(eleventh.wait_secs.unwrap() > 0);
        assert!(eleventh.reason.is_some());
    }

    #[test]
    fn test_burst_window_slides() {
        let rl = limiter();
        let user = Uuid::new_v4();
        let start = Utc::now();

        for i in 0..10 {
            assert!(rl.check_at(user, start + Duration::seconds(i)).allowed);
        }
        assert!(!rl.check_at(user, start + Duration::seconds(10)).allowed);
        // 70s after the first message, the oldest entries have aged out.
        assert!(rl.check_at(user, start + Duration::seconds(70)).allowed);
    }

    #[test]
    fn test_fifty_first_in_an_hour_is_rejected_even_when_spaced() {
        let rl = limiter();
        let user = Uuid::new_v4();
        let start = Utc::now();

        // One message per minute satisfies the burst rule throughout.
        for i in 0..50 {
            let outcome = rl.check_at(user, start + Duration::seconds(i * 65));
            assert!(outcome.allowed, "message {i} should pass");
        }

        // 50 * 65s = 3250s: all 50 are still inside the trailing hour.
        let fifty_first = rl.check_at(user, start + Duration::seconds(3255));
        assert!(!fifty_first.allowed);
        assert!(fifty_first.wait_secs.is_none());
    }

    #[test]
    fn test_users_are_independent() {
        let rl = limiter();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let start = Utc::now();

        for i in 0..10 {
            assert!(rl.check_at(a, start + Duration::seconds(i)).allowed);
        }
        assert!(!rl.check_at(a, start + Duration::seconds(10)).allowed);
        assert!(rl.check_at(b, start + Duration::seconds(10)).allowed);
    }

    #[test]
    fn test_sweep_drops_idle_users() {
        let rl = limiter();
        let user = Uuid::new_v4();
        let start = Utc::now();

        assert!(rl.check_at(user, start).allowed);
        assert_eq!(rl.tracked_users(), 1);

        rl.sweep_at(start + Duration::seconds(1800));
        assert_eq!(rl.tracked_users(), 1);

        rl.sweep_at(start + Duration::seconds(3700));
        assert_eq!(rl.tracked_users(), 0);
    }

    #[test]
    fn test_wait_time_reflects_oldest_in_window() {
        let rl = limiter();
        let user = Uuid::new_v4();
        let start = Utc::now();

        for i in 0..10 {
            assert!(rl.check_at(user, start + Duration::seconds(i)).allowed);
        }
        // Oldest is at t=0; at t=30 it ages out of the window in 30s.
        let denied = rl.check_at(user, start + Duration::seconds(30));
        assert_eq!(denied.wait_secs, Some(30));
    }
}
