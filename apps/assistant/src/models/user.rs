use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account roles on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Candidate,
    Recruiter,
    Trainer,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Candidate => "candidate",
            UserType::Recruiter => "recruiter",
            UserType::Trainer => "trainer",
            UserType::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "candidate" => Some(UserType::Candidate),
            "recruiter" => Some(UserType::Recruiter),
            "trainer" => Some(UserType::Trainer),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }
}

/// Profile/credit row as read from the profile store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub is_premium: bool,
    pub premium_expiration: Option<DateTime<Utc>>,
    pub credits_balance: i64,
    pub user_type: Option<String>,
}

/// Read-only per-request snapshot of the requesting user.
///
/// Derived from the profile store once per turn and never persisted by this
/// core. `is_premium_active` is the premium flag AND an expiration still in
/// the future; an expired subscription keeps `is_premium = true` so the
/// policy evaluator can distinguish "expired" from "never subscribed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Option<Uuid>,
    pub is_authenticated: bool,
    pub is_premium: bool,
    pub is_premium_active: bool,
    pub premium_expiration: Option<DateTime<Utc>>,
    pub credits_balance: i64,
    pub days_remaining_premium: Option<i64>,
    pub user_type: Option<UserType>,
}

impl UserContext {
    /// Context for a visitor who is not signed in.
    pub fn anonymous() -> Self {
        UserContext {
            user_id: None,
            is_authenticated: false,
            is_premium: false,
            is_premium_active: false,
            premium_expiration: None,
            credits_balance: 0,
            days_remaining_premium: None,
            user_type: None,
        }
    }

    /// Builds the snapshot from a profile row at evaluation time `now`.
    pub fn from_profile(profile: &ProfileRow, now: DateTime<Utc>) -> Self {
        let is_premium_active = profile.is_premium
            && profile
                .premium_expiration
                .map(|exp| exp > now)
                .unwrap_or(false);

        let days_remaining_premium = match (profile.is_premium, profile.premium_expiration) {
            (true, Some(exp)) => {
                let secs = (exp - now).num_seconds();
                Some((secs as f64 / 86_400.0).ceil().max(0.0) as i64)
            }
            _ => None,
        };

        UserContext {
            user_id: Some(profile.id),
            is_authenticated: true,
            is_premium: profile.is_premium,
            is_premium_active,
            premium_expiration: profile.premium_expiration,
            credits_balance: profile.credits_balance,
            days_remaining_premium,
            user_type: profile.user_type.as_deref().and_then(UserType::parse),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == Some(UserType::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile(is_premium: bool, exp: Option<DateTime<Utc>>) -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            is_premium,
            premium_expiration: exp,
            credits_balance: 10,
            user_type: Some("candidate".to_string()),
        }
    }

    #[test]
    fn test_anonymous_context_has_nothing() {
        let ctx = UserContext::anonymous();
        assert!(!ctx.is_authenticated);
        assert!(!ctx.is_premium);
        assert_eq!(ctx.credits_balance, 0);
        assert!(ctx.user_type.is_none());
    }

    #[test]
    fn test_premium_active_when_expiration_in_future() {
        let now = Utc::now();
        let ctx = UserContext::from_profile(&profile(true, Some(now + Duration::days(30))), now);
        assert!(ctx.is_premium);
        assert!(ctx.is_premium_active);
        assert_eq!(ctx.days_remaining_premium, Some(30));
    }

    #[test]
    fn test_premium_inactive_when_expired() {
        let now = Utc::now();
        let ctx = UserContext::from_profile(&profile(true, Some(now - Duration::days(1))), now);
        assert!(ctx.is_premium);
        assert!(!ctx.is_premium_active);
        assert_eq!(ctx.days_remaining_premium, Some(0));
    }

    #[test]
    fn test_premium_inactive_without_expiration() {
        let now = Utc::now();
        let ctx = UserContext::from_profile(&profile(true, None), now);
        assert!(!ctx.is_premium_active);
        assert!(ctx.days_remaining_premium.is_none());
    }

    #[test]
    fn test_user_type_parse_roundtrip() {
        for t in [
            UserType::Candidate,
            UserType::Recruiter,
            UserType::Trainer,
            UserType::Admin,
        ] {
            assert_eq!(UserType::parse(t.as_str()), Some(t));
        }
        assert_eq!(UserType::parse("ghost"), None);
    }

    #[test]
    fn test_admin_flag_follows_user_type() {
        let now = Utc::now();
        let mut row = profile(false, None);
        row.user_type = Some("admin".to_string());
        assert!(UserContext::from_profile(&row, now).is_admin());
        assert!(!UserContext::anonymous().is_admin());
    }
}
