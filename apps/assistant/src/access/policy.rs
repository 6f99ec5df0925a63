//! Access Policy Evaluator.
//!
//! Pure decision logic over the configuration and usage stores. The
//! evaluator authorizes; it never debits credits or records usage, that is
//! the caller's responsibility after the action succeeds. Two near-simultaneous
//! checks can therefore both pass before either spend lands; this
//! check-then-act race is accepted for chat-assisted navigation.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::access::{AccessReason, AccessResult, ServiceCode, SuggestedAction};
use crate::errors::AppError;
use crate::models::user::UserContext;
use crate::stores::{ServiceConfig, ServiceConfigStore, UsageHistoryStore};

pub struct AccessPolicy {
    config_store: Arc<dyn ServiceConfigStore>,
    usage_store: Arc<dyn UsageHistoryStore>,
}

impl AccessPolicy {
    pub fn new(
        config_store: Arc<dyn ServiceConfigStore>,
        usage_store: Arc<dyn UsageHistoryStore>,
    ) -> Self {
        AccessPolicy {
            config_store,
            usage_store,
        }
    }

    /// Evaluates access to `service_code` for `ctx`. Daily quota counts run
    /// from the local midnight preceding the evaluation.
    pub async fn check_access(
        &self,
        service_code: ServiceCode,
        ctx: &UserContext,
    ) -> Result<AccessResult, AppError> {
        self.check_access_since(service_code, ctx, local_midnight_utc())
            .await
    }

    /// Clock-explicit variant: `day_start` is the instant from which usage
    /// counts. Tests drive this directly.
    pub async fn check_access_since(
        &self,
        service_code: ServiceCode,
        ctx: &UserContext,
        day_start: DateTime<Utc>,
    ) -> Result<AccessResult, AppError> {
        let user_id = match (ctx.is_authenticated, ctx.user_id) {
            (true, Some(id)) => id,
            _ => {
                let mut result = AccessResult::denied(
                    AccessReason::NotAuthenticated,
                    "Oups ! Connectez-vous d'abord pour accéder à ce service. 😊".to_string(),
                );
                result.suggested_action = Some(SuggestedAction::Login);
                return Ok(result);
            }
        };

        let config = match self.config_store.fetch(service_code).await? {
            Some(config) => config,
            None => {
                return Ok(AccessResult::denied(
                    AccessReason::ServiceNotFound,
                    "Ce service n'est pas encore disponible. Revenez bientôt ! 🚀".to_string(),
                ));
            }
        };

        if !config.is_active {
            return Ok(AccessResult::denied(
                AccessReason::ServiceInactive,
                format!(
                    "Le service \"{}\" est en pause. On le réactive très vite ! ⚙️",
                    config.display_name
                ),
            ));
        }

        if ctx.is_premium && ctx.is_premium_active {
            return self
                .check_premium_quota(user_id, service_code, &config, day_start)
                .await;
        }

        if ctx.is_premium && !ctx.is_premium_active {
            let mut result = AccessResult::denied(
                AccessReason::PremiumExpired,
                "Votre Premium a expiré. Renouvelez-le pour profiter des services IA ! 👑"
                    .to_string(),
            );
            result.suggested_action = Some(SuggestedAction::RenewPremium);
            return Ok(result);
        }

        // Non-premium path: free tier or credit-metered.
        if config.credits_cost == 0 {
            return Ok(AccessResult::granted(format!(
                "✓ Service \"{}\" gratuit. C'est parti !",
                config.display_name
            )));
        }

        if ctx.credits_balance < config.credits_cost {
            let mut result = AccessResult::denied(
                AccessReason::InsufficientCredits,
                format!(
                    "Il vous manque quelques crédits. Ce service coûte {} crédits (vous en avez {}). 💰",
                    config.credits_cost, ctx.credits_balance
                ),
            );
            result.required_credits = Some(config.credits_cost);
            result.current_credits = Some(ctx.credits_balance);
            result.suggested_action = Some(SuggestedAction::BuyCredits);
            return Ok(result);
        }

        let plural = config.credits_cost > 1;
        let mut result = AccessResult::granted(format!(
            "✓ Prêt ! {} crédit{} sera{} utilisé{}.",
            config.credits_cost,
            if plural { "s" } else { "" },
            if plural { "ont" } else { "" },
            if plural { "s" } else { "" },
        ));
        result.required_credits = Some(config.credits_cost);
        result.current_credits = Some(ctx.credits_balance);
        Ok(result)
    }

    async fn check_premium_quota(
        &self,
        user_id: uuid::Uuid,
        service_code: ServiceCode,
        config: &ServiceConfig,
        day_start: DateTime<Utc>,
    ) -> Result<AccessResult, AppError> {
        let daily_limit = match (config.enable_premium_limits, config.premium_daily_limit) {
            (true, Some(limit)) if limit > 0 => limit,
            _ => {
                return Ok(AccessResult::granted(format!(
                    "✓ Accès illimité ! Service \"{}\" inclus dans votre Premium. 🎉",
                    config.display_name
                )));
            }
        };

        let used_today = self
            .usage_store
            .count_since(user_id, service_code, day_start)
            .await?;

        if used_today >= daily_limit {
            let mut result = AccessResult::denied(
                AccessReason::PremiumQuotaReached,
                format!(
                    "Vous avez atteint votre quota quotidien ({daily_limit} utilisations). Ça se réinitialise à minuit ! ⏰"
                ),
            );
            result.daily_actions_used = Some(used_today);
            result.daily_limit = Some(daily_limit);
            result.suggested_action = Some(SuggestedAction::WaitReset);
            return Ok(result);
        }

        let mut result = AccessResult::granted(format!(
            "✓ C'est parti ! {used_today}/{daily_limit} utilisations aujourd'hui."
        ));
        result.daily_actions_used = Some(used_today);
        result.daily_limit = Some(daily_limit);
        Ok(result)
    }
}

/// The local midnight preceding now, as a UTC instant.
fn local_midnight_utc() -> DateTime<Utc> {
    let now = Local::now();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.with_timezone(&Utc)
        }
        chrono::LocalResult::None => Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    use crate::models::user::ProfileRow;
    use crate::stores::memory::{MemoryServiceConfigStore, MemoryUsageHistoryStore};

    fn service(code: ServiceCode, cost: i64) -> ServiceConfig {
        ServiceConfig {
            service_code: code.as_str().to_string(),
            display_name: "Générateur de CV IA".to_string(),
            is_active: true,
            credits_cost: cost,
            enable_premium_limits: false,
            premium_daily_limit: None,
        }
    }

    struct Fixture {
        policy: AccessPolicy,
        configs: Arc<MemoryServiceConfigStore>,
        usage: Arc<MemoryUsageHistoryStore>,
    }

    fn fixture() -> Fixture {
        let configs = Arc::new(MemoryServiceConfigStore::default());
        let usage = Arc::new(MemoryUsageHistoryStore::default());
        let policy = AccessPolicy::new(configs.clone(), usage.clone());
        Fixture {
            policy,
            configs,
            usage,
        }
    }

    fn premium_user(now: DateTime<Utc>) -> UserContext {
        UserContext::from_profile(
            &ProfileRow {
                id: Uuid::new_v4(),
                is_premium: true,
                premium_expiration: Some(now + Duration::days(30)),
                credits_balance: 0,
                user_type: Some("candidate".to_string()),
            },
            now,
        )
    }

    fn credit_user(balance: i64, now: DateTime<Utc>) -> UserContext {
        UserContext::from_profile(
            &ProfileRow {
                id: Uuid::new_v4(),
                is_premium: false,
                premium_expiration: None,
                credits_balance: balance,
                user_type: Some("candidate".to_string()),
            },
            now,
        )
    }

    #[tokio::test]
    async fn test_anonymous_user_is_denied_with_login_suggestion() {
        let f = fixture();
        let result = f
            .policy
            .check_access(ServiceCode::AiCvBuilder, &UserContext::anonymous())
            .await
            .unwrap();
        assert!(!result.allowed);
        assert_eq!(result.reason, AccessReason::NotAuthenticated);
        assert_eq!(result.suggested_action, Some(SuggestedAction::Login));
    }

    #[tokio::test]
    async fn test_unknown_service_is_not_found() {
        let f = fixture();
        let now = Utc::now();
        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &credit_user(100, now), now)
            .await
            .unwrap();
        assert_eq!(result.reason, AccessReason::ServiceNotFound);
        assert!(!result.allowed);
    }

    #[tokio::test]
    async fn test_inactive_service_is_reported_inactive_not_missing() {
        let f = fixture();
        let now = Utc::now();
        let mut config = service(ServiceCode::AiCvBuilder, 5);
        config.is_active = false;
        f.configs.insert(config);

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &credit_user(100, now), now)
            .await
            .unwrap();
        assert_eq!(result.reason, AccessReason::ServiceInactive);
    }

    #[tokio::test]
    async fn test_free_service_granted_regardless_of_balance() {
        let f = fixture();
        let now = Utc::now();
        f.configs.insert(service(ServiceCode::AiJobAlerts, 0));

        let result = f
            .policy
            .check_access_since(ServiceCode::AiJobAlerts, &credit_user(0, now), now)
            .await
            .unwrap();
        assert!(result.allowed);
        assert_eq!(result.reason, AccessReason::AccessGranted);
    }

    #[tokio::test]
    async fn test_insufficient_credits_reports_required_and_current() {
        let f = fixture();
        let now = Utc::now();
        f.configs.insert(service(ServiceCode::AiCoverLetter, 5));

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCoverLetter, &credit_user(2, now), now)
            .await
            .unwrap();
        assert!(!result.allowed);
        assert_eq!(result.reason, AccessReason::InsufficientCredits);
        assert_eq!(result.required_credits, Some(5));
        assert_eq!(result.current_credits, Some(2));
        assert_eq!(result.suggested_action, Some(SuggestedAction::BuyCredits));
    }

    #[tokio::test]
    async fn test_sufficient_credits_granted_with_cost_reported() {
        let f = fixture();
        let now = Utc::now();
        f.configs.insert(service(ServiceCode::AiCoverLetter, 5));

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCoverLetter, &credit_user(7, now), now)
            .await
            .unwrap();
        assert!(result.allowed);
        assert_eq!(result.required_credits, Some(5));
        assert_eq!(result.current_credits, Some(7));
    }

    #[tokio::test]
    async fn test_exact_balance_is_sufficient() {
        let f = fixture();
        let now = Utc::now();
        f.configs.insert(service(ServiceCode::AiCoverLetter, 5));

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCoverLetter, &credit_user(5, now), now)
            .await
            .unwrap();
        assert!(result.allowed);
    }

    #[tokio::test]
    async fn test_active_premium_without_limits_is_unlimited() {
        let f = fixture();
        let now = Utc::now();
        f.configs.insert(service(ServiceCode::AiCvBuilder, 5));

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &premium_user(now), now)
            .await
            .unwrap();
        assert!(result.allowed);
        assert!(result.daily_limit.is_none());
    }

    #[tokio::test]
    async fn test_premium_limit_of_zero_means_unlimited() {
        let f = fixture();
        let now = Utc::now();
        let mut config = service(ServiceCode::AiCvBuilder, 5);
        config.enable_premium_limits = true;
        config.premium_daily_limit = Some(0);
        f.configs.insert(config);

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &premium_user(now), now)
            .await
            .unwrap();
        assert!(result.allowed);
    }

    #[tokio::test]
    async fn test_premium_quota_reached_at_limit() {
        let f = fixture();
        let now = Utc::now();
        let day_start = now - Duration::hours(6);
        let mut config = service(ServiceCode::AiCvBuilder, 5);
        config.enable_premium_limits = true;
        config.premium_daily_limit = Some(5);
        f.configs.insert(config);

        let ctx = premium_user(now);
        let user_id = ctx.user_id.unwrap();
        for i in 0..5 {
            f.usage.record(
                user_id,
                ServiceCode::AiCvBuilder,
                day_start + Duration::minutes(i),
            );
        }

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &ctx, day_start)
            .await
            .unwrap();
        assert!(!result.allowed);
        assert_eq!(result.reason, AccessReason::PremiumQuotaReached);
        assert_eq!(result.daily_actions_used, Some(5));
        assert_eq!(result.daily_limit, Some(5));
        assert_eq!(result.suggested_action, Some(SuggestedAction::WaitReset));
    }

    #[tokio::test]
    async fn test_premium_under_quota_granted_with_counters() {
        let f = fixture();
        let now = Utc::now();
        let day_start = now - Duration::hours(6);
        let mut config = service(ServiceCode::AiCvBuilder, 5);
        config.enable_premium_limits = true;
        config.premium_daily_limit = Some(5);
        f.configs.insert(config);

        let ctx = premium_user(now);
        let user_id = ctx.user_id.unwrap();
        f.usage
            .record(user_id, ServiceCode::AiCvBuilder, day_start + Duration::minutes(1));
        // Usage from before the day start must not count.
        f.usage
            .record(user_id, ServiceCode::AiCvBuilder, day_start - Duration::hours(2));

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &ctx, day_start)
            .await
            .unwrap();
        assert!(result.allowed);
        assert_eq!(result.daily_actions_used, Some(1));
        assert_eq!(result.daily_limit, Some(5));
    }

    #[tokio::test]
    async fn test_expired_premium_suggests_renewal() {
        let f = fixture();
        let now = Utc::now();
        f.configs.insert(service(ServiceCode::AiCvBuilder, 5));

        let ctx = UserContext::from_profile(
            &ProfileRow {
                id: Uuid::new_v4(),
                is_premium: true,
                premium_expiration: Some(now - Duration::days(3)),
                credits_balance: 100,
                user_type: Some("candidate".to_string()),
            },
            now,
        );

        let result = f
            .policy
            .check_access_since(ServiceCode::AiCvBuilder, &ctx, now)
            .await
            .unwrap();
        assert!(!result.allowed);
        assert_eq!(result.reason, AccessReason::PremiumExpired);
        assert_eq!(result.suggested_action, Some(SuggestedAction::RenewPremium));
    }
}
