//! Turn pipeline: one inbound chat message in, one structured outcome out.
//!
//! Stage order is fixed: kill switch, sanitization, rate limiting, session
//! accounting, repeat detection, user-context resolution, intent matching,
//! composition, then best-effort logging. Failures in the conversation log
//! never fail the turn.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::policy::AccessPolicy;
use crate::access::{get_action_buttons, ActionButton, ServiceCode};
use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::guard::rate_limit::RateLimiter;
use crate::guard::sanitizer::full_sanitization;
use crate::models::user::UserContext;
use crate::nav::composer::{can_user_access, compose_navigation_response, ComposedResponse};
use crate::nav::matcher::detect_intent;
use crate::session::{generate_session_id, SessionStore};
use crate::stores::{ConversationLog, ConversationLogEntry, ProfileStore};

const DISABLED_MESSAGE: &str =
    "L'assistant est momentanément désactivé. Réessayez un peu plus tard.";

const CANCELLED_MESSAGE: &str = "D'accord, je reste là si vous avez besoin de moi ! 😊";

/// Intent key recorded when a turn ends in a reformulation prompt.
const CLARIFICATION_INTENT: &str = "clarification_needed";

/// Rotated deterministically by message count when the same question keeps
/// coming back.
const REFORMULATION_PROMPTS: &[&str] = &[
    "Je remarque que vous posez la même question. Essayons autrement : que souhaitez-vous faire exactement ?",
    "Reformulons ensemble. Cherchez-vous une page ou un service en particulier ?",
    "Je n'arrive pas à vous aider sur cette demande. Pouvez-vous la formuler avec d'autres mots ?",
    "Dites-moi en quelques mots différents ce que vous recherchez, je vous guiderai.",
];

#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    /// Absent on the first message of an anonymous conversation; the reply
    /// carries the generated id back.
    pub session_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub message: String,
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub intent_key: String,
    pub confirmed: bool,
}

/// Outcome of one message turn. Guard rejections are outcomes, not errors,
/// so the front end always gets a renderable body with a 200.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    Disabled {
        message: String,
    },
    InvalidInput {
        message: String,
    },
    RateLimited {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        wait_secs: Option<i64>,
    },
    Reply {
        session_id: String,
        response: ComposedResponse,
    },
}

/// Outcome of a navigation confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    Resolved { route: String, message: String },
    Denied { message: String, buttons: Vec<ActionButton> },
    Cancelled { message: String },
}

pub struct ChatPipeline {
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    limiter: Arc<RateLimiter>,
    policy: Arc<AccessPolicy>,
    profiles: Arc<dyn ProfileStore>,
    log: Arc<dyn ConversationLog>,
    enabled: bool,
}

impl ChatPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        limiter: Arc<RateLimiter>,
        policy: Arc<AccessPolicy>,
        profiles: Arc<dyn ProfileStore>,
        log: Arc<dyn ConversationLog>,
        enabled: bool,
    ) -> Self {
        ChatPipeline {
            catalog,
            sessions,
            limiter,
            policy,
            profiles,
            log,
            enabled,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs one full message turn.
    pub async fn handle_message(&self, req: TurnRequest) -> Result<TurnOutcome, AppError> {
        if !self.enabled {
            return Ok(TurnOutcome::Disabled {
                message: DISABLED_MESSAGE.to_string(),
            });
        }

        let session_id = req
            .session_id
            .clone()
            .unwrap_or_else(generate_session_id);

        let sanitized = full_sanitization(&req.message);
        if !sanitized.is_valid {
            return Ok(TurnOutcome::InvalidInput {
                message: sanitized
                    .error
                    .unwrap_or_else(|| "Message invalide.".to_string()),
            });
        }
        let message = sanitized.sanitized;

        // Anonymous visitors have no stable identity to key the limiter on;
        // only authenticated traffic is rate limited.
        if let Some(user_id) = req.user_id {
            let outcome = self.limiter.check(user_id);
            if !outcome.allowed {
                return Ok(TurnOutcome::RateLimited {
                    message: outcome
                        .reason
                        .unwrap_or_else(|| "Trop de messages envoyés.".to_string()),
                    wait_secs: outcome.wait_secs,
                });
            }
        }

        let message_count = self.sessions.increment_message_count(&session_id);

        if self.sessions.is_repeated(&session_id, &message) {
            let prompt =
                REFORMULATION_PROMPTS[(message_count as usize) % REFORMULATION_PROMPTS.len()];
            let response = ComposedResponse::Clarification {
                message: prompt.to_string(),
            };
            self.finish_turn(&req, &session_id, &message, &response, Some(CLARIFICATION_INTENT))
                .await;
            return Ok(TurnOutcome::Reply {
                session_id,
                response,
            });
        }

        let ctx = self.resolve_user_context(req.user_id).await?;

        let detection = detect_intent(&self.catalog, &message, ctx.as_ref());
        tracing::debug!(
            session_id = %session_id,
            intent = detection.intent.as_ref().map(|i| i.key.as_str()),
            confidence = detection.confidence,
            "intent detected"
        );

        let response = compose_navigation_response(&detection, ctx.as_ref(), &self.policy).await?;

        let intent_key = response.intent_key().map(str::to_string);
        self.finish_turn(&req, &session_id, &message, &response, intent_key.as_deref())
            .await;

        Ok(TurnOutcome::Reply {
            session_id,
            response,
        })
    }

    /// Resolves a user's "yes, take me there" (or refusal) for an intent the
    /// assistant previously proposed. Requirements are re-checked here; the
    /// user's situation may have changed since the proposal.
    pub async fn confirm(&self, req: ConfirmRequest) -> Result<ConfirmOutcome, AppError> {
        if !req.confirmed {
            return Ok(ConfirmOutcome::Cancelled {
                message: CANCELLED_MESSAGE.to_string(),
            });
        }

        let intent = self
            .catalog
            .lookup(&req.intent_key)
            .ok_or_else(|| AppError::NotFound(format!("intent '{}'", req.intent_key)))?
            .clone();

        let ctx = self
            .resolve_user_context(req.user_id)
            .await?
            .unwrap_or_else(UserContext::anonymous);

        if let Err(denial) = can_user_access(&intent, &ctx) {
            return Ok(ConfirmOutcome::Denied {
                message: denial,
                buttons: vec![],
            });
        }

        if let Some(service_code) = ServiceCode::from_route(&intent.route) {
            let result = self.policy.check_access(service_code, &ctx).await?;
            if !result.allowed {
                let buttons = get_action_buttons(&result);
                return Ok(ConfirmOutcome::Denied {
                    message: result.message,
                    buttons,
                });
            }
        }

        self.sessions.record_exchange(
            &req.session_id,
            &format!("[confirmation: {}]", intent.key),
            &intent.route,
            Some(&intent.key),
        );

        Ok(ConfirmOutcome::Resolved {
            route: intent.route.clone(),
            message: format!("C'est parti pour **{}** !", intent.display_name),
        })
    }

    async fn resolve_user_context(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Option<UserContext>, AppError> {
        let Some(user_id) = user_id else {
            return Ok(Some(UserContext::anonymous()));
        };
        match self.profiles.fetch(user_id).await? {
            Some(profile) => Ok(Some(UserContext::from_profile(&profile, Utc::now()))),
            // A claimed id without a profile row gets anonymous treatment.
            None => Ok(Some(UserContext::anonymous())),
        }
    }

    /// Records the exchange in the session and appends to the durable log.
    /// The log write is best effort; a failure is logged and swallowed.
    async fn finish_turn(
        &self,
        req: &TurnRequest,
        session_id: &str,
        message: &str,
        response: &ComposedResponse,
        intent_key: Option<&str>,
    ) {
        self.sessions
            .record_exchange(session_id, message, response.message(), intent_key);

        let entry = ConversationLogEntry {
            user_id: req.user_id,
            session_id: session_id.to_string(),
            user_text: message.to_string(),
            bot_text: response.message().to_string(),
            intent_detected: intent_key.map(str::to_string),
            page_url: req.page_url.clone(),
            timestamp: Utc::now(),
        };
        if let Err(err) = self.log.append(&entry).await {
            tracing::warn!(session_id = %session_id, "conversation log append failed: {err}");
        }
    }
}
