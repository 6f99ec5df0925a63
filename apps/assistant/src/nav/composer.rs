//! Response Composer: turns a detection result into the structured reply a
//! chat front end renders. Every outcome is one tagged variant, so callers
//! dispatch on the tag instead of probing optional fields.

use crate::access::policy::AccessPolicy;
use crate::access::{get_action_buttons, ActionButton, ServiceCode};
use crate::catalog::{Category, Intent};
use crate::errors::AppError;
use crate::models::user::UserContext;
use crate::nav::matcher::DetectionResult;

use serde::Serialize;

/// Below this confidence the matcher result is treated as noise.
pub const CLARIFICATION_THRESHOLD: f64 = 0.3;
/// At or above this the user is asked to confirm before navigating.
pub const CONFIRMATION_THRESHOLD: f64 = 0.6;
/// At or above this navigation fires automatically after a countdown.
pub const AUTO_NAVIGATE_THRESHOLD: f64 = 0.75;
pub const AUTO_NAVIGATE_DELAY_MS: u64 = 3000;

const CLARIFICATION_MESSAGE: &str =
    "Je n'ai pas bien compris où vous souhaitez aller. Pouvez-vous reformuler votre demande ?";

/// One composed turn, tagged by outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComposedResponse {
    Clarification {
        message: String,
    },
    AlternativesOffered {
        message: String,
        intent: Intent,
        alternatives: Vec<Intent>,
    },
    ConfirmationRequested {
        message: String,
        intent: Intent,
    },
    AutoNavigate {
        message: String,
        intent: Intent,
        auto_navigate_delay_ms: u64,
    },
    AccessDenied {
        message: String,
        buttons: Vec<ActionButton>,
    },
}

impl ComposedResponse {
    fn clarification() -> Self {
        ComposedResponse::Clarification {
            message: CLARIFICATION_MESSAGE.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ComposedResponse::Clarification { message }
            | ComposedResponse::AlternativesOffered { message, .. }
            | ComposedResponse::ConfirmationRequested { message, .. }
            | ComposedResponse::AutoNavigate { message, .. }
            | ComposedResponse::AccessDenied { message, .. } => message,
        }
    }

    /// Key of the intent this response points at, when it points at one.
    pub fn intent_key(&self) -> Option<&str> {
        match self {
            ComposedResponse::AlternativesOffered { intent, .. }
            | ComposedResponse::ConfirmationRequested { intent, .. }
            | ComposedResponse::AutoNavigate { intent, .. } => Some(&intent.key),
            _ => None,
        }
    }
}

/// Checks the catalog-level requirements of `intent` against `ctx`. Returns
/// the denial sentence when one is violated. Metered credit/quota rules are
/// the policy evaluator's job, not this one's.
pub fn can_user_access(intent: &Intent, ctx: &UserContext) -> Result<(), String> {
    if intent.requires_auth && !ctx.is_authenticated {
        return Err("Vous devez être connecté pour accéder à cette page.".to_string());
    }
    if intent.requires_admin && !ctx.is_admin() {
        return Err("Cette page est réservée aux administrateurs.".to_string());
    }
    if intent.requires_premium && !ctx.is_premium_active {
        return Err(
            "Cette fonctionnalité nécessite un abonnement Premium PRO+.".to_string(),
        );
    }
    if let Some(user_type) = ctx.user_type {
        if !intent.user_types.is_empty() && !intent.allows_user_type(user_type) {
            let types = intent
                .user_types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(format!("Cette page est réservée aux {types}."));
        }
    }
    Ok(())
}

/// Composes the reply for one detection result.
///
/// Order of concerns: confidence floor, catalog-level access, metered-service
/// policy, then confidence tiering on the suggestion text.
pub async fn compose_navigation_response(
    detection: &DetectionResult,
    ctx: Option<&UserContext>,
    policy: &AccessPolicy,
) -> Result<ComposedResponse, AppError> {
    let intent = match &detection.intent {
        Some(intent) if detection.confidence >= CLARIFICATION_THRESHOLD => intent,
        _ => return Ok(ComposedResponse::clarification()),
    };

    if let Some(ctx) = ctx {
        if let Err(denial) = can_user_access(intent, ctx) {
            return Ok(ComposedResponse::AccessDenied {
                message: denial_with_remedy(intent, ctx, denial),
                buttons: vec![],
            });
        }

        if let Some(service_code) = ServiceCode::from_route(&intent.route) {
            let result = policy.check_access(service_code, ctx).await?;
            if !result.allowed {
                let buttons = get_action_buttons(&result);
                return Ok(ComposedResponse::AccessDenied {
                    message: result.message,
                    buttons,
                });
            }
        }
    }

    let suggestion = navigation_suggestion(intent, ctx);
    Ok(tiered_response(detection, intent, suggestion))
}

fn tiered_response(
    detection: &DetectionResult,
    intent: &Intent,
    suggestion: String,
) -> ComposedResponse {
    let confidence = detection.confidence;

    if (CONFIRMATION_THRESHOLD..AUTO_NAVIGATE_THRESHOLD).contains(&confidence) {
        return ComposedResponse::ConfirmationRequested {
            message: format!(
                "{suggestion}\n\n✨ Souhaitez-vous que je vous y amène maintenant ?"
            ),
            intent: intent.clone(),
        };
    }

    if confidence < CONFIRMATION_THRESHOLD && !detection.alternatives.is_empty() {
        let mut message = format!("{suggestion}\n\nVouliez-vous peut-être accéder à :");
        for alt in &detection.alternatives {
            message.push_str(&format!("\n- {}", alt.display_name));
        }
        return ComposedResponse::AlternativesOffered {
            message,
            intent: intent.clone(),
            alternatives: detection.alternatives.clone(),
        };
    }

    if confidence >= AUTO_NAVIGATE_THRESHOLD {
        return ComposedResponse::AutoNavigate {
            message: format!(
                "{suggestion}\n\n🚀 Je vous redirige dans 3 secondes... (Cliquez sur \"Annuler\" si vous ne souhaitez pas y aller)"
            ),
            intent: intent.clone(),
            auto_navigate_delay_ms: AUTO_NAVIGATE_DELAY_MS,
        };
    }

    ComposedResponse::ConfirmationRequested {
        message: suggestion,
        intent: intent.clone(),
    }
}

/// Suggestion sentence for the matched page, with category-specific flavor.
fn navigation_suggestion(intent: &Intent, ctx: Option<&UserContext>) -> String {
    let base = format!("Je peux vous diriger vers **{}**. ", intent.display_name);

    let detail = match intent.category {
        Category::AiServices => {
            let premium = ctx.map(|c| c.is_premium_active).unwrap_or(false);
            if premium {
                format!(
                    "{} En tant que membre Premium PRO+, vous avez un accès illimité à ce service.",
                    intent.description
                )
            } else {
                format!(
                    "{} Ce service consomme des crédits IA.",
                    intent.description
                )
            }
        }
        Category::Dashboard => format!(
            "{} Vous y trouverez toutes vos informations et actions importantes.",
            intent.description
        ),
        Category::Profile => format!(
            "{} Un profil complet augmente vos chances d'être remarqué.",
            intent.description
        ),
        Category::Main | Category::Premium | Category::Admin => intent.description.clone(),
    };

    format!("{base}{detail}")
}

/// Appends the relevant next-step sentence to a catalog-level denial.
fn denial_with_remedy(intent: &Intent, ctx: &UserContext, denial: String) -> String {
    let mut message = denial;
    if intent.requires_auth && !ctx.is_authenticated {
        message.push_str(" Connectez-vous pour accéder à cette fonctionnalité.");
    }
    if intent.requires_premium && !ctx.is_premium_active {
        message.push_str(" Passez à Premium PRO+ pour débloquer cet accès illimité.");
    }
    message
}
