//! Access control for metered AI services: service codes, access results and
//! the remedial action buttons the front end renders on denial.

pub mod policy;

use serde::{Deserialize, Serialize};

/// Closed set of metered AI services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCode {
    AiCvBuilder,
    AiCvImprover,
    AiCvTargeted,
    AiCoverLetter,
    AiJobMatching,
    AiCareerCoaching,
    AiCareerPlan,
    AiInterviewSimulator,
    AiJobAlerts,
    AiChatbot,
    AiGoldProfile,
}

impl ServiceCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCode::AiCvBuilder => "ai_cv_builder",
            ServiceCode::AiCvImprover => "ai_cv_improver",
            ServiceCode::AiCvTargeted => "ai_cv_targeted",
            ServiceCode::AiCoverLetter => "ai_cover_letter",
            ServiceCode::AiJobMatching => "ai_job_matching",
            ServiceCode::AiCareerCoaching => "ai_career_coaching",
            ServiceCode::AiCareerPlan => "ai_career_plan",
            ServiceCode::AiInterviewSimulator => "ai_interview_simulator",
            ServiceCode::AiJobAlerts => "ai_job_alerts",
            ServiceCode::AiChatbot => "ai_chatbot",
            ServiceCode::AiGoldProfile => "ai_gold_profile",
        }
    }

    /// Maps a catalog route to its metered service, if any. Routes without a
    /// mapping (the AI hub page itself, for instance) are not metered.
    pub fn from_route(route: &str) -> Option<ServiceCode> {
        match route {
            "ai-cv-generator" => Some(ServiceCode::AiCvBuilder),
            "ai-cover-letter" => Some(ServiceCode::AiCoverLetter),
            "ai-matching" => Some(ServiceCode::AiJobMatching),
            "ai-coach" => Some(ServiceCode::AiCareerCoaching),
            "ai-career-plan" => Some(ServiceCode::AiCareerPlan),
            "ai-interview-simulator" => Some(ServiceCode::AiInterviewSimulator),
            "ai-alerts" => Some(ServiceCode::AiJobAlerts),
            "ai-chat" => Some(ServiceCode::AiChatbot),
            "gold-profile" => Some(ServiceCode::AiGoldProfile),
            _ => None,
        }
    }

    pub fn is_ai_service_route(route: &str) -> bool {
        ServiceCode::from_route(route).is_some()
    }
}

/// Why an access decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    AccessGranted,
    NotAuthenticated,
    InsufficientCredits,
    PremiumQuotaReached,
    ServiceInactive,
    PremiumExpired,
    ServiceNotFound,
}

/// Remedial action the front end should offer after a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    BuyCredits,
    SubscribePremium,
    RenewPremium,
    WaitReset,
    Login,
}

/// Outcome of one access evaluation. Carries everything the caller needs to
/// render a message and an action button without further logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessResult {
    pub allowed: bool,
    pub reason: AccessReason,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_credits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_credits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_actions_used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<SuggestedAction>,
}

impl AccessResult {
    pub fn granted(message: String) -> Self {
        AccessResult {
            allowed: true,
            reason: AccessReason::AccessGranted,
            message,
            required_credits: None,
            current_credits: None,
            daily_actions_used: None,
            daily_limit: None,
            suggested_action: None,
        }
    }

    pub fn denied(reason: AccessReason, message: String) -> Self {
        AccessResult {
            allowed: false,
            reason,
            message,
            required_credits: None,
            current_credits: None,
            daily_actions_used: None,
            daily_limit: None,
            suggested_action: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub action: String,
    pub variant: ButtonVariant,
}

impl ActionButton {
    fn new(label: &str, action: &str, variant: ButtonVariant) -> Self {
        ActionButton {
            label: label.to_string(),
            action: action.to_string(),
            variant,
        }
    }
}

/// Maps a denial to its remedial buttons: one primary and at most one
/// secondary. Granted results get no buttons.
pub fn get_action_buttons(result: &AccessResult) -> Vec<ActionButton> {
    if result.allowed {
        return vec![];
    }

    match result.suggested_action {
        Some(SuggestedAction::Login) => vec![ActionButton::new(
            "Se connecter",
            "navigate:auth",
            ButtonVariant::Primary,
        )],
        Some(SuggestedAction::BuyCredits) => vec![
            ActionButton::new(
                "Acheter des crédits",
                "navigate:credit-store",
                ButtonVariant::Primary,
            ),
            ActionButton::new(
                "Passer Premium PRO+",
                "navigate:premium-subscribe",
                ButtonVariant::Secondary,
            ),
        ],
        Some(SuggestedAction::SubscribePremium) => vec![ActionButton::new(
            "Découvrir Premium PRO+",
            "navigate:premium-subscribe",
            ButtonVariant::Primary,
        )],
        Some(SuggestedAction::RenewPremium) => vec![ActionButton::new(
            "Renouveler Premium",
            "navigate:premium-subscribe",
            ButtonVariant::Primary,
        )],
        Some(SuggestedAction::WaitReset) => vec![ActionButton::new(
            "Voir d'autres services",
            "navigate:premium-ai-services",
            ButtonVariant::Secondary,
        )],
        None => vec![],
    }
}
