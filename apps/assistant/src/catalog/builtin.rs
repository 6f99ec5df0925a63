//! Built-in destination table for the marketplace. Labels are the French
//! trigger phrases users actually type; keep them lowercase.

use anyhow::Result;

use crate::catalog::{Catalog, Category, Intent};
use crate::models::user::UserType;

struct Spec {
    key: &'static str,
    route: &'static str,
    display_name: &'static str,
    description: &'static str,
    labels: &'static [&'static str],
    category: Category,
    requires_auth: bool,
    requires_premium: bool,
    requires_admin: bool,
    user_types: &'static [UserType],
}

const OPEN: Spec = Spec {
    key: "",
    route: "",
    display_name: "",
    description: "",
    labels: &[],
    category: Category::Main,
    requires_auth: false,
    requires_premium: false,
    requires_admin: false,
    user_types: &[],
};

const ADMIN_ONLY: Spec = Spec {
    requires_auth: true,
    requires_admin: true,
    user_types: &[UserType::Admin],
    category: Category::Admin,
    ..OPEN
};

const AI_SERVICE: Spec = Spec {
    requires_auth: true,
    category: Category::AiServices,
    ..OPEN
};

#[rustfmt::skip]
const DESTINATIONS: &[Spec] = &[
    Spec {
        key: "home",
        route: "home",
        display_name: "Accueil",
        description: "Page d'accueil de la plateforme",
        labels: &["accueil", "home", "page d'accueil", "retour accueil", "retourner à l'accueil"],
        ..OPEN
    },
    Spec {
        key: "jobs",
        route: "jobs",
        display_name: "Offres d'emploi",
        description: "Consulter toutes les offres d'emploi disponibles",
        labels: &[
            "offres", "offres d'emploi", "emplois", "jobs", "postes",
            "rechercher un emploi", "trouver un emploi", "voir les offres",
            "opportunités", "vacances", "recrutement",
        ],
        ..OPEN
    },
    Spec {
        key: "cvtheque",
        route: "cvtheque",
        display_name: "CVthèque",
        description: "Base de données de CV de candidats",
        labels: &[
            "cvthèque", "cvtheque", "base de cv", "talents",
            "chercher des candidats", "trouver des profils",
        ],
        requires_auth: true,
        user_types: &[UserType::Recruiter, UserType::Admin],
        ..OPEN
    },
    Spec {
        key: "formations",
        route: "formations",
        display_name: "Formations",
        description: "Découvrir les formations disponibles",
        labels: &[
            "formations", "formation", "cours", "apprentissage",
            "se former", "apprendre", "développer mes compétences",
        ],
        ..OPEN
    },
    Spec {
        key: "blog",
        route: "blog",
        display_name: "Blog",
        description: "Articles et conseils carrière",
        labels: &["blog", "articles", "conseils", "actualités", "news"],
        ..OPEN
    },
    Spec {
        key: "candidateDashboard",
        route: "candidate-dashboard",
        display_name: "Tableau de bord candidat",
        description: "Votre espace personnel candidat",
        labels: &[
            "dashboard", "tableau de bord", "mon espace", "mon compte",
            "espace candidat", "mon dashboard", "mes candidatures",
            "mes offres sauvegardées", "mes alertes",
        ],
        category: Category::Dashboard,
        requires_auth: true,
        user_types: &[UserType::Candidate],
        ..OPEN
    },
    Spec {
        key: "recruiterDashboard",
        route: "recruiter-dashboard",
        display_name: "Tableau de bord recruteur",
        description: "Votre espace recruteur",
        labels: &[
            "dashboard recruteur", "espace recruteur", "mes offres",
            "gérer mes offres", "mes candidatures reçues", "analytics",
        ],
        category: Category::Dashboard,
        requires_auth: true,
        user_types: &[UserType::Recruiter],
        ..OPEN
    },
    Spec {
        key: "trainerDashboard",
        route: "trainer-dashboard",
        display_name: "Tableau de bord formateur",
        description: "Votre espace formateur",
        labels: &[
            "dashboard formateur", "espace formateur", "mes formations",
            "gérer mes formations", "mes apprenants",
        ],
        category: Category::Dashboard,
        requires_auth: true,
        user_types: &[UserType::Trainer],
        ..OPEN
    },
    Spec {
        key: "profile",
        route: "candidate-profile-form",
        display_name: "Mon profil",
        description: "Modifier et compléter votre profil professionnel",
        labels: &[
            "profil", "mon profil", "modifier mon profil", "éditer profil",
            "compléter profil", "mettre à jour profil", "informations personnelles",
        ],
        category: Category::Profile,
        requires_auth: true,
        user_types: &[UserType::Candidate],
        ..OPEN
    },
    Spec {
        key: "premiumSubscribe",
        route: "premium-subscribe",
        display_name: "Abonnement Premium",
        description: "Passer à Premium PRO+ pour un accès illimité",
        labels: &[
            "premium", "abonnement", "passer premium", "devenir premium",
            "pro+", "premium pro+", "s'abonner", "forfait premium",
            "accès illimité", "upgrade",
        ],
        category: Category::Premium,
        ..OPEN
    },
    Spec {
        key: "premiumAI",
        route: "premium-ai",
        display_name: "Services IA Premium",
        description: "Tous les services d'intelligence artificielle",
        labels: &[
            "services ia", "services premium", "services d'ia",
            "intelligence artificielle", "outils ia", "hub ia",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiCVGenerator",
        route: "ai-cv-generator",
        display_name: "Générateur de CV IA",
        description: "Créer un CV professionnel avec l'IA",
        labels: &[
            "cv ia", "générer cv", "créer cv", "cv intelligent",
            "générateur cv", "créer mon cv", "faire un cv",
            "cv automatique", "cv avec ia",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiCoverLetter",
        route: "ai-cover-letter",
        display_name: "Générateur de lettre de motivation IA",
        description: "Créer une lettre de motivation percutante",
        labels: &[
            "lettre motivation", "lettre ia", "générer lettre",
            "créer lettre motivation", "lettre de motivation intelligente",
            "cover letter", "motivation ia",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiMatching",
        route: "ai-matching",
        display_name: "Matching IA",
        description: "Analyser votre compatibilité avec une offre",
        labels: &[
            "matching", "compatibilité", "analyser offre",
            "matching ia", "voir ma compatibilité", "analyse offre",
            "score de compatibilité",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiCareerPlan",
        route: "ai-career-plan",
        display_name: "Plan de carrière IA",
        description: "Obtenir un plan de carrière personnalisé",
        labels: &[
            "plan carrière", "carrière ia", "évolution carrière",
            "plan de développement", "conseils carrière", "trajectoire professionnelle",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiCoach",
        route: "ai-coach",
        display_name: "Coach IA",
        description: "Coaching professionnel personnalisé par IA",
        labels: &[
            "coach", "coach ia", "coaching", "mentor ia",
            "conseils personnalisés", "accompagnement carrière",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiInterviewSimulator",
        route: "ai-interview-simulator",
        display_name: "Simulateur d'entretien IA",
        description: "Préparer vos entretiens avec des simulations",
        labels: &[
            "simulateur entretien", "simulation entretien", "entretien ia",
            "préparer entretien", "entrainement entretien", "mock interview",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiAlerts",
        route: "ai-alerts",
        display_name: "Alertes IA",
        description: "Gérer vos alertes emploi intelligentes",
        labels: &[
            "alertes", "alertes ia", "notifications emploi",
            "mes alertes", "configurer alertes", "alertes intelligentes",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "aiChat",
        route: "ai-chat",
        display_name: "Chat IA",
        description: "Discuter avec l'assistant IA",
        labels: &[
            "chat ia", "discuter ia", "assistant ia",
            "conversation ia", "parler avec ia",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "goldProfile",
        route: "gold-profile",
        display_name: "Profil Gold",
        description: "Service de création de profil premium optimisé",
        labels: &[
            "profil gold", "gold profile", "profil premium",
            "optimiser profil", "profil optimisé",
        ],
        ..AI_SERVICE
    },
    Spec {
        key: "creditStore",
        route: "credit-store",
        display_name: "Boutique de crédits",
        description: "Acheter des crédits IA",
        labels: &[
            "crédits", "acheter crédits", "boutique crédits",
            "acheter des crédits", "recharger crédits", "packs de crédits",
            "crédits ia", "store",
        ],
        category: Category::Premium,
        requires_auth: true,
        ..OPEN
    },
    Spec {
        key: "cmsAdmin",
        route: "cms-admin",
        display_name: "Administration CMS",
        description: "Gérer le contenu du site",
        labels: &[
            "cms", "admin cms", "administration", "gestion contenu",
            "panneau admin",
        ],
        ..ADMIN_ONLY
    },
    Spec {
        key: "userManagement",
        route: "user-management",
        display_name: "Gestion des utilisateurs",
        description: "Administrer les comptes utilisateurs",
        labels: &[
            "utilisateurs", "gestion utilisateurs", "admin users",
            "gérer utilisateurs", "comptes",
        ],
        ..ADMIN_ONLY
    },
    Spec {
        key: "adminCreditsIA",
        route: "admin-credits-ia",
        display_name: "Gestion des crédits IA",
        description: "Administrer les crédits et transactions",
        labels: &["admin crédits", "gestion crédits", "crédits ia admin"],
        ..ADMIN_ONLY
    },
    Spec {
        key: "adminChatbot",
        route: "admin-chatbot",
        display_name: "Configuration Chatbot",
        description: "Configurer le chatbot et ses réponses",
        labels: &["admin chatbot", "configurer chatbot", "paramètres chatbot"],
        ..ADMIN_ONLY
    },
];

/// Builds the full marketplace catalog.
pub fn builtin_catalog() -> Result<Catalog> {
    let intents = DESTINATIONS
        .iter()
        .map(|spec| Intent {
            key: spec.key.to_string(),
            route: spec.route.to_string(),
            display_name: spec.display_name.to_string(),
            description: spec.description.to_string(),
            labels: spec.labels.iter().map(|l| l.to_string()).collect(),
            category: spec.category,
            requires_auth: spec.requires_auth,
            requires_premium: spec.requires_premium,
            requires_admin: spec.requires_admin,
            user_types: spec.user_types.to_vec(),
        })
        .collect();
    Catalog::new(intents)
}
