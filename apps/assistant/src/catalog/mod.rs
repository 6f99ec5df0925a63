//! Intent Catalog: the static table of navigable destinations and their
//! access requirements. Built once at startup, read-only afterwards.

pub mod builtin;
pub mod handlers;

use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::user::UserType;

/// Destination grouping, used for catalog browsing and suggestion phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "main")]
    Main,
    #[serde(rename = "dashboard")]
    Dashboard,
    #[serde(rename = "ai-services")]
    AiServices,
    #[serde(rename = "premium")]
    Premium,
    #[serde(rename = "profile")]
    Profile,
    #[serde(rename = "admin")]
    Admin,
}

impl Category {
    /// Human heading for the category, as shown in the catalog browser.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Main => "Navigation principale",
            Category::Dashboard => "Tableaux de bord",
            Category::AiServices => "Services IA",
            Category::Premium => "Premium",
            Category::Profile => "Profil",
            Category::Admin => "Administration",
        }
    }
}

/// One navigable destination: trigger labels plus access requirements.
///
/// `user_types` empty means the destination is open to every role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub key: String,
    pub route: String,
    pub display_name: String,
    pub description: String,
    pub labels: Vec<String>,
    pub category: Category,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub requires_premium: bool,
    #[serde(default)]
    pub requires_admin: bool,
    #[serde(default)]
    pub user_types: Vec<UserType>,
}

impl Intent {
    /// True when `user_type` may see this destination (no restriction, or the
    /// role is listed).
    pub fn allows_user_type(&self, user_type: UserType) -> bool {
        self.user_types.is_empty() || self.user_types.contains(&user_type)
    }
}

/// Immutable intent table with key-based lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    intents: Vec<Intent>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, enforcing the table invariants: unique keys and at
    /// least one trigger label per intent.
    pub fn new(intents: Vec<Intent>) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(intents.len());
        for (idx, intent) in intents.iter().enumerate() {
            if intent.labels.is_empty() {
                bail!("intent '{}' has no trigger labels", intent.key);
            }
            if by_key.insert(intent.key.clone(), idx).is_some() {
                bail!("duplicate intent key '{}'", intent.key);
            }
        }
        Ok(Catalog { intents, by_key })
    }

    pub fn lookup(&self, key: &str) -> Option<&Intent> {
        self.by_key.get(key).map(|&idx| &self.intents[idx])
    }

    pub fn all(&self) -> &[Intent] {
        &self.intents
    }

    pub fn by_category(&self, category: Category) -> Vec<&Intent> {
        self.intents
            .iter()
            .filter(|i| i.category == category)
            .collect()
    }

    pub fn for_user_type(&self, user_type: UserType) -> Vec<&Intent> {
        self.intents
            .iter()
            .filter(|i| i.allows_user_type(user_type))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_catalog;

    fn bare_intent(key: &str) -> Intent {
        Intent {
            key: key.to_string(),
            route: key.to_string(),
            display_name: key.to_string(),
            description: String::new(),
            labels: vec![key.to_string()],
            category: Category::Main,
            requires_auth: false,
            requires_premium: false,
            requires_admin: false,
            user_types: vec![],
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = Catalog::new(vec![bare_intent("jobs"), bare_intent("jobs")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_labels_rejected() {
        let mut intent = bare_intent("jobs");
        intent.labels.clear();
        assert!(Catalog::new(vec![intent]).is_err());
    }

    #[test]
    fn test_lookup_hits_and_misses() {
        let catalog = builtin_catalog().unwrap();
        assert!(catalog.lookup("jobs").is_some());
        assert!(catalog.lookup("cvtheque").is_some());
        assert!(catalog.lookup("no-such-page").is_none());
    }

    #[test]
    fn test_by_category_groups_admin_pages() {
        let catalog = builtin_catalog().unwrap();
        let admin = catalog.by_category(Category::Admin);
        assert!(admin.len() >= 4);
        assert!(admin.iter().all(|i| i.requires_admin));
    }

    #[test]
    fn test_for_user_type_filters_restricted_intents() {
        let catalog = builtin_catalog().unwrap();
        let candidate = catalog.for_user_type(UserType::Candidate);
        assert!(candidate.iter().any(|i| i.key == "jobs"));
        assert!(candidate.iter().all(|i| i.key != "cvtheque"));

        let recruiter = catalog.for_user_type(UserType::Recruiter);
        assert!(recruiter.iter().any(|i| i.key == "cvtheque"));
        assert!(recruiter.iter().all(|i| i.key != "candidateDashboard"));
    }

    #[test]
    fn test_category_serde_uses_kebab_slugs() {
        assert_eq!(
            serde_json::to_string(&Category::AiServices).unwrap(),
            "\"ai-services\""
        );
        assert_eq!(serde_json::to_string(&Category::Main).unwrap(), "\"main\"");
    }
}
