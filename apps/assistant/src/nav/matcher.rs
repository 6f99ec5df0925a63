//! Intent Matcher: scores free text against the catalog.
//!
//! Pure and deterministic for identical (text, ctx, catalog); ties keep
//! catalog order. Scoring table:
//!
//! | signal                                            | weight            |
//! |---------------------------------------------------|-------------------|
//! | full label phrase occurs as substring             | 10 × label words  |
//! | label word found among text words (either-way     | 5 per word        |
//! |   substring containment counts)                   |                   |
//! | generic navigation verb present                   | 2                 |
//! | generic request phrase present                    | 1                 |
//!
//! Confidence = min(score / 50, 1). The weights and divisor are inherited
//! constants with no stated derivation; their relative ordering matters,
//! their absolute values are candidates for recalibration against real
//! usage logs.

use serde::Serialize;

use crate::catalog::{Catalog, Intent};
use crate::models::user::UserContext;

pub const LABEL_PHRASE_WEIGHT: u32 = 10;
pub const LABEL_WORD_WEIGHT: u32 = 5;
pub const NAV_VERB_BONUS: u32 = 2;
pub const REQUEST_PHRASE_BONUS: u32 = 1;
pub const CONFIDENCE_DIVISOR: f64 = 50.0;
/// An alternative is kept when its score is at least this share of the top.
pub const ALTERNATIVE_RATIO: f64 = 0.7;
pub const MAX_ALTERNATIVES: usize = 2;

const NAV_VERBS: &[&str] = &["aller", "ouvrir", "voir"];
const REQUEST_PHRASES: &[&str] = &["je veux", "j'aimerais", "peux-tu"];

/// Broader phrasing that signals the user wants to go somewhere, used by
/// [`has_navigation_intent`] to pre-screen messages.
const NAVIGATION_KEYWORDS: &[&str] = &[
    "aller",
    "ouvrir",
    "voir",
    "accéder",
    "aller à",
    "aller sur",
    "ouvre",
    "ouvrir la page",
    "je veux aller",
    "amène-moi",
    "diriger vers",
    "naviguer vers",
    "page",
    "espace",
    "je cherche",
    "où est",
    "où se trouve",
    "comment accéder",
];

/// Ranked match for one message.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub intent: Option<Intent>,
    /// Matcher certainty for the top intent, in [0, 1].
    pub confidence: f64,
    /// Labels of the top intent that matched in full.
    pub matched_labels: Vec<String>,
    /// Up to [`MAX_ALTERNATIVES`] next-ranked intents scoring within
    /// [`ALTERNATIVE_RATIO`] of the top.
    pub alternatives: Vec<Intent>,
}

impl DetectionResult {
    fn no_match() -> Self {
        DetectionResult {
            intent: None,
            confidence: 0.0,
            matched_labels: vec![],
            alternatives: vec![],
        }
    }
}

/// Scores `text` against every catalog intent and returns the ranked match.
///
/// When `ctx` is supplied, an intent whose auth/admin/user-type requirement
/// the user violates is zeroed outright. This is a coarse pre-filter; the
/// composer re-applies the full access check on the winner.
pub fn detect_intent(
    catalog: &Catalog,
    text: &str,
    ctx: Option<&UserContext>,
) -> DetectionResult {
    let message = text.to_lowercase().trim().to_string();
    let words: Vec<&str> = message.split_whitespace().collect();

    let has_nav_verb = NAV_VERBS.iter().any(|v| message.contains(v));
    let has_request_phrase = REQUEST_PHRASES.iter().any(|p| message.contains(p));

    let mut scored: Vec<(u32, &Intent, Vec<String>)> = Vec::new();

    for intent in catalog.all() {
        let mut score = 0u32;
        let mut matched_labels: Vec<String> = Vec::new();

        for label in &intent.labels {
            let label_words: Vec<&str> = label.split_whitespace().collect();

            if message.contains(label.as_str()) {
                score += LABEL_PHRASE_WEIGHT * label_words.len() as u32;
                matched_labels.push(label.clone());
            } else {
                let matched_word_count = label_words
                    .iter()
                    .filter(|lw| {
                        words
                            .iter()
                            .any(|w| *w == **lw || w.contains(*lw) || lw.contains(*w))
                    })
                    .count() as u32;

                if matched_word_count > 0 {
                    score += matched_word_count * LABEL_WORD_WEIGHT;
                    if matched_word_count == label_words.len() as u32 {
                        matched_labels.push(label.clone());
                    }
                }
            }
        }

        if has_nav_verb {
            score += NAV_VERB_BONUS;
        }
        if has_request_phrase {
            score += REQUEST_PHRASE_BONUS;
        }

        if let Some(ctx) = ctx {
            if violates_requirements(intent, ctx) {
                score = 0;
            }
        }

        if score > 0 {
            scored.push((score, intent, matched_labels));
        }
    }

    // Stable sort keeps catalog order among ties, so the result is
    // deterministic.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let Some((top_score, top_intent, matched_labels)) = scored.first().cloned() else {
        return DetectionResult::no_match();
    };

    let confidence = (top_score as f64 / CONFIDENCE_DIVISOR).min(1.0);
    let threshold = top_score as f64 * ALTERNATIVE_RATIO;

    let alternatives: Vec<Intent> = if scored.len() > 1 && scored[1].0 as f64 > threshold {
        scored
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(|(_, intent, _)| (*intent).clone())
            .collect()
    } else {
        vec![]
    };

    DetectionResult {
        intent: Some(top_intent.clone()),
        confidence,
        matched_labels,
        alternatives,
    }
}

/// True when the text carries any navigation phrasing or catalog label.
pub fn has_navigation_intent(catalog: &Catalog, text: &str) -> bool {
    let message = text.to_lowercase();

    let has_keyword = NAVIGATION_KEYWORDS.iter().any(|k| message.contains(k));
    let has_label = catalog
        .all()
        .iter()
        .any(|intent| intent.labels.iter().any(|l| message.contains(l.as_str())));

    has_keyword || has_label
}

fn violates_requirements(intent: &Intent, ctx: &UserContext) -> bool {
    if intent.requires_auth && !ctx.is_authenticated {
        return true;
    }
    if intent.requires_admin && !ctx.is_admin() {
        return true;
    }
    if let Some(user_type) = ctx.user_type {
        if !intent.user_types.is_empty() && !intent.allows_user_type(user_type) {
            return true;
        }
    }
    false
}
