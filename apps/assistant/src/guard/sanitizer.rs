//! Input sanitizer: strips unsafe and invisible content from raw user text
//! and enforces length bounds before the message reaches the matcher.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Maximum accepted message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 5000;
/// Minimum cleaned length for a message to be considered meaningful.
pub const MIN_MESSAGE_CHARS: usize = 2;

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("static regex"));
static IFRAME_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b[^>]*>.*?</iframe\s*>").expect("static regex"));
static JS_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("static regex"));
static EVENT_HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bon\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("static regex")
});
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Result of one sanitization pass. `sanitized` is always populated, even
/// when the input was rejected, so callers can show what survived.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizeOutcome {
    pub sanitized: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SanitizeOutcome {
    fn valid(sanitized: String) -> Self {
        SanitizeOutcome {
            sanitized,
            is_valid: true,
            error: None,
        }
    }

    fn invalid(sanitized: String, error: &str) -> Self {
        SanitizeOutcome {
            sanitized,
            is_valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Core sanitization pass.
///
/// Strips, in order: script and iframe blocks, `javascript:` URIs, inline
/// event-handler attributes, any remaining HTML tags, NUL bytes, zero-width
/// characters and C0/C1 controls. Whitespace runs collapse to single spaces.
/// Over-long input is truncated to [`MAX_MESSAGE_CHARS`] and still cleaned,
/// but reported invalid.
pub fn sanitize(raw: &str) -> SanitizeOutcome {
    if raw.is_empty() {
        return SanitizeOutcome::invalid(String::new(), "Message vide.");
    }

    let too_long = raw.chars().count() > MAX_MESSAGE_CHARS;
    let bounded: String = raw.chars().take(MAX_MESSAGE_CHARS).collect();

    let cleaned = strip_markup(&bounded);
    let cleaned = strip_invisible(&cleaned);
    let cleaned = normalize_whitespace(&cleaned);

    if too_long {
        return SanitizeOutcome::invalid(
            cleaned,
            "Message trop long (5000 caractères maximum).",
        );
    }

    if cleaned.chars().count() < MIN_MESSAGE_CHARS {
        return SanitizeOutcome::invalid(cleaned, "Message trop court.");
    }

    SanitizeOutcome::valid(cleaned)
}

/// Composite pipeline: invisible-character removal, UTF-8 integrity pass,
/// whitespace normalization, then the core [`sanitize`] pass.
///
/// The integrity pass drops U+FFFD replacement characters left behind by a
/// lossy decode upstream (the Rust equivalent of rejecting unpaired
/// surrogates).
pub fn full_sanitization(raw: &str) -> SanitizeOutcome {
    let pre = strip_invisible(raw);
    let pre: String = pre.chars().filter(|&c| c != '\u{FFFD}').collect();
    let pre = normalize_whitespace(&pre);
    sanitize(&pre)
}

fn strip_markup(text: &str) -> String {
    let out = SCRIPT_BLOCK_RE.replace_all(text, "");
    let out = IFRAME_BLOCK_RE.replace_all(&out, "");
    let out = JS_URI_RE.replace_all(&out, "");
    let out = EVENT_HANDLER_RE.replace_all(&out, "");
    HTML_TAG_RE.replace_all(&out, "").into_owned()
}

/// Removes NUL bytes, zero-width/invisible Unicode and C0/C1 control
/// characters. Tabs and newlines become plain spaces so the later whitespace
/// collapse handles them uniformly.
fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(' '),
            '\u{0000}' => None,
            '\u{200B}'..='\u{200F}' | '\u{FEFF}' | '\u{2060}' | '\u{00AD}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text, " ").trim().to_string()
}
