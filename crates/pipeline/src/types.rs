//! Pipeline value types.
//!
//! Every value here is single-request-scoped: created at the request
//! boundary, threaded immutably through the stages, and discarded with the
//! response.

use serde::{Deserialize, Serialize};

/// The base language answers are generated in, regardless of query
/// language. Translation to the user's language happens afterwards.
pub const BASE_LANGUAGE: &str = "es";

/// An incoming user query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Name of the asking user
    pub user_name: String,

    /// The question text; no length or charset validation is performed
    pub question: String,
}

impl Query {
    /// Create a new query.
    pub fn new(user_name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            question: question.into(),
        }
    }
}

/// The terminal pipeline output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Name of the asking user, echoed back
    pub user_name: String,

    /// The answer, possibly with a trailing emoji summary
    pub answer: String,
}

/// A normalized short language code (ISO 639-1-like, e.g. "es", "en").
///
/// Derived from free-text model output, which may be malformed: extra
/// whitespace, wrong case, surrounding punctuation, or prose instead of a
/// code. [`LanguageCode::normalize`] is the only constructor from raw
/// output; anything it cannot confidently parse collapses to the base
/// language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// The base generation language ("es").
    pub fn base() -> Self {
        Self(BASE_LANGUAGE.to_string())
    }

    /// Normalize raw classifier output into a language code.
    ///
    /// Trims whitespace and surrounding punctuation, lowercases, and
    /// accepts only a single 2-3 letter ASCII token. Everything else
    /// defaults to the base language, mirroring the in-prompt instruction.
    pub fn normalize(raw: &str) -> Self {
        let token = raw
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        let valid = (2..=3).contains(&token.len())
            && token.chars().all(|c| c.is_ascii_alphabetic());

        if valid {
            Self(token)
        } else {
            tracing::debug!("Could not parse language code from {:?}, defaulting", raw);
            Self::base()
        }
    }

    /// Whether this is the base generation language.
    pub fn is_base(&self) -> bool {
        self.0 == BASE_LANGUAGE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a char participates in an emoji sequence.
///
/// Covers the pictographic blocks plus the zero-width joiner and the emoji
/// variation selector, which glue multi-codepoint sequences together.
fn is_emoji_component(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF   // pictographs, symbols, flags, skin tones
        | 0x2600..=0x27BF   // miscellaneous symbols, dingbats
        | 0x2300..=0x23FF   // technical symbols (clocks, timers)
        | 0x2B00..=0x2BFF   // stars
        | 0xFE0F            // variation selector-16
        | 0x200D            // zero-width joiner
    )
}

/// The trailing emoji run of `text`, empty when the text does not end with
/// emoji. Trailing emoji carry semantic weight (an answer summary) and must
/// survive translation in trailing position.
pub fn trailing_emoji_run(text: &str) -> &str {
    let trimmed = text.trim_end();
    let mut start = trimmed.len();

    for (i, c) in trimmed.char_indices().rev() {
        if is_emoji_component(c) || (c == ' ' && start < trimmed.len()) {
            start = i;
        } else {
            break;
        }
    }

    trimmed[start..].trim_start()
}

/// Whether `text` ends with an emoji run.
pub fn ends_with_emoji(text: &str) -> bool {
    !trailing_emoji_run(text).is_empty()
}
