//! Text normalization
//!
//! Every task runs on normalized text, and the normalized form is what the
//! embedding cache is keyed on, so two inputs differing only in spacing share
//! one cache entry.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static COMMA_NO_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\S)").expect("valid regex"));
static PERIOD_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s*([A-Za-z])").expect("valid regex"));
static PUNCT_NO_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([!?,;:])(\S)").expect("valid regex"));
static SPACED_ABBREVIATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([UIPRBOSJA]\.)\s+([UIPRBOSJA]\.)").expect("valid regex"));

/// Canonicalize spacing and punctuation
///
/// - whitespace runs become one space
/// - a space follows `, ! ? ; :` and a period that precedes a letter
/// - spaced single-letter abbreviations are re-joined (`U. S.` -> `U.S.`)
/// - leading/trailing whitespace is trimmed
///
/// # Examples
///
/// ```
/// use llmsvc_gateway::text::normalize;
///
/// assert_eq!(normalize("Hello,world.How   are you?Fine"), "Hello, world. How are you? Fine");
/// assert_eq!(normalize("Born in the U. S. in 1950"), "Born in the U.S. in 1950");
/// ```
pub fn normalize(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text.trim(), " ");
    let text = COMMA_NO_SPACE.replace_all(&text, ", $1");
    let text = PERIOD_LETTER.replace_all(&text, ". $1");
    let text = PUNCT_NO_SPACE.replace_all(&text, "$1 $2");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = SPACED_ABBREVIATION.replace_all(&text, "$1$2");
    text.trim().to_string()
}
