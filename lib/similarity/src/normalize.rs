//! Text normalization stages
//!
//! Each stage is a pure `&str -> String` function so it can be tested on its
//! own. [`normalize_text`] runs them in order:
//!
//! ```text
//! canonicalize -> mask_urls -> mask_emails -> mask_numbers
//!              -> strip_punctuation -> collapse_whitespace
//! ```
//!
//! Placeholders are padded with spaces so they never fuse with neighbouring
//! words; the final stage collapses that padding again.
//!
//! A word character is a letter, a number or `_`. Combining marks are not
//! word characters, so accents left after NFKC and vowel signs in Indic
//! scripts split words the same way punctuation does.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub const URL_PLACEHOLDER: &str = "url";
pub const EMAIL_PLACEHOLDER: &str = "email";
pub const NUMBER_PLACEHOLDER: &str = "0";

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[\p{L}\p{N}_.-]+@[\p{L}\p{N}_.-]+\.[a-z]{2,}\b").expect("email pattern")
});
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("number pattern"));
static PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("punctuation pattern"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+").expect("token pattern"));

/// NFKC-normalize and lowercase.
pub fn canonicalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

pub fn mask_urls(text: &str) -> String {
    URL_RE
        .replace_all(text, format!(" {} ", URL_PLACEHOLDER).as_str())
        .into_owned()
}

/// Expects lowercase input; the TLD part only matches `[a-z]`.
pub fn mask_emails(text: &str) -> String {
    EMAIL_RE
        .replace_all(text, format!(" {} ", EMAIL_PLACEHOLDER).as_str())
        .into_owned()
}

pub fn mask_numbers(text: &str) -> String {
    NUMBER_RE
        .replace_all(text, format!(" {} ", NUMBER_PLACEHOLDER).as_str())
        .into_owned()
}

/// Replace anything that is neither a word character nor whitespace,
/// combining marks included.
pub fn strip_punctuation(text: &str) -> String {
    PUNCT_RE.replace_all(text, " ").into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    SPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Full pipeline producing the canonical comparison form of a value.
pub fn normalize_text(text: &str) -> String {
    let text = canonicalize(text);
    let text = mask_urls(&text);
    let text = mask_emails(&text);
    let text = mask_numbers(&text);
    let text = strip_punctuation(&text);
    collapse_whitespace(&text)
}

/// Maximal runs of word characters.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}
