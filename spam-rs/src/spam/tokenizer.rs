//! Message tokenizer
//!
//! Turns raw message text into the ordered sequence of ASCII-letter words
//! used by the frequency store. Tag-like markup is removed first, then the
//! text is split on whitespace and every fragment is broken into maximal
//! letter runs. Duplicates are kept.

use regex::Regex;
use std::sync::LazyLock;

/// `<`, optional `/`, word chars / whitespace / `=` / `:`, `>`
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[\w\s=:]+>").expect("valid tag pattern"));

/// Characters that are neither word characters nor non-whitespace
static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\S]+").expect("valid boundary pattern"));

static LETTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("valid letters pattern"));

/// Tokenize a message into letter-only words, left to right
pub fn tokenize(text: &str) -> Vec<String> {
    let stripped = TAG_RE.replace_all(text, "");

    BOUNDARY_RE
        .split(&stripped)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .flat_map(|fragment| LETTERS_RE.find_iter(fragment).map(|m| m.as_str().to_string()))
        .collect()
}
