//! Text normalisation for catalogue matching
//!
//! Author and title strings are canonicalised the same way the catalogue's
//! `normalauthor` / `normaltitle` fields are, so fuzzy comparison works on
//! like-for-like text. Both pipelines are pure and idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words this short are dropped; too short to discriminate between books.
///
/// This is biased against names written with initials.
const MIN_WORD_LEN: usize = 4;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("valid regex"));
static DOCTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"Dr\.").expect("valid regex"));
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[^a-z ]+").expect("valid regex"));
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[^a-z0-9 ]+").expect("valid regex"));

/// Canonicalise an author name
///
/// Strips digits, `Dr.`, parenthetical asides ("(writing as ...)"), and any
/// non-letter, then lowercases and drops short words.
pub fn normalize_author(author: &str) -> String {
    let s = DIGITS.replace_all(author, "");
    let s = DOCTOR.replace_all(&s, "");
    let s = PARENTHETICAL.replace_all(&s, " ");
    let s = NON_ALPHA.replace_all(&s, "");
    remove_short_words(&s.to_lowercase())
}

/// Canonicalise a book title
///
/// Catalogues are inconsistent about subtitles, so only the text before the
/// first colon is kept.
pub fn normalize_title(title: &str) -> String {
    let main = title.split(':').next().unwrap_or_default();
    let s = PARENTHETICAL.replace_all(main, " ");
    let s = NON_ALNUM.replace_all(&s, "");
    remove_short_words(&s.to_lowercase())
}

/// Drop words of three characters or fewer and rejoin with single spaces
pub fn remove_short_words(s: &str) -> String {
    s.split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .collect::<Vec<_>>()
        .join(" ")
}
