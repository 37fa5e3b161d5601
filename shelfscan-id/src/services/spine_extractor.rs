//! Spine extraction from OCR lines and fragments
//!
//! Turns the OCR summary lines into cleaned spine records:
//! 1. Assign each fragment to its line (lockstep walk, mismatch is fatal)
//! 2. Prune text much smaller than the dominant spine lettering
//! 3. Strip OCR noise (ISBNs, stray numbers, quotes) from each line
//! 4. Drop lines left empty, together with their fragments

use crate::models::{Fragment, Shelf, Spine};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Default ratio between mean fragment extent and the smallest kept extent
pub const PRUNE_SMALL_TEXT: u32 = 4;

/// Spine extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A line's word does not match the next fragment; the summary and the
    /// fragments do not describe the same OCR result.
    #[error(
        "Mismatch between line {line} word {word:?} and fragment {fragment_index} ({expected:?})"
    )]
    FragmentMismatch {
        line: usize,
        word: String,
        fragment_index: usize,
        expected: Option<String>,
    },
}

/// Regex passes applied to each line, in order
static CLEANERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // ISBNs often appear on spines
        r"(?i)ISBN",
        // Digits separated by dots can't be a real word
        r"\d+\.\d+",
        // Nor can anything with leading zeros
        r"0\d+",
        // 1-3 digit words are legitimate in a few titles but usually ISBN junk
        r"\b\d{1,3}\b",
        // Nothing good starts with a dash
        r"\s-\w+(\b|$)",
        r"\s#\s",
        r#"["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Build the initial shelf from OCR lines and fragments
pub fn extract_spines(
    lines: &[String],
    fragments: Vec<Fragment>,
    prune_ratio: u32,
) -> Result<Shelf, ExtractError> {
    let fragments = index_fragments(lines, fragments)?;
    let (lines, fragments, pruned) = prune_small_text(lines, fragments, prune_ratio);
    debug!(pruned, "Pruned small text");

    let mut shelf = Shelf::new(Vec::with_capacity(lines.len()), fragments);

    for line in &lines {
        let cleaned = clean_ocr(line);

        if cleaned.is_empty() {
            // Fragments of this line currently carry the next free spine index
            let index = shelf.spines.len();
            debug!(line = %line, index, "Dropping empty line");
            shelf.discard_spine_fragments(index);
        } else {
            shelf.spines.push(Spine::new(cleaned));
        }
    }

    Ok(shelf)
}

/// Assign each fragment the index of the line it belongs to
///
/// Words of the lines are walked in lockstep with the flat fragment list.
pub fn index_fragments(
    lines: &[String],
    mut fragments: Vec<Fragment>,
) -> Result<Vec<Fragment>, ExtractError> {
    let mut fragment_index = 0;

    for (line_index, line) in lines.iter().enumerate() {
        for word in line.split_whitespace() {
            match fragments.get_mut(fragment_index) {
                Some(fragment) if fragment.text == word => {
                    fragment.spine_index = line_index;
                    fragment_index += 1;
                }
                other => {
                    return Err(ExtractError::FragmentMismatch {
                        line: line_index,
                        word: word.to_string(),
                        fragment_index,
                        expected: other.map(|f| f.text.clone()),
                    });
                }
            }
        }
    }

    Ok(fragments)
}

/// Drop fragments much smaller than the mean
///
/// Very small text on spines is usually a publisher mark, an ISBN, or text
/// read at an angle from a book's front. A fragment is pruned when
/// `extent * ratio < mean extent`. Returns the pruned lines, the kept
/// fragments (renumbered to their line) and how many were pruned.
///
/// Expects fragments already indexed by [`index_fragments`].
pub fn prune_small_text(
    lines: &[String],
    fragments: Vec<Fragment>,
    ratio: u32,
) -> (Vec<String>, Vec<Fragment>, usize) {
    if fragments.is_empty() {
        return (lines.to_vec(), fragments, 0);
    }

    let total: i64 = fragments
        .iter()
        .map(|f| i64::from(f.bounding_poly.max_dimension()))
        .sum();
    let mean = total / fragments.len() as i64;
    debug!(mean, "Mean fragment extent");

    let mut new_lines = Vec::with_capacity(lines.len());
    let mut kept = Vec::with_capacity(fragments.len());
    let mut pruned = 0;
    let mut iter = fragments.into_iter();

    for line in lines {
        let mut words = Vec::new();

        for _ in line.split_whitespace() {
            let Some(mut fragment) = iter.next() else {
                break;
            };

            let extent = i64::from(fragment.bounding_poly.max_dimension());
            if extent * i64::from(ratio) < mean {
                debug!(text = %fragment.text, extent, mean, "Prune small text");
                pruned += 1;
            } else {
                words.push(fragment.text.clone());
                fragment.spine_index = new_lines.len();
                kept.push(fragment);
            }
        }

        new_lines.push(words.join(" "));
    }

    (new_lines, kept, pruned)
}

/// Remove typical OCR junk from one line
pub fn clean_ocr(line: &str) -> String {
    let mut cleaned = line.to_string();

    for re in CLEANERS.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }

    let cleaned = WHITESPACE.replace_all(&cleaned, " ").trim().to_string();

    if cleaned != line {
        debug!("Cleaned {} => {}", line, cleaned);
    }

    cleaned
}
