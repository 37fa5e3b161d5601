//! Reconciliation of a dispatch's results into the shelf
//!
//! Runs serially after every dispatch has finished. This is the only place
//! (besides healing adopting a cloned shelf) where spines change.

use super::results::SearchResult;
use crate::models::Shelf;
use crate::services::match_scorer::{compare, CONFIDENCE};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Commit results, longest searched text first, then propagate known authors
///
/// Returns the number of spines newly resolved.
pub fn process_search_results(shelf: &mut Shelf, mut results: Vec<SearchResult>) -> usize {
    // Long matches are less likely to be coincidental
    results.sort_by(|a, b| b.search_len().cmp(&a.search_len()));

    let mut committed = 0;

    for result in &results {
        if !shelf.resolve(result.spine_index, &result.found_author, &result.found_title) {
            debug!(spine = result.spine_index, "Spine already resolved, skip result");
            continue;
        }

        info!(
            spine = result.spine_index,
            "Resolved {} - {} from {:?}",
            result.found_author,
            result.found_title,
            shelf.spines[result.spine_index].spine
        );
        committed += 1;

        check_adjacent(shelf, result);
    }

    extract_known_authors(shelf);

    committed
}

fn literal_ignore_case(text: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(text))
        .case_insensitive(true)
        .build()
        .ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip the unmatched rest of a split title from neighbouring spines
///
/// When the catalogue title is shorter than the searched title, the residual
/// words are often the start of the next book's text or the tail of the
/// previous one's. Leaving them in place invites false matches later.
pub fn check_adjacent(shelf: &mut Shelf, result: &SearchResult) {
    // An empty pattern matches everywhere
    if result.found_title.trim().is_empty() {
        return;
    }

    let Some(found) = literal_ignore_case(&result.found_title) else {
        return;
    };

    if !found.is_match(&result.search_title) {
        return;
    }

    let residual = collapse_whitespace(&found.replace_all(&result.search_title, ""));
    if residual.is_empty() {
        return;
    }

    debug!(
        spine = result.spine_index,
        "Residual {:?} after removing {:?}", residual, result.found_title
    );

    let Some(residual_re) = literal_ignore_case(&residual) else {
        return;
    };

    let neighbours = [
        result.spine_index.checked_sub(1),
        Some(result.spine_index + 1).filter(|&i| i < shelf.len()),
    ];

    for index in neighbours.into_iter().flatten() {
        let spine = &mut shelf.spines[index];
        if !spine.is_resolved() && residual_re.is_match(&spine.spine) {
            debug!(spine = index, "Remove rest of title {:?} from {:?}", residual, spine.spine);
            spine.spine = collapse_whitespace(&residual_re.replace_all(&spine.spine, ""));
        }
    }
}

/// Merge unresolved spines that between them spell out a known author
///
/// Books by one author are usually shelved together, and OCR often breaks
/// an author's name across two lines. Matching starts at the first word of
/// an unresolved spine and may continue through the following unresolved
/// spines; a match spanning more than one spine merges them so a later
/// direct search sees author and title together.
pub fn extract_known_authors(shelf: &mut Shelf) {
    let authors: BTreeSet<String> = shelf
        .spines
        .iter()
        .filter_map(|s| s.author.clone())
        .filter(|a| !a.is_empty())
        .collect();

    if authors.is_empty() {
        return;
    }

    debug!(?authors, "Currently known authors");

    for author in &authors {
        let author_words: Vec<String> = author.split_whitespace().map(str::to_lowercase).collect();
        if author_words.is_empty() {
            continue;
        }

        let mut start = 0;
        while start < shelf.len() {
            match author_span_end(shelf, start, &author_words) {
                Some(end) if end > start => {
                    info!(start, end, "Found {} split across spines", author);
                    let text = shelf.joined_text(start, end - start + 1);
                    shelf.merge_spines(start, end - start + 1, text);
                }
                _ => {}
            }
            start += 1;
        }
    }
}

/// Last spine index consumed when matching `author_words` from the start
/// of spine `start`, if the whole author matched
fn author_span_end(shelf: &Shelf, start: usize, author_words: &[String]) -> Option<usize> {
    if shelf.spines[start].is_resolved() {
        return None;
    }

    let mut spine_index = start;
    let mut words = spine_words(shelf, spine_index);
    if words.is_empty() {
        return None;
    }
    let mut word_index = 0;

    for (matched, author_word) in author_words.iter().enumerate() {
        if word_index >= words.len() {
            // Continue into the next spine, unless it is already identified
            spine_index += 1;
            if spine_index >= shelf.len() || shelf.spines[spine_index].is_resolved() {
                return None;
            }
            words = spine_words(shelf, spine_index);
            word_index = 0;
        }

        let word = words.get(word_index)?;

        if compare(word, author_word) < CONFIDENCE {
            return None;
        }

        debug!(
            spine = spine_index,
            "Possible author word {} ({} of {})",
            author_word,
            matched + 1,
            author_words.len()
        );
        word_index += 1;
    }

    Some(spine_index)
}

fn spine_words(shelf: &Shelf, index: usize) -> Vec<String> {
    shelf.spines[index]
        .spine
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}
