//! Candidate dispatch
//!
//! Each unresolved spine is split at every word boundary into an
//! author/title pair. All pairs that survive the pre-filter are searched
//! concurrently; the first accepted match for a spine is recorded in the
//! phase context and the spine's remaining tasks skip themselves.

use super::phase::Phase;
use super::results::{PhaseContext, SearchResult};
use crate::models::Shelf;
use crate::services::SearchClient;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Longest word length still considered too short to identify an author
const SHORT_WORD: usize = 3;

/// Authors rarely run to more than this many words
const MAX_AUTHOR_WORDS: usize = 3;

/// Shortest title worth a query
const MIN_TITLE_LEN: usize = 4;

/// One author/title split of a spine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub spine_index: usize,
    pub author: String,
    pub title: String,
}

/// Spine indices of `[start, start + length)`, longest text first
///
/// Longer spines are more likely to hold both author and title, and each
/// early hit adds a known author for the shorter ones.
pub fn spine_order(shelf: &Shelf, start: usize, length: usize) -> Vec<usize> {
    let end = start.saturating_add(length).min(shelf.len());
    let mut order: Vec<usize> = (start.min(end)..end).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(shelf.spines[i].spine.len()));
    order
}

/// Every interior split of `text` as an (author, title) pair
pub fn split_candidates(text: &str, author_first: bool) -> Vec<(String, String)> {
    let words: Vec<&str> = text.split_whitespace().collect();

    (1..words.len())
        .map(|split| {
            let head = words[..split].join(" ");
            let tail = words[split..].join(" ");
            if author_first {
                (head, tail)
            } else {
                (tail, head)
            }
        })
        .collect()
}

/// Cheap rejection of pairs that are almost certainly noise
pub fn passes_prefilter(author: &str, title: &str) -> bool {
    let author = author.trim();
    let title = title.trim();
    let author_words: Vec<&str> = author.split_whitespace().collect();

    if !author_words.iter().any(|w| w.chars().count() > SHORT_WORD) {
        return false;
    }

    if author_words.len() > MAX_AUTHOR_WORDS {
        return false;
    }

    if title.chars().count() < MIN_TITLE_LEN {
        return false;
    }

    // Two single words are far more likely over-fragmentation than a real book
    author.contains(' ') || title.contains(' ')
}

/// Order candidates round-robin across spines
///
/// Two candidates of the same spine are only adjacent once every other
/// spine has run out.
pub fn interleave(groups: Vec<Vec<Candidate>>) -> Vec<Candidate> {
    let total = groups.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = groups.into_iter().map(Vec::into_iter).collect();
    let mut out = Vec::with_capacity(total);

    while out.len() < total {
        for iter in iters.iter_mut() {
            if let Some(candidate) = iter.next() {
                out.push(candidate);
            }
        }
    }

    out
}

/// Build the filtered, interleaved candidate list for a range of spines
pub fn build_candidates(
    shelf: &Shelf,
    phase: &Phase,
    start: usize,
    length: usize,
) -> Vec<Candidate> {
    let mut groups = Vec::new();

    for spine_index in spine_order(shelf, start, length) {
        let spine = &shelf.spines[spine_index];
        if spine.is_resolved() {
            continue;
        }

        let group: Vec<Candidate> = split_candidates(&spine.spine, phase.author_first)
            .into_iter()
            .filter(|(author, title)| {
                let keep = passes_prefilter(author, title);
                if !keep {
                    debug!(spine = spine_index, "Pre-filter drops {} - {}", author, title);
                }
                keep
            })
            .map(|(author, title)| Candidate {
                spine_index,
                author,
                title,
            })
            .collect();

        if !group.is_empty() {
            groups.push(group);
        }
    }

    interleave(groups)
}

/// Search every candidate of `[start, start + length)` concurrently
///
/// Returns once every task has finished. Accepted matches land in `ctx`;
/// backend failures are logged and count as no match.
pub async fn search_spines(
    client: &SearchClient,
    shelf: &Shelf,
    phase: &Phase,
    start: usize,
    length: usize,
    ctx: &PhaseContext,
    concurrency: usize,
) -> usize {
    let candidates = build_candidates(shelf, phase, start, length);
    let shape = phase.query_shape();
    let phase_id = phase.id;

    debug!(
        phase = %phase,
        start,
        length,
        candidates = candidates.len(),
        "Dispatch candidates"
    );

    let outcomes: Vec<bool> = stream::iter(candidates)
        .map(|candidate| async move {
            // Another split of this spine may already have matched
            if ctx.is_resolved(candidate.spine_index).await {
                return false;
            }

            debug!(
                spine = candidate.spine_index,
                "Consider {} - {}", candidate.author, candidate.title
            );

            match client.find_book(&candidate.author, &candidate.title, shape).await {
                Ok(Some(book)) => {
                    ctx.add_result(SearchResult {
                        spine_index: candidate.spine_index,
                        phase_id,
                        search_author: candidate.author,
                        search_title: candidate.title,
                        found_author: book.author,
                        found_title: book.title,
                        book_id: book.id,
                    })
                    .await
                }
                Ok(None) => false,
                Err(e) => {
                    warn!(
                        spine = candidate.spine_index,
                        author = %candidate.author,
                        title = %candidate.title,
                        error = %e,
                        "Search failed, treating as no match"
                    );
                    false
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    outcomes.into_iter().filter(|kept| *kept).count()
}
