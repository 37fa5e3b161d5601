//! Per-phase result recording
//!
//! One [`PhaseContext`] is created for each direct search and each healing
//! attempt and handed to every task of that dispatch. The result list and
//! the resolved set share a single lock so a spine can never be recorded
//! twice.

use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::debug;

/// An accepted match for one spine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub spine_index: usize,
    pub phase_id: usize,
    /// Candidate text that was searched
    pub search_author: String,
    pub search_title: String,
    /// Catalogue values that matched
    pub found_author: String,
    pub found_title: String,
    /// Catalogue identifier of the match
    pub book_id: String,
}

impl SearchResult {
    /// Length of the searched text, used to process longest matches first
    pub fn search_len(&self) -> usize {
        self.search_author.len() + self.search_title.len()
    }
}

#[derive(Debug, Default)]
struct ContextState {
    results: Vec<SearchResult>,
    resolved: HashSet<usize>,
}

/// Shared result state for one dispatch
#[derive(Debug, Default)]
pub struct PhaseContext {
    state: Mutex<ContextState>,
}

impl PhaseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result unless its spine already has one
    ///
    /// Returns whether the result was kept.
    pub async fn add_result(&self, result: SearchResult) -> bool {
        let mut state = self.state.lock().await;

        if !state.resolved.insert(result.spine_index) {
            debug!(spine = result.spine_index, "Drop duplicate result");
            return false;
        }

        debug!(
            spine = result.spine_index,
            phase = result.phase_id,
            id = %result.book_id,
            "Add result {} - {}", result.found_author, result.found_title
        );
        state.results.push(result);
        true
    }

    pub async fn is_resolved(&self, spine_index: usize) -> bool {
        self.state.lock().await.resolved.contains(&spine_index)
    }

    /// Drain the recorded results
    pub async fn take_results(&self) -> Vec<SearchResult> {
        std::mem::take(&mut self.state.lock().await.results)
    }
}
