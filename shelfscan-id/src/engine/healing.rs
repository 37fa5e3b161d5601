//! Broken-spine healing
//!
//! OCR often splits one book's text over several lines, or reads lines in
//! the wrong order. Healing tries windows of neighbouring unresolved spines
//! as a single spine, in one or more word orders, against a cloned shelf.
//! The first ordering that yields a match replaces the real shelf.

use super::dispatch::search_spines;
use super::permutations::Permutations;
use super::phase::{HealMode, Phase};
use super::reconcile::process_search_results;
use super::results::PhaseContext;
use super::IdentificationEngine;
use crate::models::Shelf;
use tracing::debug;

/// Mangled healing always uses pairs of spines
const MANGLED_WINDOW: usize = 2;

impl IdentificationEngine {
    /// Scan windows of unresolved spines for the phase's healing mode
    ///
    /// Returns the number of spines resolved.
    pub(super) async fn heal_broken_spines(&self, shelf: &mut Shelf, phase: &Phase) -> usize {
        let max_window = match phase.heal {
            HealMode::None => return 0,
            HealMode::Mangled => MANGLED_WINDOW,
            HealMode::Adjacent | HealMode::Permuted => self.settings.max_heal_window,
        };

        debug!(phase = %phase, max_window, "Search broken spines");
        let mut resolved = 0;

        for window in 2..=max_window {
            let mut start = 0;

            while start + window <= shelf.len() {
                if window_available(shelf, start, window) {
                    let healed = self.heal_window(shelf, phase, start, window).await;
                    if healed > 0 {
                        // Indices past the window have shifted
                        resolved += healed;
                        break;
                    }
                }
                start += 1;
            }
        }

        resolved
    }

    /// Try the orderings of one window, adopting the first that matches
    async fn heal_window(
        &self,
        shelf: &mut Shelf,
        phase: &Phase,
        start: usize,
        window: usize,
    ) -> usize {
        let pieces: Vec<String> = match phase.heal {
            HealMode::None => return 0,
            HealMode::Adjacent | HealMode::Permuted => shelf.spines[start..start + window]
                .iter()
                .map(|s| s.spine.trim().to_string())
                .collect(),
            HealMode::Mangled => shelf.spines[start..start + window]
                .iter()
                .flat_map(|s| s.spine.split_whitespace().map(str::to_string))
                .collect(),
        };

        if phase.heal == HealMode::Mangled && pieces.len() > self.settings.mangle_word_limit {
            debug!(
                start,
                words = pieces.len(),
                limit = self.settings.mangle_word_limit,
                "Too many words to mangle, skip"
            );
            return 0;
        }

        let orderings: Box<dyn Iterator<Item = Vec<usize>> + Send> = match phase.heal {
            HealMode::Adjacent => {
                Box::new(std::iter::once((0..pieces.len()).collect::<Vec<usize>>()))
            }
            _ => Box::new(Permutations::new(pieces.len())),
        };

        for order in orderings {
            let text = order
                .iter()
                .map(|&i| pieces[i].as_str())
                .collect::<Vec<_>>()
                .join(" ");

            debug!(start, window, ?order, "Consider healed text {:?}", text);

            let mut candidate = shelf.clone();
            candidate.merge_spines(start, window, text);

            let ctx = PhaseContext::new();
            search_spines(
                &self.client,
                &candidate,
                phase,
                start,
                1,
                &ctx,
                self.settings.max_concurrent_queries,
            )
            .await;

            let results = ctx.take_results().await;
            if !results.is_empty() {
                debug!(start, window, "Found a healed result, adopting merged spines");
                *shelf = candidate;
                return process_search_results(shelf, results);
            }
        }

        0
    }
}

/// Every spine of the window is unresolved and has text
fn window_available(shelf: &Shelf, start: usize, window: usize) -> bool {
    shelf
        .spines
        .get(start..start + window)
        .is_some_and(|spines| {
            spines
                .iter()
                .all(|s| !s.is_resolved() && !s.spine.trim().is_empty())
        })
}
