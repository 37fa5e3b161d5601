//! Spine/fragment arena
//!
//! Fragments refer to spines by plain index. Every operation that removes or
//! merges spine slots lives here so the shift arithmetic exists exactly once:
//!
//! - dropping slot `i` removes its fragments and decrements every index `> i`
//! - merging `[start, start + length)` moves fragments inside the range to
//!   `start` and shifts everything after it down by `length - 1`
//!
//! Neither operation changes the order of the remaining fragments.

use super::{Fragment, Spine};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The full working state of one photograph: spines plus their fragments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub spines: Vec<Spine>,
    pub fragments: Vec<Fragment>,
}

impl Shelf {
    pub fn new(spines: Vec<Spine>, fragments: Vec<Fragment>) -> Self {
        Self { spines, fragments }
    }

    pub fn len(&self) -> usize {
        self.spines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spines.is_empty()
    }

    /// Number of spines with an identified author
    pub fn resolved_count(&self) -> usize {
        self.spines.iter().filter(|s| s.is_resolved()).count()
    }

    /// Fragments whose spine was never identified
    pub fn leftover_fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(|f| !f.consumed)
    }

    /// Commit an identification and flag the spine's fragments as consumed
    ///
    /// Returns false (and changes nothing) when the index is out of range or
    /// the spine already has an author.
    pub fn resolve(&mut self, index: usize, author: &str, title: &str) -> bool {
        match self.spines.get_mut(index) {
            Some(spine) if !spine.is_resolved() => {
                spine.author = Some(author.to_string());
                spine.title = Some(title.to_string());
            }
            _ => return false,
        }

        for fragment in self.fragments.iter_mut().filter(|f| f.spine_index == index) {
            debug!(fragment = %fragment.text, spine = index, "Flag fragment consumed");
            fragment.consumed = true;
        }

        true
    }

    /// Remove the fragments of spine slot `index` and close the gap
    ///
    /// Only touches fragments; used while the spine array is still being built.
    pub fn discard_spine_fragments(&mut self, index: usize) {
        self.fragments.retain(|f| f.spine_index != index);

        for fragment in self.fragments.iter_mut() {
            if fragment.spine_index > index {
                fragment.spine_index -= 1;
            }
        }
    }

    /// Collapse `length` consecutive spines starting at `start` into one
    ///
    /// The surviving spine at `start` takes `text` as its working text and
    /// stays unresolved. Ranges running past the end are clamped.
    pub fn merge_spines(&mut self, start: usize, length: usize, text: impl Into<String>) {
        if start >= self.spines.len() {
            return;
        }

        let end = (start + length.max(1)).min(self.spines.len());
        let removed = end - start - 1;

        self.spines[start] = Spine::new(text);

        for fragment in self.fragments.iter_mut() {
            if fragment.spine_index > start && fragment.spine_index < end {
                fragment.spine_index = start;
            } else if fragment.spine_index >= end {
                fragment.spine_index -= removed;
            }
        }

        self.spines.drain(start + 1..end);

        debug!(start, length = end - start, spines = self.spines.len(), "Merged spines");
    }

    /// Space-joined working text of `[start, start + length)`
    pub fn joined_text(&self, start: usize, length: usize) -> String {
        let end = (start + length).min(self.spines.len());
        self.spines[start.min(end)..end]
            .iter()
            .map(|s| s.spine.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
