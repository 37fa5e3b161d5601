//! Phase descriptors
//!
//! A phase fixes how spines are split and queried and which healing strategy
//! follows the direct search. Cheap phases run first; resolving easy spines
//! early shrinks the work left for the expensive healing phases.

use crate::services::QueryShape;
use serde::Serialize;
use std::fmt;

/// Broken-spine healing strategy run after a phase's direct search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealMode {
    /// Direct search only
    None,
    /// Concatenate a window of spines in shelf order
    Adjacent,
    /// Try every ordering of the window's spines
    Permuted,
    /// Try every ordering of every word in the window
    Mangled,
}

/// One configuration of the identification algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub id: usize,
    /// Dictionary pre-filter; carried for logging, no standard phase enables it
    pub fuzzy: bool,
    /// Author is the prefix of a split (else the suffix)
    pub author_first: bool,
    /// Query author and title jointly (else a single-field led query)
    pub joint: bool,
    pub heal: HealMode,
}

impl Phase {
    /// Query shape used for every candidate of this phase
    pub fn query_shape(&self) -> QueryShape {
        match (self.joint, self.author_first) {
            (true, _) => QueryShape::Joint,
            (false, true) => QueryShape::AuthorLed,
            (false, false) => QueryShape::TitleLed,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} heal={:?} joint={} author_first={} fuzzy={}",
            self.id, self.heal, self.joint, self.author_first, self.fuzzy
        )
    }
}

/// The standard phase list, in execution order
///
/// Healing strategies go from cheapest to most expensive; within each,
/// joint queries precede single-field ones and author-first precedes
/// author-last.
pub fn standard_phases() -> Vec<Phase> {
    let mut phases = Vec::with_capacity(16);

    for heal in [HealMode::None, HealMode::Adjacent, HealMode::Permuted, HealMode::Mangled] {
        for joint in [true, false] {
            for author_first in [true, false] {
                phases.push(Phase {
                    id: phases.len(),
                    fuzzy: false,
                    author_first,
                    joint,
                    heal,
                });
            }
        }
    }

    phases
}
