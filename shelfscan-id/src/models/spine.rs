//! Spine records

use serde::{Deserialize, Serialize};

/// One candidate physical book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spine {
    /// Current working text
    pub spine: String,
    /// Identified author
    pub author: Option<String>,
    /// Identified title
    pub title: Option<String>,
}

impl Spine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            spine: text.into(),
            author: None,
            title: None,
        }
    }

    /// Resolved spines are never re-split or re-searched
    pub fn is_resolved(&self) -> bool {
        self.author.as_deref().is_some_and(|a| !a.is_empty())
    }

    /// Whitespace-separated words of the working text
    pub fn words(&self) -> Vec<&str> {
        self.spine.split_whitespace().collect()
    }
}
