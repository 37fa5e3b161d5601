//! In-memory catalogue standing in for the search backend
//!
//! Matches whole normalised strings by edit distance, which is close enough
//! to per-term fuzzy matching for the short values used in tests.

use async_trait::async_trait;
use shelfscan_id::services::normalizer::{normalize_author, normalize_title};
use shelfscan_id::services::{CatalogueHit, FuzzyQuery, QueryShape, SearchBackend, SearchError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeCatalogue {
    books: Vec<CatalogueHit>,
    failing_authors: HashSet<String>,
    calls: AtomicUsize,
    queries: Mutex<Vec<FuzzyQuery>>,
}

impl FakeCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, author: &str, title: &str) -> Self {
        self.books.push(CatalogueHit {
            id: format!("book-{}", self.books.len() + 1),
            author: author.to_string(),
            title: title.to_string(),
            normal_author: normalize_author(author),
            normal_title: normalize_title(title),
        });
        self
    }

    /// Every query for this normalised author fails with a network error
    pub fn failing_on(mut self, normal_author: &str) -> Self {
        self.failing_authors.insert(normal_author.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<FuzzyQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn calls_for(&self, author: &str, title: &str) -> usize {
        self.queries()
            .iter()
            .filter(|q| q.author == author && q.title == title)
            .count()
    }
}

fn within(query: &str, stored: &str, fuzziness: u8) -> bool {
    strsim::levenshtein(query, stored) <= usize::from(fuzziness)
}

#[async_trait]
impl SearchBackend for FakeCatalogue {
    async fn search(&self, query: &FuzzyQuery) -> Result<Vec<CatalogueHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if self.failing_authors.contains(&query.author) {
            return Err(SearchError::Network("connection refused".to_string()));
        }

        Ok(self
            .books
            .iter()
            .filter(|book| {
                let author = within(&query.author, &book.normal_author, query.fuzziness);
                let title = within(&query.title, &book.normal_title, query.fuzziness);
                match query.shape {
                    QueryShape::Joint => author && title,
                    QueryShape::AuthorLed => author,
                    QueryShape::TitleLed => title,
                }
            })
            .take(query.size)
            .cloned()
            .collect())
    }
}
