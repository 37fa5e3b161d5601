//! Catalogue search client
//!
//! Wraps a [`SearchBackend`] with the pieces every query needs:
//! normalisation, a per-run response cache, a concurrency cap, a per-query
//! timeout and hit scoring. The backend itself only knows how to run one
//! fuzzy query.

use super::match_scorer::{compare, is_confident, sanity_check};
use super::normalizer::{normalize_author, normalize_title};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelfscan_common::config::SearchConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock, Semaphore};
use tracing::{debug, info};

/// Search errors
///
/// Every variant is scoped to the one query that produced it.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// How the author and title clauses combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryShape {
    /// Both fields must match
    Joint,
    /// Author must match, title boosts ranking
    AuthorLed,
    /// Title must match, author boosts ranking
    TitleLed,
}

/// One fuzzy query against the catalogue, on normalised values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyQuery {
    pub shape: QueryShape,
    pub author: String,
    pub title: String,
    /// Maximum edit distance per clause
    pub fuzziness: u8,
    /// Result cap
    pub size: usize,
}

/// A catalogue entry returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueHit {
    pub id: String,
    pub author: String,
    pub title: String,
    pub normal_author: String,
    pub normal_title: String,
}

/// An accepted hit with the scores that accepted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMatch {
    pub id: String,
    pub author: String,
    pub title: String,
    pub author_score: u8,
    pub title_score: u8,
}

/// Anything that can run a fuzzy catalogue query
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one query, returning hits in backend rank order
    async fn search(&self, query: &FuzzyQuery) -> Result<Vec<CatalogueHit>, SearchError>;
}

/// Query tuning, taken from the `[search]` config section
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub fuzziness: u8,
    pub joint_size: usize,
    pub single_field_size: usize,
    pub timeout: Duration,
    pub max_concurrent_queries: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            fuzziness: config.fuzziness,
            joint_size: config.joint_size,
            single_field_size: config.single_field_size,
            timeout: Duration::from_millis(config.timeout_ms),
            max_concurrent_queries: config.max_concurrent_queries.max(1),
        }
    }
}

type CacheKey = (QueryShape, String, String);
type CacheEntry = Arc<OnceCell<Arc<Vec<CatalogueHit>>>>;

/// Cached, rate-capped access to a [`SearchBackend`]
pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
    settings: SearchSettings,
    cache: RwLock<HashMap<CacheKey, CacheEntry>>,
    permits: Semaphore,
    backend_calls: AtomicUsize,
}

impl SearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: SearchSettings) -> Self {
        let permits = Semaphore::new(settings.max_concurrent_queries.max(1));
        Self {
            backend,
            settings,
            cache: RwLock::new(HashMap::new()),
            permits,
            backend_calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries that actually reached the backend
    pub fn backend_calls(&self) -> usize {
        self.backend_calls.load(Ordering::Relaxed)
    }

    /// Number of cached responses
    pub async fn cached_queries(&self) -> usize {
        self.cache
            .read()
            .await
            .values()
            .filter(|entry| entry.initialized())
            .count()
    }

    /// Look up a book from raw candidate text
    ///
    /// Returns `Ok(None)` when either value normalises to nothing or no hit
    /// passes scoring. Hits are tried in backend rank order and the first
    /// accepted one wins.
    pub async fn find_book(
        &self,
        author: &str,
        title: &str,
        shape: QueryShape,
    ) -> Result<Option<BookMatch>, SearchError> {
        let author = normalize_author(author);
        let title = normalize_title(title);

        if author.is_empty() || title.is_empty() {
            debug!("Skip search, nothing left after normalisation");
            return Ok(None);
        }

        let hits = self.cached_search(shape, author.clone(), title.clone()).await?;

        for hit in hits.iter() {
            if hit.normal_author.is_empty() || hit.normal_title.is_empty() {
                continue;
            }

            let author_score = compare(&author, &hit.normal_author);
            let title_score = compare(&title, &hit.normal_title);

            debug!(
                id = %hit.id,
                author_score,
                title_score,
                "{} - {} vs {} - {}",
                author,
                title,
                hit.normal_author,
                hit.normal_title
            );

            if is_confident(author_score, title_score)
                && sanity_check(&hit.normal_author, &hit.normal_title)
            {
                info!(id = %hit.id, "FOUND: {} - {}", hit.author, hit.title);
                return Ok(Some(BookMatch {
                    id: hit.id.clone(),
                    author: hit.author.clone(),
                    title: hit.title.clone(),
                    author_score,
                    title_score,
                }));
            }
        }

        Ok(None)
    }

    /// Fetch or create the cache slot for `key`
    async fn cache_entry(&self, key: &CacheKey) -> CacheEntry {
        if let Some(entry) = self.cache.read().await.get(key) {
            return Arc::clone(entry);
        }

        Arc::clone(self.cache.write().await.entry(key.clone()).or_default())
    }

    /// Run a query at most once per key
    ///
    /// Concurrent callers with the same key wait on the one in-flight
    /// request. A failed request leaves the slot empty so the next caller
    /// retries.
    async fn cached_search(
        &self,
        shape: QueryShape,
        author: String,
        title: String,
    ) -> Result<Arc<Vec<CatalogueHit>>, SearchError> {
        let key = (shape, author, title);
        let entry = self.cache_entry(&key).await;

        if let Some(hits) = entry.get() {
            debug!(author = %key.1, title = %key.2, "Found cache entry");
            return Ok(Arc::clone(hits));
        }

        let hits = entry.get_or_try_init(|| self.run_query(&key)).await?;
        Ok(Arc::clone(hits))
    }

    async fn run_query(&self, key: &CacheKey) -> Result<Arc<Vec<CatalogueHit>>, SearchError> {
        let (shape, author, title) = key;
        let query = FuzzyQuery {
            shape: *shape,
            author: author.clone(),
            title: title.clone(),
            fuzziness: self.settings.fuzziness,
            size: match shape {
                QueryShape::Joint => self.settings.joint_size,
                QueryShape::AuthorLed | QueryShape::TitleLed => self.settings.single_field_size,
            },
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        self.backend_calls.fetch_add(1, Ordering::Relaxed);

        match tokio::time::timeout(self.settings.timeout, self.backend.search(&query)).await {
            Ok(result) => Ok(Arc::new(result?)),
            Err(_) => Err(SearchError::Timeout(self.settings.timeout)),
        }
    }
}
