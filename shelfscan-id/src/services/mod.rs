//! Service modules for book identification
//!
//! Pure text services (normalisation, extraction, scoring) plus the
//! catalogue search client and its HTTP backend.

pub mod elastic_backend;
pub mod match_scorer;
pub mod normalizer;
pub mod search_client;
pub mod spine_extractor;

pub use elastic_backend::ElasticBackend;
pub use match_scorer::{compare, sanity_check, CONFIDENCE};
pub use normalizer::{normalize_author, normalize_title};
pub use search_client::{
    BookMatch, CatalogueHit, FuzzyQuery, QueryShape, SearchBackend, SearchClient, SearchError,
    SearchSettings,
};
pub use spine_extractor::{extract_spines, ExtractError};
