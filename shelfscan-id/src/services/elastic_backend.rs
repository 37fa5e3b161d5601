//! Elasticsearch catalogue backend
//!
//! POSTs fuzzy bool queries to `{url}/{index}/_search` over the
//! `normalauthor` / `normaltitle` fields of the book catalogue.

use super::search_client::{CatalogueHit, FuzzyQuery, QueryShape, SearchBackend, SearchError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shelfscan_common::config::SearchConfig;
use std::time::Duration;

const USER_AGENT: &str = concat!("shelfscan/", env!("CARGO_PKG_VERSION"));

/// Boost applied to the optional clause of single-field queries
const SHOULD_BOOST: f64 = 2.0;

const AUTHOR_FIELD: &str = "normalauthor";
const TITLE_FIELD: &str = "normaltitle";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitList,
}

#[derive(Debug, Deserialize)]
struct HitList {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    #[serde(default)]
    author: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    normalauthor: String,
    #[serde(default)]
    normaltitle: String,
}

/// HTTP client for an Elasticsearch-compatible search service
pub struct ElasticBackend {
    http_client: reqwest::Client,
    search_url: String,
    timeout: Duration,
}

impl ElasticBackend {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            search_url: search_url(&config.url, &config.index),
            timeout,
        })
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn search(&self, query: &FuzzyQuery) -> Result<Vec<CatalogueHit>, SearchError> {
        let body = build_query_body(query);

        tracing::debug!(url = %self.search_url, shape = ?query.shape, "Querying search backend");

        let response = self
            .http_client
            .post(&self.search_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(self.timeout)
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(status.as_u16(), error_text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let hits = parse_hits(&text)?;

        tracing::debug!(
            author = %query.author,
            title = %query.title,
            hits = hits.len(),
            "Search backend responded"
        );

        Ok(hits)
    }
}

fn search_url(base: &str, index: &str) -> String {
    format!("{}/{}/_search", base.trim_end_matches('/'), index)
}

fn fuzzy_clause(field: &str, value: &str, fuzziness: u8) -> Value {
    json!({
        "fuzzy": {
            field: {
                "value": value,
                "fuzziness": fuzziness,
            }
        }
    })
}

fn boosted_clause(field: &str, value: &str, fuzziness: u8) -> Value {
    json!({
        "fuzzy": {
            field: {
                "value": value,
                "fuzziness": fuzziness,
                "boost": SHOULD_BOOST,
            }
        }
    })
}

/// Request body for one fuzzy query
pub fn build_query_body(query: &FuzzyQuery) -> Value {
    let author = (AUTHOR_FIELD, query.author.as_str());
    let title = (TITLE_FIELD, query.title.as_str());

    let bool_query = match query.shape {
        QueryShape::Joint => json!({
            "must": [
                fuzzy_clause(author.0, author.1, query.fuzziness),
                fuzzy_clause(title.0, title.1, query.fuzziness),
            ]
        }),
        QueryShape::AuthorLed => json!({
            "must": [fuzzy_clause(author.0, author.1, query.fuzziness)],
            "should": [boosted_clause(title.0, title.1, query.fuzziness)],
        }),
        QueryShape::TitleLed => json!({
            "must": [fuzzy_clause(title.0, title.1, query.fuzziness)],
            "should": [boosted_clause(author.0, author.1, query.fuzziness)],
        }),
    };

    json!({
        "size": query.size,
        "query": { "bool": bool_query },
    })
}

/// Extract hits, in rank order, from a `_search` response body
pub fn parse_hits(body: &str) -> Result<Vec<CatalogueHit>, SearchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

    Ok(response
        .hits
        .hits
        .into_iter()
        .map(|hit| CatalogueHit {
            id: hit.id,
            author: hit.source.author,
            title: hit.source.title,
            normal_author: hit.source.normalauthor,
            normal_title: hit.source.normaltitle,
        })
        .collect())
}
