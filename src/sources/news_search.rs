//! News-search source (NewsAPI-style `everything` endpoint).
//!
//! Category relevance is expressed as a boolean keyword query:
//! `GET {endpoint}?q=..&apiKey=..&pageSize=N&sortBy=publishedAt&language=en`.
//!
//! The envelope carries its own `status` field which must equal `"ok"`;
//! on failure the upstream `message` is surfaced in the error.

use super::{RawRecord, SourceClient};
use crate::config::NewsSearchConfig;
use crate::error::FetchError;
use crate::models::Category;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

pub const SOURCE_NAME: &str = "news_search";

/// Largest `pageSize` the search endpoint honours.
pub const MAX_PAGE_SIZE: usize = 100;

const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewsSourceRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// One article of a search response, as the source shapes it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewsArticleRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<NewsSourceRef>,
    pub author: Option<String>,
    /// ISO-8601 with a `Z` suffix.
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsArticleRecord>,
}

#[derive(Debug, Clone)]
pub struct NewsSearchSource {
    client: Client,
    config: NewsSearchConfig,
}

impl NewsSearchSource {
    pub fn new(client: Client, config: &NewsSearchConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn query_params(&self, category: Category, page_size: usize) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.config.query_for(category).to_string()),
            ("apiKey", self.config.api_key.clone().unwrap_or_default()),
            ("pageSize", page_size.to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("language", "en".to_string()),
        ]
    }
}

impl SourceClient for NewsSearchSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip(self, category), fields(source = SOURCE_NAME, %category))]
    async fn fetch(
        &self,
        category: Category,
        max_items: usize,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let page_size = max_items.min(MAX_PAGE_SIZE);
        debug!(endpoint = %self.config.endpoint, page_size, "Requesting search results");

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&self.query_params(category, page_size))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let articles = parse_search_response(status, &body)?;
        info!(count = articles.len(), "Fetched search results");
        Ok(articles
            .into_iter()
            .take(page_size)
            .map(RawRecord::News)
            .collect())
    }
}

/// Parse a search response body.
///
/// The upstream reports errors both through the HTTP status and through the
/// envelope's `status` field; either one failing yields
/// [`FetchError::UpstreamStatus`] with the upstream message when present.
pub fn parse_search_response(status: u16, body: &str) -> Result<Vec<NewsArticleRecord>, FetchError> {
    let parsed: Result<SearchResponse, _> = serde_json::from_str(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| truncate_for_log(body.trim(), 200));
        warn!(status, %message, "Search request failed");
        return Err(FetchError::UpstreamStatus { status, message });
    }

    let response = parsed?;
    if response.status != STATUS_OK {
        let message = response.message.unwrap_or_else(|| "Unknown error".to_string());
        warn!(upstream_status = %response.status, %message, "Search envelope reported an error");
        return Err(FetchError::UpstreamStatus { status, message });
    }
    Ok(response.articles)
}
