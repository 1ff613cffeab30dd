//! Upstream content sources.
//!
//! Each source performs one HTTP fetch per category and returns raw,
//! source-shaped records. Normalization into [`crate::models::Post`]
//! happens downstream in [`crate::normalize`].
//!
//! # Supported Sources
//!
//! | Source | Module | Category selection | Notes |
//! |--------|--------|--------------------|-------|
//! | Link aggregation | [`link_aggregation`] | Path parameter (fixed collection) | Reddit-style listing JSON |
//! | News search | [`news_search`] | Boolean keyword query | NewsAPI-style `everything` search; needs an API key |
//!
//! # Common Patterns
//!
//! Every source implements [`SourceClient`]:
//! - `fetch(category, max_items)`: one request, bounded by the shared
//!   client timeout, returning `Err(FetchError)` instead of panicking or
//!   retrying
//! - Responses are read as text and handed to a pure `parse_*` function so
//!   the wire format can be tested without a network
//! - Each source clamps `max_items` to its own page-size cap

pub mod link_aggregation;
pub mod news_search;

pub use link_aggregation::{LinkAggregationSource, LinkRecord};
pub use news_search::{NewsArticleRecord, NewsSearchSource};

use crate::config::AggregatorConfig;
use crate::error::FetchError;
use crate::models::Category;
use reqwest::Client;
use tracing::{info, warn};

/// A record exactly as a source returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Link(LinkRecord),
    News(NewsArticleRecord),
}

/// The capability of fetching raw records for one category.
pub trait SourceClient {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch at most `max_items` records relevant to `category`.
    ///
    /// Order follows the source's native ordering. Implementations may be
    /// written as `async fn`; the future must be `Send`.
    fn fetch(
        &self,
        category: Category,
        max_items: usize,
    ) -> impl std::future::Future<Output = Result<Vec<RawRecord>, FetchError>> + Send;
}

/// The concrete sources, selected explicitly by the orchestrator.
#[derive(Debug, Clone)]
pub enum Source {
    LinkAggregation(LinkAggregationSource),
    NewsSearch(NewsSearchSource),
}

impl SourceClient for Source {
    fn name(&self) -> &str {
        match self {
            Source::LinkAggregation(s) => s.name(),
            Source::NewsSearch(s) => s.name(),
        }
    }

    async fn fetch(
        &self,
        category: Category,
        max_items: usize,
    ) -> Result<Vec<RawRecord>, FetchError> {
        match self {
            Source::LinkAggregation(s) => s.fetch(category, max_items).await,
            Source::NewsSearch(s) => s.fetch(category, max_items).await,
        }
    }
}

/// Build the HTTP client every source shares.
///
/// The timeout applies per request; the user agent is sent on every call.
pub fn build_http_client(config: &AggregatorConfig) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| FetchError::Transport(e.to_string()))
}

/// Instantiate every source the configuration enables, in fetch order.
pub fn sources_from_config(config: &AggregatorConfig, client: &Client) -> Vec<Source> {
    let mut sources = Vec::new();
    if config.news_search.is_enabled() {
        sources.push(Source::NewsSearch(NewsSearchSource::new(
            client.clone(),
            &config.news_search,
        )));
    } else {
        warn!("No news search API key configured; news search source disabled");
    }
    if config.link_aggregation.enabled {
        sources.push(Source::LinkAggregation(LinkAggregationSource::new(
            client.clone(),
            &config.link_aggregation,
        )));
    }
    info!(
        count = sources.len(),
        names = ?sources.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
        "Configured sources"
    );
    sources
}
