//! Link-aggregation source (Reddit-style listings).
//!
//! Categories map to fixed collections selected by path parameter:
//! `GET {origin}/r/{collection}/{listing}.json?limit=N`.
//!
//! The response is a listing envelope whose children each wrap one record:
//!
//! ```text
//! { "data": { "children": [ { "data": { "title": ..., "permalink": ... } } ] } }
//! ```
//!
//! Permalinks are relative and are resolved against the configured origin
//! to form the post URL.

use super::{RawRecord, SourceClient};
use crate::config::LinkAggregationConfig;
use crate::error::FetchError;
use crate::models::Category;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const SOURCE_NAME: &str = "link_aggregation";

/// Largest `limit` the listing endpoint honours.
pub const MAX_PAGE_SIZE: usize = 100;

/// One child record of a listing, as the source shapes it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkRecord {
    pub title: Option<String>,
    pub permalink: Option<String>,
    pub score: i64,
    pub num_comments: i64,
    pub author: Option<String>,
    /// Epoch seconds; the source sends it as a float.
    pub created_utc: Option<f64>,
    /// External target of the item.
    pub url: Option<String>,
    pub is_self: bool,
    pub selftext: Option<String>,
    pub thumbnail: Option<String>,
    /// `permalink` resolved against the source origin.
    #[serde(skip)]
    pub permalink_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: LinkRecord,
}

#[derive(Debug, Clone)]
pub struct LinkAggregationSource {
    client: Client,
    config: LinkAggregationConfig,
}

impl LinkAggregationSource {
    pub fn new(client: Client, config: &LinkAggregationConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn endpoint(&self, category: Category) -> String {
        format!(
            "{}/r/{}/{}.json",
            self.config.origin.trim_end_matches('/'),
            self.config.collection_for(category),
            self.config.listing
        )
    }
}

impl SourceClient for LinkAggregationSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip(self, category), fields(source = SOURCE_NAME, %category))]
    async fn fetch(
        &self,
        category: Category,
        max_items: usize,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let limit = max_items.min(MAX_PAGE_SIZE);
        let endpoint = self.endpoint(category);
        debug!(%endpoint, limit, "Requesting listing");

        let response = self
            .client
            .get(&endpoint)
            .query(&[("limit", limit.to_string())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let records = parse_listing(status, &body, &self.config.origin)?;
        info!(count = records.len(), "Fetched listing records");
        Ok(records.into_iter().take(limit).map(RawRecord::Link).collect())
    }
}

/// Parse a listing response body.
///
/// Non-success statuses become [`FetchError::UpstreamStatus`]; bodies that
/// do not match the envelope become [`FetchError::Parse`].
pub fn parse_listing(status: u16, body: &str, origin: &str) -> Result<Vec<LinkRecord>, FetchError> {
    if !(200..300).contains(&status) {
        warn!(status, body = %truncate_for_log(body, 200), "Listing request failed");
        return Err(FetchError::UpstreamStatus {
            status,
            message: truncate_for_log(body.trim(), 200),
        });
    }

    let listing: Listing = serde_json::from_str(body)?;
    let base = Url::parse(origin).ok();

    let records = listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let mut record = child.data;
            record.permalink_url = match (&base, record.permalink.as_deref()) {
                (Some(base), Some(p)) if !p.is_empty() => base.join(p).ok().map(|u| u.to_string()),
                _ => None,
            };
            record
        })
        .collect();
    Ok(records)
}
