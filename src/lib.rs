//! # Pixel Circuit
//!
//! Aggregates recent gaming and technology posts from a link-aggregation
//! site and a news-search API into one categorized feed, and reformats
//! individual linked articles into typed display blocks.
//!
//! ## Architecture
//!
//! 1. **Sources** ([`sources`]): one request per source and category
//! 2. **Normalization** ([`normalize`]): raw records become [`models::Post`]s
//! 3. **Filtering** ([`filter`]): sensitive-topic and category rules
//! 4. **Deduplication** ([`dedup`]): exact URL and near-identical titles
//! 5. **Orchestration** ([`pipeline`]): the steps above per category, then
//!    a cross-category dedup pass
//!
//! Article detail is served separately by [`article::ArticleExtractor`],
//! which downloads a page, extracts its text and hands it to
//! [`reformat::reformat`].

pub mod article;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod images;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod pipeline;
pub mod reformat;
pub mod sources;
pub mod utils;

pub use article::ArticleExtractor;
pub use config::AggregatorConfig;
pub use dedup::Deduplicator;
pub use error::{ExtractionError, FetchError};
pub use filter::CategoryFilter;
pub use models::{AggregatedFeed, ArticleBlock, ArticleView, Category, Post};
pub use pipeline::AggregationPipeline;
pub use sources::{Source, SourceClient};
