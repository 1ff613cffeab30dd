//! The aggregation pipeline.
//!
//! One invocation fetches every configured category and returns an
//! [`AggregatedFeed`]. Per category:
//!
//! 1. **Fetch**: each source in order, one request each. A failing source
//!    contributes nothing and the others still run.
//! 2. **Normalize**: raw records become [`Post`]s or are dropped.
//! 3. **Filter**: [`CategoryFilter::accept`] for the category fetched under.
//! 4. **Dedupe**: within the category, then truncate to the per-category cap.
//!
//! Categories are fetched concurrently, each under its own per-request
//! timeout, and results are joined back in configuration order. A final
//! pass dedupes the concatenation of all categories' survivors, which
//! catches one story classified into two categories, then partitions by
//! each post's own category and truncates again.
//!
//! Nothing is cached; every call repeats all network work.

use crate::config::AggregatorConfig;
use crate::dedup::{Deduplicator, LevenshteinRatio, TitleSimilarity};
use crate::error::FetchError;
use crate::filter::CategoryFilter;
use crate::models::{AggregatedFeed, Category, Post};
use crate::normalize::normalize;
use crate::sources::{RawRecord, Source, SourceClient, build_http_client, sources_from_config};
use chrono::Local;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

pub struct AggregationPipeline<S = Source, M = LevenshteinRatio> {
    sources: Vec<S>,
    filter: CategoryFilter,
    dedup: Deduplicator<M>,
    categories: Vec<Category>,
    max_posts_per_category: usize,
    fetch_size: usize,
}

impl AggregationPipeline {
    /// Wire the production sources, the built-in filter and the default
    /// similarity measure from `config`.
    pub fn from_config(config: &AggregatorConfig) -> Result<Self, FetchError> {
        let client = build_http_client(config)?;
        Ok(Self::new(
            sources_from_config(config, &client),
            CategoryFilter::default(),
            Deduplicator::new(config.similarity_threshold),
            config,
        ))
    }
}

impl<S: SourceClient, M: TitleSimilarity> AggregationPipeline<S, M> {
    pub fn new(
        sources: Vec<S>,
        filter: CategoryFilter,
        dedup: Deduplicator<M>,
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            sources,
            filter,
            dedup,
            categories: config.categories.clone(),
            max_posts_per_category: config.max_posts_per_category,
            fetch_size: config.fetch_size(),
        }
    }

    /// Run every category and assemble the feed.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self) -> AggregatedFeed {
        let batches = join_all(self.categories.iter().map(|c| self.collect_category(*c))).await;
        let combined: Vec<Post> = batches.into_iter().flatten().collect();
        let before = combined.len();
        let survivors = self.dedup.dedupe(combined);
        info!(before, after = survivors.len(), "Cross-category dedup complete");

        let mut by_category: HashMap<Category, Vec<Post>> = HashMap::new();
        for post in survivors {
            let bucket = by_category.entry(post.category).or_default();
            if bucket.len() < self.max_posts_per_category {
                bucket.push(post);
            }
        }

        let gaming_posts = by_category.remove(&Category::Gaming).unwrap_or_default();
        let technology_posts = by_category.remove(&Category::Technology).unwrap_or_default();
        let total_posts = gaming_posts.len() + technology_posts.len();
        info!(
            gaming = gaming_posts.len(),
            technology = technology_posts.len(),
            total_posts,
            "Feed assembled"
        );

        AggregatedFeed {
            gaming_posts,
            technology_posts,
            total_posts,
            last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Fetch, normalize, filter, dedupe and truncate one category.
    #[instrument(level = "info", skip(self))]
    pub async fn collect_category(&self, category: Category) -> Vec<Post> {
        let records = self.fetch_category(category).await;
        let fetched = records.len();

        let posts: Vec<Post> = records
            .into_iter()
            .filter_map(|r| normalize(r, category))
            .filter(|p| self.filter.accept(p, category))
            .collect();
        let accepted = posts.len();

        let mut posts = self.dedup.dedupe(posts);
        let unique = posts.len();
        posts.truncate(self.max_posts_per_category);

        info!(fetched, accepted, unique, kept = posts.len(), "Category collected");
        posts
    }

    async fn fetch_category(&self, category: Category) -> Vec<RawRecord> {
        let mut records = Vec::new();
        for source in &self.sources {
            match source.fetch(category, self.fetch_size).await {
                Ok(batch) => records.extend(batch),
                Err(e) => warn!(
                    source = source.name(),
                    %category,
                    kind = %e.kind(),
                    transient = e.is_transient(),
                    error = %e,
                    "Source fetch failed; continuing with empty batch"
                ),
            }
        }
        records
    }
}
