//! Immutable aggregator configuration.
//!
//! A single [`AggregatorConfig`] is built at startup (defaults, then an
//! optional YAML file, then CLI/environment overrides) and passed by
//! reference into every source and the pipeline. Nothing reads
//! configuration from process-wide state.
//!
//! # Example file
//!
//! ```yaml
//! timeout_secs: 10
//! max_posts_per_category: 10
//! categories: [gaming, technology]
//! link_aggregation:
//!   listing: top
//! news_search:
//!   api_key: "..."
//! ```

use crate::models::Category;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "PixelCircuit Content Aggregator 1.0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the link-aggregation source (fixed per-category collections).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkAggregationConfig {
    pub enabled: bool,
    /// Base origin; permalinks are joined onto it to form post URLs.
    pub origin: String,
    /// Listing within a collection, e.g. `hot`, `new`, `top`.
    pub listing: String,
    pub gaming_collection: String,
    pub technology_collection: String,
}

impl Default for LinkAggregationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origin: "https://www.reddit.com".to_string(),
            listing: "hot".to_string(),
            gaming_collection: "gaming".to_string(),
            technology_collection: "technology".to_string(),
        }
    }
}

impl LinkAggregationConfig {
    pub fn collection_for(&self, category: Category) -> &str {
        match category {
            Category::Gaming => &self.gaming_collection,
            Category::Technology => &self.technology_collection,
        }
    }
}

/// Settings for the news-search source (free-text keyword queries).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSearchConfig {
    pub endpoint: String,
    /// The source is skipped entirely when no key is configured.
    pub api_key: Option<String>,
    pub gaming_query: String,
    pub technology_query: String,
}

impl Default for NewsSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://newsapi.org/v2/everything".to_string(),
            api_key: None,
            gaming_query:
                r#"gaming OR "video games" OR esports OR PlayStation OR Xbox OR Nintendo OR Steam"#
                    .to_string(),
            technology_query: r#"technology OR tech OR software OR AI OR "artificial intelligence" OR startup OR programming"#
                .to_string(),
        }
    }
}

impl NewsSearchConfig {
    pub fn query_for(&self, category: Category) -> &str {
        match category {
            Category::Gaming => &self.gaming_query,
            Category::Technology => &self.technology_query,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Per-request bound, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Survivors kept per category after each dedup pass.
    pub max_posts_per_category: usize,
    /// Titles more similar than this (strictly) are duplicates.
    pub similarity_threshold: f64,
    /// Extra items requested per call to offset filtering loss.
    pub over_fetch: usize,
    pub categories: Vec<Category>,
    pub link_aggregation: LinkAggregationConfig,
    pub news_search: NewsSearchConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_posts_per_category: 10,
            similarity_threshold: 0.85,
            over_fetch: 5,
            categories: Category::ALL.to_vec(),
            link_aggregation: LinkAggregationConfig::default(),
            news_search: NewsSearchConfig::default(),
        }
    }
}

impl AggregatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Items requested per source call; each source clamps to its own cap.
    pub fn fetch_size(&self) -> usize {
        self.max_posts_per_category + self.over_fetch
    }

    /// Parse a YAML document; missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml_str(&yaml)?;
        info!(path, categories = ?config.categories, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.max_posts_per_category == 0 {
            return Err(ConfigError::Invalid(
                "max_posts_per_category must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("at least one category is required".into()));
        }
        for (i, c) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(c) {
                return Err(ConfigError::Invalid(format!("category {c} listed twice")));
            }
        }
        if url::Url::parse(&self.link_aggregation.origin).is_err() {
            return Err(ConfigError::Invalid(format!(
                "link_aggregation.origin is not a URL: {}",
                self.link_aggregation.origin
            )));
        }
        Ok(())
    }
}
