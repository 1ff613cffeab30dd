//! Command-line interface definitions for Pixel Circuit.
//!
//! Global options can be given as flags or environment variables and are
//! overlaid on top of the optional YAML configuration file.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Pixel Circuit aggregator.
///
/// # Examples
///
/// ```sh
/// # Print one aggregation run as JSON
/// pixel_circuit feed --pretty
///
/// # Write the run to ./json/<date>/<time>.json
/// pixel_circuit --news-api-key YOUR_KEY feed -j ./json
///
/// # Reformat a single article as HTML
/// pixel_circuit article --url https://example.com/story --html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, global = true, env = "PIXEL_CIRCUIT_CONFIG")]
    pub config: Option<String>,

    /// News search API key; the news source is disabled without one
    #[arg(long, global = true, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the aggregation pipeline once
    Feed {
        /// Output directory for the JSON feed; prints to stdout when absent
        #[arg(short, long)]
        json_output_dir: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Extract and reformat one linked article
    Article {
        /// Article URL
        #[arg(long)]
        url: String,

        /// Post title, used to pick a placeholder image
        #[arg(long, default_value = "")]
        title: String,

        /// Source name, used to pick a placeholder image
        #[arg(long, default_value = "")]
        source: String,

        /// Featured image already known for the post
        #[arg(long)]
        image: Option<String>,

        /// Print HTML fragments instead of JSON
        #[arg(long)]
        html: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_parsing() {
        let cli = Cli::parse_from(["pixel_circuit", "feed", "--json-output-dir", "./json"]);
        assert_eq!(
            cli.command,
            Command::Feed {
                json_output_dir: Some("./json".to_string()),
                pretty: false,
            }
        );
    }

    #[test]
    fn test_feed_short_flag_and_globals_after_subcommand() {
        let cli = Cli::parse_from([
            "pixel_circuit",
            "feed",
            "-j",
            "/tmp/json",
            "--pretty",
            "--timeout-secs",
            "3",
            "--config",
            "/etc/pc.yaml",
        ]);
        assert_eq!(cli.timeout_secs, Some(3));
        assert_eq!(cli.config.as_deref(), Some("/etc/pc.yaml"));
        assert!(matches!(cli.command, Command::Feed { pretty: true, .. }));
    }

    #[test]
    fn test_article_parsing() {
        let cli = Cli::parse_from([
            "pixel_circuit",
            "--news-api-key",
            "k",
            "article",
            "--url",
            "https://example.com/story",
            "--title",
            "Xbox news",
            "--html",
        ]);
        assert_eq!(cli.news_api_key.as_deref(), Some("k"));
        assert_eq!(
            cli.command,
            Command::Article {
                url: "https://example.com/story".to_string(),
                title: "Xbox news".to_string(),
                source: String::new(),
                image: None,
                html: true,
            }
        );
    }

    #[test]
    fn test_article_requires_url() {
        assert!(Cli::try_parse_from(["pixel_circuit", "article"]).is_err());
    }
}
