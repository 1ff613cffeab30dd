//! # Pixel Circuit
//!
//! Command-line front end for the aggregator library.
//!
//! ## Usage
//!
//! ```sh
//! pixel_circuit feed -j ./json
//! pixel_circuit article --url https://example.com/story --html
//! ```
//!
//! `feed` runs the pipeline once and prints or writes the aggregated feed.
//! `article` downloads one linked article and prints its reformatted blocks.

use clap::Parser;
use itertools::Itertools;
use pixel_circuit::config::AggregatorConfig;
use pixel_circuit::outputs::json;
use pixel_circuit::sources::build_http_client;
use pixel_circuit::utils::ensure_writable_dir;
use pixel_circuit::{AggregationPipeline, ArticleExtractor, ArticleView};
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("pixel_circuit starting up");

    let args = Cli::parse();
    debug!(?args.command, config = ?args.config, "Parsed CLI arguments");

    let config = load_config(&args).await?;

    match args.command {
        Command::Feed {
            json_output_dir,
            pretty,
        } => {
            // Early check: ensure JSON output dir is writable
            if let Some(dir) = &json_output_dir {
                if let Err(e) = ensure_writable_dir(dir).await {
                    error!(
                        path = %dir,
                        error = %e,
                        "JSON output directory is not writable (fix perms or choose a different path)"
                    );
                    return Err(e);
                }
            }

            let pipeline = AggregationPipeline::from_config(&config)?;
            let feed = pipeline.run().await;

            match json_output_dir {
                Some(dir) => {
                    if let Err(e) = json::write_feed(&feed, &dir, pretty).await {
                        error!(error = %e, "Failed to write feed JSON");
                        return Err(e);
                    }
                }
                None if pretty => println!("{}", serde_json::to_string_pretty(&feed)?),
                None => println!("{}", serde_json::to_string(&feed)?),
            }
        }
        Command::Article {
            url,
            title,
            source,
            image,
            html,
        } => {
            let extractor = ArticleExtractor::new(build_http_client(&config)?);
            let view = extractor.view(&url, &title, &source, image.as_deref()).await;
            if html {
                println!("{}", view_to_html(&view));
            } else {
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// YAML file (if any) with CLI/env values laid over it.
async fn load_config(args: &Cli) -> Result<AggregatorConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AggregatorConfig::load(path).await?,
        None => AggregatorConfig::default(),
    };
    if let Some(key) = &args.news_api_key {
        config.news_search.api_key = Some(key.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    config.validate()?;
    info!(
        timeout_secs = config.timeout_secs,
        news_search = config.news_search.is_enabled(),
        link_aggregation = config.link_aggregation.enabled,
        "Configuration ready"
    );
    Ok(config)
}

fn view_to_html(view: &ArticleView) -> String {
    let image = format!(
        "<img src=\"{}\" alt=\"\">",
        html_escape::encode_double_quoted_attribute(&view.featured_image)
    );
    std::iter::once(image)
        .chain(view.blocks.iter().map(|b| b.to_html()))
        .join("\n")
}
