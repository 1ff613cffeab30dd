//! JSON output of an [`AggregatedFeed`].
//!
//! One file per run, grouped by the local date of the run and named after
//! its local time of day.

use crate::models::AggregatedFeed;
use chrono::{DateTime, Local};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the file a run at `at` writes: `{dir}/{YYYY-MM-DD}/{HH-MM-SS}.json`.
pub fn feed_path(json_output_dir: &str, at: DateTime<Local>) -> PathBuf {
    Path::new(json_output_dir)
        .join(at.format("%Y-%m-%d").to_string())
        .join(format!("{}.json", at.format("%H-%M-%S")))
}

/// Serialize `feed` and write it under `json_output_dir`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_feed(
    feed: &AggregatedFeed,
    json_output_dir: &str,
    pretty: bool,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(feed)?
    } else {
        serde_json::to_string(feed)?
    };

    let path = feed_path(json_output_dir, Local::now());
    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), total_posts = feed.total_posts, "Wrote feed JSON");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_feed_path_layout() {
        let at = Local.with_ymd_and_hms(2025, 5, 6, 14, 30, 12).unwrap();
        assert_eq!(
            feed_path("/tmp/out", at),
            PathBuf::from("/tmp/out/2025-05-06/14-30-12.json")
        );
    }

    #[tokio::test]
    async fn test_write_feed_round_trips() {
        let dir = std::env::temp_dir().join(format!("pixel_circuit_json_{}", std::process::id()));
        let feed = AggregatedFeed {
            last_updated: "2025-05-06 14:30:12".to_string(),
            ..AggregatedFeed::default()
        };
        let path = write_feed(&feed, &dir.to_string_lossy(), true).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["total_posts"], 0);
        assert_eq!(value["last_updated"], "2025-05-06 14:30:12");
        assert!(value["gaming_posts"].as_array().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
