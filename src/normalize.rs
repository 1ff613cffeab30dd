//! Mapping raw source records onto the canonical [`Post`].
//!
//! Normalization never fails a whole batch: a record either becomes a
//! `Post` or is dropped. Dropped records are those with no usable title
//! (empty or a removal sentinel) or no URL. Fields a source does not
//! provide fall back to fixed defaults:
//!
//! | Field | Default |
//! |-------|---------|
//! | `author` | `"Unknown"` |
//! | `created_at` | `None` (displayed as `"Unknown"`) |
//! | `score`, `comment_count` | `0` |
//! | `description`, `image_url` | empty |

use crate::models::{Category, Post, UNKNOWN_AUTHOR};
use crate::sources::{LinkRecord, NewsArticleRecord, RawRecord};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Titles sources use for items that were taken down.
const REMOVED_TITLES: [&str; 2] = ["[removed]", "[deleted]"];

/// Normalize one raw record fetched under `category`.
pub fn normalize(record: RawRecord, category: Category) -> Option<Post> {
    match record {
        RawRecord::Link(r) => from_link_record(r, category),
        RawRecord::News(r) => from_news_record(r, category),
    }
}

/// Whether a title is empty or one of the removal sentinels.
pub fn is_placeholder_title(title: &str) -> bool {
    let title = title.trim();
    title.is_empty() || REMOVED_TITLES.iter().any(|s| title.eq_ignore_ascii_case(s))
}

/// Epoch seconds to a timestamp. Zero, negative and non-finite values are
/// treated as unknown.
pub fn parse_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    DateTime::from_timestamp(whole, nanos)
}

/// ISO-8601 / RFC 3339 (`2025-05-06T14:30:00Z`) to a timestamp.
pub fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(s.trim()) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            debug!(value = %s, error = %e, "Unparseable timestamp; marking unknown");
            None
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn from_link_record(r: LinkRecord, category: Category) -> Option<Post> {
    let title = non_empty(r.title)?;
    if is_placeholder_title(&title) {
        debug!(%title, "Dropping record with placeholder title");
        return None;
    }
    let external = non_empty(r.url);
    let url = non_empty(r.permalink_url).or_else(|| external.clone())?;

    Some(Post {
        external_url: external.unwrap_or_else(|| url.clone()),
        url,
        title,
        author: non_empty(r.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        created_at: r.created_utc.and_then(parse_epoch_seconds),
        category,
        score: r.score.max(0) as u64,
        comment_count: r.num_comments.max(0) as u64,
        description: non_empty(r.selftext).unwrap_or_default(),
        image_url: non_empty(r.thumbnail)
            .filter(|t| is_http_url(t))
            .unwrap_or_default(),
        is_self_post: r.is_self,
    })
}

fn from_news_record(r: NewsArticleRecord, category: Category) -> Option<Post> {
    let title = non_empty(r.title)?;
    if is_placeholder_title(&title) {
        debug!(%title, "Dropping record with placeholder title");
        return None;
    }
    let url = non_empty(r.url)?;

    Some(Post {
        external_url: url.clone(),
        url,
        title,
        author: non_empty(r.source.and_then(|s| s.name))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        created_at: r.published_at.as_deref().and_then(parse_iso8601),
        category,
        score: 0,
        comment_count: 0,
        description: non_empty(r.description).unwrap_or_default(),
        image_url: non_empty(r.url_to_image).unwrap_or_default(),
        is_self_post: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::news_search::NewsSourceRef;
    use chrono::TimeZone;

    fn link(title: &str) -> LinkRecord {
        LinkRecord {
            title: Some(title.to_string()),
            permalink: Some("/r/gaming/comments/abc/x/".to_string()),
            permalink_url: Some("https://www.reddit.com/r/gaming/comments/abc/x/".to_string()),
            url: Some("https://news.example.com/story".to_string()),
            score: 42,
            num_comments: 7,
            author: Some("pixelfan".to_string()),
            created_utc: Some(1715000000.0),
            ..LinkRecord::default()
        }
    }

    fn news(title: &str) -> NewsArticleRecord {
        NewsArticleRecord {
            title: Some(title.to_string()),
            url: Some("https://www.theverge.com/story".to_string()),
            source: Some(NewsSourceRef {
                id: None,
                name: Some("The Verge".to_string()),
            }),
            published_at: Some("2025-05-06T14:30:00Z".to_string()),
            description: Some("Summary".to_string()),
            url_to_image: Some("https://cdn.example.com/a.jpg".to_string()),
            ..NewsArticleRecord::default()
        }
    }

    #[test]
    fn test_link_record_maps_fields() {
        let post = normalize(RawRecord::Link(link("  Big patch notes  ")), Category::Gaming).unwrap();
        assert_eq!(post.title, "Big patch notes");
        assert_eq!(post.url, "https://www.reddit.com/r/gaming/comments/abc/x/");
        assert_eq!(post.external_url, "https://news.example.com/story");
        assert_eq!(post.author, "pixelfan");
        assert_eq!(post.score, 42);
        assert_eq!(post.comment_count, 7);
        assert_eq!(post.category, Category::Gaming);
        assert_eq!(
            post.created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 6, 12, 53, 20).unwrap())
        );
    }

    #[test]
    fn test_link_record_defaults() {
        let record = LinkRecord {
            title: Some("Ask me anything".to_string()),
            permalink_url: Some("https://www.reddit.com/r/technology/comments/q/".to_string()),
            score: -12,
            is_self: true,
            thumbnail: Some("self".to_string()),
            ..LinkRecord::default()
        };
        let post = normalize(RawRecord::Link(record), Category::Technology).unwrap();
        assert_eq!(post.author, UNKNOWN_AUTHOR);
        assert_eq!(post.score, 0);
        assert_eq!(post.created_at, None);
        assert_eq!(post.created_display(), "Unknown");
        assert_eq!(post.external_url, post.url);
        assert_eq!(post.image_url, "");
        assert!(post.is_self_post);
    }

    #[test]
    fn test_news_record_maps_fields() {
        let post = normalize(RawRecord::News(news("Xbox unveils controller")), Category::Gaming).unwrap();
        assert_eq!(post.url, "https://www.theverge.com/story");
        assert_eq!(post.external_url, post.url);
        assert_eq!(post.author, "The Verge");
        assert_eq!(post.score, 0);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.created_display(), "2025-05-06 14:30");
        assert_eq!(post.image_url, "https://cdn.example.com/a.jpg");
        assert!(!post.is_self_post);
    }

    #[test]
    fn test_bad_timestamp_is_unknown_not_fatal() {
        let mut record = news("Chip shortage eases");
        record.published_at = Some("yesterday-ish".to_string());
        let post = normalize(RawRecord::News(record), Category::Technology).unwrap();
        assert_eq!(post.created_at, None);
    }

    #[test]
    fn test_missing_source_name() {
        let mut record = news("Chip shortage eases");
        record.source = None;
        let post = normalize(RawRecord::News(record), Category::Technology).unwrap();
        assert_eq!(post.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_drops_placeholder_titles() {
        assert!(normalize(RawRecord::News(news("[Removed]")), Category::Gaming).is_none());
        assert!(normalize(RawRecord::News(news("   ")), Category::Gaming).is_none());
        assert!(normalize(RawRecord::Link(link("[deleted]")), Category::Gaming).is_none());
        let mut untitled = news("x");
        untitled.title = None;
        assert!(normalize(RawRecord::News(untitled), Category::Gaming).is_none());
    }

    #[test]
    fn test_drops_missing_url() {
        let mut record = news("Valid title");
        record.url = Some(String::new());
        assert!(normalize(RawRecord::News(record), Category::Gaming).is_none());

        let record = LinkRecord {
            title: Some("Orphan".to_string()),
            ..LinkRecord::default()
        };
        assert!(normalize(RawRecord::Link(record), Category::Gaming).is_none());
    }

    #[test]
    fn test_parse_epoch_seconds() {
        assert_eq!(parse_epoch_seconds(0.0), None);
        assert_eq!(parse_epoch_seconds(f64::NAN), None);
        assert_eq!(
            parse_epoch_seconds(1.5).map(|t| t.timestamp_millis()),
            Some(1500)
        );
    }
}
