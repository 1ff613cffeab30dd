//! Data models shared by the aggregation pipeline and the article view.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Category`]: The fixed topical buckets posts are fetched under
//! - [`Post`]: A normalized content item, whatever source it came from
//! - [`AggregatedFeed`]: The per-invocation output of the pipeline
//! - [`ArticleBlock`]: One structurally classified unit of article text
//! - [`ArticleView`]: Blocks plus the resolved featured image of one article
//!
//! Everything here is transient. Posts and blocks are rebuilt on every
//! invocation and carry no identity beyond their URL and title.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author shown when a source does not name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Display text for a post whose timestamp is missing or unparseable.
pub const UNKNOWN_TIME: &str = "Unknown";

/// Text of the single block returned when an article cannot be shown.
pub const CONTENT_UNAVAILABLE: &str = "Content not available.";

/// A topical bucket used both to query sources and to classify results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gaming,
    Technology,
}

impl Category {
    /// Every category, in output order.
    pub const ALL: [Category; 2] = [Category::Gaming, Category::Technology];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Gaming => "gaming",
            Category::Technology => "technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized content item.
///
/// Built by [`crate::normalize::normalize`] from a raw source record. A
/// retained post always has a non-empty `title` and `url`, and its
/// `category` is the one it was fetched under.
///
/// `score` and `comment_count` are `0` when the source has no such metric.
/// That zero is a normalization default, not a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    /// Canonical link to the item; the uniqueness key during dedup.
    pub url: String,
    /// Link to the off-site resource. Equal to `url` for news results.
    pub external_url: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub category: Category,
    pub score: u64,
    pub comment_count: u64,
    pub description: String,
    pub image_url: String,
    /// True when the item is text-only and has no external target.
    pub is_self_post: bool,
}

impl Post {
    /// Creation time as `YYYY-MM-DD HH:MM`, or `"Unknown"`.
    pub fn created_display(&self) -> String {
        match self.created_at {
            Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
            None => UNKNOWN_TIME.to_string(),
        }
    }
}

/// Output of one pipeline invocation, handed to the rendering layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedFeed {
    pub gaming_posts: Vec<Post>,
    pub technology_posts: Vec<Post>,
    pub total_posts: usize,
    /// Local time the feed was assembled, `YYYY-MM-DD HH:MM:SS`.
    pub last_updated: String,
}

impl AggregatedFeed {
    pub fn posts_for(&self, category: Category) -> &[Post] {
        match category {
            Category::Gaming => &self.gaming_posts,
            Category::Technology => &self.technology_posts,
        }
    }
}

/// Value of the `rel` attribute every rendered link carries.
pub const SAFE_REL: &str = "noopener noreferrer";

/// A hyperlink lifted out of `[label](target)` markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    pub label: String,
    pub href: String,
    /// Open the target in a new browsing context.
    pub new_context: bool,
    pub rel: String,
}

impl Hyperlink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            new_context: true,
            rel: SAFE_REL.to_string(),
        }
    }
}

/// A run of block text: either literal text or a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Link(Hyperlink),
}

/// The text of one block with its links annotated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockText {
    pub segments: Vec<Inline>,
}

impl BlockText {
    /// Text with no link annotations.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Inline::Text { text: text.into() }],
        }
    }

    /// The text a reader sees, with links reduced to their labels.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Inline::Text { text } => text.as_str(),
                Inline::Link(link) => link.label.as_str(),
            })
            .collect()
    }

    pub fn links(&self) -> impl Iterator<Item = &Hyperlink> {
        self.segments.iter().filter_map(|s| match s {
            Inline::Link(link) => Some(link),
            Inline::Text { .. } => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    /// Render as escaped HTML with anchors for every link.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Inline::Text { text } => out.push_str(&html_escape::encode_text(text)),
                Inline::Link(link) => {
                    out.push_str("<a href=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(&link.href));
                    out.push('"');
                    if link.new_context {
                        out.push_str(" target=\"_blank\"");
                    }
                    out.push_str(" rel=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(&link.rel));
                    out.push_str("\">");
                    out.push_str(&html_escape::encode_text(&link.label));
                    out.push_str("</a>");
                }
            }
        }
        out
    }
}

/// One structurally classified unit of extracted article text.
///
/// Blocks are produced in the order the units appeared in the source text
/// and are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ArticleBlock {
    Paragraph(BlockText),
    Quote(BlockText),
    Heading(BlockText),
}

impl ArticleBlock {
    /// The single block shown when an article could not be extracted.
    pub fn unavailable() -> Self {
        ArticleBlock::Paragraph(BlockText::plain(CONTENT_UNAVAILABLE))
    }

    pub fn is_unavailable(&self) -> bool {
        *self == Self::unavailable()
    }

    pub fn text(&self) -> &BlockText {
        match self {
            ArticleBlock::Paragraph(t) | ArticleBlock::Quote(t) | ArticleBlock::Heading(t) => t,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            ArticleBlock::Paragraph(t) => format!("<p>{}</p>", t.to_html()),
            ArticleBlock::Quote(t) => format!("<blockquote>{}</blockquote>", t.to_html()),
            ArticleBlock::Heading(t) => format!("<h3>{}</h3>", t.to_html()),
        }
    }
}

/// What the article endpoint hands to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleView {
    pub url: String,
    pub blocks: Vec<ArticleBlock>,
    pub featured_image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_post() -> Post {
        Post {
            title: "New handheld announced".to_string(),
            url: "https://example.com/handheld".to_string(),
            external_url: "https://example.com/handheld".to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            created_at: None,
            category: Category::Gaming,
            score: 0,
            comment_count: 0,
            description: String::new(),
            image_url: String::new(),
            is_self_post: false,
        }
    }

    #[test]
    fn test_created_display_unknown() {
        assert_eq!(sample_post().created_display(), "Unknown");
    }

    #[test]
    fn test_created_display_formats_minutes() {
        let mut post = sample_post();
        post.created_at = Some(Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 59).unwrap());
        assert_eq!(post.created_display(), "2025-05-06 14:30");
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Technology).unwrap();
        assert_eq!(json, "\"technology\"");
        let back: Category = serde_json::from_str("\"gaming\"").unwrap();
        assert_eq!(back, Category::Gaming);
    }

    #[test]
    fn test_feed_posts_for() {
        let feed = AggregatedFeed {
            gaming_posts: vec![sample_post()],
            technology_posts: vec![],
            total_posts: 1,
            last_updated: "2025-05-06 08:00:00".to_string(),
        };
        assert_eq!(feed.posts_for(Category::Gaming).len(), 1);
        assert!(feed.posts_for(Category::Technology).is_empty());
    }

    #[test]
    fn test_block_html_escapes_and_marks_links() {
        let text = BlockText {
            segments: vec![
                Inline::Text {
                    text: "Fish & chips at ".to_string(),
                },
                Inline::Link(Hyperlink::new("<site>", "http://x.test/?a=1&b=\"2\"")),
            ],
        };
        let html = ArticleBlock::Paragraph(text).to_html();
        assert_eq!(
            html,
            "<p>Fish &amp; chips at <a href=\"http://x.test/?a=1&amp;b=&quot;2&quot;\" \
             target=\"_blank\" rel=\"noopener noreferrer\">&lt;site&gt;</a></p>"
        );
    }

    #[test]
    fn test_unavailable_block() {
        let block = ArticleBlock::unavailable();
        assert!(block.is_unavailable());
        assert_eq!(block.text().plain_text(), CONTENT_UNAVAILABLE);
        assert!(!ArticleBlock::Paragraph(BlockText::plain("Other")).is_unavailable());
    }

    #[test]
    fn test_block_serialization_shape() {
        let block = ArticleBlock::Heading(BlockText::plain("HELLO"));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["kind"], "heading");
        assert_eq!(json["text"][0]["type"], "text");
        assert_eq!(json["text"][0]["text"], "HELLO");
    }
}
