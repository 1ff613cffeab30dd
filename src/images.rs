//! Placeholder images for articles without a usable featured image.

use crate::filter::TermMatcher;
use once_cell::sync::Lazy;

pub const GAMING_PLACEHOLDER: &str = "/static/images/placeholder-gaming.svg";
pub const TECHNOLOGY_PLACEHOLDER: &str = "/static/images/placeholder-technology.svg";
/// Used when neither vocabulary matches.
pub const DEFAULT_PLACEHOLDER: &str = "/static/images/placeholder-default-tech.svg";

const GAMING_KEYWORDS: &[&str] = &[
    "game",
    "games",
    "gaming",
    "esports",
    "playstation",
    "xbox",
    "nintendo",
    "steam",
    "console",
    "kotaku",
    "polygon",
    "gamespot",
];

const TECHNOLOGY_KEYWORDS: &[&str] = &[
    "tech",
    "technology",
    "software",
    "ai",
    "artificial intelligence",
    "computer",
    "apple",
    "google",
    "microsoft",
    "startup",
    "verge",
    "wired",
    "ars technica",
    "engadget",
];

static GAMING_MATCHER: Lazy<TermMatcher> =
    Lazy::new(|| TermMatcher::new(GAMING_KEYWORDS).expect("static keywords"));

static TECHNOLOGY_MATCHER: Lazy<TermMatcher> =
    Lazy::new(|| TermMatcher::new(TECHNOLOGY_KEYWORDS).expect("static keywords"));

/// Pick a placeholder from the article title and source name.
///
/// Keywords match whole words of `"{title} {source}"`, case-insensitively,
/// gaming first. Total and deterministic.
pub fn fallback_image(title: &str, source_name: &str) -> &'static str {
    let haystack = format!("{title} {source_name}");
    if GAMING_MATCHER.is_match(&haystack) {
        GAMING_PLACEHOLDER
    } else if TECHNOLOGY_MATCHER.is_match(&haystack) {
        TECHNOLOGY_PLACEHOLDER
    } else {
        DEFAULT_PLACEHOLDER
    }
}
