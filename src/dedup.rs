//! Near-duplicate elimination.
//!
//! [`Deduplicator::dedupe`] is stable and first-occurrence-wins. A post is
//! dropped when:
//! - its title or URL is empty,
//! - its URL was already kept, or
//! - its normalized title is more similar than the threshold to the title of
//!   any post already kept.
//!
//! The similarity measure sits behind [`TitleSimilarity`] so the algorithm
//! and the threshold can change without touching the pipeline.
//!
//! # Scaling
//!
//! Each candidate is compared against every kept title, so a batch costs
//! O(n·k) similarity computations. Batches here are a few dozen posts. For
//! batches in the thousands this needs an index (e.g. shingling or MinHash)
//! rather than a larger timeout.

use crate::models::Post;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::debug;

/// Default similarity above which two titles describe the same story.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// A symmetric similarity score in `[0, 1]`, where `1.0` means identical.
pub trait TitleSimilarity {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Similarity derived from Levenshtein edit distance over chars:
/// `1 - distance / max(len_a, len_b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl TitleSimilarity for LevenshteinRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let longest = a.len().max(b.len());
        if longest == 0 {
            return 1.0;
        }
        1.0 - levenshtein(&a, &b) as f64 / longest as f64
    }
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Lowercase, trim, and collapse internal whitespace.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().join(" ").to_lowercase()
}

#[derive(Debug, Clone)]
pub struct Deduplicator<S = LevenshteinRatio> {
    similarity: S,
    threshold: f64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        Self::with_similarity(LevenshteinRatio, threshold)
    }
}

impl<S: TitleSimilarity> Deduplicator<S> {
    pub fn with_similarity(similarity: S, threshold: f64) -> Self {
        Self {
            similarity,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Remove exact-URL and near-title duplicates, keeping first occurrences
    /// in their original order.
    pub fn dedupe(&self, posts: Vec<Post>) -> Vec<Post> {
        let input_len = posts.len();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut kept_titles: Vec<String> = Vec::new();
        let mut kept = Vec::with_capacity(posts.len());

        for post in posts {
            let url = post.url.trim();
            let title = normalize_title(&post.title);
            if url.is_empty() || title.is_empty() {
                continue;
            }
            if seen_urls.contains(url) {
                debug!(%url, "Dropping exact URL duplicate");
                continue;
            }
            if seen_titles.contains(&title) {
                debug!(%title, "Dropping exact title duplicate");
                continue;
            }
            if let Some(similar) = kept_titles
                .iter()
                .find(|k| self.similarity.ratio(&title, k) > self.threshold)
            {
                debug!(%title, %similar, "Dropping near-duplicate title");
                continue;
            }

            seen_urls.insert(url.to_string());
            seen_titles.insert(title.clone());
            kept_titles.push(title);
            kept.push(post);
        }

        debug!(input = input_len, kept = kept.len(), "Deduplicated batch");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, UNKNOWN_AUTHOR};

    fn post(title: &str, url: &str) -> Post {
        Post {
            title: title.to_string(),
            url: url.to_string(),
            external_url: url.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            created_at: None,
            category: Category::Technology,
            score: 0,
            comment_count: 0,
            description: String::new(),
            image_url: String::new(),
            is_self_post: false,
        }
    }

    fn titles(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_ratio_bounds() {
        let sim = LevenshteinRatio;
        assert_eq!(sim.ratio("", ""), 1.0);
        assert_eq!(sim.ratio("abc", "abc"), 1.0);
        assert_eq!(sim.ratio("abc", "xyz"), 0.0);
        assert_eq!(sim.ratio("kitten", "sitting"), 1.0 - 3.0 / 7.0);
        assert_eq!(sim.ratio("kitten", "sitting"), sim.ratio("sitting", "kitten"));
    }

    #[test]
    fn test_near_duplicate_titles_collapse() {
        let dedup = Deduplicator::default();
        let out = dedup.dedupe(vec![
            post("Breaking: New Console Announced", "https://a.test/1"),
            post("BREAKING: New Console Announced!", "https://b.test/2"),
        ]);
        assert_eq!(titles(&out), vec!["Breaking: New Console Announced"]);
    }

    #[test]
    fn test_distinct_titles_survive() {
        let dedup = Deduplicator::default();
        let out = dedup.dedupe(vec![
            post("Apple releases new chip", "https://a.test/1"),
            post("Samsung releases new phone", "https://b.test/2"),
        ]);
        assert_eq!(out.len(), 2);
        assert!(
            LevenshteinRatio.ratio(
                &normalize_title("Apple releases new chip"),
                &normalize_title("Samsung releases new phone")
            ) < 0.85
        );
    }

    #[test]
    fn test_url_uniqueness_wins_over_title() {
        let dedup = Deduplicator::default();
        let out = dedup.dedupe(vec![
            post("Completely different headline", "https://a.test/same"),
            post("Nothing alike at all here", "https://a.test/same"),
        ]);
        assert_eq!(titles(&out), vec!["Completely different headline"]);
    }

    #[test]
    fn test_empty_title_or_url_dropped() {
        let dedup = Deduplicator::default();
        let out = dedup.dedupe(vec![
            post("   ", "https://a.test/1"),
            post("Has a title", ""),
            post("Kept", "https://a.test/3"),
        ]);
        assert_eq!(titles(&out), vec!["Kept"]);
    }

    #[test]
    fn test_order_preserved_and_idempotent() {
        let dedup = Deduplicator::default();
        let input = vec![
            post("GPU prices finally drop", "https://a.test/1"),
            post("Rust 2.0 roadmap published", "https://a.test/2"),
            post("GPU prices finally drop!!", "https://a.test/3"),
            post("Indie studio ships debut title", "https://a.test/4"),
            post("Rust 2.0 roadmap published", "https://a.test/5"),
            post("Quantum startup opens lab", "https://a.test/2"),
        ];
        let once = dedup.dedupe(input);
        assert_eq!(
            titles(&once),
            vec![
                "GPU prices finally drop",
                "Rust 2.0 roadmap published",
                "Indie studio ships debut title",
            ]
        );
        let twice = dedup.dedupe(once.clone());
        assert_eq!(once, twice);
    }

    struct AlwaysSame;

    impl TitleSimilarity for AlwaysSame {
        fn ratio(&self, _a: &str, _b: &str) -> f64 {
            1.0
        }
    }

    #[test]
    fn test_pluggable_similarity() {
        let dedup = Deduplicator::with_similarity(AlwaysSame, 0.85);
        let out = dedup.dedupe(vec![
            post("First", "https://a.test/1"),
            post("Second", "https://a.test/2"),
        ]);
        assert_eq!(titles(&out), vec!["First"]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // "abcdefghij" vs "abcdefghiX": ratio exactly 0.9.
        let dedup = Deduplicator::new(0.9);
        let out = dedup.dedupe(vec![
            post("abcdefghij", "https://a.test/1"),
            post("abcdefghiX", "https://a.test/2"),
        ]);
        assert_eq!(out.len(), 2);
    }
}
