//! Category relevance and sensitive-topic filtering.
//!
//! A post is accepted for a category in two stages, evaluated in order:
//!
//! 1. **Sensitive-topic exclusion.** The lowercased title and description
//!    are joined and searched for any denylisted term by plain substring.
//!    One hit rejects the post and the category stage is never evaluated.
//! 2. **Category exclusivity.** The same text must match at least one of
//!    the category's required terms and none of its disallowed terms.
//!    Category terms match on word boundaries so that short terms such as
//!    `ai` do not fire inside `said`.
//!
//! Each built-in category disallows the other's whole vocabulary, so a
//! story mentioning both a console and a chip is dropped from both feeds.
//! No post is ever accepted for two categories.

use crate::models::{Category, Post};
use crate::utils::collapse_whitespace;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Terms that mark a post as off-limits regardless of category.
///
/// Matched as substrings of the lowercased text, padded with a space on
/// each side. Entries that start with a space such as `" war "` only match
/// at the start of a word.
pub const SENSITIVE_TERMS: &[&str] = &[
    " war ",
    " war,",
    " war.",
    " wars ",
    "warfare",
    "wartime",
    "invasion",
    "military",
    "missile",
    "airstrike",
    "bombing",
    "terroris",
    "genocide",
    "massacre",
    "mass shooting",
    "gunman",
    " killed",
    "death toll",
    "hostage",
    "refugee",
    "politic",
    "election",
    "senate",
    "congress",
    "parliament",
    "protest",
    " riot",
    "earthquake",
    "hurricane",
    "tornado",
    "tsunami",
    "wildfire",
    "flooding",
    "disaster",
    "pandemic",
    "famine",
];

pub const GAMING_TERMS: &[&str] = &[
    "gaming",
    "game",
    "games",
    "gamer",
    "gamers",
    "video game",
    "video games",
    "esports",
    "e-sports",
    "playstation",
    "ps5",
    "xbox",
    "nintendo",
    "steam",
    "console",
    "consoles",
    "gameplay",
    "dlc",
    "speedrun",
    "twitch",
    "fortnite",
    "minecraft",
    "call of duty",
    "zelda",
    "pokemon",
    "pokémon",
    "mario",
    "elden ring",
    "roblox",
    "rpg",
    "mmo",
];

pub const TECHNOLOGY_TERMS: &[&str] = &[
    "technology",
    "tech",
    "software",
    "hardware",
    "ai",
    "artificial intelligence",
    "machine learning",
    "startup",
    "startups",
    "programming",
    "developer",
    "developers",
    "cloud",
    "cybersecurity",
    "semiconductor",
    "chip",
    "chips",
    "smartphone",
    "iphone",
    "android",
    "apple",
    "google",
    "microsoft",
    "openai",
    "robotics",
    "app",
    "apps",
    "computer",
    "laptop",
    "internet",
];

/// Required and disallowed vocabulary of one category.
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    pub required_terms: Vec<String>,
    pub disallowed_terms: Vec<String>,
}

impl CategoryRules {
    pub fn new(required: &[&str], disallowed: &[&str]) -> Self {
        Self {
            required_terms: required.iter().map(|s| s.to_string()).collect(),
            disallowed_terms: disallowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in rules for a category.
    pub fn builtin(category: Category) -> Self {
        match category {
            Category::Gaming => Self::new(GAMING_TERMS, TECHNOLOGY_TERMS),
            Category::Technology => Self::new(TECHNOLOGY_TERMS, GAMING_TERMS),
        }
    }
}

/// Why a post was accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { matched: String },
    Sensitive { term: String },
    NotRelevant,
    Disallowed { term: String },
    UnknownCategory,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Case-insensitive whole-word matcher over a term list.
#[derive(Debug, Clone)]
pub(crate) struct TermMatcher {
    regex: Option<Regex>,
}

impl TermMatcher {
    pub(crate) fn new<T: AsRef<str>>(terms: &[T]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }
        let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        Ok(Self {
            regex: Some(Regex::new(&pattern)?),
        })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }

    fn find(&self, text: &str) -> Option<String> {
        self.regex
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str().to_lowercase())
    }
}

#[derive(Debug, Clone)]
struct CompiledRules {
    required: TermMatcher,
    disallowed: TermMatcher,
}

/// Lowercased title and description, whitespace runs collapsed and padded
/// with one space at each end. Punctuation is kept.
fn sensitive_haystack(post: &Post) -> String {
    let combined = format!("{} {}", post.title, post.description).to_lowercase();
    format!(" {} ", collapse_whitespace(&combined))
}

#[derive(Debug, Clone)]
pub struct CategoryFilter {
    sensitive_terms: Vec<String>,
    rules: HashMap<Category, CompiledRules>,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        let rules = Category::ALL
            .iter()
            .map(|c| (*c, CategoryRules::builtin(*c)))
            .collect();
        Self::new(SENSITIVE_TERMS.iter().map(|s| s.to_string()).collect(), rules)
            .expect("built-in term lists compile")
    }
}

impl CategoryFilter {
    pub fn new(
        sensitive_terms: Vec<String>,
        rules: HashMap<Category, CategoryRules>,
    ) -> Result<Self, regex::Error> {
        let mut compiled = HashMap::new();
        for (category, r) in rules {
            compiled.insert(
                category,
                CompiledRules {
                    required: TermMatcher::new(&r.required_terms)?,
                    disallowed: TermMatcher::new(&r.disallowed_terms)?,
                },
            );
        }
        Ok(Self {
            sensitive_terms: sensitive_terms
                .into_iter()
                .map(|t| t.to_lowercase())
                .filter(|t| !t.trim().is_empty())
                .collect(),
            rules: compiled,
        })
    }

    pub fn accept(&self, post: &Post, category: Category) -> bool {
        let verdict = self.evaluate(post, category);
        if !verdict.is_accepted() {
            debug!(title = %post.title, %category, ?verdict, "Post rejected by filter");
        }
        verdict.is_accepted()
    }

    pub fn evaluate(&self, post: &Post, category: Category) -> Verdict {
        let haystack = sensitive_haystack(post);
        if let Some(term) = self.sensitive_terms.iter().find(|t| haystack.contains(t.as_str())) {
            return Verdict::Sensitive {
                term: term.trim().to_string(),
            };
        }

        let Some(rules) = self.rules.get(&category) else {
            return Verdict::UnknownCategory;
        };
        let text = format!("{} {}", post.title, post.description);
        let Some(matched) = rules.required.find(&text) else {
            return Verdict::NotRelevant;
        };
        if let Some(term) = rules.disallowed.find(&text) {
            return Verdict::Disallowed { term };
        }
        Verdict::Accepted { matched }
    }
}
