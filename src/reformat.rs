//! Turning extracted article text into typed blocks.
//!
//! Rules, applied in order:
//! 1. Split on blank lines into units; collapse whitespace runs inside a
//!    unit to single spaces; drop empty units.
//! 2. Lift `[label](target)` markup into [`Hyperlink`] annotations. Targets
//!    that are not `http`, `https` or `mailto` URLs keep only their label.
//! 3. Classify on the visible text: wrapped in quotation marks → quote;
//!    under 100 chars, no period and fully upper-case → heading; otherwise
//!    paragraph.

use crate::models::{ArticleBlock, BlockText, Hyperlink, Inline};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Headings are strictly shorter than this many chars.
pub const HEADING_MAX_CHARS: usize = 100;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n\s*\n").expect("static regex"));

/// `[label](target)`; the target may hold one level of balanced parentheses.
static LINK_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]\n]+)\]\(\s*((?:[^()\s]|\([^()\s]*\))+)\s*\)").expect("static regex")
});

const QUOTE_PAIRS: [(char, char); 2] = [('"', '"'), ('\u{201C}', '\u{201D}')];

/// Reformat raw extracted text into ordered blocks.
pub fn reformat(text: &str) -> Vec<ArticleBlock> {
    BLANK_LINE
        .split(text)
        .map(|unit| unit.split_whitespace().join(" "))
        .filter(|unit| !unit.is_empty())
        .filter_map(|unit| {
            let text = annotate_links(&unit);
            if text.is_empty() {
                return None;
            }
            Some(classify(text))
        })
        .collect()
}

fn classify(text: BlockText) -> ArticleBlock {
    let visible = text.plain_text();
    if is_quoted(&visible) {
        ArticleBlock::Quote(text)
    } else if is_heading(&visible) {
        ArticleBlock::Heading(text)
    } else {
        ArticleBlock::Paragraph(text)
    }
}

pub fn is_quoted(s: &str) -> bool {
    s.chars().count() >= 2
        && QUOTE_PAIRS
            .iter()
            .any(|(open, close)| s.starts_with(*open) && s.ends_with(*close))
}

pub fn is_heading(s: &str) -> bool {
    s.chars().count() < HEADING_MAX_CHARS
        && !s.contains('.')
        && s.chars().any(char::is_uppercase)
        && !s.chars().any(char::is_lowercase)
}

fn is_safe_href(href: &str) -> bool {
    Url::parse(href)
        .map(|u| matches!(u.scheme(), "http" | "https" | "mailto"))
        .unwrap_or(false)
}

fn push_text(segments: &mut Vec<Inline>, s: &str) {
    if s.is_empty() {
        return;
    }
    if let Some(Inline::Text { text }) = segments.last_mut() {
        text.push_str(s);
    } else {
        segments.push(Inline::Text {
            text: s.to_string(),
        });
    }
}

/// Split a unit into text and link segments.
pub fn annotate_links(unit: &str) -> BlockText {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in LINK_MARKUP.captures_iter(unit) {
        let (Some(whole), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        push_text(&mut segments, &unit[last..whole.start()]);
        let label = label.as_str().trim();
        let href = href.as_str().trim();
        if is_safe_href(href) {
            segments.push(Inline::Link(Hyperlink::new(label, href)));
        } else {
            push_text(&mut segments, label);
        }
        last = whole.end();
    }
    push_text(&mut segments, &unit[last..]);
    BlockText { segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_quote_paragraph() {
        let input = "HELLO\n\n\"A quoted line\"\n\nA normal sentence with a [link](http://x.test).";
        let blocks = reformat(input);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], ArticleBlock::Heading(BlockText::plain("HELLO")));
        assert_eq!(
            blocks[1],
            ArticleBlock::Quote(BlockText::plain("\"A quoted line\""))
        );
        match &blocks[2] {
            ArticleBlock::Paragraph(text) => {
                let links: Vec<_> = text.links().collect();
                assert_eq!(links.len(), 1);
                assert_eq!(links[0].href, "http://x.test");
                assert_eq!(links[0].label, "link");
                assert!(links[0].new_context);
                assert_eq!(links[0].rel, "noopener noreferrer");
                assert_eq!(text.plain_text(), "A normal sentence with a link.");
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_collapsed_and_empty_units_dropped() {
        let input = "\n\n  First   line\n   continues here.  \n\n\n   \n\nSecond\tunit.\n\n";
        let blocks = reformat(input);
        let texts: Vec<String> = blocks.iter().map(|b| b.text().plain_text()).collect();
        assert_eq!(texts, vec!["First line continues here.", "Second unit."]);
    }

    #[test]
    fn test_crlf_blank_lines_split() {
        let blocks = reformat("One.\r\n\r\nTwo.");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_heading_rules() {
        assert!(is_heading("WHAT WE KNOW SO FAR"));
        assert!(is_heading("TOP 10 PICKS"));
        assert!(!is_heading("U.S. MARKETS"));
        assert!(!is_heading("Mixed Case Title"));
        assert!(!is_heading("2024"));
        assert!(!is_heading(&"A".repeat(HEADING_MAX_CHARS)));
    }

    #[test]
    fn test_curly_quotes() {
        let blocks = reformat("\u{201C}We shipped it.\u{201D}");
        assert!(matches!(blocks[0], ArticleBlock::Quote(_)));
    }

    #[test]
    fn test_unsafe_link_keeps_label_only() {
        let text = annotate_links("Click [here](javascript:alert(1)) now");
        assert_eq!(text.links().count(), 0);
        assert_eq!(text.plain_text(), "Click here now");
        let text = annotate_links("Click [here](javascript:void) now");
        assert_eq!(text.links().count(), 0);
        assert_eq!(text.plain_text(), "Click here now");
    }

    #[test]
    fn test_link_target_with_parentheses() {
        let text = annotate_links("See [Foo](https://en.wikipedia.org/wiki/Foo_(bar)) for more.");
        let links: Vec<_> = text.links().collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://en.wikipedia.org/wiki/Foo_(bar)");
        assert_eq!(text.plain_text(), "See Foo for more.");
    }

    #[test]
    fn test_multiple_links_in_order() {
        let text = annotate_links("See [a](https://a.test) and [b](mailto:b@b.test)");
        let hrefs: Vec<&str> = text.links().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["https://a.test", "mailto:b@b.test"]);
        assert_eq!(text.plain_text(), "See a and b");
    }

    #[test]
    fn test_heading_classified_on_visible_text() {
        let blocks = reformat("READ MORE AT [THE SITE](https://x.test/page.html)");
        assert!(matches!(blocks[0], ArticleBlock::Heading(_)));
    }

    #[test]
    fn test_no_blocks_for_blank_input() {
        assert!(reformat("  \n\n \t ").is_empty());
    }
}
