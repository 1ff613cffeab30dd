//! On-demand full-text extraction of a linked article.
//!
//! The page is downloaded with the shared HTTP client. Boilerplate removal
//! keeps the text units (paragraphs, headings, blockquotes, list items) of
//! the first container that has any: `article`, `main`, `[role=main]`, then
//! `body`. Anchors are written back as `[label](absolute-url)` markup and
//! units are joined by blank lines, which is the input
//! [`crate::reformat::reformat`] expects.
//!
//! Nothing here fails: a download error or an empty extraction yields a
//! single [`ArticleBlock::unavailable`] block.

use crate::error::ExtractionError;
use crate::images::fallback_image;
use crate::models::{ArticleBlock, ArticleView};
use crate::reformat::reformat;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "[role=main]", "body"]
        .iter()
        .map(|s| Selector::parse(s).expect("static selector"))
        .collect()
});

static UNITS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, h1, h2, h3, h4, blockquote, li").expect("static selector")
});

static IMAGE_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:image"], meta[name="twitter:image"]"#)
        .expect("static selector")
});

const UNIT_TAGS: [&str; 7] = ["p", "h1", "h2", "h3", "h4", "blockquote", "li"];
/// Page chrome whose units are never article text.
const CHROME_TAGS: [&str; 4] = ["nav", "header", "footer", "aside"];
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "noscript", "nav", "figure", "button"];

/// Text and metadata pulled from one HTML page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    /// Units separated by blank lines, links as `[label](href)`.
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` and return its body as blocks.
    ///
    /// Never empty: failures produce one "unavailable" block.
    #[instrument(level = "info", skip(self))]
    pub async fn extract_and_format(&self, url: &str) -> Vec<ArticleBlock> {
        let page = self.extract(url).await;
        format_extraction(page.map(|p| p.text))
    }

    /// Blocks plus a resolved featured image.
    ///
    /// The image is `image_hint` when non-empty, else the page's social
    /// image, else a placeholder chosen from `title` and `source_name`.
    #[instrument(level = "info", skip(self, image_hint))]
    pub async fn view(
        &self,
        url: &str,
        title: &str,
        source_name: &str,
        image_hint: Option<&str>,
    ) -> ArticleView {
        let page = self.extract(url).await;
        let page_image = page.as_ref().ok().and_then(|p| p.image.clone());
        let featured_image = image_hint
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or(page_image)
            .unwrap_or_else(|| fallback_image(title, source_name).to_string());

        ArticleView {
            url: url.to_string(),
            blocks: format_extraction(page.map(|p| p.text)),
            featured_image,
        }
    }

    async fn extract(&self, url: &str) -> Result<ExtractedPage, ExtractionError> {
        let html = self.download(url).await?;
        let page = extract_page(&html, Url::parse(url).ok().as_ref());
        if page.text.trim().is_empty() {
            return Err(ExtractionError::EmptyExtraction);
        }
        info!(bytes = page.text.len(), "Extracted article text");
        Ok(page)
    }

    async fn download(&self, url: &str) -> Result<String, ExtractionError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::DownloadFailed(format!("status {status}")));
        }
        Ok(response.text().await?)
    }
}

/// Turn an extraction outcome into blocks, substituting the unavailable
/// placeholder for errors and for text that yields no blocks.
pub fn format_extraction(result: Result<String, ExtractionError>) -> Vec<ArticleBlock> {
    match result {
        Ok(text) => {
            let blocks = reformat(&text);
            if blocks.is_empty() {
                warn!("Extraction produced no blocks; returning placeholder");
                vec![ArticleBlock::unavailable()]
            } else {
                blocks
            }
        }
        Err(e) => {
            warn!(error = %e, "Article unavailable");
            vec![ArticleBlock::unavailable()]
        }
    }
}

/// Pull article text and social image out of an HTML document.
pub fn extract_page(html: &str, base: Option<&Url>) -> ExtractedPage {
    let document = Html::parse_document(html);

    let image = document
        .select(&IMAGE_META)
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(|c| resolve(base, c).unwrap_or_else(|| c.to_string()));

    for container in CONTAINERS.iter() {
        let Some(root) = document.select(container).next() else {
            continue;
        };
        let units: Vec<String> = root
            .select(&UNITS)
            .filter(|el| !is_nested_or_chrome(el))
            .map(|el| render_unit(el, base))
            .filter(|u| !u.is_empty())
            .collect();
        if !units.is_empty() {
            return ExtractedPage {
                text: units.join("\n\n"),
                image,
            };
        }
    }

    ExtractedPage {
        text: String::new(),
        image,
    }
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Url::parse(href).ok().map(|u| u.to_string()),
    }
}

/// Units inside another unit are rendered by their parent.
fn is_nested_or_chrome(el: &ElementRef) -> bool {
    el.ancestors().filter_map(ElementRef::wrap).any(|a| {
        let name = a.value().name();
        UNIT_TAGS.contains(&name) || CHROME_TAGS.contains(&name)
    })
}

fn render_unit(el: ElementRef, base: Option<&Url>) -> String {
    let mut out = String::new();
    render_inline(el, base, &mut out);
    let text = collapse_whitespace(&out);
    if el.value().name() == "blockquote" && !text.is_empty() && !text.starts_with('"') {
        format!("\"{text}\"")
    } else {
        text
    }
}

fn render_inline(el: ElementRef, base: Option<&Url>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child_el.value().name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push(' ');
                } else if name == "a" {
                    render_anchor(child_el, base, out);
                } else {
                    render_inline(child_el, base, out);
                }
            }
            _ => {}
        }
    }
}

fn render_anchor(a: ElementRef, base: Option<&Url>, out: &mut String) {
    let label = collapse_whitespace(&a.text().collect::<String>()).replace(['[', ']'], "");
    let target = a
        .value()
        .attr("href")
        .and_then(|h| resolve(base, h.trim()))
        .filter(|h| !h.contains(['(', ')']));
    match target {
        Some(href) if !label.is_empty() => out.push_str(&format!("[{label}]({href})")),
        _ => out.push_str(&label),
    }
}
