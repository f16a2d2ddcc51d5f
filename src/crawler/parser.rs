//! HTML content extractor
//!
//! This module turns a fetched HTML document into the fields of an
//! indexed page:
//! - Title (Open Graph title, else `<title>`)
//! - Level 1-3 headings
//! - Preformatted code blocks
//! - In-scope outbound links
//! - Visible body text with boilerplate removed
//!
//! Code blocks and links are read before boilerplate removal; removal
//! detaches navigation and header nodes that hold links the crawl needs.

use crate::url::ScopeFilter;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements that never contribute to body text
const REMOVED_ELEMENTS: &str = "script, style, nav, header, footer, iframe, noscript";

/// Elements whose text is separated from its neighbours
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub title: String,
    pub headings: Vec<String>,
    pub text: String,
    pub code_blocks: Vec<String>,

    /// In-scope canonical URLs, deduplicated in document order
    pub links: Vec<String>,
}

/// Extracts page content and scope-filtered links
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    scope: ScopeFilter,
    boilerplate: Vec<Selector>,
}

impl ContentExtractor {
    /// Creates an extractor
    ///
    /// Boilerplate selectors that fail to parse are logged and skipped.
    pub fn new(scope: ScopeFilter, boilerplate_selectors: &[String]) -> Self {
        let boilerplate = boilerplate_selectors
            .iter()
            .filter_map(|s| match Selector::parse(s) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    tracing::warn!("Ignoring invalid boilerplate selector '{}': {:?}", s, e);
                    None
                }
            })
            .collect();

        Self { scope, boilerplate }
    }

    /// The scope links are filtered through
    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// Parses HTML content and extracts page fields and links
    ///
    /// # Example
    ///
    /// ```
    /// use docs_indexer::crawler::ContentExtractor;
    /// use docs_indexer::url::ScopeFilter;
    /// use url::Url;
    ///
    /// let scope = ScopeFilter::new("docs.example.com", vec!["/Product/".to_string()]);
    /// let extractor = ContentExtractor::new(scope, &[]);
    /// let html = r#"<html><head><title>Grid</title></head>
    ///     <body><h1>Grid</h1><a href="/Product/chart">Chart</a></body></html>"#;
    /// let base = Url::parse("https://docs.example.com/Product/grid").unwrap();
    ///
    /// let page = extractor.extract(html, &base);
    /// assert_eq!(page.title, "Grid");
    /// assert_eq!(page.links, vec!["https://docs.example.com/Product/chart"]);
    /// ```
    pub fn extract(&self, html: &str, base_url: &Url) -> ParsedPage {
        let mut document = Html::parse_document(html);

        let title = extract_title(&document);
        let headings = extract_headings(&document);
        let code_blocks = extract_code_blocks(&document);
        let links = self.extract_links(&document, base_url);

        self.remove_boilerplate(&mut document);
        let text = extract_body_text(&document);

        ParsedPage {
            title,
            headings,
            text,
            code_blocks,
            links,
        }
    }

    /// Extracts all in-scope links from the HTML document
    fn extract_links(&self, document: &Html, base_url: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                let Some(absolute) = resolve_link(href, base_url) else {
                    continue;
                };
                if let Some(canonical) = self.scope.admit(&absolute) {
                    if seen.insert(canonical.clone()) {
                        links.push(canonical);
                    }
                }
            }
        }

        links
    }

    /// Detaches non-content elements and configured boilerplate
    fn remove_boilerplate(&self, document: &mut Html) {
        let mut doomed = Vec::new();

        if let Ok(selector) = Selector::parse(REMOVED_ELEMENTS) {
            doomed.extend(document.select(&selector).map(|el| el.id()));
        }
        for selector in &self.boilerplate {
            doomed.extend(document.select(selector).map(|el| el.id()));
        }

        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Prefers the Open Graph title, falling back to `<title>`
fn extract_title(document: &Html) -> String {
    let og_title = Selector::parse(r#"meta[property="og:title"]"#)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(|content| content.trim().to_string())
                .find(|content| !content.is_empty())
        });

    if let Some(title) = og_title {
        return title;
    }

    Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| collapse_whitespace(&element_text(el)))
        })
        .unwrap_or_default()
}

fn extract_headings(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("h1, h2, h3") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| collapse_whitespace(&element_text(el)))
        .filter(|heading| !heading.is_empty())
        .collect()
}

fn extract_code_blocks(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("pre") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

fn extract_body_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match body {
        Some(body) => collapse_whitespace(&element_text(body)),
        None => collapse_whitespace(&element_text(document.root_element())),
    }
}

/// Descendant text with inline markup joined as written
///
/// Block elements are padded with spaces so adjacent paragraphs or cells
/// never glue words together.
fn element_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    push_text(element, &mut text);
    text
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    out.push(' ');
                }
                push_text(child_element, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Collapses runs of whitespace to single spaces and trims
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - Fragment-only links (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
