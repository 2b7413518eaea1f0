// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! HTML inspection helpers shared by the analyzers.
//!
//! Structural queries go through the `scraper` crate; raw-text scans over
//! inline CSS and markup use regular expressions.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parsed page with both the DOM and the raw markup available
pub struct PageDocument<'a> {
    raw: &'a str,
    document: Html,
}

impl<'a> PageDocument<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            document: Html::parse_document(raw),
        }
    }

    /// All elements matching a CSS selector; an invalid selector matches nothing
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        let Ok(selector) = Selector::parse(css) else {
            return Vec::new();
        };
        self.document.select(&selector).collect()
    }

    pub fn count(&self, css: &str) -> usize {
        self.select(css).len()
    }

    /// Trimmed text of the first `<title>`, if non-empty
    pub fn title(&self) -> Option<String> {
        self.select("title")
            .first()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    /// `content` of the first `<meta>` whose `name` or `property` equals `key` (case-insensitive)
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.select("meta")
            .into_iter()
            .find(|el| {
                let v = el.value();
                [v.attr("name"), v.attr("property")]
                    .into_iter()
                    .flatten()
                    .any(|n| n.trim().eq_ignore_ascii_case(key))
            })
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }

    /// `lang` attribute of the root `<html>` element
    pub fn html_lang(&self) -> Option<String> {
        self.document
            .root_element()
            .value()
            .attr("lang")
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
    }

    /// `<link>` elements whose space-separated `rel` contains `rel`
    pub fn links_with_rel(&self, rel: &str) -> Vec<ElementRef<'_>> {
        self.select("link[rel]")
            .into_iter()
            .filter(|el| {
                el.value().attr("rel").is_some_and(|value| {
                    value
                        .split_whitespace()
                        .any(|token| token.eq_ignore_ascii_case(rel))
                })
            })
            .collect()
    }

    /// Absolute targets of every `<a href>`, resolved against `base`.
    /// Fragment-only, `javascript:`, `mailto:` and `tel:` links are skipped.
    pub fn anchor_targets(&self, base: &Url) -> Vec<Url> {
        self.select("a[href]")
            .into_iter()
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty() && !href.starts_with('#'))
            .filter_map(|href| base.join(href).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .collect()
    }

    /// Bodies of `<script type="application/ld+json">` blocks
    pub fn json_ld_blocks(&self) -> Vec<String> {
        self.select("script[type]")
            .into_iter()
            .filter(|el| {
                el.value()
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            })
            .map(|el| el.text().collect::<String>())
            .collect()
    }

    /// Inline CSS: `<style>` element bodies followed by `style` attributes
    pub fn inline_css(&self) -> String {
        let mut css = String::new();
        for el in self.select("style") {
            css.extend(el.text());
            css.push('\n');
        }
        for el in self.select("[style]") {
            if let Some(style) = el.value().attr("style") {
                css.push_str(style);
                css.push('\n');
            }
        }
        css
    }

    /// Number of `pattern` matches in the raw markup
    pub fn count_matches(&self, pattern: &Regex) -> usize {
        pattern.find_iter(self.raw).count()
    }
}

/// Image counts used by both the SEO and accessibility analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAltStats {
    pub total: usize,
    /// Images carrying an `alt` attribute, empty or not
    pub with_alt: usize,
    /// Images whose `alt` has visible text
    pub with_text_alt: usize,
}

impl ImageAltStats {
    pub fn collect(doc: &PageDocument<'_>) -> Self {
        let images = doc.select("img");
        let alts: Vec<Option<&str>> = images.iter().map(|img| img.value().attr("alt")).collect();

        Self {
            total: images.len(),
            with_alt: alts.iter().filter(|a| a.is_some()).count(),
            with_text_alt: alts
                .iter()
                .filter(|a| a.is_some_and(|t| !t.trim().is_empty()))
                .count(),
        }
    }
}

/// Integer percentage of `part` in `whole`, rounded down so partial coverage never reads as 100%.
/// An empty whole counts as 100%.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 100;
    }
    (part * 100 / whole) as u32
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <title>
        My   Page Title
    </title>
    <meta NAME="Description" content=" A short description ">
    <meta property="og:title" content="OG Title">
    <link rel="stylesheet preload" href="/a.css">
    <link rel="canonical" href="https://example.com/">
    <script type="application/ld+json">{"@type": "Organization"}</script>
    <style>@media (max-width: 600px) { body { font-size: 1rem; } }</style>
</head>
<body>
    <p style="font-size: 14px">Привет мир</p>
    <a href="/page1">Page 1</a>
    <a href="https://other.org/x">Other</a>
    <a href="#top">Top</a>
    <a href="mailto:me@example.com">Mail</a>
    <img src="a.png" alt="A cat">
    <img src="b.png" alt="">
    <img src="c.png">
</body>
</html>"##;

    #[test]
    fn test_title_is_trimmed_and_collapsed() {
        let doc = PageDocument::parse(PAGE);
        assert_eq!(doc.title(), Some("My Page Title".to_string()));
    }

    #[test]
    fn test_missing_title() {
        let doc = PageDocument::parse("<html><head></head><body></body></html>");
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn test_meta_content_matches_name_and_property_case_insensitively() {
        let doc = PageDocument::parse(PAGE);
        assert_eq!(
            doc.meta_content("description"),
            Some("A short description".to_string())
        );
        assert_eq!(doc.meta_content("og:title"), Some("OG Title".to_string()));
        assert_eq!(doc.meta_content("og:image"), None);
    }

    #[test]
    fn test_html_lang() {
        assert_eq!(PageDocument::parse(PAGE).html_lang(), Some("en".to_string()));
        assert_eq!(PageDocument::parse("<html><body></body></html>").html_lang(), None);
    }

    #[test]
    fn test_links_with_rel_handles_multiple_tokens() {
        let doc = PageDocument::parse(PAGE);
        assert_eq!(doc.links_with_rel("stylesheet").len(), 1);
        assert_eq!(doc.links_with_rel("canonical").len(), 1);
        assert!(doc.links_with_rel("icon").is_empty());
    }

    #[test]
    fn test_anchor_targets_resolve_and_skip_non_http() {
        let doc = PageDocument::parse(PAGE);
        let base = Url::parse("https://example.com/").unwrap();
        let targets = doc.anchor_targets(&base);

        assert_eq!(targets.len(), 2);
        assert!(targets.iter().any(|u| u.as_str() == "https://example.com/page1"));
        assert!(targets.iter().any(|u| u.host_str() == Some("other.org")));
    }

    #[test]
    fn test_json_ld_blocks() {
        let doc = PageDocument::parse(PAGE);
        let blocks = doc.json_ld_blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("Organization"));
    }

    #[test]
    fn test_inline_css_collects_style_elements_and_attributes() {
        let css = PageDocument::parse(PAGE).inline_css();
        assert!(css.contains("@media (max-width: 600px)"));
        assert!(css.contains("font-size: 14px"));
    }

    #[test]
    fn test_image_alt_stats() {
        let doc = PageDocument::parse(PAGE);
        let stats = ImageAltStats::collect(&doc);
        assert_eq!(
            stats,
            ImageAltStats {
                total: 3,
                with_alt: 2,
                with_text_alt: 1
            }
        );
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(4, 4), 100);
        assert_eq!(percent(199, 200), 99);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = PageDocument::parse(PAGE);
        assert_eq!(doc.count("a[["), 0);
    }
}
