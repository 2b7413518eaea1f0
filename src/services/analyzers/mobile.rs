// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Mobile-friendliness heuristics over the raw markup and inline CSS.
//!
//! There is no layout engine here: media queries, flex/grid usage and font
//! units are detected textually, so results approximate what a browser
//! would render.

use super::degraded;
use crate::models::analysis::{AnalysisItem, Impact};
use crate::models::category::Category;
use crate::models::report::{CategoryReport, MobileResult};
use crate::services::fetcher::{FetchedPage, Fetcher};
use crate::services::html::PageDocument;
use crate::services::scoring::calculate_score;
use regex::Regex;
use std::sync::LazyLock;

static MEDIA_QUERY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@media\b").unwrap());
static FLEX_OR_GRID_CSS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)display\s*:\s*(?:inline-)?(?:flex|grid)\b").unwrap());
// Utility-class frameworks express layout in class names rather than CSS
static FLEX_OR_GRID_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*["'][^"']*\b(?:flex|grid|d-flex|row)\b"#).unwrap()
});
static FONT_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*[\d.]+\s*(px|pt|rem|em|%|vw|vh)").unwrap()
});

pub async fn run(fetcher: &Fetcher, url: &str) -> MobileResult {
    match fetcher.fetch_page(url).await {
        Ok(page) => analyze(&page),
        Err(e) => degraded(url, &e),
    }
}

pub fn analyze(page: &FetchedPage) -> MobileResult {
    let doc = PageDocument::parse(&page.body);
    let css = doc.inline_css();

    let mut result = MobileResult {
        url: page.url.to_string(),
        viewport: viewport_item(doc.meta_content("viewport")),
        responsive_design: responsive_design_item(&doc, &css),
        touch_targets: touch_targets_item(
            doc.count("a[href], button, input, select, textarea"),
        ),
        font_sizing: font_sizing_item(&css),
        responsive_images: responsive_images_item(&doc),
        score: 0,
        error: None,
    };
    result.score = calculate_score(&result.items());
    result
}

fn viewport_item(content: Option<String>) -> AnalysisItem {
    let Some(content) = content else {
        return AnalysisItem::error("Viewport", "Missing")
            .with_description("Mobile browsers render the page at desktop width and zoom out.")
            .with_impact(Impact::High)
            .with_recommendation(
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">.",
            );
    };

    let directives: Vec<(String, String)> = content
        .split([',', ';'])
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_ascii_lowercase()))
        .collect();
    let get = |key: &str| {
        directives
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let device_width = get("width") == Some("device-width");
    let initial_scale = get("initial-scale").and_then(|v| v.parse::<f32>().ok()) == Some(1.0);
    let zoom_disabled = matches!(get("user-scalable"), Some("no") | Some("0"))
        || get("maximum-scale")
            .and_then(|v| v.parse::<f32>().ok())
            .is_some_and(|max| max <= 1.0);

    if zoom_disabled {
        AnalysisItem::warning("Viewport", content)
            .with_description("Pinch-zoom is disabled, which hurts low-vision users.")
            .with_impact(Impact::Medium)
            .with_recommendation("Remove user-scalable=no and maximum-scale restrictions.")
    } else if device_width && initial_scale {
        AnalysisItem::success("Viewport", content)
    } else {
        AnalysisItem::warning("Viewport", content)
            .with_description("The viewport tag is incomplete.")
            .with_impact(Impact::Medium)
            .with_recommendation("Use width=device-width, initial-scale=1.")
    }
}

fn responsive_design_item(doc: &PageDocument<'_>, css: &str) -> AnalysisItem {
    let link_media = doc
        .select("link[media]")
        .iter()
        .filter(|el| el.value().attr("media").is_some_and(|m| m.contains('(')))
        .count();
    let media_queries = MEDIA_QUERY.find_iter(css).count() + link_media;
    let layout = FLEX_OR_GRID_CSS.is_match(css) || doc.count_matches(&FLEX_OR_GRID_CLASS) > 0;

    let value = format!(
        "{media_queries} media queries, flex/grid {}",
        if layout { "used" } else { "not found" }
    );

    if media_queries > 0 {
        AnalysisItem::success("Responsive Design", value)
    } else if layout {
        AnalysisItem::warning("Responsive Design", value)
            .with_description("Flexible layout found, but no media queries in the page itself.")
            .with_impact(Impact::Low)
    } else {
        AnalysisItem::error("Responsive Design", value)
            .with_description("No responsive layout techniques were detected in the page.")
            .with_impact(Impact::High)
            .with_recommendation("Use media queries with flexbox or grid layouts.")
    }
}

fn touch_targets_item(count: usize) -> AnalysisItem {
    let value = format!("{count} interactive elements");
    if count > 0 {
        AnalysisItem::success("Touch Targets", value)
            .with_description("Keep tap targets at least 48x48 CSS pixels and well spaced.")
    } else {
        AnalysisItem::warning("Touch Targets", value)
            .with_description("No links or controls were found in the served HTML.")
            .with_impact(Impact::Low)
    }
}

fn font_sizing_item(css: &str) -> AnalysisItem {
    let (mut relative, mut absolute) = (0usize, 0usize);
    for unit in FONT_SIZE.captures_iter(css).filter_map(|c| c.get(1)) {
        match unit.as_str().to_ascii_lowercase().as_str() {
            "px" | "pt" => absolute += 1,
            _ => relative += 1,
        }
    }

    let value = format!("{relative} relative, {absolute} absolute");
    if relative + absolute == 0 || relative >= absolute {
        AnalysisItem::success("Font Sizing", value)
    } else if relative > 0 {
        AnalysisItem::warning("Font Sizing", value)
            .with_description("Most font sizes use fixed units.")
            .with_impact(Impact::Low)
            .with_recommendation("Prefer rem or em so text follows the user's font settings.")
    } else {
        AnalysisItem::error("Font Sizing", value)
            .with_description("All font sizes use fixed units and ignore user font settings.")
            .with_impact(Impact::Medium)
            .with_recommendation("Express font sizes in rem or em.")
    }
}

fn responsive_images_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let images = doc.count("img");
    let responsive = doc.count("img[srcset], picture source[srcset]");
    let value = format!("{responsive} of {images} images");

    if images == 0 || responsive > 0 {
        AnalysisItem::success("Responsive Images", value)
    } else {
        AnalysisItem::warning("Responsive Images", value)
            .with_description("Phones download the same large images as desktops.")
            .with_impact(Impact::Medium)
            .with_recommendation("Provide srcset/sizes or <picture> sources.")
    }
}

impl CategoryReport for MobileResult {
    const CATEGORY: Category = Category::Mobile;

    fn items(&self) -> Vec<&AnalysisItem> {
        vec![
            &self.viewport,
            &self.responsive_design,
            &self.touch_targets,
            &self.font_sizing,
            &self.responsive_images,
        ]
    }

    fn score(&self) -> u8 {
        self.score
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn failed(url: &str, message: &str) -> Self {
        Self {
            url: url.to_string(),
            viewport: AnalysisItem::unavailable("Viewport", message),
            responsive_design: AnalysisItem::unavailable("Responsive Design", message),
            touch_targets: AnalysisItem::unavailable("Touch Targets", message),
            font_sizing: AnalysisItem::unavailable("Font Sizing", message),
            responsive_images: AnalysisItem::unavailable("Responsive Images", message),
            score: 0,
            error: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::Status;

    fn analyze_html(html: &str) -> MobileResult {
        analyze(&FetchedPage::from_html("https://example.com/", html).unwrap())
    }

    const MOBILE_PAGE: &str = r#"<html><head>
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <style>
            body { font-size: 1rem; display: grid; }
            h1 { font-size: 2em; }
            small { font-size: 12px; }
            @media (max-width: 640px) { h1 { font-size: 1.5rem; } }
        </style>
        </head><body>
        <a href="/">Home</a><button>Menu</button>
        <img src="a.jpg" srcset="a-480.jpg 480w, a-960.jpg 960w">
        </body></html>"#;

    #[test]
    fn test_mobile_ready_page_scores_100() {
        let result = analyze_html(MOBILE_PAGE);

        assert_eq!(result.viewport.status, Status::Success);
        assert_eq!(result.responsive_design.value, "1 media queries, flex/grid used");
        assert_eq!(result.touch_targets.value, "2 interactive elements");
        assert_eq!(result.font_sizing.value, "3 relative, 1 absolute");
        assert_eq!(result.responsive_images.value, "1 of 1 images");
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_missing_viewport_is_error() {
        assert_eq!(viewport_item(None).status, Status::Error);
    }

    #[test]
    fn test_zoom_disabled_viewport_warns() {
        let item = viewport_item(Some(
            "width=device-width, initial-scale=1, user-scalable=no".to_string(),
        ));
        assert_eq!(item.status, Status::Warning);

        let item = viewport_item(Some(
            "width=device-width, initial-scale=1, maximum-scale=1".to_string(),
        ));
        assert_eq!(item.status, Status::Warning);
    }

    #[test]
    fn test_incomplete_viewport_warns() {
        let item = viewport_item(Some("width=1024".to_string()));
        assert_eq!(item.status, Status::Warning);
    }

    #[test]
    fn test_flex_classes_without_media_queries_warn() {
        let html = r#"<html><body><div class="container flex items-center">x</div></body></html>"#;
        let result = analyze_html(html);
        assert_eq!(result.responsive_design.status, Status::Warning);
    }

    #[test]
    fn test_desktop_only_page() {
        let html = r#"<html><body style="font-size: 14px"><p style="font-size:12pt">Hi</p>
            <img src="big.jpg"></body></html>"#;
        let result = analyze_html(html);

        assert_eq!(result.viewport.status, Status::Error);
        assert_eq!(result.responsive_design.status, Status::Error);
        assert_eq!(result.touch_targets.status, Status::Warning);
        assert_eq!(result.font_sizing.status, Status::Error);
        assert_eq!(result.responsive_images.status, Status::Warning);
        // 0 + 0 + 50 + 0 + 50 = 100 / 5
        assert_eq!(result.score, 20);
    }

    #[test]
    fn test_link_media_query_counts() {
        let html = r#"<html><head>
            <link rel="stylesheet" media="(max-width: 600px)" href="/m.css">
            <link rel="stylesheet" media="print" href="/p.css">
            </head></html>"#;
        let result = analyze_html(html);
        assert_eq!(result.responsive_design.value, "1 media queries, flex/grid not found");
    }
}
