// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Load time, page weight and resource-count heuristics.

use super::{degraded, grade_at_most};
use crate::models::analysis::{AnalysisItem, Impact, Status};
use crate::models::category::Category;
use crate::models::report::{CategoryReport, PerformanceResult};
use crate::services::fetcher::{FetchedPage, Fetcher};
use crate::services::html::PageDocument;
use crate::services::scoring::calculate_score;
use regex::Regex;
use std::sync::LazyLock;

const LOAD_TIME_SUCCESS_MS: u128 = 1000;
const LOAD_TIME_WARNING_MS: u128 = 3000;
const PAGE_SIZE_SUCCESS_BYTES: usize = 100 * 1024;
const PAGE_SIZE_WARNING_BYTES: usize = 500 * 1024;

static FONT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)fonts\.googleapis\.com|use\.typekit\.net|@font-face|\.(?:woff2?|ttf|otf|eot)\b",
    )
    .unwrap()
});

const COMPRESSED_ENCODINGS: [&str; 5] = ["gzip", "x-gzip", "br", "deflate", "zstd"];

pub async fn run(fetcher: &Fetcher, url: &str) -> PerformanceResult {
    match fetcher.fetch_page(url).await {
        Ok(page) => analyze(&page),
        Err(e) => degraded(url, &e),
    }
}

pub fn analyze(page: &FetchedPage) -> PerformanceResult {
    let doc = PageDocument::parse(&page.body);

    let mut result = PerformanceResult {
        url: page.url.to_string(),
        load_time: load_time_item(page.elapsed.as_millis()),
        page_size: page_size_item(page.body.len(), page.transfer_size),
        stylesheets: stylesheets_item(doc.links_with_rel("stylesheet").len()),
        scripts: scripts_item(doc.count("script[src]")),
        images: images_item(&doc),
        fonts: fonts_item(doc.count_matches(&FONT_PATTERN)),
        compression: compression_item(page.header("content-encoding")),
        score: 0,
        error: None,
    };
    result.score = calculate_score(&result.items());
    result
}

fn load_time_item(ms: u128) -> AnalysisItem {
    let value = format!("{ms} ms");
    if ms < LOAD_TIME_SUCCESS_MS {
        AnalysisItem::success("Load Time", value)
            .with_description("The page responded and finished downloading quickly.")
    } else if ms < LOAD_TIME_WARNING_MS {
        AnalysisItem::warning("Load Time", value)
            .with_description("The page takes more than a second to download.")
            .with_impact(Impact::Medium)
            .with_recommendation("Enable caching and a CDN, and reduce server response time.")
    } else {
        AnalysisItem::error("Load Time", value)
            .with_description("The page takes more than three seconds to download.")
            .with_impact(Impact::High)
            .with_recommendation(
                "Profile the server response, cache rendered pages and serve assets from a CDN.",
            )
    }
}

fn page_size_item(decoded: usize, transferred: usize) -> AnalysisItem {
    let value = if transferred != decoded {
        format!(
            "{} ({} transferred)",
            format_bytes(decoded),
            format_bytes(transferred)
        )
    } else {
        format_bytes(decoded)
    };

    let status = grade_at_most(decoded, PAGE_SIZE_SUCCESS_BYTES, PAGE_SIZE_WARNING_BYTES);
    let item = AnalysisItem::new("HTML Size", value, status);
    match status {
        Status::Success => item.with_description("The HTML document is lightweight."),
        _ => item
            .with_description("The HTML document is heavy, which slows parsing on slow devices.")
            .with_impact(if status == Status::Error {
                Impact::High
            } else {
                Impact::Medium
            })
            .with_recommendation("Remove inlined data and unused markup, and paginate long lists."),
    }
}

fn stylesheets_item(count: usize) -> AnalysisItem {
    let status = grade_at_most(count, 3, 8);
    let item = AnalysisItem::new("Stylesheets", count.to_string(), status)
        .with_description("External stylesheets block rendering until they load.");
    if status == Status::Success {
        item
    } else {
        item.with_impact(Impact::Medium)
            .with_recommendation("Bundle stylesheets and inline the critical CSS.")
    }
}

fn scripts_item(count: usize) -> AnalysisItem {
    let status = grade_at_most(count, 5, 15);
    let item = AnalysisItem::new("Scripts", count.to_string(), status)
        .with_description("Each external script is another request and more main-thread work.");
    if status == Status::Success {
        item
    } else {
        item.with_impact(Impact::Medium)
            .with_recommendation("Bundle scripts, load them with defer/async and drop unused ones.")
    }
}

fn images_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let images = doc.select("img[src]");
    let lazy = images
        .iter()
        .filter(|img| {
            img.value()
                .attr("loading")
                .is_some_and(|l| l.eq_ignore_ascii_case("lazy"))
        })
        .count();

    let status = grade_at_most(images.len(), 20, 50);
    let item = AnalysisItem::new(
        "Images",
        format!("{} ({} lazy-loaded)", images.len(), lazy),
        status,
    );
    if status == Status::Success {
        item.with_description("The number of images is reasonable.")
    } else {
        item.with_description("Many images compete for bandwidth during page load.")
            .with_impact(Impact::Medium)
            .with_recommendation("Lazy-load offscreen images and serve WebP or AVIF.")
    }
}

fn fonts_item(count: usize) -> AnalysisItem {
    let status = grade_at_most(count, 2, 4);
    let item = AnalysisItem::new("Web Fonts", format!("{count} font references"), status);
    if status == Status::Success {
        item
    } else {
        item.with_description("Web fonts delay text rendering until they download.")
            .with_impact(Impact::Low)
            .with_recommendation("Limit font families and weights, and use font-display: swap.")
    }
}

fn compression_item(encoding: Option<&str>) -> AnalysisItem {
    match encoding.map(|e| e.trim().to_ascii_lowercase()) {
        Some(e) if COMPRESSED_ENCODINGS.contains(&e.as_str()) => {
            AnalysisItem::success("Compression", e)
                .with_description("The response is compressed in transit.")
        }
        Some(e) => AnalysisItem::error("Compression", e)
            .with_description("The response uses an unrecognised content encoding.")
            .with_impact(Impact::Medium),
        None => AnalysisItem::warning("Compression", "None")
            .with_description("The response is sent uncompressed.")
            .with_impact(Impact::Medium)
            .with_recommendation("Enable gzip or Brotli compression on the server."),
    }
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

impl CategoryReport for PerformanceResult {
    const CATEGORY: Category = Category::Performance;

    fn items(&self) -> Vec<&AnalysisItem> {
        vec![
            &self.load_time,
            &self.page_size,
            &self.stylesheets,
            &self.scripts,
            &self.images,
            &self.fonts,
            &self.compression,
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
            load_time: AnalysisItem::unavailable("Load Time", message),
            page_size: AnalysisItem::unavailable("HTML Size", message),
            stylesheets: AnalysisItem::unavailable("Stylesheets", message),
            scripts: AnalysisItem::unavailable("Scripts", message),
            images: AnalysisItem::unavailable("Images", message),
            fonts: AnalysisItem::unavailable("Web Fonts", message),
            compression: AnalysisItem::unavailable("Compression", message),
            score: 0,
            error: Some(message.to_string()),
        }
    }
}
