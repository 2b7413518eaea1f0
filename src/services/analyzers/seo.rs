// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! On-page SEO checks plus sitemap and robots.txt probes.

use super::{degraded, grade_coverage};
use crate::models::analysis::{AnalysisItem, Impact};
use crate::models::category::Category;
use crate::models::report::{CategoryReport, SeoResult};
use crate::services::fetcher::{FetchedPage, Fetcher};
use crate::services::html::{percent, ImageAltStats, PageDocument};
use crate::services::scoring::calculate_score;
use std::ops::RangeInclusive;
use texting_robots::Robot;
use url::Url;

const TITLE_LENGTH: RangeInclusive<usize> = 30..=60;
const DESCRIPTION_LENGTH: RangeInclusive<usize> = 120..=160;
const ALT_WARNING_PERCENT: u32 = 80;

/// Results of the auxiliary requests made next to the page fetch
#[derive(Debug, Clone, Default)]
pub struct SiteProbes {
    /// Status of `HEAD /sitemap.xml`, `None` if the request failed
    pub sitemap_status: Option<u16>,
    /// Body of `/robots.txt` when it was served with a 2xx status
    pub robots_txt: Option<String>,
}

pub async fn run(fetcher: &Fetcher, url: &str) -> SeoResult {
    let page = match fetcher.fetch_page(url).await {
        Ok(page) => page,
        Err(e) => return degraded(url, &e),
    };

    let probes = probe_site(fetcher, &page.final_url).await;
    analyze(&page, &probes, fetcher.robots_agent())
}

async fn probe_site(fetcher: &Fetcher, base: &Url) -> SiteProbes {
    let (Ok(sitemap_url), Ok(robots_url)) = (base.join("/sitemap.xml"), base.join("/robots.txt"))
    else {
        return SiteProbes::default();
    };

    let (sitemap_status, robots_txt) = futures::join!(
        fetcher.probe(&sitemap_url),
        fetcher.fetch_text(&robots_url)
    );

    SiteProbes {
        sitemap_status,
        robots_txt,
    }
}

pub fn analyze(page: &FetchedPage, probes: &SiteProbes, robots_agent: &str) -> SeoResult {
    let doc = PageDocument::parse(&page.body);
    let robot = probes
        .robots_txt
        .as_deref()
        .and_then(|txt| Robot::new(robots_agent, txt.as_bytes()).ok());

    let mut result = SeoResult {
        url: page.url.to_string(),
        title: title_item(doc.title()),
        meta_description: meta_description_item(doc.meta_content("description")),
        headings: headings_item(doc.count("h1"), doc.count("h2"), doc.count("h3")),
        image_alt: image_alt_item(ImageAltStats::collect(&doc)),
        links: links_item(&doc.anchor_targets(&page.final_url), &page.final_url),
        canonical: canonical_item(&doc),
        sitemap: sitemap_item(probes.sitemap_status, robot.as_ref()),
        robots_txt: robots_item(probes.robots_txt.is_some(), robot.as_ref(), &page.final_url),
        structured_data: structured_data_item(&doc.json_ld_blocks()),
        open_graph: open_graph_item(&doc),
        score: 0,
        error: None,
    };
    result.score = calculate_score(&result.items());
    result
}

fn title_item(title: Option<String>) -> AnalysisItem {
    let Some(title) = title else {
        return AnalysisItem::error("Title", "Missing")
            .with_description("The page has no <title> element.")
            .with_impact(Impact::High)
            .with_recommendation("Add a unique, descriptive title of 30 to 60 characters.");
    };

    let length = title.chars().count();
    if TITLE_LENGTH.contains(&length) {
        AnalysisItem::success("Title", title)
            .with_description(format!("The title is {length} characters long."))
    } else {
        let problem = if length < *TITLE_LENGTH.start() {
            "short"
        } else {
            "long"
        };
        AnalysisItem::warning("Title", title)
            .with_description(format!("The title is too {problem} ({length} characters)."))
            .with_impact(Impact::Medium)
            .with_recommendation("Keep the title between 30 and 60 characters.")
    }
}

fn meta_description_item(description: Option<String>) -> AnalysisItem {
    let Some(description) = description else {
        return AnalysisItem::error("Meta Description", "Missing")
            .with_description("The page has no meta description.")
            .with_impact(Impact::High)
            .with_recommendation("Add a meta description of 120 to 160 characters.");
    };

    let length = description.chars().count();
    if DESCRIPTION_LENGTH.contains(&length) {
        AnalysisItem::success("Meta Description", description)
            .with_description(format!("The description is {length} characters long."))
    } else {
        AnalysisItem::warning("Meta Description", description)
            .with_description(format!(
                "The description is {length} characters; search engines may rewrite it."
            ))
            .with_impact(Impact::Medium)
            .with_recommendation("Keep the meta description between 120 and 160 characters.")
    }
}

fn headings_item(h1: usize, h2: usize, h3: usize) -> AnalysisItem {
    let value = format!("H1: {h1}, H2: {h2}, H3: {h3}");
    match h1 {
        1 => AnalysisItem::success("Headings", value)
            .with_description("The page has exactly one H1 heading."),
        0 => AnalysisItem::error("Headings", value)
            .with_description("The page has no H1 heading.")
            .with_impact(Impact::High)
            .with_recommendation("Add one H1 that states the topic of the page."),
        _ => AnalysisItem::warning("Headings", value)
            .with_description("The page has several H1 headings.")
            .with_impact(Impact::Medium)
            .with_recommendation("Use a single H1 and structure sections with H2/H3."),
    }
}

fn image_alt_item(stats: ImageAltStats) -> AnalysisItem {
    if stats.total == 0 {
        return AnalysisItem::success("Image Alt Text", "No images");
    }

    let share = percent(stats.with_text_alt, stats.total);
    let value = format!("{}/{} images ({share}%)", stats.with_text_alt, stats.total);
    let status = grade_coverage(stats.with_text_alt, stats.total, ALT_WARNING_PERCENT);
    let item = AnalysisItem::new("Image Alt Text", value, status);
    if stats.with_text_alt == stats.total {
        item.with_description("Every image has descriptive alt text.")
    } else {
        item.with_description("Some images have no descriptive alt text.")
            .with_impact(Impact::Medium)
            .with_recommendation("Describe each meaningful image in its alt attribute.")
    }
}

fn links_item(targets: &[Url], page_url: &Url) -> AnalysisItem {
    let internal = targets
        .iter()
        .filter(|t| t.host_str() == page_url.host_str())
        .count();
    let external = targets.len() - internal;
    let value = format!("{internal} internal, {external} external");

    if targets.is_empty() {
        AnalysisItem::warning("Links", value)
            .with_description("The page links nowhere, so crawlers cannot discover other pages.")
            .with_impact(Impact::Medium)
            .with_recommendation("Link to related pages on your site.")
    } else {
        AnalysisItem::success("Links", value)
    }
}

fn canonical_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let href = doc
        .links_with_rel("canonical")
        .first()
        .and_then(|el| el.value().attr("href"))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    match href {
        Some(href) => AnalysisItem::success("Canonical URL", href),
        None => AnalysisItem::warning("Canonical URL", "Missing")
            .with_description("Without a canonical link, duplicate URLs split ranking signals.")
            .with_impact(Impact::Low)
            .with_recommendation("Add <link rel=\"canonical\"> pointing at the preferred URL."),
    }
}

fn sitemap_item(status: Option<u16>, robot: Option<&Robot>) -> AnalysisItem {
    if status.is_some_and(|s| (200..300).contains(&s)) {
        return AnalysisItem::success("Sitemap", "/sitemap.xml");
    }

    if let Some(declared) = robot.and_then(|r| r.sitemaps.first()) {
        return AnalysisItem::success("Sitemap", declared.clone())
            .with_description("The sitemap is declared in robots.txt.");
    }

    AnalysisItem::warning("Sitemap", "Not found")
        .with_description("No sitemap.xml was found.")
        .with_impact(Impact::Medium)
        .with_recommendation("Publish /sitemap.xml and reference it from robots.txt.")
}

fn robots_item(reachable: bool, robot: Option<&Robot>, page_url: &Url) -> AnalysisItem {
    if !reachable {
        return AnalysisItem::warning("Robots.txt", "Not found")
            .with_description("No robots.txt was served.")
            .with_impact(Impact::Low)
            .with_recommendation("Serve /robots.txt to guide crawlers.");
    }

    match robot {
        Some(robot) if !robot.allowed(page_url.as_str()) => {
            AnalysisItem::error("Robots.txt", "Page disallowed")
                .with_description("robots.txt blocks crawlers from this page.")
                .with_impact(Impact::High)
                .with_recommendation("Remove the Disallow rule that matches this page.")
        }
        Some(_) => AnalysisItem::success("Robots.txt", "Page allowed"),
        None => AnalysisItem::warning("Robots.txt", "Unparseable")
            .with_description("robots.txt could not be parsed.")
            .with_impact(Impact::Low),
    }
}

fn structured_data_item(blocks: &[String]) -> AnalysisItem {
    if blocks.is_empty() {
        return AnalysisItem::warning("Structured Data", "None")
            .with_description("No JSON-LD structured data was found.")
            .with_impact(Impact::Medium)
            .with_recommendation("Describe the page with schema.org JSON-LD for rich results.");
    }

    let invalid = blocks
        .iter()
        .filter(|b| serde_json::from_str::<serde_json::Value>(b).is_err())
        .count();
    let value = format!("{} JSON-LD block(s)", blocks.len());

    if invalid == 0 {
        AnalysisItem::success("Structured Data", value)
    } else {
        AnalysisItem::error("Structured Data", value)
            .with_description(format!("{invalid} JSON-LD block(s) are not valid JSON."))
            .with_impact(Impact::Medium)
            .with_recommendation("Fix the JSON syntax of the structured data.")
    }
}

fn open_graph_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let tags = ["og:title", "og:description", "og:image"];
    let present: Vec<&str> = tags
        .into_iter()
        .filter(|tag| doc.meta_content(tag).is_some())
        .collect();
    let value = format!("{}/{} tags", present.len(), tags.len());

    if present.len() == tags.len() {
        AnalysisItem::success("Open Graph", value)
    } else if present.is_empty() {
        AnalysisItem::error("Open Graph", value)
            .with_description("No Open Graph tags; shared links will render without a preview.")
            .with_impact(Impact::Medium)
            .with_recommendation("Add og:title, og:description and og:image.")
    } else {
        let missing: Vec<&str> = tags
            .into_iter()
            .filter(|t| !present.contains(t))
            .collect();
        AnalysisItem::warning("Open Graph", value)
            .with_description(format!("Missing {}.", missing.join(", ")))
            .with_impact(Impact::Low)
    }
}

impl CategoryReport for SeoResult {
    const CATEGORY: Category = Category::Seo;

    fn items(&self) -> Vec<&AnalysisItem> {
        vec![
            &self.title,
            &self.meta_description,
            &self.headings,
            &self.image_alt,
            &self.links,
            &self.canonical,
            &self.sitemap,
            &self.robots_txt,
            &self.structured_data,
            &self.open_graph,
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
            title: AnalysisItem::unavailable("Title", message),
            meta_description: AnalysisItem::unavailable("Meta Description", message),
            headings: AnalysisItem::unavailable("Headings", message),
            image_alt: AnalysisItem::unavailable("Image Alt Text", message),
            links: AnalysisItem::unavailable("Links", message),
            canonical: AnalysisItem::unavailable("Canonical URL", message),
            sitemap: AnalysisItem::unavailable("Sitemap", message),
            robots_txt: AnalysisItem::unavailable("Robots.txt", message),
            structured_data: AnalysisItem::unavailable("Structured Data", message),
            open_graph: AnalysisItem::unavailable("Open Graph", message),
            score: 0,
            error: Some(message.to_string()),
        }
    }
}
