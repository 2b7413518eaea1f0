// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Markup-level accessibility heuristics.

use super::{degraded, grade_coverage};
use crate::models::analysis::{AnalysisItem, Impact, Status};
use crate::models::category::Category;
use crate::models::report::{AccessibilityResult, CategoryReport};
use crate::services::fetcher::{FetchedPage, Fetcher};
use crate::services::html::{percent, ImageAltStats, PageDocument};
use crate::services::scoring::calculate_score;
use regex::Regex;
use scraper::ElementRef;
use std::collections::HashSet;
use std::sync::LazyLock;

static ARIA_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\saria-[a-z]+\s*="#).unwrap());
static ROLE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\srole\s*=\s*["']?[a-z]"#).unwrap());

const NON_VISIBLE_INPUT_TYPES: [&str; 5] = ["hidden", "submit", "button", "reset", "image"];
const SECONDARY_LANDMARKS: [&str; 4] = ["nav", "header", "footer", "aside"];
const SECONDARY_LANDMARK_ROLES: [&str; 5] =
    ["navigation", "banner", "contentinfo", "complementary", "search"];

pub async fn run(fetcher: &Fetcher, url: &str) -> AccessibilityResult {
    match fetcher.fetch_page(url).await {
        Ok(page) => analyze(&page),
        Err(e) => degraded(url, &e),
    }
}

pub fn analyze(page: &FetchedPage) -> AccessibilityResult {
    let doc = PageDocument::parse(&page.body);

    let mut result = AccessibilityResult {
        url: page.url.to_string(),
        aria: aria_item(
            doc.count_matches(&ARIA_ATTRIBUTE),
            doc.count_matches(&ROLE_ATTRIBUTE),
        ),
        form_labels: form_labels_item(&doc),
        image_alt: image_alt_item(ImageAltStats::collect(&doc)),
        landmarks: landmarks_item(&doc),
        lang: lang_item(doc.html_lang()),
        skip_link: skip_link_item(&doc),
        score: 0,
        error: None,
    };
    result.score = calculate_score(&result.items());
    result
}

fn aria_item(attributes: usize, roles: usize) -> AnalysisItem {
    let value = format!("{attributes} ARIA attributes, {roles} roles");
    if attributes + roles > 0 {
        AnalysisItem::success("ARIA", value)
    } else {
        AnalysisItem::warning("ARIA", value)
            .with_description("No ARIA attributes or roles were found.")
            .with_impact(Impact::Low)
            .with_recommendation(
                "Use ARIA labels and roles on custom widgets that lack native semantics.",
            )
    }
}

fn is_visible_input(el: &ElementRef<'_>) -> bool {
    match el.value().name() {
        "input" => {
            let kind = el.value().attr("type").unwrap_or("text").trim();
            !NON_VISIBLE_INPUT_TYPES
                .iter()
                .any(|t| t.eq_ignore_ascii_case(kind))
        }
        _ => true,
    }
}

fn is_labelled(el: &ElementRef<'_>, label_targets: &HashSet<&str>) -> bool {
    let v = el.value();
    let has_aria = ["aria-label", "aria-labelledby"]
        .iter()
        .any(|attr| v.attr(attr).is_some_and(|a| !a.trim().is_empty()));
    let has_for_label = v.id().is_some_and(|id| label_targets.contains(id));
    let wrapped = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "label");

    has_aria || has_for_label || wrapped
}

fn form_labels_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let label_targets: HashSet<&str> = doc
        .select("label[for]")
        .iter()
        .filter_map(|l| l.value().attr("for"))
        .collect();

    let inputs: Vec<ElementRef<'_>> = doc
        .select("input, select, textarea")
        .into_iter()
        .filter(is_visible_input)
        .collect();

    if inputs.is_empty() {
        return AnalysisItem::success("Form Labels", "No form inputs");
    }

    let labelled = inputs
        .iter()
        .filter(|el| is_labelled(el, &label_targets))
        .count();
    let item = AnalysisItem::new(
        "Form Labels",
        format!("{labelled}/{} inputs labelled", inputs.len()),
        grade_coverage(labelled, inputs.len(), 50),
    );

    if labelled == inputs.len() {
        item
    } else {
        item.with_description("Screen readers announce unlabelled fields without context.")
            .with_impact(Impact::High)
            .with_recommendation("Associate every field with a <label for> or an aria-label.")
    }
}

fn image_alt_item(stats: ImageAltStats) -> AnalysisItem {
    if stats.total == 0 {
        return AnalysisItem::success("Image Alt Attributes", "No images");
    }

    let share = percent(stats.with_alt, stats.total);
    let item = AnalysisItem::new(
        "Image Alt Attributes",
        format!("{}/{} images ({share}%)", stats.with_alt, stats.total),
        grade_coverage(stats.with_alt, stats.total, 80),
    );

    if stats.with_alt == stats.total {
        item.with_description("Every image has an alt attribute; empty alt marks decoration.")
    } else {
        item.with_description("Images without alt are read out by file name.")
            .with_impact(Impact::High)
            .with_recommendation("Add alt text, or alt=\"\" for purely decorative images.")
    }
}

fn has_role(doc: &PageDocument<'_>, roles: &[&str]) -> bool {
    doc.select("[role]").iter().any(|el| {
        el.value()
            .attr("role")
            .is_some_and(|r| roles.iter().any(|want| r.trim().eq_ignore_ascii_case(want)))
    })
}

fn landmarks_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let has_main = doc.count("main") > 0 || has_role(doc, &["main"]);
    let secondary: Vec<&str> = SECONDARY_LANDMARKS
        .into_iter()
        .filter(|tag| doc.count(tag) > 0)
        .collect();
    let secondary_roles = has_role(doc, &SECONDARY_LANDMARK_ROLES);

    let mut found = secondary.clone();
    if has_main {
        found.insert(0, "main");
    }
    let value = if found.is_empty() {
        "None".to_string()
    } else {
        found.join(", ")
    };

    if has_main {
        AnalysisItem::success("Landmarks", value)
    } else if !secondary.is_empty() || secondary_roles {
        AnalysisItem::warning("Landmarks", value)
            .with_description("The page has landmarks but no main region.")
            .with_impact(Impact::Medium)
            .with_recommendation("Wrap the primary content in <main>.")
    } else {
        AnalysisItem::error("Landmarks", value)
            .with_description("Screen-reader users cannot jump between page regions.")
            .with_impact(Impact::High)
            .with_recommendation("Use <header>, <nav>, <main> and <footer> elements.")
    }
}

fn lang_item(lang: Option<String>) -> AnalysisItem {
    match lang {
        Some(lang) => AnalysisItem::success("Language", lang),
        None => AnalysisItem::error("Language", "Missing")
            .with_description("Screen readers cannot pick the right pronunciation.")
            .with_impact(Impact::High)
            .with_recommendation("Set the lang attribute on <html>, e.g. lang=\"en\"."),
    }
}

fn skip_link_item(doc: &PageDocument<'_>) -> AnalysisItem {
    let found = doc.select("a[href^='#']").iter().any(|a| {
        let href = a.value().attr("href").unwrap_or_default().to_ascii_lowercase();
        let text = a.text().collect::<String>().to_ascii_lowercase();
        ["skip", "main", "content"]
            .iter()
            .any(|hint| href.contains(hint) || text.contains(hint))
    });

    if found {
        AnalysisItem::new("Skip Link", "Present", Status::Success)
    } else {
        AnalysisItem::warning("Skip Link", "Missing")
            .with_description("Keyboard users must tab through the whole header on every page.")
            .with_impact(Impact::Low)
            .with_recommendation("Add a \"Skip to content\" link as the first focusable element.")
    }
}

impl CategoryReport for AccessibilityResult {
    const CATEGORY: Category = Category::Accessibility;

    fn items(&self) -> Vec<&AnalysisItem> {
        vec![
            &self.aria,
            &self.form_labels,
            &self.image_alt,
            &self.landmarks,
            &self.lang,
            &self.skip_link,
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
            aria: AnalysisItem::unavailable("ARIA", message),
            form_labels: AnalysisItem::unavailable("Form Labels", message),
            image_alt: AnalysisItem::unavailable("Image Alt Attributes", message),
            landmarks: AnalysisItem::unavailable("Landmarks", message),
            lang: AnalysisItem::unavailable("Language", message),
            skip_link: AnalysisItem::unavailable("Skip Link", message),
            score: 0,
            error: Some(message.to_string()),
        }
    }
}
