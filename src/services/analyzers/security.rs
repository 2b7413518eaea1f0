// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Transport security and security-header checks.

use super::degraded;
use crate::models::analysis::{AnalysisItem, Impact};
use crate::models::category::Category;
use crate::models::report::{CategoryReport, SecurityResult};
use crate::services::fetcher::{FetchedPage, Fetcher};
use crate::services::html::PageDocument;
use crate::services::scoring::calculate_score;
use regex::Regex;
use std::sync::LazyLock;

/// Insecure subresource references: `src`-like attributes and CSS `url()`
static INSECURE_RESOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:src|srcset|action|poster|data)\s*=\s*["']?\s*http://|url\(\s*["']?\s*http://"#,
    )
    .unwrap()
});

pub async fn run(fetcher: &Fetcher, url: &str) -> SecurityResult {
    match fetcher.fetch_page(url).await {
        Ok(page) => analyze(&page),
        Err(e) => degraded(url, &e),
    }
}

pub fn analyze(page: &FetchedPage) -> SecurityResult {
    let https = page.is_https();
    let csp = page.header("content-security-policy");

    let mut result = SecurityResult {
        url: page.url.to_string(),
        https: https_item(https),
        hsts: hsts_item(https, page.header("strict-transport-security")),
        csp: csp_item(csp, page.header("content-security-policy-report-only")),
        x_frame_options: x_frame_options_item(page.header("x-frame-options"), csp),
        x_content_type_options: x_content_type_options_item(
            page.header("x-content-type-options"),
        ),
        referrer_policy: referrer_policy_item(page.header("referrer-policy")),
        mixed_content: mixed_content_item(https, count_insecure_resources(&page.body)),
        score: 0,
        error: None,
    };
    result.score = calculate_score(&result.items());
    result
}

fn https_item(https: bool) -> AnalysisItem {
    if https {
        AnalysisItem::success("HTTPS", "Enabled")
            .with_description("The page is served over an encrypted connection.")
    } else {
        AnalysisItem::error("HTTPS", "Disabled")
            .with_description("The page is served over plain HTTP.")
            .with_impact(Impact::High)
            .with_recommendation("Install a TLS certificate and redirect HTTP to HTTPS.")
    }
}

fn hsts_item(https: bool, header: Option<&str>) -> AnalysisItem {
    match header {
        Some(value) if https => AnalysisItem::success("HSTS", value),
        Some(value) => AnalysisItem::warning("HSTS", value)
            .with_description("Browsers ignore Strict-Transport-Security on plain HTTP.")
            .with_impact(Impact::Medium),
        None => AnalysisItem::error("HSTS", "Missing")
            .with_description("Browsers may still connect over plain HTTP first.")
            .with_impact(Impact::High)
            .with_recommendation("Send Strict-Transport-Security: max-age=31536000; includeSubDomains."),
    }
}

fn csp_item(enforced: Option<&str>, report_only: Option<&str>) -> AnalysisItem {
    match (enforced, report_only) {
        (Some(_), _) => AnalysisItem::success("Content Security Policy", "Enforced"),
        (None, Some(_)) => AnalysisItem::warning("Content Security Policy", "Report-only")
            .with_description("Violations are reported but not blocked.")
            .with_impact(Impact::Medium)
            .with_recommendation("Switch to an enforced Content-Security-Policy header."),
        (None, None) => AnalysisItem::warning("Content Security Policy", "Missing")
            .with_description("Without a CSP, injected scripts run unrestricted.")
            .with_impact(Impact::Medium)
            .with_recommendation("Define a Content-Security-Policy header."),
    }
}

fn x_frame_options_item(header: Option<&str>, csp: Option<&str>) -> AnalysisItem {
    if let Some(value) = header {
        let normalized = value.trim().to_ascii_uppercase();
        return if normalized == "DENY" || normalized == "SAMEORIGIN" {
            AnalysisItem::success("X-Frame-Options", normalized)
        } else {
            AnalysisItem::warning("X-Frame-Options", value)
                .with_description("Only DENY and SAMEORIGIN are honoured by current browsers.")
                .with_impact(Impact::Medium)
        };
    }

    if csp.is_some_and(|policy| policy.to_ascii_lowercase().contains("frame-ancestors")) {
        return AnalysisItem::success("X-Frame-Options", "CSP frame-ancestors");
    }

    AnalysisItem::warning("X-Frame-Options", "Missing")
        .with_description("The page can be embedded by other sites (clickjacking).")
        .with_impact(Impact::Medium)
        .with_recommendation("Send X-Frame-Options: DENY or a CSP frame-ancestors directive.")
}

fn x_content_type_options_item(header: Option<&str>) -> AnalysisItem {
    match header.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("nosniff") => {
            AnalysisItem::success("X-Content-Type-Options", "nosniff")
        }
        Some(value) => AnalysisItem::warning("X-Content-Type-Options", value)
            .with_description("The only valid value is nosniff.")
            .with_impact(Impact::Low),
        None => AnalysisItem::error("X-Content-Type-Options", "Missing")
            .with_description("Browsers may MIME-sniff responses into executable types.")
            .with_impact(Impact::Medium)
            .with_recommendation("Send X-Content-Type-Options: nosniff."),
    }
}

fn referrer_policy_item(header: Option<&str>) -> AnalysisItem {
    match header {
        Some(value) => AnalysisItem::success("Referrer Policy", value),
        None => AnalysisItem::warning("Referrer Policy", "Missing")
            .with_description("Full URLs may leak to third parties in the Referer header.")
            .with_impact(Impact::Low)
            .with_recommendation("Send Referrer-Policy: strict-origin-when-cross-origin."),
    }
}

/// `<link>` relations that make the browser download the target
const LOADING_LINK_RELS: [&str; 6] = [
    "stylesheet",
    "icon",
    "preload",
    "modulepreload",
    "manifest",
    "apple-touch-icon",
];

fn count_insecure_resources(html: &str) -> usize {
    let doc = PageDocument::parse(html);
    let insecure_links = doc
        .select("link[href]")
        .into_iter()
        .filter(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| LOADING_LINK_RELS.iter().any(|r| r.eq_ignore_ascii_case(token)))
            })
        })
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.trim().to_ascii_lowercase().starts_with("http://"))
        .count();

    doc.count_matches(&INSECURE_RESOURCE) + insecure_links
}

fn mixed_content_item(https: bool, insecure: usize) -> AnalysisItem {
    if !https {
        return AnalysisItem::warning("Mixed Content", "Not applicable")
            .with_description("The page itself is not served over HTTPS.")
            .with_impact(Impact::Low);
    }

    if insecure == 0 {
        AnalysisItem::success("Mixed Content", "None")
            .with_description("All subresources are loaded over HTTPS.")
    } else {
        AnalysisItem::error("Mixed Content", format!("{insecure} insecure resource(s)"))
            .with_description("Browsers block or flag resources loaded over plain HTTP.")
            .with_impact(Impact::High)
            .with_recommendation("Load every script, stylesheet, image and form target over HTTPS.")
    }
}

impl CategoryReport for SecurityResult {
    const CATEGORY: Category = Category::Security;

    fn items(&self) -> Vec<&AnalysisItem> {
        vec![
            &self.https,
            &self.hsts,
            &self.csp,
            &self.x_frame_options,
            &self.x_content_type_options,
            &self.referrer_policy,
            &self.mixed_content,
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
            https: AnalysisItem::unavailable("HTTPS", message),
            hsts: AnalysisItem::unavailable("HSTS", message),
            csp: AnalysisItem::unavailable("Content Security Policy", message),
            x_frame_options: AnalysisItem::unavailable("X-Frame-Options", message),
            x_content_type_options: AnalysisItem::unavailable("X-Content-Type-Options", message),
            referrer_policy: AnalysisItem::unavailable("Referrer Policy", message),
            mixed_content: AnalysisItem::unavailable("Mixed Content", message),
            score: 0,
            error: Some(message.to_string()),
        }
    }
}
