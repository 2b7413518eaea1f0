// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-category analysis results and the combined site report.

use crate::models::analysis::AnalysisItem;
use crate::models::category::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Behaviour shared by every per-category result
pub trait CategoryReport: Clone + Send + Sync + 'static {
    const CATEGORY: Category;

    /// Named checks in display order
    fn items(&self) -> Vec<&AnalysisItem>;

    fn score(&self) -> u8;

    /// Failure message of a degraded run
    fn error(&self) -> Option<&str>;

    /// Build the degraded result reported when the page could not be fetched
    fn failed(url: &str, message: &str) -> Self;

    fn is_degraded(&self) -> bool {
        self.error().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PerformanceResult {
    pub url: String,
    pub load_time: AnalysisItem,
    pub page_size: AnalysisItem,
    pub stylesheets: AnalysisItem,
    pub scripts: AnalysisItem,
    pub images: AnalysisItem,
    pub fonts: AnalysisItem,
    pub compression: AnalysisItem,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeoResult {
    pub url: String,
    pub title: AnalysisItem,
    pub meta_description: AnalysisItem,
    pub headings: AnalysisItem,
    pub image_alt: AnalysisItem,
    pub links: AnalysisItem,
    pub canonical: AnalysisItem,
    pub sitemap: AnalysisItem,
    pub robots_txt: AnalysisItem,
    pub structured_data: AnalysisItem,
    pub open_graph: AnalysisItem,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SecurityResult {
    pub url: String,
    pub https: AnalysisItem,
    pub hsts: AnalysisItem,
    pub csp: AnalysisItem,
    pub x_frame_options: AnalysisItem,
    pub x_content_type_options: AnalysisItem,
    pub referrer_policy: AnalysisItem,
    pub mixed_content: AnalysisItem,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessibilityResult {
    pub url: String,
    pub aria: AnalysisItem,
    pub form_labels: AnalysisItem,
    pub image_alt: AnalysisItem,
    pub landmarks: AnalysisItem,
    pub lang: AnalysisItem,
    pub skip_link: AnalysisItem,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MobileResult {
    pub url: String,
    pub viewport: AnalysisItem,
    pub responsive_design: AnalysisItem,
    pub touch_targets: AnalysisItem,
    pub font_sizing: AnalysisItem,
    pub responsive_images: AnalysisItem,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a single analyzer, as returned by the per-category endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryResult {
    Performance(PerformanceResult),
    Seo(SeoResult),
    Security(SecurityResult),
    Accessibility(AccessibilityResult),
    Mobile(MobileResult),
}

impl CategoryResult {
    pub fn category(&self) -> Category {
        match self {
            CategoryResult::Performance(_) => Category::Performance,
            CategoryResult::Seo(_) => Category::Seo,
            CategoryResult::Security(_) => Category::Security,
            CategoryResult::Accessibility(_) => Category::Accessibility,
            CategoryResult::Mobile(_) => Category::Mobile,
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            CategoryResult::Performance(r) => r.score,
            CategoryResult::Seo(r) => r.score,
            CategoryResult::Security(r) => r.score,
            CategoryResult::Accessibility(r) => r.score,
            CategoryResult::Mobile(r) => r.score,
        }
    }
}

/// All five analyses of one URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SiteCheckReport {
    pub url: String,
    /// Rounded mean of the five category scores
    pub score: u8,
    pub performance: PerformanceResult,
    pub seo: SeoResult,
    pub security: SecurityResult,
    pub accessibility: AccessibilityResult,
    pub mobile: MobileResult,
    pub analyzed_at: DateTime<Utc>,
}
