// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the five independent analyzer families
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Performance,
    Seo,
    Security,
    Accessibility,
    Mobile,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Performance,
        Category::Seo,
        Category::Security,
        Category::Accessibility,
        Category::Mobile,
    ];

    /// Tag identifying this analyzer's cached results
    pub fn cache_tag(&self) -> &'static str {
        match self {
            Category::Performance => "site-check-performance",
            Category::Seo => "site-check-seo",
            Category::Security => "site-check-security",
            Category::Accessibility => "site-check-accessibility",
            Category::Mobile => "site-check-mobile",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Performance => write!(f, "performance"),
            Category::Seo => write!(f, "seo"),
            Category::Security => write!(f, "security"),
            Category::Accessibility => write!(f, "accessibility"),
            Category::Mobile => write!(f, "mobile"),
        }
    }
}
