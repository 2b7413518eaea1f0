// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a single heuristic check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    /// Weight used when averaging items into a category score
    pub fn weight(&self) -> u32 {
        match self {
            Status::Success => 100,
            Status::Warning => 50,
            Status::Error => 0,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Warning => write!(f, "warning"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// How much a failing check matters to the page owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// Result of one named heuristic check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisItem {
    /// Human-readable name of the check
    pub label: String,
    /// Measured value, formatted for display
    pub value: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl AnalysisItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: Status) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
            description: None,
            impact: None,
            recommendation: None,
        }
    }

    pub fn success(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, Status::Success)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, Status::Warning)
    }

    pub fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, Status::Error)
    }

    /// Placeholder for a check that could not run because the page fetch failed
    pub fn unavailable(label: impl Into<String>, message: &str) -> Self {
        Self::error(label, "Unavailable")
            .with_description(format!("The page could not be analyzed: {message}"))
            .with_impact(Impact::High)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_weights() {
        assert_eq!(Status::Success.weight(), 100);
        assert_eq!(Status::Warning.weight(), 50);
        assert_eq!(Status::Error.weight(), 0);
    }

    #[test]
    fn test_item_serializes_without_empty_optionals() {
        let item = AnalysisItem::success("Title", "Home");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["status"], "success");
        assert!(json.get("description").is_none());
        assert!(json.get("impact").is_none());
        assert!(json.get("recommendation").is_none());
    }

    #[test]
    fn test_unavailable_item_is_error_with_message() {
        let item = AnalysisItem::unavailable("Load Time", "request timed out after 15s");

        assert_eq!(item.status, Status::Error);
        assert_eq!(item.value, "Unavailable");
        assert!(item
            .description
            .as_deref()
            .unwrap()
            .contains("request timed out"));
        assert_eq!(item.impact, Some(Impact::High));
    }
}
