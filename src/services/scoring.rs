// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Status-weighted score aggregation.

use crate::models::analysis::AnalysisItem;

/// Average the status weights of `items` into a 0-100 score.
/// An empty list scores 0.
pub fn calculate_score(items: &[&AnalysisItem]) -> u8 {
    let weights: Vec<u32> = items.iter().map(|item| item.status.weight()).collect();
    rounded_mean(&weights)
}

/// Average category scores into the overall site score
pub fn overall_score(scores: &[u8]) -> u8 {
    let values: Vec<u32> = scores.iter().map(|&s| u32::from(s)).collect();
    rounded_mean(&values)
}

fn rounded_mean(values: &[u32]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let total: u32 = values.iter().sum();
    let mean = f64::from(total) / values.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}
