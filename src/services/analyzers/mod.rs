// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! The five independent page analyzers.
//!
//! Each module exposes a pure `analyze` over an already fetched page and an
//! async `run` that fetches the page first. `run` never fails: fetch and
//! decode errors become a degraded result with every item in error.

pub mod accessibility;
pub mod mobile;
pub mod performance;
pub mod security;
pub mod seo;

use crate::error::SiteCheckError;
use crate::models::analysis::Status;
use crate::models::report::CategoryReport;
use crate::services::logging::redact_url;
use tracing::warn;

/// Build and log the degraded result for a failed analysis
pub(crate) fn degraded<R: CategoryReport>(url: &str, error: &SiteCheckError) -> R {
    warn!(
        category = %R::CATEGORY,
        url = %redact_url(url),
        error = %error,
        "analysis failed, reporting degraded result"
    );
    R::failed(url, &error.to_string())
}

/// Grade a count against inclusive upper bounds
pub(crate) fn grade_at_most(value: usize, success_max: usize, warning_max: usize) -> Status {
    if value <= success_max {
        Status::Success
    } else if value <= warning_max {
        Status::Warning
    } else {
        Status::Error
    }
}

/// Grade `part` of `whole`: only full coverage succeeds, `warning_min` percent and above warns
pub(crate) fn grade_coverage(part: usize, whole: usize, warning_min: u32) -> Status {
    if part >= whole {
        Status::Success
    } else if part * 100 >= warning_min as usize * whole {
        Status::Warning
    } else {
        Status::Error
    }
}
