// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteCheckError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

pub type SiteCheckResult<T> = Result<T, SiteCheckError>;
