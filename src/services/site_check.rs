// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Orchestration of the five analyzers with per-category result caching.

use crate::config::FetcherConfig;
use crate::error::SiteCheckResult;
use crate::models::category::Category;
use crate::models::report::{
    AccessibilityResult, CategoryReport, CategoryResult, MobileResult, PerformanceResult,
    SecurityResult, SeoResult, SiteCheckReport,
};
use crate::services::analyzers::{accessibility, mobile, performance, security, seo};
use crate::services::cache::TtlCache;
use crate::services::fetcher::{normalize_url, Fetcher};
use crate::services::logging::redact_url;
use crate::services::scoring::overall_score;
use chrono::Utc;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::info;

/// Runs the five analyzers against a URL, memoizing each analyzer's result
pub struct SiteChecker {
    fetcher: Fetcher,
    performance: TtlCache<PerformanceResult>,
    seo: TtlCache<SeoResult>,
    security: TtlCache<SecurityResult>,
    accessibility: TtlCache<AccessibilityResult>,
    mobile: TtlCache<MobileResult>,
}

impl SiteChecker {
    pub fn new(fetcher: Fetcher, cache_ttl: Duration) -> Self {
        Self {
            fetcher,
            performance: TtlCache::new(Category::Performance.cache_tag(), cache_ttl),
            seo: TtlCache::new(Category::Seo.cache_tag(), cache_ttl),
            security: TtlCache::new(Category::Security.cache_tag(), cache_ttl),
            accessibility: TtlCache::new(Category::Accessibility.cache_tag(), cache_ttl),
            mobile: TtlCache::new(Category::Mobile.cache_tag(), cache_ttl),
        }
    }

    pub fn from_config(config: &FetcherConfig, cache_ttl: Duration) -> SiteCheckResult<Self> {
        Ok(Self::new(Fetcher::new(config)?, cache_ttl))
    }

    pub async fn performance(&self, url: &str) -> PerformanceResult {
        let key = cache_key(url);
        self.cached(&self.performance, &key, performance::run(&self.fetcher, &key))
            .await
    }

    pub async fn seo(&self, url: &str) -> SeoResult {
        let key = cache_key(url);
        self.cached(&self.seo, &key, seo::run(&self.fetcher, &key))
            .await
    }

    pub async fn security(&self, url: &str) -> SecurityResult {
        let key = cache_key(url);
        self.cached(&self.security, &key, security::run(&self.fetcher, &key))
            .await
    }

    pub async fn accessibility(&self, url: &str) -> AccessibilityResult {
        let key = cache_key(url);
        self.cached(
            &self.accessibility,
            &key,
            accessibility::run(&self.fetcher, &key),
        )
        .await
    }

    pub async fn mobile(&self, url: &str) -> MobileResult {
        let key = cache_key(url);
        self.cached(&self.mobile, &key, mobile::run(&self.fetcher, &key))
            .await
    }

    /// Run a single analyzer
    pub async fn check(&self, category: Category, url: &str) -> CategoryResult {
        match category {
            Category::Performance => CategoryResult::Performance(self.performance(url).await),
            Category::Seo => CategoryResult::Seo(self.seo(url).await),
            Category::Security => CategoryResult::Security(self.security(url).await),
            Category::Accessibility => {
                CategoryResult::Accessibility(self.accessibility(url).await)
            }
            Category::Mobile => CategoryResult::Mobile(self.mobile(url).await),
        }
    }

    /// Run all five analyzers concurrently and combine their results
    pub async fn check_all(&self, url: &str) -> SiteCheckReport {
        let started = Instant::now();
        let (performance, seo, security, accessibility, mobile) = futures::join!(
            self.performance(url),
            self.seo(url),
            self.security(url),
            self.accessibility(url),
            self.mobile(url)
        );

        let score = overall_score(&[
            performance.score,
            seo.score,
            security.score,
            accessibility.score,
            mobile.score,
        ]);

        info!(
            url = %redact_url(url),
            score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "site check complete"
        );

        SiteCheckReport {
            url: cache_key(url),
            score,
            performance,
            seo,
            security,
            accessibility,
            mobile,
            analyzed_at: Utc::now(),
        }
    }

    async fn cached<R, F>(&self, cache: &TtlCache<R>, key: &str, analysis: F) -> R
    where
        R: CategoryReport,
        F: Future<Output = R>,
    {
        let run = async {
            let result = analysis.await;
            info!(
                tag = cache.tag(),
                url = %redact_url(key),
                score = result.score(),
                degraded = result.is_degraded(),
                "analysis finished"
            );
            result
        };

        // Degraded results are recomputed on the next request
        cache
            .get_or_compute(key, run, |result| !result.is_degraded())
            .await
    }
}

/// Canonical form of a user-supplied URL, so equivalent inputs share cache entries
fn cache_key(url: &str) -> String {
    normalize_url(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalizes_equivalent_inputs() {
        assert_eq!(cache_key("example.com"), "https://example.com/");
        assert_eq!(cache_key(" https://example.com/ "), "https://example.com/");
    }

    #[test]
    fn test_cache_key_keeps_invalid_input() {
        assert_eq!(cache_key("ftp://example.com"), "ftp://example.com");
    }

    #[tokio::test]
    async fn test_invalid_url_yields_degraded_results_for_every_category() {
        let checker = SiteChecker::from_config(&FetcherConfig::default(), Duration::from_secs(60))
            .expect("client should build");

        let report = checker.check_all("ftp://example.com/file").await;

        assert_eq!(report.score, 0);
        assert!(report.performance.is_degraded());
        assert!(report.seo.is_degraded());
        assert!(report.security.is_degraded());
        assert!(report.accessibility.is_degraded());
        assert!(report.mobile.is_degraded());
        assert!(report
            .security
            .error
            .as_deref()
            .unwrap()
            .contains("unsupported scheme"));
        // Degraded results are not cached
        assert!(checker.performance.is_empty().await);
    }

    #[tokio::test]
    async fn test_check_returns_requested_category() {
        let checker = SiteChecker::from_config(&FetcherConfig::default(), Duration::from_secs(60))
            .expect("client should build");

        let result = checker.check(Category::Mobile, "not a url").await;
        assert_eq!(result.category(), Category::Mobile);
        assert_eq!(result.score(), 0);
    }
}
