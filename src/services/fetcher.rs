// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Bounded-timeout page fetching shared by every analyzer.

use crate::config::FetcherConfig;
use crate::error::{SiteCheckError, SiteCheckResult};
use crate::services::logging::redact_url;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING,
};
use std::io::{self, Read};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

const MAX_REDIRECTS: usize = 10;
const BROTLI_BUFFER_SIZE: usize = 4096;
const MAX_ROBOTS_TXT_BYTES: usize = 512 * 1024;
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";
/// Only encodings we can decode locally are advertised
const SUPPORTED_ENCODINGS: &str = "gzip, deflate, br, zstd";

/// A fetched HTML page with the response metadata the analyzers inspect
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,
    /// URL after redirects
    pub final_url: Url,
    pub status: u16,
    pub headers: HeaderMap,
    /// Decoded HTML
    pub body: String,
    /// Wall-clock time from sending the request to receiving the full body
    pub elapsed: Duration,
    /// Bytes received on the wire, before decompression
    pub transfer_size: usize,
}

impl FetchedPage {
    /// Build a page from HTML already in hand, with a 200 status and no headers
    pub fn from_html(url: &str, html: impl Into<String>) -> SiteCheckResult<Self> {
        let url = normalize_url(url)?;
        let body = html.into();
        Ok(Self {
            final_url: url.clone(),
            url,
            status: 200,
            headers: HeaderMap::new(),
            transfer_size: body.len(),
            body,
            elapsed: Duration::ZERO,
        })
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Header value as text, if present and valid
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn is_https(&self) -> bool {
        self.final_url.scheme() == "https"
    }
}

/// HTTP client wrapper with the configured User-Agent and timeout
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    /// Product token matched against `User-agent` lines in robots.txt
    robots_agent: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &FetcherConfig) -> SiteCheckResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            robots_agent: robots_agent(&config.user_agent),
            timeout: config.timeout,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn robots_agent(&self) -> &str {
        &self.robots_agent
    }

    /// GET a page, measuring latency and decoding the body.
    /// HTTP error statuses (4xx/5xx) are reported as errors.
    pub async fn fetch_page(&self, url: &str) -> SiteCheckResult<FetchedPage> {
        let url = normalize_url(url)?;
        debug!(url = %redact_url(url.as_str()), "fetching page");

        let started = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_ENCODING, SUPPORTED_ENCODINGS)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(SiteCheckError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let raw = self.read_body(response, self.max_body_bytes).await?;
        let elapsed = started.elapsed();

        let encoding = headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok());
        let decoded = decode_body(encoding, &raw, self.max_body_bytes)?;

        Ok(FetchedPage {
            url,
            final_url,
            status: status.as_u16(),
            headers,
            body: String::from_utf8_lossy(&decoded).into_owned(),
            elapsed,
            transfer_size: raw.len(),
        })
    }

    /// HEAD request; returns the status code, or `None` if the request failed
    pub async fn probe(&self, url: &Url) -> Option<u16> {
        match self.client.head(url.clone()).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                debug!(url = %redact_url(url.as_str()), error = %e, "probe failed");
                None
            }
        }
    }

    /// GET a plain-text resource; returns the body only on a 2xx status
    pub async fn fetch_text(&self, url: &Url) -> Option<String> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %redact_url(url.as_str()), error = %e, "text fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            return None;
        }

        match self.read_body(response, MAX_ROBOTS_TXT_BYTES).await {
            Ok(body) => Some(String::from_utf8_lossy(&body).into_owned()),
            Err(e) => {
                debug!(url = %redact_url(url.as_str()), error = %e, "text body rejected");
                None
            }
        }
    }

    /// Read a response body chunk by chunk, failing once it grows past `limit`
    async fn read_body(
        &self,
        mut response: reqwest::Response,
        limit: usize,
    ) -> SiteCheckResult<Vec<u8>> {
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(SiteCheckError::BodyTooLarge(limit));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > limit {
                return Err(SiteCheckError::BodyTooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn classify(&self, error: reqwest::Error) -> SiteCheckError {
        if error.is_timeout() {
            SiteCheckError::Timeout(self.timeout)
        } else {
            SiteCheckError::Http(error)
        }
    }
}

/// Parse user input into an absolute http(s) URL, assuming https when no scheme is given
pub fn normalize_url(input: &str) -> SiteCheckResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SiteCheckError::InvalidUrl("URL is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| SiteCheckError::InvalidUrl(format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SiteCheckError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(SiteCheckError::InvalidUrl(format!("{trimmed}: URL has no host")));
    }

    Ok(url)
}

/// Crawler name to look up in robots.txt, taken from a full User-Agent header.
/// `Mozilla/5.0 (compatible; SiteCheckBot/1.0)` yields `SiteCheckBot`.
pub fn robots_agent(user_agent: &str) -> String {
    let products: Vec<&str> = user_agent
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ';'))
        .filter(|token| token.contains('/'))
        .filter_map(|token| token.split('/').next())
        .filter(|name| !name.is_empty())
        .collect();

    products
        .iter()
        .find(|name| !name.eq_ignore_ascii_case("mozilla"))
        .or_else(|| products.first())
        .map(|name| name.to_string())
        .unwrap_or_else(|| user_agent.trim().to_string())
}

/// Undo the transfer encoding of a response body, refusing output larger than `limit`
fn decode_body(encoding: Option<&str>, raw: &[u8], limit: usize) -> SiteCheckResult<Vec<u8>> {
    let encoding = encoding.map(|e| e.trim().to_ascii_lowercase());

    let decoded = match encoding.as_deref() {
        None | Some("") | Some("identity") => return Ok(raw.to_vec()),
        Some("gzip") | Some("x-gzip") => read_capped(GzDecoder::new(raw), limit),
        // "deflate" is zlib-wrapped per RFC 9110, but raw deflate is common in the wild
        Some("deflate") => read_capped(ZlibDecoder::new(raw), limit)
            .or_else(|_| read_capped(DeflateDecoder::new(raw), limit)),
        Some("br") => read_capped(brotli::Decompressor::new(raw, BROTLI_BUFFER_SIZE), limit),
        Some("zstd") => {
            zstd::stream::read::Decoder::new(raw).and_then(|decoder| read_capped(decoder, limit))
        }
        Some(other) => {
            return Err(SiteCheckError::Decode(format!(
                "unsupported content encoding '{other}'"
            )))
        }
    }
    .map_err(|e| SiteCheckError::Decode(e.to_string()))?;

    if decoded.len() > limit {
        return Err(SiteCheckError::BodyTooLarge(limit));
    }
    Ok(decoded)
}

/// Read at most `limit + 1` bytes, enough to tell an oversized body apart
fn read_capped(reader: impl Read, limit: usize) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut decoded)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const LIMIT: usize = 64 * 1024;

    #[test]
    fn test_normalize_url_adds_https_scheme() {
        let url = normalize_url("example.com/page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_normalize_url_keeps_http() {
        let url = normalize_url("  http://example.com  ").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_normalize_url_rejects_empty() {
        assert!(matches!(
            normalize_url("   "),
            Err(SiteCheckError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_normalize_url_rejects_other_schemes() {
        let err = normalize_url("ftp://example.com/file").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_normalize_url_rejects_garbage() {
        assert!(normalize_url("https://").is_err());
        assert!(normalize_url("not a url at all").is_err());
    }

    #[test]
    fn test_robots_agent_skips_mozilla_prefix() {
        assert_eq!(
            robots_agent("Mozilla/5.0 (compatible; SiteCheckBot/1.0)"),
            "SiteCheckBot"
        );
        assert_eq!(
            robots_agent("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"),
            "Googlebot"
        );
    }

    #[test]
    fn test_robots_agent_plain_tokens() {
        assert_eq!(robots_agent("AuditBot/0.3"), "AuditBot");
        assert_eq!(robots_agent("Mozilla/5.0"), "Mozilla");
        assert_eq!(robots_agent("auditbot"), "auditbot");
    }

    #[test]
    fn test_decode_identity_body() {
        let decoded = decode_body(None, b"<html></html>", LIMIT).unwrap();
        assert_eq!(decoded, b"<html></html>");
    }

    #[test]
    fn test_decode_gzip_body() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<html><title>Hi</title></html>").unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = decode_body(Some("gzip"), &compressed, LIMIT).unwrap();
        assert_eq!(decoded, b"<html><title>Hi</title></html>");
    }

    #[test]
    fn test_decode_brotli_body() {
        let mut encoder = brotli::CompressorWriter::new(Vec::new(), 4096, 5, 22);
        encoder.write_all(b"<html><title>Hi</title></html>").unwrap();
        let compressed = encoder.into_inner();

        let decoded = decode_body(Some("br"), &compressed, LIMIT).unwrap();
        assert_eq!(decoded, b"<html><title>Hi</title></html>");
    }

    #[test]
    fn test_decode_zstd_body() {
        let html: &[u8] = b"<html><title>Hi</title></html>";
        let compressed = zstd::stream::encode_all(html, 3).unwrap();

        let decoded = decode_body(Some("zstd"), &compressed, LIMIT).unwrap();
        assert_eq!(decoded, b"<html><title>Hi</title></html>");
    }

    #[test]
    fn test_decode_rejects_unknown_encoding() {
        let err = decode_body(Some("compress"), b"\x1f\x9d", LIMIT).unwrap_err();
        assert!(matches!(err, SiteCheckError::Decode(_)));
    }

    #[test]
    fn test_decode_corrupt_gzip_fails() {
        assert!(decode_body(Some("gzip"), b"definitely not gzip", LIMIT).is_err());
    }

    #[test]
    fn test_decode_stops_at_body_limit() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&vec![b'a'; 1024 * 1024]).unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(compressed.len() < 4096);

        let err = decode_body(Some("gzip"), &compressed, 4096).unwrap_err();
        assert!(matches!(err, SiteCheckError::BodyTooLarge(4096)));
        assert_eq!(err.to_string(), "response body exceeds 4096 bytes");
    }

    #[test]
    fn test_decode_allows_body_at_limit() {
        let compressed = zstd::stream::encode_all(&[b'a'; 4096][..], 3).unwrap();

        let decoded = decode_body(Some("zstd"), &compressed, 4096).unwrap();
        assert_eq!(decoded.len(), 4096);
    }

    #[test]
    fn test_fetched_page_header_lookup_is_case_insensitive() {
        let page = FetchedPage::from_html("https://example.com", "<html></html>")
            .unwrap()
            .with_header("Strict-Transport-Security", "max-age=31536000");

        assert_eq!(
            page.header("strict-transport-security"),
            Some("max-age=31536000")
        );
        assert!(page.is_https());
        assert_eq!(page.status, 200);
    }
}
