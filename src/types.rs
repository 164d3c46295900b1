//! Core types: engines, search results, crawled pages, and final records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;

/// Supported search engines that webseek can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    /// Bing — stable HTML listing, tolerant of automated clients.
    Bing,
    /// DuckDuckGo — HTML-only endpoint, most scraper-friendly.
    DuckDuckGo,
    /// Baidu — largest Chinese-language index; aggressive verification.
    Baidu,
}

impl Engine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Baidu => "Baidu",
        }
    }

    /// Fixed priority used to break ties between engines (lower wins).
    pub fn priority(&self) -> u8 {
        match self {
            Self::Bing => 0,
            Self::DuckDuckGo => 1,
            Self::Baidu => 2,
        }
    }

    /// Domains this engine sets session cookies on. Cookies outside this
    /// set are never persisted for the engine.
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            Self::Bing => &["bing.com", "www.bing.com"],
            Self::DuckDuckGo => &["duckduckgo.com", "html.duckduckgo.com"],
            Self::Baidu => &["baidu.com", "www.baidu.com"],
        }
    }

    /// Origin used when restoring stored cookies into a fresh cookie jar.
    pub(crate) fn cookie_origin(&self) -> &'static str {
        match self {
            Self::Bing => "https://www.bing.com/",
            Self::DuckDuckGo => "https://html.duckduckgo.com/",
            Self::Baidu => "https://www.baidu.com/",
        }
    }

    /// Returns all available engine variants in priority order.
    pub fn all() -> &'static [Engine] {
        &[Self::Bing, Self::DuckDuckGo, Self::Baidu]
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single search result returned from one engine's listing.
///
/// Immutable once produced by an adapter. Identity for deduplication is
/// the normalised form of `url`, not the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The result URL as the engine reported it (absolute).
    pub url: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
    /// Which engine returned this result.
    pub engine: Engine,
    /// 1-based position within that engine's listing. Unique and
    /// contiguous per engine per query.
    pub rank: usize,
}

/// Why a page crawl produced no content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlErrorKind {
    /// The fetch exceeded the per-page timeout.
    Timeout,
    /// The HTTP request failed or returned an error status.
    Http,
    /// The page was fetched but no readable content could be extracted.
    Extraction,
}

/// A structured crawl failure attached to the affected page only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    pub kind: CrawlErrorKind,
    pub message: String,
}

impl From<SearchError> for CrawlError {
    fn from(err: SearchError) -> Self {
        let kind = match err {
            SearchError::Timeout(_) => CrawlErrorKind::Timeout,
            SearchError::Extraction(_) | SearchError::Parse(_) => CrawlErrorKind::Extraction,
            _ => CrawlErrorKind::Http,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// A search result paired with the outcome of fetching its page.
///
/// Owns no reference back to any session; created by the crawler from a
/// [`SearchResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    /// The result this page was crawled for.
    pub result: SearchResult,
    /// Extracted readable body text. Empty when `error` is set.
    pub content: String,
    /// When the fetch completed (successfully or not).
    pub fetched_at: DateTime<Utc>,
    /// Set when this page's fetch or extraction failed. Never affects
    /// sibling pages in the same batch.
    pub error: Option<CrawlError>,
}

/// The final record shape returned by [`crate::execute_search`].
///
/// This is what the (external) rendering layer consumes unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub engine: Engine,
    /// Extracted page content; empty when the crawl failed.
    pub extracted_content: String,
    /// Structured crawl failure, if any.
    pub error: Option<CrawlError>,
}

impl From<CrawledPage> for SearchRecord {
    fn from(page: CrawledPage) -> Self {
        Self {
            title: page.result.title,
            url: page.result.url,
            snippet: page.result.snippet,
            engine: page.result.engine,
            extracted_content: page.content,
            error: page.error,
        }
    }
}
