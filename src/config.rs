//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] carries every tunable the pipeline needs as an explicit
//! field — the core never reads environment variables or other ambient
//! state. The defaults are tuned for reliable, polite scraping.

use crate::error::SearchError;
use crate::types::Engine;

/// Maximum value accepted for the `top_k` argument of
/// [`crate::execute_search`].
pub const MAX_TOP_K: usize = 20;

/// Configuration for a search-and-crawl run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Which engines to query. Queried concurrently; results are merged.
    pub engines: Vec<Engine>,
    /// How many candidate results to parse from each engine's listing.
    pub per_engine_limit: usize,
    /// Per-engine search timeout in seconds. Exceeding it is the expected
    /// signal that a verification challenge is blocking that engine.
    pub engine_timeout_secs: u64,
    /// Overall wall-clock bound on the engine fan-out in seconds. Engines
    /// still running at the deadline contribute nothing.
    pub aggregation_deadline_secs: u64,
    /// Maximum number of pages fetched concurrently by the crawler.
    pub crawl_concurrency: usize,
    /// Per-page fetch-and-extract timeout in seconds.
    pub page_timeout_secs: u64,
    /// Maximum characters of extracted content kept per page.
    pub max_content_chars: usize,
    /// Hosts whose results are dropped by the quality filter (ads,
    /// aggregator mirrors). Matches the host exactly or as a suffix.
    pub blocked_hosts: Vec<String>,
    /// Random delay range in milliseconds `(min, max)` before each engine
    /// request. Spreads requests over time to avoid rate limiting.
    pub request_delay_ms: (u64, u64),
    /// Custom User-Agent string. If `None`, rotates through a built-in
    /// list of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// When `false` the run is considered interactive: challenge-shaped
    /// engine failures are logged with session-bootstrap guidance.
    pub headless: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engines: vec![Engine::Bing, Engine::DuckDuckGo, Engine::Baidu],
            per_engine_limit: 15,
            engine_timeout_secs: 10,
            aggregation_deadline_secs: 20,
            crawl_concurrency: 8,
            page_timeout_secs: 15,
            max_content_chars: 5_000,
            blocked_hosts: Vec::new(),
            request_delay_ms: (100, 500),
            user_agent: None,
            headless: true,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is
    /// invalid.
    ///
    /// Checks:
    /// - `engines` must not be empty and must not repeat a variant
    /// - `per_engine_limit`, `crawl_concurrency`, `max_content_chars` must
    ///   be greater than 0
    /// - all timeouts must be greater than 0
    /// - `aggregation_deadline_secs` must be >= `engine_timeout_secs`
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.engines.is_empty() {
            return Err(SearchError::Config(
                "at least one engine must be enabled".into(),
            ));
        }
        for engine in Engine::all() {
            if self.engines.iter().filter(|e| *e == engine).count() > 1 {
                return Err(SearchError::Config(format!(
                    "engine {engine} listed more than once"
                )));
            }
        }
        if self.per_engine_limit == 0 {
            return Err(SearchError::Config(
                "per_engine_limit must be greater than 0".into(),
            ));
        }
        if self.engine_timeout_secs == 0 || self.page_timeout_secs == 0 {
            return Err(SearchError::Config(
                "timeouts must be greater than 0".into(),
            ));
        }
        if self.aggregation_deadline_secs < self.engine_timeout_secs {
            return Err(SearchError::Config(
                "aggregation_deadline_secs must be >= engine_timeout_secs".into(),
            ));
        }
        if self.crawl_concurrency == 0 {
            return Err(SearchError::Config(
                "crawl_concurrency must be greater than 0".into(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(SearchError::Config(
                "max_content_chars must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        Ok(())
    }
}
