//! # webseek
//!
//! Multi-engine web search aggregation with page crawling and durable
//! per-engine session state.
//!
//! This crate provides web search by scraping public search engines
//! directly — no API keys, no external services. It is a library for
//! embedding: protocol layers, CLIs and renderers sit outside and consume
//! the structured records it returns.
//!
//! ## Design
//!
//! - Scrapes Bing, DuckDuckGo, and Baidu concurrently and reconciles
//!   their independently ranked listings: quality filter, dedup by
//!   normalised URL, agreement-weighted scoring
//! - Crawls the surviving result pages through a bounded worker pool and
//!   extracts readable content, with per-page failure isolation
//! - Persists each engine's session cookies across runs (atomic
//!   file-backed store), so verification work done once — including a
//!   human solving a CAPTCHA in a real browser — is reused by later runs
//! - Graceful degradation: failed engines and failed pages surface as
//!   structured fields, never as an overall failure
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners — this is a library, not a server
//! - Search queries are logged only at trace level
//! - Engine session cookies never accompany third-party page fetches
//!
//! ## Examples
//!
//! ```no_run
//! # async fn example() -> webseek::Result<()> {
//! let config = webseek::SearchConfig::default();
//! let store = webseek::SessionStateStore::open(".webseek/sessions")?;
//! let records = webseek::execute_search("rust async runtime", 10, &config, &store).await?;
//! for record in &records {
//!     println!("[{}] {} — {}", record.engine, record.title, record.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod crawler;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod session;
pub mod types;

pub use config::{SearchConfig, MAX_TOP_K};
pub use engine::{EngineSession, SearchEngineTrait};
pub use error::{Result, SearchError};
pub use session::{SessionState, SessionStateStore};
pub use types::{
    CrawlError, CrawlErrorKind, CrawledPage, Engine, SearchRecord, SearchResult,
};

/// Run the full search pipeline: restore sessions, aggregate across
/// engines, crawl the aggregated set, persist updated sessions, and
/// return at most `top_k` records.
///
/// # Errors
///
/// Returns [`SearchError::InvalidArgument`] if `query` is empty or
/// `top_k` is outside `[1, 20]`; [`SearchError::Config`] if `config`
/// fails validation. Engine and page failures degrade the result set
/// instead of failing the call.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> webseek::Result<()> {
/// let config = webseek::SearchConfig::default();
/// let store = webseek::SessionStateStore::open(".webseek/sessions")?;
/// let records = webseek::execute_search("tokio semaphore", 5, &config, &store).await?;
/// assert!(records.len() <= 5);
/// # Ok(())
/// # }
/// ```
pub async fn execute_search(
    query: &str,
    top_k: usize,
    config: &SearchConfig,
    store: &SessionStateStore,
) -> Result<Vec<SearchRecord>> {
    orchestrator::execute_search(query, top_k, config, store).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_search_rejects_empty_query() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");
        let result = execute_search("", 5, &SearchConfig::default(), &store).await;
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn execute_search_rejects_out_of_range_top_k() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        for top_k in [0, 21, 100] {
            let result = execute_search("rust", top_k, &SearchConfig::default(), &store).await;
            assert!(
                matches!(result, Err(SearchError::InvalidArgument(_))),
                "top_k={top_k} should be rejected"
            );
        }
    }

    #[test]
    fn max_top_k_is_twenty() {
        assert_eq!(MAX_TOP_K, 20);
    }
}
