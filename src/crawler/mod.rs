//! Concurrent page crawling with per-page failure isolation.
//!
//! Fetches each result's URL through a bounded worker pool and extracts
//! readable content. One page's failure (network error, timeout,
//! unextractable markup) yields a [`CrawledPage`] with `error` set and
//! empty content — it never aborts or affects sibling fetches. Output
//! order always matches input order; only the fetching itself is
//! unordered.

pub mod extract;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::{CrawlError, CrawlErrorKind, CrawledPage, SearchResult};

/// Crawl every result concurrently, bounded by
/// `config.crawl_concurrency`, each fetch time-boxed by
/// `config.page_timeout_secs`.
///
/// Never fails as a whole: every input produces exactly one output page,
/// in input order.
pub async fn crawl(results: Vec<SearchResult>, config: &SearchConfig) -> Vec<CrawledPage> {
    let client = match http::build_crawl_client(config) {
        Ok(client) => client,
        Err(e) => {
            // Without a client nothing can be fetched; report the same
            // failure on every page rather than failing the batch.
            let error = CrawlError::from(e);
            return results
                .into_iter()
                .map(|result| CrawledPage {
                    result,
                    content: String::new(),
                    fetched_at: Utc::now(),
                    error: Some(error.clone()),
                })
                .collect();
        }
    };

    let semaphore = Arc::new(Semaphore::new(config.crawl_concurrency));
    let page_timeout = Duration::from_secs(config.page_timeout_secs);
    let max_chars = config.max_content_chars;

    let futures: Vec<_> = results
        .into_iter()
        .map(|result| {
            let client = client.clone();
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire_owned().await.ok();

                let outcome = tokio::time::timeout(
                    page_timeout,
                    fetch_and_extract(&client, &result.url, max_chars),
                )
                .await;

                let (content, error) = match outcome {
                    Ok(Ok(content)) => (content, None),
                    Ok(Err(e)) => {
                        tracing::warn!(url = %result.url, error = %e, "page crawl failed");
                        (String::new(), Some(CrawlError::from(e)))
                    }
                    Err(_) => {
                        tracing::warn!(url = %result.url, "page crawl timed out");
                        (
                            String::new(),
                            Some(CrawlError {
                                kind: CrawlErrorKind::Timeout,
                                message: format!(
                                    "page fetch exceeded {}s",
                                    page_timeout.as_secs()
                                ),
                            }),
                        )
                    }
                };

                CrawledPage {
                    result,
                    content,
                    fetched_at: Utc::now(),
                    error,
                }
            }
        })
        .collect();

    // join_all yields outputs in input order regardless of completion
    // order, which is exactly the positional reassembly we need.
    futures::future::join_all(futures).await
}

/// Fetch one page and extract its readable content.
async fn fetch_and_extract(
    client: &reqwest::Client,
    url: &str,
    max_chars: usize,
) -> Result<String, SearchError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SearchError::Timeout(format!("fetch timed out: {e}"))
        } else {
            SearchError::Http(format!("fetch failed: {e}"))
        }
    })?;

    let response = response
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("fetch HTTP error: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("fetch read failed: {e}")))?;

    tracing::trace!(url, bytes = html.len(), "page fetched");

    extract::extract_content(&html, max_chars)
}
