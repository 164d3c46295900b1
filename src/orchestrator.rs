//! End-to-end search orchestration.
//!
//! Composes the pipeline: restore per-engine sessions from the store →
//! aggregate across engines → crawl the aggregated set → zip results
//! with their pages → persist updated sessions (best effort) → return
//! the final ordered records.
//!
//! Cross-cutting failure policy lives here and nowhere else: a total
//! engine failure yields an empty record set, not an error — the caller
//! always receives a well-formed response. Only invalid arguments (and a
//! session store that cannot be opened, which the caller hits before
//! this function) are hard failures.

use crate::aggregator;
use crate::config::{SearchConfig, MAX_TOP_K};
use crate::crawler;
use crate::engine::EngineSession;
use crate::error::{Result, SearchError};
use crate::session::SessionStateStore;
use crate::types::SearchRecord;

/// Run the full search pipeline for `query`, returning at most `top_k`
/// records.
///
/// # Errors
///
/// Returns [`SearchError::InvalidArgument`] if `query` is empty or
/// `top_k` is outside `[1, 20]`, and [`SearchError::Config`] if `config`
/// is invalid. Engine and page failures are recovered into the records
/// themselves and never fail the call.
pub async fn execute_search(
    query: &str,
    top_k: usize,
    config: &SearchConfig,
    store: &SessionStateStore,
) -> Result<Vec<SearchRecord>> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidArgument(
            "query must not be empty".into(),
        ));
    }
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(SearchError::InvalidArgument(format!(
            "top_k must be in [1, {MAX_TOP_K}], got {top_k}"
        )));
    }
    config.validate()?;

    tracing::debug!(query, top_k, engines = config.engines.len(), "search started");

    // Restore one scoped session per engine. Absent state means an
    // anonymous session.
    let mut sessions = Vec::with_capacity(config.engines.len());
    for &engine in &config.engines {
        let stored = store.load(engine).await;
        sessions.push(EngineSession::new(engine, stored, config)?);
    }

    let outcome = aggregator::aggregate(query, sessions, top_k, config).await;

    for (engine, error) in &outcome.errors {
        if !config.headless && matches!(error, SearchError::Timeout(_)) {
            tracing::info!(
                %engine,
                "engine appears blocked by verification; solve the challenge in a \
                 browser and import its cookies via SessionState::from_cookies"
            );
        }
    }

    tracing::debug!(
        results = outcome.results.len(),
        failed_engines = outcome.errors.len(),
        "aggregation complete"
    );

    let pages = crawler::crawl(outcome.results, config).await;

    // Persist sessions even after a degraded run — verification work a
    // human just did must never be lost. Failures are logged, not fatal.
    for session in outcome.sessions {
        let state = session.into_state();
        if let Err(e) = store.save(&state).await {
            tracing::warn!(engine = %state.engine, error = %e, "failed to persist session state");
        }
    }

    Ok(pages.into_iter().map(SearchRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStateStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");
        (dir, store)
    }

    #[tokio::test]
    async fn empty_query_rejected() {
        let (_dir, store) = store();
        let result = execute_search("", 5, &SearchConfig::default(), &store).await;
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn whitespace_query_rejected() {
        let (_dir, store) = store();
        let result = execute_search("   ", 5, &SearchConfig::default(), &store).await;
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn zero_top_k_rejected() {
        let (_dir, store) = store();
        let result = execute_search("rust", 0, &SearchConfig::default(), &store).await;
        let err = result.expect_err("should reject");
        assert!(err.to_string().contains("top_k"));
    }

    #[tokio::test]
    async fn oversized_top_k_rejected() {
        let (_dir, store) = store();
        let result = execute_search("rust", 25, &SearchConfig::default(), &store).await;
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn top_k_boundaries_accepted_by_validation() {
        // A config error is reported only after the argument checks, so
        // observing Config (not InvalidArgument) proves top_k=1 and
        // top_k=20 passed argument validation without touching the network.
        let (_dir, store) = store();
        let bad_config = SearchConfig {
            crawl_concurrency: 0,
            ..Default::default()
        };
        for top_k in [1, 20] {
            let result = execute_search("rust", top_k, &bad_config, &store).await;
            assert!(matches!(result, Err(SearchError::Config(_))));
        }
    }

    #[tokio::test]
    async fn invalid_config_rejected() {
        let (_dir, store) = store();
        let config = SearchConfig {
            engines: vec![],
            ..Default::default()
        };
        let result = execute_search("rust", 5, &config, &store).await;
        assert!(matches!(result, Err(SearchError::Config(_))));
    }
}
