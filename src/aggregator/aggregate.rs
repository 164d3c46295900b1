//! Concurrent engine fan-out and the merge pipeline.
//!
//! Fan-out queries every configured engine concurrently, each unit
//! self-bounded by `min(engine_timeout, aggregation_deadline)` so the
//! whole aggregation finishes within the deadline and every engine
//! session is handed back for persistence on all exit paths, including
//! timeouts. Engine failures are folded into per-engine error records —
//! never into an aggregate failure.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::engine::{EngineSession, SearchEngineTrait};
use crate::engines::{BaiduEngine, BingEngine, DuckDuckGoEngine};
use crate::error::SearchError;
use crate::types::{Engine, SearchResult};

use super::dedup::deduplicate;
use super::filter::quality_filter;
use super::scoring::rank_results;

/// Everything the fan-out produced: the ranked result set, the sessions
/// (with any newly harvested cookies) for persistence, and the recovered
/// per-engine failures for observability.
pub struct AggregateOutcome {
    /// Deduplicated, scored, ordered results, truncated to the requested
    /// limit. No two entries share a normalised URL.
    pub results: Vec<SearchResult>,
    /// Engine sessions handed back for persistence, one per input.
    pub sessions: Vec<EngineSession>,
    /// Engines that failed, with their recovered errors.
    pub errors: Vec<(Engine, SearchError)>,
}

/// Fan a query out to every session's engine concurrently and merge the
/// results.
///
/// Failed or timed-out engines contribute an empty sequence; their error
/// is recorded on the outcome. The call itself never fails.
pub async fn aggregate(
    query: &str,
    sessions: Vec<EngineSession>,
    limit: usize,
    config: &SearchConfig,
) -> AggregateOutcome {
    // Clamping each unit to the deadline bounds the whole join without an
    // outer abort, so no session is ever lost to cancellation.
    let unit_timeout = Duration::from_secs(
        config
            .engine_timeout_secs
            .min(config.aggregation_deadline_secs),
    );

    let futures: Vec<_> = sessions
        .into_iter()
        .map(|mut session| {
            let query = query.to_string();
            async move {
                let engine = session.engine();
                let outcome = match tokio::time::timeout(
                    unit_timeout,
                    dispatch_search(engine, &query, &mut session, config),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SearchError::Timeout(format!(
                        "{engine} exceeded the {}s search timeout",
                        unit_timeout.as_secs()
                    ))),
                };
                (session, outcome)
            }
        })
        .collect();

    let completed = futures::future::join_all(futures).await;

    let mut sessions = Vec::with_capacity(completed.len());
    let mut outcomes = Vec::with_capacity(completed.len());
    for (session, outcome) in completed {
        outcomes.push((session.engine(), outcome));
        sessions.push(session);
    }

    let (merged, errors) = fold_outcomes(outcomes);
    let results = merge_and_rank(merged, &config.blocked_hosts, limit);

    AggregateOutcome {
        results,
        sessions,
        errors,
    }
}

/// Dispatch to the concrete adapter for `engine`.
async fn dispatch_search(
    engine: Engine,
    query: &str,
    session: &mut EngineSession,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>, SearchError> {
    let limit = config.per_engine_limit;
    match engine {
        Engine::Bing => BingEngine.search(query, limit, session, config).await,
        Engine::DuckDuckGo => DuckDuckGoEngine.search(query, limit, session, config).await,
        Engine::Baidu => BaiduEngine.search(query, limit, session, config).await,
    }
}

/// Fold per-engine outcomes into one merged result sequence plus the
/// recovered errors. One engine's failure never suppresses another's
/// results.
pub fn fold_outcomes(
    outcomes: Vec<(Engine, Result<Vec<SearchResult>, SearchError>)>,
) -> (Vec<SearchResult>, Vec<(Engine, SearchError)>) {
    let mut merged = Vec::new();
    let mut errors = Vec::new();

    for (engine, outcome) in outcomes {
        match outcome {
            Ok(results) => {
                tracing::debug!(%engine, count = results.len(), "engine returned results");
                merged.extend(results);
            }
            Err(err) => {
                tracing::warn!(%engine, error = %err, "engine query failed");
                errors.push((engine, err));
            }
        }
    }

    (merged, errors)
}

/// The deterministic tail of the pipeline: quality filter → dedup →
/// score → sort → truncate.
///
/// Running this twice on identical input yields identical output.
pub fn merge_and_rank(
    merged: Vec<SearchResult>,
    blocked_hosts: &[String],
    limit: usize,
) -> Vec<SearchResult> {
    let filtered = quality_filter(merged, blocked_hosts);
    let deduped = deduplicate(filtered);
    let mut ranked = rank_results(deduped);
    ranked.truncate(limit);
    ranked.into_iter().map(|dr| dr.result).collect()
}
