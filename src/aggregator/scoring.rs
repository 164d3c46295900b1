//! Composite scoring for deduplicated results.
//!
//! Two signals order the final set:
//!
//! 1. **Agreement** — how many engines returned the URL. Independent
//!    indexes agreeing is the strongest relevance signal, so it
//!    dominates: a URL found by three engines always outranks one found
//!    by two, regardless of raw positions.
//! 2. **Best rank** — the best position any engine gave the URL, with
//!    position decay breaking ties inside an agreement tier.
//!
//! Formula: `score = agreement_count * 10 + rank_decay` where
//! `rank_decay = 1.0 / (1.0 + (best_rank - 1) * 0.1)`. The decay term
//! lies in `(0, 1]`, so it can never promote a result across agreement
//! tiers.

use super::dedup::DedupedResult;

/// Weight of one agreeing engine. Larger than the maximum rank-decay
/// contribution, so agreement tiers never interleave.
const AGREEMENT_WEIGHT: f64 = 10.0;

/// Score a deduplicated result from its agreement count and best rank.
pub fn composite_score(best_rank: usize, engine_count: usize) -> f64 {
    let agreement = engine_count as f64 * AGREEMENT_WEIGHT;
    let decay = 1.0 / (1.0 + (best_rank.saturating_sub(1)) as f64 * 0.1);
    agreement + decay
}

/// Order deduplicated results by descending score with total tie-breaks:
/// best rank, then engine priority, then URL. The order is therefore
/// deterministic regardless of the (unspecified) dedup output order.
pub fn rank_results(mut results: Vec<DedupedResult>) -> Vec<DedupedResult> {
    results.sort_by(|a, b| {
        let score_a = composite_score(a.best_rank(), a.engines.len());
        let score_b = composite_score(b.best_rank(), b.engines.len());
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.best_rank().cmp(&b.best_rank()))
            .then_with(|| a.result.engine.priority().cmp(&b.result.engine.priority()))
            .then_with(|| a.result.url.cmp(&b.result.url))
    });
    results
}
