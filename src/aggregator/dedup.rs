//! Cross-engine deduplication by normalised URL.
//!
//! Groups results that refer to the same page and keeps one
//! representative per group: the entry with the best (lowest) rank, ties
//! broken by fixed engine priority. The full contributor set is recorded
//! so scoring can reward cross-engine agreement.

use std::collections::HashMap;

use crate::types::{Engine, SearchResult};

use super::url_normalize::normalize_url;

/// A deduplicated result: the chosen representative plus every engine
/// that returned the same normalised URL.
#[derive(Debug, Clone)]
pub struct DedupedResult {
    /// The representative entry (best rank, then engine priority).
    pub result: SearchResult,
    /// All engines that returned this URL, including the representative's.
    pub engines: Vec<Engine>,
}

impl DedupedResult {
    /// The best (lowest) rank any engine gave this URL — the
    /// representative's rank by construction.
    pub fn best_rank(&self) -> usize {
        self.result.rank
    }
}

/// Deduplicate merged results by normalised URL.
///
/// Output order is unspecified; the scoring stage imposes a total order
/// afterwards.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<DedupedResult> {
    let mut groups: HashMap<String, DedupedResult> = HashMap::new();

    for result in results {
        let key = normalize_url(&result.url);

        match groups.get_mut(&key) {
            Some(group) => {
                if !group.engines.contains(&result.engine) {
                    group.engines.push(result.engine);
                }
                if prefer(&result, &group.result) {
                    group.result = result;
                }
            }
            None => {
                let engines = vec![result.engine];
                groups.insert(key, DedupedResult { result, engines });
            }
        }
    }

    groups.into_values().collect()
}

/// True when `candidate` should replace `current` as the representative:
/// strictly better rank, or equal rank from a higher-priority engine.
fn prefer(candidate: &SearchResult, current: &SearchResult) -> bool {
    (candidate.rank, candidate.engine.priority()) < (current.rank, current.engine.priority())
}
