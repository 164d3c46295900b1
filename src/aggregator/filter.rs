//! Quality filtering of merged engine results.
//!
//! Drops entries that cannot usefully be crawled or shown: empty titles
//! or snippets, URLs that do not parse as absolute http(s) URLs, and
//! hosts on the configured block set (ad landers, aggregator mirrors).

use url::Url;

use crate::types::SearchResult;

/// Apply the quality filter, preserving input order of survivors.
pub fn quality_filter(results: Vec<SearchResult>, blocked_hosts: &[String]) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|r| passes(r, blocked_hosts))
        .collect()
}

fn passes(result: &SearchResult, blocked_hosts: &[String]) -> bool {
    if result.title.trim().is_empty() || result.snippet.trim().is_empty() {
        tracing::trace!(url = %result.url, "dropped: empty title or snippet");
        return false;
    }

    let Ok(parsed) = Url::parse(&result.url) else {
        tracing::trace!(url = %result.url, "dropped: malformed URL");
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        tracing::trace!(url = %result.url, "dropped: non-http scheme");
        return false;
    }
    let Some(host) = parsed.host_str() else {
        tracing::trace!(url = %result.url, "dropped: no host");
        return false;
    };

    if is_blocked(host, blocked_hosts) {
        tracing::trace!(url = %result.url, "dropped: blocked host");
        return false;
    }

    true
}

/// True when `host` matches a blocked entry exactly or as a subdomain.
fn is_blocked(host: &str, blocked_hosts: &[String]) -> bool {
    let host = host.to_ascii_lowercase();
    blocked_hosts.iter().any(|blocked| {
        let blocked = blocked.to_ascii_lowercase();
        host == blocked || host.ends_with(&format!(".{blocked}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Engine;

    fn make_result(title: &str, url: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            engine: Engine::Bing,
            rank: 1,
        }
    }

    #[test]
    fn well_formed_result_passes() {
        let results = quality_filter(
            vec![make_result("Title", "https://example.com/page", "snippet")],
            &[],
        );
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn empty_title_dropped() {
        let results = quality_filter(
            vec![make_result("", "https://example.com", "snippet")],
            &[],
        );
        assert!(results.is_empty());
    }

    #[test]
    fn whitespace_title_dropped() {
        let results = quality_filter(
            vec![make_result("   ", "https://example.com", "snippet")],
            &[],
        );
        assert!(results.is_empty());
    }

    #[test]
    fn empty_snippet_dropped() {
        let results = quality_filter(vec![make_result("Title", "https://example.com", "")], &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn malformed_url_dropped() {
        let results = quality_filter(vec![make_result("Title", "not a url", "snippet")], &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn relative_url_dropped() {
        let results = quality_filter(vec![make_result("Title", "/relative/path", "snippet")], &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn non_http_scheme_dropped() {
        let results = quality_filter(
            vec![make_result("Title", "javascript:void(0)", "snippet")],
            &[],
        );
        assert!(results.is_empty());
    }

    #[test]
    fn blocked_host_dropped() {
        let blocked = vec!["adserver.example".to_string()];
        let results = quality_filter(
            vec![make_result("Title", "https://adserver.example/landing", "snippet")],
            &blocked,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn blocked_host_matches_subdomains() {
        let blocked = vec!["adserver.example".to_string()];
        let results = quality_filter(
            vec![make_result("Title", "https://cdn.adserver.example/x", "snippet")],
            &blocked,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn unblocked_host_survives_with_block_list() {
        let blocked = vec!["adserver.example".to_string()];
        let results = quality_filter(
            vec![make_result("Title", "https://example.com/page", "snippet")],
            &blocked,
        );
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn block_matching_is_suffix_not_substring() {
        // "badserver.example" must not match blocked "adserver.example".
        let blocked = vec!["adserver.example".to_string()];
        let results = quality_filter(
            vec![make_result("Title", "https://badserver.example/x", "snippet")],
            &blocked,
        );
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn survivor_order_preserved() {
        let results = quality_filter(
            vec![
                make_result("A", "https://a.com", "s"),
                make_result("", "https://dropped.com", "s"),
                make_result("B", "https://b.com", "s"),
            ],
            &[],
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
        assert_eq!(results[1].title, "B");
    }
}
