//! URL normalisation for cross-engine deduplication.
//!
//! Two engines rarely report the same page with byte-identical URLs:
//! tracking parameters, fragments, parameter order, trailing slashes and
//! host capitalisation all differ. The normalised form strips that noise
//! so equivalent pages compare equal.

use url::Url;

/// Query parameters that only track provenance, stripped during
/// normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_id",
    "fbclid",
    "gclid",
    "igshid",
    "spm",
    "ref",
    "si",
    "feature",
];

/// Normalise a URL into its deduplication key.
///
/// Transformations, in order:
///
/// 1. Drop the fragment.
/// 2. Drop default ports (`:80` for http, `:443` for https).
/// 3. Strip tracking parameters and sort the survivors by key.
/// 4. Drop a trailing slash (unless the path is exactly `/`).
///
/// Scheme and host are lowercased by the parser itself. Input that does
/// not parse as a URL is returned unchanged — the quality filter is
/// responsible for rejecting malformed entries.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    rebuild_query(&mut parsed);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string()
}

/// Strip tracking parameters and impose a canonical parameter order.
fn rebuild_query(parsed: &mut Url) {
    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| {
            let k = key.to_lowercase();
            !TRACKING_PARAMS.contains(&k.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if params.is_empty() {
        parsed.set_query(None);
        return;
    }

    params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let qs = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    parsed.set_query(Some(&qs));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_scheme_and_host() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn removes_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/path/"),
            "https://example.com/path"
        );
    }

    #[test]
    fn preserves_root_slash() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn removes_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/path"),
            "http://example.com/path"
        );
        assert_eq!(
            normalize_url("https://example.com:443/path"),
            "https://example.com/path"
        );
    }

    #[test]
    fn preserves_non_default_port() {
        assert_eq!(
            normalize_url("https://example.com:8080/path"),
            "https://example.com:8080/path"
        );
    }

    #[test]
    fn sorts_query_params() {
        assert_eq!(
            normalize_url("https://example.com/search?z=1&a=2&m=3"),
            "https://example.com/search?a=2&m=3&z=1"
        );
    }

    #[test]
    fn strips_tracking_params() {
        assert_eq!(
            normalize_url("https://example.com/page?q=rust&utm_source=google&fbclid=abc&gclid=xyz"),
            "https://example.com/page?q=rust"
        );
    }

    #[test]
    fn strips_tracking_params_case_insensitively() {
        assert_eq!(
            normalize_url("https://example.com/page?q=test&UTM_Source=twitter"),
            "https://example.com/page?q=test"
        );
    }

    #[test]
    fn removes_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn equivalent_urls_normalize_identically() {
        let a = normalize_url("https://Example.COM/path/?b=2&a=1#section");
        let b = normalize_url("https://example.com/path?a=1&b=2");
        assert_eq!(a, b);
    }

    #[test]
    fn query_cleared_when_only_tracking_params() {
        assert_eq!(
            normalize_url("https://example.com/page?utm_source=a&utm_campaign=b&spm=c"),
            "https://example.com/page"
        );
    }

    #[test]
    fn invalid_url_returned_unchanged() {
        assert_eq!(normalize_url("not a url at all"), "not a url at all");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn plain_url_unchanged() {
        assert_eq!(
            normalize_url("https://example.com/page"),
            "https://example.com/page"
        );
    }
}
