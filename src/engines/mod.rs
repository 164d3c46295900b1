//! Search engine adapter implementations.
//!
//! Each module provides a struct implementing
//! [`crate::engine::SearchEngineTrait`] that scrapes a specific engine's
//! HTML results page. The shared fetch helper here handles request
//! jitter, cookie harvesting, and verification-challenge detection so
//! the adapters only differ in URL construction and parsing.

pub mod baidu;
pub mod bing;
pub mod duckduckgo;

pub use baidu::BaiduEngine;
pub use bing::BingEngine;
pub use duckduckgo::DuckDuckGoEngine;

use crate::config::SearchConfig;
use crate::engine::EngineSession;
use crate::error::SearchError;
use crate::http;

/// URL substrings that mark a verification/challenge interstitial.
const CHALLENGE_URL_MARKERS: &[&str] = &[
    "captcha",
    "challenge",
    "verify",
    "recaptcha",
    "hcaptcha",
    "cf-chl",
    "turnstile",
];

/// Body phrases that mark a verification/challenge interstitial.
const CHALLENGE_BODY_MARKERS: &[&str] = &[
    "verify you are human",
    "prove you're not a robot",
    "just a moment",
    "unusual traffic",
    "人机验证",
    "安全验证",
    "百度安全验证",
    "请解决以下难题",
];

/// Detect whether a response is a CAPTCHA/verification page rather than
/// a results listing. A positive detection is surfaced as a timeout — the
/// recoverable signal that human intervention (session bootstrap) is
/// needed.
pub(crate) fn is_challenge_page(final_url: &str, body: &str) -> bool {
    let url = final_url.to_ascii_lowercase();
    if CHALLENGE_URL_MARKERS.iter().any(|m| url.contains(m)) {
        return true;
    }

    // Interstitials are small; cap the scan so large listings stay cheap.
    let head_len = body
        .char_indices()
        .nth(16_384)
        .map_or(body.len(), |(i, _)| i);
    let head = body[..head_len].to_lowercase();
    CHALLENGE_BODY_MARKERS.iter().any(|m| head.contains(m))
}

/// Execute one engine request through `session` and return the response
/// body.
///
/// Applies the configured request jitter, merges `Set-Cookie` headers
/// into the session state before any status/parse handling (so
/// verification cookies survive failed exchanges), and rejects challenge
/// interstitials with [`SearchError::Timeout`].
pub(crate) async fn fetch_listing(
    session: &mut EngineSession,
    request: reqwest::RequestBuilder,
    config: &SearchConfig,
) -> Result<String, SearchError> {
    let engine = session.engine();

    http::request_jitter(config).await;

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            SearchError::Timeout(format!("{engine} request timed out: {e}"))
        } else {
            SearchError::Http(format!("{engine} request failed: {e}"))
        }
    })?;

    session.absorb_cookies(&response);
    let final_url = response.url().to_string();

    let response = response
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{engine} HTTP error: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{engine} response read failed: {e}")))?;

    tracing::trace!(%engine, bytes = html.len(), "engine response received");

    if is_challenge_page(&final_url, &html) {
        return Err(SearchError::Timeout(format!(
            "{engine} is serving a verification challenge"
        )));
    }

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_detected_from_url() {
        assert!(is_challenge_page(
            "https://www.bing.com/turing/captcha/challenge",
            "<html></html>"
        ));
        assert!(is_challenge_page(
            "https://wappass.baidu.com/static/captcha/tuxing.html",
            ""
        ));
    }

    #[test]
    fn challenge_detected_from_body() {
        assert!(is_challenge_page(
            "https://www.baidu.com/s?wd=rust",
            "<html><body>百度安全验证</body></html>"
        ));
        assert!(is_challenge_page(
            "https://example.com/search",
            "<html><body>Please Verify You Are Human to continue</body></html>"
        ));
    }

    #[test]
    fn normal_listing_not_flagged() {
        assert!(!is_challenge_page(
            "https://www.bing.com/search?q=rust",
            "<html><body><li class=\"b_algo\">results</li></body></html>"
        ));
    }

    #[test]
    fn body_marker_beyond_scan_window_ignored() {
        let mut body = "x".repeat(20_000);
        body.push_str("verify you are human");
        assert!(!is_challenge_page("https://example.com/search", &body));
    }
}
