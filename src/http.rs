//! Shared HTTP client construction with User-Agent rotation.
//!
//! Engine clients carry a caller-supplied cookie jar so each engine's
//! session material stays isolated; the crawl client carries no cookie
//! store at all, so engine-authenticated state never leaks to third-party
//! page fetches.

use crate::config::SearchConfig;
use crate::error::SearchError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a client for one engine's session, backed by `jar`.
///
/// The jar is seeded by the caller from restored [`crate::SessionState`]
/// cookies; new cookies set during the exchange accumulate in it for the
/// duration of the run.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_engine_client(
    config: &SearchConfig,
    jar: Arc<reqwest::cookie::Jar>,
) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .cookie_provider(jar)
        .timeout(Duration::from_secs(config.engine_timeout_secs))
        .user_agent(user_agent(config))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build engine client: {e}")))
}

/// Build the client used for crawling result pages.
///
/// No cookie store: page fetches are unauthenticated and must not share
/// engine session state.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_crawl_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.page_timeout_secs))
        .user_agent(user_agent(config))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build crawl client: {e}")))
}

fn user_agent(config: &SearchConfig) -> String {
    match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    }
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}

/// Sleep for a random duration drawn from `config.request_delay_ms`.
///
/// Spreads engine requests over time so concurrent fan-out does not land
/// on every engine at the same instant.
pub async fn request_jitter(config: &SearchConfig) {
    let (min, max) = config.request_delay_ms;
    if max == 0 {
        return;
    }
    let delay = if min == max {
        min
    } else {
        rand::thread_rng().gen_range(min..=max)
    };
    tokio::time::sleep(Duration::from_millis(delay)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn user_agents_list_not_empty() {
        assert!(!USER_AGENTS.is_empty());
    }

    #[test]
    fn build_engine_client_with_default_config() {
        let config = SearchConfig::default();
        let jar = Arc::new(reqwest::cookie::Jar::default());
        assert!(build_engine_client(&config, jar).is_ok());
    }

    #[test]
    fn build_crawl_client_with_default_config() {
        let config = SearchConfig::default();
        assert!(build_crawl_client(&config).is_ok());
    }

    #[test]
    fn build_engine_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        let jar = Arc::new(reqwest::cookie::Jar::default());
        assert!(build_engine_client(&config, jar).is_ok());
    }

    #[tokio::test]
    async fn zero_jitter_returns_immediately() {
        let config = SearchConfig {
            request_delay_ms: (0, 0),
            ..Default::default()
        };
        let start = std::time::Instant::now();
        request_jitter(&config).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn jitter_stays_within_range() {
        let config = SearchConfig {
            request_delay_ms: (1, 20),
            ..Default::default()
        };
        let start = std::time::Instant::now();
        request_jitter(&config).await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
