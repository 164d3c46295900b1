//! Trait definition for pluggable search engine adapters, plus the scoped
//! session handle each adapter drives.
//!
//! Each engine (Bing, DuckDuckGo, Baidu) implements [`SearchEngineTrait`].
//! New engines are added as new variants implementing the trait — shared
//! logic never branches on an engine name.

use std::sync::Arc;

use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::session::SessionState;
use crate::types::{Engine, SearchResult};

/// A scoped, per-run session handle for one engine.
///
/// Owns the engine's HTTP client (cookie jar seeded from restored
/// [`SessionState`]) and the in-memory state that accumulates cookies
/// harvested during the exchange. The handle is created per run and
/// consumed at the end via [`EngineSession::into_state`], so session
/// material is released deterministically on every exit path — there is
/// no process-wide session singleton.
pub struct EngineSession {
    engine: Engine,
    client: reqwest::Client,
    state: SessionState,
}

impl EngineSession {
    /// Build a session for `engine`, restoring `stored` cookies into the
    /// request jar if present.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(
        engine: Engine,
        stored: Option<SessionState>,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        let state = stored.unwrap_or_else(|| SessionState::fresh(engine));

        let jar = Arc::new(reqwest::cookie::Jar::default());
        if let Ok(origin) = Url::parse(engine.cookie_origin()) {
            for cookie in &state.cookies {
                jar.add_cookie_str(cookie, &origin);
            }
        }

        let client = http::build_engine_client(config, jar)?;
        Ok(Self {
            engine,
            client,
            state,
        })
    }

    /// The engine this session belongs to.
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// The session's current (possibly updated) state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the handle, yielding the state for persistence.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Merge any `Set-Cookie` headers on `response` into the session
    /// state. Called on every engine response, including error pages, so
    /// verification cookies survive a failed search.
    pub(crate) fn absorb_cookies(&mut self, response: &reqwest::Response) {
        for value in response.headers().get_all(reqwest::header::SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                self.state.merge_cookie(raw);
            }
        }
    }
}

/// A pluggable search engine adapter.
///
/// Implementors drive one engine's HTML listing: URL construction with
/// the engine's query convention, the HTTP exchange through the given
/// [`EngineSession`], and CSS-selector parsing into ranked
/// [`SearchResult`] values (rank 1-based, preserving the engine's own
/// order).
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait SearchEngineTrait: Send + Sync {
    /// Perform a search, parsing up to `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the response cannot
    /// be parsed, or the engine is serving a verification challenge
    /// (surfaced as [`SearchError::Timeout`]). Cookies harvested before
    /// the failure remain on `session`.
    fn search(
        &self,
        query: &str,
        limit: usize,
        session: &mut EngineSession,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Returns which [`Engine`] variant this adapter represents.
    fn engine(&self) -> Engine;
}
