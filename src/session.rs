//! Durable per-engine session state.
//!
//! Each engine owns one [`SessionState`] — an opaque list of cookie
//! strings plus a save timestamp — persisted by [`SessionStateStore`] as
//! one JSON file per engine. Saves are atomic (write-to-temp-then-rename)
//! so a reader in a later run never observes a partially written record,
//! even if the process crashes mid-save.
//!
//! There is no expiry: search engine session cookies are long-lived and
//! re-verification is costly, so state is retained until overwritten or
//! explicitly invalidated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Result, SearchError};
use crate::types::Engine;

/// Serialized browser-session material for one engine.
///
/// The cookie strings are opaque to everything except the engine session
/// that harvests them; they are raw `Set-Cookie` values scoped to the
/// engine's own domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The engine this state belongs to.
    pub engine: Engine,
    /// Raw cookie strings (`name=value; attributes...`).
    pub cookies: Vec<String>,
    /// When this state was last updated.
    pub saved_at: DateTime<Utc>,
}

impl SessionState {
    /// An empty, anonymous session for `engine`.
    pub fn fresh(engine: Engine) -> Self {
        Self {
            engine,
            cookies: Vec::new(),
            saved_at: Utc::now(),
        }
    }

    /// Build a state from externally obtained cookies.
    ///
    /// This is the human-in-the-loop bootstrap path: solve the engine's
    /// verification challenge in a real browser, export its cookies, and
    /// import them here. Cookies scoped to domains the engine does not
    /// own are dropped. Save the result through [`SessionStateStore`] and
    /// later headless runs will restore it.
    pub fn from_cookies(engine: Engine, cookies: Vec<String>) -> Self {
        let cookies = cookies
            .into_iter()
            .filter(|raw| cookie_matches_domains(raw, engine.domains()))
            .collect();
        Self {
            engine,
            cookies,
            saved_at: Utc::now(),
        }
    }

    /// True when the session carries no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Merge one raw `Set-Cookie` value into this state, replacing any
    /// existing cookie with the same name. Cookies for foreign domains
    /// are ignored.
    pub(crate) fn merge_cookie(&mut self, raw: &str) {
        if !cookie_matches_domains(raw, self.engine.domains()) {
            return;
        }
        let Some(name) = cookie_name(raw) else {
            return;
        };
        self.cookies
            .retain(|existing| cookie_name(existing) != Some(name));
        self.cookies.push(raw.to_owned());
        self.saved_at = Utc::now();
    }
}

/// The cookie name, i.e. everything before the first `=` in the first
/// `name=value` pair.
fn cookie_name(raw: &str) -> Option<&str> {
    let pair = raw.split(';').next()?;
    let name = pair.split('=').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// True when the cookie's `Domain` attribute (if any) falls inside one of
/// `domains`. Host-only cookies carry no attribute and are accepted — the
/// session only ever talks to the engine's own hosts.
fn cookie_matches_domains(raw: &str, domains: &[&str]) -> bool {
    for attr in raw.split(';').skip(1) {
        let attr = attr.trim();
        let Some(value) = attr
            .strip_prefix("Domain=")
            .or_else(|| attr.strip_prefix("domain="))
        else {
            continue;
        };
        let value = value.trim_start_matches('.').to_ascii_lowercase();
        return domains
            .iter()
            .any(|d| value == *d || value.ends_with(&format!(".{d}")) || d.ends_with(&format!(".{value}")));
    }
    true
}

/// File-backed keyed store of [`SessionState`], one record per engine.
///
/// Absence of stored state is not an error — callers treat it as "start
/// an anonymous session." Concurrent save/load for the same engine within
/// a process are serialised by a per-engine lock; cross-process safety
/// comes from the atomic rename on save.
pub struct SessionStateStore {
    dir: PathBuf,
    locks: Mutex<HashMap<Engine, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionStateStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Io`] if the directory cannot be created —
    /// the one session-store failure that is fatal to a run.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| SearchError::Io(format!("cannot create session dir: {e}")))?;
        Ok(Self {
            dir,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Load the stored state for `engine`, if any.
    ///
    /// A missing file yields `None`. A corrupt or mismatched file is
    /// invalidated and also yields `None` — a damaged record is never an
    /// error, just an absent session.
    pub async fn load(&self, engine: Engine) -> Option<SessionState> {
        let path = self.state_path(engine);
        let lock = self.engine_lock(engine);
        let _guard = lock.lock().await;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(%engine, error = %e, "failed to read session state");
                return None;
            }
        };

        match serde_json::from_slice::<SessionState>(&bytes) {
            Ok(state) if state.engine == engine => {
                tracing::debug!(%engine, cookies = state.cookies.len(), "session state restored");
                Some(state)
            }
            Ok(state) => {
                tracing::warn!(%engine, found = %state.engine, "session state engine mismatch, invalidating");
                remove_state_file(&path).await;
                None
            }
            Err(e) => {
                tracing::warn!(%engine, error = %e, "corrupt session state, invalidating");
                remove_state_file(&path).await;
                None
            }
        }
    }

    /// Persist `state`, atomically replacing any previous record for its
    /// engine.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Io`] on serialization or filesystem failure.
    /// Callers in the orchestrator treat this as best-effort.
    pub async fn save(&self, state: &SessionState) -> Result<()> {
        let path = self.state_path(state.engine);
        let tmp = path.with_extension("json.tmp");
        let lock = self.engine_lock(state.engine);
        let _guard = lock.lock().await;

        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| SearchError::Io(format!("cannot serialize session state: {e}")))?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| SearchError::Io(format!("cannot write session state: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| SearchError::Io(format!("cannot replace session state: {e}")))?;

        tracing::debug!(engine = %state.engine, cookies = state.cookies.len(), "session state saved");
        Ok(())
    }

    /// Remove any stored state for `engine`.
    pub async fn invalidate(&self, engine: Engine) {
        let path = self.state_path(engine);
        let lock = self.engine_lock(engine);
        let _guard = lock.lock().await;
        remove_state_file(&path).await;
    }

    fn state_path(&self, engine: Engine) -> PathBuf {
        self.dir
            .join(format!("{}_state.json", engine.name().to_ascii_lowercase()))
    }

    fn engine_lock(&self, engine: Engine) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(engine).or_default().clone()
    }
}

async fn remove_state_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove session state file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_empty() {
        let state = SessionState::fresh(Engine::Bing);
        assert!(state.is_empty());
        assert_eq!(state.engine, Engine::Bing);
    }

    #[test]
    fn cookie_name_parsed() {
        assert_eq!(cookie_name("SID=abc123; Path=/"), Some("SID"));
        assert_eq!(cookie_name("plain=1"), Some("plain"));
        assert_eq!(cookie_name(""), None);
    }

    #[test]
    fn merge_cookie_replaces_by_name() {
        let mut state = SessionState::fresh(Engine::Bing);
        state.merge_cookie("SRCHD=old; Domain=.bing.com; Path=/");
        state.merge_cookie("SRCHD=new; Domain=.bing.com; Path=/");
        assert_eq!(state.cookies.len(), 1);
        assert!(state.cookies[0].contains("SRCHD=new"));
    }

    #[test]
    fn merge_cookie_ignores_foreign_domain() {
        let mut state = SessionState::fresh(Engine::Bing);
        state.merge_cookie("tracker=1; Domain=.adnetwork.example; Path=/");
        assert!(state.is_empty());
    }

    #[test]
    fn merge_cookie_accepts_host_only() {
        let mut state = SessionState::fresh(Engine::DuckDuckGo);
        state.merge_cookie("kl=us-en");
        assert_eq!(state.cookies.len(), 1);
    }

    #[test]
    fn bootstrap_import_filters_domains() {
        let state = SessionState::from_cookies(
            Engine::Baidu,
            vec![
                "BDUSS=token; Domain=.baidu.com; Path=/".into(),
                "other=1; Domain=.unrelated.example".into(),
            ],
        );
        assert_eq!(state.cookies.len(), 1);
        assert!(state.cookies[0].starts_with("BDUSS="));
    }

    #[test]
    fn session_state_serde_round_trip() {
        let mut state = SessionState::fresh(Engine::Baidu);
        state.merge_cookie("BAIDUID=xyz; Domain=.baidu.com");
        let json = serde_json::to_string(&state).expect("serialize");
        let decoded: SessionState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, state);
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");
        assert!(store.load(Engine::Bing).await.is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        let mut state = SessionState::fresh(Engine::DuckDuckGo);
        state.merge_cookie("kl=us-en");
        store.save(&state).await.expect("save");

        let loaded = store.load(Engine::DuckDuckGo).await.expect("should exist");
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn save_overwrites_previous_state() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        let mut first = SessionState::fresh(Engine::Bing);
        first.merge_cookie("SRCHD=one; Domain=.bing.com");
        store.save(&first).await.expect("save first");

        let mut second = SessionState::fresh(Engine::Bing);
        second.merge_cookie("SRCHD=two; Domain=.bing.com");
        store.save(&second).await.expect("save second");

        let loaded = store.load(Engine::Bing).await.expect("should exist");
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn corrupt_file_treated_as_absent_and_removed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        let path = dir.path().join("bing_state.json");
        std::fs::write(&path, "this is not valid json {{{").expect("write corrupt");

        assert!(store.load(Engine::Bing).await.is_none());
        assert!(!path.exists(), "corrupt file should be invalidated");
    }

    #[tokio::test]
    async fn engine_mismatch_treated_as_corrupt() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        // A Baidu record written under Bing's key.
        let state = SessionState::fresh(Engine::Baidu);
        let path = dir.path().join("bing_state.json");
        std::fs::write(&path, serde_json::to_vec(&state).expect("serialize")).expect("write");

        assert!(store.load(Engine::Bing).await.is_none());
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        let state = SessionState::fresh(Engine::Baidu);
        store.save(&state).await.expect("save");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn invalidate_removes_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        let state = SessionState::fresh(Engine::Bing);
        store.save(&state).await.expect("save");
        store.invalidate(Engine::Bing).await;
        assert!(store.load(Engine::Bing).await.is_none());
    }

    #[tokio::test]
    async fn engines_stored_independently() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStateStore::open(dir.path()).expect("open store");

        let mut bing = SessionState::fresh(Engine::Bing);
        bing.merge_cookie("SRCHD=b; Domain=.bing.com");
        let mut baidu = SessionState::fresh(Engine::Baidu);
        baidu.merge_cookie("BAIDUID=x; Domain=.baidu.com");

        store.save(&bing).await.expect("save bing");
        store.save(&baidu).await.expect("save baidu");

        assert_eq!(store.load(Engine::Bing).await.expect("bing"), bing);
        assert_eq!(store.load(Engine::Baidu).await.expect("baidu"), baidu);
        assert!(store.load(Engine::DuckDuckGo).await.is_none());
    }
}
