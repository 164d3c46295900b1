//! Baidu adapter — largest Chinese-language index.
//!
//! Baidu serves result links through its own `/link?url=…` indirection;
//! those URLs are kept verbatim (they are well-formed and absolute) since
//! resolving each would cost a network round-trip. Verification
//! interstitials ("百度安全验证") are frequent for unrecognised clients,
//! which is exactly what the persisted session state is for.

use scraper::{Html, Selector};

use crate::config::SearchConfig;
use crate::engine::{EngineSession, SearchEngineTrait};
use crate::engines::fetch_listing;
use crate::error::SearchError;
use crate::types::{Engine, SearchResult};

/// Baidu HTML search scraper.
pub struct BaiduEngine;

impl SearchEngineTrait for BaiduEngine {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        session: &mut EngineSession,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Baidu search");

        let request = session
            .client()
            .get("https://www.baidu.com/s")
            .query(&[("wd", query), ("rn", "20")])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.5");

        let html = fetch_listing(session, request, config).await?;
        parse_baidu_html(&html, limit)
    }

    fn engine(&self) -> Engine {
        Engine::Baidu
    }
}

/// Parse a Baidu HTML response into ranked results.
///
/// Organic results live under `div#content_left` in `.c-container`
/// blocks; the abstract sits in `.c-abstract` (older markup) or a
/// `content-right` span (newer markup).
pub(crate) fn parse_baidu_html(html: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse("div#content_left .c-container, div#content_left .result")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h3 a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".c-abstract, span[class*=\"content-right\"]")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = normalise_title(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let url = match title_el.value().attr("href") {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => continue,
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
            engine: Engine::Baidu,
            rank: results.len() + 1,
        });

        if results.len() >= limit {
            break;
        }
    }

    tracing::debug!(count = results.len(), "Baidu results parsed");
    Ok(results)
}

/// Collapse internal whitespace — Baidu titles interleave highlight tags
/// that leave stray line breaks in the text nodes.
fn normalise_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
