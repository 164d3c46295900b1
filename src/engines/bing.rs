//! Bing adapter — stable listing markup, Microsoft's index.

use scraper::{Html, Selector};

use crate::config::SearchConfig;
use crate::engine::{EngineSession, SearchEngineTrait};
use crate::engines::fetch_listing;
use crate::error::SearchError;
use crate::types::{Engine, SearchResult};

/// Bing HTML search scraper.
pub struct BingEngine;

impl SearchEngineTrait for BingEngine {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        session: &mut EngineSession,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Bing search");

        let request = session
            .client()
            .get("https://www.bing.com/search")
            .query(&[("q", query), ("setlang", "en")])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9");

        let html = fetch_listing(session, request, config).await?;
        parse_bing_html(&html, limit)
    }

    fn engine(&self) -> Engine {
        Engine::Bing
    }
}

/// Parse a Bing HTML response into ranked results.
///
/// Bing uses `li.b_algo` containers for organic results; the title link
/// lives under the `h2` element.
pub(crate) fn parse_bing_html(html: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse("li.b_algo")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h2")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let link_sel = Selector::parse("a")
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".b_caption p, .b_lineclamp2")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let url = title_el
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        let url = match url {
            Some(u) if !u.is_empty() => u,
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
            engine: Engine::Bing,
            rank: results.len() + 1,
        });

        if results.len() >= limit {
            break;
        }
    }

    tracing::debug!(count = results.len(), "Bing results parsed");
    Ok(results)
}
