//! DuckDuckGo adapter — most scraper-friendly of the three engines.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.

use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::engine::{EngineSession, SearchEngineTrait};
use crate::engines::fetch_listing;
use crate::error::SearchError;
use crate::types::{Engine, SearchResult};

/// DuckDuckGo HTML search scraper.
pub struct DuckDuckGoEngine;

impl DuckDuckGoEngine {
    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
    /// the `uddg` query parameter holds the destination.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

impl SearchEngineTrait for DuckDuckGoEngine {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        session: &mut EngineSession,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let request = session
            .client()
            .post("https://html.duckduckgo.com/html/")
            .form(&[("q", query), ("ia", "web")])
            .header("Accept-Language", "en-US,en;q=0.9");

        let html = fetch_listing(session, request, config).await?;
        parse_duckduckgo_html(&html, limit)
    }

    fn engine(&self) -> Engine {
        Engine::DuckDuckGo
    }
}

/// Parse a DuckDuckGo HTML response into ranked results.
///
/// Separate function so the parser can be tested against captured HTML.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    limit: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
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

        let Some(href) = title_el.value().attr("href") else {
            continue;
        };
        let Some(url) = DuckDuckGoEngine::extract_url(href) else {
            continue;
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
            engine: Engine::DuckDuckGo,
            rank: results.len() + 1,
        });

        if results.len() >= limit {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
