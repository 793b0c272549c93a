//! Live web-search retrieval (SerpAPI-style Google results).

use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use truthsense_http::{Auth, HttpClient, HttpError, RequestOpts};
use url::Url;

use crate::keywords::create_search_query;

/// One organic search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Domain of the link, without a leading `www.`.
    pub source: String,
    /// 1-based rank within the result page.
    pub position: usize,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    organic_results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

fn extract_domain(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Client for the web-search API.
pub struct SearchClient {
    http: HttpClient,
    api_key: String,
}

impl SearchClient {
    pub fn new(endpoint: &str, api_key: String) -> Result<Self, HttpError> {
        let http = HttpClient::new(endpoint)?.with_timeout(Duration::from_secs(10));
        Ok(Self { http, api_key })
    }

    /// Run a Google search for the query's keywords and keep organic
    /// results that carry a title, link, and snippet.
    pub async fn fetch_results(&self, query: &str) -> Result<Vec<SearchResult>, HttpError> {
        let search_query = create_search_query(query);
        tracing::debug!(target: "sources", query = %search_query, "search.fetch.start");

        let opts = RequestOpts {
            auth: Some(Auth::Query {
                name: "api_key",
                value: Cow::Borrowed(&self.api_key),
            }),
            query: Some(vec![
                ("engine", Cow::Borrowed("google")),
                ("q", Cow::Owned(search_query)),
                ("num", Cow::Borrowed("10")),
                ("gl", Cow::Borrowed("us")),
                ("hl", Cow::Borrowed("en")),
            ]),
            ..Default::default()
        };

        let envelope: SearchEnvelope = self.http.get_json("search", opts).await?;

        let results: Vec<SearchResult> = envelope
            .organic_results
            .into_iter()
            .filter_map(|raw| {
                let title = raw.title.filter(|t| !t.is_empty())?;
                let link = raw.link.filter(|l| !l.is_empty())?;
                let snippet = raw.snippet.filter(|s| !s.is_empty())?;
                Some((title, link, snippet, raw.date))
            })
            .enumerate()
            .map(|(idx, (title, link, snippet, date))| SearchResult {
                source: extract_domain(&link),
                title,
                link,
                snippet,
                position: idx + 1,
                date,
            })
            .collect();

        tracing::debug!(target: "sources", count = results.len(), "search.fetch.done");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_extraction_strips_www() {
        assert_eq!(extract_domain("https://www.reuters.com/article/x"), "reuters.com");
        assert_eq!(extract_domain("https://edition.cnn.com/2024/x"), "edition.cnn.com");
        assert_eq!(extract_domain("not a url"), "Unknown");
    }
}
