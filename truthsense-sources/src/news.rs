//! Live news retrieval (MediaStack-style API).

use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use truthsense_http::{Auth, HttpClient, HttpError, RequestOpts};

use crate::keywords::create_search_query;

/// One news article as returned by the upstream API.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    #[serde(default)]
    data: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

/// Client for the news-article search API.
pub struct NewsClient {
    http: HttpClient,
    api_key: String,
}

impl NewsClient {
    pub fn new(endpoint: &str, api_key: String) -> Result<Self, HttpError> {
        let http = HttpClient::new(endpoint)?.with_timeout(Duration::from_secs(10));
        Ok(Self { http, api_key })
    }

    /// Fetch recent English-language articles matching the query's keywords.
    ///
    /// Rows missing a title, URL, or source are dropped. A missing
    /// description falls back to the title.
    pub async fn fetch_articles(&self, query: &str) -> Result<Vec<NewsArticle>, HttpError> {
        let search_query = create_search_query(query);
        tracing::debug!(target: "sources", query = %search_query, "news.fetch.start");

        let opts = RequestOpts {
            auth: Some(Auth::Query {
                name: "access_key",
                value: Cow::Borrowed(&self.api_key),
            }),
            query: Some(vec![
                ("keywords", Cow::Owned(search_query)),
                ("limit", Cow::Borrowed("10")),
                ("sort", Cow::Borrowed("published_desc")),
                ("languages", Cow::Borrowed("en")),
                ("countries", Cow::Borrowed("us,gb,ca,au")),
            ]),
            ..Default::default()
        };

        let envelope: NewsEnvelope = self.http.get_json("v1/news", opts).await?;

        let articles: Vec<NewsArticle> = envelope
            .data
            .into_iter()
            .filter_map(|raw| {
                let title = raw.title.filter(|t| !t.is_empty())?;
                let url = raw.url.filter(|u| !u.is_empty())?;
                let source = raw.source.filter(|s| !s.is_empty())?;
                Some(NewsArticle {
                    description: raw
                        .description
                        .filter(|d| !d.is_empty())
                        .unwrap_or_else(|| title.clone()),
                    title,
                    url,
                    source,
                    published_at: raw.published_at.unwrap_or_default(),
                    category: raw.category,
                    image: raw.image,
                })
            })
            .collect();

        tracing::debug!(target: "sources", count = articles.len(), "news.fetch.done");
        Ok(articles)
    }
}
