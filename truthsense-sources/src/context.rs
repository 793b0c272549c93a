//! Aggregation of live news and search results into a verification digest.

use chrono::DateTime;
use tokio::join;
use truthsense_http::HttpError;

use crate::credibility::top_credible_sources;
use crate::news::{NewsArticle, NewsClient};
use crate::search::{SearchClient, SearchResult};

const MAX_CONTEXT_ITEMS: usize = 5;

pub const NO_LIVE_DATA_CONTEXT: &str = "## NO LIVE DATA AVAILABLE\n\nBoth MediaStack and SerpAPI returned no results for this query. Analysis will be based on general knowledge only.\n\n";
pub const API_ERROR_CONTEXT: &str = "## API ERROR\n\nUnable to retrieve live news data from MediaStack and SerpAPI. Analysis cannot be performed without real-time sources.\n\n";

/// Everything the prompt builder needs from the live-data fetch.
#[derive(Debug, Clone, Default)]
pub struct NewsContext {
    pub articles: Vec<NewsArticle>,
    pub search_results: Vec<SearchResult>,
    /// Top-ranked URLs, credibility tier first, max five.
    pub credible_sources: Vec<String>,
    /// Markdown digest injected into model prompts.
    pub formatted_context: String,
}

impl NewsContext {
    /// True when neither upstream produced any rows.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.search_results.is_empty()
    }
}

/// Fetches both upstreams concurrently and merges their output.
pub struct SourceAggregator {
    news: NewsClient,
    search: SearchClient,
}

impl SourceAggregator {
    pub fn new(news: NewsClient, search: SearchClient) -> Self {
        Self { news, search }
    }

    /// Fetch live verification data for a query.
    ///
    /// The two upstreams are queried concurrently. One failing side
    /// degrades to an empty list; both failing yields the API-error
    /// digest so the model knows no live data was available.
    pub async fn fetch_context(&self, query: &str) -> NewsContext {
        tracing::info!(target: "sources", query = %query, "sources.fetch.start");

        let (articles, results) = join!(
            self.news.fetch_articles(query),
            self.search.fetch_results(query)
        );

        if let (Err(news_err), Err(search_err)) = (&articles, &results) {
            tracing::warn!(
                target: "sources",
                news_error = %news_err,
                search_error = %search_err,
                "sources.fetch.all_failed"
            );
            return NewsContext {
                formatted_context: API_ERROR_CONTEXT.to_string(),
                ..Default::default()
            };
        }

        let articles = unwrap_or_empty(articles, "news");
        let search_results = unwrap_or_empty(results, "search");

        let credible_sources = top_credible_sources(&articles, &search_results);
        let formatted_context = format_context(&articles, &search_results);

        tracing::info!(
            target: "sources",
            articles = articles.len(),
            search_results = search_results.len(),
            credible_sources = credible_sources.len(),
            "sources.fetch.done"
        );

        NewsContext {
            articles,
            search_results,
            credible_sources,
            formatted_context,
        }
    }
}

fn unwrap_or_empty<T>(result: Result<Vec<T>, HttpError>, side: &str) -> Vec<T> {
    match result {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(target: "sources", side, error = %e, "sources.fetch.degraded");
            Vec::new()
        }
    }
}

fn display_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Render the markdown digest the prompts embed verbatim.
pub fn format_context(articles: &[NewsArticle], results: &[SearchResult]) -> String {
    let mut context = String::new();

    if !articles.is_empty() {
        context.push_str("## LIVE NEWS ARTICLES (MediaStack API):\n\n");
        for (i, article) in articles.iter().take(MAX_CONTEXT_ITEMS).enumerate() {
            context.push_str(&format!("**{}. {}**\n", i + 1, article.title));
            context.push_str(&format!("- Source: {}\n", article.source));
            context.push_str(&format!("- Published: {}\n", display_date(&article.published_at)));
            context.push_str(&format!("- Description: {}\n", article.description));
            context.push_str(&format!("- URL: {}\n\n", article.url));
        }
    }

    if !results.is_empty() {
        context.push_str("## LIVE SEARCH RESULTS (SerpAPI):\n\n");
        for (i, result) in results.iter().take(MAX_CONTEXT_ITEMS).enumerate() {
            context.push_str(&format!("**{}. {}**\n", i + 1, result.title));
            context.push_str(&format!("- Source: {}\n", result.source));
            if let Some(date) = &result.date {
                context.push_str(&format!("- Date: {}\n", display_date(date)));
            }
            context.push_str(&format!("- Summary: {}\n", result.snippet));
            context.push_str(&format!("- URL: {}\n\n", result.link));
        }
    }

    if articles.is_empty() && results.is_empty() {
        context = NO_LIVE_DATA_CONTEXT.to_string();
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(n: usize) -> NewsArticle {
        NewsArticle {
            title: format!("Article {n}"),
            description: "desc".into(),
            url: format!("https://bbc.com/{n}"),
            source: "bbc.com".into(),
            published_at: "2024-03-01T12:00:00Z".into(),
            category: None,
            image: None,
        }
    }

    #[test]
    fn empty_inputs_yield_no_live_data_marker() {
        let ctx = format_context(&[], &[]);
        assert!(ctx.starts_with("## NO LIVE DATA AVAILABLE"));
    }

    #[test]
    fn digest_lists_at_most_five_articles() {
        let articles: Vec<NewsArticle> = (0..7).map(article).collect();
        let ctx = format_context(&articles, &[]);
        assert!(ctx.contains("**5. Article 4**"));
        assert!(!ctx.contains("Article 5"));
        assert!(ctx.contains("- Published: 2024-03-01"));
    }

    #[test]
    fn search_results_carry_optional_date_line() {
        let with_date = SearchResult {
            title: "T".into(),
            link: "https://reuters.com/x".into(),
            snippet: "S".into(),
            source: "reuters.com".into(),
            position: 1,
            date: Some("2024-05-01T00:00:00Z".into()),
        };
        let without_date = SearchResult {
            date: None,
            ..with_date.clone()
        };

        let ctx = format_context(&[], &[with_date]);
        assert!(ctx.contains("## LIVE SEARCH RESULTS (SerpAPI):"));
        assert!(ctx.contains("- Date: 2024-05-01"));

        let ctx = format_context(&[], &[without_date]);
        assert!(!ctx.contains("- Date:"));
    }
}
