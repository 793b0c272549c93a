//! Domain-tier credibility ranking for retrieved sources.

use chrono::DateTime;

use crate::news::NewsArticle;
use crate::search::SearchResult;

/// Fact-checkers and wire agencies.
const TIER_5: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bbc.com",
    "factcheck.org",
    "snopes.com",
    "politifact.com",
    "who.int",
    "cdc.gov",
];

/// Major newspapers and established media.
const TIER_4: &[&str] = &[
    "nytimes.com",
    "washingtonpost.com",
    "wsj.com",
    "theguardian.com",
    "npr.org",
    "pbs.org",
];

/// Cable news and major outlets.
const TIER_3: &[&str] = &[
    "cnn.com",
    "abcnews.go.com",
    "cbsnews.com",
    "nbcnews.com",
    "bloomberg.com",
];

/// Other recognised news sources.
const TIER_2: &[&str] = &["newsweek.com", "forbes.com", "huffpost.com", "axios.com"];

const TOP_SOURCES: usize = 5;

/// Score a source identifier 1..=5 by substring match against the tier
/// tables. Unknown sources land in the bottom tier, not zero.
pub fn source_credibility_score(source: &str) -> u8 {
    let key = source.to_lowercase();
    if TIER_5.iter().any(|s| key.contains(s)) {
        5
    } else if TIER_4.iter().any(|s| key.contains(s)) {
        4
    } else if TIER_3.iter().any(|s| key.contains(s)) {
        3
    } else if TIER_2.iter().any(|s| key.contains(s)) {
        2
    } else {
        1
    }
}

fn date_millis(date: &str) -> i64 {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.timestamp_millis())
        .unwrap_or(0)
}

/// Rank every retrieved URL by credibility tier, then recency, dedupe by
/// URL keeping the first occurrence, and return the top five URLs.
pub fn top_credible_sources(articles: &[NewsArticle], results: &[SearchResult]) -> Vec<String> {
    let mut ranked: Vec<(String, u8, i64)> = Vec::with_capacity(articles.len() + results.len());

    for article in articles {
        if !article.url.is_empty() && !article.title.is_empty() {
            ranked.push((
                article.url.clone(),
                source_credibility_score(&article.source),
                date_millis(&article.published_at),
            ));
        }
    }
    for result in results {
        if !result.link.is_empty() && !result.title.is_empty() {
            ranked.push((
                result.link.clone(),
                source_credibility_score(&result.source),
                result.date.as_deref().map(date_millis).unwrap_or(0),
            ));
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

    let mut seen = Vec::new();
    let mut top = Vec::new();
    for (url, _, _) in ranked {
        if seen.contains(&url) {
            continue;
        }
        seen.push(url.clone());
        top.push(url);
        if top.len() == TOP_SOURCES {
            break;
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(source: &str, url: &str, published: &str) -> NewsArticle {
        NewsArticle {
            title: "t".into(),
            description: "d".into(),
            url: url.into(),
            source: source.into(),
            published_at: published.into(),
            category: None,
            image: None,
        }
    }

    fn result(source: &str, link: &str) -> SearchResult {
        SearchResult {
            title: "t".into(),
            link: link.into(),
            snippet: "s".into(),
            source: source.into(),
            position: 1,
            date: None,
        }
    }

    #[test]
    fn tiers_match_by_substring() {
        assert_eq!(source_credibility_score("www.reuters.com"), 5);
        assert_eq!(source_credibility_score("NYTimes.com"), 4);
        assert_eq!(source_credibility_score("edition.cnn.com"), 3);
        assert_eq!(source_credibility_score("forbes.com"), 2);
        assert_eq!(source_credibility_score("random-blog.net"), 1);
    }

    #[test]
    fn ranking_prefers_tier_then_recency() {
        let articles = vec![
            article("random-blog.net", "https://random-blog.net/a", "2024-01-01T00:00:00Z"),
            article("reuters.com", "https://reuters.com/old", "2023-01-01T00:00:00Z"),
            article("reuters.com", "https://reuters.com/new", "2024-06-01T00:00:00Z"),
        ];
        let top = top_credible_sources(&articles, &[]);
        assert_eq!(
            top,
            vec![
                "https://reuters.com/new",
                "https://reuters.com/old",
                "https://random-blog.net/a"
            ]
        );
    }

    #[test]
    fn duplicate_urls_keep_first_occurrence() {
        let articles = vec![article("bbc.com", "https://bbc.com/x", "2024-01-01T00:00:00Z")];
        let results = vec![result("bbc.com", "https://bbc.com/x")];
        let top = top_credible_sources(&articles, &results);
        assert_eq!(top, vec!["https://bbc.com/x"]);
    }

    #[test]
    fn caps_at_five_urls() {
        let articles: Vec<NewsArticle> = (0..8)
            .map(|i| {
                article(
                    "bbc.com",
                    &format!("https://bbc.com/{i}"),
                    "2024-01-01T00:00:00Z",
                )
            })
            .collect();
        assert_eq!(top_credible_sources(&articles, &[]).len(), 5);
    }
}
