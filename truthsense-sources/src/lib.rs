//! Live external-source retrieval and aggregation.
//!
//! Every claim analysis starts here: the user's question is reduced to
//! keywords, both upstream APIs (news articles and web search) are queried
//! concurrently, and the rows are ranked by source credibility and folded
//! into a markdown digest the model prompts embed verbatim.
//!
//! Degradation is deliberate: one upstream failing leaves the other's rows
//! in place, both failing produces an explicit error digest rather than an
//! `Err`, so analysis always proceeds with whatever data exists.

pub mod context;
pub mod credibility;
pub mod keywords;
pub mod news;
pub mod search;

pub use context::{NewsContext, SourceAggregator, API_ERROR_CONTEXT, NO_LIVE_DATA_CONTEXT};
pub use credibility::{source_credibility_score, top_credible_sources};
pub use keywords::{create_search_query, extract_keywords};
pub use news::{NewsArticle, NewsClient};
pub use search::{SearchClient, SearchResult};
