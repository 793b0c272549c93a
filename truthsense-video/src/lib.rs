//! Video-platform integration: URL handling, metadata, comments, and
//! comment sentiment.
//!
//! The pipeline in [`client::VideoClient::analyze_url`] turns a pasted
//! video URL into [`client::VideoInsights`]: normalised metadata, a
//! sentiment-labelled comment section, and a transcript placeholder.
//! Comment and transcript failures degrade instead of aborting; only a
//! missing or unfetchable video is fatal.

pub mod client;
pub mod duration;
pub mod sentiment;
pub mod url;

pub use client::{VideoClient, VideoComment, VideoDetails, VideoError, VideoInsights};
pub use duration::{is_short_form, parse_iso8601_secs};
pub use sentiment::{Sentiment, SentimentDistribution, SentimentSummary};
pub use url::{contains_youtube_url, extract_video_id, is_shorts_url};
