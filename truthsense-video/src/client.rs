//! Video platform metadata client and the per-video insight pipeline.

use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use truthsense_http::{Auth, HttpClient, HttpError, RequestOpts};

use crate::duration::is_short_form;
use crate::sentiment::{self, Sentiment, SentimentSummary};
use crate::url::{extract_video_id, is_shorts_url};

const REGULAR_MAX_COMMENTS: usize = 100;
const SHORT_MAX_COMMENTS: usize = 50;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("invalid video URL: {0}")]
    InvalidUrl(String),
    #[error("video not found or is private/unavailable: {0}")]
    NotFound(String),
    #[error("video API quota exceeded or invalid API key")]
    QuotaOrKey,
    #[error("invalid video ID or request parameters")]
    BadRequest,
    #[error("video API request failed: {0}")]
    Upstream(String),
}

impl From<HttpError> for VideoError {
    fn from(err: HttpError) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(403) => Self::QuotaOrKey,
            Some(400) => Self::BadRequest,
            _ => Self::Upstream(err.to_string()),
        }
    }
}

/// Normalised video metadata.
#[derive(Debug, Clone)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// Raw ISO 8601 duration, e.g. `PT3M12S`.
    pub duration: String,
    pub thumbnail_url: String,
    pub is_short: bool,
}

/// One top-level comment with its sentiment label.
#[derive(Debug, Clone)]
pub struct VideoComment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub published_at: String,
    pub like_count: u64,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
}

/// Everything downstream analysis needs about one video.
#[derive(Debug, Clone)]
pub struct VideoInsights {
    pub video: VideoDetails,
    pub transcript: String,
    pub comments: Vec<VideoComment>,
    pub sentiment: SentimentSummary,
}

// ---- wire shapes ----

#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideo {
    snippet: RawSnippet,
    #[serde(default)]
    statistics: RawStatistics,
    content_details: RawContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: RawThumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct RawThumbnails {
    high: Option<RawThumbnail>,
    medium: Option<RawThumbnail>,
    default: Option<RawThumbnail>,
}

#[derive(Debug, Deserialize)]
struct RawThumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Deserialize)]
struct RawCommentThread {
    #[serde(default)]
    id: String,
    snippet: RawThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThreadSnippet {
    top_level_comment: RawTopLevelComment,
}

#[derive(Debug, Deserialize)]
struct RawTopLevelComment {
    snippet: RawCommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommentSnippet {
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    like_count: u64,
}

#[derive(Debug, Deserialize)]
struct RawCaption {
    #[allow(dead_code)]
    #[serde(default)]
    id: String,
}

fn count(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Client for the video-platform data API.
pub struct VideoClient {
    http: HttpClient,
    api_key: String,
}

impl VideoClient {
    pub fn new(endpoint: &str, api_key: String) -> Result<Self, VideoError> {
        let http = HttpClient::new(endpoint)
            .map_err(|e| VideoError::Upstream(e.to_string()))?
            .with_timeout(Duration::from_secs(10));
        Ok(Self { http, api_key })
    }

    fn auth(&self) -> Auth<'_> {
        Auth::Query {
            name: "key",
            value: Cow::Borrowed(&self.api_key),
        }
    }

    /// Fetch metadata for one video. Shortness is decided by duration,
    /// not by the URL form it arrived in.
    pub async fn fetch_details(&self, video_id: &str) -> Result<VideoDetails, VideoError> {
        let opts = RequestOpts {
            auth: Some(self.auth()),
            query: Some(vec![
                ("part", Cow::Borrowed("snippet,statistics,contentDetails")),
                ("id", Cow::Borrowed(video_id)),
            ]),
            ..Default::default()
        };
        let envelope: ItemsEnvelope<RawVideo> = self.http.get_json("videos", opts).await?;
        let raw = envelope
            .items
            .into_iter()
            .next()
            .ok_or_else(|| VideoError::NotFound(video_id.to_string()))?;

        let thumbnail_url = raw
            .snippet
            .thumbnails
            .high
            .or(raw.snippet.thumbnails.medium)
            .or(raw.snippet.thumbnails.default)
            .map(|t| t.url)
            .unwrap_or_default();

        Ok(VideoDetails {
            id: video_id.to_string(),
            title: raw.snippet.title,
            description: raw.snippet.description,
            channel_title: raw.snippet.channel_title,
            published_at: raw.snippet.published_at,
            view_count: count(raw.statistics.view_count),
            like_count: count(raw.statistics.like_count),
            comment_count: count(raw.statistics.comment_count),
            is_short: is_short_form(&raw.content_details.duration),
            duration: raw.content_details.duration,
            thumbnail_url,
        })
    }

    /// Fetch top-level comments ordered by relevance, labelled with
    /// sentiment. Disabled comments (403) and missing threads (404)
    /// degrade to an empty section.
    pub async fn fetch_comments(
        &self,
        video_id: &str,
        max_results: usize,
    ) -> Result<Vec<VideoComment>, VideoError> {
        let max = max_results.to_string();
        let opts = RequestOpts {
            auth: Some(self.auth()),
            query: Some(vec![
                ("part", Cow::Borrowed("snippet")),
                ("videoId", Cow::Borrowed(video_id)),
                ("maxResults", Cow::Owned(max)),
                ("order", Cow::Borrowed("relevance")),
            ]),
            ..Default::default()
        };

        let envelope: ItemsEnvelope<RawCommentThread> =
            match self.http.get_json("commentThreads", opts).await {
                Ok(env) => env,
                Err(e) if matches!(e.status().map(|s| s.as_u16()), Some(403) | Some(404)) => {
                    tracing::warn!(
                        target: "sources",
                        video_id,
                        status = ?e.status(),
                        "video.comments.unavailable"
                    );
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e.into()),
            };

        Ok(envelope
            .items
            .into_iter()
            .map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                let (sentiment, sentiment_score) = sentiment::analyze_text(&snippet.text_display);
                VideoComment {
                    id: thread.id,
                    text: snippet.text_display,
                    author: snippet.author_display_name,
                    published_at: snippet.published_at,
                    like_count: snippet.like_count,
                    sentiment,
                    sentiment_score,
                }
            })
            .collect())
    }

    /// Caption download is not wired up; we only probe for caption tracks
    /// and return a placeholder the prompts can reason about.
    pub async fn fetch_transcript(&self, video_id: &str, is_short: bool) -> String {
        let opts = RequestOpts {
            auth: Some(self.auth()),
            query: Some(vec![
                ("part", Cow::Borrowed("snippet")),
                ("videoId", Cow::Borrowed(video_id)),
            ]),
            ..Default::default()
        };

        match self
            .http
            .get_json::<ItemsEnvelope<RawCaption>>("captions", opts)
            .await
        {
            Ok(env) if !env.items.is_empty() => {
                if is_short {
                    "Short-form content transcript extraction would be implemented here. Shorts typically contain concise, engaging content optimized for mobile viewing.".to_string()
                } else {
                    "Transcript extraction would be implemented here using yt-dlp or YouTube's caption API.".to_string()
                }
            }
            Ok(_) => {
                if is_short {
                    "No transcript available for this Short. Short-form content analysis will focus on visual elements and metadata.".to_string()
                } else {
                    "No transcript available for this video.".to_string()
                }
            }
            Err(e) => {
                tracing::warn!(target: "sources", video_id, error = %e, "video.transcript.failed");
                if is_short {
                    "Short transcript extraction failed or not available.".to_string()
                } else {
                    "Transcript extraction failed or not available.".to_string()
                }
            }
        }
    }

    /// Full per-video pipeline: metadata, comments, transcript probe,
    /// and comment sentiment.
    pub async fn analyze_url(&self, url: &str) -> Result<VideoInsights, VideoError> {
        let video_id =
            extract_video_id(url).ok_or_else(|| VideoError::InvalidUrl(url.to_string()))?;
        tracing::info!(
            target: "sources",
            video_id = %video_id,
            shorts_url = is_shorts_url(url),
            "video.analyze.start"
        );

        let video = self.fetch_details(&video_id).await?;

        let max_comments = if video.is_short {
            SHORT_MAX_COMMENTS
        } else {
            REGULAR_MAX_COMMENTS
        };
        let comments = self
            .fetch_comments(&video_id, max_comments)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "sources", error = %e, "video.comments.degraded");
                Vec::new()
            });

        let transcript = self.fetch_transcript(&video_id, video.is_short).await;

        let texts: Vec<String> = comments.iter().map(|c| c.text.clone()).collect();
        let sentiment = sentiment::summarize(&texts);

        tracing::info!(
            target: "sources",
            comments = comments.len(),
            is_short = video.is_short,
            "video.analyze.done"
        );

        Ok(VideoInsights {
            video,
            transcript,
            comments,
            sentiment,
        })
    }
}
