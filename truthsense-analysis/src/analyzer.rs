//! The analysis facade: live-data fetch, prompt assembly, model call,
//! and response parsing for claims and videos.
//!
//! Failures never escape as errors. A failed generation produces a
//! canned unverifiable result so the conversation can record the
//! attempt and the caller can render something.

use chrono::Utc;
use std::sync::Arc;
use truthsense_common::Verdict;
use truthsense_llm::{GenerateRequest, GenerationConfig, LlmClient, Part};
use truthsense_sources::{NewsContext, SourceAggregator};
use truthsense_video::VideoInsights;
use truthsense_actors::ChatContextData;

use crate::content::{fallback_content_analysis, parse_content_analysis};
use crate::model::{AnalysisResult, ContentAnalysisResult, ExplanationOrigin, VideoSummary};
use crate::parser::parse_model_response;
use crate::prompts::{
    build_claim_prompt, build_classification_prompt, build_title_prompt, build_video_prompt,
    is_news_content, snippet,
};

const FALLBACK_CHAT_TITLE: &str = "Intelligence Analysis";
const TITLE_MAX_WORDS: usize = 6;
const TRANSCRIPT_HIGHLIGHT_CHARS: usize = 300;

/// An image attached to a claim, forwarded to the model inline.
#[derive(Debug, Clone)]
pub struct AttachedImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Claim and video analysis against one model client.
pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
    sources: SourceAggregator,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>, sources: SourceAggregator) -> Self {
        Self { llm, sources }
    }

    /// Analyze a text claim, with optional attached images.
    ///
    /// Live verification data is fetched first and embedded in the
    /// prompt; the model response is parsed into a structured result.
    pub async fn analyze_claim(
        &self,
        query: &str,
        chat_context: Option<&ChatContextData>,
        images: &[AttachedImage],
    ) -> AnalysisResult {
        tracing::info!(
            target: "analysis",
            query = %query,
            images = images.len(),
            "analysis.claim.start"
        );

        let news = self.sources.fetch_context(query).await;

        let image_names: Vec<String> = images.iter().map(|i| i.name.clone()).collect();
        let prompt = build_claim_prompt(query, &news, chat_context, &image_names);

        let mut parts = vec![Part::text(prompt)];
        for image in images {
            parts.push(Part::image_from_bytes(&*image.mime_type, &image.bytes));
        }

        let request = GenerateRequest {
            system_instruction: None,
            parts,
            config: GenerationConfig::claim_analysis(),
        };

        match self.llm.generate(request).await {
            Ok(response) => {
                let result = parse_model_response(&response.text, &news);
                tracing::info!(
                    target: "analysis",
                    verdict = %result.verdict,
                    confidence = result.confidence,
                    "analysis.claim.done"
                );
                result
            }
            Err(e) => {
                tracing::error!(target: "analysis", error = %e, "analysis.claim.failed");
                claim_failure_result()
            }
        }
    }

    /// Classify a video's content, then produce a full video
    /// intelligence report against live verification data.
    pub async fn analyze_video(
        &self,
        query: &str,
        insights: &VideoInsights,
        chat_context: Option<&ChatContextData>,
    ) -> AnalysisResult {
        tracing::info!(
            target: "analysis",
            video_id = %insights.video.id,
            query = %query,
            "analysis.video.start"
        );

        let content = self.classify_content(insights, chat_context).await;

        let search_query = format!("{} {}", insights.video.title, query);
        let news = self.sources.fetch_context(&search_query).await;

        let prompt = build_video_prompt(query, insights, &content, &news, chat_context);
        let request = GenerateRequest::text_only(prompt, GenerationConfig::claim_analysis());

        match self.llm.generate(request).await {
            Ok(response) => {
                let mut result = parse_model_response(&response.text, &news);
                result.video_analysis = Some(video_summary(insights, false));
                result.content_analysis = Some(content);
                tracing::info!(
                    target: "analysis",
                    verdict = %result.verdict,
                    confidence = result.confidence,
                    content_type = content_label(&result),
                    "analysis.video.done"
                );
                result
            }
            Err(e) => {
                tracing::error!(target: "analysis", error = %e, "analysis.video.failed");
                video_failure_result(insights, content)
            }
        }
    }

    /// Run the classification pass. News-looking videos get a live
    /// verification block keyed on the video title; a failed generation
    /// degrades to the canned fallback classification.
    async fn classify_content(
        &self,
        insights: &VideoInsights,
        chat_context: Option<&ChatContextData>,
    ) -> ContentAnalysisResult {
        let news: Option<NewsContext> = if is_news_content(insights) {
            Some(self.sources.fetch_context(&insights.video.title).await)
        } else {
            None
        };

        let prompt = build_classification_prompt(insights, chat_context, news.as_ref());
        let request =
            GenerateRequest::text_only(prompt, GenerationConfig::content_classification());

        match self.llm.generate(request).await {
            Ok(response) => {
                let content = parse_content_analysis(&response.text, insights, Utc::now());
                tracing::info!(
                    target: "analysis",
                    content_type = content.content_type.label(),
                    "analysis.classify.done"
                );
                content
            }
            Err(e) => {
                tracing::warn!(target: "analysis", error = %e, "analysis.classify.failed");
                fallback_content_analysis()
            }
        }
    }

    /// Title a conversation from its first message: model output with
    /// quotes stripped, capped at six words.
    pub async fn generate_chat_title(&self, first_message: &str) -> String {
        let request = GenerateRequest::text_only(
            build_title_prompt(first_message),
            GenerationConfig::chat_title(),
        );

        match self.llm.generate(request).await {
            Ok(response) => {
                let cleaned: String = response
                    .text
                    .chars()
                    .filter(|c| *c != '"' && *c != '\'')
                    .collect();
                let title = cleaned
                    .split_whitespace()
                    .take(TITLE_MAX_WORDS)
                    .collect::<Vec<_>>()
                    .join(" ");
                if title.is_empty() {
                    FALLBACK_CHAT_TITLE.to_string()
                } else {
                    title
                }
            }
            Err(e) => {
                tracing::warn!(target: "analysis", error = %e, "analysis.title.failed");
                FALLBACK_CHAT_TITLE.to_string()
            }
        }
    }
}

fn content_label(result: &AnalysisResult) -> &'static str {
    result
        .content_analysis
        .as_ref()
        .map(|c| c.content_type.label())
        .unwrap_or("unknown")
}

fn video_summary(insights: &VideoInsights, failed: bool) -> VideoSummary {
    VideoSummary {
        title: insights.video.title.clone(),
        channel: insights.video.channel_title.clone(),
        sentiment_overall: format!(
            "{} ({:.2})",
            insights.sentiment.overall, insights.sentiment.score
        ),
        transcript_highlights: if failed {
            "Analysis failed".to_string()
        } else {
            snippet(&insights.transcript, TRANSCRIPT_HIGHLIGHT_CHARS)
        },
    }
}

fn claim_failure_result() -> AnalysisResult {
    let explanation = "Analysis failed due to technical error. Please try again.".to_string();
    AnalysisResult {
        verdict: Verdict::Unverifiable,
        confidence: 0,
        full_response: explanation.clone(),
        explanation,
        explanation_origin: ExplanationOrigin::Synthesized,
        sources: Vec::new(),
        context_used: "Error occurred during analysis".to_string(),
        video_analysis: None,
        content_analysis: None,
    }
}

fn video_failure_result(
    insights: &VideoInsights,
    content: ContentAnalysisResult,
) -> AnalysisResult {
    let explanation =
        "YouTube video analysis failed due to technical error. Please try again.".to_string();
    AnalysisResult {
        verdict: Verdict::Unverifiable,
        confidence: 0,
        full_response: explanation.clone(),
        explanation,
        explanation_origin: ExplanationOrigin::Synthesized,
        sources: Vec::new(),
        context_used: "Error occurred during YouTube analysis".to_string(),
        video_analysis: Some(video_summary(insights, true)),
        content_analysis: Some(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use truthsense_llm::{LlmError, LlmResponse};
    use truthsense_sources::{NewsClient, SearchClient};
    use truthsense_video::{SentimentSummary, VideoDetails};
    use wiremock::MockServer;

    struct ScriptedLlm {
        responses: Mutex<Vec<Result<String, LlmError>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, _request: GenerateRequest) -> Result<LlmResponse, LlmError> {
            let next = self.responses.lock().unwrap().remove(0);
            next.map(|text| LlmResponse {
                text,
                model: Some("scripted".to_string()),
                tokens_used: None,
            })
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    // Upstreams that answer nothing: both fetches 404 and the
    // aggregator degrades to its API-error digest.
    async fn offline_sources(server: &MockServer) -> SourceAggregator {
        let news = NewsClient::new(&server.uri(), "news-key".into()).unwrap();
        let search = SearchClient::new(&server.uri(), "search-key".into()).unwrap();
        SourceAggregator::new(news, search)
    }

    async fn analyzer_with(responses: Vec<Result<String, LlmError>>) -> (Analyzer, MockServer) {
        let server = MockServer::start().await;
        let sources = offline_sources(&server).await;
        let analyzer = Analyzer::new(Arc::new(ScriptedLlm::new(responses)), sources);
        (analyzer, server)
    }

    fn report_response() -> String {
        let filler = "Detailed point-wise findings. ".repeat(20);
        format!(
            "### 🔍 INTELLIGENCE REPORT\n\n**VERDICT: FALSE**\n**CONFIDENCE: 88%**\n\n{filler}\n### ✅ Final Assessment\nDone."
        )
    }

    fn classification_response() -> String {
        "**CONTENT TYPE: VLOG**\n\n**DETAILED CONTENT BREAKDOWN:**\nA personal travel diary entry.\n\n**SUMMARY:**\nCreator documents a city trip.\n".to_string()
    }

    fn insights() -> VideoInsights {
        VideoInsights {
            video: VideoDetails {
                id: "abc123def45".into(),
                title: "My trip to the mountains".into(),
                description: "Hiking and camping footage".into(),
                channel_title: "Trail Diaries".into(),
                published_at: "2024-06-01T00:00:00Z".into(),
                view_count: 12_000,
                like_count: 800,
                comment_count: 60,
                duration: "PT12M4S".into(),
                thumbnail_url: String::new(),
                is_short: false,
            },
            transcript: "No transcript available for this video.".into(),
            comments: Vec::new(),
            sentiment: SentimentSummary::default(),
        }
    }

    #[tokio::test]
    async fn claim_analysis_parses_model_verdict() {
        let (analyzer, _server) = analyzer_with(vec![Ok(report_response())]).await;
        let result = analyzer.analyze_claim("did the event happen", None, &[]).await;

        assert_eq!(result.verdict, Verdict::False);
        assert_eq!(result.confidence, 88);
        assert_eq!(result.explanation_origin, ExplanationOrigin::Extracted);
        assert!(result.video_analysis.is_none());
    }

    #[tokio::test]
    async fn failed_claim_generation_yields_canned_unverifiable() {
        let (analyzer, _server) =
            analyzer_with(vec![Err(LlmError::RateLimit)]).await;
        let result = analyzer.analyze_claim("did the event happen", None, &[]).await;

        assert_eq!(result.verdict, Verdict::Unverifiable);
        assert_eq!(result.confidence, 0);
        assert_eq!(
            result.explanation,
            "Analysis failed due to technical error. Please try again."
        );
        assert_eq!(result.context_used, "Error occurred during analysis");
    }

    #[tokio::test]
    async fn video_analysis_attaches_summary_and_classification() {
        let (analyzer, _server) =
            analyzer_with(vec![Ok(classification_response()), Ok(report_response())]).await;
        let result = analyzer
            .analyze_video("is this footage real", &insights(), None)
            .await;

        assert_eq!(result.verdict, Verdict::False);
        let video = result.video_analysis.expect("video summary attached");
        assert_eq!(video.title, "My trip to the mountains");
        assert_eq!(video.channel, "Trail Diaries");
        assert_eq!(video.sentiment_overall, "neutral (0.00)");
        assert!(video.transcript_highlights.starts_with("No transcript available"));

        let content = result.content_analysis.expect("classification attached");
        assert_eq!(content.content_type.label(), "Vlog");
    }

    #[tokio::test]
    async fn failed_video_generation_keeps_classification_and_cans_the_rest() {
        let (analyzer, _server) = analyzer_with(vec![
            Ok(classification_response()),
            Err(LlmError::Network("connection reset".into())),
        ])
        .await;
        let result = analyzer
            .analyze_video("is this footage real", &insights(), None)
            .await;

        assert_eq!(result.verdict, Verdict::Unverifiable);
        assert_eq!(result.context_used, "Error occurred during YouTube analysis");
        let video = result.video_analysis.expect("video summary attached");
        assert_eq!(video.transcript_highlights, "Analysis failed");
        assert!(result.content_analysis.is_some());
    }

    #[tokio::test]
    async fn failed_classification_degrades_to_fallback_content() {
        let (analyzer, _server) = analyzer_with(vec![
            Err(LlmError::Blocked),
            Ok(report_response()),
        ])
        .await;
        let result = analyzer
            .analyze_video("is this footage real", &insights(), None)
            .await;

        assert_eq!(result.verdict, Verdict::False);
        let content = result.content_analysis.expect("fallback classification attached");
        assert!(content.summary.contains("could not be completed"));
    }

    #[tokio::test]
    async fn chat_title_strips_quotes_and_caps_word_count() {
        let (analyzer, _server) = analyzer_with(vec![Ok(
            "\"Mountain Trip Footage Authenticity Check Today And Tomorrow\"".to_string(),
        )])
        .await;
        let title = analyzer.generate_chat_title("is this real").await;
        assert_eq!(title, "Mountain Trip Footage Authenticity Check Today");
    }

    #[tokio::test]
    async fn chat_title_falls_back_on_error_and_empty_output() {
        let (analyzer, _server) = analyzer_with(vec![Err(LlmError::Empty)]).await;
        assert_eq!(
            analyzer.generate_chat_title("is this real").await,
            FALLBACK_CHAT_TITLE
        );

        let (analyzer, _server) = analyzer_with(vec![Ok("  \"\"  ".to_string())]).await;
        assert_eq!(
            analyzer.generate_chat_title("is this real").await,
            FALLBACK_CHAT_TITLE
        );
    }
}
