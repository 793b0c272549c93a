//! Request orchestration: one analysis driven through an explicit
//! pipeline, with the conversation context read before and written
//! after.
//!
//! Every run walks `Idle → ContextRead → ExternalFetch → PromptBuilt →
//! ModelInvoked → {ParsedOk | ParsedFallback} → ContextWrite → Done`.
//! The analysis facade executes fetch, prompt, and model call as one
//! awaited unit; the engine records those transitions when the unit
//! completes. Failures are converted to canned unverifiable results and
//! still reach `ContextWrite` and `Done`, so the conversation records
//! the attempt either way.

use truthsense_actors::{
    Addr, AnalyzedVideo, ChatContextData, ContextActor, ContextMsg, ContextUpdate, VerdictRecord,
};
use truthsense_analysis::{
    AnalysisResult, Analyzer, AttachedImage, ExplanationOrigin,
};
use truthsense_common::Verdict;
use truthsense_video::{contains_youtube_url, VideoClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    ContextRead,
    ExternalFetch,
    PromptBuilt,
    ModelInvoked,
    ParsedOk,
    ParsedFallback,
    ContextWrite,
    Done,
}

impl EngineState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ContextRead => "context_read",
            Self::ExternalFetch => "external_fetch",
            Self::PromptBuilt => "prompt_built",
            Self::ModelInvoked => "model_invoked",
            Self::ParsedOk => "parsed_ok",
            Self::ParsedFallback => "parsed_fallback",
            Self::ContextWrite => "context_write",
            Self::Done => "done",
        }
    }
}

/// Drives one analysis request end to end.
pub struct Engine {
    analyzer: Analyzer,
    video: VideoClient,
    context: Option<Addr<ContextActor>>,
    trace: Vec<EngineState>,
}

impl Engine {
    pub fn new(
        analyzer: Analyzer,
        video: VideoClient,
        context: Option<Addr<ContextActor>>,
    ) -> Self {
        Self {
            analyzer,
            video,
            context,
            trace: Vec::new(),
        }
    }

    /// States visited by the most recent run, in order.
    pub fn trace(&self) -> &[EngineState] {
        &self.trace
    }

    /// Title the conversation from its first message.
    pub async fn title(&self, first_message: &str) -> String {
        self.analyzer.generate_chat_title(first_message).await
    }

    fn transition(&mut self, state: EngineState) {
        tracing::info!(target: "engine", state = state.label(), "engine.state");
        self.trace.push(state);
    }

    async fn read_context(&mut self) -> Option<ChatContextData> {
        self.transition(EngineState::ContextRead);
        let addr = self.context.as_ref()?;

        let (reply, rx) = tokio::sync::oneshot::channel();
        if addr.send(ContextMsg::Snapshot { reply }).await.is_err() {
            tracing::warn!(target: "engine", "engine.context.read_failed");
            return None;
        }
        match rx.await {
            Ok(data) if !data.is_empty() => Some(data),
            Ok(_) => None,
            Err(_) => {
                tracing::warn!(target: "engine", "engine.context.reply_dropped");
                None
            }
        }
    }

    async fn write_context(
        &mut self,
        query: &str,
        result: &AnalysisResult,
        images: &[AttachedImage],
        document_name: Option<&str>,
    ) {
        self.transition(EngineState::ContextWrite);
        let Some(addr) = self.context.as_ref() else {
            return;
        };

        let exchange = ContextUpdate::Exchange {
            query: query.to_string(),
            response: result.explanation.clone(),
            verdict: VerdictRecord {
                claim: query.to_string(),
                verdict: result.verdict,
                confidence: result.confidence,
            },
            sources: result.sources.clone(),
        };
        let mut updates = vec![exchange];

        if let Some(video) = &result.video_analysis {
            updates.push(ContextUpdate::Video(AnalyzedVideo {
                title: video.title.clone(),
                channel: video.channel.clone(),
                verdict: result.verdict,
                confidence: result.confidence,
                content_type: result
                    .content_analysis
                    .as_ref()
                    .map(|c| c.content_type.label().to_string()),
            }));
        }
        if let Some(name) = document_name {
            updates.push(ContextUpdate::Document(name.to_string()));
        }
        for image in images {
            updates.push(ContextUpdate::Image(image.name.clone()));
        }

        for update in updates {
            if addr.send(ContextMsg::Record(update)).await.is_err() {
                tracing::warn!(target: "engine", "engine.context.write_failed");
                return;
            }
        }
    }

    /// Run one analysis. The input is treated as a video request when it
    /// contains a YouTube URL, otherwise as a text claim.
    pub async fn run(
        &mut self,
        query: &str,
        images: &[AttachedImage],
        document_name: Option<&str>,
    ) -> AnalysisResult {
        self.trace.clear();
        self.transition(EngineState::Idle);

        let chat_context = self.read_context().await;

        self.transition(EngineState::ExternalFetch);
        let result = if contains_youtube_url(query) {
            match self.video.analyze_url(query).await {
                Ok(insights) => {
                    let result = self
                        .analyzer
                        .analyze_video(query, &insights, chat_context.as_ref())
                        .await;
                    self.transition(EngineState::PromptBuilt);
                    self.transition(EngineState::ModelInvoked);
                    result
                }
                Err(e) => {
                    tracing::error!(target: "engine", error = %e, "engine.video.fetch_failed");
                    video_fetch_failure()
                }
            }
        } else {
            let result = self
                .analyzer
                .analyze_claim(query, chat_context.as_ref(), images)
                .await;
            self.transition(EngineState::PromptBuilt);
            self.transition(EngineState::ModelInvoked);
            result
        };

        match result.explanation_origin {
            ExplanationOrigin::Extracted => self.transition(EngineState::ParsedOk),
            ExplanationOrigin::Synthesized => self.transition(EngineState::ParsedFallback),
        }

        self.write_context(query, &result, images, document_name).await;
        self.transition(EngineState::Done);

        tracing::info!(
            target: "engine",
            verdict = %result.verdict,
            confidence = result.confidence,
            "engine.run.done"
        );
        result
    }
}

/// Canned result when the video itself could not be fetched, before any
/// model call was possible.
fn video_fetch_failure() -> AnalysisResult {
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
        video_analysis: None,
        content_analysis: None,
    }
}
