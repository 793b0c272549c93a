//! Per-conversation analysis memory.
//!
//! Each conversation owns one [`ContextActor`]; routing every read and
//! write through its mailbox serializes access without locks. Memory is
//! bounded: every list has a cap and the oldest entries fall off first,
//! so a long-running conversation cannot grow prompts or the process
//! without limit.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use truthsense_common::Verdict;

use crate::actor::{Actor, Context};

/// Caps for each retained list. Oldest entries are evicted first.
#[derive(Debug, Clone, Copy)]
pub struct ContextLimits {
    pub max_queries: usize,
    pub max_videos: usize,
    pub max_documents: usize,
    pub max_images: usize,
    pub max_sources: usize,
    pub max_verdicts: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_queries: 20,
            max_videos: 10,
            max_documents: 10,
            max_images: 10,
            max_sources: 50,
            max_verdicts: 50,
        }
    }
}

/// A previously analyzed video, as remembered for later prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedVideo {
    pub title: String,
    pub channel: String,
    pub verdict: Verdict,
    pub confidence: u8,
    pub content_type: Option<String>,
}

/// One past verdict, kept for the conversation's verdict history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub claim: String,
    pub verdict: Verdict,
    pub confidence: u8,
}

/// Everything a conversation remembers across analyses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContextData {
    pub user_queries: Vec<String>,
    pub ai_responses: Vec<String>,
    pub analyzed_videos: Vec<AnalyzedVideo>,
    pub analyzed_documents: Vec<String>,
    pub analyzed_images: Vec<String>,
    pub sources_used: Vec<String>,
    pub verdict_history: Vec<VerdictRecord>,
}

fn cap_front<T>(list: &mut Vec<T>, max: usize) {
    if list.len() > max {
        list.drain(..list.len() - max);
    }
}

impl ChatContextData {
    pub fn is_empty(&self) -> bool {
        self.user_queries.is_empty()
            && self.analyzed_videos.is_empty()
            && self.verdict_history.is_empty()
    }

    /// Record one query/response exchange plus its verdict and sources.
    pub fn record_exchange(
        &mut self,
        query: String,
        response: String,
        verdict: VerdictRecord,
        sources: Vec<String>,
        limits: &ContextLimits,
    ) {
        self.user_queries.push(query);
        self.ai_responses.push(response);
        self.verdict_history.push(verdict);
        self.sources_used.extend(sources);

        cap_front(&mut self.user_queries, limits.max_queries);
        cap_front(&mut self.ai_responses, limits.max_queries);
        cap_front(&mut self.verdict_history, limits.max_verdicts);
        cap_front(&mut self.sources_used, limits.max_sources);
    }

    pub fn record_video(&mut self, video: AnalyzedVideo, limits: &ContextLimits) {
        self.analyzed_videos.push(video);
        cap_front(&mut self.analyzed_videos, limits.max_videos);
    }

    pub fn record_document(&mut self, name: String, limits: &ContextLimits) {
        self.analyzed_documents.push(name);
        cap_front(&mut self.analyzed_documents, limits.max_documents);
    }

    pub fn record_image(&mut self, name: String, limits: &ContextLimits) {
        self.analyzed_images.push(name);
        cap_front(&mut self.analyzed_images, limits.max_images);
    }
}

/// Updates a conversation can record.
#[derive(Debug)]
pub enum ContextUpdate {
    Exchange {
        query: String,
        response: String,
        verdict: VerdictRecord,
        sources: Vec<String>,
    },
    Video(AnalyzedVideo),
    Document(String),
    Image(String),
}

/// Mailbox protocol for [`ContextActor`].
#[derive(Debug)]
pub enum ContextMsg {
    Record(ContextUpdate),
    Snapshot { reply: oneshot::Sender<ChatContextData> },
    Clear,
}

/// Owns one conversation's [`ChatContextData`].
pub struct ContextActor {
    data: ChatContextData,
    limits: ContextLimits,
}

impl ContextActor {
    pub fn new(limits: ContextLimits) -> Self {
        Self {
            data: ChatContextData::default(),
            limits,
        }
    }
}

#[async_trait::async_trait]
impl Actor for ContextActor {
    type Msg = ContextMsg;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            ContextMsg::Record(update) => {
                match update {
                    ContextUpdate::Exchange {
                        query,
                        response,
                        verdict,
                        sources,
                    } => self
                        .data
                        .record_exchange(query, response, verdict, sources, &self.limits),
                    ContextUpdate::Video(video) => self.data.record_video(video, &self.limits),
                    ContextUpdate::Document(name) => {
                        self.data.record_document(name, &self.limits)
                    }
                    ContextUpdate::Image(name) => self.data.record_image(name, &self.limits),
                }
                tracing::debug!(
                    target: "actors",
                    queries = self.data.user_queries.len(),
                    videos = self.data.analyzed_videos.len(),
                    verdicts = self.data.verdict_history.len(),
                    "context.recorded"
                );
            }
            ContextMsg::Snapshot { reply } => {
                if reply.send(self.data.clone()).is_err() {
                    tracing::debug!(target: "actors", "context.snapshot.reply_dropped");
                }
            }
            ContextMsg::Clear => {
                self.data = ChatContextData::default();
                tracing::info!(target: "actors", "context.cleared");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::spawn_actor;

    fn verdict(claim: &str) -> VerdictRecord {
        VerdictRecord {
            claim: claim.to_string(),
            verdict: Verdict::True,
            confidence: 80,
        }
    }

    #[test]
    fn exchange_lists_evict_oldest_first() {
        let limits = ContextLimits {
            max_queries: 2,
            max_verdicts: 3,
            max_sources: 3,
            ..Default::default()
        };
        let mut data = ChatContextData::default();
        for i in 0..4 {
            data.record_exchange(
                format!("q{i}"),
                format!("r{i}"),
                verdict(&format!("c{i}")),
                vec![format!("s{i}")],
                &limits,
            );
        }
        assert_eq!(data.user_queries, vec!["q2", "q3"]);
        assert_eq!(data.ai_responses, vec!["r2", "r3"]);
        assert_eq!(data.verdict_history.len(), 3);
        assert_eq!(data.verdict_history[0].claim, "c1");
        assert_eq!(data.sources_used, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn video_list_is_capped() {
        let limits = ContextLimits {
            max_videos: 2,
            ..Default::default()
        };
        let mut data = ChatContextData::default();
        for i in 0..3 {
            data.record_video(
                AnalyzedVideo {
                    title: format!("v{i}"),
                    channel: "c".to_string(),
                    verdict: Verdict::Misleading,
                    confidence: 60,
                    content_type: None,
                },
                &limits,
            );
        }
        assert_eq!(data.analyzed_videos.len(), 2);
        assert_eq!(data.analyzed_videos[0].title, "v1");
    }

    #[tokio::test]
    async fn actor_serializes_records_and_snapshots() {
        let handle = spawn_actor(ContextActor::new(ContextLimits::default()), 16);

        handle
            .addr
            .send(ContextMsg::Record(ContextUpdate::Exchange {
                query: "is the moon made of cheese".to_string(),
                response: "no".to_string(),
                verdict: verdict("moon cheese"),
                sources: vec!["https://nasa.gov".to_string()],
            }))
            .await
            .unwrap();

        let (tx, rx) = oneshot::channel();
        handle
            .addr
            .send(ContextMsg::Snapshot { reply: tx })
            .await
            .unwrap();
        let snapshot = rx.await.unwrap();
        assert_eq!(snapshot.user_queries, vec!["is the moon made of cheese"]);
        assert_eq!(snapshot.verdict_history[0].claim, "moon cheese");

        handle.addr.send(ContextMsg::Clear).await.unwrap();
        let (tx, rx) = oneshot::channel();
        handle
            .addr
            .send(ContextMsg::Snapshot { reply: tx })
            .await
            .unwrap();
        assert!(rx.await.unwrap().is_empty());

        drop(handle.addr);
        handle.task.await.unwrap().unwrap();
    }
}
