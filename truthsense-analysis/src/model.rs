//! Result types for claim, content, and frame analysis.

use serde::{Deserialize, Serialize};
use truthsense_common::Verdict;

/// Where the explanation text came from.
///
/// `Synthesized` means the model's own report was missing or too thin
/// (under 300 characters) and was replaced by the canned structured
/// report; consumers can surface that distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationOrigin {
    Extracted,
    Synthesized,
}

/// Condensed video facts attached to a video analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub title: String,
    pub channel: String,
    pub sentiment_overall: String,
    pub transcript_highlights: String,
}

/// The outcome of one claim or video analysis.
///
/// Every entry point produces one of these; failures degrade to an
/// `Unverifiable`/0 result rather than erroring out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub verdict: Verdict,
    /// 0..=100.
    pub confidence: u8,
    pub explanation: String,
    pub explanation_origin: ExplanationOrigin,
    /// Top credible URLs from the live fetch, at most six. Never taken
    /// from model output.
    pub sources: Vec<String>,
    pub full_response: String,
    pub context_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_analysis: Option<VideoSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<ContentAnalysisResult>,
}

/// Primary classification of a video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Song,
    Movie,
    News,
    Vlog,
    Documentary,
    Educational,
    #[default]
    Entertainment,
}

impl ContentType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Song => "Song",
            Self::Movie => "Movie",
            Self::News => "News",
            Self::Vlog => "Vlog",
            Self::Documentary => "Documentary",
            Self::Educational => "Educational",
            Self::Entertainment => "Entertainment",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Song => "🎵",
            Self::Movie => "🎬",
            Self::News => "📰",
            Self::Vlog => "🎥",
            Self::Documentary => "📚",
            Self::Educational => "🎓",
            Self::Entertainment => "🎭",
        }
    }
}

/// Embedded fact-check outcome for news-type content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckResults {
    pub verdict: Verdict,
    pub confidence: u8,
    pub sources: Vec<String>,
}

/// Engagement facts reused across content types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Popularity {
    pub views: String,
    pub comment_sentiment: String,
    pub virality_score: u8,
}

/// Type-specific metadata extracted from the classification response.
/// All fields optional; which group is populated depends on the
/// detected content type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichAnalysis {
    // song
    pub song_title: Option<String>,
    pub movie_name: Option<String>,
    pub release_year: Option<String>,
    pub singers: Option<Vec<String>>,
    pub music_director: Option<String>,
    pub lyricist: Option<String>,
    pub lead_cast: Option<Vec<String>>,
    pub cultural_significance: Option<String>,

    // movie
    pub movie_title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<Vec<String>>,
    pub scene_description: Option<String>,

    // news / documentary
    pub transcript_summary: Option<String>,
    pub speaker_identification: Option<String>,
    pub topic_classification: Option<String>,
    pub key_points: Option<Vec<String>>,
    pub fact_check_results: Option<FactCheckResults>,

    // common
    pub popularity: Option<Popularity>,
    pub misinformation_flags: Option<Vec<String>>,
    pub credibility_score: Option<u8>,
    pub manipulation_indicators: Option<Vec<String>>,
    pub source_authority: Option<u8>,
}

/// Full classification output for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalysisResult {
    pub content_type: ContentType,
    pub rich_analysis: RichAnalysis,
    /// Display rendering with emoji section headers.
    pub formatted_analysis: String,
    pub summary: String,
    /// Ordered key/value rows for tabular display.
    pub table_data: Vec<(String, String)>,
}

// ---- frame forensics ----

/// Per-frame quality observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub sharpness: String,
    pub lighting: String,
    pub color_consistency: String,
    pub compression_artifacts: String,
}

/// Forensic assessment of a single extracted frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub frame_number: usize,
    /// Seconds into the video.
    pub timestamp: f64,
    pub suspicious: bool,
    /// 0..=100.
    pub confidence: u8,
    pub issues: Vec<String>,
    pub explanation: String,
    pub frame_path: String,
    pub scene_description: String,
    pub major_events: Vec<String>,
    pub visual_elements: Vec<String>,
    pub technical_quality: String,
    pub contextual_significance: String,
    pub narrative_progression: String,
    pub detailed_analysis: String,
    pub forensic_observations: Vec<String>,
    pub quality_metrics: QualityMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameVerdict {
    Clean,
    Suspicious,
    Manipulated,
    Deepfake,
}

impl FrameVerdict {
    pub fn label(self) -> &'static str {
        match self {
            Self::Clean => "CLEAN",
            Self::Suspicious => "SUSPICIOUS",
            Self::Manipulated => "MANIPULATED",
            Self::Deepfake => "DEEPFAKE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMoment {
    pub timestamp: f64,
    pub description: String,
    pub significance: String,
}

/// Three-act narrative reconstructed from frame descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoNarrative {
    pub beginning: String,
    pub middle: String,
    pub end: String,
    pub key_moments: Vec<KeyMoment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub overall_assessment: String,
    pub technical_findings: Vec<String>,
    pub content_analysis: Vec<String>,
    pub authenticity_indicators: Vec<String>,
    pub professional_observations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedFindings {
    pub authenticity_assessment: String,
    pub manipulation_indicators: Vec<String>,
    pub quality_analysis: String,
    pub consistency_check: String,
    pub expert_observations: Vec<String>,
}

/// Aggregate verdict across every analysed frame of one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFrameAnalysis {
    pub video_id: String,
    pub total_frames: usize,
    pub suspicious_frames: Vec<FrameAnalysis>,
    pub overall_verdict: FrameVerdict,
    pub overall_confidence: u8,
    pub summary: String,
    pub video_narrative: VideoNarrative,
    pub comprehensive_analysis: ComprehensiveAnalysis,
    pub detailed_findings: DetailedFindings,
}
