//! Claim, video, and frame analysis on top of a generative model.
//!
//! The flow for every analysis is the same: gather external evidence,
//! assemble a prompt around it, call the model once, then parse the
//! response into a structured result. [`analyzer::Analyzer`] is the
//! entry point for claims and videos; [`frames::FrameAnalyzer`] runs
//! the per-frame forensic pipeline.
//!
//! Two rules hold throughout. Source URLs in results come only from the
//! live fetch, never from model output. And failures degrade to canned
//! results instead of erroring, so a conversation always gets an answer
//! it can record.

pub mod analyzer;
pub mod content;
pub mod frames;
pub mod model;
pub mod parser;
pub mod prompts;
pub mod scoring;

pub use analyzer::{Analyzer, AttachedImage};
pub use content::{fallback_content_analysis, parse_content_analysis};
pub use frames::FrameAnalyzer;
pub use model::{
    AnalysisResult, ContentAnalysisResult, ContentType, ExplanationOrigin, FrameAnalysis,
    FrameVerdict, VideoFrameAnalysis, VideoSummary,
};
pub use parser::parse_model_response;
