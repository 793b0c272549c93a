//! Heuristic scorers over model output and video metadata.
//!
//! All scorers are pure functions on text and counters so they can be
//! exercised without any network fixtures. Scores live on a 0..=100
//! scale and saturate at the edges.

use chrono::{DateTime, Utc};

/// Keywords that mark a passage as carrying misinformation signals.
/// Matching is case-insensitive substring; output keeps this order.
const MISINFORMATION_VOCABULARY: [&str; 13] = [
    "false",
    "misleading",
    "unverified",
    "biased",
    "propaganda",
    "conspiracy",
    "manipulated",
    "doctored",
    "deepfake",
    "fabricated",
    "out of context",
    "cherry-picked",
    "sensationalized",
];

/// Keywords that mark a passage as describing technical manipulation.
const MANIPULATION_VOCABULARY: [&str; 14] = [
    "edited",
    "spliced",
    "cut",
    "manipulated",
    "altered",
    "modified",
    "deepfake",
    "synthetic",
    "artificial",
    "generated",
    "fake",
    "doctored",
    "tampered",
    "fabricated",
];

fn matched_terms(text: &str, vocabulary: &[&'static str]) -> Vec<String> {
    let lower = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

/// Misinformation flags present in `text`, deduplicated, in vocabulary
/// order.
pub fn detect_misinformation_flags(text: &str) -> Vec<String> {
    matched_terms(text, &MISINFORMATION_VOCABULARY)
}

/// Technical manipulation indicators present in `text`.
pub fn detect_manipulation_indicators(text: &str) -> Vec<String> {
    matched_terms(text, &MANIPULATION_VOCABULARY)
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

/// Credibility of a piece of content, from the model's assessment text
/// plus channel identity and reach. Starts at 70 and moves on keyword
/// evidence.
pub fn credibility_score(analysis_text: &str, channel: &str, views: u64) -> u8 {
    let text = analysis_text.to_lowercase();
    let channel = channel.to_lowercase();
    let mut score: i64 = 70;

    if text.contains("false") {
        score -= 35;
    }
    if text.contains("misleading") {
        score -= 25;
    }
    if text.contains("unverified") {
        score -= 20;
    }
    if text.contains("biased") {
        score -= 15;
    }
    if text.contains("manipulated") {
        score -= 30;
    }
    if text.contains("deepfake") {
        score -= 40;
    }

    if text.contains("credible") {
        score += 20;
    }
    if text.contains("verified") {
        score += 15;
    }
    if text.contains("accurate") {
        score += 15;
    }
    if text.contains("authoritative") {
        score += 25;
    }
    if text.contains("professional") {
        score += 10;
    }

    if channel.contains("news") || channel.contains("official") {
        score += 15;
    }
    if channel.contains("bbc")
        || channel.contains("cnn")
        || channel.contains("reuters")
        || channel.contains("ap news")
    {
        score += 25;
    }
    if channel.contains("university") || channel.contains("institute") {
        score += 20;
    }

    if views > 1_000_000 {
        score += 5;
    }
    if views > 10_000_000 {
        score += 5;
    }

    clamp_score(score)
}

/// Authority of the publishing source, from channel identity plus the
/// video description and the model's assessment text. Starts at 50.
pub fn source_authority(channel: &str, description: &str, analysis_text: &str) -> u8 {
    let channel = channel.to_lowercase();
    let description = description.to_lowercase();
    let text = analysis_text.to_lowercase();
    let mut score: i64 = 50;

    if channel.contains("bbc")
        || channel.contains("reuters")
        || channel.contains("ap news")
        || channel.contains("npr")
    {
        score += 40;
    }
    if channel.contains("university")
        || channel.contains("institute")
        || channel.contains("academy")
    {
        score += 35;
    }
    if channel.contains("government") || channel.contains("official") {
        score += 30;
    }
    if description.contains("verified") || description.contains("official") {
        score += 20;
    }
    if channel.contains("news") || channel.contains("media") {
        score += 15;
    }
    if channel.contains("journal") || channel.contains("magazine") {
        score += 10;
    }

    if channel.contains("conspiracy") || channel.contains("truth") {
        score -= 20;
    }
    if text.contains("unverified source") {
        score -= 15;
    }
    if text.contains("anonymous") {
        score -= 10;
    }

    clamp_score(score)
}

/// Engagement-rate virality score. Recency boosts the rate: a video
/// younger than thirty days is scaled by `30 / age_days`. Zero views
/// means zero score rather than a division blowup; age is floored at
/// one day.
pub fn virality_score(
    views: u64,
    likes: u64,
    comments: u64,
    published_at: &str,
    now: DateTime<Utc>,
) -> u8 {
    if views == 0 {
        return 0;
    }

    let days = DateTime::parse_from_rfc3339(published_at)
        .map(|published| (now - published.with_timezone(&Utc)).num_days().max(1))
        .unwrap_or(1) as f64;

    let engagement_rate = (likes + comments) as f64 / views as f64 * 1000.0;
    let recency_boost = (30.0 / days).max(1.0);
    (engagement_rate * recency_boost).round().min(100.0) as u8
}
