//! Lexicon-based comment sentiment.
//!
//! Deliberately simple: count positive and negative words, normalise by
//! comment length, and label with a ±0.1 dead zone. Good enough to
//! summarise audience reaction for the prompts and the engagement table.

use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "love",
    "like",
    "awesome",
    "brilliant",
    "perfect",
    "best",
    "incredible",
    "outstanding",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "hate",
    "dislike",
    "worst",
    "disgusting",
    "pathetic",
    "stupid",
    "ridiculous",
    "nonsense",
    "fake",
    "lies",
];

const LABEL_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    fn from_score(score: f64) -> Self {
        if score > LABEL_THRESHOLD {
            Self::Positive
        } else if score < -LABEL_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score one text in [-1, 1] and label it.
pub fn analyze_text(text: &str) -> (Sentiment, f64) {
    let words: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        return (Sentiment::Neutral, 0.0);
    }

    let mut raw = 0i64;
    for word in &words {
        if POSITIVE_WORDS.contains(&word.as_str()) {
            raw += 1;
        }
        if NEGATIVE_WORDS.contains(&word.as_str()) {
            raw -= 1;
        }
    }

    let score = (raw as f64 / words.len() as f64 * 10.0).clamp(-1.0, 1.0);
    (Sentiment::from_score(score), score)
}

/// Counts of comments per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Aggregate sentiment across a comment section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub overall: Sentiment,
    /// Mean of the per-comment scores.
    pub score: f64,
    pub distribution: SentimentDistribution,
}

impl Default for SentimentSummary {
    fn default() -> Self {
        Self {
            overall: Sentiment::Neutral,
            score: 0.0,
            distribution: SentimentDistribution::default(),
        }
    }
}

/// Label each comment and summarise the section. An empty section is
/// neutral with a zero score.
pub fn summarize(texts: &[String]) -> SentimentSummary {
    if texts.is_empty() {
        return SentimentSummary::default();
    }

    let mut distribution = SentimentDistribution::default();
    let mut total = 0.0;
    for text in texts {
        let (label, score) = analyze_text(text);
        match label {
            Sentiment::Positive => distribution.positive += 1,
            Sentiment::Negative => distribution.negative += 1,
            Sentiment::Neutral => distribution.neutral += 1,
        }
        total += score;
    }

    let score = total / texts.len() as f64;
    SentimentSummary {
        overall: Sentiment::from_score(score),
        score,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_and_negative_words_move_the_score() {
        let (label, score) = analyze_text("this is great great great");
        assert_eq!(label, Sentiment::Positive);
        assert!(score > 0.1);

        let (label, score) = analyze_text("fake lies nonsense");
        assert_eq!(label, Sentiment::Negative);
        assert_eq!(score, -1.0);
    }

    #[test]
    fn score_is_clamped_to_unit_interval() {
        let (_, score) = analyze_text("awesome amazing perfect best");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn dead_zone_is_neutral() {
        let (label, score) = analyze_text("the weather report aired at nine and nothing happened");
        assert_eq!(label, Sentiment::Neutral);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn empty_section_is_neutral_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.overall, Sentiment::Neutral);
        assert_eq!(summary.score, 0.0);
        assert_eq!(summary.distribution, SentimentDistribution::default());
    }

    #[test]
    fn summary_averages_and_counts_labels() {
        let texts = vec![
            "great amazing love".to_string(),
            "fake lies".to_string(),
            "just a comment about the topic at hand".to_string(),
        ];
        let summary = summarize(&texts);
        assert_eq!(summary.distribution.positive, 1);
        assert_eq!(summary.distribution.negative, 1);
        assert_eq!(summary.distribution.neutral, 1);
        assert_eq!(summary.overall, Sentiment::Neutral);
    }
}
