//! Parsing of content-classification responses into structured,
//! type-specific metadata.
//!
//! The classification prompt asks for labelled sections
//! (`**CONTENT TYPE: ...**`, `**DETAILED CONTENT BREAKDOWN:**`, ...)
//! but field layout inside them varies run to run, so field extraction
//! works through a ladder of progressively looser patterns rather than
//! one strict grammar.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use truthsense_common::Verdict;
use truthsense_video::VideoInsights;

use crate::model::{
    ContentAnalysisResult, ContentType, FactCheckResults, Popularity, RichAnalysis,
};
use crate::prompts::{format_date, group_thousands};
use crate::scoring;

const FACT_CHECK_SOURCES: [&str; 4] = [
    "Enhanced live news verification",
    "MediaStack API",
    "SerpAPI",
    "Gemini 2.5 Pro analysis",
];

fn content_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\*\*CONTENT TYPE:\s*([^*\n]+)\*\*").unwrap())
}

fn section_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*[A-Z]|\n\n").unwrap())
}

/// Body of a `**HEADER:**` section, up to the next bold header or
/// blank line.
fn extract_section(response: &str, header: &str) -> String {
    let header_re = Regex::new(&format!(r"(?i)\*\*{header}:\*\*\s*")).unwrap();
    let Some(m) = header_re.find(response) else {
        return String::new();
    };
    let rest = &response[m.end()..];
    let end = section_end_re()
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

/// Map the declared content type onto the known variants by keyword.
/// Anything unrecognized is entertainment.
pub fn classify_content_type(response: &str) -> ContentType {
    let Some(captures) = content_type_re().captures(response) else {
        return ContentType::Entertainment;
    };
    let label = captures[1].to_lowercase();
    if label.contains("song") || label.contains("music") {
        ContentType::Song
    } else if label.contains("movie") || label.contains("film") {
        ContentType::Movie
    } else if label.contains("news") || label.contains("documentary") {
        ContentType::News
    } else if label.contains("vlog") || label.contains("personal") {
        ContentType::Vlog
    } else if label.contains("educational") || label.contains("tutorial") {
        ContentType::Educational
    } else {
        ContentType::Entertainment
    }
}

/// Pull one named field out of loosely structured model output.
/// Tries, in order: a bold `**field:**` label, a plain `field:` label,
/// a bold phrase on the same line as the field name, and a numbered
/// bold heading with the value on the following line.
pub fn extract_field(text: &str, field: &str) -> Option<String> {
    let patterns = [
        format!(r"(?i)\*\*{field}[^:]*:\*\*\s*([^\n*]+)"),
        format!(r"(?i){field}[^:]*:\s*([^\n*]+)"),
        format!(r"(?i)\*\*([^*]+)\*\*.*{field}"),
        format!(r"(?i)\d+\.\s*\*\*{field}[^*]*\*\*[^\n]*\n\s*([^\n]+)"),
    ];

    for pattern in &patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(captures) = re.captures(text) {
            let value: String = captures[1]
                .trim()
                .chars()
                .filter(|c| !matches!(c, '*' | '[' | ']'))
                .collect();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Like [`extract_field`] but splits on commas and ampersands.
pub fn extract_list_field(text: &str, field: &str) -> Option<Vec<String>> {
    let field = extract_field(text, field)?;
    let items: Vec<String> = field
        .split(|c| c == ',' || c == '&')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

fn first_of(text: &str, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| extract_field(text, f))
}

fn first_list_of(text: &str, fields: &[&str]) -> Option<Vec<String>> {
    fields.iter().find_map(|f| extract_list_field(text, f))
}

fn confidence_from_text(text: &str) -> u8 {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(\d+)%").unwrap());
    re.captures(text)
        .and_then(|c| c[1].parse::<u64>().ok())
        .map(|n| n.min(100) as u8)
        .unwrap_or(75)
}

fn char_prefix(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Parse a classification response against the video it describes.
pub fn parse_content_analysis(
    response: &str,
    insights: &VideoInsights,
    now: DateTime<Utc>,
) -> ContentAnalysisResult {
    let content_type = classify_content_type(response);
    let breakdown = extract_section(response, "DETAILED CONTENT BREAKDOWN");
    let credibility_text = extract_section(response, "CREDIBILITY ASSESSMENT");
    let summary = {
        let s = extract_section(response, "SUMMARY");
        if s.is_empty() {
            "Enhanced comprehensive analysis completed with Gemini 2.5 Pro.".to_string()
        } else {
            s
        }
    };

    let video = &insights.video;
    let mut rich = RichAnalysis {
        popularity: Some(Popularity {
            views: group_thousands(video.view_count),
            comment_sentiment: format!(
                "{} ({:.2})",
                insights.sentiment.overall, insights.sentiment.score
            ),
            virality_score: scoring::virality_score(
                video.view_count,
                video.like_count,
                video.comment_count,
                &video.published_at,
                now,
            ),
        }),
        ..Default::default()
    };

    match content_type {
        ContentType::Song => {
            rich.song_title = first_of(response, &["song title", "title"])
                .or_else(|| Some(video.title.clone()));
            rich.movie_name = first_of(response, &["movie", "film"]);
            rich.release_year = first_of(response, &["year", "release"]);
            rich.singers = first_list_of(response, &["singer", "artist", "vocalist"]);
            rich.music_director = first_of(response, &["music director", "composer"]);
            rich.lyricist = first_of(response, &["lyricist", "writer"]);
            rich.lead_cast = first_list_of(response, &["cast", "actors"]);
            rich.cultural_significance = first_of(response, &["cultural", "significance"]);
        }
        ContentType::Movie => {
            rich.movie_title = first_of(response, &["movie title", "film title"]);
            rich.director = extract_field(response, "director");
            rich.cast = first_list_of(response, &["cast", "actors"]);
            rich.scene_description = extract_field(response, "scene")
                .or_else(|| Some(char_prefix(&breakdown, 300)));
            rich.release_year = first_of(response, &["year", "release"]);
        }
        ContentType::News | ContentType::Documentary => {
            rich.transcript_summary = Some(format!(
                "{}...",
                char_prefix(&insights.transcript, 500)
            ));
            rich.speaker_identification = extract_field(response, "speaker")
                .or_else(|| Some(video.channel_title.clone()));
            rich.topic_classification = first_of(response, &["topic", "classification"]);
            rich.key_points =
                first_list_of(response, &["key points", "main points", "claims"]);

            let lower = credibility_text.to_lowercase();
            let has_fact_check = lower.contains("false")
                || lower.contains("misleading")
                || lower.contains("true")
                || lower.contains("verified");
            if has_fact_check {
                let verdict = if lower.contains("false") {
                    Verdict::False
                } else if lower.contains("misleading") {
                    Verdict::Misleading
                } else if lower.contains("verified") {
                    Verdict::True
                } else {
                    Verdict::Unverifiable
                };
                rich.fact_check_results = Some(FactCheckResults {
                    verdict,
                    confidence: confidence_from_text(&credibility_text),
                    sources: FACT_CHECK_SOURCES.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        ContentType::Vlog | ContentType::Educational | ContentType::Entertainment => {}
    }

    if !credibility_text.is_empty() || !breakdown.is_empty() {
        let analysis_text = format!("{credibility_text} {breakdown}");
        rich.misinformation_flags = Some(scoring::detect_misinformation_flags(&analysis_text));
        rich.credibility_score = Some(scoring::credibility_score(
            &analysis_text,
            &video.channel_title,
            video.view_count,
        ));
        rich.manipulation_indicators =
            Some(scoring::detect_manipulation_indicators(&analysis_text));
        rich.source_authority = Some(scoring::source_authority(
            &video.channel_title,
            &video.description,
            &analysis_text,
        ));
    }

    let table_data = build_table_data(content_type, &rich, insights);
    let formatted_analysis =
        format_for_display(content_type, &rich, &breakdown);

    tracing::debug!(
        target: "analysis.parse",
        content_type = content_type.label(),
        flags = rich.misinformation_flags.as_ref().map_or(0, Vec::len),
        "content.parse.done"
    );

    ContentAnalysisResult {
        content_type,
        rich_analysis: rich,
        formatted_analysis,
        summary,
        table_data,
    }
}

fn build_table_data(
    content_type: ContentType,
    rich: &RichAnalysis,
    insights: &VideoInsights,
) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = Vec::new();
    let mut push = |rows: &mut Vec<(String, String)>, key: &str, value: String| {
        rows.push((key.to_string(), value));
    };

    match content_type {
        ContentType::Song => {
            if let Some(v) = &rich.song_title {
                push(&mut rows, "Song Title", v.clone());
            }
            if let Some(v) = &rich.movie_name {
                push(&mut rows, "Movie", v.clone());
            }
            if let Some(v) = &rich.release_year {
                push(&mut rows, "Release Year", v.clone());
            }
            if let Some(v) = &rich.singers {
                push(&mut rows, "Singer(s)", v.join(", "));
            }
            if let Some(v) = &rich.music_director {
                push(&mut rows, "Music Director", v.clone());
            }
            if let Some(v) = &rich.lyricist {
                push(&mut rows, "Lyricist", v.clone());
            }
            if let Some(v) = &rich.lead_cast {
                push(&mut rows, "Lead Cast", v.iter().take(3).cloned().collect::<Vec<_>>().join(", "));
            }
        }
        ContentType::Movie => {
            if let Some(v) = &rich.movie_title {
                push(&mut rows, "Movie Title", v.clone());
            }
            if let Some(v) = &rich.director {
                push(&mut rows, "Director", v.clone());
            }
            if let Some(v) = &rich.release_year {
                push(&mut rows, "Release Year", v.clone());
            }
            if let Some(v) = &rich.cast {
                push(&mut rows, "Main Cast", v.iter().take(3).cloned().collect::<Vec<_>>().join(", "));
            }
        }
        ContentType::News => {
            if let Some(v) = &rich.speaker_identification {
                push(&mut rows, "Speaker/Reporter", v.clone());
            }
            if let Some(v) = &rich.topic_classification {
                push(&mut rows, "Topic Category", v.clone());
            }
            if let Some(score) = rich.credibility_score.filter(|&s| s > 0) {
                push(&mut rows, "Credibility Score", format!("{score}/100"));
            }
            if let Some(score) = rich.source_authority.filter(|&s| s > 0) {
                push(&mut rows, "Source Authority", format!("{score}/100"));
            }
        }
        _ => {}
    }

    push(&mut rows, "Content Type", content_type.label().to_string());
    let popularity = rich.popularity.as_ref();
    push(
        &mut rows,
        "Views",
        popularity.map_or_else(|| "0".to_string(), |p| p.views.clone()),
    );
    push(
        &mut rows,
        "Comment Sentiment",
        popularity.map_or_else(|| "Unknown".to_string(), |p| p.comment_sentiment.clone()),
    );
    push(
        &mut rows,
        "Virality Score",
        format!("{}/100", popularity.map_or(0, |p| p.virality_score)),
    );
    push(&mut rows, "Channel", insights.video.channel_title.clone());
    push(
        &mut rows,
        "Published",
        format_date(&insights.video.published_at),
    );
    if let Some(flags) = rich.misinformation_flags.as_ref().filter(|f| !f.is_empty()) {
        push(&mut rows, "Misinformation Flags", flags.len().to_string());
    }

    rows
}

fn format_for_display(
    content_type: ContentType,
    rich: &RichAnalysis,
    breakdown: &str,
) -> String {
    let mut out = format!(
        "{} **Enhanced Content Analysis**: {}\n\n",
        content_type.emoji(),
        content_type.label()
    );

    match content_type {
        ContentType::Song => {
            if let Some(v) = &rich.song_title {
                out.push_str(&format!("🎤 **Song Title**: {v}\n"));
            }
            if let Some(v) = &rich.movie_name {
                out.push_str(&format!(
                    "🎬 **Movie**: {v} ({})\n",
                    rich.release_year.as_deref().unwrap_or("Year unknown")
                ));
            }
            if let Some(v) = &rich.singers {
                out.push_str(&format!("🎶 **Singer(s)**: {}\n", v.join(", ")));
            }
            if let Some(v) = &rich.music_director {
                out.push_str(&format!("🎧 **Music Director**: {v}\n"));
            }
            if let Some(v) = &rich.lyricist {
                out.push_str(&format!("🖊️ **Lyricist**: {v}\n"));
            }
            if let Some(v) = &rich.lead_cast {
                out.push_str(&format!("👥 **Lead Cast**: {}\n", v.join(", ")));
            }
            if let Some(v) = &rich.cultural_significance {
                out.push_str(&format!("📚 **Cultural Significance**: {v}\n"));
            }
        }
        ContentType::Movie => {
            if let Some(v) = &rich.movie_title {
                out.push_str(&format!(
                    "🎬 **Movie**: {v} ({})\n",
                    rich.release_year.as_deref().unwrap_or("Year unknown")
                ));
            }
            if let Some(v) = &rich.director {
                out.push_str(&format!("🎭 **Director**: {v}\n"));
            }
            if let Some(v) = &rich.cast {
                out.push_str(&format!("👥 **Cast**: {}\n", v.join(", ")));
            }
            if let Some(v) = &rich.scene_description {
                out.push_str(&format!("📝 **Scene Description**: {v}\n"));
            }
        }
        ContentType::News | ContentType::Documentary => {
            if let Some(v) = &rich.speaker_identification {
                out.push_str(&format!("🎤 **Speaker/Reporter**: {v}\n"));
            }
            if let Some(v) = &rich.topic_classification {
                out.push_str(&format!("📂 **Topic Category**: {v}\n"));
            }
            if let Some(points) = &rich.key_points {
                out.push_str("📋 **Key Points**:\n");
                for point in points {
                    out.push_str(&format!("   • {point}\n"));
                }
            }
            if let Some(fc) = &rich.fact_check_results {
                out.push_str(&format!(
                    "✅ **Enhanced Fact Check**: {} ({}% confidence)\n",
                    fc.verdict, fc.confidence
                ));
            }
        }
        _ => {}
    }

    if let Some(p) = &rich.popularity {
        out.push_str("\n📈 **Popularity & Engagement Analysis**:\n");
        out.push_str(&format!("   • Views: {}\n", p.views));
        out.push_str(&format!("   • Comment Sentiment: {}\n", p.comment_sentiment));
        out.push_str(&format!("   • Virality Score: {}/100\n", p.virality_score));
    }

    if let Some(score) = rich.credibility_score {
        out.push_str(&format!("\n🔍 **Enhanced Credibility Score**: {score}/100\n"));
    }
    if let Some(score) = rich.source_authority {
        out.push_str(&format!("🏛️ **Source Authority**: {score}/100\n"));
    }

    if let Some(flags) = rich.misinformation_flags.as_ref().filter(|f| !f.is_empty()) {
        out.push_str(&format!(
            "\n⚠️ **Misinformation Flags**: {}\n",
            flags.join(", ")
        ));
    }
    if let Some(indicators) = rich
        .manipulation_indicators
        .as_ref()
        .filter(|i| !i.is_empty())
    {
        out.push_str(&format!(
            "🔧 **Manipulation Indicators**: {}\n",
            indicators.join(", ")
        ));
    }

    if !breakdown.is_empty() {
        out.push_str(&format!("\n📝 **Comprehensive Analysis**:\n{breakdown}\n"));
    }

    out
}

/// The canned result returned when classification itself fails.
pub fn fallback_content_analysis() -> ContentAnalysisResult {
    ContentAnalysisResult {
        content_type: ContentType::Entertainment,
        rich_analysis: RichAnalysis {
            transcript_summary: Some(
                "Unable to complete enhanced content analysis due to technical error".to_string(),
            ),
            credibility_score: Some(0),
            source_authority: Some(0),
            manipulation_indicators: Some(vec!["Analysis failed".to_string()]),
            ..Default::default()
        },
        formatted_analysis: "Enhanced content analysis could not be completed. Please try again."
            .to_string(),
        summary: "Comprehensive analysis could not be completed due to technical error."
            .to_string(),
        table_data: vec![
            ("Status".to_string(), "Enhanced Analysis Failed".to_string()),
            (
                "Error".to_string(),
                "Technical error occurred during Gemini 2.5 Pro analysis".to_string(),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use truthsense_video::{SentimentSummary, VideoDetails};

    fn insights(title: &str, channel: &str, transcript: &str) -> VideoInsights {
        VideoInsights {
            video: VideoDetails {
                id: "v1".into(),
                title: title.into(),
                description: "description".into(),
                channel_title: channel.into(),
                published_at: "2024-05-01T00:00:00Z".into(),
                view_count: 200_000,
                like_count: 4_000,
                comment_count: 600,
                duration: "PT5M".into(),
                thumbnail_url: String::new(),
                is_short: false,
            },
            transcript: transcript.into(),
            comments: vec![],
            sentiment: SentimentSummary::default(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn content_type_keywords_map_to_variants() {
        assert_eq!(
            classify_content_type("**CONTENT TYPE: Music Video**"),
            ContentType::Song
        );
        assert_eq!(
            classify_content_type("**CONTENT TYPE: Documentary**"),
            ContentType::News
        );
        assert_eq!(
            classify_content_type("**CONTENT TYPE: Interpretive Dance**"),
            ContentType::Entertainment
        );
        assert_eq!(classify_content_type("no marker"), ContentType::Entertainment);
    }

    #[test]
    fn field_ladder_tries_progressively_looser_patterns() {
        assert_eq!(
            extract_field("**Director:** Satyajit Ray", "director"),
            Some("Satyajit Ray".to_string())
        );
        assert_eq!(
            extract_field("Director: Satyajit Ray", "director"),
            Some("Satyajit Ray".to_string())
        );
        assert_eq!(
            extract_field("3. **Director Information**\n   Satyajit Ray\n", "director"),
            Some("Satyajit Ray".to_string())
        );
        assert_eq!(extract_field("nothing here", "director"), None);
    }

    #[test]
    fn list_fields_split_on_commas_and_ampersands() {
        assert_eq!(
            extract_list_field("**Singers:** Lata Mangeshkar, Kishore Kumar & Asha Bhosle", "singer"),
            Some(vec![
                "Lata Mangeshkar".to_string(),
                "Kishore Kumar".to_string(),
                "Asha Bhosle".to_string(),
            ])
        );
    }

    #[test]
    fn song_response_fills_song_rows_in_order() {
        let response = "\
**CONTENT TYPE: Song/Music Video**

**DETAILED CONTENT BREAKDOWN:**
A classic playback number with strong production values.

**RICH METADATA EXTRACTION:**
**Song Title:** Mera Joota Hai Japani
**Singers:** Mukesh
**Music Director:** Shankar-Jaikishan

**SUMMARY:**
A verified classic film song.";
        let result = parse_content_analysis(response, &insights("old song", "filmi", "la la"), now());
        assert_eq!(result.content_type, ContentType::Song);
        assert_eq!(
            result.rich_analysis.song_title.as_deref(),
            Some("Mera Joota Hai Japani")
        );
        assert_eq!(result.summary, "A verified classic film song.");

        let keys: Vec<&str> = result.table_data.iter().map(|(k, _)| k.as_str()).collect();
        let song_pos = keys.iter().position(|k| *k == "Song Title").unwrap();
        let type_pos = keys.iter().position(|k| *k == "Content Type").unwrap();
        let channel_pos = keys.iter().position(|k| *k == "Channel").unwrap();
        assert!(song_pos < type_pos && type_pos < channel_pos);
    }

    #[test]
    fn news_response_gets_fact_check_and_scores() {
        let response = "\
**CONTENT TYPE: News**

**DETAILED CONTENT BREAKDOWN:**
The segment splices older footage into new narration.

**CREDIBILITY ASSESSMENT:**
Key claims are false and misleading with 82% certainty based on manipulated footage.

**SUMMARY:**
A fabricated news segment.";
        let result = parse_content_analysis(
            response,
            &insights("breaking news", "Daily News", "according to reports"),
            now(),
        );
        assert_eq!(result.content_type, ContentType::News);

        let fc = result.rich_analysis.fact_check_results.as_ref().unwrap();
        assert_eq!(fc.verdict, Verdict::False);
        assert_eq!(fc.confidence, 82);
        assert_eq!(fc.sources.len(), 4);

        let flags = result.rich_analysis.misinformation_flags.as_ref().unwrap();
        assert!(flags.contains(&"false".to_string()));
        assert!(flags.contains(&"manipulated".to_string()));
        assert!(result.rich_analysis.credibility_score.is_some());
        assert!(result
            .rich_analysis
            .transcript_summary
            .as_ref()
            .unwrap()
            .ends_with("..."));
        assert!(result.formatted_analysis.starts_with("📰 **Enhanced Content Analysis**: News"));
        assert!(result.formatted_analysis.contains("⚠️ **Misinformation Flags**"));
    }

    #[test]
    fn missing_sections_leave_scores_unset() {
        let result =
            parse_content_analysis("**CONTENT TYPE: Vlog**", &insights("day 4", "me", "hi"), now());
        assert_eq!(result.content_type, ContentType::Vlog);
        assert!(result.rich_analysis.credibility_score.is_none());
        assert!(result.rich_analysis.misinformation_flags.is_none());
        assert_eq!(
            result.summary,
            "Enhanced comprehensive analysis completed with Gemini 2.5 Pro."
        );
        assert!(result.rich_analysis.popularity.is_some());
    }

    #[test]
    fn fallback_is_marked_failed() {
        let result = fallback_content_analysis();
        assert_eq!(result.content_type, ContentType::Entertainment);
        assert_eq!(result.rich_analysis.credibility_score, Some(0));
        assert_eq!(result.table_data[0].0, "Status");
    }
}
