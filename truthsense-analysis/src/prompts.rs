//! Prompt assembly for claim, video, classification, frame, and title
//! generations.
//!
//! Each builder produces one flat string in a fixed section order so
//! responses stay parseable by [`crate::parser`] and
//! [`crate::content`]. Conversation memory is folded in as a compact
//! digest rather than raw history.

use chrono::DateTime;
use truthsense_actors::ChatContextData;
use truthsense_sources::NewsContext;
use truthsense_video::VideoInsights;

use crate::model::ContentAnalysisResult;

pub const CLAIM_ANALYSIS_SYSTEM_PROMPT: &str = r#"You are TruthSense AI, an intelligent analysis system powered by Gemini 2.5 Pro. Provide sharp, structured, evidence-based reports when analyzing content.

## CRITICAL REQUIREMENTS:

### 🚫 FORBIDDEN PHRASES (Never use these):
- "This comprehensive assessment considers..."
- "The claim has been thoroughly evaluated..."
- "Multiple independent sources have been consulted..."
- "This reflects the current state of evidence..."
- "Based on the comprehensive analysis..."
- "Advanced AI analysis capabilities..."
- "Real-time verification has been conducted..."
- "The analysis incorporates multiple..."

### ⛔ BANNED SOURCES:
Never cite: Reddit, Quora, BuzzFeed, Amazon comments, fan blogs, Wikipedia user pages, social media posts

### ✅ REQUIRED FORMAT - STRUCTURED POINT-WISE ANALYSIS:

**VERDICT: [TRUE/FALSE/MISLEADING/UNVERIFIABLE]**

**CONFIDENCE: [X]%**

### 🔍 INTELLIGENCE REPORT

**📊 Quick Facts**
• Claim: [Brief statement]
• Source Authority: [High/Medium/Low]
• Evidence Quality: [Strong/Moderate/Weak]

---

### 🎯 Core Analysis

**1. Primary Evidence**
• [Direct, factual finding with specific details]
• [Supporting data point with source]
• [Technical verification result]

**2. Source Verification**
• [Credible source 1 - specific finding]
• [Credible source 2 - specific finding]
• [Institutional backing or expert opinion]

**3. Context & Background**
• [Relevant historical context]
• [Situational factors affecting claim]
• [Timeline of events if applicable]

**4. Red Flags Detected**
• [Specific misinformation indicator 1]
• [Specific misinformation indicator 2]
• [Pattern analysis result]

**5. Supporting Data**
• [Statistical evidence with numbers]
• [Expert opinion with credentials]
• [Institutional verification]

---

### 📌 Key Findings
• ✅ [Confirmed fact 1]
• ✅ [Confirmed fact 2]
• ⚠️ [Concern or limitation]
• ❌ [Debunked claim if applicable]

---

### 🧾 Verification Sources
• ✅ [Credible Source 1] – [Specific finding]
• ✅ [Credible Source 2] – [Specific finding]
• ✅ [Credible Source 3] – [Specific finding]

---

### ✅ Final Assessment
[Clear, direct conclusion with reasoning in 2-3 sentences]

**Confidence**: [X]%
**Reason**: [Specific justification for confidence level]

## RESPONSE REQUIREMENTS:
- Minimum 500 words of substantive analysis
- Use sharp, professional language
- Structure everything in clear bullet points
- Cite only authoritative sources
- Provide specific evidence and data
- Avoid repetitive structures
- Focus on facts, not speculation
- Each point should be concise and actionable"#;

pub const VIDEO_ANALYSIS_SYSTEM_PROMPT: &str = r#"You are TruthSense AI analyzing YouTube content with Gemini 2.5 Pro. Provide sharp, structured video intelligence reports in point-wise format.

## CRITICAL REQUIREMENTS:

### 🚫 FORBIDDEN PHRASES (Never use these):
- "Comprehensive video analysis..."
- "Enhanced content analysis..."
- "The video has been thoroughly evaluated..."
- "Advanced AI detection algorithms..."
- "Real-time verification has been conducted..."
- "Multiple independent sources..."

### ⛔ BANNED SOURCES:
Never cite: Reddit, Quora, BuzzFeed, Amazon comments, fan blogs, Wikipedia user pages, social media posts

### ✅ REQUIRED FORMAT - STRUCTURED POINT-WISE ANALYSIS:

**VERDICT: [TRUE/FALSE/MISLEADING/UNVERIFIABLE]**

**CONFIDENCE: [X]%**

### 🎬 VIDEO INTELLIGENCE REPORT

**🎵 Title**: [Video Title]
**📺 Channel**: [Channel Name]
**🎭 Content Type**: [Song/Movie/News/Vlog/Educational]
**📅 Published**: [Date]
**👁️ Views**: [View Count]

---

### 🔍 Frame-Level Analysis
• **[Timestamp]** [Specific visual observation]
• **[Timestamp]** [Technical authenticity check]
• **[Timestamp]** [Content verification point]
• **[Timestamp]** [Quality assessment finding]

---

### 🎧 Audio/Content Analysis
**Key Quote/Lyric:**
> "[Key quote or lyric from video]"

**Content Breakdown:**
• [Analysis of audio content point 1]
• [Analysis of lyrics or spoken claims point 2]
• [Technical audio quality assessment]
• [Authenticity verification result]

---

### 📊 Engagement Metrics
• **Views**: [Count with analysis]
• **Engagement Rate**: [Percentage with context]
• **Comment Sentiment**: [Score] ([Positive/Negative/Neutral])
• **Virality Score**: [X]/100
• **Subscriber Impact**: [Growth/decline analysis]

---

### 🎭 Speaker/Artist Profile
• **Name**: [Full Name]
• **Background**: [Relevant credentials/history]
• **Authority**: [Expertise level in topic]
• **Track Record**: [Previous accuracy/credibility]
• **Verification Status**: [Official/Verified/Unverified]

---

### 🧾 Fact-Check Results
• ✅ [Verified claim 1 with source]
• ✅ [Verified claim 2 with source]
• ⚠️ [Questionable statement with reasoning]
• ❌ [False information detected with evidence]

---

### 📌 Technical Assessment
• **Video Quality**: [Professional/Amateur/Manipulated]
• **Audio Sync**: [Perfect/Minor Issues/Major Problems]
• **Edit Detection**: [Clean/Basic Cuts/Heavy Manipulation]
• **Deepfake Risk**: [None/Low/Medium/High]
• **Compression Analysis**: [Original/Re-encoded/Multiple generations]

---

### 🔗 Verification Sources
• ✅ [Credible Source 1] – [Specific verification]
• ✅ [Credible Source 2] – [Specific verification]
• ✅ [Credible Source 3] – [Specific verification]

---

### ✅ Final Verdict
[Direct assessment of video authenticity and claims in 2-3 sentences]

**Confidence**: [X]%
**Reason**: [Specific technical and factual justification]

## RESPONSE REQUIREMENTS:
- Minimum 500 words of sharp analysis
- Structure everything in clear bullet points
- Include specific timestamps for video observations
- Cite only institutional/news sources
- Provide technical authenticity assessment
- Use professional, direct language
- Focus on verifiable facts
- Each section should have multiple specific points"#;

pub const CONTENT_CLASSIFICATION_PROMPT: &str = r#"You are an expert content analyst using Gemini 2.5 Pro capabilities for comprehensive YouTube video analysis. Provide detailed, investigative-level analysis with clear numbered points.

## ENHANCED ANALYSIS FRAMEWORK:

### 1. CONTENT TYPE CLASSIFICATION
Determine the primary content type with high precision:
- 🎵 **SONG/MUSIC VIDEO** - Musical content, performances, music videos
- 🎬 **MOVIE SCENE/CLIP** - Film excerpts, movie trailers, cinematic content
- 📰 **NEWS/DOCUMENTARY** - Journalistic content, factual reporting, documentaries
- 🎥 **VLOG/PERSONAL** - Personal content, lifestyle, opinion pieces
- 📚 **EDUCATIONAL** - Tutorials, lectures, instructional content
- 🎭 **ENTERTAINMENT** - Comedy, variety shows, general entertainment

### 2. COMPREHENSIVE CONTENT ANALYSIS

Present analysis in clear, numbered points with blank lines between each:

**CONTENT TYPE: [Type]**

**DETAILED CONTENT BREAKDOWN:**

1. **Primary Classification**
   [Specific content type with reasoning and evidence]

2. **Content Authenticity Assessment**
   [Technical analysis of video/audio quality, editing signs, manipulation indicators]

3. **Source Authority Analysis**
   [Channel credibility, speaker credentials, institutional backing]

4. **Information Accuracy Verification**
   [Fact-checking against reliable sources, claim verification]

5. **Cultural/Historical Context**
   [Relevant background information, significance, impact]

6. **Technical Quality Assessment**
   [Production values, editing quality, professional indicators]

7. **Audience Engagement Analysis**
   [Comment patterns, sentiment, viral potential]

8. **Misinformation Risk Evaluation**
   [Potential for spreading false information, manipulation signs]

**RICH METADATA EXTRACTION:**
[Detailed information based on content type - songs: title, artist, movie details; news: key claims, speakers; etc.]

**CREDIBILITY ASSESSMENT:**
[Comprehensive evaluation of source reliability and content accuracy]

**SUMMARY:**
[2-3 sentence comprehensive overview]

### 3. CONTENT-SPECIFIC REQUIREMENTS:

**FOR SONGS/MUSIC VIDEOS:**
- Complete song identification (title, artist, album, year)
- Movie association (if applicable) with cast and crew details
- Lyrical content analysis and cultural significance
- Production quality and authenticity assessment

**FOR MOVIE SCENES:**
- Film identification with complete metadata
- Scene context and narrative significance
- Cast and crew information
- Production authenticity verification

**FOR NEWS/DOCUMENTARIES:**
- Speaker identification and credential verification
- Fact-checking of key claims against live sources
- Source authority and bias assessment
- Misinformation risk evaluation

**FOR EDUCATIONAL CONTENT:**
- Instructor credentials and expertise verification
- Content accuracy and educational value assessment
- Source material verification

Provide journalist-level detail with specific evidence and clear reasoning. Use conversation context to enhance analysis accuracy."#;

/// Thousands-grouped rendering for counters shown to the model.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// First `max` characters of `s`, always with a trailing ellipsis.
pub fn snippet(s: &str, max: usize) -> String {
    let prefix: String = s.chars().take(max).collect();
    format!("{prefix}...")
}

/// RFC 3339 timestamps render as `YYYY-MM-DD`; anything else passes
/// through untouched.
pub fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Compact digest of the conversation so far: last few queries with
/// their outcomes, recently analyzed videos, and the verdict history.
pub fn build_context_digest(context: &ChatContextData) -> String {
    let mut digest = String::from("\n## CONVERSATION CONTEXT:\n\n");

    if !context.user_queries.is_empty() {
        digest.push_str("### PREVIOUS QUERIES:\n");
        let skip = context.user_queries.len().saturating_sub(3);
        for (i, query) in context.user_queries.iter().skip(skip).enumerate() {
            digest.push_str(&format!("{}. \"{}\"\n", i + 1, query));
            if let Some(response) = context.ai_responses.get(skip + i) {
                digest.push_str(&format!("   Result: {}\n", snippet(response, 100)));
            }
            digest.push('\n');
        }
    }

    if !context.analyzed_videos.is_empty() {
        digest.push_str("### ANALYZED VIDEOS:\n");
        let skip = context.analyzed_videos.len().saturating_sub(2);
        for (i, video) in context.analyzed_videos.iter().skip(skip).enumerate() {
            digest.push_str(&format!(
                "{}. \"{}\" by {}\n   Verdict: {} ({}%)\n",
                i + 1,
                video.title,
                video.channel,
                video.verdict,
                video.confidence
            ));
            if let Some(content_type) = &video.content_type {
                digest.push_str(&format!("   Type: {content_type}\n"));
            }
            digest.push('\n');
        }
    }

    if !context.verdict_history.is_empty() {
        digest.push_str("### VERDICT HISTORY:\n");
        let skip = context.verdict_history.len().saturating_sub(3);
        for (i, record) in context.verdict_history.iter().skip(skip).enumerate() {
            digest.push_str(&format!(
                "{}. \"{}\" → {} ({}%)\n",
                i + 1,
                record.claim,
                record.verdict,
                record.confidence
            ));
        }
        digest.push('\n');
    }

    digest
}

fn push_authoritative_sources(prompt: &mut String, news: &NewsContext) {
    if news.credible_sources.is_empty() {
        return;
    }
    prompt.push_str("## AUTHORITATIVE SOURCES:\n");
    for (i, source) in news.credible_sources.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, source));
    }
    prompt.push('\n');
}

/// Full prompt for a text-claim analysis. Attached image names are
/// noted so the model ties each inline image part back to the claim.
pub fn build_claim_prompt(
    query: &str,
    news: &NewsContext,
    chat_context: Option<&ChatContextData>,
    image_names: &[String],
) -> String {
    let mut prompt = format!("{CLAIM_ANALYSIS_SYSTEM_PROMPT}\n\n");

    if let Some(context) = chat_context {
        prompt.push_str(&build_context_digest(context));
    }

    prompt.push_str(&format!("## ANALYSIS REQUEST:\n\"{query}\"\n\n"));
    prompt.push_str(&format!(
        "## LIVE VERIFICATION DATA:\n\n{}",
        news.formatted_context
    ));
    push_authoritative_sources(&mut prompt, news);
    prompt.push_str(
        "## ANALYSIS TASK:\nProvide sharp, professional analysis using the required structured point-wise format. Minimum 500 words. Use direct language and cite only credible sources.\n\n",
    );

    for name in image_names {
        prompt.push_str(&format!(
            "\n**IMAGE ANALYSIS**: Analyze attached image \"{name}\" for authenticity and misinformation content.\n"
        ));
    }

    prompt
}

/// Full prompt for a video intelligence report: classification results,
/// metadata, transcript, engagement, top comments, then live data.
pub fn build_video_prompt(
    query: &str,
    insights: &VideoInsights,
    content: &ContentAnalysisResult,
    news: &NewsContext,
    chat_context: Option<&ChatContextData>,
) -> String {
    let mut prompt = format!("{VIDEO_ANALYSIS_SYSTEM_PROMPT}\n\n");

    if let Some(context) = chat_context {
        prompt.push_str(&build_context_digest(context));
    }

    prompt.push_str(&format!("## VIDEO ANALYSIS REQUEST:\n\"{query}\"\n\n"));

    prompt.push_str("## CONTENT CLASSIFICATION RESULTS:\n");
    prompt.push_str(&format!("**Content Type**: {}\n", content.content_type.label()));
    prompt.push_str(&format!("**Summary**: {}\n\n", content.summary));
    if !content.table_data.is_empty() {
        prompt.push_str("**Key Information**:\n");
        for (key, value) in &content.table_data {
            prompt.push_str(&format!("- {key}: {value}\n"));
        }
        prompt.push('\n');
    }

    let video = &insights.video;
    prompt.push_str("## VIDEO METADATA:\n");
    prompt.push_str(&format!("- **Title**: {}\n", video.title));
    prompt.push_str(&format!("- **Channel**: {}\n", video.channel_title));
    prompt.push_str(&format!("- **Published**: {}\n", format_date(&video.published_at)));
    prompt.push_str(&format!("- **Views**: {}\n", group_thousands(video.view_count)));
    prompt.push_str(&format!("- **Likes**: {}\n", group_thousands(video.like_count)));
    prompt.push_str(&format!(
        "- **Comments**: {}\n",
        group_thousands(video.comment_count)
    ));
    prompt.push_str(&format!("- **Duration**: {}\n\n", video.duration));

    prompt.push_str(&format!(
        "## TRANSCRIPT FOR VERIFICATION:\n{}\n\n",
        insights.transcript
    ));

    let sentiment = &insights.sentiment;
    prompt.push_str("## ENGAGEMENT ANALYSIS:\n");
    prompt.push_str(&format!("- **Overall Sentiment**: {}\n", sentiment.overall));
    prompt.push_str(&format!("- **Sentiment Score**: {:.2}\n", sentiment.score));
    prompt.push_str(&format!(
        "- **Distribution**: {} positive, {} negative, {} neutral\n\n",
        sentiment.distribution.positive,
        sentiment.distribution.negative,
        sentiment.distribution.neutral
    ));

    if !insights.comments.is_empty() {
        prompt.push_str("## TOP COMMENTS:\n");
        for (i, comment) in insights.comments.iter().take(5).enumerate() {
            prompt.push_str(&format!(
                "{}. **{}** ({} likes): \"{}\"\n",
                i + 1,
                comment.author,
                comment.like_count,
                snippet(&comment.text, 100)
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "## LIVE VERIFICATION DATA:\n{}\n",
        news.formatted_context
    ));
    push_authoritative_sources(&mut prompt, news);
    prompt.push_str(
        "## ANALYSIS TASK:\nProvide sharp YouTube video intelligence report using the required structured point-wise format. Minimum 500 words. Include specific timestamps and technical assessment.\n\n",
    );

    prompt
}

/// True when the video looks like news coverage and deserves a live
/// verification pass during classification.
pub fn is_news_content(insights: &VideoInsights) -> bool {
    let title = insights.video.title.to_lowercase();
    let channel = insights.video.channel_title.to_lowercase();
    let description = insights.video.description.to_lowercase();
    let transcript = insights.transcript.to_lowercase();

    title.contains("news")
        || title.contains("breaking")
        || channel.contains("news")
        || description.contains("news")
        || transcript.contains("report")
        || transcript.contains("according to")
}

/// Full prompt for content classification. `news` carries the live
/// verification block for news-looking videos and is `None` otherwise.
pub fn build_classification_prompt(
    insights: &VideoInsights,
    chat_context: Option<&ChatContextData>,
    news: Option<&NewsContext>,
) -> String {
    let mut prompt = format!("{CONTENT_CLASSIFICATION_PROMPT}\n\n");

    if let Some(context) = chat_context {
        prompt.push_str("## CONVERSATION CONTEXT FOR ENHANCED ANALYSIS:\n");
        if !context.user_queries.is_empty() {
            let skip = context.user_queries.len().saturating_sub(3);
            let recent: Vec<&str> = context.user_queries[skip..]
                .iter()
                .map(String::as_str)
                .collect();
            prompt.push_str(&format!("Previous queries: {}\n", recent.join(", ")));
        }
        if !context.analyzed_videos.is_empty() {
            let skip = context.analyzed_videos.len().saturating_sub(2);
            let recent: Vec<String> = context.analyzed_videos[skip..]
                .iter()
                .map(|v| format!("\"{}\" ({})", v.title, v.verdict.to_string().to_lowercase()))
                .collect();
            prompt.push_str(&format!(
                "Previously analyzed videos: {}\n",
                recent.join(", ")
            ));
        }
        prompt.push('\n');
    }

    let video = &insights.video;
    prompt.push_str("## COMPREHENSIVE VIDEO METADATA:\n");
    prompt.push_str(&format!("- **Title**: {}\n", video.title));
    prompt.push_str(&format!("- **Channel**: {}\n", video.channel_title));
    prompt.push_str(&format!("- **Published**: {}\n", format_date(&video.published_at)));
    prompt.push_str(&format!("- **Views**: {}\n", group_thousands(video.view_count)));
    prompt.push_str(&format!("- **Likes**: {}\n", group_thousands(video.like_count)));
    prompt.push_str(&format!(
        "- **Comments**: {}\n",
        group_thousands(video.comment_count)
    ));
    prompt.push_str(&format!("- **Duration**: {}\n", video.duration));
    prompt.push_str(&format!(
        "- **Description**: {}\n\n",
        snippet(&video.description, 800)
    ));

    prompt.push_str(&format!(
        "## COMPLETE TRANSCRIPT FOR ANALYSIS:\n{}\n\n",
        insights.transcript
    ));

    let sentiment = &insights.sentiment;
    prompt.push_str("## ENHANCED COMMENT SENTIMENT ANALYSIS:\n");
    prompt.push_str(&format!("- **Overall Sentiment**: {}\n", sentiment.overall));
    prompt.push_str(&format!("- **Sentiment Score**: {:.3}\n", sentiment.score));
    prompt.push_str(&format!(
        "- **Distribution**: {} positive, {} negative, {} neutral\n",
        sentiment.distribution.positive,
        sentiment.distribution.negative,
        sentiment.distribution.neutral
    ));
    prompt.push_str(&format!(
        "- **Total Comments Analyzed**: {}\n\n",
        insights.comments.len()
    ));

    if !insights.comments.is_empty() {
        prompt.push_str("## REPRESENTATIVE COMMENTS FOR CONTEXT:\n");
        for (i, comment) in insights.comments.iter().take(10).enumerate() {
            prompt.push_str(&format!(
                "{}. **{}** ({} likes): \"{}\"\n",
                i + 1,
                comment.author,
                comment.like_count,
                snippet(&comment.text, 200)
            ));
        }
        prompt.push('\n');
    }

    if let Some(news) = news {
        if !news.formatted_context.is_empty() {
            prompt.push_str(&format!(
                "## LIVE NEWS VERIFICATION CONTEXT:\n{}\n",
                news.formatted_context
            ));
            prompt.push_str("## AUTHORITATIVE SOURCES FOR FACT-CHECKING:\n");
            for (i, source) in news.credible_sources.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, source));
            }
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "## ENHANCED ANALYSIS TASK:\nProvide comprehensive content analysis using the numbered format above. Be thorough, accurate, and provide investigative-level detail with specific evidence.\n\n",
    );

    prompt
}

/// Prompt for naming a conversation after its first message.
pub fn build_title_prompt(first_message: &str) -> String {
    format!(
        "Generate a concise, descriptive title (4-6 words max) for a fact-checking conversation that starts with: \"{first_message}\"\n\n\
Examples:\n\
- \"Climate Change Verification\"\n\
- \"Vaccine Safety Analysis\" \n\
- \"Election Results Fact-Check\"\n\
- \"Social Media Claim Review\"\n\
- \"News Article Verification\"\n\
- \"YouTube Video Analysis\"\n\
- \"Deepfake Detection Report\"\n\n\
Return only the title, no quotes or extra text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthsense_actors::{AnalyzedVideo, VerdictRecord};
    use truthsense_common::Verdict;

    fn context() -> ChatContextData {
        ChatContextData {
            user_queries: vec!["q1".into(), "q2".into(), "q3".into(), "q4".into()],
            ai_responses: vec!["r1".into(), "r2".into(), "r3".into(), "r4".into()],
            analyzed_videos: vec![
                AnalyzedVideo {
                    title: "old clip".into(),
                    channel: "a".into(),
                    verdict: Verdict::True,
                    confidence: 90,
                    content_type: None,
                },
                AnalyzedVideo {
                    title: "viral clip".into(),
                    channel: "b".into(),
                    verdict: Verdict::Misleading,
                    confidence: 72,
                    content_type: Some("news".into()),
                },
            ],
            verdict_history: vec![VerdictRecord {
                claim: "c1".into(),
                verdict: Verdict::False,
                confidence: 88,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn digest_keeps_only_recent_history() {
        let digest = build_context_digest(&context());
        assert!(digest.starts_with("\n## CONVERSATION CONTEXT:\n\n"));
        assert!(!digest.contains("\"q1\""));
        assert!(digest.contains("1. \"q2\"\n   Result: r2...\n"));
        assert!(digest.contains("3. \"q4\""));
        assert!(digest.contains("\"viral clip\" by b\n   Verdict: MISLEADING (72%)\n   Type: news"));
        assert!(digest.contains("### VERDICT HISTORY:\n1. \"c1\" → FALSE (88%)"));
    }

    #[test]
    fn claim_prompt_orders_sections() {
        let news = NewsContext {
            credible_sources: vec!["https://reuters.com/a".into()],
            formatted_context: "## LIVE NEWS ARTICLES\n".into(),
            ..Default::default()
        };
        let prompt = build_claim_prompt("did X happen", &news, Some(&context()), &[]);

        let request = prompt.find("## ANALYSIS REQUEST:").unwrap();
        let live = prompt.find("## LIVE VERIFICATION DATA:").unwrap();
        let sources = prompt.find("## AUTHORITATIVE SOURCES:").unwrap();
        let task = prompt.find("## ANALYSIS TASK:").unwrap();
        assert!(prompt.find("## CONVERSATION CONTEXT:").unwrap() < request);
        assert!(request < live && live < sources && sources < task);
        assert!(prompt.contains("1. https://reuters.com/a"));
    }

    #[test]
    fn claim_prompt_skips_empty_source_list_and_notes_images() {
        let prompt = build_claim_prompt(
            "claim",
            &NewsContext::default(),
            None,
            &["photo.png".to_string()],
        );
        assert!(!prompt.contains("## AUTHORITATIVE SOURCES:"));
        assert!(!prompt.contains("## CONVERSATION CONTEXT:"));
        assert!(prompt.contains("**IMAGE ANALYSIS**: Analyze attached image \"photo.png\""));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_500_000), "1,500,000");
    }

    #[test]
    fn news_detection_checks_all_signals() {
        use truthsense_video::{SentimentSummary, VideoDetails, VideoInsights};
        let base = VideoDetails {
            id: "x".into(),
            title: "cat video".into(),
            description: "cute".into(),
            channel_title: "pets".into(),
            published_at: String::new(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            duration: "PT1M".into(),
            thumbnail_url: String::new(),
            is_short: false,
        };
        let mut insights = VideoInsights {
            video: base,
            transcript: "meow".into(),
            comments: vec![],
            sentiment: SentimentSummary::default(),
        };
        assert!(!is_news_content(&insights));

        insights.video.title = "BREAKING update".into();
        assert!(is_news_content(&insights));

        insights.video.title = "cat video".into();
        insights.transcript = "according to officials".into();
        assert!(is_news_content(&insights));
    }
}
