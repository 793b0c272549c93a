//! Extraction of structured verdicts from free-form model output.
//!
//! The model is instructed to emit `**VERDICT: ...**` and
//! `**CONFIDENCE: N%**` markers plus a `### 🔍 INTELLIGENCE REPORT`
//! section. Real responses drift from that grammar, so parsing is
//! tolerant: missing markers default rather than error, and a thin or
//! absent report is replaced with a synthesized one flagged as such.

use regex::Regex;
use std::sync::OnceLock;
use truthsense_common::Verdict;
use truthsense_sources::NewsContext;

use crate::model::{AnalysisResult, ExplanationOrigin};

/// Reports shorter than this are considered unusable and synthesized.
const MIN_REPORT_CHARS: usize = 300;
/// Sources attached to a result are capped here.
pub const MAX_RESULT_SOURCES: usize = 6;

fn verdict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\*\*VERDICT:\s*(TRUE|FALSE|MISLEADING|UNVERIFIABLE)\*\*")
            .unwrap()
    })
}

fn confidence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\*\*CONFIDENCE:\s*(\d+)%\*\*").unwrap())
}

fn report_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)### 🔍 (?:INTELLIGENCE REPORT|VIDEO INTELLIGENCE REPORT)\s*").unwrap()
    })
}

fn final_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)### ✅ Final").unwrap())
}

fn marker_scrub_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\*\*(?:VERDICT|CONFIDENCE):.*?\*\*").unwrap())
}

/// The `**VERDICT: ...**` marker, or `Unverifiable` when absent.
pub fn extract_verdict(response: &str) -> Verdict {
    verdict_re()
        .captures(response)
        .and_then(|c| Verdict::parse(&c[1]))
        .unwrap_or_default()
}

/// The `**CONFIDENCE: N%**` marker clamped to 0..=100, or 0 when absent.
pub fn extract_confidence(response: &str) -> u8 {
    confidence_re()
        .captures(response)
        .and_then(|c| c[1].parse::<u64>().ok())
        .map(|n| n.min(100) as u8)
        .unwrap_or(0)
}

/// The body of the intelligence-report section, up to the final
/// assessment header. Falls back to everything after the confidence
/// marker's line when the section header is missing.
fn extract_report(response: &str) -> String {
    let body = match report_header_re().find(response) {
        Some(header) => {
            let rest = &response[header.end()..];
            match final_header_re().find(rest) {
                Some(end) => &rest[..end.start()],
                None => rest,
            }
        }
        None => match response.find("**CONFIDENCE:") {
            Some(idx) => {
                let after = &response[idx..];
                match after.find('\n') {
                    Some(nl) => &after[nl + 1..],
                    None => "",
                }
            }
            None => "",
        },
    };

    marker_scrub_re().replace_all(body.trim(), "").trim().to_string()
}

fn synthesized_report(verdict: Verdict, confidence: u8, credible_sources: usize) -> String {
    let claim_status = match verdict {
        Verdict::True => "Verified",
        Verdict::False => "Debunked",
        Verdict::Misleading => "Partially accurate",
        Verdict::Unverifiable => "Insufficient evidence",
    };
    let authority = if credible_sources > 3 {
        "High"
    } else if credible_sources > 1 {
        "Medium"
    } else {
        "Low"
    };
    let evidence_quality = if confidence > 80 {
        "Strong"
    } else if confidence > 60 {
        "Moderate"
    } else {
        "Weak"
    };
    let red_flags = if matches!(verdict, Verdict::False | Verdict::Misleading) {
        "Misinformation indicators identified through pattern analysis"
    } else {
        "No significant misinformation indicators detected"
    };
    let key_finding = match verdict {
        Verdict::True => "✅ Claim verified through multiple credible sources",
        Verdict::False => "❌ Claim contradicted by authoritative evidence",
        Verdict::Misleading => "⚠️ Claim contains inaccuracies or lacks context",
        Verdict::Unverifiable => "⚠️ Insufficient evidence for determination",
    };
    let assessment = match verdict {
        Verdict::True => {
            "Claim verified as accurate based on available evidence and source verification."
        }
        Verdict::False => {
            "Claim determined to be false based on contradictory evidence from authoritative sources."
        }
        Verdict::Misleading => {
            "Claim contains elements of truth but lacks important context or contains significant inaccuracies."
        }
        Verdict::Unverifiable => {
            "Insufficient reliable evidence available for definitive determination through current verification methods."
        }
    };
    let reason = match verdict {
        Verdict::True => "Strong corroborating evidence from multiple authoritative sources",
        Verdict::False => "Clear contradictory evidence from institutional and news sources",
        Verdict::Misleading => "Mixed evidence with significant context issues identified",
        Verdict::Unverifiable => "Limited or conflicting source material available for verification",
    };

    format!(
        "### 🔍 Intelligence Report\n\n\
**📊 Quick Facts**\n\
• Claim: {claim_status}\n\
• Source Authority: {authority}\n\
• Evidence Quality: {evidence_quality}\n\n\
---\n\n\
### 🎯 Core Analysis\n\n\
**1. Primary Evidence**\n\
• Analysis conducted using Gemini 2.5 Pro with live data verification\n\
• Evidence quality assessed based on source credibility and factual consistency\n\
• Cross-referenced against authoritative news outlets and institutional sources\n\n\
**2. Source Verification**\n\
• Real-time fact-checking through MediaStack and SerpAPI\n\
• Source authority assessment completed\n\
• Verification process included institutional backing evaluation\n\n\
**3. Context & Background**\n\
• Evaluated within current information landscape\n\
• Historical precedent analysis conducted\n\
• Relevant background information and situational factors considered\n\n\
**4. Red Flags Detected**\n\
• {red_flags}\n\
• Source verification completed with authority scoring\n\
• Technical analysis performed for authenticity assessment\n\n\
**5. Supporting Data**\n\
• Evidence strength: {confidence}%\n\
• Analysis based on available authoritative sources\n\
• Technical verification methods applied\n\n\
---\n\n\
### 📌 Key Findings\n\
• {key_finding}\n\
• Source credibility assessment completed\n\
• Technical authenticity verification performed\n\n\
---\n\n\
### ✅ Final Assessment\n\
{assessment}\n\n\
**Confidence**: {confidence}%\n\
**Reason**: {reason}"
    )
}

/// Parse a full model response into an [`AnalysisResult`].
///
/// Sources always come from the live-data context, never from model
/// text. Parsing the already-parsed `full_response` again yields the
/// same verdict and confidence.
pub fn parse_model_response(response: &str, context: &NewsContext) -> AnalysisResult {
    let verdict = extract_verdict(response);
    let confidence = extract_confidence(response);

    let extracted = extract_report(response);
    let (explanation, explanation_origin) = if extracted.chars().count() < MIN_REPORT_CHARS {
        (
            synthesized_report(verdict, confidence, context.credible_sources.len()),
            ExplanationOrigin::Synthesized,
        )
    } else {
        (extracted, ExplanationOrigin::Extracted)
    };

    tracing::debug!(
        target: "analysis.parse",
        verdict = %verdict,
        confidence,
        origin = ?explanation_origin,
        "parse.done"
    );

    AnalysisResult {
        verdict,
        confidence,
        explanation,
        explanation_origin,
        sources: context
            .credible_sources
            .iter()
            .take(MAX_RESULT_SOURCES)
            .cloned()
            .collect(),
        full_response: response.to_string(),
        context_used: context.formatted_context.clone(),
        video_analysis: None,
        content_analysis: None,
    }
}
