//! YouTube URL detection and video-ID extraction.

use regex::Regex;
use std::sync::OnceLock;

fn id_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Regular watch/share/embed URLs
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
            r"youtube\.com/watch\?.*v=([^&\n?#]+)",
            // Shorts URLs
            r"youtube\.com/shorts/([^&\n?#]+)",
            r"youtu\.be/shorts/([^&\n?#]+)",
            // Mobile URLs
            r"m\.youtube\.com/watch\?.*v=([^&\n?#]+)",
            r"m\.youtube\.com/shorts/([^&\n?#]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern"))
        .collect()
    })
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:https?://)?(?:www\.|m\.)?(?:youtube\.com|youtu\.be)(?:/watch\?v=|/embed/|/shorts/|/)",
        )
        .expect("static pattern")
    })
}

fn shorts_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:youtube\.com/shorts/|youtu\.be/shorts/)").expect("static pattern")
    })
}

/// Extract the video ID from any supported YouTube URL form.
pub fn extract_video_id(url: &str) -> Option<String> {
    for pattern in id_patterns() {
        if let Some(caps) = pattern.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Does free-form text mention a YouTube URL at all?
pub fn contains_youtube_url(text: &str) -> bool {
    url_pattern().is_match(text)
}

/// Is this URL in Shorts form? (Final shortness is decided by duration.)
pub fn is_shorts_url(url: &str) -> bool {
    shorts_pattern().is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ids_from_all_url_forms() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://www.youtube.com/watch?list=PL1&v=abc123def45", "abc123def45"),
            ("https://www.youtube.com/shorts/xyz987", "xyz987"),
            ("https://youtu.be/shorts/xyz987", "xyz987"),
            ("https://m.youtube.com/watch?v=mobile12345", "mobile12345"),
            ("https://m.youtube.com/shorts/mobile12345", "mobile12345"),
        ];
        for (url, want) in cases {
            assert_eq!(extract_video_id(url).as_deref(), Some(want), "{url}");
        }
    }

    #[test]
    fn rejects_non_video_urls() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id("just some text"), None);
    }

    #[test]
    fn detects_youtube_urls_in_text() {
        assert!(contains_youtube_url("check this out youtube.com/watch?v=abc"));
        assert!(contains_youtube_url("HTTPS://YOUTU.BE/abc"));
        assert!(!contains_youtube_url("is the moon landing fake?"));
    }

    #[test]
    fn shorts_url_detection() {
        assert!(is_shorts_url("https://www.youtube.com/shorts/abc"));
        assert!(!is_shorts_url("https://www.youtube.com/watch?v=abc"));
    }
}
