//! ISO 8601 duration handling.

use regex::Regex;
use std::sync::OnceLock;

/// Videos at or under this length count as short-form.
pub const SHORT_FORM_MAX_SECS: u64 = 60;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("static pattern"))
}

/// Parse an ISO 8601 duration (`PT1H2M3S`) into seconds. Unparseable
/// input is 0, matching the degraded handling everywhere else.
pub fn parse_iso8601_secs(duration: &str) -> u64 {
    let Some(caps) = duration_pattern().captures(duration) else {
        return 0;
    };
    let field = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    field(1) * 3600 + field(2) * 60 + field(3)
}

/// Short-form when the runtime is one minute or less.
pub fn is_short_form(duration: &str) -> bool {
    parse_iso8601_secs(duration) <= SHORT_FORM_MAX_SECS
}
