use crate::types::{Candidate, RateLimitSignal, ResolvedTrack};

/// Seconds to wait when a 429 carries no usable `Retry-After` value.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Extracts the release year from a `YYYY[-MM[-DD]]` date string.
///
/// Returns `None` for anything whose first four characters are not digits,
/// including empty and short strings.
pub fn release_year(date: &str) -> Option<i32> {
    let year = date.get(..4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

pub fn parse_retry_after(header: Option<&str>) -> RateLimitSignal {
    let retry_after_seconds = header
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    RateLimitSignal {
        retry_after_seconds,
    }
}

pub fn has_preview(track: &ResolvedTrack) -> bool {
    track
        .preview_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty())
}

/// Share of the quota collected so far, capped at 100.
pub fn progress_percent(collected: usize, target: usize) -> u8 {
    if target == 0 {
        return 100;
    }
    (collected.saturating_mul(100) / target).min(100) as u8
}

pub fn search_query(candidate: &Candidate) -> String {
    format!("{} {}", candidate.title, candidate.artist)
}
