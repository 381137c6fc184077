//! Duration formatting.
//!
//! All formatters floor-truncate sub-unit remainders and treat negative
//! durations as zero.

const MS_PER_SECOND: i64 = 1_000;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Splits milliseconds into whole hours, minutes and seconds.
const fn split(ms: i64) -> (i64, i64, i64) {
    let total_seconds = if ms < 0 { 0 } else { ms / MS_PER_SECOND };
    (
        total_seconds / SECONDS_PER_HOUR,
        (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        total_seconds % SECONDS_PER_MINUTE,
    )
}

/// Formats milliseconds as a stopwatch reading.
/// Returns "H:MM:SS" if >= 1 hour, "M:SS" otherwise.
pub fn format_long(ms: i64) -> String {
    let (hours, minutes, seconds) = split(ms);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats milliseconds as a compact duration.
/// Returns "Xh Ym" if >= 1 hour, "Xm Ys" otherwise.
pub fn format_short(ms: i64) -> String {
    let (hours, minutes, seconds) = split(ms);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// Formats minutes since midnight as "HH:MM", wrapping past midnight.
pub fn format_clock_minutes(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
