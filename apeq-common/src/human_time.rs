//! Human-readable playback time formatting
//!
//! Provides consistent track time display across the APEQ processes.

/// Format a millisecond position or duration as `MM:SS`, switching to
/// `H:MM:SS` once an hour is reached.
///
/// # Examples
///
/// ```
/// use apeq_common::human_time::format_track_time;
///
/// assert_eq!(format_track_time(0), "00:00");
/// assert_eq!(format_track_time(65_000), "01:05");
/// assert_eq!(format_track_time(3_600_000), "1:00:00");
/// ```
pub fn format_track_time(millis: u64) -> String {
    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
