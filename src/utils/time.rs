//! Duration formatting utilities

/// Format a duration in seconds as `H:MM:SS`, or `M:SS` under an hour.
///
/// Matches the progress display convention: whole seconds, no padding on
/// the leading unit.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
