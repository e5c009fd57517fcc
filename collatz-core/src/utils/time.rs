use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationStyle {
    /// `12m3.250s`
    Minutes,
    /// `1d 4:12:3.250`
    #[default]
    Days,
}

/// Renders a wall-clock duration for the result record.
///
/// Only the seconds component carries a fraction; hours and minutes are
/// printed without padding.
pub fn format_duration(elapsed: Duration, style: DurationStyle) -> String {
    let total_secs = elapsed.as_secs();
    let fraction = f64::from(elapsed.subsec_nanos()) / 1e9;
    let minutes = total_secs / 60;
    let seconds = (total_secs % 60) as f64 + fraction;

    match style {
        DurationStyle::Minutes => format!("{minutes}m{seconds:.3}s"),
        DurationStyle::Days => {
            let hours = minutes / 60;
            let days = hours / 24;
            format!("{days}d {}:{}:{seconds:.3}", hours % 24, minutes % 60)
        }
    }
}
