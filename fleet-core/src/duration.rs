use std::fmt::Write;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;

/// Renders a (possibly fractional) number of nanoseconds as a compact
/// duration string such as `1h2m3.5s`.
///
/// Hour and minute parts are only emitted when non-zero. The seconds part
/// carries up to nine fractional digits with trailing zeros removed, and is
/// always emitted when nothing else was, so a zero duration reads `0s`.
pub fn format_duration_nanos(nanos: f64) -> String {
    let total_seconds = nanos / NANOS_PER_SECOND;

    let whole_seconds = total_seconds.trunc() as u64;
    let hours = whole_seconds / SECONDS_PER_HOUR;
    let minutes = (whole_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE as f64;

    // Writing into a String cannot fail.
    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    if seconds > 0.0 || out.is_empty() {
        let fixed = format!("{seconds:.9}");
        out.push_str(fixed.trim_end_matches('0').trim_end_matches('.'));
        out.push('s');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::format_duration_nanos;

    #[test]
    fn minutes_and_fractional_seconds() {
        assert_eq!(format_duration_nanos(310_123_456_789.0), "5m10.123456789s");
    }

    #[test]
    fn zero_renders_as_zero_seconds() {
        assert_eq!(format_duration_nanos(0.0), "0s");
    }

    #[test]
    fn whole_hours_have_no_suffix() {
        assert_eq!(format_duration_nanos(7_200_000_000_000.0), "2h");
    }

    #[test]
    fn whole_minutes_have_no_seconds() {
        assert_eq!(format_duration_nanos(60_000_000_000.0), "1m");
    }

    #[test]
    fn all_parts() {
        assert_eq!(format_duration_nanos(3_661_250_000_000.0), "1h1m1.25s");
    }

    #[test]
    fn sub_second() {
        assert_eq!(format_duration_nanos(250_000_000.0), "0.25s");
        assert_eq!(format_duration_nanos(1.0), "0.000000001s");
    }

    #[test]
    fn trailing_zeros_are_stripped() {
        assert_eq!(format_duration_nanos(1_500_000_000.0), "1.5s");
        assert_eq!(format_duration_nanos(42_000_000_000.0), "42s");
    }

    #[test]
    fn fractional_mean_below_precision_still_renders() {
        assert_eq!(format_duration_nanos(0.4), "0s");
    }
}
