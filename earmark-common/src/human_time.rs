//! Flexible time-of-recording parsing
//!
//! Annotation sources write timestamps inconsistently: plain seconds
//! ("83.5"), minutes and seconds ("1:23.5"), or hours, minutes, and seconds
//! ("0:01:23"). `parse_human_time` accepts all three and degrades to zero on
//! malformed input so one bad cell never aborts a batch load.

/// Parse a human-entered time string into seconds.
///
/// Accepted forms:
/// - `"83.5"` — plain seconds
/// - `"1:23.5"` — MM:SS
/// - `"0:01:23"` — HH:MM:SS
///
/// Any component may itself be fractional. Malformed input (empty,
/// non-numeric, more than two colons) yields `0.0` rather than an error.
///
/// # Examples
///
/// ```
/// use earmark_common::human_time::parse_human_time;
///
/// assert_eq!(parse_human_time("83.5"), 83.5);
/// assert_eq!(parse_human_time("1:23.5"), 83.5);
/// assert_eq!(parse_human_time("0:01:23"), 83.0);
/// assert_eq!(parse_human_time("not a time"), 0.0);
/// ```
pub fn parse_human_time(text: &str) -> f64 {
    let parts: Vec<&str> = text.trim().split(':').collect();

    let parsed = match parts.as_slice() {
        [secs] => parse_component(secs),
        [mins, secs] => sum_components(&[(mins, 60.0), (secs, 1.0)]),
        [hours, mins, secs] => {
            sum_components(&[(hours, 3600.0), (mins, 60.0), (secs, 1.0)])
        }
        _ => None,
    };

    parsed.unwrap_or(0.0)
}

fn parse_component(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn sum_components(parts: &[(&str, f64)]) -> Option<f64> {
    let mut total = 0.0;
    for (text, scale) in parts {
        total += parse_component(text)? * scale;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse_human_time("0"), 0.0);
        assert_eq!(parse_human_time("45"), 45.0);
        assert_eq!(parse_human_time("83.5"), 83.5);
        assert_eq!(parse_human_time("0.125"), 0.125);
    }

    #[test]
    fn test_minutes_seconds() {
        assert_eq!(parse_human_time("1:23"), 83.0);
        assert_eq!(parse_human_time("1:23.5"), 83.5);
        assert_eq!(parse_human_time("0:05"), 5.0);
        assert_eq!(parse_human_time("10:00"), 600.0);
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_eq!(parse_human_time("0:01:23"), 83.0);
        assert_eq!(parse_human_time("1:00:00"), 3600.0);
        assert_eq!(parse_human_time("2:30:15"), 9015.0);
    }

    #[test]
    fn test_fractional_components() {
        // Each component converts independently, then the parts sum
        assert_eq!(parse_human_time("1.5:00"), 90.0);
        assert_eq!(parse_human_time("0:0.5:00"), 30.0);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_human_time("  83.5  "), 83.5);
        assert_eq!(parse_human_time(" 1 : 23 "), 83.0);
    }

    #[test]
    fn test_malformed_yields_zero() {
        assert_eq!(parse_human_time(""), 0.0);
        assert_eq!(parse_human_time("not a time"), 0.0);
        assert_eq!(parse_human_time("1:xx"), 0.0);
        assert_eq!(parse_human_time("::"), 0.0);
        assert_eq!(parse_human_time("1:2:3:4"), 0.0);
    }
}
