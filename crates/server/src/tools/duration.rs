use crate::provider::types::{WireDuration, WireInt64};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Normalize a provider duration to fractional seconds.
///
/// `"3.5s"` and `{seconds: 3, nanos: 500000000}` both yield `Some(3.5)`.
/// An absent or unreadable duration yields `None`, never zero.
pub fn duration_to_seconds(duration: Option<&WireDuration>) -> Option<f64> {
    let seconds = match duration? {
        WireDuration::Text(text) => parse_text(text)?,
        WireDuration::Structured { seconds, nanos } => {
            if seconds.is_none() && nanos.is_none() {
                return None;
            }
            let whole = match seconds {
                Some(s) => int64_value(s)?,
                None => 0.0,
            };
            whole + nanos.unwrap_or(0) as f64 / NANOS_PER_SECOND
        }
    };

    seconds.is_finite().then_some(seconds)
}

fn parse_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('s').unwrap_or(trimmed);
    number.trim().parse::<f64>().ok()
}

fn int64_value(value: &WireInt64) -> Option<f64> {
    match value {
        WireInt64::Number(n) => Some(*n as f64),
        WireInt64::Text(s) => s.trim().parse::<i64>().ok().map(|n| n as f64),
    }
}
