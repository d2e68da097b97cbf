use crate::config::{MAX_DELAY_SEC, MIN_HEAT_COUNT};
use crate::error::SessionError;
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for delay parsing
static DELAY_SEC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s*s$").unwrap());
static DELAY_MIN_SEC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)m(?:\s*(\d+)s)?$").unwrap());
static DELAY_COLON_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d{2})$").unwrap());

/// Parse an integer field that has a lower bound only.
///
/// Parses as `i64` first so that "-2" is reported as below the minimum
/// rather than as "not a number".
pub fn validate_min_integer(input: &str, min: i64, field_name: &str) -> Result<u32, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }
    let val: i64 = trimmed
        .parse()
        .map_err(|_| format!("{} must be a valid number", field_name))?;
    if val < min {
        return Err(format!("{} must be at least {}", field_name, min));
    }
    u32::try_from(val).map_err(|_| format!("{} cannot exceed {}", field_name, u32::MAX))
}

/// Validate the heat count field: any positive integer.
pub fn validate_heat_count(input: &str) -> Result<u32, SessionError> {
    validate_min_integer(input, MIN_HEAT_COUNT as i64, "Heat count")
        .map_err(SessionError::InvalidHeatCount)
}

/// Parse a delay value into whole seconds.
///
/// Supported formats:
/// - Pure number: "10" (seconds)
/// - Seconds: "10s"
/// - Minutes with optional seconds: "1m", "1m30s", "1m 30s"
/// - Colon format: "1:30" (minutes:seconds)
///
/// # Examples
/// ```
/// use heat_timer::utils::parse_delay_secs;
/// assert_eq!(parse_delay_secs("10"), Ok(10));
/// assert_eq!(parse_delay_secs("1m30s"), Ok(90));
/// assert_eq!(parse_delay_secs("1:30"), Ok(90));
/// ```
pub fn parse_delay_secs(input: &str) -> Result<u32, SessionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidDelay("delay cannot be empty".into()));
    }

    let secs = if let Ok(secs) = trimmed.parse::<u32>() {
        secs
    } else if let Some(captures) = DELAY_SEC_REGEX.captures(trimmed) {
        parse_component(&captures[1])?
    } else if let Some(captures) = DELAY_MIN_SEC_REGEX.captures(trimmed) {
        let minutes = parse_component(&captures[1])?;
        let seconds = match captures.get(2) {
            Some(m) => parse_component(m.as_str())?,
            None => 0,
        };
        minutes_and_seconds(minutes, seconds)?
    } else if let Some(captures) = DELAY_COLON_REGEX.captures(trimmed) {
        let minutes = parse_component(&captures[1])?;
        let seconds = parse_component(&captures[2])?;
        minutes_and_seconds(minutes, seconds)?
    } else {
        return Err(SessionError::InvalidDelay(format!(
            "'{}' is not a delay. Use: 10, 10s, 1m30s, or 1:30",
            trimmed
        )));
    };

    if secs == 0 {
        return Err(SessionError::InvalidDelay("delay must be at least 1 second".into()));
    }
    if secs > MAX_DELAY_SEC {
        return Err(SessionError::InvalidDelay(format!(
            "delay cannot exceed {} seconds",
            MAX_DELAY_SEC
        )));
    }
    Ok(secs)
}

fn parse_component(digits: &str) -> Result<u32, SessionError> {
    digits
        .parse()
        .map_err(|_| SessionError::InvalidDelay(format!("'{}' is out of range", digits)))
}

fn minutes_and_seconds(minutes: u32, seconds: u32) -> Result<u32, SessionError> {
    if seconds > 59 {
        return Err(SessionError::InvalidDelay(format!(
            "invalid seconds: {} (must be 0-59)",
            seconds
        )));
    }
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| SessionError::InvalidDelay("delay is too large".into()))
}

/// Elapsed milliseconds as whole hundredths of a second, ties rounded up.
pub fn elapsed_hundredths(elapsed_ms: f64) -> u64 {
    (elapsed_ms.max(0.0) / 10.0).round() as u64
}

/// Format elapsed milliseconds as seconds with two decimals ("12.34").
pub fn format_elapsed(elapsed_ms: f64) -> String {
    format_hundredths(elapsed_hundredths(elapsed_ms))
}

pub fn format_hundredths(hundredths: u64) -> String {
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Label shown in the delay selector for a number of seconds.
pub fn delay_label(secs: u32) -> String {
    if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{} sec", secs)
    }
}
