//! Per-token type inference for delimited-text fields.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. the token is trimmed;
//! 2. an empty token is `Null`;
//! 3. `true` and `false` are booleans;
//! 4. `NaN` is a NaN number;
//! 5. a token that coerces to a number as a whole is a `Number`;
//! 6. a token matching the ISO-8601-like date pattern is a `Date`;
//! 7. anything else is kept as the original, untrimmed `String`.
//!
//! Literals are checked before numeric coercion and numbers before dates, so
//! a bare `2020` is the number 2020 while `2020-01` is a date.
//!
//! # Dates
//!
//! Dates without a zone designator are read as UTC wall-clock values;
//! `Z` and `±HH:MM` suffixes are kept as a fixed offset. The host timezone
//! never influences the result. Tokens that match the pattern but name an
//! impossible calendar value (month 13, hour 25) are not dates.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use regex::{Captures, Regex};

use super::Value;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([-+][0-9]{2})?([0-9]{4})(?:-([0-9]{2})(?:-([0-9]{2}))?)?(?:T([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]{3}))?)?(Z|[-+][0-9]{2}:[0-9]{2})?)?$",
    )
    .expect("date pattern is a valid regex")
});

/// Infers the typed value of a single text token.
///
/// Total and deterministic: every input yields exactly one [`Value`].
///
/// # Example
/// ```
/// use vega_datasets::record::{infer_value, Value};
///
/// assert_eq!(infer_value(" 42 "), Value::Number(42.0));
/// assert_eq!(infer_value("42abc"), Value::String("42abc".into()));
/// assert_eq!(infer_value(""), Value::Null);
/// ```
pub fn infer_value(token: &str) -> Value {
    let trimmed = trim_token(token);

    if trimmed.is_empty() {
        Value::Null
    } else if trimmed == "true" {
        Value::Bool(true)
    } else if trimmed == "false" {
        Value::Bool(false)
    } else if trimmed == "NaN" {
        Value::Number(f64::NAN)
    } else if let Some(number) = coerce_number(trimmed) {
        Value::Number(number)
    } else if let Some(date) = parse_date(trimmed) {
        Value::Date(date)
    } else {
        Value::String(token.to_string())
    }
}

/// Trims ECMAScript whitespace: Unicode `White_Space` without NEL (U+0085),
/// plus the byte-order mark some exports leave behind.
fn trim_token(token: &str) -> &str {
    token.trim_matches(is_js_whitespace)
}

fn is_js_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Coerces a whole token to a number, following ECMAScript `Number()` for
/// strings.
///
/// Accepts signed decimals with optional fraction and exponent, signed
/// `Infinity`, and unsigned `0x`/`0o`/`0b` integer literals. Spellings such
/// as `inf` or `nan` are rejected even though Rust's float parser takes them.
pub fn coerce_number(token: &str) -> Option<f64> {
    match token {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(radix_literal) = radix_literal(token) {
        return radix_literal;
    }

    let decimal_chars = token
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal_chars || !token.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    token.parse::<f64>().ok()
}

/// Returns `Some(result)` when the token carries a radix prefix, with the
/// inner `None` marking invalid digits.
fn radix_literal(token: &str) -> Option<Option<f64>> {
    let bytes = token.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }

    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };

    let digits = &token[2..];
    if digits.is_empty() {
        return Some(None);
    }

    let mut value = 0.0_f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return Some(None),
        }
    }
    Some(Some(value))
}

/// Parses a token matching the date pattern into an offset-aware date-time.
pub fn parse_date(token: &str) -> Option<DateTime<FixedOffset>> {
    let caps = DATE_PATTERN.captures(token)?;

    let year: i32 = match caps.get(1) {
        Some(era) => format!("{}{}", era.as_str(), &caps[2]).parse().ok()?,
        None => caps[2].parse().ok()?,
    };
    let month = component(&caps, 3, 1)?;
    let day = component(&caps, 4, 1)?;
    let hour = component(&caps, 5, 0)?;
    let minute = component(&caps, 6, 0)?;
    let second = component(&caps, 7, 0)?;
    let milli = component(&caps, 8, 0)?;

    let offset = match caps.get(9).map(|m| m.as_str()) {
        None | Some("Z") => FixedOffset::east_opt(0)?,
        Some(zone) => {
            let sign = if zone.starts_with('-') { -1 } else { 1 };
            let hours: i32 = zone[1..3].parse().ok()?;
            let minutes: i32 = zone[4..6].parse().ok()?;
            FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?
        }
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, milli)?;
    offset.from_local_datetime(&date.and_time(time)).single()
}

fn component(caps: &Captures<'_>, index: usize, default: u32) -> Option<u32> {
    match caps.get(index) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(default),
    }
}
