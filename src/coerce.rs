//! Lenient readings of JSON scalars.
//!
//! Each accessor returns `None` when the value has no sensible reading; the
//! caller then stores the kind's default and reports a warning.

use serde_json::Value;

/// Reads a value as a number: numbers as-is, numeric strings parsed, `true`
/// and `false` as 1 and 0.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Reads a value as a `bool`.
///
/// Strings accept `true`/`yes`/`on` and `false`/`no`/`off` in any case, or a
/// number, which is true when non-zero.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => {
            let text = text.trim();
            if ["true", "yes", "on"].iter().any(|t| text.eq_ignore_ascii_case(t)) {
                Some(true)
            } else if ["false", "no", "off"].iter().any(|t| text.eq_ignore_ascii_case(t)) {
                Some(false)
            } else {
                text.parse::<f64>().ok().map(|n| n != 0.0)
            }
        }
        _ => None,
    }
}

/// Reads a scalar as a string. Numbers use their shortest form.
pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// How cleanly integer text parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerText {
    /// The whole text was a valid integer.
    Exact(i64),
    /// Leading digits parsed; the rest was ignored.
    Truncated(i64),
    /// The digits did not fit and the value saturated.
    Overflow(i64),
    /// No digits at all; reads as 0.
    Invalid,
}

impl IntegerText {
    /// The value to store.
    pub fn value(self) -> i64 {
        match self {
            IntegerText::Exact(value)
            | IntegerText::Truncated(value)
            | IntegerText::Overflow(value) => value,
            IntegerText::Invalid => 0,
        }
    }
}

/// Parses decimal integer text without going through floating point.
///
/// Accepts leading whitespace and an optional sign, then reads digits until
/// the first non-digit.
pub fn parse_integer(text: &str) -> IntegerText {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|byte| !byte.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return IntegerText::Invalid;
    }

    let mut value: i64 = 0;
    for byte in digits[..end].bytes() {
        let digit = i64::from(byte - b'0');
        let next = value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) });
        match next {
            Some(next) => value = next,
            None => return IntegerText::Overflow(if negative { i64::MIN } else { i64::MAX }),
        }
    }

    if digits[end..].trim_end().is_empty() {
        IntegerText::Exact(value)
    } else {
        IntegerText::Truncated(value)
    }
}

/// A short rendering of a value for messages.
pub fn describe(value: &Value) -> String {
    const LIMIT: usize = 64;
    let text = value.to_string();
    if text.chars().count() <= LIMIT {
        return text;
    }
    let mut short: String = text.chars().take(LIMIT).collect();
    short.push('…');
    short
}
