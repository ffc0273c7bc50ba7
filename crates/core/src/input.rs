//! Lenient parsing of numbers typed into the drill.
//!
//! Mirrors how a number field behaves in a browser form: leading whitespace
//! is skipped, an optional sign and digits are read, and anything after the
//! digits is ignored.

/// Read the leading integer of `raw`, if there is one.
///
/// Values beyond the `i64` range saturate.
#[must_use]
pub fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }

    seen.then_some(value)
}

/// Coerce a form field to a number, falling back to 0.
#[must_use]
pub fn coerce_number(raw: &str) -> i64 {
    leading_integer(raw).unwrap_or(0)
}

/// Parse a submitted answer. Empty or non-numeric input yields `None`
/// and the submission is ignored.
#[must_use]
pub fn parse_answer(raw: &str) -> Option<i64> {
    if raw.trim().is_empty() {
        return None;
    }
    leading_integer(raw)
}
