//! Engineering units and numeric literal handling.

/// Parse a SPICE-style value with optional SI suffix.
///
/// The number may carry a sign, a fraction and an exponent. Supported
/// suffixes (case-insensitive):
/// - T (tera, 1e12)
/// - G (giga, 1e9)
/// - MEG (mega, 1e6)
/// - K (kilo, 1e3)
/// - M (milli, 1e-3)
/// - MIL (25.4e-6)
/// - U (micro, 1e-6)
/// - N (nano, 1e-9)
/// - P (pico, 1e-12)
/// - F (femto, 1e-15)
///
/// Letters after the suffix are unit names and are ignored, so `1kOhm`
/// and `10pF` evaluate as expected. Anything else trailing is an error.
pub fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    let b = s.as_bytes();
    let mut pos = 0;

    if matches!(b.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while pos < b.len() && b[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if pos < b.len() && b[pos] == b'.' {
        pos += 1;
        let frac_start = pos;
        while pos < b.len() && b[pos].is_ascii_digit() {
            pos += 1;
        }
        digits += pos - frac_start;
    }

    if digits == 0 {
        return None;
    }

    // An exponent only counts when digits follow; otherwise the `e` is a unit letter.
    if pos < b.len() && (b[pos] == b'e' || b[pos] == b'E') {
        let mut p = pos + 1;
        if p < b.len() && (b[p] == b'+' || b[p] == b'-') {
            p += 1;
        }
        let exp_start = p;
        while p < b.len() && b[p].is_ascii_digit() {
            p += 1;
        }
        if p > exp_start {
            pos = p;
        }
    }

    let mantissa: f64 = s[..pos].parse().ok()?;

    let rest = s[pos..].to_ascii_uppercase();
    let (multiplier, len) = if rest.starts_with("MEG") {
        (1e6, 3)
    } else if rest.starts_with("MIL") {
        (25.4e-6, 3)
    } else {
        match rest.bytes().next() {
            Some(b'T') => (1e12, 1),
            Some(b'G') => (1e9, 1),
            Some(b'K') => (1e3, 1),
            Some(b'M') => (1e-3, 1),
            Some(b'U') => (1e-6, 1),
            Some(b'N') => (1e-9, 1),
            Some(b'P') => (1e-12, 1),
            Some(b'F') => (1e-15, 1),
            _ => (1.0, 0),
        }
    };

    if !rest[len..].bytes().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some(mantissa * multiplier)
}

/// Parse an integer literal, detecting the base from its prefix.
///
/// `0x`/`0X` selects hexadecimal, a leading `0` selects octal, anything
/// else is decimal. The whole string must be consumed; overflow fails.
pub fn parse_integer_literal(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, hex)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Format a value with appropriate SI prefix.
pub fn format_value(value: f64) -> String {
    let abs_value = value.abs();

    let (scaled, suffix) = if abs_value >= 1e12 {
        (value / 1e12, "T")
    } else if abs_value >= 1e9 {
        (value / 1e9, "G")
    } else if abs_value >= 1e6 {
        (value / 1e6, "Meg")
    } else if abs_value >= 1e3 {
        (value / 1e3, "k")
    } else if abs_value >= 1.0 {
        (value, "")
    } else if abs_value >= 1e-3 {
        (value * 1e3, "m")
    } else if abs_value >= 1e-6 {
        (value * 1e6, "u")
    } else if abs_value >= 1e-9 {
        (value * 1e9, "n")
    } else if abs_value >= 1e-12 {
        (value * 1e12, "p")
    } else if abs_value >= 1e-15 {
        (value * 1e15, "f")
    } else if abs_value == 0.0 {
        (0.0, "")
    } else {
        (value, "")
    };

    format!("{:.4}{}", scaled, suffix)
}
