//! Unit-bearing literal parsing: `"1nF"`, `"1000 ohm"`, `"2.2pF"` -> base SI
//! units (magnitude only).
//!
//! A unit-bearing literal is a numeric literal immediately followed, after
//! optional whitespace, by one or more unit letters; hand-written here as a
//! small character scanner rather than pulling in a regex crate.

/// SI prefix magnitudes, longest symbol first so `"Meg"` is tried before the
/// bare `"M"`.
const PREFIXES: &[(&str, f64)] = &[
    ("Meg", 1e6),
    ("f", 1e-15),
    ("p", 1e-12),
    ("n", 1e-9),
    ("u", 1e-6),
    ("\u{b5}", 1e-6), // µ
    ("m", 1e-3),
    ("k", 1e3),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
];

/// Recognized base unit names. The magnitude in each of these units equals
/// the SI base-unit magnitude directly (ohm, farad, henry, hertz, second,
/// volt, ampere are already SI or SI-derived with a scale factor of 1).
const BASE_UNITS: &[&str] = &["ohm", "\u{3a9}", "F", "H", "Hz", "s", "V", "A"];

/// Tries to parse `s` as a unit-bearing numeric literal. Returns `None`
/// (rather than an error) when `s` does not have the shape of one — the
/// caller falls through to symbolic expression parsing in that case, so a
/// bare number or an unrecognized suffix is never silently misparsed.
pub fn parse_unit_literal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (number_part, rest) = split_numeric_prefix(s)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        // A bare number is not "unit-bearing" by this module's contract;
        // it's just a plain literal, handled upstream without unit parsing.
        return None;
    }

    let magnitude: f64 = number_part.parse().ok()?;

    if rest == "%" {
        return Some(magnitude / 100.0);
    }

    // Try the longest known prefix first, then check what remains is a
    // recognized base unit (or empty, meaning a bare-prefix magnitude like
    // "1n" with no explicit unit).
    for &(prefix, scale) in PREFIXES {
        if let Some(unit) = rest.strip_prefix(prefix) {
            if unit.is_empty() || BASE_UNITS.contains(&unit) {
                return Some(magnitude * scale);
            }
        }
    }

    // No prefix, just a bare base unit.
    if BASE_UNITS.contains(&rest) {
        return Some(magnitude);
    }

    None
}

/// Splits a leading `[-+]?\d+(\.\d*)?([eE][-+]?\d+)?` off the front of `s`,
/// returning `(number_text, remainder)`.
fn split_numeric_prefix(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None; // no leading digit, not a numeric literal at all
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mark = i;
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_digits_start {
            i = j;
        } else {
            i = mark; // lone 'e'/'E' with no digits: not part of the exponent
        }
    }

    Some((&s[..i], &s[i..]))
}
