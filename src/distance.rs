//! Imperial distance codec.
//!
//! Reads the feet-inch-fraction strings people type into detailing dialogs
//! (`3'-6"`, `11-1/2`, `1,234.5 in`) and writes inches back out in the
//! canonical `F'-I"n/d` form used for persisted settings.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Fraction denominator used when none is given (1/16 inch).
pub const DEFAULT_DENOMINATOR: i64 = 16;

/// Finest fraction denominator [`format_inches`] writes.
pub const MAX_DENOMINATOR: i64 = 1024;

/// Converts inches to world units (millimetres).
pub fn inches_to_mm(inches: f64) -> f32 {
    (inches * MM_PER_INCH) as f32
}

/// Converts world units (millimetres) back to inches.
pub fn mm_to_inches(mm: f32) -> f64 {
    f64::from(mm) / MM_PER_INCH
}

/// A signed length in inches.
///
/// `FromStr` accepts the full imperial grammar (negatives allowed) and
/// `Display` writes the canonical 1/16-inch form, so a `Distance` survives a
/// text round-trip within 1/32 inch.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance(pub f64);

impl Distance {
    /// Parses `raw`, rejecting non-positive results unless `allow_negative` is set.
    pub fn parse(raw: &str, allow_negative: bool) -> Result<Self, ParseError> {
        parse_inches(raw, allow_negative).map(Self)
    }

    pub fn from_inches(inches: f64) -> Self {
        Self(inches)
    }

    pub fn inches(self) -> f64 {
        self.0
    }

    /// Length in world units (millimetres).
    pub fn to_mm(self) -> f32 {
        inches_to_mm(self.0)
    }

    /// Canonical text form rounded to `1/denom` inch.
    pub fn format(self, denom: i64) -> String {
        format_inches(self.0, denom)
    }
}

impl FromStr for Distance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, true)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_inches(self.0, DEFAULT_DENOMINATOR))
    }
}

/// Parses an imperial distance string into inches.
///
/// Accepted forms (case-insensitive, curly quotes allowed):
/// - feet and inches: `3'-6"`, `3' 6 1/2"`, `3'`
/// - mixed numbers: `11-1/2`, `11 1/2`, `11"1/2`
/// - decimals with thousands separators: `1,234.5`
/// - an optional `in` / `inch` / `inches` suffix and a leading `+` or `-`
///
/// Fails on blank input, malformed feet or inch tokens, zero denominators,
/// and, unless `allow_negative` is set, results that are not strictly positive.
pub fn parse_inches(raw: &str, allow_negative: bool) -> Result<f64, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Blank);
    }

    let normalized: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{2032}' => '\'',
            c => c,
        })
        .collect::<String>()
        .to_lowercase();

    let mut body = normalized.trim_end();
    for suffix in ["inches", "inch", "in"] {
        if let Some(rest) = body.strip_suffix(suffix) {
            body = rest.trim_end();
            break;
        }
    }

    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, body.strip_prefix('+').unwrap_or(body).trim_start()),
    };

    let magnitude = match body.split_once('\'') {
        Some((feet_part, inch_part)) => {
            let feet_part = feet_part.trim();
            let inch_part = inch_part.trim();
            let inch_part = inch_part.strip_prefix('-').unwrap_or(inch_part).trim();

            let feet = if feet_part.is_empty() {
                0.0
            } else {
                parse_number(feet_part).ok_or_else(|| ParseError::InvalidFeet {
                    raw: raw.to_owned(),
                })?
            };

            let inches = if inch_part.trim_matches('"').trim().is_empty() {
                0.0
            } else {
                parse_mixed_number(inch_part).map_err(|err| match err {
                    ParseError::ZeroDenominator { .. } => ParseError::ZeroDenominator {
                        raw: raw.to_owned(),
                    },
                    _ => ParseError::InvalidInches {
                        raw: raw.to_owned(),
                    },
                })?
            };

            feet * 12.0 + inches
        }
        None => parse_mixed_number(body).map_err(|err| match err {
            ParseError::ZeroDenominator { .. } => ParseError::ZeroDenominator {
                raw: raw.to_owned(),
            },
            _ => ParseError::Malformed {
                raw: raw.to_owned(),
            },
        })?,
    };

    let inches = if negative { -magnitude.abs() } else { magnitude };

    if !allow_negative && inches <= 0.0 {
        return Err(ParseError::NotPositive {
            raw: raw.to_owned(),
        });
    }

    Ok(inches)
}

/// Parses a bare or mixed number: `7`, `0.75`, `3/8`, `11 1/2`, `11-1/2`.
///
/// Dashes and inch marks act as token separators. Errors carry `token` as
/// the raw text.
pub fn parse_mixed_number(token: &str) -> Result<f64, ParseError> {
    let malformed = || ParseError::Malformed {
        raw: token.to_owned(),
    };

    let spaced = token.replace(['-', '"'], " ");
    let parts: Vec<&str> = spaced.split_whitespace().collect();

    match parts.as_slice() {
        [single] => parse_term(single, token),
        [whole, tail] => {
            let whole = parse_number(whole).ok_or_else(malformed)?;
            Ok(whole + parse_term(tail, token)?)
        }
        _ => Err(malformed()),
    }
}

fn parse_term(term: &str, token: &str) -> Result<f64, ParseError> {
    match term.split_once('/') {
        Some((num, den)) => {
            let (Some(num), Some(den)) = (parse_number(num), parse_number(den)) else {
                return Err(ParseError::Malformed {
                    raw: token.to_owned(),
                });
            };
            if den.abs() < 1e-9 {
                return Err(ParseError::ZeroDenominator {
                    raw: token.to_owned(),
                });
            }
            Ok(num / den)
        }
        None => parse_number(term).ok_or_else(|| ParseError::Malformed {
            raw: token.to_owned(),
        }),
    }
}

/// Loose decimal read: plain first, then with thousands separators removed.
fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Formats inches as `F'-I"n/d` (or `I"n/d`, `n/d"` below a foot / an inch).
///
/// The magnitude is rounded half-away-from-zero to the nearest `1/denom`
/// inch before being split, so a fraction that rounds up to a whole inch
/// carries into the inches and twelve inches carry into the feet. The
/// fraction is reduced; `denom <= 0` falls back to 16 and larger ones are
/// capped at [`MAX_DENOMINATOR`].
pub fn format_inches(inches: f64, denom: i64) -> String {
    let denom = if denom <= 0 {
        DEFAULT_DENOMINATOR
    } else {
        denom.min(MAX_DENOMINATOR)
    };

    let ticks = (inches.abs() * denom as f64).round() as i64;
    let ticks_per_foot = 12 * denom;

    let feet = ticks / ticks_per_foot;
    let within_foot = ticks % ticks_per_foot;
    let whole = within_foot / denom;
    let mut num = within_foot % denom;
    let mut den = denom;

    if num != 0 {
        let g = gcd(num, den);
        num /= g;
        den /= g;
    }

    let core = match (feet, whole, num) {
        (0, 0, n) if n != 0 => format!("{num}/{den}\""),
        (0, w, 0) => format!("{w}\""),
        (0, w, _) => format!("{w}\"{num}/{den}"),
        (f, w, 0) => format!("{f}'-{w}\""),
        (f, w, _) => format!("{f}'-{w}\"{num}/{den}"),
    };

    if inches < 0.0 && ticks != 0 {
        format!("-{core}")
    } else {
        core
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    if a == 0 { 1 } else { a }
}
