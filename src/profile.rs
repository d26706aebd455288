//! Outside dimensions of tube profiles from their catalogue names.

use crate::distance::parse_mixed_number;

/// Tube families whose names follow the `<prefix><d1>X<d2>X<t>` pattern.
const TUBE_PREFIXES: [&str; 4] = ["HSS", "RHS", "SHS", "TS"];

/// Returns the larger outside dimension of a tube profile, in inches.
///
/// `HSS4X4X1/4` → 4.0, `TS1-1/2X1-1/2X.188` → 1.5. Unknown families,
/// fewer than two dimensions, or unreadable tokens return `None`; callers
/// fall back to a configured default.
pub fn outside_dimension_in(profile: &str) -> Option<f64> {
    let compact: String = profile
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if compact.is_empty() {
        return None;
    }

    let dims = TUBE_PREFIXES
        .iter()
        .find_map(|prefix| compact.strip_prefix(prefix))?;

    let mut tokens = dims.split('X').filter(|t| !t.is_empty());
    let first = dimension_token(tokens.next()?)?;
    let second = dimension_token(tokens.next()?)?;

    let outside = first.max(second);
    (outside > 0.0).then_some(outside)
}

/// Outside dimension in millimetres, or `fallback_mm` when the name is not understood.
pub fn outside_dimension_mm_or(profile: &str, fallback_mm: f32) -> f32 {
    outside_dimension_in(profile)
        .map(crate::distance::inches_to_mm)
        .unwrap_or(fallback_mm)
}

/// Reads one dimension: from the first digit through the run of `[0-9./-]`.
fn dimension_token(token: &str) -> Option<f64> {
    let start = token.find(|c: char| c.is_ascii_digit())?;
    let rest = &token[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '/')))
        .unwrap_or(rest.len());
    parse_mixed_number(&rest[..end]).ok()
}
