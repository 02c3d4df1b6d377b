//! Number formatting for table cells.

/// Shown wherever a value is missing.
pub const PLACEHOLDER: &str = "-";

/// Fixed-point formatting that never prints `-0.00`.
pub fn fixed(value: f64, decimals: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

/// Fixed-point formatting of an optional value; missing becomes [`PLACEHOLDER`].
pub fn safe_format(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => fixed(v, decimals),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Shortest natural rendering (`100`, `0.5`), `0` when missing.
pub fn plain_or_zero(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v.to_string(),
        _ => "0".to_string(),
    }
}

/// Text or a fallback when missing or blank.
pub fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}
