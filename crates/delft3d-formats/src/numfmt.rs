//! printf-compatible number rendering
//!
//! Delft3D tools write numbers through C/Fortran formatted output. Rust's
//! `LowerExp` omits the exponent sign and padding (`1.0e1`), so the writers
//! in this crate go through these helpers to get `1.0000000e+01` exactly.

/// Render `value` like printf `%.{precision}e`.
pub fn exp(value: f64, precision: usize) -> String {
    render_exp(value, precision, false)
}

/// Render `value` like printf `%.{precision}E`.
pub fn exp_upper(value: f64, precision: usize) -> String {
    render_exp(value, precision, true)
}

/// Render `value` like printf `%d` applied to a float (truncation toward zero).
///
/// Returns `None` for NaN, infinities and values outside the `i64` range,
/// which printf-style integer output cannot represent.
pub fn int(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(format!("{}", truncated as i64))
}

/// Parse a numeric token as written by Delft3D tools.
///
/// Accepts everything `f64::from_str` accepts plus Fortran `D` exponents
/// (`1.5D+02`).
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Ok(value) = token.parse::<f64>() {
        return Some(value);
    }
    if token.contains(['D', 'd']) {
        return token.replace(['D', 'd'], "E").parse::<f64>().ok();
    }
    None
}

fn render_exp(value: f64, precision: usize, upper: bool) -> String {
    if value.is_nan() {
        return if upper { "NAN" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        let text = if upper { "INF" } else { "inf" };
        return if value < 0.0 {
            format!("-{text}")
        } else {
            text.to_string()
        };
    }

    let rendered = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.unsigned_abs())
}
