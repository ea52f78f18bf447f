//! Display formatting in Vietnamese locale conventions.

pub const MISSING: &str = "?";

/// Group digits with `.` and use `,` for decimals, keeping at most three
/// fraction digits with trailing zeros dropped: `3359.84 -> "3.359,84"`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let negative =
        value < 0.0 && (!int_part.trim_start_matches('0').is_empty() || !frac.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push(',');
        out.push_str(frac);
    }
    out
}

pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| MISSING.to_string())
}

pub fn text_or_missing(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => MISSING,
    }
}

pub fn format_zoom(zoom: f64) -> String {
    format!("{zoom:.2}")
}

pub fn format_coordinate(degrees: f64) -> String {
    format!("{degrees:.6}")
}

/// Elevation in meters as returned by the elevation endpoint.
pub fn format_elevation(meters: Option<f64>) -> String {
    match meters {
        Some(m) => format!("{} m", format_number(m)),
        None => MISSING.to_string(),
    }
}
