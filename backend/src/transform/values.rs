//! Lenient value parsing shared by the reconcilers.
//!
//! Nothing here fails: unparsable input falls back to a neutral default.

/// Parse a price or weight. Accepts a decimal comma; anything else is `0`.
pub fn parse_decimal(value: Option<&str>) -> f64 {
    value
        .map(|v| v.trim().replace(',', "."))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse an inventory quantity as an integer.
///
/// Exports often write quantities as `12.0000`, so a decimal is truncated
/// toward zero rather than rejected.
pub fn parse_quantity(value: Option<&str>) -> i64 {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return 0;
    };

    raw.parse::<i64>().unwrap_or_else(|_| {
        let decimal = parse_decimal(Some(raw));
        decimal.trunc() as i64
    })
}

/// Interpret a yes/no style column.
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1" | "yes" | "y" | "true" | "ja")
    )
}

/// Derive publication from visibility and status columns.
///
/// Both signals must allow publication; a missing signal does not block it.
pub fn is_published(visibility: Option<&str>, status: Option<&str>) -> bool {
    let visible = visibility
        .map(|v| !v.to_lowercase().contains("not visible"))
        .unwrap_or(true);

    let enabled = status
        .map(|s| {
            let s = s.trim().to_lowercase();
            s != "2" && s != "disabled"
        })
        .unwrap_or(true);

    visible && enabled
}
