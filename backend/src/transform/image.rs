//! Image URL resolution.

/// Resolve an image path against an optional base URL.
///
/// Absolute `http(s)` URLs pass through untouched. Without a usable base, a
/// relative path is returned as-is.
pub fn resolve_image_url(path: &str, base_url: Option<&str>) -> String {
    let path = path.trim();
    if path.is_empty() {
        return String::new();
    }

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    match base_url.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => {
            let base = base.strip_suffix('/').unwrap_or(base);
            let path = path.strip_prefix('/').unwrap_or(path);
            format!("{}/{}", base, path)
        }
        None => path.to_string(),
    }
}
