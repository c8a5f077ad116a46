//! Filesystem-safe base names for variant files.

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 40;

/// Raster extensions accepted from candidate URLs.
pub const RASTER_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp"];

/// Derives a lower-case, hyphenated slug from `title`.
///
/// Every run of characters outside `[a-z0-9]` becomes one `-`, leading and
/// trailing hyphens are stripped, `fallback` is used when nothing is left, and
/// the result is cut to [`MAX_SLUG_LEN`]. Distinct titles may share a slug.
///
/// # Examples
///
/// - `slug("Misty Lake, Norway!", "img-1")` → `"misty-lake-norway"`
/// - `slug("!!!", "img-3")` → `"img-3"`
pub fn slug(title: &str, fallback: &str) -> String {
    let lower = title.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut pending_hyphen = false;

    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    let base = if out.is_empty() { fallback } else { out.as_str() };
    base.chars().take(MAX_SLUG_LEN).collect()
}

/// Extension (with dot) for the raw download, inferred from the URL suffix; `.png` otherwise.
pub fn pick_ext(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    RASTER_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| lower.ends_with(ext))
        .unwrap_or(".png")
}

/// True if `url` ends with one of [`RASTER_EXTENSIONS`], case-insensitively.
pub fn has_raster_extension(url: &str) -> bool {
    let lower = url.to_lowercase();
    RASTER_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
