//! Conservative substring filter over candidate title and URL.

/// Lowercase substrings that reject a candidate wherever they appear.
/// Matching is not word-bounded, so "skill" is rejected for containing "kill".
pub const BANNED_TERMS: &[&str] = &[
    "nsfw", "porn", "nude", "sex", "gore", "blood", "violent", "kill", "murder", "drug",
    "heroin", "coke", "meth", "lsd",
];

/// Returns false if any banned term appears in `"{title} {url}"`, case-insensitively.
pub fn is_safe(title: &str, url: &str) -> bool {
    let text = format!("{} {}", title, url).to_lowercase();
    !BANNED_TERMS.iter().any(|term| text.contains(term))
}
