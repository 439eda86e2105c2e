use once_cell::sync::Lazy;
use regex::Regex;

/// Normalize a line for equality and grouping: lowercase, strip punctuation,
/// collapse whitespace.
///
/// Exposed so callers can check whether a proposed topic already exists in
/// their own storage.
pub fn normalize_text(text: &str) -> String {
    static PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
    static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let lower = text.to_lowercase();
    let stripped = PUNCT.replace_all(&lower, "");
    WS.replace_all(&stripped, " ").trim().to_string()
}
