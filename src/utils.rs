//! Text normalization helpers shared by catalog search and QR decoding.

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Lowercased, whitespace-normalized search keyword (empty means "match everything").
pub fn fold_keyword(keyword: &str) -> String {
    normalize_inline_whitespace(keyword).to_lowercase()
}
