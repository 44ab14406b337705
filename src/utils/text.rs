/// Cut `s` to at most `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

/// Keep the first `max_words` whitespace-separated words, re-joined with
/// single spaces. Text already within the limit is returned trimmed.
#[must_use]
pub fn truncate_words(s: &str, max_words: usize) -> String {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= max_words {
        return s.trim().to_string();
    }
    words[..max_words].join(" ")
}

#[must_use]
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}
