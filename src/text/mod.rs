//! Text normalization applied to every document before encoding.
//!
//! Upstream extraction (PDF/DOCX) leaves arbitrary line breaks, tabs and runs of
//! spaces. [`normalize`] folds all of them so identical content always produces
//! the same encoder input (and the same cache fingerprint).


/// Collapses every run of whitespace into a single space and trims both ends.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Returns `true` if `text` is already in normalized form.
pub fn is_normalized(text: &str) -> bool {
    let mut prev_space = true;
    for c in text.chars() {
        if c.is_whitespace() {
            if c != ' ' || prev_space {
                return false;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    !(prev_space && !text.is_empty())
}

/// Truncates `text` to at most `max_len` bytes (on a char boundary), appending `...`.
pub fn preview(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &text[..end])
}
