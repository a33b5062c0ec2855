//! Pulls a JSON object out of free-form model output.
//!
//! Models wrap their JSON in prose or markdown fences often enough that the
//! reply cannot be parsed directly. Candidates are tried in order: the first
//! balanced `{...}` block (string-aware, so braces inside string values do
//! not confuse it), then the greedy span from the first `{` to the last `}`,
//! then the trimmed text itself.

use serde::de::DeserializeOwned;

/// Every balanced top-level object in `text`, in order of appearance.
pub fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    std::iter::from_fn(move || {
        let start = search_from + text.get(search_from..)?.find('{')?;
        // An unterminated object swallows the rest of the text.
        let end = scan_object(bytes, start)?;
        search_from = end + 1;
        Some(&text[start..=end])
    })
}

/// The span from the first `{` through the last `}`.
pub fn greedy_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses the first candidate object in `text` that deserializes as `T`.
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let trimmed = text.trim();
    let mut last_err = None;

    for candidate in balanced_objects(trimmed).chain(greedy_object(trimmed)) {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(err) => last_err = Some(err),
        }
    }

    match last_err {
        Some(err) => Err(err),
        None => serde_json::from_str(trimmed),
    }
}

/// Index of the `}` closing the object opened at `start`.
fn scan_object(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
