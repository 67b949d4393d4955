use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)([^.!?…]+[.!?…]+)|([^.!?…]+$)").expect("sentence regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Collapses runs of whitespace (including newlines) into single spaces.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Packs whole sentences into chunks of at most `max_chars` characters.
/// A sentence longer than `max_chars` becomes its own chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut sentences = Vec::new();
    for m in SENTENCE.find_iter(text) {
        let s = m.as_str().trim();
        if !s.is_empty() {
            sentences.push(s.to_string());
        }
    }
    if sentences.is_empty() {
        warn!("No sentence breaks found; returning whole text as one chunk");
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for s in sentences {
        if current.is_empty() {
            current.push_str(&s);
        } else if current.chars().count() + 1 + s.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&s);
        } else {
            chunks.push(current);
            current = s;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
