//! JSON Extraction
//!
//! Recovers a JSON array from free-form model output. Models wrap their
//! answers in prose, markdown fences, or nothing at all, so extraction is
//! tiered:
//!
//! 1. A ```json fenced block holding an array (first block wins)
//! 2. The greedy span from the first `[` to the last `]`
//! 3. If that span does not parse, the first bracket-balanced array
//!
//! Anything that still fails to parse is reported as `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::types::SkillLevel;

static RE_FENCED_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(\[.*?\])\s*```").expect("valid fenced-array regex"));

static RE_BARE_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("valid bare-array regex"));

/// Extract and parse the first JSON array in `text`
pub fn extract_json_array(text: &str) -> Option<Value> {
    if let Some(caps) = RE_FENCED_ARRAY.captures(text) {
        let candidate = caps.get(1)?.as_str();
        debug!("Found fenced JSON block: {}", preview(candidate, 200));
        return parse_candidate(candidate);
    }

    let greedy = RE_BARE_ARRAY.find(text)?.as_str();
    debug!("Found bare JSON span: {}", preview(greedy, 200));
    if let Some(value) = parse_candidate(greedy) {
        return Some(value);
    }

    // Greedy span swallowed prose between two arrays; take the first whole one
    let balanced = balanced_array(text)?;
    if balanced.len() == greedy.len() {
        return None;
    }
    parse_candidate(balanced)
}

/// Normalize a one-word level answer: trim, then exact match
pub fn extract_level(text: &str) -> Option<SkillLevel> {
    text.trim().parse().ok()
}

fn parse_candidate(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Candidate is not valid JSON ({}): {}", e, preview(candidate, 200));
            None
        }
    }
}

/// First `[ ... ]` span with balanced brackets, skipping brackets in strings
fn balanced_array(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Truncate text for log output (UTF-8 safe)
pub(crate) fn preview(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .take_while(|(i, _)| *i < max_bytes)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    format!("{}...", &text[..cut])
}
