//! Pulls a JSON array of candidate records out of free-form model output.
//!
//! Model output may be wrapped in prose or a fenced code block, may contain
//! brackets inside string values, and may be cut off mid-array when the
//! provider hits its output-length cap. Extraction is string-aware and, for
//! truncated output, keeps every object that was fully closed.

use crate::domain::model::CandidateRecord;
use crate::utils::error::{DiscoveryError, Result};
use std::borrow::Cow;

const FENCE: &str = "```";

/// Returns the content of the first fenced code block, or `text` unchanged.
///
/// An unterminated fence yields everything after the opening line so a
/// truncated fenced answer can still be salvaged.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find(FENCE) else {
        return text;
    };
    let after = &text[open + FENCE.len()..];
    let tag_len = after
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(after.len());
    let body = &after[tag_len..];
    match body.find(FENCE) {
        Some(close) => &body[..close],
        None => body,
    }
}

/// Steps a byte at a time, tracking whether the cursor sits inside a JSON string.
#[derive(Default)]
struct StringTracker {
    in_string: bool,
    escaped: bool,
}

impl StringTracker {
    /// Returns true when `byte` is structural (outside any string literal).
    fn structural(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return false;
        }
        if byte == b'"' {
            self.in_string = true;
            return false;
        }
        true
    }
}

/// Index of the `]` matching the `[` at `open`.
fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let mut tracker = StringTracker::default();
    let mut depth = 0usize;
    for (i, &byte) in text.as_bytes().iter().enumerate().skip(open) {
        if !tracker.structural(byte) {
            continue;
        }
        match byte {
            b'[' => depth += 1,
            b']' => {
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

/// Index of the closing `}` of the last top-level object completed after `open`.
fn last_complete_object(text: &str, open: usize) -> Option<usize> {
    let mut tracker = StringTracker::default();
    let mut depth = 0usize;
    let mut last_end = None;
    for (i, &byte) in text.as_bytes().iter().enumerate().skip(open) {
        if !tracker.structural(byte) {
            continue;
        }
        match byte {
            b'{' => depth += 1,
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    last_end = Some(i);
                }
            }
            _ => {}
        }
    }
    last_end
}

/// Isolates the JSON array substring in `raw`.
///
/// Well-formed output is returned borrowed. Truncated output is rebuilt from
/// the opening bracket through the last complete object plus a closing `]`.
/// The result is balanced but not yet parsed, see [`parse_candidates`].
pub fn extract_json_array(raw: &str) -> Result<Cow<'_, str>> {
    let fenced = strip_code_fence(raw);
    let text = if fenced.contains('[') { fenced } else { raw };

    let open = text.find('[').ok_or(DiscoveryError::NoArrayFound)?;

    if let Some(close) = matching_bracket(text, open) {
        return Ok(Cow::Borrowed(&text[open..=close]));
    }

    let end = last_complete_object(text, open).ok_or(DiscoveryError::UnsalvageableTruncation)?;
    tracing::warn!(
        "Response truncated after {} bytes, dropping incomplete trailing record",
        text.len() - open
    );
    Ok(Cow::Owned(format!("{}]", &text[open..=end])))
}

/// Extracts and parses the candidate records in `raw`.
///
/// Array elements that are not JSON objects are skipped.
pub fn parse_candidates(raw: &str) -> Result<Vec<CandidateRecord>> {
    let array = extract_json_array(raw)?;

    let values: Vec<serde_json::Value> =
        serde_json::from_str(&array).map_err(|e| DiscoveryError::MalformedJson {
            message: e.to_string(),
            raw: raw.to_string(),
        })?;

    let total = values.len();
    let records: Vec<CandidateRecord> = values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::Object(map) => Some(CandidateRecord::new(map)),
            _ => None,
        })
        .collect();

    if records.len() < total {
        tracing::debug!("Skipped {} non-object array elements", total - records.len());
    }

    Ok(records)
}
