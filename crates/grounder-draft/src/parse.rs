//! Lenient extraction of an issue draft from raw model output.

use crate::schema::{IssueDraft, normalize_issue_draft};

/// Find the outermost JSON object in the text, tolerating prose or code
/// fences around it.
fn extract_json_payload(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

/// Parse model output into a normalized draft. Never fails: unparseable
/// output produces the placeholder draft.
#[must_use]
pub fn parse_issue_draft(text: &str) -> IssueDraft {
    let parsed = extract_json_payload(text)
        .and_then(|payload| serde_json::from_str::<serde_json::Value>(payload).ok())
        .unwrap_or(serde_json::Value::Null);
    normalize_issue_draft(&parsed)
}
