//! Normalized issue draft structure.

use serde::{Deserialize, Serialize};

const FALLBACK_TITLE: &str = "Untitled issue";
const FALLBACK_BODY: &str = "No details provided.";

/// A structured issue draft ready for review and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub acceptance_criteria: Vec<String>,
    pub labels: Vec<String>,
    pub steps: Vec<String>,
}

fn to_string_array(value: Option<&serde_json::Value>) -> Vec<String> {
    let Some(serde_json::Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            serde_json::Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// Coerce arbitrary model output into a well-formed draft.
///
/// Missing or blank title/body fall back to fixed placeholders; array
/// fields drop blank entries and default to empty.
#[must_use]
pub fn normalize_issue_draft(input: &serde_json::Value) -> IssueDraft {
    let get_str = |key: &str| {
        input
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    IssueDraft {
        title: get_str("title").unwrap_or_else(|| FALLBACK_TITLE.into()),
        body: get_str("body").unwrap_or_else(|| FALLBACK_BODY.into()),
        acceptance_criteria: to_string_array(input.get("acceptanceCriteria")),
        labels: to_string_array(input.get("labels")),
        steps: to_string_array(input.get("steps")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_input_normalizes_cleanly() {
        let draft = normalize_issue_draft(&serde_json::json!({
            "title": "  Add export  ",
            "body": "Markdown body",
            "acceptanceCriteria": ["works", "  ", "tested"],
            "labels": ["feature"],
            "steps": ["edit src/export.rs"]
        }));
        assert_eq!(draft.title, "Add export");
        assert_eq!(draft.acceptance_criteria, vec!["works", "tested"]);
        assert_eq!(draft.labels, vec!["feature"]);
    }

    #[test]
    fn empty_input_gets_fallbacks() {
        let draft = normalize_issue_draft(&serde_json::json!({}));
        assert_eq!(draft.title, FALLBACK_TITLE);
        assert_eq!(draft.body, FALLBACK_BODY);
        assert!(draft.acceptance_criteria.is_empty());
        assert!(draft.labels.is_empty());
        assert!(draft.steps.is_empty());
    }

    #[test]
    fn non_array_fields_become_empty() {
        let draft = normalize_issue_draft(&serde_json::json!({
            "title": "t",
            "body": "b",
            "labels": "not-an-array"
        }));
        assert!(draft.labels.is_empty());
    }
}
