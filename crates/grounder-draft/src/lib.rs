//! Issue drafting: schema, prompt construction, and output parsing.
//!
//! The model call stays an opaque text-in/text-out service behind
//! [`grounder_llm::LlmProvider`]; this crate owns everything around it.

pub mod parse;
pub mod prompt;
pub mod schema;

use grounder_github::RepoContext;
use grounder_index::store::RetrievedChunk;
use grounder_llm::provider::Message;
use grounder_llm::{LlmError, LlmProvider};

pub use schema::IssueDraft;

/// Build the prompt, run one completion, and parse the draft.
///
/// # Errors
///
/// Returns an error when the completion call fails; parsing never fails,
/// it normalizes whatever came back.
pub async fn draft_issue<P: LlmProvider>(
    provider: &P,
    repo: &str,
    description: &str,
    context: Option<&RepoContext>,
    retrieved: &[RetrievedChunk],
) -> Result<IssueDraft, LlmError> {
    let (system, user) = prompt::build_issue_prompt(repo, description, context, retrieved);
    let response = provider
        .chat(&[Message::system(system), Message::user(user)])
        .await?;
    tracing::debug!(repo, response_len = response.len(), "draft generated");
    Ok(parse::parse_issue_draft(&response))
}

#[cfg(test)]
mod tests {
    use grounder_llm::mock::MockProvider;

    use super::*;

    #[tokio::test]
    async fn draft_parses_model_json() {
        let provider = MockProvider::with_responses(vec![
            r#"{"title": "Add dark mode", "body": "Details", "acceptanceCriteria": ["toggles"], "labels": ["ui"], "steps": ["edit src/theme.rs"]}"#.into(),
        ]);

        let draft = draft_issue(&provider, "octo/demo", "dark mode please", None, &[])
            .await
            .unwrap();
        assert_eq!(draft.title, "Add dark mode");
        assert_eq!(draft.labels, vec!["ui"]);
        assert_eq!(draft.steps, vec!["edit src/theme.rs"]);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = MockProvider::failing();
        let err = draft_issue(&provider, "octo/demo", "x", None, &[]).await;
        assert!(err.is_err());
    }
}
