//! Prompt construction for grounded issue generation.

use grounder_github::RepoContext;
use grounder_index::store::RetrievedChunk;

const SYSTEM_PROMPT: &str = concat!(
    "You are an assistant that turns change descriptions into clear issues for ",
    "product and engineering teams. ",
    "Return ONLY valid JSON (no markdown outside the JSON, no comments). ",
    "Required fields: title (string), body (string), acceptanceCriteria (array of strings). ",
    "Optional fields: labels (array of strings). ",
    "The body must be GitHub-ready Markdown (headings, lists, and code snippets where useful), ",
    "concise, and cover context, problem, and expected outcome. ",
    "Analyze the project from the provided snippets, understand how the repository fits ",
    "together, and point at where the change should happen. ",
    "Always cite real file paths taken from the retrieved context (e.g. src/app/header.tsx) ",
    "when suggesting changes; never invent paths. ",
    "When database schema, migrations, or ORM files are present, identify the affected ",
    "tables/columns and give explicit instructions (e.g. alter column X in table Y in ",
    "migration Z). ",
    "Treat documentation files (README, AGENTS, docs/*, *.md, *.mdx) as the primary source ",
    "for project rules. ",
    "Always include a steps field (array) with the ordered steps to execute the request; ",
    "each item must be Markdown text citing repository files and context.",
);

/// Assemble the system and user prompts for one draft request.
#[must_use]
pub fn build_issue_prompt(
    repo: &str,
    description: &str,
    context: Option<&RepoContext>,
    retrieved: &[RetrievedChunk],
) -> (String, String) {
    let mut context_lines = Vec::new();
    if let Some(ctx) = context {
        if let Some(desc) = ctx.description.as_deref().filter(|d| !d.is_empty()) {
            context_lines.push(format!("Repository description: {desc}"));
        }
        if !ctx.topics.is_empty() {
            context_lines.push(format!("Topics: {}", ctx.topics.join(", ")));
        }
        if !ctx.languages.is_empty() {
            context_lines.push(format!("Languages: {}", ctx.languages.join(", ")));
        }
        if let Some(readme) = ctx.readme_excerpt.as_deref().filter(|r| !r.is_empty()) {
            context_lines.push(format!("README excerpt:\n{readme}"));
        }
    }

    let retrieved_text = retrieved
        .iter()
        .map(|chunk| {
            format!(
                "File: {}:{}-{}\n{}",
                chunk.path, chunk.start_line, chunk.end_line, chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n");

    let mut user_parts = vec![
        format!("Repository: {repo}"),
        format!("User description: {description}"),
    ];
    if !context_lines.is_empty() {
        user_parts.push(format!(
            "\nRepository context:\n{}",
            context_lines.join("\n")
        ));
    }
    if !retrieved_text.is_empty() {
        user_parts.push(format!("\nRelevant snippets:\n{retrieved_text}"));
    }

    (SYSTEM_PROMPT.to_string(), user_parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(path: &str, start: usize, end: usize, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            content: content.into(),
            path: path.into(),
            start_line: start,
            end_line: end,
        }
    }

    #[test]
    fn minimal_prompt_has_repo_and_description() {
        let (system, user) = build_issue_prompt("octo/demo", "add export", None, &[]);
        assert!(system.contains("ONLY valid JSON"));
        assert!(user.contains("Repository: octo/demo"));
        assert!(user.contains("User description: add export"));
        assert!(!user.contains("Repository context"));
        assert!(!user.contains("Relevant snippets"));
    }

    #[test]
    fn context_lines_appear_when_present() {
        let context = RepoContext {
            description: Some("demo service".into()),
            topics: vec!["rust".into()],
            languages: vec!["Rust".into()],
            readme_excerpt: Some("# demo".into()),
        };
        let (_, user) = build_issue_prompt("octo/demo", "x", Some(&context), &[]);
        assert!(user.contains("Repository description: demo service"));
        assert!(user.contains("Topics: rust"));
        assert!(user.contains("Languages: Rust"));
        assert!(user.contains("README excerpt:\n# demo"));
    }

    #[test]
    fn retrieved_chunks_cite_line_ranges() {
        let chunks = vec![
            chunk("src/a.rs", 1, 10, "fn a() {}"),
            chunk("src/b.rs", 5, 8, "fn b() {}"),
        ];
        let (_, user) = build_issue_prompt("octo/demo", "x", None, &chunks);
        assert!(user.contains("File: src/a.rs:1-10"));
        assert!(user.contains("File: src/b.rs:5-8"));
        assert!(user.contains("\n---\n"));
    }

    #[test]
    fn empty_context_struct_adds_no_section() {
        let (_, user) = build_issue_prompt("octo/demo", "x", Some(&RepoContext::default()), &[]);
        assert!(!user.contains("Repository context"));
    }
}
