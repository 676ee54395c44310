//! Repository metadata for prompt enrichment.
//!
//! Three independent fetches (details, languages, README) run concurrently
//! and each degrades to empty on failure, so a partial GitHub outage never
//! blocks drafting.

use serde::{Deserialize, Serialize};

use crate::client::GithubClient;

const README_MAX_CHARS: usize = 2000;

/// Repository metadata handed to prompt construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContext {
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub languages: Vec<String>,
    pub readme_excerpt: Option<String>,
}

#[derive(Deserialize)]
struct RepoDetails {
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

impl GithubClient {
    /// Gather repository metadata. Never fails; missing pieces stay empty.
    pub async fn repo_context(&self, token: &str, repo: &str) -> RepoContext {
        let (details, languages, readme_excerpt) = tokio::join!(
            self.fetch_details(token, repo),
            self.fetch_languages(token, repo),
            self.fetch_readme_excerpt(token, repo),
        );

        let (description, topics) = details
            .map(|d| (d.description, d.topics))
            .unwrap_or_default();

        RepoContext {
            description,
            topics,
            languages,
            readme_excerpt,
        }
    }

    async fn fetch_details(&self, token: &str, repo: &str) -> Option<RepoDetails> {
        let url = format!("{}/repos/{repo}", self.api_base());
        let response = self.api_get(token, url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    async fn fetch_languages(&self, token: &str, repo: &str) -> Vec<String> {
        let url = format!("{}/repos/{repo}/languages", self.api_base());
        let Ok(response) = self.api_get(token, url).send().await else {
            return Vec::new();
        };
        if !response.status().is_success() {
            return Vec::new();
        }
        response
            .json::<serde_json::Map<String, serde_json::Value>>()
            .await
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    async fn fetch_readme_excerpt(&self, token: &str, repo: &str) -> Option<String> {
        let url = format!("{}/repos/{repo}/readme", self.api_base());
        let response = self
            .api_get(token, url)
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let text = response.text().await.ok()?;
        Some(text.chars().take(README_MAX_CHARS).collect())
    }
}
