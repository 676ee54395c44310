//! GitHub tree listing and raw content fetch.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use grounder_index::source::{RepoFile, RepoSource, SourceError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
const API_VERSION: &str = "2022-11-28";

const ALLOWED_EXTENSIONS: &[&str] = &[
    ".ts",
    ".tsx",
    ".js",
    ".jsx",
    ".rs",
    ".toml",
    ".py",
    ".go",
    ".json",
    ".md",
    ".mdx",
    ".yaml",
    ".yml",
    ".sql",
    ".prisma",
    ".env.example",
];

const IGNORE_PREFIXES: &[&str] = &[
    "node_modules/",
    ".next/",
    "dist/",
    "build/",
    "target/",
    ".git/",
    "public/",
    ".cursor/",
];

const MAX_FILE_BYTES: u64 = 200_000;
const MAX_FILES: usize = 200;

/// GitHub-backed [`RepoSource`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    raw_base: String,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
}

#[derive(Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    size: Option<u64>,
}

fn is_allowed(path: &str, size: Option<u64>) -> bool {
    let lowered = path.to_lowercase();

    if IGNORE_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return false;
    }
    if !ALLOWED_EXTENSIONS.iter().any(|e| lowered.ends_with(e)) {
        return false;
    }
    if size.is_some_and(|s| s > MAX_FILE_BYTES) {
        return false;
    }

    true
}

/// Relevance score prioritizing documentation and schema-adjacent files.
fn relevance_score(path: &str) -> u32 {
    let lowered = path.to_lowercase();
    let mut score = 0;

    if lowered == "readme.md" {
        score += 100;
    }
    if lowered == "agents.md" {
        score += 90;
    }
    if lowered.starts_with("docs/") {
        score += 80;
    }
    if lowered.ends_with(".sql") || lowered.ends_with(".prisma") {
        score += 70;
    }
    if lowered.contains("migrations/") {
        score += 20;
    }
    if lowered.ends_with(".md") || lowered.ends_with(".mdx") {
        score += 60;
    }

    score
}

impl GithubClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: grounder_llm::http::default_client(),
            api_base: DEFAULT_API_BASE.into(),
            raw_base: DEFAULT_RAW_BASE.into(),
        }
    }

    /// Override API and raw-content base URLs (tests, GitHub Enterprise).
    #[must_use]
    pub fn with_base_urls(mut self, api_base: String, raw_base: String) -> Self {
        self.api_base = api_base;
        self.raw_base = raw_base;
        self
    }

    pub(crate) fn api_base(&self) -> &str {
        &self.api_base
    }

    pub(crate) fn api_get(&self, token: &str, url: String) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn list_files_inner(&self, token: &str, repo: &str) -> Result<Vec<RepoFile>, SourceError> {
        let url = format!("{}/repos/{repo}/git/trees/HEAD?recursive=1", self.api_base);
        let response = self
            .api_get(token, url)
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(repo, status = %response.status(), "tree listing failed");
            return Ok(Vec::new());
        }

        let data: TreeResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let mut scored: Vec<(u32, TreeItem)> = data
            .tree
            .into_iter()
            .filter(|item| item.kind == "blob" && is_allowed(&item.path, item.size))
            .map(|item| (relevance_score(&item.path), item))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(MAX_FILES);

        Ok(scored
            .into_iter()
            .map(|(_, item)| RepoFile {
                url: format!("{}/{repo}/HEAD/{}", self.raw_base, item.path),
                size: item.size.unwrap_or(0),
                path: item.path,
            })
            .collect())
    }

    async fn fetch_content_inner(
        &self,
        token: &str,
        file: &RepoFile,
    ) -> Result<String, SourceError> {
        let response = self
            .http
            .get(&file.url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(path = %file.path, status = %response.status(), "content fetch failed");
            return Ok(String::new());
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))
    }
}

impl RepoSource for GithubClient {
    fn list_files(
        &self,
        token: &str,
        repo: &str,
    ) -> BoxFuture<'_, Result<Vec<RepoFile>, SourceError>> {
        let token = token.to_owned();
        let repo = repo.to_owned();
        Box::pin(async move { self.list_files_inner(&token, &repo).await })
    }

    fn fetch_content(
        &self,
        token: &str,
        file: &RepoFile,
    ) -> BoxFuture<'_, Result<String, SourceError>> {
        let token = token.to_owned();
        let file = file.clone();
        Box::pin(async move { self.fetch_content_inner(&token, &file).await })
    }
}
