/*!
 * GitHub contents API source.
 */

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{is_markdown_path, DocumentSource, SourceFile};

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Environment variable holding a personal access token
pub const TOKEN_ENV_VAR: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

/// One entry of a contents listing
#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// Documentation stored in a GitHub repository
#[derive(Debug)]
pub struct GitHubSource {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    root: String,
}

impl GitHubSource {
    /// Create a source for `owner/repo`, rooted at `root` inside the repository.
    ///
    /// The token falls back to `GITHUB_PERSONAL_ACCESS_TOKEN` when not given.
    pub fn new(
        owner: &str,
        repo: &str,
        root: &str,
        token: Option<&str>,
        api_base: Option<&str>,
    ) -> Result<Self> {
        let token = token
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty()));

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("yadtwai"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("GitHub token contains invalid header characters")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build GitHub HTTP client")?;

        let api_base = api_base
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&api_base).with_context(|| format!("Invalid GitHub API base: {}", api_base))?;

        Ok(Self {
            client,
            api_base,
            owner: owner.to_string(),
            repo: repo.to_string(),
            root: root.trim_matches('/').to_string(),
        })
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<ContentEntry>> {
        let url = format!("{}/repos/{}/{}/contents/{}", self.api_base, self.owner, self.repo, path);
        debug!("Listing {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to list {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error ({}) listing '{}': {}", status, path, body));
        }

        response
            .json::<Vec<ContentEntry>>()
            .await
            .with_context(|| format!("Unexpected GitHub listing for '{}'", path))
    }
}

#[async_trait]
impl DocumentSource for GitHubSource {
    async fn list_files(&self) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            for entry in self.list_directory(&dir).await? {
                match entry.kind.as_str() {
                    "dir" => pending.push(entry.path),
                    "file" if is_markdown_path(&entry.path) => files.push(SourceFile {
                        path: entry.path,
                        sha: entry.sha,
                        download_url: entry.download_url,
                    }),
                    _ => {}
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} markdown file(s) in {}/{}", files.len(), self.owner, self.repo);
        Ok(files)
    }

    async fn fetch_raw(&self, file: &SourceFile) -> Result<String> {
        let url = file
            .download_url
            .as_deref()
            .ok_or_else(|| anyhow!("No download URL for {}", file.path))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", file.path))?;

        if !response.status().is_success() {
            return Err(anyhow!("Download of {} failed with {}", file.path, response.status()));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", file.path))
    }
}
