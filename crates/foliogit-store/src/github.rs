// FolioGit - Portfolio Content Publishing
// Copyright (C) 2026 FolioGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! GitHub contents API backend
//!
//! Makes the target repository's file tree reflect a desired single-file
//! change on a branch. Every mutating call follows the same shape:
//!
//! 1. Resolve the current revision marker (blob SHA) for the path. A 2xx
//!    metadata response yields the marker; anything else means the file does
//!    not exist yet.
//! 2. Issue the write. The marker accompanies an update; omitting it signals
//!    a create. A stale marker makes the host reject the write, which
//!    surfaces as [`StoreError::Publish`] — no automatic retry.
//!
//! Deleting a file that has no marker is treated as already deleted and
//! succeeds. Credentials are checked per call, not at construction, so an
//! unconfigured deployment fails softly at publish time with a diagnostic
//! pointing at the missing variables. The access token never appears in any
//! error message or response body.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::{FileEntry, SiteStore, StoreError, StoreResult};
use foliogit_config::SiteConfig;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw";

/// A `owner/repo` repository identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoId {
    type Err = StoreError;

    /// Parse `owner/repo`; exactly two non-empty segments required
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoId {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(StoreError::unconfigured(format!(
                "invalid repository identifier '{s}', expected owner/repo"
            ))),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Resolved publish target (credentials present and well-formed)
struct Target {
    token: String,
    repo: RepoId,
}

/// Directory entry as reported by the contents API
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    size: u64,
    #[serde(rename = "type")]
    kind: String,
}

/// Site store backed by the GitHub repository contents API
pub struct GitHubStore {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
    repo: Option<String>,
    branch: String,
    committer_name: String,
    committer_email: String,
}

impl GitHubStore {
    /// Build from configuration
    ///
    /// Succeeds even without credentials; those are validated per call so
    /// their absence is reported against the operation that needed them.
    pub fn from_config(config: &SiteConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("foliogit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            token: config.github.token.clone(),
            repo: config.github.repo.clone(),
            branch: config.github.branch.clone(),
            committer_name: config.github.committer_name.clone(),
            committer_email: config.github.committer_email.clone(),
        })
    }

    /// Override the API base URL (tests)
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Resolve credentials, or report exactly what is missing
    fn target(&self) -> StoreResult<Target> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoreError::unconfigured("GITHUB_TOKEN is not set"))?;
        let repo = self
            .repo
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| StoreError::unconfigured("GITHUB_REPO is not set"))?;

        Ok(Target {
            token: token.to_string(),
            repo: RepoId::from_str(repo)?,
        })
    }

    fn contents_url(&self, repo: &RepoId, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, repo.owner, repo.name, path
        )
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        token: &str,
        accept: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Fetch the current revision marker for `path` on the target branch
    ///
    /// A non-2xx metadata response means "file does not exist yet".
    async fn revision(&self, target: &Target, path: &str) -> StoreResult<Option<String>> {
        let url = self.contents_url(&target.repo, path);
        let response = self
            .request(reqwest::Method::GET, &url, &target.token, ACCEPT_JSON)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(path, status = %response.status(), "No existing file at path");
            return Ok(None);
        }

        let metadata: Value = response.json().await?;
        match metadata.get("sha").and_then(Value::as_str) {
            Some(sha) => Ok(Some(sha.to_string())),
            None => {
                tracing::warn!(path, "Contents metadata carried no sha");
                Ok(None)
            }
        }
    }

    fn committer(&self) -> Value {
        json!({
            "name": self.committer_name,
            "email": self.committer_email,
        })
    }

    /// Body for a create-or-update call; the marker is attached only when
    /// the file already exists
    fn write_body(&self, message: &str, content_b64: &str, sha: Option<&str>) -> Value {
        let mut body = json!({
            "message": message,
            "content": content_b64,
            "branch": self.branch,
            "committer": self.committer(),
        });
        if let Some(sha) = sha {
            body["sha"] = Value::String(sha.to_string());
        }
        body
    }

    fn delete_body(&self, message: &str, sha: &str) -> Value {
        json!({
            "message": message,
            "sha": sha,
            "branch": self.branch,
            "committer": self.committer(),
        })
    }

    /// Turn a host response into success or a publish error with status and
    /// a truncated host message (token-free by construction)
    async fn check(action: &str, path: &str, response: reqwest::Response) -> StoreResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let mut detail = response.text().await.unwrap_or_default();
        detail.truncate(300);
        Err(StoreError::publish(format!(
            "{action} {path}: HTTP {status}: {detail}"
        )))
    }
}

impl fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token is secret material; report only its presence
        f.debug_struct("GitHubStore")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

#[async_trait]
impl SiteStore for GitHubStore {
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = self.target()?;
        let url = self.contents_url(&target.repo, path);

        let response = self
            .request(reqwest::Method::GET, &url, &target.token, ACCEPT_RAW)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(path));
        }
        if !response.status().is_success() {
            return Err(StoreError::publish(format!(
                "read {path}: HTTP {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn write(&self, path: &str, data: &[u8], message: &str) -> StoreResult<()> {
        let target = self.target()?;
        let sha = self.revision(&target, path).await?;

        tracing::info!(
            path,
            update = sha.is_some(),
            bytes = data.len(),
            "Publishing file to {}",
            target.repo
        );

        let body = self.write_body(message, &BASE64.encode(data), sha.as_deref());
        let url = self.contents_url(&target.repo, path);
        let response = self
            .request(reqwest::Method::PUT, &url, &target.token, ACCEPT_JSON)
            .json(&body)
            .send()
            .await?;

        Self::check("write", path, response).await
    }

    async fn delete(&self, path: &str, message: &str) -> StoreResult<()> {
        let target = self.target()?;

        let Some(sha) = self.revision(&target, path).await? else {
            // Already absent at the host: nothing to delete
            tracing::info!(path, "File absent at host, delete is a no-op");
            return Ok(());
        };

        tracing::info!(path, "Deleting file from {}", target.repo);

        let body = self.delete_body(message, &sha);
        let url = self.contents_url(&target.repo, path);
        let response = self
            .request(reqwest::Method::DELETE, &url, &target.token, ACCEPT_JSON)
            .json(&body)
            .send()
            .await?;

        Self::check("delete", path, response).await
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<FileEntry>> {
        let target = self.target()?;
        let url = self.contents_url(&target.repo, prefix);

        let response = self
            .request(reqwest::Method::GET, &url, &target.token, ACCEPT_JSON)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        // A folder that was never published lists as empty
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(StoreError::publish(format!(
                "list {prefix}: HTTP {}",
                response.status()
            )));
        }

        let entries: Vec<ContentsEntry> = response.json().await?;
        let mut files: Vec<FileEntry> = entries
            .into_iter()
            .filter(|e| e.kind == "file")
            .map(|e| FileEntry {
                name: e.name,
                size: e.size,
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliogit_config::GitHubConfig;

    fn store_with(github: GitHubConfig) -> GitHubStore {
        let config = SiteConfig {
            github,
            ..Default::default()
        };
        GitHubStore::from_config(&config).unwrap()
    }

    fn configured_store() -> GitHubStore {
        store_with(GitHubConfig {
            token: Some("ghp_secret123".to_string()),
            repo: Some("owner/site".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn repo_id_parses_owner_and_name() {
        let id: RepoId = "octocat/hello-world".parse().unwrap();
        assert_eq!(id.owner, "octocat");
        assert_eq!(id.name, "hello-world");
        assert_eq!(id.to_string(), "octocat/hello-world");
    }

    #[test]
    fn repo_id_rejects_malformed() {
        assert!(RepoId::from_str("no-slash").is_err());
        assert!(RepoId::from_str("/leading").is_err());
        assert!(RepoId::from_str("trailing/").is_err());
        assert!(RepoId::from_str("a/b/c").is_err());
        assert!(RepoId::from_str("").is_err());
    }

    #[test]
    fn write_body_omits_marker_for_create() {
        let store = configured_store();
        let body = store.write_body("Add poster", "QkFTRTY0", None);
        assert!(body.get("sha").is_none());
        assert_eq!(body["branch"], "main");
        assert_eq!(body["message"], "Add poster");
        assert_eq!(body["committer"]["name"], "Admin Panel");
    }

    #[test]
    fn write_body_carries_marker_for_update() {
        let store = configured_store();
        let body = store.write_body("Update poster", "QkFTRTY0", Some("abc123"));
        assert_eq!(body["sha"], "abc123");
    }

    #[test]
    fn delete_body_carries_marker_and_branch() {
        let store = configured_store();
        let body = store.delete_body("Delete poster", "abc123");
        assert_eq!(body["sha"], "abc123");
        assert_eq!(body["branch"], "main");
    }

    #[test]
    fn contents_url_shape() {
        let store = configured_store();
        let repo: RepoId = "owner/site".parse().unwrap();
        assert_eq!(
            store.contents_url(&repo, "public/content/works.json"),
            "https://api.github.com/repos/owner/site/contents/public/content/works.json"
        );
    }

    #[tokio::test]
    async fn missing_token_is_unconfigured_per_call() {
        let store = store_with(GitHubConfig {
            repo: Some("owner/site".to_string()),
            ..Default::default()
        });

        let err = store.write("public/x.json", b"[]", "msg").await.unwrap_err();
        assert!(matches!(err, StoreError::Unconfigured(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn malformed_repo_is_unconfigured_per_call() {
        let store = store_with(GitHubConfig {
            token: Some("token".to_string()),
            repo: Some("not-a-repo-id".to_string()),
            ..Default::default()
        });

        let err = store.delete("public/x.json", "msg").await.unwrap_err();
        assert!(matches!(err, StoreError::Unconfigured(_)));
    }

    #[test]
    fn debug_never_shows_token() {
        let store = configured_store();
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("ghp_secret123"));
        assert!(rendered.contains("has_token"));
    }
}
