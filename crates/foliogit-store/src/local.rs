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

//! Local filesystem backend for development
//!
//! Writes land in the site working tree with atomic temp-file + rename, so a
//! crashed write never leaves a half-visible file. The filesystem result is
//! authoritative for this mode; after a successful mutation the path is
//! staged, committed and pushed with the local `git` binary as a
//! convenience, and any git failure is logged without failing the
//! operation.
//!
//! Unlike the remote backend, deleting an absent file reports
//! [`StoreError::NotFound`] so the endpoint layer can surface a 404 during
//! development.

use async_trait::async_trait;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{FileEntry, SiteStore, StoreError, StoreResult};
use foliogit_config::SiteConfig;

/// Local git push target
#[derive(Debug, Clone)]
struct GitPush {
    remote: String,
    branch: String,
}

/// Site store backed by the local working tree
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
    git: Option<GitPush>,
}

impl LocalStore {
    /// Create a store rooted at `root` with the git step disabled
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            git: None,
        }
    }

    /// Create a store that also stages, commits and pushes each mutation
    pub fn with_push<P: AsRef<Path>>(root: P, remote: &str, branch: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            git: Some(GitPush {
                remote: remote.to_string(),
                branch: branch.to_string(),
            }),
        }
    }

    /// Build from configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        if config.local.push {
            Self::with_push(
                &config.local.site_root,
                &config.local.remote,
                &config.local.branch,
            )
        } else {
            Self::new(&config.local.site_root)
        }
    }

    /// Resolve a repository-relative path under the root
    ///
    /// Absolute paths and parent-directory components are rejected; the
    /// endpoint layer validates file names, this guards the store boundary.
    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        if path.is_empty() {
            return Err(StoreError::invalid_path("path cannot be empty"));
        }

        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(StoreError::invalid_path(path));
        }

        Ok(self.root.join(relative))
    }

    async fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Stage, commit and push one path; best effort
    async fn git_sync(&self, path: &str, message: &str) {
        let Some(git) = &self.git else {
            return;
        };

        let steps: [&[&str]; 3] = [
            &["add", path],
            &["commit", "-m", message],
            &["push", &git.remote, &git.branch],
        ];

        for args in steps {
            if let Err(e) = self.run_git(args).await {
                tracing::warn!("Git step failed, local write kept: {}", e);
                return;
            }
        }

        tracing::info!(path, "Committed and pushed to {}/{}", git.remote, git.branch);
    }

    async fn run_git(&self, args: &[&str]) -> anyhow::Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }
        Ok(())
    }
}

impl fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore")
            .field("root", &self.root)
            .field("git", &self.git)
            .finish()
    }
}

#[async_trait]
impl SiteStore for LocalStore {
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full = self.resolve(path)?;

        match fs::read(&full).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &str, data: &[u8], message: &str) -> StoreResult<()> {
        let full = self.resolve(path)?;
        Self::ensure_parent_dir(&full).await?;

        // Temp file + rename so a crash never exposes a partial write.
        // The suffix is appended, not substituted, so `a.png` and `a.json`
        // never share a temp name.
        let mut temp_name = full
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        temp_name.push(".tmp");
        let temp = full.with_file_name(temp_name);
        let mut file = fs::File::create(&temp).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp, &full).await?;

        tracing::debug!(path, bytes = data.len(), "Wrote file to working tree");
        self.git_sync(path, message).await;
        Ok(())
    }

    async fn delete(&self, path: &str, message: &str) -> StoreResult<()> {
        let full = self.resolve(path)?;

        match fs::remove_file(&full).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(path));
            }
            Err(e) => return Err(e.into()),
        }

        self.git_sync(path, message).await;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<FileEntry>> {
        let dir = self.resolve(prefix)?;

        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            files.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let (_dir, store) = store();
        store
            .write("public/content/works.json", b"[1,2,3]", "Update works content")
            .await
            .unwrap();

        let data = store.read("public/content/works.json").await.unwrap();
        assert_eq!(data, b"[1,2,3]");
    }

    #[tokio::test]
    async fn write_overwrites_wholesale() {
        let (_dir, store) = store();
        store.write("public/a.json", b"old", "m").await.unwrap();
        store.write("public/a.json", b"new", "m").await.unwrap();
        assert_eq!(store.read("public/a.json").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store.read("public/missing.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store
            .delete("public/images/gone.png", "Delete gone.png from images")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_then_read_fails() {
        let (_dir, store) = store();
        store.write("public/images/x.png", b"png", "m").await.unwrap();
        store.delete("public/images/x.png", "m").await.unwrap();
        assert!(store.read("public/images/x.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn temp_file_never_clobbers_sibling() {
        let (_dir, store) = store();
        store.write("public/images/a.tmp", b"keep me", "m").await.unwrap();
        store.write("public/images/a.png", b"png", "m").await.unwrap();

        assert_eq!(store.read("public/images/a.tmp").await.unwrap(), b"keep me");
        assert_eq!(store.read("public/images/a.png").await.unwrap(), b"png");

        let entries = store.list("public/images").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "a.tmp"]);
    }

    #[tokio::test]
    async fn list_sorted_files_only() {
        let (_dir, store) = store();
        store.write("public/images/b.png", b"bb", "m").await.unwrap();
        store.write("public/images/a.png", b"a", "m").await.unwrap();
        store.write("public/images/sub/c.png", b"c", "m").await.unwrap();

        let entries = store.list("public/images").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(entries[0].size, 1);
        assert_eq!(entries[1].size, 2);
    }

    #[tokio::test]
    async fn list_missing_folder_is_empty() {
        let (_dir, store) = store();
        assert!(store.list("public/logos").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_paths_rejected() {
        let (_dir, store) = store();
        let err = store.write("../escape.json", b"x", "m").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));

        let err = store.read("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
