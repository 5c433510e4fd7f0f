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

//! In-memory mock store for testing
//!
//! Mirrors the remote backend's semantics: deletes of absent files succeed,
//! listings are sorted, and a missing folder lists as empty. Commit messages
//! are recorded so tests can assert on them, and [`MockStore::failing`]
//! injects a publish failure on every mutation for the credential-error
//! paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{FileEntry, SiteStore, StoreError, StoreResult};

/// In-memory site store for tests
#[derive(Clone, Default)]
pub struct MockStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    messages: Arc<RwLock<Vec<String>>>,
    fail_mutations: bool,
}

impl MockStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with initial files
    pub fn with_files(files: HashMap<String, Vec<u8>>) -> Self {
        Self {
            files: Arc::new(RwLock::new(files)),
            ..Default::default()
        }
    }

    /// Create a mock store whose every mutation fails like a rejected
    /// publish
    pub fn failing() -> Self {
        Self {
            fail_mutations: true,
            ..Default::default()
        }
    }

    /// Seed a file directly, bypassing the commit bookkeeping
    pub async fn insert(&self, path: &str, data: &[u8]) {
        self.files
            .write()
            .await
            .insert(path.to_string(), data.to_vec());
    }

    /// Number of stored files
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Commit messages recorded for mutations, in order
    pub async fn messages(&self) -> Vec<String> {
        self.messages.read().await.clone()
    }

    fn injected_failure() -> StoreError {
        StoreError::publish("injected publish failure")
    }
}

impl fmt::Debug for MockStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockStore")
            .field("fail_mutations", &self.fail_mutations)
            .finish()
    }
}

#[async_trait]
impl SiteStore for MockStore {
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::not_found(path))
    }

    async fn write(&self, path: &str, data: &[u8], message: &str) -> StoreResult<()> {
        if self.fail_mutations {
            return Err(Self::injected_failure());
        }

        self.messages.write().await.push(message.to_string());
        self.files
            .write()
            .await
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, path: &str, message: &str) -> StoreResult<()> {
        if self.fail_mutations {
            return Err(Self::injected_failure());
        }

        self.messages.write().await.push(message.to_string());
        // Absent file: already deleted, idempotent success
        self.files.write().await.remove(path);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<FileEntry>> {
        let files = self.files.read().await;
        let mut entries: Vec<FileEntry> = files
            .iter()
            .filter_map(|(path, data)| {
                let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(FileEntry {
                    name: rest.to_string(),
                    size: data.len() as u64,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_cycle() {
        let store = MockStore::new();
        store.write("public/a.json", b"[]", "Update a").await.unwrap();
        assert_eq!(store.read("public/a.json").await.unwrap(), b"[]");

        store.delete("public/a.json", "Delete a").await.unwrap();
        assert!(store.read("public/a.json").await.unwrap_err().is_not_found());
        assert_eq!(store.messages().await, vec!["Update a", "Delete a"]);
    }

    #[tokio::test]
    async fn delete_absent_succeeds_repeatedly() {
        let store = MockStore::new();
        store.delete("public/gone.png", "m").await.unwrap();
        store.delete("public/gone.png", "m").await.unwrap();
    }

    #[tokio::test]
    async fn list_is_sorted_and_shallow() {
        let store = MockStore::new();
        store.insert("public/images/b.png", b"bb").await;
        store.insert("public/images/a.png", b"a").await;
        store.insert("public/images/deep/c.png", b"c").await;
        store.insert("public/logos/l.png", b"l").await;

        let entries = store.list("public/images").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn failing_store_rejects_mutations() {
        let store = MockStore::failing();
        let err = store.write("public/a.json", b"[]", "m").await.unwrap_err();
        assert!(err.is_publish_failure());
        let err = store.delete("public/a.json", "m").await.unwrap_err();
        assert!(err.is_publish_failure());
    }
}
