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

//! Persistence layer for the FolioGit admin backend
//!
//! Every content or media mutation ends up as a commit in the site's backing
//! git repository. The [`SiteStore`] trait is the seam between the endpoint
//! layer and the two ways of getting there:
//!
//! - [`GitHubStore`]: production. The deployment filesystem is read-only and
//!   ephemeral, so the repository host's contents API is the only durable
//!   store. One metadata round trip resolves the current revision marker,
//!   one write carries the change.
//! - [`LocalStore`]: development. Writes land on disk first (authoritative
//!   for that mode), then a best-effort local `git` stage/commit/push keeps
//!   the remote in sync.
//!
//! [`MockStore`] is the in-memory test double.
//!
//! Paths are repository-relative (`public/works/poster.jpg`); messages are
//! commit messages. There are no retries and no queue: each call is a single
//! best-effort round trip, and a conflicting concurrent write surfaces as an
//! ordinary [`StoreError::Publish`] for the operator to retry by hand.

pub mod error;
pub mod github;
pub mod local;
pub mod mock;

pub use error::{StoreError, StoreResult};
pub use github::{GitHubStore, RepoId};
pub use local::LocalStore;
pub use mock::MockStore;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use foliogit_config::SiteConfig;

/// One entry in a folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Bare file name (no directory component)
    pub name: String,

    /// Size in bytes as reported by the backend
    pub size: u64,
}

/// Storage seam between the admin endpoints and the backing repository
///
/// Implementations must be `Send + Sync + Debug` so a store can be shared
/// behind an `Arc<dyn SiteStore>` across request handlers.
///
/// # Error contract
///
/// - `read`: [`StoreError::NotFound`] when the path does not exist.
/// - `write`: replaces the file wholesale; publish/credential failures are
///   classified by [`StoreError::is_publish_failure`].
/// - `delete`: remote backends treat an absent file as already deleted and
///   succeed; the local backend reports [`StoreError::NotFound`] so the
///   endpoint can surface a 404 in development.
/// - `list`: sorted by name; a missing folder lists as empty.
#[async_trait]
pub trait SiteStore: Send + Sync + Debug {
    /// Read the file at a repository-relative path
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Create or replace the file at `path` with `data`, committing with
    /// `message`
    async fn write(&self, path: &str, data: &[u8], message: &str) -> StoreResult<()>;

    /// Delete the file at `path`, committing with `message`
    async fn delete(&self, path: &str, message: &str) -> StoreResult<()>;

    /// List the files directly under `prefix`, sorted by name
    async fn list(&self, prefix: &str) -> StoreResult<Vec<FileEntry>>;
}

/// Select the persistence strategy for the configured environment
///
/// Development writes to the local working tree (with a best-effort git
/// push); production goes solely through the GitHub contents API. Host
/// credentials are deliberately not checked here: their absence is a soft
/// failure reported per publish call, so the server still starts without
/// them.
pub fn store_for(config: &SiteConfig) -> StoreResult<Arc<dyn SiteStore>> {
    if config.is_production() {
        tracing::info!("Using GitHub contents API persistence (production)");
        Ok(Arc::new(GitHubStore::from_config(config)?))
    } else {
        tracing::info!(
            "Using local filesystem persistence at {} (development)",
            config.local.site_root.display()
        );
        Ok(Arc::new(LocalStore::from_config(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliogit_config::Environment;

    #[test]
    fn trait_is_object_safe() {
        fn _check_object_safe(_: &dyn SiteStore) {}
    }

    #[test]
    fn development_selects_local_store() {
        let config = SiteConfig::default();
        let store = store_for(&config).unwrap();
        assert!(format!("{store:?}").contains("LocalStore"));
    }

    #[test]
    fn production_selects_github_store() {
        let config = SiteConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        let store = store_for(&config).unwrap();
        assert!(format!("{store:?}").contains("GitHubStore"));
    }
}
