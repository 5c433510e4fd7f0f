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

//! Store error types and utilities

use std::io;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during site-store operations
///
/// The variants map onto the failure taxonomy the endpoints distinguish:
/// `NotFound` becomes a 404-style signal, `Unconfigured` and `Publish`
/// become the credential-check "publish error" response, and everything
/// else is a generic server failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File not found at the given path
    #[error("file not found: {0}")]
    NotFound(String),

    /// Host credentials missing or malformed; never retried
    #[error("publisher not configured: {0}")]
    Unconfigured(String),

    /// The host rejected the publish call (non-2xx, including stale
    /// revision-marker conflicts)
    #[error("publish failed: {0}")]
    Publish(String),

    /// Transport-level failure talking to the host
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error from the local filesystem backend
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid target path (empty, traversal, etc.)
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Transparent delegation for wrapped error types
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create a NotFound error for the given path
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        StoreError::NotFound(path.into())
    }

    /// Create an Unconfigured error with context
    pub fn unconfigured<S: Into<String>>(msg: S) -> Self {
        StoreError::Unconfigured(msg.into())
    }

    /// Create a Publish error with context
    pub fn publish<S: Into<String>>(msg: S) -> Self {
        StoreError::Publish(msg.into())
    }

    /// Create an InvalidPath error with context
    pub fn invalid_path<S: Into<String>>(msg: S) -> Self {
        StoreError::InvalidPath(msg.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Check if this failure should be surfaced as a publish/credential
    /// problem rather than a generic one
    pub fn is_publish_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Unconfigured(_) | StoreError::Publish(_) | StoreError::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classified() {
        let err = StoreError::not_found("public/works/poster.jpg");
        assert!(err.is_not_found());
        assert!(!err.is_publish_failure());
        assert_eq!(err.to_string(), "file not found: public/works/poster.jpg");
    }

    #[test]
    fn publish_failures_classified() {
        assert!(StoreError::unconfigured("no token").is_publish_failure());
        assert!(StoreError::publish("409 conflict").is_publish_failure());
        assert!(!StoreError::invalid_path("empty").is_publish_failure());
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::other("write failed");
        let err = StoreError::from(io_err);
        assert!(matches!(err, StoreError::Io(_)));
    }
}
