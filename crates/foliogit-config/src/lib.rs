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

//! Configuration for the FolioGit admin backend
//!
//! All configuration lives in one [`SiteConfig`] struct, constructed once at
//! process start and passed by reference into the session codec and the
//! stores. Values come from an optional `foliogit.toml` in the working
//! directory, overridden by environment variables.
//!
//! Missing auth secrets are a startup failure for the server binary; missing
//! GitHub credentials are reported per publish call instead, so a fresh
//! checkout can still serve read-only development traffic.

pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Deployment environment, selecting the persistence strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local filesystem writes plus local git push
    #[default]
    Development,
    /// Read-only filesystem; the GitHub contents API is the only durable store
    Production,
}

impl Environment {
    /// Parse from an environment-variable value
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::invalid_value(
                "environment",
                format!("expected development or production, got '{other}'"),
            )),
        }
    }
}

/// GitHub host integration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token; absence is a soft, per-publish failure
    #[serde(default)]
    pub token: Option<String>,

    /// Target repository as `owner/repo`
    #[serde(default)]
    pub repo: Option<String>,

    /// Branch that publishes commit to
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Committer identity attached to host-side commits
    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    #[serde(default = "default_committer_email")]
    pub committer_email: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            repo: None,
            branch: default_branch(),
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
        }
    }
}

/// Development-mode persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalGitConfig {
    /// Root of the site working tree that files are written under
    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,

    /// Remote that local commits are pushed to
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Disable the stage/commit/push step entirely (filesystem writes only)
    #[serde(default = "default_push")]
    pub push: bool,
}

impl Default for LocalGitConfig {
    fn default() -> Self {
        Self {
            site_root: default_site_root(),
            remote: default_remote(),
            branch: default_branch(),
            push: default_push(),
        }
    }
}

/// Top-level configuration for the admin backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret the operator logs in with
    #[serde(default)]
    pub admin_secret: Option<String>,

    /// Secret that session tokens are signed with
    #[serde(default)]
    pub session_secret: Option<String>,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub local: LocalGitConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            host: default_host(),
            port: default_port(),
            admin_secret: None,
            session_secret: None,
            github: GitHubConfig::default(),
            local: LocalGitConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_site_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_push() -> bool {
    true
}

fn default_committer_name() -> String {
    "Admin Panel".to_string()
}

fn default_committer_email() -> String {
    "admin@foliogit.local".to_string()
}

impl SiteConfig {
    /// Load configuration from `foliogit.toml` (if present) plus environment
    /// variable overrides
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(Path::new("foliogit.toml"))
    }

    /// Load configuration from the given file, falling back to defaults when
    /// it does not exist, then apply environment variable overrides
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment-variable lookup
    ///
    /// Taking the lookup as a closure keeps override handling testable
    /// without mutating the process environment.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(value) = lookup("FOLIOGIT_ENV") {
            self.environment = Environment::parse(&value)?;
        }
        if let Some(value) = lookup("FOLIOGIT_HOST") {
            self.host = value;
        }
        if let Some(value) = lookup("FOLIOGIT_PORT") {
            self.port = value.parse().map_err(|_| {
                ConfigError::invalid_value("port", format!("not a port number: '{value}'"))
            })?;
        }
        if let Some(value) = lookup("ADMIN_SECRET") {
            self.admin_secret = Some(value);
        }
        if let Some(value) = lookup("SESSION_SECRET") {
            self.session_secret = Some(value);
        }
        if let Some(value) = lookup("GITHUB_TOKEN") {
            self.github.token = Some(value);
        }
        if let Some(value) = lookup("GITHUB_REPO") {
            self.github.repo = Some(value);
        }
        if let Some(value) = lookup("GITHUB_BRANCH") {
            self.github.branch = value;
        }
        if let Some(value) = lookup("SITE_ROOT") {
            self.local.site_root = PathBuf::from(value);
        }
        if let Some(value) = lookup("GIT_REMOTE") {
            self.local.remote = value;
        }
        if let Some(value) = lookup("GIT_BRANCH") {
            self.local.branch = value;
        }
        Ok(())
    }

    /// Both auth secrets, or a MissingRequired error naming the absent one
    ///
    /// The server binary calls this at startup; the auth path cannot operate
    /// without them.
    pub fn require_auth_secrets(&self) -> ConfigResult<(&str, &str)> {
        let admin = self
            .admin_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::missing_required("admin_secret (ADMIN_SECRET)"))?;
        let session = self
            .session_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::missing_required("session_secret (SESSION_SECRET)"))?;
        Ok((admin, session))
    }

    /// Whether the production persistence strategy is active
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Full bind address for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|v| (*v).to_string())
    }

    #[test]
    fn defaults_are_development() {
        let config = SiteConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.local.remote, "origin");
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("FOLIOGIT_ENV", "production"),
            ("FOLIOGIT_PORT", "8080"),
            ("ADMIN_SECRET", "letmein"),
            ("SESSION_SECRET", "signing"),
            ("GITHUB_TOKEN", "ghp_token"),
            ("GITHUB_REPO", "owner/site"),
            ("GITHUB_BRANCH", "deploy"),
        ]
        .into_iter()
        .collect();

        let mut config = SiteConfig::default();
        config.apply_overrides(lookup(&vars)).unwrap();

        assert!(config.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_secret.as_deref(), Some("letmein"));
        assert_eq!(config.github.repo.as_deref(), Some("owner/site"));
        assert_eq!(config.github.branch, "deploy");
    }

    #[test]
    fn invalid_environment_rejected() {
        let vars: HashMap<&str, &str> = [("FOLIOGIT_ENV", "staging")].into_iter().collect();
        let mut config = SiteConfig::default();
        let err = config.apply_overrides(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn invalid_port_rejected() {
        let vars: HashMap<&str, &str> = [("FOLIOGIT_PORT", "not-a-port")].into_iter().collect();
        let mut config = SiteConfig::default();
        assert!(config.apply_overrides(lookup(&vars)).is_err());
    }

    #[test]
    fn missing_secrets_reported_by_name() {
        let config = SiteConfig::default();
        let err = config.require_auth_secrets().unwrap_err();
        assert!(err.to_string().contains("admin_secret"));

        let config = SiteConfig {
            admin_secret: Some("letmein".to_string()),
            ..Default::default()
        };
        let err = config.require_auth_secrets().unwrap_err();
        assert!(err.to_string().contains("session_secret"));
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foliogit.toml");
        std::fs::write(
            &path,
            r#"
environment = "production"
port = 4000

[github]
repo = "owner/site"
"#,
        )
        .unwrap();

        let config = SiteConfig::load_from(&path).unwrap();
        assert!(config.is_production());
        assert_eq!(config.port, 4000);
        assert_eq!(config.github.repo.as_deref(), Some("owner/site"));
    }
}
