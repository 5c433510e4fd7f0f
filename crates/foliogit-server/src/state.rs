use std::sync::Arc;

use foliogit_auth::SessionCodec;
use foliogit_config::{ConfigError, SiteConfig};
use foliogit_store::SiteStore;

/// Shared application state
pub struct AppState {
    /// Full configuration (environment, GitHub integration, bind address)
    pub config: SiteConfig,

    /// Login shared secret, proven present at construction
    pub admin_secret: String,

    /// Session credential codec
    pub sessions: SessionCodec,

    /// Active persistence backend for the configured environment
    pub store: Arc<dyn SiteStore>,
}

impl AppState {
    /// Create app state, failing if the auth secrets are not configured
    ///
    /// This is the hard startup-adjacent failure for the auth path; the
    /// store's host credentials are deliberately not checked here.
    pub fn new(config: SiteConfig, store: Arc<dyn SiteStore>) -> Result<Self, ConfigError> {
        let (admin_secret, session_secret) = config.require_auth_secrets()?;
        let admin_secret = admin_secret.to_string();
        let sessions = SessionCodec::new(session_secret);

        Ok(Self {
            config,
            admin_secret,
            sessions,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliogit_store::MockStore;

    #[test]
    fn missing_secrets_fail_construction() {
        let config = SiteConfig::default();
        let result = AppState::new(config, Arc::new(MockStore::new()));
        assert!(result.is_err());
    }

    #[test]
    fn secrets_present_constructs() {
        let config = SiteConfig {
            admin_secret: Some("letmein".to_string()),
            session_secret: Some("signing".to_string()),
            ..Default::default()
        };
        assert!(AppState::new(config, Arc::new(MockStore::new())).is_ok());
    }
}
