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

//! Session credential codec for the single-operator admin surface
//!
//! There is no user database: the operator proves possession of the login
//! secret once, and receives a signed, expiring token (HMAC-SHA256 via
//! `jsonwebtoken`) carried in an HttpOnly cookie. Validity is recomputed
//! from the signature and embedded timestamps on every request; nothing is
//! stored server-side, so logout is purely a cookie-clearing directive.

use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "admin_session";

/// Result type alias for session operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while issuing a credential
///
/// Verification never surfaces an error: a bad token is a normal negative
/// result, not an exception.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims embedded in the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The operator passed the login check
    pub authenticated: bool,

    /// Issued at (unix timestamp)
    pub iat: i64,

    /// Expiration time (unix timestamp)
    pub exp: i64,
}

/// Issues and verifies the operator's session credential
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    /// Create a codec signing with the given secret, 24 hour validity
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(24))
    }

    /// Create a codec with a custom validity window
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a signed session token
    pub fn issue(&self) -> AuthResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            authenticated: true,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify a session token
    ///
    /// Returns the embedded `authenticated` flag on success; false for any
    /// malformed, tampered or expired token.
    pub fn verify(&self, token: &str) -> bool {
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims.authenticated,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                false
            }
        }
    }

    /// Cookie directive carrying a freshly issued token
    ///
    /// HttpOnly and SameSite=Strict always; Secure in production.
    pub fn login_cookie(&self, token: String, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure)
            .path("/")
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }

    /// Cookie directive that immediately expires the session
    pub fn logout_cookie(&self, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure)
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys are secret material; show only the validity window
        f.debug_struct("SessionCodec").field("ttl", &self.ttl).finish()
    }
}
