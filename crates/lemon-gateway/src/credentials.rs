//! Credential storage in the browser's cookie jar.
//!
//! The access and refresh tokens live in two independent HTTP-only cookies.
//! Their max-ages are fixed and never derived from the token contents.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

/// Access token cookie name.
pub const ACCESS_TOKEN_COOKIE: &str = "lemon_access";

/// Refresh token cookie name.
pub const REFRESH_TOKEN_COOKIE: &str = "lemon_refresh";

/// Access token cookie max-age (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token cookie max-age (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// An access/refresh token pair as issued by the Lemon API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

/// Credentials presented by the browser on an incoming request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl StoredCredentials {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    /// Read both credentials from the request cookies. Empty values count as absent.
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self::new(
            jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()),
            jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()),
        )
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Attributes shared by both auth cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Set the `Secure` flag. Disabled only for local development.
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl CookiePolicy {
    pub fn development() -> Self {
        Self { secure: false }
    }

    fn cookie(&self, name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(max_age_secs))
            .build()
    }

    /// Overwrite both cookies with a new token pair.
    pub fn store(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.cookie(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.clone(),
            ACCESS_TOKEN_TTL_SECS,
        ))
        .add(self.cookie(
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token.clone(),
            REFRESH_TOKEN_TTL_SECS,
        ))
    }

    /// Expire both cookies, whether or not the browser sent them.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.cookie(ACCESS_TOKEN_COOKIE, String::new(), 0))
            .add(self.cookie(REFRESH_TOKEN_COOKIE, String::new(), 0))
    }
}
