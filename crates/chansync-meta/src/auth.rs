//! Credentials for the remote workspace

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::ConfigStore;
use crate::{Error, Result};

/// Environment variable overriding [`AuthConfig::instance_url`].
pub const INSTANCE_URL_ENV: &str = "CHANSYNC_INSTANCE_URL";
/// Environment variable overriding [`AuthConfig::auth_token`].
pub const AUTH_TOKEN_ENV: &str = "CHANSYNC_AUTH_TOKEN";

/// Server URL and personal access token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, alias = "InstanceURL", alias = "instanceUrl")]
    pub instance_url: String,
    #[serde(default, alias = "AuthToken", alias = "authToken")]
    pub auth_token: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("instance_url", &self.instance_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl AuthConfig {
    pub fn new(instance_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Resolve credentials from `path` and the process environment.
    ///
    /// A missing file is allowed when the environment supplies both values.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be decoded or if either
    /// field is still empty after overrides are applied.
    pub fn resolve(path: &Path) -> Result<Self> {
        Self::resolve_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::resolve`] with an explicit environment lookup.
    pub fn resolve_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = if path.exists() {
            ConfigStore::new().load(path)?
        } else {
            tracing::debug!(path = %path.display(), "Auth file not found, using environment only");
            AuthConfig::default()
        };

        let config = base.with_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply non-empty environment values on top of the file values.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(INSTANCE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.instance_url = url;
        }
        if let Some(token) = lookup(AUTH_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.auth_token = token;
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::MissingAuthField`] for the first empty field.
    pub fn validate(&self) -> Result<()> {
        if self.instance_url.trim().is_empty() {
            return Err(Error::MissingAuthField {
                field: "instance_url",
            });
        }
        if self.auth_token.trim().is_empty() {
            return Err(Error::MissingAuthField {
                field: "auth_token",
            });
        }
        Ok(())
    }
}
