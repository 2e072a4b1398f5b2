use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use storefront_auth::landing::GUEST_HOME;

use crate::storage::default_storage_path;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// `None` resolves to the per-user data directory.
    pub storage_path: Option<PathBuf>,
    /// Path of the "current user" endpoint.
    pub profile_path: String,
    /// Where the role gate sends denied navigations.
    pub denied_route: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_millis(10_000),
            storage_path: None,
            profile_path: "/auth/me".to_string(),
            denied_route: GUEST_HOME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create config from `STOREFRONT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let request_timeout = match lookup("STOREFRONT_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "STOREFRONT_TIMEOUT_MS",
                reason: format!("'{raw}' is not a number of milliseconds"),
            })?),
            None => defaults.request_timeout,
        };

        let denied_route = lookup("STOREFRONT_DENIED_ROUTE").unwrap_or(defaults.denied_route);
        if !denied_route.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: "STOREFRONT_DENIED_ROUTE",
                reason: "must be an absolute path".to_string(),
            });
        }

        Ok(Self {
            api_base_url: lookup("STOREFRONT_API_URL").unwrap_or(defaults.api_base_url),
            request_timeout,
            storage_path: lookup("STOREFRONT_STORAGE_PATH").map(PathBuf::from),
            profile_path: lookup("STOREFRONT_PROFILE_PATH").unwrap_or(defaults.profile_path),
            denied_route,
        })
    }

    pub fn resolved_storage_path(&self) -> anyhow::Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => default_storage_path(),
        }
    }
}
