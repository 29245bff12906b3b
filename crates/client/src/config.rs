//! Client configuration loaded via figment (defaults merged with YAML).

use crate::endpoints::EndpointPolicy;
use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_database_url() -> String {
    "sqlite:./skillhub-session.db".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_register_path() -> String {
    "/auth/register".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_public_paths() -> Vec<String> {
    vec!["/skills/search".to_string(), "/captcha".to_string()]
}

/// Paths of the authentication endpoints. A 401 on any of these is a genuine
/// rejection and never triggers a refresh attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPaths {
    #[serde(default = "default_login_path")]
    pub login: String,
    #[serde(default = "default_register_path")]
    pub register: String,
    #[serde(default = "default_refresh_path")]
    pub refresh: String,
    #[serde(default = "default_logout_path")]
    pub logout: String,
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self {
            login: default_login_path(),
            register: default_register_path(),
            refresh: default_refresh_path(),
            logout: default_logout_path(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL all request paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout in seconds; a timeout is an ordinary transport
    /// failure, never a refresh trigger.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Authentication endpoint paths.
    #[serde(default)]
    pub auth: AuthPaths,
    /// Path substrings reachable without authentication. A 401 there is a
    /// genuine authorization failure, so no refresh is attempted.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
    /// SQLite database URL for the persistent token store (CLI).
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            auth: AuthPaths::default(),
            public_paths: default_public_paths(),
            database_url: default_database_url(),
        }
    }
}

impl ClientConfig {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Build the refresh-exemption policy from the configured paths.
    #[must_use]
    pub fn endpoint_policy(&self) -> EndpointPolicy {
        EndpointPolicy::new(
            vec![
                self.auth.login.clone(),
                self.auth.register.clone(),
                self.auth.refresh.clone(),
                self.auth.logout.clone(),
            ],
            self.public_paths.clone(),
        )
    }
}
