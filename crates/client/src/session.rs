//! Login, registration and logout flows.
//!
//! These are the only writers of the token store besides the refresh path.
//! They talk to the auth endpoints directly through the transport, so a 401
//! here is a plain rejection and never enters the refresh protocol.

use crate::config::AuthPaths;
use crate::refresh::parse_token_pair;
use serde::Serialize;
use skillhub_types::{RequestDescriptor, TokenKey, TokenStore, Transport, traits::Result};
use std::sync::Arc;

/// Login credentials, serialized as the backend expects them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Drives the session lifecycle against the auth endpoints.
pub struct SessionFlow {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    paths: AuthPaths,
}

impl SessionFlow {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>, paths: AuthPaths) -> Self {
        Self {
            transport,
            store,
            paths,
        }
    }

    /// Exchange credentials for a token pair and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] if the backend rejects the credentials,
    /// [`ApiError::Auth`] if the response carries no access token, or a
    /// transport/storage error.
    ///
    /// [`ApiError::Upstream`]: skillhub_types::ApiError::Upstream
    /// [`ApiError::Auth`]: skillhub_types::ApiError::Auth
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let request = RequestDescriptor::post(&self.paths.login).with_json(credentials)?;
        let response = self.transport.execute(&request, None).await?;
        let json: serde_json::Value = response.json()?;
        let pair = parse_token_pair(&json)?;
        self.store.save_pair(&pair).await?;
        tracing::debug!("login succeeded, token pair stored");
        Ok(())
    }

    /// Create an account. Backends that return a token pair on registration
    /// get the session persisted immediately; others leave the store alone.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] on rejection, or a transport/storage
    /// error.
    ///
    /// [`ApiError::Upstream`]: skillhub_types::ApiError::Upstream
    pub async fn register<T: Serialize>(&self, registration: &T) -> Result<()> {
        let request = RequestDescriptor::post(&self.paths.register).with_json(registration)?;
        let response = self.transport.execute(&request, None).await?;
        let json: serde_json::Value = response.json()?;
        if let Ok(pair) = parse_token_pair(&json) {
            self.store.save_pair(&pair).await?;
        }
        Ok(())
    }

    /// End the session: best-effort server-side invalidation, then clear the
    /// local store. The local teardown happens even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the local store cannot be cleared.
    pub async fn logout(&self) -> Result<()> {
        if let Some(access) = self.store.get(TokenKey::Access).await? {
            let request = RequestDescriptor::post(&self.paths.logout);
            if let Err(e) = self.transport.execute(&request, Some(&access)).await {
                tracing::debug!(error = %e, "logout call failed, clearing local session anyway");
            }
        }
        self.store.clear().await
    }
}
