//! Async traits shared across all skillhub crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `skillhub-types`, not on each other.

use crate::{RequestDescriptor, Response, TokenKey, TokenPair};
use async_trait::async_trait;

pub use crate::error::Result;

/// Persistent key/value storage for the access and refresh tokens.
///
/// Durable across process restarts within the same client installation. The
/// store is the sole mutable shared resource of the client; it is written
/// only by the login/logout flows and by the single-flight refresh path.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the value stored under `key`, if any.
    async fn get(&self, key: TokenKey) -> Result<Option<String>>;
    /// Persist `value` under `key`, overwriting any previous value.
    async fn set(&self, key: TokenKey, value: &str) -> Result<()>;
    /// Remove the value stored under `key`.
    async fn remove(&self, key: TokenKey) -> Result<()>;

    /// Persist a token pair. A pair without a refresh token leaves the
    /// stored refresh token in place (rotating vs. static refresh tokens is
    /// the backend's choice).
    async fn save_pair(&self, pair: &TokenPair) -> Result<()> {
        self.set(TokenKey::Access, &pair.access_token).await?;
        if let Some(refresh) = &pair.refresh_token {
            self.set(TokenKey::Refresh, refresh).await?;
        }
        Ok(())
    }

    /// Remove both tokens (logout / terminal session teardown).
    async fn clear(&self) -> Result<()> {
        self.remove(TokenKey::Access).await?;
        self.remove(TokenKey::Refresh).await?;
        Ok(())
    }
}

/// Exchanges a refresh token for a new token pair at the backend.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Call the refresh endpoint once. Any non-2xx status or transport error
    /// is a failure; the client never retries a refresh.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}

/// The raw HTTP transport: executes one descriptor against the backend.
///
/// Returns `Ok` for any received response regardless of status; `Err` only
/// when no response was received (connect error, timeout, ...).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request`, attaching `bearer` as an `Authorization` header
    /// when present.
    async fn execute(&self, request: &RequestDescriptor, bearer: Option<&str>)
    -> Result<Response>;
}

/// Notified when the session ends terminally (store cleared, caller must
/// re-authenticate). The client never performs navigation itself; a UI shell
/// typically redirects to its login surface from here.
pub trait SessionObserver: Send + Sync {
    /// Fired at most once per terminal authentication failure.
    fn session_ended(&self);
}
