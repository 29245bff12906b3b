//! Single-flight token refresh.
//!
//! At most one refresh is in flight process-wide. The first 401 handler to
//! find the slot empty publishes the refresh computation; every 401 handler
//! arriving before it settles joins the same computation and observes the
//! identical resolution. The slot clears itself when the refresh settles, so
//! a later 401 always starts a distinct attempt.

use async_trait::async_trait;
use futures_util::{FutureExt as _, future::Shared};
use skillhub_types::{ApiError, TokenPair, TokenRefresher, traits::Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Why a refresh attempt did not produce a new access token.
///
/// Cloneable so every joiner of the shared computation receives it; callers
/// of the client never see it, they get the original 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    #[error("no refresh token in store")]
    MissingRefreshToken,
    #[error("refresh endpoint rejected: {0}")]
    Rejected(String),
    #[error("token store error: {0}")]
    Store(String),
}

/// Resolution of one refresh attempt: the new access token, or the failure.
pub type RefreshOutcome = std::result::Result<String, RefreshFailure>;

type RefreshFuture = Pin<Box<dyn Future<Output = RefreshOutcome> + Send>>;
type SharedRefresh = Shared<RefreshFuture>;

struct GateState {
    pending: Option<SharedRefresh>,
    /// Id of the most recently published computation; every joiner of one
    /// attempt observes the same generation, so downstream teardown can
    /// deduplicate per attempt.
    generation: u64,
}

/// The shared pending-refresh slot.
pub struct RefreshGate {
    state: Arc<Mutex<GateState>>,
}

impl RefreshGate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GateState {
                pending: None,
                generation: 0,
            })),
        }
    }

    /// Join the in-flight refresh, or publish a new one built from `make`.
    ///
    /// The check and the publish happen under one non-async lock with no
    /// suspension point in between, so two 401 handlers can never both
    /// initiate. Returns the shared computation, its generation, and whether
    /// this caller initiated it.
    pub fn acquire_or_join<F>(&self, make: impl FnOnce() -> F) -> (SharedRefresh, u64, bool)
    where
        F: Future<Output = RefreshOutcome> + Send + 'static,
    {
        let mut state = self.state.lock().unwrap();
        if let Some(pending) = state.pending.as_ref() {
            return (pending.clone(), state.generation, false);
        }
        state.generation += 1;
        let gate = Arc::clone(&self.state);
        let refresh = make();
        let shared = async move {
            let outcome = refresh.await;
            // Reset the slot before any awaiter observes the resolution, so
            // a newly-arriving 401 never joins a settled computation.
            gate.lock().unwrap().pending = None;
            outcome
        }
        .boxed()
        .shared();
        state.pending = Some(shared.clone());
        (shared, state.generation, true)
    }

    /// Allocate a fresh generation without publishing a computation, for
    /// terminal failures that bypass the refresh protocol entirely.
    #[must_use]
    pub fn bump(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.generation
    }

    /// Whether a refresh is currently outstanding.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.state.lock().unwrap().pending.is_some()
    }
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Production [`TokenRefresher`]: posts the refresh token to the backend's
/// refresh endpoint and parses the returned pair.
pub struct HttpTokenRefresher {
    http: reqwest::Client,
    refresh_url: String,
}

impl HttpTokenRefresher {
    /// Create a refresher targeting `base_url` + `refresh_path`.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, refresh_path: &str) -> Self {
        Self {
            http,
            refresh_url: format!("{}{refresh_path}", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let resp = self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        parse_token_pair(&json)
    }
}

/// Parse the refresh/login endpoint JSON response into a [`TokenPair`].
///
/// A missing `refreshToken` field is not an error: the backend may keep the
/// old refresh token valid instead of rotating it.
///
/// # Errors
///
/// Returns an error if the response is missing the `accessToken` field.
pub fn parse_token_pair(json: &serde_json::Value) -> Result<TokenPair> {
    let access = json
        .get("accessToken")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ApiError::Auth("missing accessToken in response".into()))?;

    let mut pair = TokenPair::new(access);
    if let Some(refresh) = json.get("refreshToken").and_then(serde_json::Value::as_str) {
        pair = pair.with_refresh(refresh);
    }
    Ok(pair)
}
