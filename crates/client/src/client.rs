//! The authenticated HTTP client.
//!
//! One instance owns the refresh gate, so concurrent request flows coordinate
//! through explicit shared state instead of a process-wide singleton.

use crate::config::ClientConfig;
use crate::endpoints::EndpointPolicy;
use crate::refresh::{HttpTokenRefresher, RefreshFailure, RefreshGate, RefreshOutcome};
use crate::transport::ReqwestTransport;
use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use skillhub_types::{
    ApiError, RequestDescriptor, Response, SessionObserver, TokenKey, TokenRefresher, TokenStore,
    Transport, traits::Result,
};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Authenticated client for the skillhub backend.
///
/// Attaches the stored bearer token to each request. On a 401 from a
/// protected path it performs one coordinated refresh (single-flight across
/// all concurrent request flows) and replays the request once. When recovery
/// is impossible the token store is cleared, the session observer is notified
/// and the caller receives the original 401.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    observer: Arc<dyn SessionObserver>,
    policy: EndpointPolicy,
    gate: RefreshGate,
    /// Highest refresh generation already torn down, so N request flows that
    /// fail off the same refresh attempt collapse to one store clear and one
    /// observer notification.
    torn_down: AtomicU64,
}

impl ApiClient {
    /// Assemble a client from its collaborators.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        observer: Arc<dyn SessionObserver>,
        policy: EndpointPolicy,
    ) -> Self {
        Self {
            transport,
            store,
            refresher,
            observer,
            policy,
            gate: RefreshGate::new(),
            torn_down: AtomicU64::new(0),
        }
    }

    /// Build a client with the production transport and refresher.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the HTTP client cannot be constructed.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn TokenStore>,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let transport = Arc::new(ReqwestTransport::new(http.clone(), &config.base_url));
        let refresher = Arc::new(HttpTokenRefresher::new(
            http,
            &config.base_url,
            &config.auth.refresh,
        ));
        Ok(Self::new(
            transport,
            store,
            refresher,
            observer,
            config.endpoint_policy(),
        ))
    }

    /// Issue one request, transparently keeping the caller authenticated.
    ///
    /// Any non-401 response is returned unchanged, success or not. A 401 on a
    /// protected path goes through the refresh-and-replay protocol.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`] on transport failure (no retry),
    /// [`ApiError::Unauthorized`] when a 401 cannot be recovered, or a
    /// storage error if the token store fails.
    pub async fn send(&self, request: RequestDescriptor) -> Result<Response> {
        let bearer = self.store.get(TokenKey::Access).await?;
        let response = self.transport.execute(&request, bearer.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        self.recover_unauthorized(request, &response).await
    }

    /// The 401 state machine: exempt-path check, retried-flag teardown,
    /// join-or-create refresh, single replay.
    async fn recover_unauthorized(
        &self,
        request: RequestDescriptor,
        denied: &Response,
    ) -> Result<Response> {
        if self.policy.is_refresh_exempt(request.path()) {
            tracing::debug!(path = request.path(), "401 on refresh-exempt path");
            return Err(unauthorized(&request, denied));
        }
        if request.retried() {
            tracing::warn!(
                path = request.path(),
                "request denied again after refresh, ending session"
            );
            // A caller-supplied retried descriptor is its own terminal
            // failure, unrelated to any published refresh attempt.
            self.end_session(self.gate.bump()).await;
            return Err(unauthorized(&request, denied));
        }

        let (pending, generation, initiated) = self.gate.acquire_or_join(|| self.refresh_future());
        tracing::debug!(path = request.path(), initiated, "awaiting token refresh");

        match pending.await {
            Ok(access) => {
                let replay = request.retried_copy();
                let response = self.transport.execute(&replay, Some(&access)).await?;
                if response.status() == StatusCode::UNAUTHORIZED {
                    tracing::warn!(
                        path = replay.path(),
                        "replay denied with fresh token, ending session"
                    );
                    self.end_session(generation).await;
                    return Err(unauthorized(&replay, &response));
                }
                Ok(response)
            }
            Err(failure) => {
                tracing::warn!(
                    path = request.path(),
                    error = %failure,
                    "token refresh failed, ending session"
                );
                self.end_session(generation).await;
                // The caller sees the original 401, never the refresh error.
                Err(unauthorized(&request, denied))
            }
        }
    }

    /// The refresh computation published into the gate. Runs once no matter
    /// how many request flows await it; it alone writes the new pair to the
    /// store.
    fn refresh_future(&self) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        let store = Arc::clone(&self.store);
        let refresher = Arc::clone(&self.refresher);
        async move {
            let refresh_token = match store.get(TokenKey::Refresh).await {
                Ok(Some(token)) => token,
                Ok(None) => return Err(RefreshFailure::MissingRefreshToken),
                Err(e) => return Err(RefreshFailure::Store(e.to_string())),
            };
            let pair = refresher
                .refresh(&refresh_token)
                .await
                .map_err(|e| RefreshFailure::Rejected(e.to_string()))?;
            store
                .save_pair(&pair)
                .await
                .map_err(|e| RefreshFailure::Store(e.to_string()))?;
            Ok(pair.access_token)
        }
    }

    /// Terminal teardown: clear the store and notify the observer, at most
    /// once per failure generation. Every request flow failing off the same
    /// refresh attempt carries that attempt's generation, so the first one
    /// through performs the teardown and the rest only propagate their error.
    async fn end_session(&self, generation: u64) {
        if self.torn_down.fetch_max(generation, Ordering::SeqCst) >= generation {
            return;
        }
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "failed to clear token store during teardown");
        }
        self.observer.session_ended();
    }

    // ── JSON convenience layer ────────────────────────────────────────────

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Everything `send` can return, plus [`ApiError::Upstream`] on a
    /// non-2xx status and [`ApiError::Serialization`] on a malformed body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(RequestDescriptor::get(path)).await?.json()
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(RequestDescriptor::post(path).with_json(body)?)
            .await?
            .json()
    }

    /// PUT `body` as JSON to `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(RequestDescriptor::put(path).with_json(body)?)
            .await?
            .json()
    }

    /// DELETE `path`, returning the raw response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.send(RequestDescriptor::delete(path)).await
    }
}

fn unauthorized(request: &RequestDescriptor, response: &Response) -> ApiError {
    ApiError::Unauthorized {
        path: request.path().to_string(),
        body: response.text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::HeaderMap;
    use skillhub_store::InMemoryTokenStore;
    use skillhub_types::TokenPair;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// One transport call as observed by the mock backend.
    #[derive(Debug, Clone)]
    struct RecordedCall {
        path: String,
        bearer: Option<String>,
        retried: bool,
    }

    /// Scripted backend: 200 for bearers in the valid set, 401 otherwise,
    /// with optional forced status / transport failure.
    struct MockTransport {
        valid: Mutex<HashSet<String>>,
        fixed_status: Mutex<Option<StatusCode>>,
        fail_transport: Mutex<bool>,
        log: Mutex<Vec<RecordedCall>>,
    }

    impl MockTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                valid: Mutex::new(HashSet::new()),
                fixed_status: Mutex::new(None),
                fail_transport: Mutex::new(false),
                log: Mutex::new(Vec::new()),
            })
        }

        fn authorize(&self, token: &str) {
            self.valid.lock().unwrap().insert(token.to_string());
        }

        fn revoke(&self, token: &str) {
            self.valid.lock().unwrap().remove(token);
        }

        fn force_status(&self, status: StatusCode) {
            *self.fixed_status.lock().unwrap() = Some(status);
        }

        fn fail_transport(&self) {
            *self.fail_transport.lock().unwrap() = true;
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(
            &self,
            request: &RequestDescriptor,
            bearer: Option<&str>,
        ) -> Result<Response> {
            self.log.lock().unwrap().push(RecordedCall {
                path: request.path().to_string(),
                bearer: bearer.map(ToString::to_string),
                retried: request.retried(),
            });
            if *self.fail_transport.lock().unwrap() {
                return Err(ApiError::Http("connection refused".into()));
            }
            if let Some(status) = *self.fixed_status.lock().unwrap() {
                return Ok(Response::new(status, HeaderMap::new(), Bytes::new()));
            }
            let authorized = bearer
                .is_some_and(|t| self.valid.lock().unwrap().contains(t));
            if authorized {
                Ok(Response::new(
                    StatusCode::OK,
                    HeaderMap::new(),
                    Bytes::from_static(br#"{"ok":true}"#),
                ))
            } else {
                Ok(Response::new(
                    StatusCode::UNAUTHORIZED,
                    HeaderMap::new(),
                    Bytes::from_static(b"token expired"),
                ))
            }
        }
    }

    /// Scripted refresh endpoint: mints `access-N` on the N-th call and (by
    /// default) teaches the transport to accept it.
    struct MockRefresher {
        transport: Arc<MockTransport>,
        calls: AtomicUsize,
        delay_ms: u64,
        reject: bool,
        grant_access: AtomicBool,
    }

    impl MockRefresher {
        fn new(transport: Arc<MockTransport>) -> Arc<Self> {
            Arc::new(Self {
                transport,
                calls: AtomicUsize::new(0),
                delay_ms: 20,
                reject: false,
                grant_access: AtomicBool::new(true),
            })
        }

        fn rejecting(transport: Arc<MockTransport>) -> Arc<Self> {
            Arc::new(Self {
                transport,
                calls: AtomicUsize::new(0),
                delay_ms: 20,
                reject: true,
                grant_access: AtomicBool::new(true),
            })
        }

        /// Refresh succeeds but the backend still refuses the new token.
        fn granting_nothing(transport: Arc<MockTransport>) -> Arc<Self> {
            Arc::new(Self {
                transport,
                calls: AtomicUsize::new(0),
                delay_ms: 20,
                reject: false,
                grant_access: AtomicBool::new(false),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for MockRefresher {
        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.reject {
                return Err(ApiError::Upstream {
                    status: 400,
                    body: "invalid refresh token".into(),
                });
            }
            let access = format!("access-{n}");
            if self.grant_access.load(Ordering::SeqCst) {
                self.transport.authorize(&access);
            }
            Ok(TokenPair::new(access).with_refresh(format!("refresh-{n}")))
        }
    }

    struct CountingObserver {
        fired: AtomicUsize,
    }

    impl CountingObserver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fired: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.fired.load(Ordering::SeqCst)
        }
    }

    impl SessionObserver for CountingObserver {
        fn session_ended(&self) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn policy() -> EndpointPolicy {
        EndpointPolicy::new(
            vec![
                "/auth/login".into(),
                "/auth/register".into(),
                "/auth/refresh".into(),
            ],
            vec!["/skills/search".into(), "/captcha".into()],
        )
    }

    struct Fixture {
        transport: Arc<MockTransport>,
        refresher: Arc<MockRefresher>,
        store: Arc<InMemoryTokenStore>,
        observer: Arc<CountingObserver>,
        client: ApiClient,
    }

    impl Fixture {
        fn build(refresher: impl Fn(Arc<MockTransport>) -> Arc<MockRefresher>) -> Self {
            let transport = MockTransport::new();
            let refresher = refresher(Arc::clone(&transport));
            let store = Arc::new(InMemoryTokenStore::new());
            let observer = CountingObserver::new();
            let client = ApiClient::new(
                Arc::clone(&transport) as Arc<dyn Transport>,
                Arc::clone(&store) as Arc<dyn TokenStore>,
                Arc::clone(&refresher) as Arc<dyn TokenRefresher>,
                Arc::clone(&observer) as Arc<dyn SessionObserver>,
                policy(),
            );
            Self {
                transport,
                refresher,
                store,
                observer,
                client,
            }
        }

        async fn seed_tokens(&self) {
            self.store.set(TokenKey::Access, "stale").await.unwrap();
            self.store.set(TokenKey::Refresh, "refresh-0").await.unwrap();
        }

        async fn store_is_empty(&self) -> bool {
            self.store.get(TokenKey::Access).await.unwrap().is_none()
                && self.store.get(TokenKey::Refresh).await.unwrap().is_none()
        }
    }

    #[tokio::test]
    async fn test_success_passthrough_no_refresh() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;
        f.transport.authorize("stale");

        let resp = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(f.refresher.call_count(), 0);
        assert_eq!(f.observer.count(), 0);
    }

    #[tokio::test]
    async fn test_non_401_status_passes_through() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;
        f.transport.force_status(StatusCode::INTERNAL_SERVER_ERROR);

        let resp = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(f.refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_without_refresh() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;
        f.transport.fail_transport();

        let err = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
        assert_eq!(f.refresher.call_count(), 0);
        assert_eq!(f.observer.count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_and_replay_once() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;

        let resp = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(f.refresher.call_count(), 1);

        let calls = f.transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].bearer.as_deref(), Some("stale"));
        assert!(!calls[0].retried);
        assert_eq!(calls[1].bearer.as_deref(), Some("access-1"));
        assert!(calls[1].retried);

        // New pair persisted.
        assert_eq!(
            f.store.get(TokenKey::Access).await.unwrap().as_deref(),
            Some("access-1")
        );
        assert_eq!(
            f.store.get(TokenKey::Refresh).await.unwrap().as_deref(),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;

        let (a, b, c) = tokio::join!(
            f.client.send(RequestDescriptor::get("/admin/users")),
            f.client.send(RequestDescriptor::get("/admin/roles")),
            f.client.send(RequestDescriptor::get("/blogs/drafts")),
        );
        assert_eq!(a.unwrap().status(), StatusCode::OK);
        assert_eq!(b.unwrap().status(), StatusCode::OK);
        assert_eq!(c.unwrap().status(), StatusCode::OK);

        assert_eq!(f.refresher.call_count(), 1, "single-flight violated");

        // Every replay used the one new token.
        let replays: Vec<_> = f.transport.calls().into_iter().filter(|c| c.retried).collect();
        assert_eq!(replays.len(), 3);
        assert!(replays.iter().all(|c| c.bearer.as_deref() == Some("access-1")));
    }

    #[tokio::test]
    async fn test_no_refresh_on_public_path() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;

        let err = f
            .client
            .send(RequestDescriptor::get("/skills/search?q=piano"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(f.refresher.call_count(), 0);
        assert_eq!(f.observer.count(), 0);

        // Store untouched.
        assert_eq!(
            f.store.get(TokenKey::Access).await.unwrap().as_deref(),
            Some("stale")
        );
    }

    #[tokio::test]
    async fn test_no_refresh_on_auth_path() {
        let f = Fixture::build(MockRefresher::new);

        let err = f
            .client
            .send(RequestDescriptor::post("/auth/login"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(f.refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_replay_denied_ends_session() {
        let f = Fixture::build(MockRefresher::granting_nothing);
        f.seed_tokens().await;

        let err = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap_err();
        match err {
            ApiError::Unauthorized { path, .. } => assert_eq!(path, "/admin/users"),
            other => panic!("expected Unauthorized, got: {other}"),
        }
        assert_eq!(f.refresher.call_count(), 1, "no second refresh after replay");
        assert_eq!(f.observer.count(), 1);
        assert!(f.store_is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_rejection_surfaces_original_401() {
        let f = Fixture::build(MockRefresher::rejecting);
        f.seed_tokens().await;

        let err = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap_err();
        match err {
            ApiError::Unauthorized { path, body } => {
                assert_eq!(path, "/admin/users");
                assert_eq!(body, "token expired", "must be the original 401 body");
            }
            other => panic!("expected Unauthorized, got: {other}"),
        }
        assert_eq!(f.observer.count(), 1);
        assert!(f.store_is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_failed_refresh_signals_once() {
        let f = Fixture::build(MockRefresher::rejecting);
        f.seed_tokens().await;

        let (a, b) = tokio::join!(
            f.client.send(RequestDescriptor::get("/admin/users")),
            f.client.send(RequestDescriptor::get("/admin/roles")),
        );
        assert!(matches!(a.unwrap_err(), ApiError::Unauthorized { .. }));
        assert!(matches!(b.unwrap_err(), ApiError::Unauthorized { .. }));

        assert_eq!(f.refresher.call_count(), 1, "both flows joined one refresh");
        assert_eq!(
            f.observer.count(),
            1,
            "one terminal failure must signal exactly once"
        );
        assert!(f.store_is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_denied_replays_signal_once() {
        let f = Fixture::build(MockRefresher::granting_nothing);
        f.seed_tokens().await;

        let (a, b) = tokio::join!(
            f.client.send(RequestDescriptor::get("/admin/users")),
            f.client.send(RequestDescriptor::get("/admin/roles")),
        );
        assert!(a.is_err());
        assert!(b.is_err());

        assert_eq!(f.refresher.call_count(), 1);
        assert_eq!(
            f.observer.count(),
            1,
            "denied replays off one refresh collapse to one signal"
        );
        assert!(f.store_is_empty().await);
    }

    #[tokio::test]
    async fn test_later_terminal_failure_signals_again() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;

        // First cycle succeeds: refresh + replay, no signal.
        f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap();
        assert_eq!(f.observer.count(), 0);

        // The backend then revokes everything; the next 401 refreshes again
        // but the replay is denied, which is a new terminal failure.
        f.transport.revoke("access-1");
        f.refresher.grant_access.store(false, Ordering::SeqCst);
        let err = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(f.observer.count(), 1, "a distinct failure still signals");
    }

    #[tokio::test]
    async fn test_missing_refresh_token_ends_session() {
        let f = Fixture::build(MockRefresher::new);
        f.store.set(TokenKey::Access, "stale").await.unwrap();
        // No refresh token stored.

        let err = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(f.refresher.call_count(), 0, "refresh endpoint never called");
        assert_eq!(f.observer.count(), 1);
        assert!(f.store_is_empty().await);
    }

    #[tokio::test]
    async fn test_settled_refresh_slot_resets() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;

        let resp = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(f.refresher.call_count(), 1);

        // The backend later invalidates the new token; an independent 401
        // must start a second, distinct refresh.
        f.transport.revoke("access-1");
        let resp = f.client.send(RequestDescriptor::get("/admin/users")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(f.refresher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_request_without_stored_token_sends_no_bearer() {
        let f = Fixture::build(MockRefresher::new);
        f.transport.force_status(StatusCode::OK);

        f.client.send(RequestDescriptor::get("/captcha")).await.unwrap();
        assert_eq!(f.transport.calls()[0].bearer, None);
    }

    #[tokio::test]
    async fn test_get_json_decodes_success() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;
        f.transport.authorize("stale");

        let v: serde_json::Value = f.client.get_json("/admin/users").await.unwrap();
        assert_eq!(v["ok"], true);
    }

    #[tokio::test]
    async fn test_get_json_surfaces_upstream_error() {
        let f = Fixture::build(MockRefresher::new);
        f.seed_tokens().await;
        f.transport.force_status(StatusCode::BAD_GATEWAY);

        let err = f.client.get_json::<serde_json::Value>("/admin/users").await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream { status: 502, .. }));
    }

    #[test]
    fn test_from_config_wires_endpoint_policy() {
        let store = Arc::new(InMemoryTokenStore::new());
        let observer = CountingObserver::new();
        let client =
            ApiClient::from_config(&ClientConfig::default(), store, observer).unwrap();
        assert!(client.policy.is_refresh_exempt("/auth/login"));
        assert!(client.policy.is_refresh_exempt("/skills/search?q=piano"));
        assert!(!client.policy.is_refresh_exempt("/admin/users"));
    }
}
