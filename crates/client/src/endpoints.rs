//! Path classification for the 401 recovery protocol.
//!
//! Auth endpoints (login, register, refresh, logout) and public endpoints
//! never trigger a refresh: a 401 there is a genuine authorization failure,
//! not an expired session. The 401 itself still surfaces to the caller.

/// Injected endpoint classification: auth paths matched by prefix, public
/// paths matched by substring.
#[derive(Debug, Clone)]
pub struct EndpointPolicy {
    auth_paths: Vec<String>,
    public_paths: Vec<String>,
}

impl EndpointPolicy {
    /// Build a policy from the configured auth paths and public substrings.
    #[must_use]
    pub fn new(auth_paths: Vec<String>, public_paths: Vec<String>) -> Self {
        Self {
            auth_paths,
            public_paths,
        }
    }

    /// Whether `path` targets one of the authentication endpoints.
    ///
    /// Prefix match, so query strings and trailing segments still classify.
    #[must_use]
    pub fn is_auth_path(&self, path: &str) -> bool {
        self.auth_paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Whether `path` is reachable without authentication.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path.contains(p.as_str()))
    }

    /// Whether a 401 on `path` must be propagated without a refresh attempt.
    #[must_use]
    pub fn is_refresh_exempt(&self, path: &str) -> bool {
        self.is_auth_path(path) || self.is_public(path)
    }
}
