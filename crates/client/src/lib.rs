//! Authenticated HTTP client for the skillhub backend.
//!
//! The [`ApiClient`] attaches the stored bearer token to every outbound
//! request, recovers from a 401 on protected paths through a single-flight
//! token refresh with exactly one replay, and tears the session down (store
//! cleared, observer notified) when recovery is impossible.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod refresh;
pub mod session;
pub mod transport;

pub use client::ApiClient;
pub use config::{AuthPaths, ClientConfig};
pub use endpoints::EndpointPolicy;
pub use refresh::HttpTokenRefresher;
pub use session::{Credentials, SessionFlow};
pub use transport::ReqwestTransport;
