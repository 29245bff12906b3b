//! Core types and traits for the skillhub workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! skillhub client: error types, the token pair representation, the request
//! and response shapes, and the async traits that each layer implements.

pub mod error;
pub mod request;
pub mod response;
pub mod token;
pub mod traits;

pub use error::ApiError;
pub use request::RequestDescriptor;
pub use response::Response;
pub use token::{TokenKey, TokenPair};
pub use traits::{SessionObserver, TokenRefresher, TokenStore, Transport};
