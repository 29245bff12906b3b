//! Buffered HTTP response with the common status-check / JSON-parse helpers.

use crate::error::{ApiError, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// A fully buffered response from the backend.
///
/// `send` returns every non-401 response as-is, whatever its status; callers
/// that only care about the decoded payload use [`Response::json`], which
/// turns non-2xx statuses into [`ApiError::Upstream`].
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Assemble a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Check for a 2xx status and decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] on a non-success status, or
    /// [`ApiError::Serialization`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.status.is_success() {
            return Err(ApiError::Upstream {
                status: self.status.as_u16(),
                body: self.text(),
            });
        }
        serde_json::from_slice(&self.body).map_err(ApiError::Serialization)
    }
}
