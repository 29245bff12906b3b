//! Reqwest-backed transport against one backend base URL.

use async_trait::async_trait;
use skillhub_types::{RequestDescriptor, Response, Transport, traits::Result};

/// Production [`Transport`]: resolves descriptor paths against a base URL and
/// buffers the response body. Timeouts come from the wrapped client and
/// surface as ordinary transport errors.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport wrapping the given HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// The base URL descriptor paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut builder = self
            .http
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(Response::new(status, headers, body))
    }
}
