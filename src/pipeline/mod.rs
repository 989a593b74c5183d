//! HTTP policy pipeline.
//!
//! Requests travel through an ordered chain of [`HttpPolicy`] stages; each
//! stage may mutate the request and then forwards it to the remainder of the
//! chain. The final stage is a transport:
//!
//! - [`ReqwestTransportPolicy`](crate::pipeline::ReqwestTransportPolicy)
//!   performs the real network exchange for the outer batch request
//! - [`NoopTransportPolicy`](crate::pipeline::NoopTransportPolicy)
//!   short-circuits immediately, which is how sub-requests are *materialized*
//!   (headers finalized, credential applied) without any traffic leaving the
//!   process
//!
//! The same header/credential stages therefore serve both the outer exchange
//! and sub-request materialization; only the terminal stage differs.
//!
//! # Examples
//!
//! ```ignore
//! use storage_batch_http::pipeline::{NoopTransportPolicy, Pipeline, RawRequest};
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::new(vec![Arc::new(NoopTransportPolicy)]);
//! let mut request = RawRequest::new(http::Method::DELETE, url);
//! let response = pipeline.send(&mut request).await?;
//! // `request` now carries its final headers; `response` is a placeholder.
//! ```

mod policies;

pub use policies::{
    BearerTokenPolicy, NoopTransportPolicy, ReqwestTransportPolicy, RequestIdPolicy, RetryPolicy,
    ServiceVersionPolicy, TelemetryPolicy,
};

use crate::error::{BatchError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use std::sync::Arc;
use url::Url;

/// A mutable HTTP request traveling through the pipeline.
///
/// Headers are kept as an ordered list rather than a map: the multipart wire
/// format serializes them in insertion order, and lookups are case-insensitive
/// per HTTP semantics.
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// Request method
    pub method: Method,
    /// Fully resolved request URL
    pub url: Url,
    headers: Vec<(String, String)>,
    /// Request body; empty for all currently supported sub-operations
    pub body: Bytes,
}

impl RawRequest {
    /// Create a request with no headers and an empty body.
    pub fn new(method: Method, url: Url) -> Self {
        RawRequest {
            method,
            url,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let Some(slot) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            slot.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove a header if present.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Path plus query string, as it appears on the request line.
    pub fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(q) => format!("{}?{}", self.url.path(), q),
            None => self.url.path().to_string(),
        }
    }
}

/// A parsed HTTP response: either the outer exchange's response or one
/// embedded sub-response split out of a multipart body.
///
/// Header names are kept case-sensitive as received and duplicates are
/// retained, since the engine must hand sub-responses back for diagnostics
/// exactly as the service framed them. Lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP major version from the status line
    pub version_major: u8,
    /// HTTP minor version from the status line
    pub version_minor: u8,
    /// Status code
    pub status: u16,
    /// Reason phrase as received
    pub reason: String,
    headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response with no headers and an empty body.
    pub fn new(version_major: u8, version_minor: u8, status: u16, reason: impl Into<String>) -> Self {
        RawResponse {
            version_major,
            version_minor,
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Placeholder response returned by the no-op transport. Discarded by the
    /// materializer; only the mutated request matters.
    pub fn empty() -> Self {
        RawResponse::new(1, 1, 200, "OK")
    }

    /// Append a header, retaining duplicates.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Look up the first header with this name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in received order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// One stage of the request pipeline.
///
/// A stage mutates the request as needed and calls `next.process(request)` to
/// hand off to the rest of the chain. Transport stages terminate the chain and
/// never call `next`.
#[async_trait]
pub trait HttpPolicy: Send + Sync {
    /// Process the request and produce a response, possibly by delegating to
    /// the remaining stages.
    async fn send(&self, request: &mut RawRequest, next: PolicyChain<'_>) -> Result<RawResponse>;
}

/// The remainder of a pipeline, handed to each stage.
#[derive(Clone, Copy)]
pub struct PolicyChain<'a> {
    policies: &'a [Arc<dyn HttpPolicy>],
}

impl<'a> PolicyChain<'a> {
    /// Run the request through the remaining stages.
    pub async fn process(self, request: &mut RawRequest) -> Result<RawResponse> {
        let (first, rest) = self
            .policies
            .split_first()
            .ok_or_else(|| BatchError::Http("pipeline has no transport stage".to_string()))?;
        first.send(request, PolicyChain { policies: rest }).await
    }
}

/// An ordered chain of policies ending in a transport stage.
pub struct Pipeline {
    policies: Vec<Arc<dyn HttpPolicy>>,
}

impl Pipeline {
    /// Build a pipeline from ordered stages. The last stage must be a
    /// transport (one that never calls `next`).
    pub fn new(policies: Vec<Arc<dyn HttpPolicy>>) -> Self {
        Pipeline { policies }
    }

    /// Send a request through every stage.
    pub async fn send(&self, request: &mut RawRequest) -> Result<RawResponse> {
        PolicyChain {
            policies: &self.policies,
        }
        .process(request)
        .await
    }
}
