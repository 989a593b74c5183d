//! Built-in pipeline stages.
//!
//! Stage order matters. The outer batch pipeline runs telemetry, request-id,
//! retry, per-retry service headers, credential, then the real transport; the
//! sub-request materialization pipeline runs only the per-retry and credential
//! stages before the no-op transport, since sub-requests are never retried
//! individually and never reach the network on their own.

use super::{HttpPolicy, PolicyChain, RawRequest, RawResponse};
use crate::client::utils::{exponential_backoff, is_retryable_status};
use crate::error::{BatchError, Result};
use crate::protocol::constants::{headers, SERVICE_VERSION};
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::sleep;
use uuid::Uuid;

/// Sets the `User-Agent` header identifying this package, unless the caller
/// already supplied one.
pub struct TelemetryPolicy {
    user_agent: String,
}

impl TelemetryPolicy {
    /// Create the policy with the given user-agent string.
    pub fn new(user_agent: impl Into<String>) -> Self {
        TelemetryPolicy {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl HttpPolicy for TelemetryPolicy {
    async fn send(&self, request: &mut RawRequest, next: PolicyChain<'_>) -> Result<RawResponse> {
        if request.header("user-agent").is_none() {
            request.set_header("User-Agent", &self.user_agent);
        }
        next.process(request).await
    }
}

/// Assigns a fresh `x-ms-client-request-id` so the exchange can be correlated
/// with service-side logs.
pub struct RequestIdPolicy;

#[async_trait]
impl HttpPolicy for RequestIdPolicy {
    async fn send(&self, request: &mut RawRequest, next: PolicyChain<'_>) -> Result<RawResponse> {
        if request.header(headers::CLIENT_REQUEST_ID).is_none() {
            request.set_header(headers::CLIENT_REQUEST_ID, &Uuid::new_v4().to_string());
        }
        next.process(request).await
    }
}

/// Per-retry stage stamping the service protocol version header.
///
/// Runs below the retry stage so every attempt carries the header; the
/// materializer strips it from sub-requests afterwards because only the outer
/// request may declare a protocol version.
pub struct ServiceVersionPolicy;

#[async_trait]
impl HttpPolicy for ServiceVersionPolicy {
    async fn send(&self, request: &mut RawRequest, next: PolicyChain<'_>) -> Result<RawResponse> {
        request.set_header(headers::VERSION, SERVICE_VERSION);
        next.process(request).await
    }
}

/// Retries the remainder of the chain on transport failures and retryable
/// status codes, with exponential backoff.
///
/// Retry applies only to the single outer exchange; it is never installed in
/// the sub-request materialization pipeline.
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_ms: u64,
}

impl RetryPolicy {
    /// Create the policy with a retry budget and base backoff delay.
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        RetryPolicy {
            max_retries,
            base_delay_ms,
        }
    }
}

#[async_trait]
impl HttpPolicy for RetryPolicy {
    async fn send(&self, request: &mut RawRequest, next: PolicyChain<'_>) -> Result<RawResponse> {
        let mut attempt = 0u32;
        loop {
            match next.process(request).await {
                Ok(response) if is_retryable_status(response.status) && attempt < self.max_retries => {
                    let delay = exponential_backoff(attempt, self.base_delay_ms);
                    tracing::warn!(
                        status = response.status,
                        attempt = attempt + 1,
                        ?delay,
                        "retryable batch response status, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = exponential_backoff(attempt, self.base_delay_ms);
                    tracing::warn!(
                        attempt = attempt + 1,
                        ?delay,
                        error = %e,
                        "batch exchange failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Applies a bearer token as the `Authorization` header.
///
/// The token sits behind an `RwLock` so concurrent materialization only takes
/// read locks; [`BearerTokenPolicy::set_token`] swaps it at runtime when the
/// caller refreshes credentials.
pub struct BearerTokenPolicy {
    token: RwLock<String>,
}

impl BearerTokenPolicy {
    /// Create the policy with an initial token.
    pub fn new(token: impl Into<String>) -> Self {
        BearerTokenPolicy {
            token: RwLock::new(token.into()),
        }
    }

    /// Replace the token used for subsequent requests.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = token.into();
    }
}

#[async_trait]
impl HttpPolicy for BearerTokenPolicy {
    async fn send(&self, request: &mut RawRequest, next: PolicyChain<'_>) -> Result<RawResponse> {
        let value = format!("Bearer {}", self.token.read());
        request.set_header("Authorization", &value);
        next.process(request).await
    }
}

/// Transport stage that performs no I/O and returns a placeholder response
/// immediately.
///
/// Terminating the sub-request pipeline with this stage lets the same header
/// and credential stages used for real calls finalize a sub-request without
/// any traffic leaving the process; the multipart encoder then serializes the
/// finalized request into the batch body.
pub struct NoopTransportPolicy;

#[async_trait]
impl HttpPolicy for NoopTransportPolicy {
    async fn send(&self, _request: &mut RawRequest, _next: PolicyChain<'_>) -> Result<RawResponse> {
        Ok(RawResponse::empty())
    }
}

/// Real transport stage backed by a shared [`reqwest::Client`].
pub struct ReqwestTransportPolicy {
    client: reqwest::Client,
}

impl ReqwestTransportPolicy {
    /// Create the transport around an already-configured client.
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestTransportPolicy { client }
    }
}

#[async_trait]
impl HttpPolicy for ReqwestTransportPolicy {
    async fn send(&self, request: &mut RawRequest, _next: PolicyChain<'_>) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BatchError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let reason = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();
        let mut raw = RawResponse::new(1, 1, status, reason);
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                raw.add_header(name.as_str(), v);
            }
        }
        raw.body = response
            .bytes()
            .await
            .map_err(|e| BatchError::Http(e.to_string()))?;

        Ok(raw)
    }
}
