//! Batch client: pipeline assembly and the single-round-trip submit path.
//!
//! # Examples
//!
//! ```ignore
//! use storage_batch_http::{AccessTier, BatchClient, BlobBatch};
//!
//! let client = BatchClient::new("https://account.blob.example.net")?;
//!
//! let mut batch = BlobBatch::new();
//! batch.delete_blob("logs", "2025-01-01.log", Default::default());
//! batch.set_access_tier("media", "video.mp4", AccessTier::Cool, Default::default());
//!
//! let results = client.submit_batch(&batch).await?;
//! assert_eq!(results.total_slots(), 2);
//! ```

use crate::batch::{self, BatchResults, BlobBatch, SubRequest};
use crate::client::config::ClientConfig;
use crate::error::{BatchError, Result};
use crate::operations::{delete, tier};
use crate::pipeline::{
    BearerTokenPolicy, HttpPolicy, NoopTransportPolicy, Pipeline, RawRequest,
    ReqwestTransportPolicy, RequestIdPolicy, RetryPolicy, ServiceVersionPolicy, TelemetryPolicy,
};
use crate::protocol::constants::{headers, MULTIPART_CONTENT_TYPE_PREFIX};
use crate::protocol::{decode, encode, extract_boundary};
use bytes::Bytes;
use http::Method;
use std::sync::Arc;
use url::Url;

/// Client submitting heterogeneous blob operations as one multipart batch.
///
/// Two pipelines are assembled once at construction, the way the service's
/// standalone clients assemble theirs:
///
/// - the **outer pipeline** (telemetry, request-id, retry, service headers,
///   credential, real transport) carries the single batch exchange
/// - the **sub-request pipeline** (service headers, credential, no-op
///   transport) materializes each sub-request without any network I/O
///
/// Sharing the header/credential stages between the two means a sub-request
/// leaves materialization exactly as it would have left a standalone call,
/// minus the transport.
pub struct BatchClient {
    service_url: Url,
    pipeline: Pipeline,
    sub_request_pipeline: Pipeline,
    config: ClientConfig,
}

impl BatchClient {
    /// Create a client for anonymous access with default configuration.
    pub fn new(service_url: &str) -> Result<Self> {
        Self::with_config(service_url, ClientConfig::default())
    }

    /// Create an anonymous client with custom configuration.
    pub fn with_config(service_url: &str, config: ClientConfig) -> Result<Self> {
        Self::build(service_url, None, config)
    }

    /// Create a client authenticating with a bearer token.
    ///
    /// The token policy is shared by both pipelines; swapping the token via
    /// [`BearerTokenPolicy::set_token`] affects subsequent submissions.
    pub fn with_bearer_token(
        service_url: &str,
        token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::build(service_url, Some(Arc::new(BearerTokenPolicy::new(token))), config)
    }

    fn build(
        service_url: &str,
        credential: Option<Arc<BearerTokenPolicy>>,
        config: ClientConfig,
    ) -> Result<Self> {
        let service_url = Url::parse(service_url)?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .pool_max_idle_per_host(config.max_idle_connections as usize)
            .build()
            .map_err(|e| BatchError::Http(e.to_string()))?;

        let mut outer: Vec<Arc<dyn HttpPolicy>> = vec![
            Arc::new(TelemetryPolicy::new(config.user_agent.clone())),
            Arc::new(RequestIdPolicy),
            Arc::new(RetryPolicy::new(config.max_retries, config.retry_delay_ms)),
            Arc::new(ServiceVersionPolicy),
        ];
        let mut sub: Vec<Arc<dyn HttpPolicy>> = vec![Arc::new(ServiceVersionPolicy)];
        if let Some(credential) = credential {
            outer.push(credential.clone());
            sub.push(credential);
        }
        outer.push(Arc::new(ReqwestTransportPolicy::new(http_client)));
        sub.push(Arc::new(NoopTransportPolicy));

        Ok(BatchClient {
            service_url,
            pipeline: Pipeline::new(outer),
            sub_request_pipeline: Pipeline::new(sub),
            config,
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit a batch as one network exchange and demultiplex the response
    /// into per-slot outcomes.
    ///
    /// The call fails as a whole on build-time errors (malformed resource
    /// addresses), transport errors, and protocol-framing errors; an
    /// individual sub-operation rejected by the service only fails its own
    /// slot of the returned [`BatchResults`].
    pub async fn submit_batch(&self, batch: &BlobBatch) -> Result<BatchResults> {
        if batch.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let boundary = encode::generate_boundary();
        let parts = self.materialize(batch).await?;
        let body = encode::encode_batch(&boundary, &parts);

        tracing::debug!(
            sub_requests = batch.len(),
            body_len = body.len(),
            %boundary,
            "submitting batch"
        );

        let mut url = self.service_url.clone();
        url.query_pairs_mut().append_pair("comp", "batch");
        let mut outer = RawRequest::new(Method::POST, url);
        outer.set_header(
            "Content-Type",
            &format!("{}{}", MULTIPART_CONTENT_TYPE_PREFIX, boundary),
        );
        outer.set_header("Content-Length", &body.len().to_string());
        outer.body = body;

        let response = self.pipeline.send(&mut outer).await?;
        if !matches!(response.status, 200 | 202) {
            return Err(BatchError::UnexpectedStatus(response.status));
        }

        let content_type = response
            .header("Content-Type")
            .ok_or_else(|| BatchError::MissingBoundary(String::new()))?;
        let response_boundary = extract_boundary(content_type)?;

        let sub_responses = decode::parse_multipart_body(&response.body, &response_boundary)?;
        tracing::debug!(parts = sub_responses.len(), "batch response decoded");

        batch::demux(batch.sub_requests(), sub_responses)
    }

    /// Run every descriptor through the no-I/O pipeline and serialize it.
    ///
    /// Any builder or policy failure here aborts the submission before the
    /// network is touched.
    async fn materialize(&self, batch: &BlobBatch) -> Result<Vec<Bytes>> {
        let mut parts = Vec::with_capacity(batch.len());
        for sub_request in batch.sub_requests() {
            let mut request = match sub_request {
                SubRequest::Delete {
                    container,
                    blob,
                    options,
                } => delete::build_request(&self.service_url, container, blob, options)?,
                SubRequest::SetTier {
                    container,
                    blob,
                    tier,
                    options,
                } => tier::build_request(&self.service_url, container, blob, *tier, options)?,
            };
            self.sub_request_pipeline.send(&mut request).await?;
            // Only the outer request may declare the protocol version.
            request.remove_header(headers::VERSION);
            parts.push(encode::serialize_preamble(&request));
        }
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeleteBlobOptions;

    fn client() -> BatchClient {
        BatchClient::new("http://acct.example.net").unwrap()
    }

    #[tokio::test]
    async fn test_empty_batch_rejected_before_io() {
        let err = client().submit_batch(&BlobBatch::new()).await.unwrap_err();
        assert!(matches!(err, BatchError::EmptyBatch));
    }

    #[tokio::test]
    async fn test_materialized_sub_request_has_no_version_header() {
        let mut batch = BlobBatch::new();
        batch.delete_blob("c1", "b1", DeleteBlobOptions::default());
        let parts = client().materialize(&batch).await.unwrap();
        let text = std::str::from_utf8(&parts[0]).unwrap();
        assert!(text.starts_with("DELETE /c1/b1 HTTP/1.1\r\n"));
        assert!(!text.contains(headers::VERSION));
    }

    #[tokio::test]
    async fn test_materialization_applies_credential() {
        let client = BatchClient::with_bearer_token(
            "http://acct.example.net",
            "secret-token",
            ClientConfig::default(),
        )
        .unwrap();
        let mut batch = BlobBatch::new();
        batch.delete_blob("c1", "b1", DeleteBlobOptions::default());
        let parts = client.materialize(&batch).await.unwrap();
        let text = std::str::from_utf8(&parts[0]).unwrap();
        assert!(text.contains("Authorization: Bearer secret-token\r\n"));
    }

    #[tokio::test]
    async fn test_invalid_address_aborts_whole_submission() {
        let mut batch = BlobBatch::new();
        batch.delete_blob("c1", "b1", DeleteBlobOptions::default());
        batch.delete_blob("", "b2", DeleteBlobOptions::default());
        let err = client().submit_batch(&batch).await.unwrap_err();
        assert!(matches!(err, BatchError::InvalidResource(_)));
    }
}
