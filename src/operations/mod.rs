//! Per-operation-kind request builders and response decoders.
//!
//! Each supported sub-operation kind contributes one builder
//! (`build_request`) that maps a resource address plus options onto a
//! [`RawRequest`](crate::pipeline::RawRequest), and one decoder
//! (`decode_response`) that turns a parsed sub-response into a typed result
//! or a captured [`SubRequestFailure`](crate::batch::SubRequestFailure).
//!
//! The multipart framing logic never inspects these: adding a new operation
//! kind means adding a builder/decoder pair and a variant to
//! [`SubRequest`](crate::batch::SubRequest), nothing else.

pub mod delete;
pub mod tier;

use crate::error::{BatchError, Result};
use crate::pipeline::RawRequest;
use http::Method;
use url::Url;

/// Resolve a container/blob pair against the service URL, percent-encoding
/// each path segment, and start a request with the matching Host header.
pub(crate) fn blob_request(
    service_url: &Url,
    method: Method,
    container: &str,
    blob: &str,
) -> Result<RawRequest> {
    if container.is_empty() || blob.is_empty() {
        return Err(BatchError::InvalidResource(format!(
            "container '{}' / blob '{}'",
            container, blob
        )));
    }
    let mut url = service_url.clone();
    url.path_segments_mut()
        .map_err(|_| BatchError::InvalidResource(service_url.as_str().to_string()))?
        .pop_if_empty()
        .push(container)
        .push(blob);

    let mut request = RawRequest::new(method, url);
    if let Some(host) = request.url.host_str() {
        let host = match request.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        request.set_header("host", &host);
    }
    Ok(request)
}
