//! Delete-blob sub-operation: request builder and response decoder.

use super::blob_request;
use crate::batch::SubRequestFailure;
use crate::error::Result;
use crate::pipeline::{RawRequest, RawResponse};
use crate::protocol::constants::headers;
use crate::types::{DeleteBlobOptions, DeleteBlobResult};
use http::Method;
use url::Url;

/// Build the sub-request for deleting one blob.
pub fn build_request(
    service_url: &Url,
    container: &str,
    blob: &str,
    options: &DeleteBlobOptions,
) -> Result<RawRequest> {
    let mut request = blob_request(service_url, Method::DELETE, container, blob)?;

    if let Some(snapshots) = options.delete_snapshots {
        request.set_header(headers::DELETE_SNAPSHOTS, snapshots.as_str());
    }
    let conditions = &options.access_conditions;
    if let Some(v) = &conditions.lease_id {
        request.set_header(headers::LEASE_ID, v);
    }
    if let Some(v) = &conditions.if_modified_since {
        request.set_header("If-Modified-Since", v);
    }
    if let Some(v) = &conditions.if_unmodified_since {
        request.set_header("If-Unmodified-Since", v);
    }
    if let Some(v) = &conditions.if_match {
        request.set_header("If-Match", v);
    }
    if let Some(v) = &conditions.if_none_match {
        request.set_header("If-None-Match", v);
    }
    Ok(request)
}

/// Decode one delete sub-response. The service answers 202 Accepted on
/// success; anything else becomes a failure outcome for this slot only.
pub fn decode_response(
    response: RawResponse,
) -> std::result::Result<DeleteBlobResult, SubRequestFailure> {
    if response.status != 202 {
        return Err(SubRequestFailure::from_response(response));
    }
    Ok(DeleteBlobResult {
        request_id: response.header(headers::REQUEST_ID).map(str::to_string),
    })
}
