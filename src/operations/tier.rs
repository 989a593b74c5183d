//! Set-access-tier sub-operation: request builder and response decoder.

use super::blob_request;
use crate::batch::SubRequestFailure;
use crate::error::Result;
use crate::pipeline::{RawRequest, RawResponse};
use crate::protocol::constants::headers;
use crate::types::{AccessTier, SetAccessTierOptions, SetAccessTierResult};
use http::Method;
use url::Url;

/// Build the sub-request for changing one blob's access tier.
pub fn build_request(
    service_url: &Url,
    container: &str,
    blob: &str,
    tier: AccessTier,
    options: &SetAccessTierOptions,
) -> Result<RawRequest> {
    let mut request = blob_request(service_url, Method::PUT, container, blob)?;
    request
        .url
        .query_pairs_mut()
        .append_pair("comp", "tier");

    request.set_header(headers::ACCESS_TIER, tier.as_str());
    if let Some(priority) = options.rehydrate_priority {
        request.set_header(headers::REHYDRATE_PRIORITY, priority.as_str());
    }
    if let Some(v) = &options.lease_id {
        request.set_header(headers::LEASE_ID, v);
    }
    // Bodyless PUT: the service requires an explicit zero length.
    request.set_header("Content-Length", "0");
    Ok(request)
}

/// Decode one set-tier sub-response. 200 means the tier changed
/// synchronously; 202 means a rehydrate from Archive is pending. Anything
/// else becomes a failure outcome for this slot only.
pub fn decode_response(
    response: RawResponse,
) -> std::result::Result<SetAccessTierResult, SubRequestFailure> {
    match response.status {
        200 | 202 => Ok(SetAccessTierResult {
            request_id: response.header(headers::REQUEST_ID).map(str::to_string),
            pending: response.status == 202,
        }),
        _ => Err(SubRequestFailure::from_response(response)),
    }
}
