//! Wire-format constants and shared header handling for the batch protocol.
//!
//! The batch wire format is `multipart/mixed`: each part wraps one embedded
//! HTTP request (on the way out) or response (on the way back), framed purely
//! by a boundary token declared in the outer Content-Type. No lengths are
//! transmitted; framing is entirely a function of the repeated boundary.
//!
//! | Direction | Module | Job |
//! |-----------|--------|-----|
//! | Request | [`encode`] | serialize materialized sub-requests into one body |
//! | Response | [`decode`] | split the response body back into sub-responses |

pub mod decode;
pub mod encode;

use crate::error::{BatchError, Result};

/// Protocol constants shared by the encoder, decoder, and pipeline stages.
pub mod constants {
    /// Line terminator used throughout the multipart format.
    pub const CRLF: &str = "\r\n";

    /// Content-Type prefix for batch requests; the boundary token is appended.
    pub const MULTIPART_CONTENT_TYPE_PREFIX: &str = "multipart/mixed; boundary=";

    /// Service protocol version sent with top-level requests.
    pub const SERVICE_VERSION: &str = "2021-12-02";

    /// Header names used by the engine.
    pub mod headers {
        /// Service protocol version; only the outer request may carry it.
        pub const VERSION: &str = "x-ms-version";
        /// Client-chosen correlation id.
        pub const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
        /// Service-assigned request id echoed on every sub-response.
        pub const REQUEST_ID: &str = "x-ms-request-id";
        /// Machine-readable error code on failed sub-responses.
        pub const ERROR_CODE: &str = "x-ms-error-code";
        /// Target tier for set-access-tier sub-requests.
        pub const ACCESS_TIER: &str = "x-ms-access-tier";
        /// Rehydrate priority for archived blobs.
        pub const REHYDRATE_PRIORITY: &str = "x-ms-rehydrate-priority";
        /// Snapshot handling for delete sub-requests.
        pub const DELETE_SNAPSHOTS: &str = "x-ms-delete-snapshots";
        /// Active lease id.
        pub const LEASE_ID: &str = "x-ms-lease-id";
    }
}

/// Extract the `boundary=` parameter from a `multipart/mixed` Content-Type.
///
/// The response boundary need not equal the request boundary; the server
/// declares its own. A Content-Type without a boundary parameter makes the
/// response unsplittable, which is a call-level protocol error.
///
/// # Examples
///
/// ```
/// use storage_batch_http::protocol::extract_boundary;
///
/// let boundary = extract_boundary("multipart/mixed; boundary=batchresponse_42").unwrap();
/// assert_eq!(boundary, "batchresponse_42");
///
/// assert!(extract_boundary("application/xml").is_err());
/// ```
pub fn extract_boundary(content_type: &str) -> Result<String> {
    for param in content_type.split(';').skip(1) {
        let param = param.trim();
        if let Some(value) = param
            .strip_prefix("boundary=")
            .or_else(|| param.strip_prefix("BOUNDARY="))
        {
            let value = value.trim_matches('"');
            if value.is_empty() {
                break;
            }
            return Ok(value.to_string());
        }
    }
    Err(BatchError::MissingBoundary(content_type.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_boundary() {
        let boundary =
            extract_boundary("multipart/mixed; boundary=batchresponse_66925647").unwrap();
        assert_eq!(boundary, "batchresponse_66925647");
    }

    #[test]
    fn test_extract_boundary_quoted() {
        let boundary = extract_boundary("multipart/mixed; boundary=\"b-1\"").unwrap();
        assert_eq!(boundary, "b-1");
    }

    #[test]
    fn test_extract_boundary_with_charset_param() {
        let boundary =
            extract_boundary("multipart/mixed; charset=utf-8; boundary=tok").unwrap();
        assert_eq!(boundary, "tok");
    }

    #[test]
    fn test_missing_boundary_is_an_error() {
        let err = extract_boundary("application/xml").unwrap_err();
        assert!(matches!(err, BatchError::MissingBoundary(_)));
    }

    #[test]
    fn test_empty_boundary_is_an_error() {
        assert!(extract_boundary("multipart/mixed; boundary=").is_err());
    }
}
