//! Multipart batch body encoder.
//!
//! Serializes the ordered list of materialized sub-requests into one
//! `multipart/mixed` body. Each part carries three wrapper headers before the
//! embedded HTTP request:
//!
//! ```text
//! --{boundary}
//! Content-Type: application/http
//! Content-Transfer-Encoding: binary
//! Content-ID: {n}
//!
//! DELETE /container/blob HTTP/1.1
//! host: account.blob.example.net
//! ...
//! ```
//!
//! The Content-ID is purely positional (zero-based submission order). The
//! decoder never relies on it: part order in the response body is what
//! re-establishes submission order.

use crate::pipeline::RawRequest;
use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// Generate a fresh boundary token for one batch submission.
///
/// Derived from a random UUID so the token cannot collide with content
/// appearing inside any sub-request.
pub fn generate_boundary() -> String {
    format!("batch_{}", Uuid::new_v4())
}

/// Serialize a materialized sub-request as its request line plus headers.
///
/// The embedded representation ends with a blank line and carries no body;
/// all currently supported sub-operations are bodyless, and the next boundary
/// terminates the part.
pub fn serialize_preamble(request: &RawRequest) -> Bytes {
    let mut out = BytesMut::with_capacity(256);
    out.put_slice(request.method.as_str().as_bytes());
    out.put_slice(b" ");
    out.put_slice(request.path_and_query().as_bytes());
    out.put_slice(b" HTTP/1.1\r\n");
    for (name, value) in request.headers() {
        out.put_slice(name.as_bytes());
        out.put_slice(b": ");
        out.put_slice(value.as_bytes());
        out.put_slice(b"\r\n");
    }
    out.put_slice(b"\r\n");
    out.freeze()
}

/// Concatenate serialized sub-requests into one multipart/mixed body.
///
/// Parts appear in slot order and are assigned sequential Content-IDs; the
/// body ends with the `--{boundary}--` terminator.
pub fn encode_batch(boundary: &str, parts: &[Bytes]) -> Bytes {
    let mut body = BytesMut::with_capacity(parts.iter().map(Bytes::len).sum::<usize>() + 256);
    for (content_id, part) in parts.iter().enumerate() {
        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(b"\r\n");
        body.put_slice(b"Content-Type: application/http\r\n");
        body.put_slice(b"Content-Transfer-Encoding: binary\r\n");
        body.put_slice(format!("Content-ID: {}\r\n\r\n", content_id).as_bytes());
        body.put_slice(part);
    }
    body.put_slice(b"--");
    body.put_slice(boundary.as_bytes());
    body.put_slice(b"--\r\n");
    body.freeze()
}
