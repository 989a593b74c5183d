//! Protocol-level round-trip tests: encode a batch body, then decode a
//! synthetic response framed the same way, through the public API only.

use bytes::Bytes;
use http::Method;
use storage_batch_http::pipeline::RawRequest;
use storage_batch_http::protocol::decode::parse_multipart_body;
use storage_batch_http::protocol::encode::{encode_batch, generate_boundary, serialize_preamble};
use storage_batch_http::protocol::extract_boundary;
use url::Url;

fn materialized(method: Method, path: &str, headers: &[(&str, &str)]) -> Bytes {
    let url = Url::parse(&format!("http://acct.example.net{}", path)).unwrap();
    let mut request = RawRequest::new(method, url);
    request.set_header("host", "acct.example.net");
    for (name, value) in headers {
        request.set_header(name, value);
    }
    serialize_preamble(&request)
}

fn synthetic_response(boundary: &str, parts: &[(u16, &str, &[(&str, &str)], &str)]) -> String {
    let mut body = String::new();
    for (status, reason, headers, part_body) in parts {
        body.push_str(&format!(
            "--{}\r\nContent-Type: application/http\r\nContent-Transfer-Encoding: binary\r\n\r\n",
            boundary
        ));
        body.push_str(&format!("HTTP/1.1 {} {}\r\n", status, reason));
        for (name, value) in *headers {
            body.push_str(&format!("{}: {}\r\n", name, value));
        }
        body.push_str("\r\n");
        body.push_str(part_body);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    body
}

#[test]
fn encoded_body_and_synthetic_response_round_trip() {
    let requests = vec![
        materialized(Method::DELETE, "/c1/b1", &[]),
        materialized(Method::PUT, "/c1/b2?comp=tier", &[("x-ms-access-tier", "Hot")]),
        materialized(Method::DELETE, "/c1/b3", &[]),
    ];
    let boundary = generate_boundary();
    let body = encode_batch(&boundary, &requests);
    let text = std::str::from_utf8(&body).unwrap();

    // Three parts with sequential Content-IDs, terminated once.
    for id in 0..3 {
        assert!(text.contains(&format!("Content-ID: {}\r\n", id)));
    }
    assert!(text.ends_with(&format!("--{}--\r\n", boundary)));

    // A server response framed with its own boundary decodes back into
    // exactly the synthetic parts, in physical order.
    let statuses: &[(u16, &str, &[(&str, &str)], &str)] = &[
        (202, "Accepted", &[("x-ms-request-id", "r0")], ""),
        (200, "OK", &[("x-ms-request-id", "r1")], ""),
        (404, "Not Found", &[("x-ms-error-code", "BlobNotFound")], "<Error/>"),
    ];
    let response = synthetic_response("batchresponse_rt", statuses);
    let parts = parse_multipart_body(response.as_bytes(), "batchresponse_rt").unwrap();

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].status, 202);
    assert_eq!(parts[0].header("x-ms-request-id"), Some("r0"));
    assert_eq!(parts[1].status, 200);
    assert_eq!(parts[2].status, 404);
    assert_eq!(parts[2].header("x-ms-error-code"), Some("BlobNotFound"));
    assert!(parts[2].body.starts_with(b"<Error/>"));
}

#[test]
fn request_and_response_boundaries_are_independent() {
    let requests = vec![materialized(Method::DELETE, "/c1/b1", &[])];
    let request_boundary = generate_boundary();
    let _body = encode_batch(&request_boundary, &requests);

    // The server declares a different boundary; decoding uses the declared
    // one, never the request's.
    let declared = extract_boundary("multipart/mixed; boundary=batchresponse_other").unwrap();
    assert_ne!(declared, request_boundary);
    let response = synthetic_response(&declared, &[(202, "Accepted", &[], "")]);
    let parts = parse_multipart_body(response.as_bytes(), &declared).unwrap();
    assert_eq!(parts.len(), 1);
}

#[test]
fn generated_boundary_never_collides_with_header_values() {
    // Pathological header values that look like boundary tokens must not
    // collide with a freshly generated one.
    let hostile = materialized(
        Method::DELETE,
        "/c1/b1",
        &[
            ("x-ms-meta-note", "batch_00000000-0000-0000-0000-000000000000"),
            ("x-ms-meta-tag", "--batch_ffffffff-ffff-ffff-ffff-ffffffffffff--"),
        ],
    );
    for _ in 0..64 {
        let boundary = generate_boundary();
        let needle = boundary.as_bytes();
        let found = hostile
            .windows(needle.len())
            .any(|window| window == needle);
        assert!(!found, "boundary {} collided with header bytes", boundary);
    }
}

#[test]
fn encoding_twice_differs_only_in_boundary() {
    let requests = vec![
        materialized(Method::DELETE, "/c1/b1", &[]),
        materialized(Method::DELETE, "/c1/b2", &[]),
    ];
    let a_boundary = generate_boundary();
    let b_boundary = generate_boundary();
    let a = encode_batch(&a_boundary, &requests);
    let b = encode_batch(&b_boundary, &requests);

    let a = std::str::from_utf8(&a).unwrap().replace(&a_boundary, "{B}");
    let b = std::str::from_utf8(&b).unwrap().replace(&b_boundary, "{B}");
    assert_eq!(a, b);
}
