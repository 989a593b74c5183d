//! End-to-end submission tests against a mock server.

use mockito::Matcher;
use storage_batch_http::{AccessTier, BatchClient, BatchError, BlobBatch, ClientConfig};

const RESPONSE_BOUNDARY: &str = "batchresponse_66925647";

fn part(status: u16, reason: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut s = format!(
        "--{}\r\nContent-Type: application/http\r\nContent-Transfer-Encoding: binary\r\n\r\n",
        RESPONSE_BOUNDARY
    );
    s.push_str(&format!("HTTP/1.1 {} {}\r\n", status, reason));
    for (name, value) in headers {
        s.push_str(&format!("{}: {}\r\n", name, value));
    }
    s.push_str("\r\n");
    s.push_str(body);
    s.push_str("\r\n");
    s
}

fn terminated(parts: &[String]) -> String {
    let mut body: String = parts.concat();
    body.push_str(&format!("--{}--\r\n", RESPONSE_BOUNDARY));
    body
}

fn mixed_batch() -> BlobBatch {
    let mut batch = BlobBatch::new();
    batch.delete_blob("c1", "b1", Default::default());
    batch.set_access_tier("c1", "b2", AccessTier::Hot, Default::default());
    batch.delete_blob("c1", "b3", Default::default());
    batch
}

#[tokio::test]
async fn submit_batch_demultiplexes_mixed_outcomes() {
    let mut server = mockito::Server::new_async().await;
    let body = terminated(&[
        part(202, "Accepted", &[("x-ms-request-id", "r0")], ""),
        part(200, "OK", &[("x-ms-request-id", "r1")], ""),
        part(
            404,
            "The specified blob does not exist.",
            &[("x-ms-error-code", "BlobNotFound")],
            "<?xml version=\"1.0\"?><Error><Code>BlobNotFound</Code></Error>",
        ),
    ]);
    let mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/mixed; boundary=batch_".into()),
        )
        .match_body(Matcher::Regex(
            "Content-ID: 0\r\n\r\nDELETE /c1/b1 HTTP/1\\.1\r\n".into(),
        ))
        .with_status(202)
        .with_header(
            "content-type",
            &format!("multipart/mixed; boundary={}", RESPONSE_BOUNDARY),
        )
        .with_body(body)
        .create_async()
        .await;

    let client = BatchClient::new(&server.url()).unwrap();
    let results = client.submit_batch(&mixed_batch()).await.unwrap();
    mock.assert_async().await;

    assert_eq!(results.total_slots(), 3);
    assert_eq!(results.deletes.len(), 2);
    assert_eq!(results.set_tiers.len(), 1);

    assert!(results.deletes[0].is_ok());
    let failure = results.deletes[1].as_ref().unwrap_err();
    assert_eq!(failure.status, 404);
    assert_eq!(failure.error_code.as_deref(), Some("BlobNotFound"));
    assert!(failure.response.body.starts_with(b"<?xml"));

    let tier = results.set_tiers[0].as_ref().unwrap();
    assert!(!tier.pending);
    assert_eq!(results.failure_count(), 1);
}

#[tokio::test]
async fn missing_boundary_parameter_fails_the_whole_call() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
        .with_status(202)
        .with_header("content-type", "application/xml")
        .with_body("<Error/>")
        .create_async()
        .await;

    let client = BatchClient::new(&server.url()).unwrap();
    let err = client.submit_batch(&mixed_batch()).await.unwrap_err();
    assert!(matches!(err, BatchError::MissingBoundary(_)));
}

#[tokio::test]
async fn part_count_mismatch_fails_the_whole_call() {
    let mut server = mockito::Server::new_async().await;
    let body = terminated(&[part(202, "Accepted", &[], "")]);
    let _mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
        .with_status(202)
        .with_header(
            "content-type",
            &format!("multipart/mixed; boundary={}", RESPONSE_BOUNDARY),
        )
        .with_body(body)
        .create_async()
        .await;

    let client = BatchClient::new(&server.url()).unwrap();
    let err = client.submit_batch(&mixed_batch()).await.unwrap_err();
    assert!(matches!(
        err,
        BatchError::CountMismatch {
            expected: 3,
            actual: 1
        }
    ));
}

#[tokio::test]
async fn rejected_outer_request_fails_the_whole_call() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
        .with_status(400)
        .with_body("bad request")
        .create_async()
        .await;

    let client = BatchClient::new(&server.url()).unwrap();
    let err = client.submit_batch(&mixed_batch()).await.unwrap_err();
    assert!(matches!(err, BatchError::UnexpectedStatus(400)));
}

#[tokio::test]
async fn malformed_part_framing_fails_the_whole_call() {
    let mut server = mockito::Server::new_async().await;
    // Parts present but the first status line is garbage.
    let body = format!(
        "--{b}\r\nContent-Type: application/http\r\n\r\nNOT-HTTP\r\n\r\n\r\n--{b}--\r\n",
        b = RESPONSE_BOUNDARY
    );
    let _mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
        .with_status(202)
        .with_header(
            "content-type",
            &format!("multipart/mixed; boundary={}", RESPONSE_BOUNDARY),
        )
        .with_body(body)
        .create_async()
        .await;

    let client = BatchClient::new(&server.url()).unwrap();
    let err = client.submit_batch(&mixed_batch()).await.unwrap_err();
    assert!(matches!(err, BatchError::Frame { .. }));
}

#[tokio::test]
async fn bearer_credential_reaches_outer_and_sub_requests() {
    let mut server = mockito::Server::new_async().await;
    let body = terminated(&[part(202, "Accepted", &[], "")]);
    let mock = server
        .mock("POST", "/")
        .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
        .match_header("authorization", "Bearer sas-token")
        .match_body(Matcher::Regex(
            "Authorization: Bearer sas-token\r\n".into(),
        ))
        .with_status(202)
        .with_header(
            "content-type",
            &format!("multipart/mixed; boundary={}", RESPONSE_BOUNDARY),
        )
        .with_body(body)
        .create_async()
        .await;

    let client = BatchClient::with_bearer_token(
        &server.url(),
        "sas-token",
        ClientConfig::default(),
    )
    .unwrap();
    let mut batch = BlobBatch::new();
    batch.delete_blob("c1", "b1", Default::default());
    let results = client.submit_batch(&batch).await.unwrap();
    mock.assert_async().await;
    assert!(results.is_fully_successful());
}
