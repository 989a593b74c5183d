//! Submit a small mixed batch against a blob service endpoint.
//!
//! Usage:
//!
//! ```text
//! cargo run --example submit_batch -- https://account.blob.example.net [bearer-token]
//! ```

use storage_batch_http::{AccessTier, BatchClient, BlobBatch, ClientConfig};

#[tokio::main]
async fn main() -> storage_batch_http::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let service_url = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:10000/devstoreaccount1".to_string());

    let client = match args.next() {
        Some(token) => BatchClient::with_bearer_token(&service_url, token, ClientConfig::default())?,
        None => BatchClient::new(&service_url)?,
    };

    let mut batch = BlobBatch::new();
    batch.delete_blob("demo", "old-report.csv", Default::default());
    batch.set_access_tier("demo", "cold-archive.bin", AccessTier::Archive, Default::default());
    batch.delete_blob("demo", "tmp/scratch.dat", Default::default());

    let results = client.submit_batch(&batch).await?;

    for (i, outcome) in results.deletes.iter().enumerate() {
        match outcome {
            Ok(r) => println!("delete[{}]: ok (request id {:?})", i, r.request_id),
            Err(f) => println!("delete[{}]: {}", i, f),
        }
    }
    for (i, outcome) in results.set_tiers.iter().enumerate() {
        match outcome {
            Ok(r) => println!("set_tier[{}]: ok (pending: {})", i, r.pending),
            Err(f) => println!("set_tier[{}]: {}", i, f),
        }
    }
    println!(
        "{} of {} slots succeeded",
        results.total_slots() - results.failure_count(),
        results.total_slots()
    );
    Ok(())
}
