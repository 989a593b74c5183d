//! Batch HTTP client.
//!
//! This module assembles the protocol engine into a usable client:
//!
//! ```text
//! client/
//! ├── submit  - BatchClient, pipeline assembly, submit_batch
//! ├── config  - Client configuration
//! └── utils   - Retry classification and backoff
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BatchClient`] | Submits a [`BlobBatch`](crate::BlobBatch) in one round trip |
//! | [`ClientConfig`] | Timeouts, retry budget, user agent |
//!
//! # Examples
//!
//! ```
//! use storage_batch_http::client::{BatchClient, ClientConfig};
//!
//! let config = ClientConfig {
//!     max_retries: 5,
//!     ..Default::default()
//! };
//! let client = BatchClient::with_config("https://account.blob.example.net", config).unwrap();
//! assert_eq!(client.config().max_retries, 5);
//! ```

mod config;
mod submit;
pub(crate) mod utils;

pub use config::ClientConfig;
pub use submit::BatchClient;
pub use utils::{exponential_backoff, is_retryable_status};
