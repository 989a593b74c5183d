//! Batch descriptor set, per-slot outcomes, and the result demultiplexer.
//!
//! A [`BlobBatch`] is the pure-data collection of sub-operations the caller
//! declares before submission. Descriptors live in ONE ordered sequence of
//! tagged [`SubRequest`] variants, so the submission order is explicit and
//! total: the slot index returned by each `add` method is the global
//! zero-based position of that operation in the encoded body, its Content-ID,
//! and its position among the parts of the response.
//!
//! After the multipart decoder splits the response, [`demux`] walks the
//! parsed sub-responses and the descriptor sequence in lockstep and hands
//! each pair to the decoder for its kind. A decoder failure (unexpected
//! status, malformed payload) is captured as a [`SubRequestFailure`] in that
//! slot only; the batch as a whole still produces a [`BatchResults`]. This
//! per-slot isolation is the central failure-handling contract of the engine.

use crate::error::{BatchError, Result};
use crate::operations;
use crate::pipeline::RawResponse;
use crate::protocol::constants::headers;
use crate::types::{
    AccessTier, DeleteBlobOptions, DeleteBlobResult, SetAccessTierOptions, SetAccessTierResult,
};
use thiserror::Error;

/// Discriminant of a sub-operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubRequestKind {
    /// Delete a blob
    Delete,
    /// Change a blob's access tier
    SetTier,
}

/// One declared sub-operation: resource address plus kind-specific options.
///
/// Immutable once appended; inspect it through [`BlobBatch::sub_requests`].
#[derive(Debug, Clone)]
pub enum SubRequest {
    /// Delete the addressed blob
    Delete {
        /// Container name
        container: String,
        /// Blob name
        blob: String,
        /// Delete options
        options: DeleteBlobOptions,
    },
    /// Move the addressed blob to another access tier
    SetTier {
        /// Container name
        container: String,
        /// Blob name
        blob: String,
        /// Target tier
        tier: AccessTier,
        /// Tier-change options
        options: SetAccessTierOptions,
    },
}

impl SubRequest {
    /// The kind tag used for result demultiplexing.
    pub fn kind(&self) -> SubRequestKind {
        match self {
            SubRequest::Delete { .. } => SubRequestKind::Delete,
            SubRequest::SetTier { .. } => SubRequestKind::SetTier,
        }
    }
}

/// Ordered set of sub-operations for one batch submission.
///
/// Built by a single caller before one `submit_batch` call; the set is not
/// meant for concurrent mutation.
///
/// # Examples
///
/// ```
/// use storage_batch_http::{AccessTier, BlobBatch};
///
/// let mut batch = BlobBatch::new();
/// assert_eq!(batch.delete_blob("c1", "b1", Default::default()), 0);
/// assert_eq!(batch.set_access_tier("c1", "b2", AccessTier::Hot, Default::default()), 1);
/// assert_eq!(batch.delete_blob("c1", "b3", Default::default()), 2);
/// assert_eq!(batch.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct BlobBatch {
    sub_requests: Vec<SubRequest>,
}

impl BlobBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        BlobBatch::default()
    }

    /// Append a delete-blob sub-operation; returns its slot index.
    pub fn delete_blob(
        &mut self,
        container: impl Into<String>,
        blob: impl Into<String>,
        options: DeleteBlobOptions,
    ) -> usize {
        self.sub_requests.push(SubRequest::Delete {
            container: container.into(),
            blob: blob.into(),
            options,
        });
        self.sub_requests.len() - 1
    }

    /// Append a set-access-tier sub-operation; returns its slot index.
    pub fn set_access_tier(
        &mut self,
        container: impl Into<String>,
        blob: impl Into<String>,
        tier: AccessTier,
        options: SetAccessTierOptions,
    ) -> usize {
        self.sub_requests.push(SubRequest::SetTier {
            container: container.into(),
            blob: blob.into(),
            tier,
            options,
        });
        self.sub_requests.len() - 1
    }

    /// Number of declared sub-operations.
    pub fn len(&self) -> usize {
        self.sub_requests.len()
    }

    /// True when nothing has been declared yet.
    pub fn is_empty(&self) -> bool {
        self.sub_requests.is_empty()
    }

    /// Declared sub-operations in submission order.
    pub fn sub_requests(&self) -> &[SubRequest] {
        &self.sub_requests
    }
}

/// Captured failure of one sub-operation.
///
/// The frame around this slot was valid; the embedded response simply
/// reported an error or could not be interpreted by the kind's decoder. The
/// raw sub-response is retained for diagnostics.
#[derive(Debug, Error)]
#[error("sub-request failed with status {status}: {}", .error_code.as_deref().unwrap_or(.reason))]
pub struct SubRequestFailure {
    /// Embedded status code of the failed slot
    pub status: u16,
    /// Reason phrase as received
    pub reason: String,
    /// Machine-readable service error code, when the service sent one
    pub error_code: Option<String>,
    /// The full sub-response, retained for diagnostics
    pub response: RawResponse,
}

impl SubRequestFailure {
    /// Capture a failure outcome from a parsed sub-response.
    pub fn from_response(response: RawResponse) -> Self {
        SubRequestFailure {
            status: response.status,
            reason: response.reason.clone(),
            error_code: response.header(headers::ERROR_CODE).map(str::to_string),
            response,
        }
    }
}

/// Per-slot outcome: decoded success value or captured failure.
pub type SubRequestResult<T> = std::result::Result<T, SubRequestFailure>;

/// Ordered per-kind outcomes of one batch submission.
///
/// Each vector preserves the submission order of its kind. A failed slot
/// carries its [`SubRequestFailure`]; the surrounding call still succeeds.
#[derive(Debug, Default)]
pub struct BatchResults {
    /// Outcomes of delete-blob sub-operations, in submission order
    pub deletes: Vec<SubRequestResult<DeleteBlobResult>>,
    /// Outcomes of set-access-tier sub-operations, in submission order
    pub set_tiers: Vec<SubRequestResult<SetAccessTierResult>>,
}

impl BatchResults {
    /// Total number of slots across all kinds.
    pub fn total_slots(&self) -> usize {
        self.deletes.len() + self.set_tiers.len()
    }

    /// Number of slots that carry a failure outcome.
    pub fn failure_count(&self) -> usize {
        self.deletes.iter().filter(|r| r.is_err()).count()
            + self.set_tiers.iter().filter(|r| r.is_err()).count()
    }

    /// True when every slot decoded successfully.
    pub fn is_fully_successful(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Pair each parsed sub-response with the decoder for its slot's kind.
///
/// A part count that differs from the descriptor count means the slot
/// boundaries themselves cannot be trusted, which is a call-level protocol
/// violation rather than a per-item failure.
pub(crate) fn demux(sub_requests: &[SubRequest], parts: Vec<RawResponse>) -> Result<BatchResults> {
    if parts.len() != sub_requests.len() {
        return Err(BatchError::CountMismatch {
            expected: sub_requests.len(),
            actual: parts.len(),
        });
    }

    let mut results = BatchResults::default();
    for (slot, (sub_request, part)) in sub_requests.iter().zip(parts).enumerate() {
        let status = part.status;
        let failed = match sub_request.kind() {
            SubRequestKind::Delete => {
                let outcome = operations::delete::decode_response(part);
                let failed = outcome.is_err();
                results.deletes.push(outcome);
                failed
            }
            SubRequestKind::SetTier => {
                let outcome = operations::tier::decode_response(part);
                let failed = outcome.is_err();
                results.set_tiers.push(outcome);
                failed
            }
        };
        if failed {
            tracing::debug!(slot, status, "sub-request failed");
        }
    }
    Ok(results)
}
