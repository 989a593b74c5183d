//! Core model types for batch sub-operations.
//!
//! These are the caller-facing option and result records for the supported
//! sub-operation kinds. They are pure data: mapping them onto request headers
//! happens in [`crate::operations`], and nothing here touches the network.

use serde::{Deserialize, Serialize};

/// Access tier of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTier {
    /// Optimized for frequent access
    Hot,
    /// Optimized for infrequent access
    Cool,
    /// Offline tier; reads require rehydration
    Archive,
}

impl AccessTier {
    /// Wire value for the `x-ms-access-tier` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::Hot => "Hot",
            AccessTier::Cool => "Cool",
            AccessTier::Archive => "Archive",
        }
    }
}

/// Priority with which an archived blob is rehydrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RehydratePriority {
    /// Standard rehydration, may take hours
    Standard,
    /// High-priority rehydration
    High,
}

impl RehydratePriority {
    /// Wire value for the `x-ms-rehydrate-priority` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            RehydratePriority::Standard => "Standard",
            RehydratePriority::High => "High",
        }
    }
}

/// What to do with snapshots when deleting a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteSnapshots {
    /// Delete the base blob and all of its snapshots
    IncludeSnapshots,
    /// Delete only the snapshots, keeping the base blob
    OnlySnapshots,
}

impl DeleteSnapshots {
    /// Wire value for the `x-ms-delete-snapshots` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteSnapshots::IncludeSnapshots => "include",
            DeleteSnapshots::OnlySnapshots => "only",
        }
    }
}

/// Conditional access restrictions for a sub-operation.
///
/// Date fields are HTTP-date strings (RFC 7231 format) supplied by the
/// caller; the engine forwards them verbatim as conditional request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessConditions {
    /// Only act if the blob was modified since this HTTP-date
    pub if_modified_since: Option<String>,
    /// Only act if the blob was NOT modified since this HTTP-date
    pub if_unmodified_since: Option<String>,
    /// Only act if the blob's ETag matches
    pub if_match: Option<String>,
    /// Only act if the blob's ETag does not match
    pub if_none_match: Option<String>,
    /// Lease id, required when the blob holds an active lease
    pub lease_id: Option<String>,
}

/// Options for a delete-blob sub-operation.
#[derive(Debug, Clone, Default)]
pub struct DeleteBlobOptions {
    /// Snapshot handling; `None` is rejected by the service when snapshots exist
    pub delete_snapshots: Option<DeleteSnapshots>,
    /// Conditional access restrictions
    pub access_conditions: AccessConditions,
}

/// Options for a set-access-tier sub-operation.
#[derive(Debug, Clone, Default)]
pub struct SetAccessTierOptions {
    /// Rehydrate priority, meaningful only when moving out of Archive
    pub rehydrate_priority: Option<RehydratePriority>,
    /// Lease id, required when the blob holds an active lease
    pub lease_id: Option<String>,
}

/// Successful outcome of a delete-blob sub-operation.
#[derive(Debug, Clone, Default)]
pub struct DeleteBlobResult {
    /// Service-assigned request id of the sub-response, when present
    pub request_id: Option<String>,
}

/// Successful outcome of a set-access-tier sub-operation.
#[derive(Debug, Clone, Default)]
pub struct SetAccessTierResult {
    /// Service-assigned request id of the sub-response, when present
    pub request_id: Option<String>,
    /// True when the tier change is still pending (202 rehydrate in progress)
    pub pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_wire_values() {
        assert_eq!(AccessTier::Hot.as_str(), "Hot");
        assert_eq!(AccessTier::Archive.as_str(), "Archive");
    }

    #[test]
    fn test_delete_snapshots_wire_values() {
        assert_eq!(DeleteSnapshots::IncludeSnapshots.as_str(), "include");
        assert_eq!(DeleteSnapshots::OnlySnapshots.as_str(), "only");
    }

    #[test]
    fn test_default_options_are_empty() {
        let options = DeleteBlobOptions::default();
        assert!(options.delete_snapshots.is_none());
        assert!(options.access_conditions.lease_id.is_none());
    }
}
