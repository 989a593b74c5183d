#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Batch Multipart Protocol Engine
//!
//! This crate lets a caller submit a heterogeneous set of independent blob
//! operations as a single network round trip instead of one round trip per
//! operation. The engine:
//!
//! 1. serializes N independently-constructed sub-operations into one
//!    `multipart/mixed` body,
//! 2. sends that body as one outer request, and
//! 3. parses the server's `multipart/mixed` response back into N ordered,
//!    independently-successful-or-failed sub-results.
//!
//! Submission order is preserved end to end and failures are isolated per
//! slot: one failed sub-operation never invalidates the others. Only a broken
//! multipart frame (missing boundary parameter, malformed status line, part
//! count mismatch) fails the whole call, because slot boundaries themselves
//! become unreliable once framing is suspect.
//!
//! ## Control Flow
//!
//! ```text
//! BlobBatch --materialize--> RawRequest per slot   (pipeline, no-op transport)
//!           --encode-->      multipart/mixed body  (fresh boundary token)
//!           --submit-->      ONE outer exchange    (pipeline, real transport)
//!           --decode-->      RawResponse per slot  (byte-cursor state machine)
//!           --demux-->       BatchResults          (per-kind decoders)
//! ```
//!
//! ## Module Structure
//!
//! - **[batch]** - Descriptor set, per-slot outcomes, result demultiplexer
//! - **[client]** - Batch client, pipeline assembly, configuration
//! - **[error]** - Error types and result handling
//! - **[operations]** - Per-kind request builders and response decoders
//! - **[pipeline]** - HTTP policy pipeline with no-op and real transports
//! - **[protocol]** - Multipart wire format: constants, encoder, decoder
//! - **[types]** - Option and result records for the supported operations

pub mod batch;
pub mod client;
pub mod error;
pub mod operations;
pub mod pipeline;
pub mod protocol;
pub mod types;

pub use batch::{BatchResults, BlobBatch, SubRequest, SubRequestFailure, SubRequestResult};
pub use client::{BatchClient, ClientConfig};
pub use error::{BatchError, Result};
pub use types::{
    AccessConditions, AccessTier, DeleteBlobOptions, DeleteBlobResult, DeleteSnapshots,
    RehydratePriority, SetAccessTierOptions, SetAccessTierResult,
};
