//! Error types for the array store

use std::io;
use std::time::Duration;

use matkv_codec::CodecError;
use thiserror::Error;

use crate::client::ClientError;

/// Array store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key absent from the store
    #[error("key not found: {0}")]
    NotFound(String),

    /// Stored bytes failed codec validation
    #[error("malformed payload under {key}: {source}")]
    MalformedPayload {
        /// Key (or file path) the bytes came from
        key: String,
        /// Codec failure
        #[source]
        source: CodecError,
    },

    /// Array buffer inconsistent with its dimensions
    #[error("invalid input for {key}: {source}")]
    InvalidInput {
        /// Key the put was addressed to
        key: String,
        /// Codec failure
        #[source]
        source: CodecError,
    },

    /// Key-value client failure, passed through unchanged
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Read not resolved before the deadline
    #[error("timed out after {after:?} waiting for {key}")]
    Timeout {
        /// Key being read
        key: String,
        /// Configured deadline
        after: Duration,
    },

    /// Batch larger than the slot arena
    #[error("batch of {items} items exceeds {capacity} pending slots")]
    BatchCapacity {
        /// Items in the batch
        items: usize,
        /// Slots available
        capacity: usize,
    },

    /// Slot out of range or already consumed
    #[error("pending slot {0} is empty")]
    SlotUnavailable(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
