//! Key-value backed storage for encoded arrays
//!
//! This crate binds the `matkv-codec` wire format to a pipelined key-value
//! client, so arrays can be written and read by key and large batches can be
//! submitted without waiting on individual round trips.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        BatchDriver                           │
//! │   put+get per item, one flush, PendingSlots arena            │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │                        ObjectStore                           │
//! │   encode on put  ·  decode on get  ·  key prefix  ·  timeout │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ KvClient
//!             ┌──────────────────┴─────────────────┐
//! ┌───────────▼───────────┐            ┌───────────▼───────────┐
//! │     MemoryClient      │            │      RespClient       │
//! │  (in-process map)     │            │ (RESP2 over TCP,      │
//! │                       │            │  writer/reader tasks) │
//! └───────────────────────┘            └───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use matkv_store::{ClientConfig, ObjectStore, RespClient, StoreConfig};
//!
//! let client = Arc::new(RespClient::connect(&ClientConfig::default()).await?);
//! let store = ObjectStore::new(client, StoreConfig::default());
//!
//! store.put_sync("frame0", &image).await?;
//! let loaded = store.get_sync("frame0").await?;
//! assert_eq!(loaded, image);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod store;

pub use batch::{BatchDriver, BatchSubmission, PendingSlots};
pub use client::{ClientError, ClientResult, KvClient, MemoryClient, PendingReply, RespClient};
pub use config::{ClientConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use file::{load_array, save_array};
pub use store::{ObjectStore, PendingResult};
