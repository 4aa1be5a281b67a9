//! Key-value clients
//!
//! The store talks to its backend through [`KvClient`]. Commands are queued
//! without blocking and each returns a [`PendingReply`]; nothing reaches the
//! backend until [`KvClient::commit`] flushes the queue as one pipeline.
//! Replies resolve in submission order.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::oneshot;

pub mod frame;
mod memory;
mod resp;

pub use frame::{encode_command, Frame};
pub use memory::MemoryClient;
pub use resp::RespClient;

/// Key-value client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Connect did not complete in time
    #[error("timed out connecting to {0}")]
    ConnectTimeout(String),

    /// Reply did not match the command
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Error reply from the server
    #[error("server error: {0}")]
    Server(String),

    /// Connection closed before the reply arrived
    #[error("connection closed")]
    ConnectionClosed,

    /// Connection failed while replies were outstanding
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Reply to a queued command, resolved exactly once
#[derive(Debug)]
pub struct PendingReply<T> {
    rx: oneshot::Receiver<ClientResult<T>>,
}

impl<T> PendingReply<T> {
    /// Create a reply handle and the sender that resolves it
    pub fn channel() -> (oneshot::Sender<ClientResult<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Handle that is already resolved
    pub fn ready(result: ClientResult<T>) -> Self {
        let (tx, reply) = Self::channel();
        let _ = tx.send(result);
        reply
    }

    /// Wait for the reply
    pub async fn wait(self) -> ClientResult<T> {
        self.rx.await.map_err(|_| ClientError::ConnectionClosed)?
    }

    /// Take the reply if it has already arrived
    pub fn try_take(&mut self) -> Option<ClientResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(ClientError::ConnectionClosed)),
        }
    }
}

/// Pipelined key-value client
#[async_trait]
pub trait KvClient: Send + Sync {
    /// Queue `SET key value`
    fn set(&self, key: &str, value: Bytes) -> PendingReply<()>;

    /// Queue `GET key`, resolving to `None` when the key is absent
    fn get(&self, key: &str) -> PendingReply<Option<Bytes>>;

    /// Send every queued command without waiting for replies
    fn commit(&self) -> ClientResult<()>;

    /// Send every queued command and wait until all of them are answered
    async fn sync_commit(&self) -> ClientResult<()>;

    /// Round-trip health check
    async fn ping(&self) -> ClientResult<()>;
}
