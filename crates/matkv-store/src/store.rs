//! Main array store interface

use std::sync::Arc;

use bytes::Bytes;
use matkv_codec::{decode, encode, ArrayValue};
use tracing::{debug, warn};

use crate::client::{KvClient, PendingReply};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Array store - encodes on put, decodes on get
pub struct ObjectStore<C> {
    /// Key-value backend
    client: Arc<C>,
    /// Configuration
    config: StoreConfig,
}

impl<C: KvClient> ObjectStore<C> {
    /// Create a new store over `client`
    pub fn new(client: Arc<C>, config: StoreConfig) -> Self {
        Self { client, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the key-value client
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Queue a write of `value` under `key`
    ///
    /// Fails immediately when the array is inconsistent; nothing is queued in
    /// that case. Otherwise the returned ack carries the client's answer
    /// unchanged once the pipeline is flushed.
    pub fn put(&self, key: &str, value: &ArrayValue) -> StoreResult<PendingReply<()>> {
        let payload = encode(value).map_err(|source| StoreError::InvalidInput {
            key: key.to_string(),
            source,
        })?;

        let object_key = self.config.object_key(key);
        debug!(key = %object_key, bytes = payload.len(), "queue put");
        Ok(self.client.set(&object_key, Bytes::from(payload)))
    }

    /// Queue a read of `key`
    pub fn get(&self, key: &str) -> PendingResult {
        let object_key = self.config.object_key(key);
        debug!(key = %object_key, "queue get");
        PendingResult {
            reply: self.client.get(&object_key),
            key: object_key,
            timeout: self.config.read_timeout(),
        }
    }

    /// Send queued operations without waiting
    pub fn flush(&self) -> StoreResult<()> {
        Ok(self.client.commit()?)
    }

    /// Send queued operations and wait for all of them to be answered
    pub async fn sync(&self) -> StoreResult<()> {
        Ok(self.client.sync_commit().await?)
    }

    /// Write `value` and wait for the acknowledgement
    pub async fn put_sync(&self, key: &str, value: &ArrayValue) -> StoreResult<()> {
        let ack = self.put(key, value)?;
        self.sync().await?;
        Ok(ack.wait().await?)
    }

    /// Read `key` and wait for the value
    pub async fn get_sync(&self, key: &str) -> StoreResult<ArrayValue> {
        let pending = self.get(key);
        self.flush()?;
        pending.wait().await
    }

    /// Check the backend is reachable
    pub async fn ping(&self) -> StoreResult<()> {
        Ok(self.client.ping().await?)
    }
}

/// In-flight read of one array
#[derive(Debug)]
pub struct PendingResult {
    key: String,
    reply: PendingReply<Option<Bytes>>,
    timeout: Option<std::time::Duration>,
}

impl PendingResult {
    /// Key as stored (including any prefix)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the read and decode it
    pub async fn wait(self) -> StoreResult<ArrayValue> {
        let Self {
            key,
            reply,
            timeout,
        } = self;

        let bytes = match timeout {
            Some(after) => tokio::time::timeout(after, reply.wait())
                .await
                .map_err(|_| StoreError::Timeout {
                    key: key.clone(),
                    after,
                })??,
            None => reply.wait().await?,
        };

        let Some(bytes) = bytes else {
            return Err(StoreError::NotFound(key));
        };

        decode(&bytes).map_err(|source| {
            warn!(key = %key, error = %source, "stored bytes failed to decode");
            StoreError::MalformedPayload { key, source }
        })
    }
}
