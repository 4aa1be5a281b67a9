//! In-process key-value client

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use super::{ClientResult, KvClient, PendingReply};

enum Command {
    Set {
        key: String,
        value: Bytes,
        reply: oneshot::Sender<ClientResult<()>>,
    },
    Get {
        key: String,
        reply: oneshot::Sender<ClientResult<Option<Bytes>>>,
    },
}

/// Key-value client backed by a local map
///
/// Commands queue until [`KvClient::commit`] and are then applied in
/// submission order, so pipelining behaves as it would on a single server
/// connection.
#[derive(Default)]
pub struct MemoryClient {
    data: DashMap<String, Bytes>,
    queue: Mutex<Vec<Command>>,
}

impl MemoryClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Commands waiting for the next commit
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    fn apply(&self, command: Command) {
        match command {
            Command::Set { key, value, reply } => {
                self.data.insert(key, value);
                let _ = reply.send(Ok(()));
            }
            Command::Get { key, reply } => {
                let value = self.data.get(&key).map(|v| v.value().clone());
                let _ = reply.send(Ok(value));
            }
        }
    }
}

#[async_trait]
impl KvClient for MemoryClient {
    fn set(&self, key: &str, value: Bytes) -> PendingReply<()> {
        let (reply, pending) = PendingReply::channel();
        self.queue.lock().push(Command::Set {
            key: key.to_string(),
            value,
            reply,
        });
        pending
    }

    fn get(&self, key: &str) -> PendingReply<Option<Bytes>> {
        let (reply, pending) = PendingReply::channel();
        self.queue.lock().push(Command::Get {
            key: key.to_string(),
            reply,
        });
        pending
    }

    fn commit(&self) -> ClientResult<()> {
        // Held while applying so concurrent commits cannot interleave.
        let mut queue = self.queue.lock();
        trace!(commands = queue.len(), "applying pipeline");
        for command in queue.drain(..) {
            self.apply(command);
        }
        Ok(())
    }

    async fn sync_commit(&self) -> ClientResult<()> {
        self.commit()
    }

    async fn ping(&self) -> ClientResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let client = MemoryClient::new();
        let ack = client.set("a", Bytes::from_static(b"1"));
        let hit = client.get("a");
        let miss = client.get("b");
        assert_eq!(client.queued(), 3);

        client.commit().unwrap();
        assert_eq!(client.queued(), 0);

        ack.wait().await.unwrap();
        assert_eq!(hit.wait().await.unwrap(), Some(Bytes::from_static(b"1")));
        assert_eq!(miss.wait().await.unwrap(), None);
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn test_nothing_resolves_before_commit() {
        let client = MemoryClient::new();
        let mut ack = client.set("a", Bytes::new());
        assert!(ack.try_take().is_none());
        assert!(client.is_empty());

        client.sync_commit().await.unwrap();
        assert!(ack.try_take().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_submission_order() {
        let client = MemoryClient::new();
        let before = client.get("k");
        client.set("k", Bytes::from_static(b"A"));
        client.set("k", Bytes::from_static(b"B"));
        let after = client.get("k");
        client.commit().unwrap();

        assert_eq!(before.wait().await.unwrap(), None);
        assert_eq!(after.wait().await.unwrap(), Some(Bytes::from_static(b"B")));
    }

    #[test]
    fn test_concurrent_commits_keep_submission_order() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        const ROUNDS: usize = 20_000;
        let client = Arc::new(MemoryClient::new());
        let published = Arc::new(AtomicUsize::new(0));

        let writer = {
            let client = Arc::clone(&client);
            let published = Arc::clone(&published);
            std::thread::spawn(move || {
                for i in 1..=ROUNDS {
                    client.set(&format!("k{i}"), Bytes::from_static(b"v"));
                    published.store(i, Ordering::Release);
                    client.commit().unwrap();
                }
            })
        };

        let mut misses = 0;
        for i in 1..=ROUNDS {
            while published.load(Ordering::Acquire) < i {
                std::hint::spin_loop();
            }
            let mut reply = client.get(&format!("k{i}"));
            client.commit().unwrap();
            match reply.try_take() {
                Some(Ok(Some(_))) => {}
                _ => misses += 1,
            }
        }
        writer.join().unwrap();

        assert_eq!(misses, 0);
    }
}
