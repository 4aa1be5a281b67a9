//! Pipelined put/get batches
//!
//! A batch is submitted without blocking: for every item the driver queues a
//! put and then a get for the same key, parks the get's [`PendingResult`] in a
//! fixed-capacity [`PendingSlots`] arena at the item's index, and flushes the
//! whole pipeline once at the end. Callers then block on whichever slots they
//! care about.
//!
//! Each get is queued after its put on the same client, so it observes that
//! put as long as the backend preserves per-connection command order.

use std::time::{Duration, Instant};

use matkv_codec::ArrayValue;
use tracing::{debug, info};

use crate::client::{KvClient, PendingReply};
use crate::error::{StoreError, StoreResult};
use crate::store::{ObjectStore, PendingResult};

/// Fixed-capacity arena of in-flight reads
#[derive(Debug)]
pub struct PendingSlots {
    slots: Box<[Option<PendingResult>]>,
}

impl PendingSlots {
    /// Arena with room for `capacity` reads
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently holding a read
    pub fn issued(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether slot `index` holds a read
    pub fn is_issued(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Remove the read at `index`
    pub fn take(&mut self, index: usize) -> StoreResult<PendingResult> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(StoreError::SlotUnavailable(index))
    }

    fn set(&mut self, index: usize, pending: PendingResult) {
        self.slots[index] = Some(pending);
    }
}

/// Outcome of submitting a batch
#[derive(Debug)]
pub struct BatchSubmission {
    acks: Vec<PendingReply<()>>,
    elapsed: Duration,
}

impl BatchSubmission {
    /// Items submitted
    pub fn len(&self) -> usize {
        self.acks.len()
    }

    /// True for an empty batch
    pub fn is_empty(&self) -> bool {
        self.acks.is_empty()
    }

    /// Wall time spent encoding and queueing
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Wait until every put has been acknowledged
    pub async fn confirm(self) -> StoreResult<()> {
        for ack in self.acks {
            ack.wait().await?;
        }
        Ok(())
    }
}

/// Submits batches of put/get pairs
pub struct BatchDriver<'a, C> {
    store: &'a ObjectStore<C>,
}

impl<'a, C: KvClient> BatchDriver<'a, C> {
    /// Create a driver over `store`
    pub fn new(store: &'a ObjectStore<C>) -> Self {
        Self { store }
    }

    /// Submit `items`, leaving one pending read per item in `slots`
    ///
    /// Capacity and every item are checked before anything is queued, so an
    /// error leaves the store untouched. On success slots `0..items.len()`
    /// all hold an issued read.
    pub fn run_batch(
        &self,
        items: &[(String, ArrayValue)],
        slots: &mut PendingSlots,
    ) -> StoreResult<BatchSubmission> {
        if items.len() > slots.capacity() {
            return Err(StoreError::BatchCapacity {
                items: items.len(),
                capacity: slots.capacity(),
            });
        }
        for (key, value) in items {
            value.validate().map_err(|source| StoreError::InvalidInput {
                key: key.clone(),
                source,
            })?;
        }

        let start = Instant::now();
        let mut acks = Vec::with_capacity(items.len());
        for (index, (key, value)) in items.iter().enumerate() {
            acks.push(self.store.put(key, value)?);
            slots.set(index, self.store.get(key));
        }
        self.store.flush()?;
        let elapsed = start.elapsed();

        info!(items = items.len(), elapsed_us = elapsed.as_micros() as u64, "batch submitted");
        Ok(BatchSubmission { acks, elapsed })
    }

    /// Block on slot `index` and compare the decoded array with `expected`
    pub async fn verify(
        &self,
        slots: &mut PendingSlots,
        index: usize,
        expected: &ArrayValue,
    ) -> StoreResult<bool> {
        let pending = slots.take(index)?;
        let key = pending.key().to_string();
        let decoded = pending.wait().await?;
        let matched = decoded == *expected;
        debug!(index, key = %key, matched, "verified slot");
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::client::MemoryClient;
    use crate::config::StoreConfig;
    use matkv_codec::ElementType;

    fn create_test_store() -> ObjectStore<MemoryClient> {
        ObjectStore::new(Arc::new(MemoryClient::new()), StoreConfig::default())
    }

    fn items(n: u8) -> Vec<(String, ArrayValue)> {
        (0..n)
            .map(|i| {
                let value = ArrayValue::filled(2, 2, ElementType::U8C1, i).unwrap();
                (format!("k{i}"), value)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_every_slot_is_issued() {
        let store = create_test_store();
        let driver = BatchDriver::new(&store);
        let items = items(3);
        let mut slots = PendingSlots::with_capacity(5);

        let submission = driver.run_batch(&items, &mut slots).unwrap();
        assert_eq!(submission.len(), 3);
        assert_eq!(slots.issued(), 3);
        assert!(slots.is_issued(2));
        assert!(!slots.is_issued(3));
        submission.confirm().await.unwrap();
    }

    #[tokio::test]
    async fn test_capacity_checked_before_submitting() {
        let store = create_test_store();
        let driver = BatchDriver::new(&store);
        let mut slots = PendingSlots::with_capacity(2);

        let err = driver.run_batch(&items(3), &mut slots).unwrap_err();
        assert!(matches!(err, StoreError::BatchCapacity { items: 3, capacity: 2 }));
        assert_eq!(slots.issued(), 0);
        assert_eq!(store.client().queued(), 0);
    }

    #[tokio::test]
    async fn test_invalid_item_rejects_whole_batch() {
        let store = create_test_store();
        let driver = BatchDriver::new(&store);
        let mut items = items(3);
        items[2].1.data.clear();
        let mut slots = PendingSlots::with_capacity(3);

        let err = driver.run_batch(&items, &mut slots).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput { ref key, .. } if key == "k2"));
        assert_eq!(slots.issued(), 0);
        assert!(store.client().is_empty());
    }

    #[tokio::test]
    async fn test_slot_consumed_once() {
        let store = create_test_store();
        let driver = BatchDriver::new(&store);
        let items = items(1);
        let mut slots = PendingSlots::with_capacity(1);
        driver.run_batch(&items, &mut slots).unwrap();

        assert!(driver.verify(&mut slots, 0, &items[0].1).await.unwrap());
        let err = driver.verify(&mut slots, 0, &items[0].1).await.unwrap_err();
        assert!(matches!(err, StoreError::SlotUnavailable(0)));
        assert!(matches!(slots.take(9), Err(StoreError::SlotUnavailable(9))));
    }
}
