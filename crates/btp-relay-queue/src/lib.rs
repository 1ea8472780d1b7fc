//! Bounded FIFO of in-flight relay message identifiers and their transaction hashes.
//!
//! Consulted by the Sender for admission control: once full, new submissions fail with
//! [`QueueError::Full`] and the Link translates that into a `PENDING` transition.

use std::collections::VecDeque;

use btp_relay_types::InflightRecord;
use thiserror::Error;

/// Default bounded capacity, per the link's resource policy.
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full (capacity {0})")]
    Full(usize),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Bounded FIFO of [`InflightRecord`]s, identified by relay message id.
#[derive(Debug)]
pub struct Queue {
    records: VecDeque<InflightRecord>,
    capacity: usize,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a new in-flight record, failing with [`QueueError::Full`] at capacity.
    pub fn enqueue(&mut self, id: u64, tx_hash: String) -> QueueResult<()> {
        if self.records.len() >= self.capacity {
            return Err(QueueError::Full(self.capacity));
        }
        self.records.push_back(InflightRecord { id, tx_hash });
        Ok(())
    }

    /// Removes the first record with a matching id. No-op if absent.
    pub fn dequeue(&mut self, id: u64) {
        if let Some(pos) = self.records.iter().position(|r| r.id == id) {
            self.records.remove(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &InflightRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_dequeue_round_trip() {
        let mut q = Queue::new();
        q.enqueue(1, "0xabc".to_string()).unwrap();
        assert_eq!(q.len(), 1);
        q.dequeue(1);
        assert!(q.is_empty());
    }

    #[test]
    fn dequeue_missing_id_is_noop() {
        let mut q = Queue::new();
        q.enqueue(1, "0xabc".to_string()).unwrap();
        q.dequeue(999);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn full_queue_rejects_enqueue() {
        let mut q = Queue::with_capacity(2);
        q.enqueue(1, "a".to_string()).unwrap();
        q.enqueue(2, "b".to_string()).unwrap();
        assert!(q.is_full());
        let err = q.enqueue(3, "c".to_string()).unwrap_err();
        assert_eq!(err, QueueError::Full(2));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn capacity_is_100_by_default() {
        let q = Queue::new();
        assert_eq!(q.capacity, DEFAULT_CAPACITY);
    }
}
