// Bounded, insertion-ordered history ring
use crate::error::{SyncError, SyncResult};
use std::collections::VecDeque;

/// Fixed-capacity ordered store. Oldest entries sit at the front, the newest
/// at the back; the length never exceeds `capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> HistoryBuffer<T> {
    pub fn new(capacity: usize) -> SyncResult<Self> {
        if capacity == 0 {
            return Err(SyncError::Config(
                "history buffer capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Buffer pre-filled to capacity with `value`.
    pub fn filled(capacity: usize, value: T) -> SyncResult<Self> {
        let mut buffer = Self::new(capacity)?;
        buffer.items.extend(std::iter::repeat_n(value, capacity));
        Ok(buffer)
    }

    /// Push the newest record, evicting the oldest once past capacity.
    pub fn append_bounded(&mut self, record: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(record);
    }

    /// Swap the whole contents. When handed more than `capacity` records the
    /// newest ones (the tail) are kept.
    pub fn replace_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut next: VecDeque<T> = records.into_iter().collect();
        let excess = next.len().saturating_sub(self.capacity);
        next.drain(..excess);
        self.items = next;
    }

    /// Owned copy, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
