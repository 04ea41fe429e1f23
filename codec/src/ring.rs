//! Fixed-capacity ring buffer addressed relative to its head.

use std::collections::TryReserveError;

/// An owned ring buffer whose entries are addressed by distance from the most
/// recent push: index 0 is the newest entry, index `len - 1` the oldest live
/// one.
///
/// `limit` caps how many entries are live; it may be smaller than the slot
/// count. Pushing past the limit silently evicts the oldest live entry.
#[derive(Debug, Clone)]
pub(crate) struct RingBuffer<T> {
    slots: Vec<T>,
    head: usize,
    len: usize,
    limit: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Allocates `capacity` slots without aborting on allocation failure.
    pub(crate) fn try_new(capacity: usize, limit: usize) -> Result<Self, TryReserveError> {
        let capacity = capacity.max(1);
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize(capacity, T::default());
        Ok(Self {
            slots,
            head: 0,
            len: 0,
            limit: limit.min(capacity),
        })
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn push(&mut self, item: T) {
        self.head = (self.head + 1) % self.slots.len();
        self.slots[self.head] = item;
        if self.len < self.limit {
            self.len += 1;
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        (index < self.len).then(|| &self.slots[self.slot(index)])
    }

    /// Swaps the entry at `index` with its newer neighbour.
    ///
    /// Returns `false` (and does nothing) for index 0 or a dead index.
    pub(crate) fn promote(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.len {
            return false;
        }
        let a = self.slot(index);
        let b = self.slot(index - 1);
        self.slots.swap(a, b);
        true
    }

    /// Live entries from newest to oldest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).map(move |index| &self.slots[self.slot(index)])
    }

    fn slot(&self, index: usize) -> usize {
        let capacity = self.slots.len();
        (self.head + capacity - index % capacity) % capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize, limit: usize) -> RingBuffer<u32> {
        RingBuffer::try_new(capacity, limit).unwrap()
    }

    #[test]
    fn newest_is_index_zero() {
        let mut buf = ring(4, 4);
        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.get(0), Some(&3));
        assert_eq!(buf.get(2), Some(&1));
        assert_eq!(buf.get(3), None);
    }

    #[test]
    fn limit_evicts_oldest() {
        let mut buf = ring(8, 6);
        for value in 0..10 {
            buf.push(value);
        }
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.capacity(), 8);
        let live: Vec<u32> = buf.iter().copied().collect();
        assert_eq!(live, vec![9, 8, 7, 6, 5, 4]);
    }

    #[test]
    fn promote_swaps_with_newer_neighbour() {
        let mut buf = ring(4, 4);
        for value in [10, 20, 30] {
            buf.push(value);
        }
        assert!(buf.promote(2));
        let live: Vec<u32> = buf.iter().copied().collect();
        assert_eq!(live, vec![30, 10, 20]);
    }

    #[test]
    fn promote_rejects_front_and_dead_indices() {
        let mut buf = ring(4, 4);
        buf.push(1);
        buf.push(2);
        assert!(!buf.promote(0));
        assert!(!buf.promote(2));
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn wraps_across_slot_boundary() {
        let mut buf = ring(3, 3);
        for value in 0..7 {
            buf.push(value);
        }
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![6, 5, 4]);
        assert!(buf.promote(1));
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![5, 6, 4]);
    }
}
