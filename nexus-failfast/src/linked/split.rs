//! Batching splitter for the linked list.
//!
//! A linked list cannot jump to its midpoint, so splitting walks a prefix of
//! the remaining nodes and copies it into a [`Batch`]. Each split grows the
//! batch by [`BATCH_UNIT`] up to [`MAX_BATCH`], which keeps the per-split
//! walk amortized. Sequential traversal walks links directly and never
//! builds a batch.

use std::collections::VecDeque;

use tracing::trace;

use crate::{Batch, Epoch, Key, Result, Split, Storage};

use super::{LinkedList, ListNode};

/// Growth step of the batch size.
pub const BATCH_UNIT: usize = 1 << 10;

/// Largest batch handed out by one split.
pub const MAX_BATCH: usize = 1 << 25;

/// Split traversal over a [`LinkedList`].
///
/// The starting node, element count, and epoch are bound on first use.
///
/// # Example
///
/// ```
/// use nexus_failfast::{LinkedList, Split};
///
/// let list: LinkedList<u32> = (0..3000).collect();
/// let mut rest = list.splitter();
///
/// let mut first = rest.try_split().unwrap().unwrap();
/// assert_eq!(first.len(), 1024);
/// let second = rest.try_split().unwrap().unwrap();
/// assert_eq!(second.len(), 1976);
/// assert!(rest.try_split().unwrap().is_none());
///
/// let mut sum = 0;
/// first.for_each_remaining(|v| sum += v).unwrap();
/// assert_eq!(sum, (0..1024).sum::<u32>());
/// ```
pub struct NodeSplitter<T, S, K: Key>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    list: LinkedList<T, S, K>,
    /// Next node to visit, `NONE` when exhausted.
    current: K,
    /// Remaining elements, `None` until bound.
    est: Option<usize>,
    expected: Epoch,
    /// Size of the last batch handed out.
    batch: usize,
}

impl<T: Clone, S, K: Key> NodeSplitter<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    pub(super) fn new(list: LinkedList<T, S, K>) -> Self {
        Self {
            list,
            current: K::NONE,
            est: None,
            expected: Epoch::ZERO,
            batch: 0,
        }
    }

    fn bind(&mut self) -> usize {
        match self.est {
            Some(est) => est,
            None => {
                let store = self.list.read();
                self.current = store.head;
                self.expected = store.epoch;
                self.est = Some(store.len);
                store.len
            }
        }
    }

    #[inline]
    fn check(&self) -> Result<()> {
        self.expected.expect(self.list.epoch())
    }

    /// Copies the next element and steps past it.
    fn take(&mut self) -> Result<T> {
        self.check()?;
        let store = self.list.read();
        let node = store.node(self.current);
        self.current = node.next;
        self.est = self.est.map(|est| est - 1);
        Ok(node.data.clone())
    }
}

impl<T: Clone, S, K: Key> Split<T> for NodeSplitter<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Prefix = Batch<T>;

    fn try_split(&mut self) -> Result<Option<Batch<T>>> {
        let remaining = self.bind();
        if remaining <= 1 || self.current.is_none() {
            return Ok(None);
        }
        self.check()?;

        let n = (self.batch + BATCH_UNIT).min(remaining).min(MAX_BATCH);
        let mut items = VecDeque::with_capacity(n);
        {
            let store = self.list.read();
            let mut key = self.current;
            while items.len() < n && key.is_some() {
                let node = store.node(key);
                items.push_back(node.data.clone());
                key = node.next;
            }
            self.current = key;
        }

        self.batch = items.len();
        self.est = Some(remaining - items.len());
        trace!(batch = self.batch, remaining = remaining - self.batch, "split linked batch");
        Ok(Some(Batch::new(items)))
    }

    fn try_advance<F: FnOnce(T)>(&mut self, action: F) -> Result<bool> {
        if self.bind() == 0 || self.current.is_none() {
            return Ok(false);
        }
        let value = self.take()?;
        action(value);
        self.check()?;
        Ok(true)
    }

    fn for_each_remaining<F: FnMut(T)>(&mut self, mut action: F) -> Result<()> {
        self.bind();
        while self.est.is_some_and(|est| est > 0) && self.current.is_some() {
            let value = self.take()?;
            action(value);
        }
        self.check()
    }

    fn estimate_size(&mut self) -> Result<usize> {
        Ok(self.bind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn drain<S: Split<u32>>(mut split: S, out: &mut Vec<u32>) -> Result<()> {
        if let Some(prefix) = split.try_split()? {
            drain(prefix, out)?;
            drain(split, out)
        } else {
            split.for_each_remaining(|v| out.push(v))
        }
    }

    #[test]
    fn small_list_splits_into_one_batch() {
        let list: LinkedList<u32> = (1..=100).collect();
        let mut out = Vec::new();
        drain(list.splitter(), &mut out).unwrap();
        assert_eq!(out, (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn batches_grow_by_unit() {
        let total = 10 * BATCH_UNIT;
        let list: LinkedList<u32> = (0..total as u32).collect();
        let mut rest = list.splitter();

        let mut sizes = Vec::new();
        let mut out = Vec::new();
        while let Some(mut batch) = rest.try_split().unwrap() {
            sizes.push(batch.len());
            batch.for_each_remaining(|v| out.push(v)).unwrap();
        }
        rest.for_each_remaining(|v| out.push(v)).unwrap();

        assert_eq!(sizes[0], BATCH_UNIT);
        assert_eq!(sizes[1], 2 * BATCH_UNIT);
        assert_eq!(sizes[2], 3 * BATCH_UNIT);
        assert_eq!(sizes.iter().sum::<usize>(), total);
        assert_eq!(out, (0..total as u32).collect::<Vec<_>>());
    }

    #[test]
    fn estimate_tracks_consumption() {
        let list: LinkedList<u32> = (0..5).collect();
        let mut split = list.splitter();
        assert_eq!(split.estimate_size(), Ok(5));
        assert_eq!(split.try_advance(|_| {}), Ok(true));
        assert_eq!(split.estimate_size(), Ok(4));

        let batch = split.try_split().unwrap().unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(split.estimate_size(), Ok(0));
        assert_eq!(split.try_advance(|_| {}), Ok(false));
    }

    #[test]
    fn single_element_does_not_split() {
        let list: LinkedList<u32> = [7].into_iter().collect();
        let mut split = list.splitter();
        assert!(split.try_split().unwrap().is_none());

        let mut seen = None;
        assert_eq!(split.try_advance(|v| seen = Some(v)), Ok(true));
        assert_eq!(seen, Some(7));
    }

    #[test]
    fn binds_lazily() {
        let mut list: LinkedList<u32> = LinkedList::new();
        let mut split = list.splitter();
        list.add_all([1, 2, 3]).unwrap();

        let mut out = Vec::new();
        split.for_each_remaining(|v| out.push(v)).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn stale_splitter_fails() {
        let mut list: LinkedList<u32> = (0..10).collect();
        let mut split = list.splitter();
        assert_eq!(split.try_advance(|_| {}), Ok(true));

        list.pop_back().unwrap();
        assert_eq!(split.try_advance(|_| {}), Err(Error::ConcurrentModification));
        assert_eq!(split.try_split().err(), Some(Error::ConcurrentModification));
        assert_eq!(
            split.for_each_remaining(|_| {}),
            Err(Error::ConcurrentModification)
        );
    }

    #[test]
    fn batch_survives_list_mutation() {
        let mut list: LinkedList<u32> = (0..4).collect();
        let mut split = list.splitter();
        let mut batch = split.try_split().unwrap().unwrap();

        list.clear().unwrap();
        let mut out = Vec::new();
        batch.for_each_remaining(|v| out.push(v)).unwrap();
        assert_eq!(out, [0, 1, 2, 3]);
    }
}
