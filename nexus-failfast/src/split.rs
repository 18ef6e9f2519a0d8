//! Split-capable traversal.
//!
//! A [`Split`] walks a range of elements and can hand off a prefix of its
//! remaining range as an independent traversal. Index-addressed sequences
//! split at the midpoint ([`IndexSplitter`]). The linked list splits off
//! materialized [`Batch`]es.
//!
//! Draining the prefix returned by `try_split` before the remainder visits
//! the elements in their original order.

use core::fmt;
use core::marker::PhantomData;
use std::collections::VecDeque;

use crate::{Epoch, Result, Sequence};

/// A traversal that can partition its remaining elements.
pub trait Split<T>: Sized {
    /// Type of the prefix handed off by [`try_split`](Split::try_split).
    type Prefix: Split<T>;

    /// Splits off a prefix of the remaining range.
    ///
    /// On success `self` keeps the suffix. Returns `None` when the range is
    /// too small to split.
    fn try_split(&mut self) -> Result<Option<Self::Prefix>>;

    /// Passes the next element to `action`.
    ///
    /// Returns `false` once the range is exhausted.
    fn try_advance<F: FnOnce(T)>(&mut self, action: F) -> Result<bool>;

    /// Passes every remaining element to `action`, in order.
    fn for_each_remaining<F: FnMut(T)>(&mut self, action: F) -> Result<()>;

    /// Number of elements left. Exact for index and batch splitters.
    fn estimate_size(&mut self) -> Result<usize>;
}

// =============================================================================
// IndexSplitter
// =============================================================================

/// Midpoint-splitting traversal over any [`Sequence`].
///
/// The end of the range and the expected epoch are bound on first use, so a
/// splitter created before the sequence is filled still sees every element.
/// Each half validates the shared epoch on its own.
///
/// # Example
///
/// ```
/// use nexus_failfast::{ArrayList, Split};
///
/// let list: ArrayList<u32> = (0..8).collect();
/// let mut back = list.splitter();
/// let mut front = back.try_split().unwrap().unwrap();
///
/// let mut seen = Vec::new();
/// front.for_each_remaining(|v| seen.push(v)).unwrap();
/// assert_eq!(seen, [0, 1, 2, 3]);
/// assert_eq!(back.estimate_size(), Ok(4));
/// ```
pub struct IndexSplitter<T: Clone, P: Sequence<T>> {
    seq: P,
    index: usize,
    hint: P::Cursor,
    /// Exclusive end, `None` until bound.
    fence: Option<usize>,
    expected: Epoch,
    _marker: PhantomData<T>,
}

impl<T: Clone, P: Sequence<T>> IndexSplitter<T, P> {
    pub(crate) fn new(seq: P) -> Self {
        Self {
            seq,
            index: 0,
            hint: Default::default(),
            fence: None,
            expected: Epoch::ZERO,
            _marker: PhantomData,
        }
    }

    /// Returns the fence, binding it and the epoch on first call.
    fn fence(&mut self) -> Result<usize> {
        match self.fence {
            Some(fence) => Ok(fence),
            None => {
                let fence = self.seq.size()?;
                self.expected = self.seq.epoch();
                self.fence = Some(fence);
                Ok(fence)
            }
        }
    }

    #[inline]
    fn check(&self) -> Result<()> {
        self.expected.expect(self.seq.epoch())
    }
}

impl<T: Clone, P: Sequence<T>> Split<T> for IndexSplitter<T, P> {
    type Prefix = Self;

    fn try_split(&mut self) -> Result<Option<Self>> {
        let hi = self.fence()?;
        let lo = self.index;
        let mid = lo + (hi - lo) / 2;
        if lo >= mid {
            return Ok(None);
        }

        self.index = mid;
        Ok(Some(Self {
            seq: self.seq.share(),
            index: lo,
            hint: Default::default(),
            fence: Some(mid),
            expected: self.expected,
            _marker: PhantomData,
        }))
    }

    fn try_advance<F: FnOnce(T)>(&mut self, action: F) -> Result<bool> {
        let hi = self.fence()?;
        if self.index >= hi {
            return Ok(false);
        }

        self.check()?;
        let value = self.seq.get_with(self.index, &mut self.hint)?;
        self.index += 1;
        action(value);
        self.check()?;
        Ok(true)
    }

    fn for_each_remaining<F: FnMut(T)>(&mut self, mut action: F) -> Result<()> {
        let hi = self.fence()?;
        while self.index < hi {
            self.check()?;
            let value = self.seq.get_with(self.index, &mut self.hint)?;
            self.index += 1;
            action(value);
        }
        self.check()
    }

    fn estimate_size(&mut self) -> Result<usize> {
        Ok(self.fence()? - self.index)
    }
}

impl<T: Clone, P: Sequence<T>> fmt::Debug for IndexSplitter<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSplitter")
            .field("index", &self.index)
            .field("fence", &self.fence)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Batch
// =============================================================================

/// An owned run of elements split off a linked traversal.
///
/// A batch holds copies, so it never observes the source list again. It
/// splits by halving.
#[derive(Clone, Debug)]
pub struct Batch<T> {
    items: VecDeque<T>,
}

impl<T> Batch<T> {
    pub(crate) fn new(items: VecDeque<T>) -> Self {
        Self { items }
    }

    /// Returns the number of elements left.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the batch is exhausted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Split<T> for Batch<T> {
    type Prefix = Self;

    fn try_split(&mut self) -> Result<Option<Self>> {
        let len = self.items.len();
        if len < 2 {
            return Ok(None);
        }
        let suffix = self.items.split_off(len / 2);
        let prefix = core::mem::replace(&mut self.items, suffix);
        Ok(Some(Self::new(prefix)))
    }

    fn try_advance<F: FnOnce(T)>(&mut self, action: F) -> Result<bool> {
        match self.items.pop_front() {
            Some(value) => {
                action(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn for_each_remaining<F: FnMut(T)>(&mut self, action: F) -> Result<()> {
        self.items.drain(..).for_each(action);
        Ok(())
    }

    fn estimate_size(&mut self) -> Result<usize> {
        Ok(self.items.len())
    }
}

impl<T> Iterator for Batch<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.items.len(), Some(self.items.len()))
    }
}
