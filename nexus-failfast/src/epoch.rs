//! Modification epochs.
//!
//! Every container owns one [`Epoch`] and bumps it on each structural
//! mutation (insert, remove, clear, sort, reallocation). Iterators, views,
//! and splitters copy the epoch when they bind to a container and compare it
//! against the live value before each use. A mismatch means the handle is
//! stale and the operation fails with [`Error::ConcurrentModification`].
//!
//! The check is best-effort misuse detection for a single writer. It is not
//! a synchronization mechanism.

use core::fmt;

use tracing::debug;

use crate::{Error, Result};

/// Monotonic structural-modification counter.
///
/// # Example
///
/// ```
/// use nexus_failfast::ArrayList;
///
/// let mut list: ArrayList<u32> = [1, 2, 3, 4].into_iter().collect();
/// let before = list.epoch();
///
/// list.set(0, 9).unwrap(); // value replacement, not structural
/// assert_eq!(list.epoch(), before);
///
/// list.remove_if(|v| v % 2 == 0).unwrap(); // one batch, one bump
/// assert_eq!(list.epoch().get(), before.get() + 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    /// Epoch of a freshly constructed container.
    pub const ZERO: Self = Self(0);

    /// Returns the raw counter value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Records one structural mutation.
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Fails unless `live` still equals this captured epoch.
    #[inline]
    pub(crate) fn expect(self, live: Epoch) -> Result<()> {
        if self == live {
            Ok(())
        } else {
            debug!(
                expected = self.0,
                found = live.0,
                "rejecting stale collection handle"
            );
            Err(Error::ConcurrentModification)
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}
