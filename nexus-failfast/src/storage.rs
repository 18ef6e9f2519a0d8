//! Node arena trait for the linked container.
//!
//! The linked list never owns nodes through pointers. Nodes live in an arena
//! that hands out stable keys, and the list stores `prev`/`next` as keys.
//! Forward and backward links are therefore plain data, with no cyclic
//! ownership between neighbours.

use crate::Key;

/// Growable slab-like storage with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
/// - **Checked `get`**: returns `None` for a vacant or unknown key; the
///   list uses it to verify links in debug builds
/// - **Slot reuse**: removed slots can be reused by future inserts
///
/// # Implementations
///
/// - `slab::Slab<T>` - growable, heap allocated, `usize` keys
///
/// Any arena with a narrower [`Key`] (such as `u32`) works too, halving
/// the size of each node's links.
pub trait Storage<T> {
    /// Key type for this storage.
    type Key: Key;

    /// Creates storage with room for at least `capacity` values.
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Inserts a value, returning its stable key.
    fn insert(&mut self, value: T) -> Self::Key;

    /// Removes and returns the value at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a reference without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked(&self, key: Self::Key) -> &T;

    /// Returns a mutable reference without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked_mut(&mut self, key: Self::Key) -> &mut T;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slot is occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        slab::Slab::with_capacity(capacity)
    }

    #[inline]
    fn insert(&mut self, value: T) -> usize {
        self.insert(value)
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        self.get(key)
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: usize) -> &T {
        unsafe { slab::Slab::get_unchecked(self, key) }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: usize) -> &mut T {
        unsafe { slab::Slab::get_unchecked_mut(self, key) }
    }

    #[inline]
    fn len(&self) -> usize {
        slab::Slab::len(self)
    }
}
