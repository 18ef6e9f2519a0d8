//! Contiguous element buffer with explicit capacity control.
//!
//! `RawArray` owns a boxed slice of `MaybeUninit<T>` slots. Slots `[0, len)`
//! are initialized, slots `[len, capacity)` are not. Capacity only changes
//! through [`RawArray::reallocate`], so the growth policy lives entirely in
//! the caller.

use core::mem::{self, MaybeUninit};
use core::ptr;
use core::slice;

pub(crate) struct RawArray<T> {
    buf: Box<[MaybeUninit<T>]>,
    len: usize,
}

impl<T> RawArray<T> {
    /// Creates an empty buffer without allocating.
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty buffer with exactly `capacity` slots.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Box::new_uninit_slice(capacity),
            len: 0,
        }
    }

    /// Moves `values` into a buffer whose capacity equals their count.
    pub(crate) fn from_vec(values: Vec<T>) -> Self {
        let mut raw = Self::with_capacity(values.len());
        raw.insert_from(0, values);
        raw
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn base(&mut self) -> *mut T {
        self.buf.as_mut_ptr().cast::<T>()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        // Safety: [0, len) is initialized
        unsafe { slice::from_raw_parts(self.buf.as_ptr().cast::<T>(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // Safety: [0, len) is initialized
        unsafe { slice::from_raw_parts_mut(self.base(), len) }
    }

    /// Moves the live elements into a fresh buffer of `capacity` slots.
    pub(crate) fn reallocate(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len);

        let mut buf = Box::<[T]>::new_uninit_slice(capacity);
        // Safety: both buffers hold at least `len` slots and are distinct
        // allocations. The old box is freed without dropping the moved values.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.as_ptr(), buf.as_mut_ptr(), self.len);
        }
        self.buf = buf;
    }

    /// Replaces the element at `index`, returning the old value.
    #[inline]
    pub(crate) fn replace(&mut self, index: usize, value: T) -> T {
        mem::replace(&mut self.as_mut_slice()[index], value)
    }

    /// Inserts at `index`, shifting the tail up one slot with a single move.
    ///
    /// Caller guarantees `index <= len < capacity`.
    pub(crate) fn insert(&mut self, index: usize, value: T) {
        debug_assert!(index <= self.len && self.len < self.capacity());

        let tail = self.len - index;
        // Safety: capacity has room for one more, [index, len) is initialized
        unsafe {
            let slot = self.base().add(index);
            ptr::copy(slot, slot.add(1), tail);
            slot.write(value);
        }
        self.len += 1;
    }

    /// Inserts every value at `index` in order with one tail move.
    ///
    /// Caller guarantees `index <= len` and `len + values.len() <= capacity`.
    pub(crate) fn insert_from(&mut self, index: usize, mut values: Vec<T>) {
        let count = values.len();
        debug_assert!(index <= self.len && self.len + count <= self.capacity());

        let tail = self.len - index;
        // Safety: room for `count` more, ownership of the values moves into
        // the buffer and the source vector forgets them
        unsafe {
            let slot = self.base().add(index);
            ptr::copy(slot, slot.add(count), tail);
            ptr::copy_nonoverlapping(values.as_ptr(), slot, count);
            values.set_len(0);
        }
        self.len += count;
    }

    /// Removes at `index`, shifting the tail down one slot with a single move.
    ///
    /// Caller guarantees `index < len`. The vacated last slot is left
    /// uninitialized, so nothing in it outlives the removal.
    pub(crate) fn remove(&mut self, index: usize) -> T {
        debug_assert!(index < self.len);

        let tail = self.len - index - 1;
        // Safety: index is initialized, the value is read out before the
        // tail overwrites its slot
        unsafe {
            let slot = self.base().add(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, tail);
            self.len -= 1;
            value
        }
    }

    /// Drops `[from, to)` and closes the gap with one tail move.
    ///
    /// Caller guarantees `from <= to <= len`.
    pub(crate) fn remove_range(&mut self, from: usize, to: usize) {
        debug_assert!(from <= to && to <= self.len);

        let old_len = self.len;
        // Leak rather than double-drop if an element destructor panics
        self.len = from;
        // Safety: [from, to) and [to, old_len) are initialized
        unsafe {
            let base = self.base();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(from), to - from));
            ptr::copy(base.add(to), base.add(from), old_len - to);
        }
        self.len = old_len - (to - from);
    }

    /// Drops every element at or past `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        self.len = len;
        // Safety: [len, len + tail) was initialized and is now outside the
        // live range
        unsafe {
            let base = self.base();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(len), tail));
        }
    }

    /// Drops every marked element and slides survivors left in one pass.
    pub(crate) fn compact(&mut self, marked: &Bitmap) {
        let old_len = self.len;
        self.len = 0;
        let mut kept = 0;
        // Safety: each initialized slot is either dropped once or moved once
        // to a lower, already vacated slot
        unsafe {
            let base = self.base();
            for index in 0..old_len {
                let src = base.add(index);
                if marked.contains(index) {
                    ptr::drop_in_place(src);
                } else {
                    if kept != index {
                        ptr::copy_nonoverlapping(src, base.add(kept), 1);
                    }
                    kept += 1;
                }
            }
        }
        self.len = kept;
    }

    /// Reorders the elements so slot `i` receives the element at `order[i]`.
    ///
    /// Caller guarantees `order` is a permutation of `[0, len)`.
    pub(crate) fn permute(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.len);

        let mut buf = Box::<[T]>::new_uninit_slice(self.capacity());
        // Safety: `order` names every initialized slot exactly once, so each
        // element is moved once into a distinct slot of the new buffer. The
        // old box is freed without dropping the moved values.
        unsafe {
            let src = self.buf.as_ptr();
            let dst = buf.as_mut_ptr();
            for (to, &from) in order.iter().enumerate() {
                ptr::copy_nonoverlapping(src.add(from), dst.add(to), 1);
            }
        }
        self.buf = buf;
    }
}

impl<T> Drop for RawArray<T> {
    fn drop(&mut self) {
        // Safety: [0, len) is initialized and dropped exactly once
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

// =============================================================================
// Bitmap - removal marks for batch operations
// =============================================================================

/// Fixed-size bit set over element positions.
pub(crate) struct Bitmap {
    words: Vec<u64>,
}

impl Bitmap {
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
        }
    }

    #[inline]
    pub(crate) fn insert(&mut self, index: usize) {
        self.words[index / 64] |= 1 << (index % 64);
    }

    #[inline]
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.words[index / 64] & (1 << (index % 64)) != 0
    }
}
