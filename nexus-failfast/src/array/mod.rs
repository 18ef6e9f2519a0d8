//! Growable array with fail-fast handles.
//!
//! [`ArrayList`] stores elements contiguously and grows geometrically
//! (`new = max(required, old + old / 2)`, clamped to a configured maximum),
//! giving amortized O(1) append. Positional insert and remove shift the tail
//! with one bulk move.
//!
//! The list is a handle to shared storage. Iterators, range views, and
//! splitters hold their own handle plus the epoch they were created at, so
//! the list stays mutable while they exist and they fail on their next use
//! once it changes underneath them.
//!
//! # Example
//!
//! ```
//! use nexus_failfast::{ArrayList, Error};
//!
//! let mut list: ArrayList<u32> = [1, 2, 3, 4, 5].into_iter().collect();
//!
//! // A view shares storage with the list
//! let mut view = list.subrange(1, 4).unwrap();
//! view.set(0, 9).unwrap();
//! assert_eq!(list.get(1), Ok(9));
//!
//! // A direct structural change invalidates the view
//! list.remove_at(0).unwrap();
//! assert_eq!(view.get(0), Err(Error::ConcurrentModification));
//! ```

mod raw;

use core::cell::{Ref, RefCell, RefMut};
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{check_element_index, check_position_index, check_range};
use crate::{Epoch, Error, IndexIter, IndexSplitter, Result, Sequence, SubList};

use raw::{Bitmap, RawArray};

/// Capacity of a lazily allocated list after its first insert.
pub const DEFAULT_CAPACITY: usize = 10;

/// Upper bound on element count regardless of element size.
const MAX_ARRAY_SIZE: usize = isize::MAX as usize - 8;

/// Largest capacity whose buffer fits the allocator's size limit for `T`.
fn allocation_limit<T>() -> usize {
    let elem = core::mem::size_of::<T>().max(1);
    MAX_ARRAY_SIZE.min(isize::MAX as usize / elem)
}

// =============================================================================
// Store
// =============================================================================

pub(crate) struct ArrayStore<T> {
    items: RawArray<T>,
    epoch: Epoch,
    max_capacity: usize,
    /// Still on the lazily allocated default buffer.
    lazy: bool,
}

impl<T> ArrayStore<T> {
    /// Grows so that `required` elements fit. Does not bump the epoch.
    fn ensure_capacity_internal(&mut self, required: usize) -> Result<()> {
        let required = if self.lazy {
            required.max(DEFAULT_CAPACITY.min(self.max_capacity))
        } else {
            required
        };
        if required > self.items.capacity() {
            self.grow(required)?;
        }
        Ok(())
    }

    fn grow(&mut self, required: usize) -> Result<()> {
        if required > self.max_capacity {
            return Err(Error::CapacityOverflow {
                requested: required,
                max: self.max_capacity,
            });
        }

        let old = self.items.capacity();
        let new = old
            .saturating_add(old / 2)
            .max(required)
            .min(self.max_capacity);

        trace!(old, new, len = self.items.len(), "growing array buffer");
        self.items.reallocate(new);
        self.lazy = false;
        Ok(())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ArrayList`].
///
/// # Example
///
/// ```
/// use nexus_failfast::{ArrayList, ArrayListBuilder, Error};
///
/// let mut list: ArrayList<u8> = ArrayListBuilder::default()
///     .capacity(2)
///     .max_capacity(3)
///     .build()
///     .unwrap();
///
/// list.add(1).unwrap();
/// list.add(2).unwrap();
/// list.add(3).unwrap(); // grows 2 -> 3 (clamped)
/// assert_eq!(list.capacity(), 3);
/// assert!(matches!(list.add(4), Err(Error::CapacityOverflow { .. })));
/// ```
pub struct ArrayListBuilder<T> {
    capacity: Option<usize>,
    max_capacity: Option<usize>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ArrayListBuilder<T> {
    fn default() -> Self {
        Self {
            capacity: None,
            max_capacity: None,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for ArrayListBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            max_capacity: self.max_capacity,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ArrayListBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayListBuilder")
            .field("capacity", &self.capacity)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

impl<T> ArrayListBuilder<T> {
    /// Allocate exactly this many slots up front.
    ///
    /// Without this call the buffer is allocated lazily on first insert,
    /// with room for [`DEFAULT_CAPACITY`] elements.
    pub fn capacity(mut self, slots: usize) -> Self {
        self.capacity = Some(slots);
        self
    }

    /// Ceiling for growth. Default: the allocation limit for `T`.
    pub fn max_capacity(mut self, slots: usize) -> Self {
        self.max_capacity = Some(slots);
        self
    }

    /// Builds an empty list.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the maximum is zero or above the
    /// allocation limit, or if the initial capacity exceeds the maximum.
    pub fn build(self) -> Result<ArrayList<T>> {
        let limit = allocation_limit::<T>();
        let max_capacity = self.max_capacity.unwrap_or(limit);

        if max_capacity == 0 {
            return Err(Error::InvalidArgument(
                "max capacity must be greater than zero".into(),
            ));
        }
        if max_capacity > limit {
            return Err(Error::InvalidArgument(format!(
                "max capacity {max_capacity} exceeds allocation limit {limit}"
            )));
        }

        let (items, lazy) = match self.capacity {
            Some(capacity) if capacity > max_capacity => {
                return Err(Error::InvalidArgument(format!(
                    "initial capacity {capacity} exceeds max capacity {max_capacity}"
                )));
            }
            Some(capacity) => (RawArray::with_capacity(capacity), false),
            None => (RawArray::new(), true),
        };

        Ok(ArrayList::from_store(ArrayStore {
            items,
            epoch: Epoch::ZERO,
            max_capacity,
            lazy,
        }))
    }
}

// =============================================================================
// ArrayList
// =============================================================================

/// A growable, contiguous list with fail-fast iterators and live views.
///
/// Reads through derived handles return clones, so most traversal APIs
/// need `T: Clone`. Structural operations work for any `T`.
pub struct ArrayList<T> {
    store: Rc<RefCell<ArrayStore<T>>>,
}

impl<T> ArrayList<T> {
    /// Creates an empty list whose buffer is allocated on first insert.
    pub fn new() -> Self {
        Self::from_store(ArrayStore {
            items: RawArray::new(),
            epoch: Epoch::ZERO,
            max_capacity: allocation_limit::<T>(),
            lazy: true,
        })
    }

    /// Creates an empty list with exactly `capacity` slots allocated.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `capacity` exceeds the allocation limit.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        ArrayListBuilder::default().capacity(capacity).build()
    }

    /// Returns a builder for custom capacity settings.
    pub fn builder() -> ArrayListBuilder<T> {
        ArrayListBuilder::default()
    }

    fn from_store(store: ArrayStore<T>) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    #[inline]
    fn read(&self) -> Ref<'_, ArrayStore<T>> {
        self.store.borrow()
    }

    /// Borrows the store for a structural change.
    ///
    /// Fails instead of panicking when a traversal callback (a `remove_if`
    /// predicate, a `for_each` action) tries to mutate the storage it is
    /// being called from.
    fn write(&self) -> Result<RefMut<'_, ArrayStore<T>>> {
        self.store.try_borrow_mut().map_err(|_| {
            debug!("structural change attempted during traversal");
            Error::ConcurrentModification
        })
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    /// Returns `true` if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of allocated slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.read().items.capacity()
    }

    /// Returns the configured growth ceiling.
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.read().max_capacity
    }

    /// Returns the current modification epoch.
    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.read().epoch
    }

    // ========================================================================
    // Capacity
    // ========================================================================

    /// Shrinks capacity to the current length.
    pub fn trim_to_size(&mut self) -> Result<()> {
        let mut store = self.write()?;
        let len = store.items.len();
        if len < store.items.capacity() {
            trace!(old = store.items.capacity(), new = len, "trimming array buffer");
            store.items.reallocate(len);
            store.lazy = false;
            store.epoch.bump();
        }
        Ok(())
    }

    /// Grows capacity so at least `min_capacity` elements fit.
    ///
    /// A request at or below the current capacity is a no-op. On a lazily
    /// allocated list, requests up to [`DEFAULT_CAPACITY`] are deferred to
    /// the first insert.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityOverflow`] if `min_capacity` exceeds the maximum.
    pub fn ensure_capacity(&mut self, min_capacity: usize) -> Result<()> {
        let mut store = self.write()?;
        let floor = if store.lazy { DEFAULT_CAPACITY } else { 0 };
        if min_capacity > floor && min_capacity > store.items.capacity() {
            store.grow(min_capacity)?;
            store.epoch.bump();
        }
        Ok(())
    }

    // ========================================================================
    // Positional writes
    // ========================================================================

    /// Replaces the element at `index`, returning the old value.
    ///
    /// Not a structural change: outstanding handles stay valid.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] when called through another handle
    /// from inside a [`for_each`](Self::for_each) action or a
    /// [`remove_if`](Self::remove_if) predicate, which hold the storage
    /// shared for the whole pass.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let mut store = self.write()?;
        check_element_index(index, store.items.len())?;
        Ok(store.items.replace(index, value))
    }

    /// Appends `value` to the end.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityOverflow`] if the list is at its maximum capacity.
    pub fn add(&mut self, value: T) -> Result<()> {
        let mut store = self.write()?;
        let len = store.items.len();
        store.ensure_capacity_internal(len + 1)?;
        store.items.insert(len, value);
        store.epoch.bump();
        Ok(())
    }

    /// Inserts `value` at `index`, shifting later elements up.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] unless `index <= len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let mut store = self.write()?;
        let len = store.items.len();
        check_position_index(index, len)?;
        store.ensure_capacity_internal(len + 1)?;
        store.items.insert(index, value);
        store.epoch.bump();
        Ok(())
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let mut store = self.write()?;
        check_element_index(index, store.items.len())?;
        let value = store.items.remove(index);
        store.epoch.bump();
        Ok(value)
    }

    /// Removes every element.
    pub fn clear(&mut self) -> Result<()> {
        let mut store = self.write()?;
        store.items.truncate(0);
        store.epoch.bump();
        Ok(())
    }

    /// Appends every value from `values` in order.
    ///
    /// Grows at most once and bumps the epoch once. Returns `true` if
    /// anything was added.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> Result<bool> {
        let len = self.len();
        self.insert_all(len, values)
    }

    /// Inserts every value from `values` at `index`, preserving their order.
    ///
    /// Returns `true` if anything was inserted.
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool> {
        check_position_index(index, self.len())?;
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(false);
        }

        let mut store = self.write()?;
        let len = store.items.len();
        // The source iterator may have touched the list
        check_position_index(index, len)?;
        let required = len.checked_add(values.len()).ok_or(Error::CapacityOverflow {
            requested: usize::MAX,
            max: store.max_capacity,
        })?;
        store.ensure_capacity_internal(required)?;
        store.items.insert_from(index, values);
        store.epoch.bump();
        Ok(true)
    }

    /// Removes `[from, to)` with one bulk move.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        let mut store = self.write()?;
        check_range(from, to, store.items.len())?;
        if from < to {
            store.items.remove_range(from, to);
            store.epoch.bump();
        }
        Ok(())
    }

    // ========================================================================
    // Batch operations
    // ========================================================================

    /// Removes every element matching `filter`.
    ///
    /// The predicate runs once per element, in order, before anything moves.
    /// Survivors are then compacted in one forward pass and the epoch is
    /// bumped exactly once. Returns `true` if anything was removed.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] if the list was structurally
    /// modified while the predicate ran. The list is left unchanged.
    ///
    /// The predicate sees the storage shared, so a `set` it makes through
    /// another handle fails with [`Error::ConcurrentModification`] too.
    pub fn remove_if<F>(&mut self, mut filter: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        let (expected, marked) = {
            let store = self.read();
            let len = store.items.len();
            let mut marked: Option<Bitmap> = None;
            for (index, item) in store.items.as_slice().iter().enumerate() {
                if filter(item) {
                    marked.get_or_insert_with(|| Bitmap::with_len(len)).insert(index);
                }
            }
            (store.epoch, marked)
        };

        let mut store = self.write()?;
        expected.expect(store.epoch)?;

        // Nothing matched: no bitmap was ever allocated, nothing moves
        let Some(marked) = marked else {
            return Ok(false);
        };
        store.items.compact(&marked);
        store.epoch.bump();
        Ok(true)
    }

    /// Removes every element contained in `other`.
    pub fn remove_all(&mut self, other: &[T]) -> Result<bool>
    where
        T: PartialEq,
    {
        self.remove_if(|item| other.contains(item))
    }

    /// Keeps only elements contained in `other`.
    pub fn retain_all(&mut self, other: &[T]) -> Result<bool>
    where
        T: PartialEq,
    {
        self.remove_if(|item| !other.contains(item))
    }

    /// Replaces every element with `op(&element)`.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] if the list was structurally
    /// modified during the pass. Elements already replaced stay replaced.
    ///
    /// `op` sees the storage shared, so a `set` it makes through another
    /// handle fails with [`Error::ConcurrentModification`].
    pub fn replace_all<F>(&mut self, mut op: F) -> Result<()>
    where
        F: FnMut(&T) -> T,
    {
        let (expected, len) = {
            let store = self.read();
            (store.epoch, store.items.len())
        };

        for index in 0..len {
            let next = {
                let store = self.read();
                expected.expect(store.epoch)?;
                op(&store.items.as_slice()[index])
            };
            let mut store = self.write()?;
            expected.expect(store.epoch)?;
            store.items.replace(index, next);
        }

        let mut store = self.write()?;
        expected.expect(store.epoch)?;
        store.epoch.bump();
        Ok(())
    }

    /// Sorts with `compare`, stable.
    ///
    /// The comparator runs while the storage is only shared, so it may read
    /// the list through any handle. The elements move once, after every
    /// comparison is done.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] if the list was structurally
    /// modified while the comparator ran. The list is left unchanged.
    pub fn sort_by<F>(&mut self, mut compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let (expected, order) = {
            let store = self.read();
            let items = store.items.as_slice();
            let mut order: Vec<usize> = (0..items.len()).collect();
            order.sort_by(|&a, &b| compare(&items[a], &items[b]));
            (store.epoch, order)
        };

        let mut store = self.write()?;
        expected.expect(store.epoch)?;
        store.items.permute(&order);
        store.epoch.bump();
        Ok(())
    }

    /// Sorts in ascending order, stable.
    pub fn sort(&mut self) -> Result<()>
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    /// Calls `action` on every element in order.
    ///
    /// Writes attempted from inside `action` through a view or another
    /// handle fail with [`Error::ConcurrentModification`]. That includes
    /// non-structural `set` calls: the storage stays shared for the whole
    /// pass.
    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(&T),
    {
        self.read().items.as_slice().iter().for_each(action);
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Returns `true` if some element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Position of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.read().items.as_slice().iter().position(|item| item == value)
    }

    /// Position of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.read().items.as_slice().iter().rposition(|item| item == value)
    }

    /// Removes the first element equal to `value`.
    ///
    /// Returns `true` if an element was removed.
    pub fn remove_item(&mut self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        let Some(index) = self.index_of(value) else {
            return Ok(false);
        };
        self.remove_at(index)?;
        Ok(true)
    }
}

impl<T: Clone> ArrayList<T> {
    /// Returns a clone of the element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        let store = self.read();
        check_element_index(index, store.items.len())?;
        Ok(store.items.as_slice()[index].clone())
    }

    /// Copies the elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.read().items.as_slice().to_vec()
    }

    /// Returns a fail-fast iterator from the front.
    pub fn iter(&self) -> IndexIter<T, Self> {
        IndexIter::new(self.share(), 0)
    }

    /// Returns a bidirectional fail-fast iterator starting before `index`.
    pub fn list_iter(&self, index: usize) -> Result<IndexIter<T, Self>> {
        check_position_index(index, self.len())?;
        Ok(IndexIter::new(self.share(), index))
    }

    /// Returns a live view of `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `to > len`, [`Error::InvalidArgument`]
    /// if `from > to`.
    pub fn subrange(&self, from: usize, to: usize) -> Result<SubList<T, Self>> {
        SubList::new(self.share(), from, to)
    }

    /// Returns a splitter over every element.
    ///
    /// The range end and epoch bind on first use, not here.
    pub fn splitter(&self) -> IndexSplitter<T, Self> {
        IndexSplitter::new(self.share())
    }
}

impl<T: Clone> Sequence<T> for ArrayList<T> {
    type Cursor = ();

    #[inline]
    fn size(&self) -> Result<usize> {
        Ok(self.len())
    }

    #[inline]
    fn epoch(&self) -> Epoch {
        ArrayList::epoch(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        ArrayList::get(self, index)
    }

    #[inline]
    fn get_with(&self, index: usize, _: &mut ()) -> Result<T> {
        ArrayList::get(self, index)
    }

    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<T> {
        ArrayList::set(self, index, value)
    }

    #[inline]
    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        ArrayList::insert(self, index, value)
    }

    #[inline]
    fn remove_at(&mut self, index: usize) -> Result<T> {
        ArrayList::remove_at(self, index)
    }

    #[inline]
    fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool> {
        ArrayList::insert_all(self, index, values)
    }

    #[inline]
    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        ArrayList::remove_range(self, from, to)
    }

    #[inline]
    fn share(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
        }
    }
}

impl<T> Default for ArrayList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with capacity trimmed to length and a fresh epoch.
impl<T: Clone> Clone for ArrayList<T> {
    fn clone(&self) -> Self {
        let store = self.read();
        Self::from_store(ArrayStore {
            items: RawArray::from_vec(store.items.as_slice().to_vec()),
            epoch: Epoch::ZERO,
            max_capacity: store.max_capacity,
            lazy: false,
        })
    }
}

impl<T> FromIterator<T> for ArrayList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let values: Vec<T> = iter.into_iter().collect();
        Self::from_store(ArrayStore {
            items: RawArray::from_vec(values),
            epoch: Epoch::ZERO,
            max_capacity: allocation_limit::<T>(),
            lazy: false,
        })
    }
}

impl<T: PartialEq> PartialEq for ArrayList<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
            || self.read().items.as_slice() == other.read().items.as_slice()
    }
}

impl<T: Eq> Eq for ArrayList<T> {}

impl<T: fmt::Debug> fmt::Debug for ArrayList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().items.as_slice()).finish()
    }
}
