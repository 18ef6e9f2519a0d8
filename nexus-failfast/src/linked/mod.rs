//! Doubly linked list with fail-fast handles.
//!
//! Nodes live in a keyed arena (any [`Storage`], `slab::Slab` by default)
//! and refer to their neighbours by key. The list tracks head, tail, length,
//! and a modification [`Epoch`].
//!
//! Positional access walks from whichever end is nearer, so `get(i)` costs
//! `O(min(i, len - i))`. Index iterators, views, and splitters carry a
//! [`NodeHint`] between reads, so stepping through a view costs O(1) per
//! element. Deque operations at either end are O(1).
//!
//! # Example
//!
//! ```
//! use nexus_failfast::LinkedList;
//!
//! let mut list: LinkedList<u32> = LinkedList::new();
//! list.push_front(1).unwrap();
//! list.push_front(2).unwrap();
//! list.push_back(3).unwrap();
//!
//! assert_eq!(list.pop_front(), Ok(Some(2)));
//! assert_eq!(list.pop_front(), Ok(Some(1)));
//! assert_eq!(list.pop_front(), Ok(Some(3)));
//! assert_eq!(list.pop_front(), Ok(None));
//! ```
//!
//! # Custom storage
//!
//! ```
//! use nexus_failfast::{LinkedList, ListNode};
//!
//! let storage: slab::Slab<ListNode<&str>> = slab::Slab::with_capacity(64);
//! let mut list = LinkedList::with_storage(storage).unwrap();
//! list.add("a").unwrap();
//! assert_eq!(list.first(), Ok("a"));
//! ```

mod iter;
mod split;

pub use iter::{Descending, NodeIter};
pub use split::{BATCH_UNIT, MAX_BATCH, NodeSplitter};

use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use core::marker::PhantomData;
use std::rc::Rc;

use tracing::debug;

use crate::error::{check_element_index, check_position_index, check_range};
use crate::{Epoch, Error, Key, Result, Sequence, Storage, SubList};

/// Default node arena for [`LinkedList`].
pub type SlabListStorage<T> = slab::Slab<ListNode<T, usize>>;

/// A node in the linked list.
///
/// Wraps one element with its neighbour keys. Only visible so that custom
/// [`Storage`] implementations can name it.
#[derive(Debug)]
pub struct ListNode<T, K: Key = usize> {
    pub(crate) data: T,
    pub(crate) prev: K,
    pub(crate) next: K,
}

impl<T, K: Key> ListNode<T, K> {
    #[inline]
    fn new(data: T, prev: K, next: K) -> Self {
        Self { data, prev, next }
    }
}

/// Last node reached by a positional read on a [`LinkedList`].
///
/// Carried between [`Sequence::get_with`] calls so index iterators and
/// views over a linked list walk from their previous position. Only valid
/// while the list's epoch is unchanged; a stale hint is discarded.
#[derive(Clone, Copy, Debug)]
pub struct NodeHint<K: Key = usize> {
    epoch: Epoch,
    index: usize,
    key: K,
}

// =============================================================================
// Store
// =============================================================================

/// Arena plus link bookkeeping.
///
/// The link primitives keep `head.prev == NONE`, `tail.next == NONE`, and
/// `node.next.prev == node` for every interior node. They never bump the
/// epoch; the public operation that calls them does, once.
pub(crate) struct LinkedStore<T, S, K: Key> {
    storage: S,
    head: K,
    tail: K,
    len: usize,
    epoch: Epoch,
    _marker: PhantomData<T>,
}

impl<T, S, K: Key> LinkedStore<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn with_storage(storage: S) -> Self {
        Self {
            storage,
            head: K::NONE,
            tail: K::NONE,
            len: 0,
            epoch: Epoch::ZERO,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn node(&self, key: K) -> &ListNode<T, K> {
        debug_assert!(key.is_some() && self.storage.get(key).is_some());
        // Safety: every key reachable from head or tail is occupied
        unsafe { self.storage.get_unchecked(key) }
    }

    #[inline]
    fn node_mut(&mut self, key: K) -> &mut ListNode<T, K> {
        debug_assert!(key.is_some() && self.storage.get(key).is_some());
        // Safety: every key reachable from head or tail is occupied
        unsafe { self.storage.get_unchecked_mut(key) }
    }

    /// Key of the node at `index`, walking from the nearer end.
    ///
    /// Caller guarantees `index < len`.
    fn key_at(&self, index: usize) -> K {
        debug_assert!(index < self.len);
        if index < self.len / 2 {
            let mut key = self.head;
            for _ in 0..index {
                key = self.node(key).next;
            }
            key
        } else {
            let mut key = self.tail;
            for _ in index + 1..self.len {
                key = self.node(key).prev;
            }
            key
        }
    }

    /// Key of the node at `index`, walking from `hint` when it is closer
    /// than either end.
    ///
    /// Caller guarantees `index < len`.
    fn key_near(&self, index: usize, hint: Option<NodeHint<K>>) -> K {
        let Some(hint) = hint.filter(|hint| hint.epoch == self.epoch) else {
            return self.key_at(index);
        };
        let from_end = index.min(self.len - 1 - index);
        if hint.index.abs_diff(index) >= from_end {
            return self.key_at(index);
        }

        let mut key = hint.key;
        if index > hint.index {
            for _ in hint.index..index {
                key = self.node(key).next;
            }
        } else {
            for _ in index..hint.index {
                key = self.node(key).prev;
            }
        }
        key
    }

    /// Key of the node `next` would return at `index`, or `NONE` at the end.
    fn successor_at(&self, index: usize) -> K {
        if index == self.len {
            K::NONE
        } else {
            self.key_at(index)
        }
    }

    fn link_first(&mut self, value: T) -> K {
        let head = self.head;
        let key = self.storage.insert(ListNode::new(value, K::NONE, head));
        if head.is_some() {
            self.node_mut(head).prev = key;
        } else {
            self.tail = key;
        }
        self.head = key;
        self.len += 1;
        key
    }

    fn link_last(&mut self, value: T) -> K {
        let tail = self.tail;
        let key = self.storage.insert(ListNode::new(value, tail, K::NONE));
        if tail.is_some() {
            self.node_mut(tail).next = key;
        } else {
            self.head = key;
        }
        self.tail = key;
        self.len += 1;
        key
    }

    /// Links `value` before `succ`, or at the back when `succ` is `NONE`.
    fn link_before(&mut self, value: T, succ: K) -> K {
        if succ.is_none() {
            return self.link_last(value);
        }

        let pred = self.node(succ).prev;
        let key = self.storage.insert(ListNode::new(value, pred, succ));
        self.node_mut(succ).prev = key;
        if pred.is_some() {
            self.node_mut(pred).next = key;
        } else {
            self.head = key;
        }
        self.len += 1;
        key
    }

    /// Links every value, in order, before `succ` (or at the back).
    fn splice_before(&mut self, values: Vec<T>, succ: K) {
        let count = values.len();
        if count == 0 {
            return;
        }

        let mut pred = if succ.is_none() {
            self.tail
        } else {
            self.node(succ).prev
        };
        for value in values {
            let key = self.storage.insert(ListNode::new(value, pred, K::NONE));
            if pred.is_some() {
                self.node_mut(pred).next = key;
            } else {
                self.head = key;
            }
            pred = key;
        }

        if succ.is_none() {
            self.tail = pred;
        } else {
            self.node_mut(pred).next = succ;
            self.node_mut(succ).prev = pred;
        }
        self.len += count;
    }

    /// Detaches the node at `key`, frees its slot, and returns its element.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not occupied, which would mean the links are
    /// corrupt.
    fn unlink(&mut self, key: K) -> T {
        let ListNode { data, prev, next } = self
            .storage
            .remove(key)
            .expect("linked key missing from storage");

        if prev.is_some() {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }
        if next.is_some() {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
        self.len -= 1;
        data
    }

    fn clear(&mut self) {
        let mut key = self.head;
        while key.is_some() {
            let next = self.node(key).next;
            self.storage.remove(key);
            key = next;
        }
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }

    fn values(&self) -> Values<'_, T, S, K> {
        Values {
            store: self,
            front: self.head,
            back: self.tail,
        }
    }

    fn find(&self, value: &T) -> K
    where
        T: PartialEq,
    {
        let mut key = self.head;
        while key.is_some() {
            let node = self.node(key);
            if node.data == *value {
                return key;
            }
            key = node.next;
        }
        K::NONE
    }

    fn rfind(&self, value: &T) -> K
    where
        T: PartialEq,
    {
        let mut key = self.tail;
        while key.is_some() {
            let node = self.node(key);
            if node.data == *value {
                return key;
            }
            key = node.prev;
        }
        K::NONE
    }
}

/// Borrowing walk over the elements, either direction.
struct Values<'a, T, S, K: Key> {
    store: &'a LinkedStore<T, S, K>,
    front: K,
    back: K,
}

impl<'a, T, S, K: Key> Iterator for Values<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front.is_none() {
            return None;
        }

        let node = self.store.node(self.front);
        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.next;
        }
        Some(&node.data)
    }
}

impl<'a, T, S, K: Key> DoubleEndedIterator for Values<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.back.is_none() {
            return None;
        }

        let node = self.store.node(self.back);
        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = node.prev;
        }
        Some(&node.data)
    }
}

// =============================================================================
// LinkedList
// =============================================================================

/// A doubly linked list and deque over a keyed node arena.
///
/// Like [`ArrayList`](crate::ArrayList), this is a handle to shared storage:
/// iterators, views, and splitters keep their own handle and fail with
/// [`Error::ConcurrentModification`] once the list is structurally modified
/// behind them.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `S`: Node arena (default [`SlabListStorage<T>`])
/// - `K`: Key type of the arena (default `usize`)
pub struct LinkedList<T, S = SlabListStorage<T>, K: Key = usize>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    store: Rc<RefCell<LinkedStore<T, S, K>>>,
}

impl<T> LinkedList<T> {
    /// Creates an empty list over a `slab::Slab`.
    pub fn new() -> Self {
        Self::from_storage(slab::Slab::new())
    }

    /// Creates an empty list whose arena has room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(slab::Slab::with_capacity(capacity))
    }
}

impl<T, S, K: Key> LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    /// Creates an empty list over caller-provided storage.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `storage` already holds nodes.
    pub fn with_storage(storage: S) -> Result<Self> {
        if !storage.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "list storage must start empty, found {} nodes",
                storage.len()
            )));
        }
        Ok(Self::from_storage(storage))
    }

    fn from_storage(storage: S) -> Self {
        Self {
            store: Rc::new(RefCell::new(LinkedStore::with_storage(storage))),
        }
    }

    #[inline]
    fn read(&self) -> Ref<'_, LinkedStore<T, S, K>> {
        self.store.borrow()
    }

    fn write(&self) -> Result<RefMut<'_, LinkedStore<T, S, K>>> {
        self.store.try_borrow_mut().map_err(|_| {
            debug!("structural change attempted during traversal");
            Error::ConcurrentModification
        })
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the live modification epoch.
    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.read().epoch
    }

    // ========================================================================
    // Deque: insertion
    // ========================================================================

    /// Inserts `value` at the front.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        let mut store = self.write()?;
        store.link_first(value);
        store.epoch.bump();
        Ok(())
    }

    /// Appends `value` at the back.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        let mut store = self.write()?;
        store.link_last(value);
        store.epoch.bump();
        Ok(())
    }

    /// Stack push: same as [`push_front`](Self::push_front).
    #[inline]
    pub fn push(&mut self, value: T) -> Result<()> {
        self.push_front(value)
    }

    /// Appends `value` at the back.
    #[inline]
    pub fn add(&mut self, value: T) -> Result<()> {
        self.push_back(value)
    }

    /// Queue offer: same as [`add`](Self::add).
    #[inline]
    pub fn offer(&mut self, value: T) -> Result<()> {
        self.push_back(value)
    }

    // ========================================================================
    // Deque: removal
    // ========================================================================

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self) -> Result<Option<T>> {
        let mut store = self.write()?;
        let head = store.head;
        if head.is_none() {
            return Ok(None);
        }
        let value = store.unlink(head);
        store.epoch.bump();
        Ok(Some(value))
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Result<Option<T>> {
        let mut store = self.write()?;
        let tail = store.tail;
        if tail.is_none() {
            return Ok(None);
        }
        let value = store.unlink(tail);
        store.epoch.bump();
        Ok(Some(value))
    }

    /// Queue poll: same as [`pop_front`](Self::pop_front).
    #[inline]
    pub fn poll(&mut self) -> Result<Option<T>> {
        self.pop_front()
    }

    /// Removes and returns the first element.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] if the list is empty.
    pub fn remove_first(&mut self) -> Result<T> {
        self.pop_front()?.ok_or(Error::Empty)
    }

    /// Removes and returns the last element.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] if the list is empty.
    pub fn remove_last(&mut self) -> Result<T> {
        self.pop_back()?.ok_or(Error::Empty)
    }

    /// Stack pop: same as [`remove_first`](Self::remove_first).
    #[inline]
    pub fn pop(&mut self) -> Result<T> {
        self.remove_first()
    }

    /// Removes every element.
    pub fn clear(&mut self) -> Result<()> {
        let mut store = self.write()?;
        store.clear();
        store.epoch.bump();
        Ok(())
    }

    // ========================================================================
    // Positional
    // ========================================================================

    /// Replaces the element at `index`, returning the old value.
    ///
    /// Not a structural change: outstanding handles stay valid. Splitter
    /// actions run with the storage released, so they may call `set`
    /// through another handle.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let mut store = self.write()?;
        check_element_index(index, store.len)?;
        let key = store.key_at(index);
        Ok(core::mem::replace(&mut store.node_mut(key).data, value))
    }

    /// Inserts `value` at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] unless `index <= len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let mut store = self.write()?;
        check_position_index(index, store.len)?;
        let succ = store.successor_at(index);
        store.link_before(value, succ);
        store.epoch.bump();
        Ok(())
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let mut store = self.write()?;
        check_element_index(index, store.len)?;
        let key = store.key_at(index);
        let value = store.unlink(key);
        store.epoch.bump();
        Ok(value)
    }

    /// Appends every value in order. Returns `true` if anything was added.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> Result<bool> {
        let len = self.len();
        self.insert_all(len, values)
    }

    /// Inserts every value at `index`, preserving their order.
    ///
    /// Finds the insertion point once and bumps the epoch once.
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool> {
        check_position_index(index, self.len())?;
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(false);
        }

        let mut store = self.write()?;
        check_position_index(index, store.len)?;
        let succ = store.successor_at(index);
        store.splice_before(values, succ);
        store.epoch.bump();
        Ok(true)
    }

    /// Removes `[from, to)` with one walk and one epoch bump.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        let mut store = self.write()?;
        check_range(from, to, store.len)?;
        if from == to {
            return Ok(());
        }

        let mut key = store.key_at(from);
        for _ in from..to {
            let next = store.node(key).next;
            store.unlink(key);
            key = next;
        }
        store.epoch.bump();
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Returns `true` if some element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.read().find(value).is_some()
    }

    /// Position of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.read().values().position(|item| item == value)
    }

    /// Position of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let store = self.read();
        let from_back = store.values().rev().position(|item| item == value)?;
        Some(store.len - 1 - from_back)
    }

    /// Removes the first element equal to `value`.
    ///
    /// Returns `true` if an element was removed.
    pub fn remove_item(&mut self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        self.remove_first_occurrence(value)
    }

    /// Removes the first element equal to `value`.
    pub fn remove_first_occurrence(&mut self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        let mut store = self.write()?;
        let key = store.find(value);
        if key.is_none() {
            return Ok(false);
        }
        store.unlink(key);
        store.epoch.bump();
        Ok(true)
    }

    /// Removes the last element equal to `value`.
    pub fn remove_last_occurrence(&mut self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        let mut store = self.write()?;
        let key = store.rfind(value);
        if key.is_none() {
            return Ok(false);
        }
        store.unlink(key);
        store.epoch.bump();
        Ok(true)
    }
}

impl<T: Clone, S, K: Key> LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    /// Returns a clone of the element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        let store = self.read();
        check_element_index(index, store.len)?;
        Ok(store.node(store.key_at(index)).data.clone())
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] if the list is empty.
    pub fn first(&self) -> Result<T> {
        self.front().ok_or(Error::Empty)
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] if the list is empty.
    pub fn last(&self) -> Result<T> {
        self.back().ok_or(Error::Empty)
    }

    /// Queue head: same as [`first`](Self::first).
    #[inline]
    pub fn element(&self) -> Result<T> {
        self.first()
    }

    /// Returns the first element, or `None` if empty.
    pub fn front(&self) -> Option<T> {
        self.read().values().next().cloned()
    }

    /// Returns the last element, or `None` if empty.
    pub fn back(&self) -> Option<T> {
        self.read().values().next_back().cloned()
    }

    /// Queue peek: same as [`front`](Self::front).
    #[inline]
    pub fn peek(&self) -> Option<T> {
        self.front()
    }

    /// Copies the elements into a `Vec`, front to back.
    pub fn to_vec(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    /// Returns a fail-fast iterator from the front.
    pub fn iter(&self) -> NodeIter<T, S, K> {
        NodeIter::new(self.share(), 0)
    }

    /// Returns a bidirectional fail-fast iterator starting before `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] unless `index <= len`.
    pub fn list_iter(&self, index: usize) -> Result<NodeIter<T, S, K>> {
        check_position_index(index, self.len())?;
        Ok(NodeIter::new(self.share(), index))
    }

    /// Returns a fail-fast iterator from the back to the front.
    pub fn descending_iter(&self) -> Descending<T, S, K> {
        Descending::new(self.share())
    }

    /// Returns a batching splitter over every element.
    pub fn splitter(&self) -> NodeSplitter<T, S, K> {
        NodeSplitter::new(self.share())
    }

    /// Returns a live view of `[from, to)`.
    pub fn subrange(&self, from: usize, to: usize) -> Result<SubList<T, Self>> {
        SubList::new(self.share(), from, to)
    }
}

impl<T: Clone, S, K: Key> Sequence<T> for LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Cursor = Option<NodeHint<K>>;

    #[inline]
    fn size(&self) -> Result<usize> {
        Ok(self.len())
    }

    #[inline]
    fn epoch(&self) -> Epoch {
        LinkedList::epoch(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        LinkedList::get(self, index)
    }

    fn get_with(&self, index: usize, cursor: &mut Option<NodeHint<K>>) -> Result<T> {
        let store = self.read();
        check_element_index(index, store.len)?;
        let key = store.key_near(index, *cursor);
        *cursor = Some(NodeHint {
            epoch: store.epoch,
            index,
            key,
        });
        Ok(store.node(key).data.clone())
    }

    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<T> {
        LinkedList::set(self, index, value)
    }

    #[inline]
    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        LinkedList::insert(self, index, value)
    }

    #[inline]
    fn remove_at(&mut self, index: usize) -> Result<T> {
        LinkedList::remove_at(self, index)
    }

    #[inline]
    fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool> {
        LinkedList::insert_all(self, index, values)
    }

    #[inline]
    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        LinkedList::remove_range(self, from, to)
    }

    #[inline]
    fn share(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
        }
    }
}

impl<T, S, K: Key> Default for LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn default() -> Self {
        Self::from_storage(S::with_capacity(0))
    }
}

/// Deep copy into a fresh arena with a fresh epoch.
impl<T: Clone, S, K: Key> Clone for LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn clone(&self) -> Self {
        let store = self.read();
        let mut copy = LinkedStore::with_storage(S::with_capacity(store.len));
        for value in store.values() {
            copy.link_last(value.clone());
        }
        Self {
            store: Rc::new(RefCell::new(copy)),
        }
    }
}

impl<T, S, K: Key> FromIterator<T> for LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut store = LinkedStore::with_storage(S::with_capacity(iter.size_hint().0));
        for value in iter {
            store.link_last(value);
        }
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }
}

impl<T: PartialEq, S, K: Key> PartialEq for LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.store, &other.store) {
            return true;
        }
        let (a, b) = (self.read(), other.read());
        a.len == b.len && a.values().eq(b.values())
    }
}

impl<T: Eq, S, K: Key> Eq for LinkedList<T, S, K> where S: Storage<ListNode<T, K>, Key = K> {}

impl<T: fmt::Debug, S, K: Key> fmt::Debug for LinkedList<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().values()).finish()
    }
}
