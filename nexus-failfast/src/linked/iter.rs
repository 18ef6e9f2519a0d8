//! Node-walking list iterators.

use crate::{Epoch, Error, Key, Result, Storage};

use super::{LinkedList, ListNode};

/// A bidirectional fail-fast iterator over a [`LinkedList`].
///
/// Walks node links rather than re-resolving indices, so each step is O(1).
/// The captured epoch is checked before any node is touched: a stale
/// iterator reports [`Error::ConcurrentModification`] and never follows a
/// link that may point at a freed slot.
///
/// # Example
///
/// ```
/// use nexus_failfast::LinkedList;
///
/// let list: LinkedList<u32> = (1..=4).collect();
/// let mut iter = list.iter();
/// while let Some(value) = iter.next() {
///     if value.unwrap() % 2 == 0 {
///         iter.remove().unwrap();
///     }
/// }
/// assert_eq!(list.to_vec(), vec![1, 3]);
/// ```
pub struct NodeIter<T, S, K: Key>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    list: LinkedList<T, S, K>,
    /// Node `next` would return, `NONE` past the end.
    next: K,
    next_index: usize,
    /// Node last returned by `next`/`previous`, `NONE` if none.
    last: K,
    expected: Epoch,
}

impl<T: Clone, S, K: Key> NodeIter<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    pub(super) fn new(list: LinkedList<T, S, K>, index: usize) -> Self {
        let (next, expected) = {
            let store = list.read();
            (store.successor_at(index), store.epoch)
        };
        Self {
            list,
            next,
            next_index: index,
            last: K::NONE,
            expected,
        }
    }

    #[inline]
    pub(super) fn check(&self) -> Result<()> {
        self.expected.expect(self.list.epoch())
    }

    /// Returns `true` if `next` would make progress.
    ///
    /// A stale iterator reports `true` so the following `next` surfaces
    /// the error.
    pub fn has_next(&self) -> bool {
        self.check().is_err() || self.next_index < self.list.len()
    }

    /// Returns `true` if `previous` would make progress.
    pub fn has_previous(&self) -> bool {
        self.next_index > 0
    }

    /// Index of the element `next` would return.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Index of the element `previous` would return.
    pub fn previous_index(&self) -> Option<usize> {
        self.next_index.checked_sub(1)
    }

    /// Steps backward, returning the element before the cursor.
    pub fn previous(&mut self) -> Option<Result<T>> {
        if let Err(err) = self.check() {
            return Some(Err(err));
        }
        if self.next_index == 0 {
            return None;
        }

        let (key, value) = {
            let store = self.list.read();
            let key = if self.next.is_none() {
                store.tail
            } else {
                store.node(self.next).prev
            };
            (key, store.node(key).data.clone())
        };
        self.next = key;
        self.last = key;
        self.next_index -= 1;
        Some(Ok(value))
    }

    /// Removes the element last returned by `next` or `previous`.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`] if nothing was returned since the last
    /// `remove`/`add`, [`Error::ConcurrentModification`] if stale.
    pub fn remove(&mut self) -> Result<T> {
        if self.last.is_none() {
            return Err(Error::IllegalState);
        }
        self.check()?;

        let (value, after) = {
            let mut store = self.list.write()?;
            let after = store.node(self.last).next;
            let value = store.unlink(self.last);
            store.epoch.bump();
            self.expected = store.epoch;
            (value, after)
        };

        if self.next == self.last {
            // Removed after `previous`: the cursor node is gone
            self.next = after;
        } else {
            self.next_index -= 1;
        }
        self.last = K::NONE;
        Ok(value)
    }

    /// Replaces the element last returned by `next` or `previous`.
    pub fn set(&mut self, value: T) -> Result<T> {
        if self.last.is_none() {
            return Err(Error::IllegalState);
        }
        self.check()?;

        let mut store = self.list.write()?;
        Ok(core::mem::replace(
            &mut store.node_mut(self.last).data,
            value,
        ))
    }

    /// Inserts `value` before the cursor.
    pub fn add(&mut self, value: T) -> Result<()> {
        self.check()?;

        {
            let mut store = self.list.write()?;
            store.link_before(value, self.next);
            store.epoch.bump();
            self.expected = store.epoch;
        }
        self.last = K::NONE;
        self.next_index += 1;
        Ok(())
    }
}

impl<T: Clone, S, K: Key> Iterator for NodeIter<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.check() {
            return Some(Err(err));
        }
        if self.next_index >= self.list.len() {
            return None;
        }

        let (key, value) = {
            let store = self.list.read();
            let node = store.node(self.next);
            ((self.next, node.next), node.data.clone())
        };
        self.last = key.0;
        self.next = key.1;
        self.next_index += 1;
        Some(Ok(value))
    }
}

/// Back-to-front iterator: a [`NodeIter`] started at the end, walked with
/// `previous`.
pub struct Descending<T, S, K: Key>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    inner: NodeIter<T, S, K>,
}

impl<T: Clone, S, K: Key> Descending<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    pub(super) fn new(list: LinkedList<T, S, K>) -> Self {
        let len = list.len();
        Self {
            inner: NodeIter::new(list, len),
        }
    }

    /// Returns `true` if `next` would make progress.
    pub fn has_next(&self) -> bool {
        self.inner.check().is_err() || self.inner.has_previous()
    }

    /// Removes the element last returned by `next`.
    pub fn remove(&mut self) -> Result<T> {
        self.inner.remove()
    }
}

impl<T: Clone, S, K: Key> Iterator for Descending<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Item = Result<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.previous()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, LinkedList};

    fn list_of(values: &[u32]) -> LinkedList<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn forward_and_back() {
        let list = list_of(&[1, 2, 3]);
        let mut iter = list.iter();

        assert_eq!(iter.next(), Some(Ok(1)));
        assert_eq!(iter.next(), Some(Ok(2)));
        assert_eq!(iter.next(), Some(Ok(3)));
        assert_eq!(iter.next(), None);
        assert!(!iter.has_next());

        assert_eq!(iter.previous(), Some(Ok(3)));
        assert_eq!(iter.previous(), Some(Ok(2)));
        assert_eq!(iter.next_index(), 1);
        assert_eq!(iter.previous_index(), Some(0));
        assert_eq!(iter.next(), Some(Ok(2)));
    }

    #[test]
    fn list_iter_from_middle() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut iter = list.list_iter(2).unwrap();
        assert_eq!(iter.next(), Some(Ok(3)));

        let mut iter = list.list_iter(2).unwrap();
        assert_eq!(iter.previous(), Some(Ok(2)));
        assert_eq!(list.list_iter(5).err(), Some(Error::out_of_bounds(5, 4)));
    }

    #[test]
    fn fail_fast_after_direct_add() {
        let mut list = list_of(&[1, 2, 3]);
        let mut iter = list.iter();
        list.add(4).unwrap();

        assert!(iter.has_next());
        assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
        assert_eq!(iter.add(0), Err(Error::ConcurrentModification));
    }

    #[test]
    fn remove_after_next_and_previous() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut iter = list.iter();

        assert_eq!(iter.remove(), Err(Error::IllegalState));
        iter.next().unwrap().unwrap();
        iter.next().unwrap().unwrap();
        assert_eq!(iter.remove(), Ok(2));
        assert_eq!(iter.remove(), Err(Error::IllegalState));
        assert_eq!(iter.next_index(), 1);

        assert_eq!(iter.next(), Some(Ok(3)));
        assert_eq!(iter.previous(), Some(Ok(3)));
        assert_eq!(iter.remove(), Ok(3));
        assert_eq!(iter.next(), Some(Ok(4)));
        assert_eq!(list.to_vec(), vec![1, 4]);
    }

    #[test]
    fn set_and_add() {
        let list = list_of(&[1, 3]);
        let mut iter = list.iter();
        let before = list.epoch();

        assert_eq!(iter.set(0), Err(Error::IllegalState));
        iter.next().unwrap().unwrap();
        assert_eq!(iter.set(10), Ok(1));
        assert_eq!(list.epoch(), before);

        iter.add(2).unwrap();
        assert_eq!(iter.set(0), Err(Error::IllegalState));
        assert_eq!(iter.next(), Some(Ok(3)));
        iter.add(4).unwrap();
        assert!(!iter.has_next());

        assert_eq!(list.to_vec(), vec![10, 2, 3, 4]);
    }

    #[test]
    fn add_into_empty() {
        let list: LinkedList<u32> = LinkedList::new();
        let mut iter = list.iter();
        iter.add(1).unwrap();
        iter.add(2).unwrap();
        assert_eq!(iter.previous(), Some(Ok(2)));
        assert_eq!(list.to_vec(), vec![1, 2]);
    }

    #[test]
    fn descending_walks_backward() {
        let list = list_of(&[1, 2, 3]);
        let values: Result<Vec<_>, _> = list.descending_iter().collect();
        assert_eq!(values, Ok(vec![3, 2, 1]));

        let empty: LinkedList<u32> = LinkedList::new();
        assert!(!empty.descending_iter().has_next());
    }

    #[test]
    fn descending_remove() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut iter = list.descending_iter();
        while let Some(value) = iter.next() {
            if value.unwrap() % 2 == 1 {
                iter.remove().unwrap();
            }
        }
        assert_eq!(list.to_vec(), vec![2, 4]);
    }

    #[test]
    fn descending_fails_fast() {
        let mut list = list_of(&[1, 2]);
        let mut iter = list.descending_iter();
        assert_eq!(iter.next(), Some(Ok(2)));
        list.pop_back().unwrap();
        assert!(iter.has_next());
        assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
    }
}
