//! Bidirectional fail-fast iterator over any [`Sequence`].

use core::marker::PhantomData;

use crate::{Epoch, Error, Result, Sequence};

/// A list iterator that validates the backing epoch on every step.
///
/// Forward traversal goes through [`Iterator`], which yields `Result<T>`
/// items: `Some(Err(ConcurrentModification))` means the backing sequence
/// was structurally modified by someone other than this iterator.
///
/// Structural changes made through the iterator itself (`remove`, `add`)
/// keep it valid.
///
/// # Example
///
/// ```
/// use nexus_failfast::{ArrayList, Error};
///
/// let mut list: ArrayList<u32> = [1, 2, 3].into_iter().collect();
/// let mut iter = list.iter();
///
/// assert_eq!(iter.next(), Some(Ok(1)));
/// list.add(4).unwrap();
/// assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
/// ```
pub struct IndexIter<T: Clone, P: Sequence<T>> {
    seq: P,
    /// Index of the element `next` would return.
    cursor: usize,
    /// Where the last read left off, so stepping costs O(1) on linked storage.
    hint: P::Cursor,
    /// Index of the element last returned by `next`/`previous`.
    last: Option<usize>,
    expected: Epoch,
    _marker: PhantomData<T>,
}

impl<T: Clone, P: Sequence<T>> IndexIter<T, P> {
    pub(crate) fn new(seq: P, cursor: usize) -> Self {
        let expected = seq.epoch();
        Self {
            seq,
            cursor,
            hint: Default::default(),
            last: None,
            expected,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn check(&self) -> Result<()> {
        self.expected.expect(self.seq.epoch())
    }

    /// Returns `true` if `next` would make progress.
    ///
    /// A stale iterator reports `true` so the following `next` surfaces
    /// the error instead of ending the loop silently.
    pub fn has_next(&self) -> bool {
        self.check().is_err() || self.seq.size().map_or(true, |len| self.cursor < len)
    }

    /// Returns `true` if `previous` would make progress.
    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    /// Index of the element `next` would return.
    pub fn next_index(&self) -> usize {
        self.cursor
    }

    /// Index of the element `previous` would return.
    pub fn previous_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// Steps backward, returning the element before the cursor.
    pub fn previous(&mut self) -> Option<Result<T>> {
        if let Err(err) = self.check() {
            return Some(Err(err));
        }
        let index = self.cursor.checked_sub(1)?;
        Some(self.seq.get_with(index, &mut self.hint).map(|value| {
            self.cursor = index;
            self.last = Some(index);
            value
        }))
    }

    /// Removes the element last returned by `next` or `previous`.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`] if nothing was returned since the last
    /// `remove`/`add`, [`Error::ConcurrentModification`] if stale.
    pub fn remove(&mut self) -> Result<T> {
        let last = self.last.ok_or(Error::IllegalState)?;
        self.check()?;

        let value = self.seq.remove_at(last)?;
        self.cursor = last;
        self.last = None;
        self.expected = self.seq.epoch();
        Ok(value)
    }

    /// Replaces the element last returned by `next` or `previous`.
    pub fn set(&mut self, value: T) -> Result<T> {
        let last = self.last.ok_or(Error::IllegalState)?;
        self.check()?;
        self.seq.set(last, value)
    }

    /// Inserts `value` before the cursor.
    ///
    /// A following `next` is unaffected, a following `previous` returns
    /// the new element.
    pub fn add(&mut self, value: T) -> Result<()> {
        self.check()?;

        self.seq.insert(self.cursor, value)?;
        self.cursor += 1;
        self.last = None;
        self.expected = self.seq.epoch();
        Ok(())
    }
}

impl<T: Clone, P: Sequence<T>> Iterator for IndexIter<T, P> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.check() {
            return Some(Err(err));
        }
        let len = match self.seq.size() {
            Ok(len) => len,
            Err(err) => return Some(Err(err)),
        };
        if self.cursor >= len {
            return None;
        }

        let index = self.cursor;
        Some(self.seq.get_with(index, &mut self.hint).map(|value| {
            self.cursor = index + 1;
            self.last = Some(index);
            value
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrayList, Error};

    fn list_of(values: &[u32]) -> ArrayList<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn forward_and_back() {
        let list = list_of(&[1, 2, 3]);
        let mut iter = list.iter();

        assert!(!iter.has_previous());
        assert_eq!(iter.next(), Some(Ok(1)));
        assert_eq!(iter.next(), Some(Ok(2)));
        assert_eq!(iter.next_index(), 2);
        assert_eq!(iter.previous_index(), Some(1));

        assert_eq!(iter.previous(), Some(Ok(2)));
        assert_eq!(iter.previous(), Some(Ok(1)));
        assert_eq!(iter.previous(), None);
        assert_eq!(iter.previous_index(), None);
    }

    #[test]
    fn collects_in_order() {
        let list = list_of(&[4, 5, 6]);
        let values: Result<Vec<_>, _> = list.iter().collect();
        assert_eq!(values, Ok(vec![4, 5, 6]));
    }

    #[test]
    fn list_iter_starts_at_index() {
        let list = list_of(&[1, 2, 3]);
        let mut iter = list.list_iter(3).unwrap();
        assert!(!iter.has_next());
        assert_eq!(iter.previous(), Some(Ok(3)));

        assert_eq!(list.list_iter(4).err(), Some(Error::out_of_bounds(4, 3)));
    }

    #[test]
    fn fail_fast_after_direct_add() {
        let mut list = list_of(&[1, 2, 3]);
        let mut iter = list.iter();
        list.add(4).unwrap();

        assert!(iter.has_next());
        assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
        assert_eq!(iter.previous(), Some(Err(Error::ConcurrentModification)));
    }

    #[test]
    fn set_keeps_iterator_valid() {
        let mut list = list_of(&[1, 2, 3]);
        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(Ok(1)));

        list.set(2, 9).unwrap();
        assert_eq!(iter.next(), Some(Ok(2)));
        assert_eq!(iter.next(), Some(Ok(9)));
    }

    #[test]
    fn remove_through_iterator() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut iter = list.iter();

        assert_eq!(iter.remove(), Err(Error::IllegalState));
        while let Some(item) = iter.next() {
            if item.unwrap() % 2 == 0 {
                iter.remove().unwrap();
            }
        }
        assert_eq!(list.to_vec(), vec![1, 3]);
        assert_eq!(iter.remove(), Err(Error::IllegalState));
    }

    #[test]
    fn remove_after_previous() {
        let list = list_of(&[1, 2, 3]);
        let mut iter = list.list_iter(3).unwrap();
        assert_eq!(iter.previous(), Some(Ok(3)));
        assert_eq!(iter.remove(), Ok(3));
        assert_eq!(iter.previous(), Some(Ok(2)));
        assert_eq!(list.to_vec(), vec![1, 2]);
    }

    #[test]
    fn set_and_add_through_iterator() {
        let list = list_of(&[1, 3]);
        let mut iter = list.iter();

        assert_eq!(iter.next(), Some(Ok(1)));
        assert_eq!(iter.set(10), Ok(1));
        iter.add(2).unwrap();
        assert_eq!(iter.set(0), Err(Error::IllegalState));
        assert_eq!(iter.next(), Some(Ok(3)));
        assert_eq!(iter.previous(), Some(Ok(3)));
        assert_eq!(iter.previous(), Some(Ok(2)));

        assert_eq!(list.to_vec(), vec![10, 2, 3]);
    }

    #[test]
    fn iterator_mutation_invalidates_sibling() {
        let list = list_of(&[1, 2, 3]);
        let mut a = list.iter();
        let mut b = list.iter();

        a.next().unwrap().unwrap();
        a.remove().unwrap();
        assert_eq!(b.next(), Some(Err(Error::ConcurrentModification)));
        assert_eq!(a.next(), Some(Ok(2)));
    }
}
