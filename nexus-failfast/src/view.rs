//! Live range views.
//!
//! A [`SubList`] presents `[from, to)` of a parent [`Sequence`] as a list of
//! its own. It shares the parent's storage: writes through the view land in
//! the parent at `offset + index`, and writes to the parent are visible
//! through the view.
//!
//! The view captures the root epoch when created. Structural changes made
//! through the view (or a view nested inside it) refresh that capture and
//! resize the view. Any other structural change to the root invalidates the
//! view, and every later call on it fails with
//! [`Error::ConcurrentModification`](crate::Error::ConcurrentModification).

use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use std::rc::Rc;

use crate::error::{check_element_index, check_position_index, check_range};
use crate::{Epoch, IndexIter, IndexSplitter, Result, Sequence};

/// Position and captured epoch of a view, shared by all its handles.
#[derive(Clone, Copy, Debug)]
struct Window {
    /// Start of the view in the parent's index space.
    offset: usize,
    len: usize,
    epoch: Epoch,
}

/// A storage-sharing view over a contiguous range of a parent sequence.
///
/// `P` is any [`Sequence`]: an [`ArrayList`](crate::ArrayList), a
/// [`LinkedList`](crate::LinkedList), or another `SubList`.
///
/// # Example
///
/// ```
/// use nexus_failfast::ArrayList;
///
/// let list: ArrayList<u32> = (0..10).collect();
/// let mut view = list.subrange(2, 8).unwrap();
/// let mut inner = view.subrange(1, 3).unwrap();
///
/// inner.clear().unwrap();
/// assert_eq!(view.len(), Ok(4));
/// assert_eq!(list.to_vec(), vec![0, 1, 2, 5, 6, 7, 8, 9]);
/// ```
pub struct SubList<T, P> {
    parent: P,
    window: Rc<Cell<Window>>,
    _marker: PhantomData<T>,
}

impl<T: Clone, P: Sequence<T>> SubList<T, P> {
    pub(crate) fn new(parent: P, from: usize, to: usize) -> Result<Self> {
        check_range(from, to, parent.size()?)?;
        let epoch = parent.epoch();
        Ok(Self {
            parent,
            window: Rc::new(Cell::new(Window {
                offset: from,
                len: to - from,
                epoch,
            })),
            _marker: PhantomData,
        })
    }

    /// Current window, if the captured epoch is still live.
    #[inline]
    fn window(&self) -> Result<Window> {
        let window = self.window.get();
        window.epoch.expect(self.parent.epoch())?;
        Ok(window)
    }

    /// Records a structural change made through this view.
    #[inline]
    fn resize(&self, window: Window, len: usize) {
        self.window.set(Window {
            len,
            epoch: self.parent.epoch(),
            ..window
        });
    }

    /// Returns the number of elements in the view.
    pub fn len(&self) -> Result<usize> {
        Ok(self.window()?.len)
    }

    /// Returns `true` if the view is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a clone of the element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        let window = self.window()?;
        check_element_index(index, window.len)?;
        self.parent.get(window.offset + index)
    }

    /// Replaces the element at `index`, returning the old value.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let window = self.window()?;
        check_element_index(index, window.len)?;
        self.parent.set(window.offset + index, value)
    }

    /// Appends `value` at the end of the view.
    pub fn add(&mut self, value: T) -> Result<()> {
        let len = self.len()?;
        self.insert(len, value)
    }

    /// Inserts `value` at `index`, growing the view by one.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let window = self.window()?;
        check_position_index(index, window.len)?;
        self.parent.insert(window.offset + index, value)?;
        self.resize(window, window.len + 1);
        Ok(())
    }

    /// Removes and returns the element at `index`, shrinking the view.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let window = self.window()?;
        check_element_index(index, window.len)?;
        let value = self.parent.remove_at(window.offset + index)?;
        self.resize(window, window.len - 1);
        Ok(value)
    }

    /// Removes `[from, to)` of the view.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        let window = self.window()?;
        check_range(from, to, window.len)?;
        self.parent
            .remove_range(window.offset + from, window.offset + to)?;
        self.resize(window, window.len - (to - from));
        Ok(())
    }

    /// Removes every element of the view from the parent.
    pub fn clear(&mut self) -> Result<()> {
        let len = self.len()?;
        self.remove_range(0, len)
    }

    /// Appends every value at the end of the view.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> Result<bool> {
        let len = self.len()?;
        self.insert_all(len, values)
    }

    /// Inserts every value at `index`, preserving their order.
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool> {
        let window = self.window()?;
        check_position_index(index, window.len)?;
        let values: Vec<T> = values.into_iter().collect();
        let count = values.len();
        if count == 0 {
            return Ok(false);
        }
        self.parent.insert_all(window.offset + index, values)?;
        self.resize(window, window.len + count);
        Ok(true)
    }

    /// Returns `true` if some element of the view equals `value`.
    pub fn contains(&self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    /// Position within the view of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        crate::seq::position(self, value)
    }

    /// Copies the view's elements into a `Vec`.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let window = self.window()?;
        let mut cursor: P::Cursor = Default::default();
        (0..window.len)
            .map(|index| self.parent.get_with(window.offset + index, &mut cursor))
            .collect()
    }

    /// Returns a fail-fast iterator from the front of the view.
    pub fn iter(&self) -> IndexIter<T, Self> {
        IndexIter::new(self.share(), 0)
    }

    /// Returns a bidirectional fail-fast iterator starting before `index`.
    pub fn list_iter(&self, index: usize) -> Result<IndexIter<T, Self>> {
        check_position_index(index, self.len()?)?;
        Ok(IndexIter::new(self.share(), index))
    }

    /// Returns a nested view of `[from, to)` of this view.
    pub fn subrange(&self, from: usize, to: usize) -> Result<SubList<T, Self>> {
        SubList::new(self.share(), from, to)
    }

    /// Returns a splitter over the view's elements.
    pub fn splitter(&self) -> IndexSplitter<T, Self> {
        IndexSplitter::new(self.share())
    }
}

impl<T: Clone, P: Sequence<T>> Sequence<T> for SubList<T, P> {
    type Cursor = P::Cursor;

    #[inline]
    fn size(&self) -> Result<usize> {
        self.len()
    }

    #[inline]
    fn epoch(&self) -> Epoch {
        self.parent.epoch()
    }

    #[inline]
    fn get(&self, index: usize) -> Result<T> {
        SubList::get(self, index)
    }

    #[inline]
    fn get_with(&self, index: usize, cursor: &mut P::Cursor) -> Result<T> {
        let window = self.window()?;
        check_element_index(index, window.len)?;
        self.parent.get_with(window.offset + index, cursor)
    }

    #[inline]
    fn set(&mut self, index: usize, value: T) -> Result<T> {
        SubList::set(self, index, value)
    }

    #[inline]
    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        SubList::insert(self, index, value)
    }

    #[inline]
    fn remove_at(&mut self, index: usize) -> Result<T> {
        SubList::remove_at(self, index)
    }

    #[inline]
    fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool> {
        SubList::insert_all(self, index, values)
    }

    #[inline]
    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        SubList::remove_range(self, from, to)
    }

    fn share(&self) -> Self {
        Self {
            parent: self.parent.share(),
            window: Rc::clone(&self.window),
            _marker: PhantomData,
        }
    }
}

impl<T, P> fmt::Debug for SubList<T, P>
where
    T: Clone + fmt::Debug,
    P: Sequence<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_vec() {
            Ok(items) => f.debug_list().entries(&items).finish(),
            Err(_) => f.write_str("SubList(<stale>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArrayList, Error, LinkedList};

    fn list_of(values: &[u32]) -> ArrayList<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn writes_are_shared_both_ways() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        let mut view = list.subrange(1, 4).unwrap();
        assert_eq!(view.to_vec(), Ok(vec![2, 3, 4]));

        view.set(0, 9).unwrap();
        assert_eq!(list.get(1), Ok(9));

        list.set(3, 7).unwrap();
        assert_eq!(view.get(2), Ok(7));
    }

    #[test]
    fn direct_structural_change_invalidates() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        let mut view = list.subrange(1, 4).unwrap();

        list.remove_at(4).unwrap();
        assert_eq!(view.get(0), Err(Error::ConcurrentModification));
        assert_eq!(view.len(), Err(Error::ConcurrentModification));
        assert_eq!(view.add(1), Err(Error::ConcurrentModification));
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn insert_and_remove_through_view() {
        let list = list_of(&[1, 2, 3, 4, 5]);
        let mut view = list.subrange(1, 3).unwrap();

        view.add(9).unwrap();
        view.insert(0, 8).unwrap();
        assert_eq!(view.to_vec(), Ok(vec![8, 2, 3, 9]));
        assert_eq!(list.to_vec(), vec![1, 8, 2, 3, 9, 4, 5]);

        assert_eq!(view.remove_at(1), Ok(2));
        assert_eq!(view.len(), Ok(3));
        assert_eq!(list.to_vec(), vec![1, 8, 3, 9, 4, 5]);
    }

    #[test]
    fn bounds_are_local() {
        let list = list_of(&[1, 2, 3, 4, 5]);
        let mut view = list.subrange(1, 3).unwrap();

        assert_eq!(view.get(2), Err(Error::out_of_bounds(2, 2)));
        assert_eq!(view.insert(3, 0), Err(Error::out_of_bounds(3, 2)));
        assert_eq!(list.subrange(2, 6).err(), Some(Error::out_of_bounds(6, 5)));
        assert!(matches!(
            list.subrange(3, 2).err(),
            Some(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn nested_views_propagate_size() {
        let list: ArrayList<u32> = (0..10).collect();
        let mut outer = list.subrange(2, 8).unwrap();
        let mut inner = outer.subrange(1, 3).unwrap();
        assert_eq!(inner.to_vec(), Ok(vec![3, 4]));

        inner.add(99).unwrap();
        assert_eq!(outer.len(), Ok(7));
        assert_eq!(outer.get(3), Ok(99));

        outer.add(100).unwrap();
        assert_eq!(inner.get(0), Err(Error::ConcurrentModification));
        assert_eq!(
            outer.to_vec(),
            Ok(vec![2, 3, 4, 99, 5, 6, 7, 100])
        );
    }

    #[test]
    fn sibling_views_invalidate_each_other() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut a = list.subrange(0, 2).unwrap();
        let b = list.subrange(2, 4).unwrap();

        a.remove_at(0).unwrap();
        assert_eq!(b.get(0), Err(Error::ConcurrentModification));
        assert_eq!(a.to_vec(), Ok(vec![2]));
    }

    #[test]
    fn clear_and_bulk_insert() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        let mut view = list.subrange(1, 4).unwrap();
        let before = list.epoch().get();

        view.clear().unwrap();
        assert_eq!(view.is_empty(), Ok(true));
        assert_eq!(list.epoch().get(), before + 1);

        assert_eq!(view.add_all([7, 8]), Ok(true));
        assert_eq!(view.add_all(Vec::new()), Ok(false));
        assert_eq!(list.epoch().get(), before + 2);
        assert_eq!(list.to_vec(), vec![1, 7, 8, 5]);

        list.add(6).unwrap();
        assert_eq!(view.clear(), Err(Error::ConcurrentModification));
    }

    #[test]
    fn search_within_view() {
        let list = list_of(&[5, 1, 2, 5, 3]);
        let view = list.subrange(1, 4).unwrap();
        assert_eq!(view.index_of(&5), Ok(Some(2)));
        assert_eq!(view.contains(&3), Ok(false));
    }

    #[test]
    fn view_iterator_removes() {
        let list = list_of(&[1, 2, 3, 4, 5]);
        let view = list.subrange(1, 4).unwrap();

        let mut iter = view.iter();
        while let Some(item) = iter.next() {
            if item.unwrap() == 3 {
                iter.remove().unwrap();
            }
        }
        assert_eq!(view.to_vec(), Ok(vec![2, 4]));
        assert_eq!(list.to_vec(), vec![1, 2, 4, 5]);
    }

    #[test]
    fn view_over_linked_list() {
        let mut list: LinkedList<u32> = (1..=5).collect();
        let mut view = list.subrange(1, 4).unwrap();

        view.set(0, 9).unwrap();
        assert_eq!(list.get(1), Ok(9));

        view.remove_at(1).unwrap();
        assert_eq!(list.to_vec(), vec![1, 9, 4, 5]);

        list.push_front(0).unwrap();
        assert_eq!(view.get(0), Err(Error::ConcurrentModification));
    }

    #[test]
    fn debug_shows_stale() {
        let mut list = list_of(&[1, 2, 3]);
        let view = list.subrange(0, 2).unwrap();
        assert_eq!(format!("{view:?}"), "[1, 2]");
        list.clear().unwrap();
        assert_eq!(format!("{view:?}"), "SubList(<stale>)");
    }
}
