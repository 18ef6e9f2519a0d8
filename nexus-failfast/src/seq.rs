//! Positional capability shared by every list-like container.
//!
//! [`ArrayList`](crate::ArrayList), [`LinkedList`](crate::LinkedList), and
//! [`SubList`](crate::SubList) all implement [`Sequence`]. Range views,
//! index iterators, and index splitters are written against this trait, so
//! the same view type works over an array, a linked list, or another view.

use crate::{Epoch, Result};

/// Indexed read/write access with a modification epoch.
///
/// Every method that can observe a stale handle returns [`Result`]. For
/// root containers `size` and `epoch` never fail. For views they validate
/// the captured epoch first.
pub trait Sequence<T: Clone> {
    /// Number of live elements.
    fn size(&self) -> Result<usize>;

    /// Live epoch of the root backing container.
    fn epoch(&self) -> Epoch;

    /// Position memo carried between [`get_with`](Sequence::get_with) calls.
    ///
    /// Index-addressed containers use `()`. The linked list remembers the
    /// last node it reached, so reading neighbouring indices walks from
    /// there instead of from an end.
    type Cursor: Default;

    /// Returns a clone of the element at `index`.
    fn get(&self, index: usize) -> Result<T>;

    /// Same as [`get`](Sequence::get), resuming from and updating `cursor`.
    ///
    /// A cursor captured before a structural change is ignored, never
    /// trusted.
    fn get_with(&self, index: usize, cursor: &mut Self::Cursor) -> Result<T>;

    /// Replaces the element at `index`, returning the previous value.
    fn set(&mut self, index: usize, value: T) -> Result<T>;

    /// Inserts `value` at `index`, shifting later elements up.
    fn insert(&mut self, index: usize, value: T) -> Result<()>;

    /// Removes and returns the element at `index`.
    fn remove_at(&mut self, index: usize) -> Result<T>;

    /// Inserts every value at `index`, preserving their order.
    ///
    /// Returns `true` if anything was inserted. The whole batch costs one
    /// epoch bump.
    fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, values: I) -> Result<bool>;

    /// Removes `[from, to)` with one epoch bump.
    fn remove_range(&mut self, from: usize, to: usize) -> Result<()>;

    /// Returns another handle to the same backing storage.
    ///
    /// Writes through either handle are immediately visible through the
    /// other. This is how views and iterators keep the storage alive.
    fn share(&self) -> Self
    where
        Self: Sized;
}

/// Position of the first element equal to `value`, scanning `seq` in order.
pub(crate) fn position<T, P>(seq: &P, value: &T) -> Result<Option<usize>>
where
    T: Clone + PartialEq,
    P: Sequence<T>,
{
    let mut cursor: P::Cursor = Default::default();
    for index in 0..seq.size()? {
        if seq.get_with(index, &mut cursor)? == *value {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
