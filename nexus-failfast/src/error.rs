//! Error types shared by every container, view, iterator, and splitter.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure modes of container operations.
///
/// Every variant is surfaced to the immediate caller. Nothing is retried
/// internally, and a failed bounds or argument check leaves the container
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Index outside the valid range for the attempted operation.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds {
        /// The rejected index.
        index: usize,
        /// Length at the time of the call.
        len: usize,
    },

    /// A handle observed a structural change it did not make, or a
    /// structural change was attempted while the storage was being traversed.
    #[error("collection was structurally modified during use of a derived handle")]
    ConcurrentModification,

    /// An operation that needs at least one element ran on an empty container.
    #[error("collection is empty")]
    Empty,

    /// A constructor, range, or capacity request received an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Growth would exceed the configured maximum capacity.
    #[error("requested capacity {requested} exceeds maximum {max}")]
    CapacityOverflow {
        /// Minimum capacity that was required.
        requested: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// `remove` or `set` on an iterator with no last-returned element.
    #[error("iterator has no current element")]
    IllegalState,
}

impl Error {
    #[inline]
    pub(crate) fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::OutOfBounds { index, len }
    }
}

/// Fails with [`Error::OutOfBounds`] unless `index < len`.
#[inline]
pub(crate) fn check_element_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::out_of_bounds(index, len))
    }
}

/// Fails with [`Error::OutOfBounds`] unless `index <= len`.
#[inline]
pub(crate) fn check_position_index(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(Error::out_of_bounds(index, len))
    }
}

/// Validates a half-open `[from, to)` range against `len`.
pub(crate) fn check_range(from: usize, to: usize, len: usize) -> Result<()> {
    if from > to {
        return Err(Error::InvalidArgument(format!(
            "range start {from} is greater than end {to}"
        )));
    }
    if to > len {
        return Err(Error::out_of_bounds(to, len));
    }
    Ok(())
}
