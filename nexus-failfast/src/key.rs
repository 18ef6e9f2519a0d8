//! Key trait for node-arena indices.
//!
//! Linked nodes refer to each other by arena key rather than by pointer.
//! A reserved sentinel (`NONE`) stands in for a null link, so a node's
//! `prev`/`next` fields stay the size of a bare integer.

/// A copyable arena key with a sentinel "no node" value.
///
/// # Example
///
/// ```
/// use nexus_failfast::Key;
///
/// let key: usize = 42;
/// assert!(key.is_some());
/// assert!(usize::NONE.is_none());
/// ```
pub trait Key: Copy + Eq {
    /// Sentinel value representing "no node".
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is NOT the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }
}

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;
            }
        )*
    };
}

impl_key_for_unsigned!(u16, u32, u64, usize);
