//! Fail-fast in-memory collections.
//!
//! This crate provides a growable array, a doubly linked deque, and a set
//! adapter over any associative map. The two lists share one contract: every
//! structural change (insert, remove, clear, sort, reallocation) bumps a
//! per-container [`Epoch`], and every derived handle re-checks it before use.
//!
//! ```text
//! ArrayList / LinkedList   - own storage + epoch
//!     │
//!     ├── IndexIter / NodeIter / Descending   - cursor + captured epoch
//!     ├── SubList                             - offset/len window + captured epoch
//!     └── IndexSplitter / NodeSplitter        - range + captured epoch
//! ```
//!
//! A stale handle fails with [`Error::ConcurrentModification`] on its next
//! use instead of reading moved or freed elements.
//!
//! # Quick Start
//!
//! ```
//! use nexus_failfast::{ArrayList, Error};
//!
//! let mut list: ArrayList<u32> = [1, 2, 3].into_iter().collect();
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(Ok(1)));
//!
//! // Structural change behind the iterator's back
//! list.add(4).unwrap();
//! assert_eq!(iter.next(), Some(Err(Error::ConcurrentModification)));
//!
//! // Changes through the iterator keep it valid
//! let mut iter = list.iter();
//! while let Some(value) = iter.next() {
//!     if value.unwrap() % 2 == 0 {
//!         iter.remove().unwrap();
//!     }
//! }
//! assert_eq!(list.to_vec(), vec![1, 3]);
//! ```
//!
//! # Sharing Model
//!
//! Containers are handles to reference-counted storage. Iterators, views,
//! and splitters hold their own handle, so the container stays mutable
//! while they exist. Element reads through a derived handle return clones.
//! Nothing here is `Send` or `Sync`: the epoch detects sequential misuse by
//! a single owner and is not a synchronization mechanism.
//!
//! # Data Structures
//!
//! | Structure | Use Case | Key Operations |
//! |-----------|----------|----------------|
//! | [`ArrayList`] | Indexed sequences | O(1) amortized append, O(1) get, batch removal |
//! | [`LinkedList`] | Deques, queues, stacks | O(1) push/pop at both ends |
//! | [`HashSet`] | Membership | Delegates to the backing map |
//! | [`SubList`] | Range edits | Live view over any list |
//!
//! # Feature Flags
//!
//! - `ordermap` - Implement [`AssociativeMap`] for `ordermap::OrderMap`

#![warn(missing_docs)]

pub mod array;
pub mod epoch;
pub mod error;
pub mod iter;
pub mod key;
pub mod linked;
pub mod seq;
pub mod set;
pub mod split;
pub mod storage;
pub mod view;

pub use array::{ArrayList, ArrayListBuilder, DEFAULT_CAPACITY};
pub use epoch::Epoch;
pub use error::{Error, Result};
pub use iter::IndexIter;
pub use key::Key;
pub use linked::{
    Descending, LinkedList, ListNode, NodeHint, NodeIter, NodeSplitter, SlabListStorage,
};
pub use seq::Sequence;
pub use set::{AssociativeMap, HashSet};
pub use split::{Batch, IndexSplitter, Split};
pub use storage::Storage;
pub use view::SubList;
