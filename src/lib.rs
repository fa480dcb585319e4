//! An AVL tree keyed by byte strings, with explicit and fallible allocator
//! control.
//!
//! [`AvlTree`] is an ordered container meant to be embedded as an index or
//! dictionary inside larger programs. Keys are any `K: AsRef<[u8]>`, compared
//! lexicographically by their bytes; values are opaque payloads. Duplicate
//! keys are kept side by side rather than merged.
//!
//! # Quick Start
//!
//! ```
//! use allocated_avl::{AvlTree, Direction, Projection, Release};
//!
//! let mut tree = AvlTree::new();
//! tree.insert("a", 1)?;
//! tree.insert("b", 2)?;
//! tree.insert("c", 3)?;
//!
//! // Three ascending inserts trigger one left rotation; "b" ends up on top.
//! let levels: Vec<_> = tree
//!     .breadth_first(Direction::LeftFirst, Projection::Key)?
//!     .iter()
//!     .filter_map(|v| v.key().copied())
//!     .collect();
//! assert_eq!(levels, ["b", "a", "c"]);
//!
//! let removed = tree.delete(b"a", Release::Nodes).unwrap();
//! assert_eq!(removed.value, Some(1));
//! assert_eq!(tree.len(), 2);
//! # Ok::<(), allocated_avl::Error>(())
//! ```
//!
//! # Allocation
//!
//! Nodes live in an arena allocated from an
//! [`allocator_api2::alloc::Allocator`]. Use [`AvlTree::new`] for the global
//! allocator or [`AvlTree::new_in`] to supply your own. Every allocation is
//! fallible: a refused node or traversal buffer surfaces as
//! [`Error::AllocFailed`], carrying the refused layout as an
//! [`allocated::AllocErrorWithLayout`], and the tree stays as it was.
//! Removing entries never allocates.
//!
//! # Node handles
//!
//! Searches and traversals can project nodes as [`NodeId`] handles. Rotations
//! work by exchanging entries between nodes instead of relinking the pivot,
//! so a handle stays attached to the same position in the tree, but not
//! necessarily to the same entry, across inserts and deletes.
//!
//! # Threading
//!
//! The tree has no internal locking. Share it across threads only behind
//! your own lock.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

#[cfg(any(feature = "std", test))]
extern crate std;

extern crate alloc;

mod error;
pub mod options;
/// The tree container, its node handles and traversal output.
pub mod tree;

pub use error::{Error, Result};
pub use options::{Direction, Order, Projection, Release};
pub use tree::{AvlTree, NodeId, NodeRef, Reclaimed, Traversal, Visit};
