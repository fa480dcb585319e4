//! Error type shared by every fallible tree operation.

use allocated::AllocErrorWithLayout;
use allocator_api2::collections::{TryReserveError, TryReserveErrorKind};
use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Reasons a tree operation can be rejected.
///
/// A rejected operation never mutates the tree. Looking up or deleting a
/// missing key is not an error; those operations return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No bit was set on an axis that needs exactly one.
    #[error("no {axis} option selected")]
    NoOption { axis: &'static str },

    /// More than one bit was set on an axis that needs exactly one.
    #[error("conflicting {axis} options: {bits:#x}")]
    ConflictingOptions { axis: &'static str, bits: u32 },

    /// Bits that do not belong to the axis being parsed.
    #[error("unknown option bits: {bits:#x}")]
    UnknownOptions { bits: u32 },

    /// The tree already holds its maximum number of entries.
    #[error("tree is full ({max_entries} entries)")]
    CapacityExhausted { max_entries: usize },

    /// A new ceiling would be smaller than the current entry count.
    #[error("maximum of {requested} entries is below the current length {len}")]
    MaxEntriesBelowLen { requested: usize, len: usize },

    /// The allocator could not provide memory for a node or an output buffer.
    /// Carries the layout of the refused request.
    #[error("{0}")]
    AllocFailed(AllocErrorWithLayout),

    /// A buffer for this many entries cannot be described by a [`Layout`].
    ///
    /// [`Layout`]: allocator_api2::alloc::Layout
    #[error("capacity overflow")]
    CapacityOverflow,

    /// A traversal was requested on a tree without entries.
    #[error("tree is empty")]
    Empty,
}

impl From<AllocErrorWithLayout> for Error {
    fn from(e: AllocErrorWithLayout) -> Self {
        Error::AllocFailed(e)
    }
}

impl From<TryReserveError> for Error {
    fn from(e: TryReserveError) -> Self {
        match e.kind() {
            TryReserveErrorKind::AllocError { layout, .. } => Error::AllocFailed(layout.into()),
            TryReserveErrorKind::CapacityOverflow => Error::CapacityOverflow,
        }
    }
}
