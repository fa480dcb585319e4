//! Configuration axes accepted by tree operations.
//!
//! Each axis is a closed enum, so the typed API cannot express an empty or
//! conflicting selection. Callers that carry options as OR-ed integer flags
//! (for example across an FFI boundary) parse them with `from_bits`. Parsing
//! rejects empty or conflicting selections instead of picking one.

use tracing::debug;

use crate::error::{Error, Result};

/// Raw flag values, one bit per option.
pub mod bits {
    /// Release the values of removed entries.
    pub const FREE_DATA: u32 = 0x1;
    /// Release the keys of removed entries.
    pub const FREE_KEYS: u32 = 0x2;

    /// Project values.
    pub const SEARCH_DATA: u32 = 0x4;
    /// Project keys.
    pub const SEARCH_KEYS: u32 = 0x8;
    /// Project node handles.
    pub const SEARCH_NODES: u32 = 0x10;

    /// Depth-first pre-order.
    pub const DFS_PRE_ORDER: u32 = 0x20;
    /// Depth-first in-order.
    pub const DFS_IN_ORDER: u32 = 0x40;
    /// Depth-first post-order.
    pub const DFS_POST_ORDER: u32 = 0x80;

    /// Breadth-first, left child first.
    pub const BFS_LEFT_FIRST: u32 = 0x100;
    /// Breadth-first, right child first.
    pub const BFS_RIGHT_FIRST: u32 = 0x200;

    /// All release bits.
    pub const RELEASE_MASK: u32 = FREE_DATA | FREE_KEYS;
    /// All projection bits.
    pub const PROJECTION_MASK: u32 = SEARCH_DATA | SEARCH_KEYS | SEARCH_NODES;
    /// All depth-first order bits.
    pub const ORDER_MASK: u32 = DFS_PRE_ORDER | DFS_IN_ORDER | DFS_POST_ORDER;
    /// All breadth-first direction bits.
    pub const DIRECTION_MASK: u32 = BFS_LEFT_FIRST | BFS_RIGHT_FIRST;
}

/// Which parts of a removed entry the tree drops itself.
///
/// Whatever is not released is handed back to the caller in a
/// [`Reclaimed`](crate::Reclaimed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Release {
    /// Only the node is freed; key and value are returned.
    #[default]
    Nodes,
    /// Drop keys, return values.
    Keys,
    /// Drop values, return keys.
    Values,
    /// Drop both keys and values.
    All,
}

impl Release {
    /// Whether keys are dropped by the tree.
    pub fn keys(self) -> bool {
        matches!(self, Release::Keys | Release::All)
    }

    /// Whether values are dropped by the tree.
    pub fn values(self) -> bool {
        matches!(self, Release::Values | Release::All)
    }

    /// Raw flag word for this option.
    pub fn bits(self) -> u32 {
        match self {
            Release::Nodes => 0,
            Release::Keys => bits::FREE_KEYS,
            Release::Values => bits::FREE_DATA,
            Release::All => bits::FREE_KEYS | bits::FREE_DATA,
        }
    }

    /// Release flags combine freely, so any subset of the two bits is valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOptions`] if a bit outside the release flags is set.
    pub fn from_bits(raw: u32) -> Result<Self> {
        reject_foreign(raw, bits::RELEASE_MASK)?;
        Ok(
            match (raw & bits::FREE_KEYS != 0, raw & bits::FREE_DATA != 0) {
                (false, false) => Release::Nodes,
                (true, false) => Release::Keys,
                (false, true) => Release::Values,
                (true, true) => Release::All,
            },
        )
    }
}

/// What a search or traversal yields for each visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// The node handle.
    Node,
    /// A reference to the key.
    Key,
    /// A reference to the value.
    Value,
}

impl Projection {
    /// Raw flag word for this option.
    pub fn bits(self) -> u32 {
        match self {
            Projection::Node => bits::SEARCH_NODES,
            Projection::Key => bits::SEARCH_KEYS,
            Projection::Value => bits::SEARCH_DATA,
        }
    }

    /// Parses a raw flag word.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one projection bit and nothing else is set.
    pub fn from_bits(raw: u32) -> Result<Self> {
        match exactly_one(raw, bits::PROJECTION_MASK, "projection")? {
            bits::SEARCH_NODES => Ok(Projection::Node),
            bits::SEARCH_KEYS => Ok(Projection::Key),
            _ => Ok(Projection::Value),
        }
    }
}

/// Depth-first visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, node, right subtree.
    InOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
}

impl Order {
    /// Raw flag word for this option.
    pub fn bits(self) -> u32 {
        match self {
            Order::PreOrder => bits::DFS_PRE_ORDER,
            Order::InOrder => bits::DFS_IN_ORDER,
            Order::PostOrder => bits::DFS_POST_ORDER,
        }
    }

    /// Parses a raw flag word.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one order bit and nothing else is set.
    pub fn from_bits(raw: u32) -> Result<Self> {
        match exactly_one(raw, bits::ORDER_MASK, "depth-first order")? {
            bits::DFS_PRE_ORDER => Ok(Order::PreOrder),
            bits::DFS_IN_ORDER => Ok(Order::InOrder),
            _ => Ok(Order::PostOrder),
        }
    }
}

/// Which child a breadth-first traversal enqueues first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Left child before right child.
    LeftFirst,
    /// Right child before left child.
    RightFirst,
}

impl Direction {
    /// Raw flag word for this option.
    pub fn bits(self) -> u32 {
        match self {
            Direction::LeftFirst => bits::BFS_LEFT_FIRST,
            Direction::RightFirst => bits::BFS_RIGHT_FIRST,
        }
    }

    /// Parses a raw flag word.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one direction bit and nothing else is set.
    pub fn from_bits(raw: u32) -> Result<Self> {
        match exactly_one(raw, bits::DIRECTION_MASK, "breadth-first direction")? {
            bits::BFS_LEFT_FIRST => Ok(Direction::LeftFirst),
            _ => Ok(Direction::RightFirst),
        }
    }
}

macro_rules! impl_try_from_bits {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<u32> for $ty {
                type Error = Error;

                fn try_from(raw: u32) -> Result<Self> {
                    Self::from_bits(raw)
                }
            }
        )*
    };
}

impl_try_from_bits!(Release, Projection, Order, Direction);

fn reject_foreign(raw: u32, mask: u32) -> Result<()> {
    let foreign = raw & !mask;
    if foreign != 0 {
        debug!(bits = foreign, "rejected unknown option bits");
        return Err(Error::UnknownOptions { bits: foreign });
    }
    Ok(())
}

fn exactly_one(raw: u32, mask: u32, axis: &'static str) -> Result<u32> {
    reject_foreign(raw, mask)?;
    match raw.count_ones() {
        0 => {
            debug!(axis, "rejected empty option selection");
            Err(Error::NoOption { axis })
        }
        1 => Ok(raw),
        _ => {
            debug!(axis, bits = raw, "rejected conflicting options");
            Err(Error::ConflictingOptions { axis, bits: raw })
        }
    }
}
