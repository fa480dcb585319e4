use core::cmp::Ordering;

#[cfg(feature = "std")]
use alloc::boxed::Box;
#[cfg(feature = "std")]
use alloc::string::String;
#[cfg(feature = "std")]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::error::Error as StdError;
#[cfg(feature = "std")]
use std::io::Write;

use allocator_api2::alloc::{Allocator, Global};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::options::{Projection, Release};

mod balance;
mod node;
mod traverse;


use node::Arena;
pub use node::{NodeId, NodeRef};
pub use traverse::{Traversal, Visit};

/// The parts of a removed entry that were not released.
///
/// A field is `None` when the matching [`Release`] flag asked the tree to
/// drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reclaimed<K, V> {
    /// The key, unless keys were released.
    pub key: Option<K>,
    /// The value, unless values were released.
    pub value: Option<V>,
}

impl<K, V> Reclaimed<K, V> {
    fn new(key: K, value: V, release: Release) -> Self {
        Self {
            key: (!release.keys()).then_some(key),
            value: (!release.values()).then_some(value),
        }
    }
}

/// A height-balanced binary search tree keyed by byte strings.
///
/// Keys are compared as plain byte strings through [`AsRef<[u8]>`]. Values are
/// opaque to the tree. Duplicate keys are kept, never merged: a new duplicate
/// always lands in the left subtree of the older ones.
///
/// Nodes live in an arena allocated from `A`. Every allocation is fallible and
/// reported as [`Error::AllocFailed`] without touching the tree.
///
/// # Examples
///
/// ```
/// use allocated_avl::{AvlTree, Order, Projection};
///
/// let mut tree = AvlTree::new();
/// tree.insert("b", 2)?;
/// tree.insert("a", 1)?;
/// tree.insert("c", 3)?;
///
/// assert_eq!(tree.get(b"a"), Some(&1));
///
/// let keys: Vec<_> = tree
///     .depth_first(Order::InOrder, Projection::Key)?
///     .iter()
///     .filter_map(|v| v.key().copied())
///     .collect();
/// assert_eq!(keys, ["a", "b", "c"]);
/// # Ok::<(), allocated_avl::Error>(())
/// ```
pub struct AvlTree<K, V, A: Allocator = Global> {
    arena: Arena<K, V, A>,
    root: Option<NodeId>,
    count: usize,
    max_entries: usize,
}

impl<K: AsRef<[u8]>, V> AvlTree<K, V> {
    /// Creates an empty tree using the global allocator. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<K: AsRef<[u8]>, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, A: Allocator> AvlTree<K, V, A> {
    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The most entries [`AvlTree::insert`] will accept; `usize::MAX` unless set.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Handle of the root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Height of the tree: `-1` when empty, `0` for a single entry.
    pub fn height(&self) -> i32 {
        self.arena.height(self.root)
    }

    /// Inspects the node a handle points to. Returns `None` for a handle
    /// whose node has since been freed.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K, V>> {
        NodeRef::new(&self.arena, id)
    }
}

impl<K: AsRef<[u8]>, V, A: Allocator> AvlTree<K, V, A> {
    /// Creates an empty tree that allocates from `alloc`. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self {
            arena: Arena::new_in(alloc),
            root: None,
            count: 0,
            max_entries: usize::MAX,
        }
    }

    /// Sets the maximum number of entries, builder style.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Changes the maximum number of entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaxEntriesBelowLen`] if the tree already holds more
    /// than `max_entries` entries.
    pub fn set_max_entries(&mut self, max_entries: usize) -> Result<()> {
        if max_entries < self.count {
            return Err(Error::MaxEntriesBelowLen {
                requested: max_entries,
                len: self.count,
            });
        }
        self.max_entries = max_entries;
        Ok(())
    }

    fn find(&self, key: &[u8]) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.arena.node(id);
            cur = match node.key.as_ref().cmp(key) {
                Ordering::Greater => node.left,
                Ordering::Less => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Looks up an entry with exactly this key and projects it.
    ///
    /// With duplicate keys, the match nearest the root is returned.
    pub fn search(&self, key: &[u8], projection: Projection) -> Option<Visit<'_, K, V>> {
        self.find(key).map(|id| self.arena.project(id, projection))
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.find(key).map(|id| &self.arena.node(id).value)
    }

    /// Returns the stored key equal to `key`.
    pub fn get_key(&self, key: &[u8]) -> Option<&K> {
        self.find(key).map(|id| &self.arena.node(id).key)
    }

    /// Returns `true` if some entry has exactly this key.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Inserts an entry and returns the new number of entries.
    ///
    /// An existing entry with the same key is kept; both are stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExhausted`] when the tree is at its maximum
    /// number of entries, and [`Error::AllocFailed`] when no node can be
    /// allocated. The tree is unchanged in both cases.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize> {
        if self.count >= self.max_entries {
            debug!(max_entries = self.max_entries, "insert rejected: tree is full");
            return Err(Error::CapacityExhausted {
                max_entries: self.max_entries,
            });
        }
        if let Err(e) = self.arena.reserve_one() {
            debug!(len = self.count, "insert rejected: node allocation failed");
            return Err(e);
        }

        // Equal keys descend left, so duplicates pile up leftwards.
        let mut slot = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.arena.node(id);
            let go_left = node.key.as_ref() >= key.as_ref();
            slot = Some((id, go_left));
            cur = if go_left { node.left } else { node.right };
        }

        let leaf = self.arena.insert_leaf(key, value);
        match slot {
            None => self.root = Some(leaf),
            Some((parent, true)) => self.arena.set_left(parent, Some(leaf)),
            Some((parent, false)) => self.arena.set_right(parent, Some(leaf)),
        }
        self.arena.rebalance_after_insert(leaf);
        self.count += 1;

        trace!(len = self.count, node = leaf.index(), "inserted entry");
        Ok(self.count)
    }

    /// Removes one entry with exactly this key.
    ///
    /// Returns `None` if no entry matched, in which case nothing changed.
    /// Otherwise returns the parts of the entry that `release` did not drop.
    /// Never allocates.
    pub fn delete(&mut self, key: &[u8], release: Release) -> Option<Reclaimed<K, V>> {
        let target = self.find(key)?;

        let spliced = match (self.arena.left(target), self.arena.right(target)) {
            (Some(left), Some(_)) => {
                let pred = self.arena.max_in_subtree(left);
                self.arena.swap_payload(target, pred);
                self.splice_out(pred)
            }
            _ => self.splice_out(target),
        };

        let node = self.arena.remove(spliced);
        self.count -= 1;
        if self.count == 0 {
            self.root = None;
        }

        trace!(len = self.count, "deleted entry");
        Some(Reclaimed::new(node.key, node.value, release))
    }

    /// Physically removes a node with at most one child and rebalances.
    ///
    /// Returns the node that was detached. For a node with one child, that
    /// is the child: its entry is moved up first, and its own children are
    /// reattached to `id`.
    fn splice_out(&mut self, id: NodeId) -> NodeId {
        let child = self.arena.left(id).or(self.arena.right(id));
        match child {
            None => {
                let parent = self.arena.detach(id);
                if parent.is_none() {
                    self.root = None;
                }
                self.arena.rebalance_after_delete(parent);
                id
            }
            Some(child) => {
                self.arena.swap_payload(id, child);
                self.arena.detach(child);
                let left = self.arena.cut_left(child);
                let right = self.arena.cut_right(child);
                self.arena.set_left(id, left);
                self.arena.set_right(id, right);
                self.arena.rebalance_after_delete(Some(id));
                child
            }
        }
    }

    /// Removes every entry and returns the arena's memory to the allocator.
    ///
    /// Nodes are visited in left-first level order. The parts of each entry
    /// that `release` does not drop are passed to `reclaim`. Returns how many
    /// entries were removed. The tree stays usable afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocFailed`] if the traversal buffer cannot be
    /// allocated; the tree is then left untouched.
    pub fn destroy<F>(&mut self, release: Release, mut reclaim: F) -> Result<usize>
    where
        A: Clone,
        F: FnMut(Reclaimed<K, V>),
    {
        let order = self.level_order_in(self.arena.allocator().clone())?;
        let removed = order.len();
        for id in order {
            let node = self.arena.remove(id);
            if release != Release::All {
                reclaim(Reclaimed::new(node.key, node.value, release));
            }
        }
        self.arena.reset();
        self.root = None;
        self.count = 0;

        trace!(removed, "destroyed tree");
        Ok(removed)
    }
}

#[cfg(feature = "std")]
impl<K: AsRef<[u8]>, V, A: Allocator> AvlTree<K, V, A> {
    /// Renders the tree as a Graphviz digraph, for debugging.
    pub fn to_dot(&self) -> core::result::Result<String, Box<dyn StdError>> {
        let mut data = Vec::default();

        data.write_all(b"digraph G {\n")?;
        if let Some(root) = self.root {
            for id in self.level_order_in(Global)? {
                let node = self.arena.node(id);
                writeln!(
                    data,
                    "n{} [label=\"{} | h={} bf={}\"];",
                    id.index(),
                    String::from_utf8_lossy(node.key.as_ref()).escape_default(),
                    node.height,
                    self.arena.balance_factor(Some(id)),
                )?;
                for (side, child) in [("L", node.left), ("R", node.right)] {
                    if let Some(child) = child {
                        writeln!(data, "n{} -> n{} [label=\"{}\"];", id.index(), child.index(), side)?;
                    }
                }
            }
            writeln!(data, "root -> n{};", root.index())?;
        }
        data.write_all(b"}\n")?;

        Ok(String::from_utf8(data)?)
    }
}
