//! Depth-first and breadth-first traversals.
//!
//! Every traversal returns one [`Visit`] per entry in a buffer allocated from
//! the tree's own allocator, sized exactly to [`AvlTree::len`].

use core::fmt;

use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;

use super::node::{Arena, NodeId};
use super::AvlTree;
use crate::error::{Error, Result};
use crate::options::{Direction, Order, Projection};

/// Output of a traversal: one projected item per entry.
pub type Traversal<'t, K, V, A> = Vec<Visit<'t, K, V>, &'t A>;

/// One node as seen through a [`Projection`].
pub enum Visit<'t, K, V> {
    /// Handle of the visited node.
    Node(NodeId),
    /// Key of the visited node.
    Key(&'t K),
    /// Value of the visited node.
    Value(&'t V),
}

impl<'t, K, V> Visit<'t, K, V> {
    /// The handle, if this visit was projected as [`Projection::Node`].
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Visit::Node(id) => Some(id),
            _ => None,
        }
    }

    /// The key, if this visit was projected as [`Projection::Key`].
    pub fn key(&self) -> Option<&'t K> {
        match *self {
            Visit::Key(key) => Some(key),
            _ => None,
        }
    }

    /// The value, if this visit was projected as [`Projection::Value`].
    pub fn value(&self) -> Option<&'t V> {
        match *self {
            Visit::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<K, V> Clone for Visit<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Visit<'_, K, V> {}

impl<K: PartialEq, V: PartialEq> PartialEq for Visit<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Visit::Node(a), Visit::Node(b)) => a == b,
            (Visit::Key(a), Visit::Key(b)) => a == b,
            (Visit::Value(a), Visit::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Visit<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visit::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Visit::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Visit::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl<K, V, A: Allocator> Arena<K, V, A> {
    pub(crate) fn project(&self, id: NodeId, projection: Projection) -> Visit<'_, K, V> {
        match projection {
            Projection::Node => Visit::Node(id),
            Projection::Key => Visit::Key(&self.node(id).key),
            Projection::Value => Visit::Value(&self.node(id).value),
        }
    }

    // Recursion depth is bounded by the tree height, which the balance
    // invariant keeps logarithmic.
    fn depth_first_into<'t, B: Allocator>(
        &'t self,
        id: Option<NodeId>,
        order: Order,
        projection: Projection,
        out: &mut Vec<Visit<'t, K, V>, B>,
    ) {
        let Some(id) = id else {
            return;
        };
        let (left, right) = (self.left(id), self.right(id));
        if order == Order::PreOrder {
            out.push(self.project(id, projection));
        }
        self.depth_first_into(left, order, projection, out);
        if order == Order::InOrder {
            out.push(self.project(id, projection));
        }
        self.depth_first_into(right, order, projection, out);
        if order == Order::PostOrder {
            out.push(self.project(id, projection));
        }
    }

    fn enqueue_children(&self, id: NodeId, direction: Direction) -> [Option<NodeId>; 2] {
        let (left, right) = (self.left(id), self.right(id));
        match direction {
            Direction::LeftFirst => [left, right],
            Direction::RightFirst => [right, left],
        }
    }
}

impl<K, V, A: Allocator> AvlTree<K, V, A> {
    fn output_buffer(&self) -> Result<Traversal<'_, K, V, A>> {
        if self.root.is_none() {
            return Err(Error::Empty);
        }
        let mut out = Vec::new_in(self.arena.allocator());
        out.try_reserve_exact(self.count)?;
        Ok(out)
    }

    /// Visits every entry depth-first in the given order.
    ///
    /// In-order output is sorted by key; equal keys come out newest first,
    /// because every duplicate is inserted to the left of the older ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for an empty tree and [`Error::AllocFailed`]
    /// if the output buffer cannot be allocated.
    pub fn depth_first(
        &self,
        order: Order,
        projection: Projection,
    ) -> Result<Traversal<'_, K, V, A>> {
        let mut out = self.output_buffer()?;
        self.arena
            .depth_first_into(self.root, order, projection, &mut out);
        debug_assert_eq!(out.len(), self.count);
        Ok(out)
    }

    /// Visits every entry level by level.
    ///
    /// The output buffer doubles as the queue: children are appended behind
    /// the slot being visited, and that slot is then overwritten with its
    /// projection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for an empty tree and [`Error::AllocFailed`]
    /// if the output buffer cannot be allocated.
    pub fn breadth_first(
        &self,
        direction: Direction,
        projection: Projection,
    ) -> Result<Traversal<'_, K, V, A>> {
        let mut out = self.output_buffer()?;
        if let Some(root) = self.root {
            out.push(Visit::Node(root));
        }
        let mut i = 0;
        while i < out.len() {
            if let Visit::Node(id) = out[i] {
                for child in self.arena.enqueue_children(id, direction).into_iter().flatten() {
                    out.push(Visit::Node(child));
                }
                out[i] = self.arena.project(id, projection);
            }
            i += 1;
        }
        debug_assert_eq!(out.len(), self.count);
        Ok(out)
    }

    /// Left-first level order of node handles, for teardown.
    pub(crate) fn level_order_in<B: Allocator>(&self, alloc: B) -> Result<Vec<NodeId, B>> {
        let mut order = Vec::new_in(alloc);
        order.try_reserve_exact(self.count)?;
        order.extend(self.root);
        let mut i = 0;
        while i < order.len() {
            let id = order[i];
            order.extend(
                self.arena
                    .enqueue_children(id, Direction::LeftFirst)
                    .into_iter()
                    .flatten(),
            );
            i += 1;
        }
        Ok(order)
    }
}
