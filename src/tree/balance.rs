//! Height bookkeeping, rotations and the two rebalancing walks.
//!
//! Rotations never move a pivot node within the tree. The pivot trades its
//! key and value with its heavier child, and the surrounding subtrees are
//! relinked so that the in-order sequence is unchanged. A node's link from
//! its parent therefore stays put, and the tree root never changes identity.

use allocator_api2::alloc::Allocator;
use tracing::trace;

use super::node::{Arena, NodeId};

impl<K, V, A: Allocator> Arena<K, V, A> {
    /// Height of a subtree, `-1` for an empty one.
    pub(crate) fn height(&self, id: Option<NodeId>) -> i32 {
        id.map_or(-1, |id| self.node(id).height)
    }

    pub(crate) fn balance_factor(&self, id: Option<NodeId>) -> i32 {
        match id {
            Some(id) => {
                let node = self.node(id);
                self.height(node.left) - self.height(node.right)
            }
            None => 0,
        }
    }

    pub(crate) fn update_height(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            let node = self.node(id);
            let height = self.height(node.left).max(self.height(node.right)) + 1;
            self.node_mut(id).height = height;
        }
    }

    /// Lifts the left child's entry into `pivot`.
    ///
    /// ```text
    ///        P(p)              P(l)
    ///       /    \            /    \
    ///     L(l)    r   =>    ll     L(p)
    ///    /   \                    /   \
    ///  ll     lr                lr     r
    /// ```
    ///
    /// Letters in parentheses are payloads; `P` and `L` are the node objects.
    pub(crate) fn rotate_right(&mut self, pivot: NodeId) {
        let Some(left) = self.left(pivot) else {
            debug_assert!(false, "right rotation without a left child");
            return;
        };
        trace!(pivot = pivot.index(), "rotate right");
        self.swap_payload(pivot, left);

        let r = self.cut_right(pivot);
        let l = self.cut_left(pivot);
        let ll = self.cut_left(left);
        let lr = self.cut_right(left);

        self.set_right(left, r);
        self.set_left(left, lr);
        self.set_right(pivot, l);
        self.set_left(pivot, ll);

        self.update_height(Some(left));
        self.update_height(Some(pivot));
    }

    /// Mirror of [`Arena::rotate_right`].
    pub(crate) fn rotate_left(&mut self, pivot: NodeId) {
        let Some(right) = self.right(pivot) else {
            debug_assert!(false, "left rotation without a right child");
            return;
        };
        trace!(pivot = pivot.index(), "rotate left");
        self.swap_payload(pivot, right);

        let r = self.cut_right(pivot);
        let l = self.cut_left(pivot);
        let rl = self.cut_left(right);
        let rr = self.cut_right(right);

        self.set_left(right, l);
        self.set_right(right, rl);
        self.set_left(pivot, r);
        self.set_right(pivot, rr);

        self.update_height(Some(right));
        self.update_height(Some(pivot));
    }

    /// Applies the single or double rotation a ±2 balance factor calls for.
    pub(crate) fn rebalance_at(&mut self, id: NodeId) {
        match self.balance_factor(Some(id)) {
            2 => {
                let left = self.left(id);
                if self.balance_factor(left) < 0 {
                    if let Some(left) = left {
                        self.rotate_left(left);
                    }
                }
                self.rotate_right(id);
            }
            -2 => {
                let right = self.right(id);
                if self.balance_factor(right) > 0 {
                    if let Some(right) = right {
                        self.rotate_right(right);
                    }
                }
                self.rotate_left(id);
            }
            _ => {}
        }
    }

    /// Refreshes heights above a new leaf and fixes the first unbalanced
    /// ancestor. One rotation point is enough after an insertion.
    pub(crate) fn rebalance_after_insert(&mut self, leaf: NodeId) {
        let mut cur = self.parent(leaf);
        while let Some(id) = cur {
            if self.balance_factor(Some(id)).abs() >= 2 {
                self.rebalance_at(id);
                return;
            }
            self.update_height(Some(id));
            cur = self.parent(id);
        }
    }

    /// Walks from the spliced-out node's former parent to the root, rotating
    /// wherever needed. A deletion can unbalance several levels.
    pub(crate) fn rebalance_after_delete(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            if self.balance_factor(Some(id)).abs() >= 2 {
                self.rebalance_at(id);
            } else {
                self.update_height(Some(id));
            }
            cur = self.parent(id);
        }
    }
}
