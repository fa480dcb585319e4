use core::fmt;
use core::mem;

use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;

use crate::error::Result;

/// Stable handle to a node slot in a tree's arena.
///
/// A handle names a node object, not an entry. Rotations and deletions move
/// keys and values between nodes, so after any insert or delete a handle may
/// hold a different entry, or no entry at all.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the slot in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) height: i32,
}

enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Option<NodeId> },
}

/// Node storage plus the link primitives the balance engine is built from.
///
/// Children are owned through the tree structure; `parent` is only ever
/// followed upwards and never frees anything.
pub(crate) struct Arena<K, V, A: Allocator> {
    slots: Vec<Slot<K, V>, A>,
    free: Option<NodeId>,
}

impl<K, V, A: Allocator> Arena<K, V, A> {
    pub(crate) fn new_in(alloc: A) -> Self {
        Self {
            slots: Vec::new_in(alloc),
            free: None,
        }
    }

    pub(crate) fn allocator(&self) -> &A {
        self.slots.allocator()
    }

    /// Makes sure the next [`Arena::insert_leaf`] cannot allocate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocFailed`](crate::Error::AllocFailed), carrying
    /// the refused layout, if the allocator refuses.
    pub(crate) fn reserve_one(&mut self) -> Result<()> {
        if self.free.is_some() {
            return Ok(());
        }
        self.slots.try_reserve(1)?;
        Ok(())
    }

    /// Stores a detached leaf. Call [`Arena::reserve_one`] first.
    pub(crate) fn insert_leaf(&mut self, key: K, value: V) -> NodeId {
        let node = Node {
            key,
            value,
            parent: None,
            left: None,
            right: None,
            height: 0,
        };
        match self.free {
            Some(id) => {
                let slot = &mut self.slots[id.0];
                if let Slot::Vacant { next_free } = slot {
                    self.free = *next_free;
                }
                *slot = Slot::Occupied(node);
                id
            }
            None => {
                debug_assert!(self.slots.len() < self.slots.capacity());
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Frees a node that has already been detached from the tree.
    pub(crate) fn remove(&mut self, id: NodeId) -> Node<K, V> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(id);
                node
            }
            Slot::Vacant { .. } => unreachable!("freeing vacant slot {:?}", id),
        }
    }

    /// Drops every slot and hands the arena's buffer back to the allocator.
    /// Never allocates.
    pub(crate) fn reset(&mut self)
    where
        A: Clone,
    {
        let alloc = self.allocator().clone();
        self.slots = Vec::new_in(alloc);
        self.free = None;
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        match self.slots.get(id.0)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {:?}", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {:?}", id),
        }
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub(crate) fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    pub(crate) fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    /// Exchanges key and value between two nodes, leaving all links alone.
    pub(crate) fn swap_payload(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(hi);
        if let (Slot::Occupied(x), Slot::Occupied(y)) = (&mut head[lo], &mut tail[0]) {
            mem::swap(&mut x.key, &mut y.key);
            mem::swap(&mut x.value, &mut y.value);
        } else {
            unreachable!("payload swap with a vacant slot");
        }
    }

    pub(crate) fn set_left(&mut self, parent: NodeId, child: Option<NodeId>) {
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
        self.node_mut(parent).left = child;
    }

    pub(crate) fn set_right(&mut self, parent: NodeId, child: Option<NodeId>) {
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
        self.node_mut(parent).right = child;
    }

    pub(crate) fn cut_left(&mut self, parent: NodeId) -> Option<NodeId> {
        let child = self.node_mut(parent).left.take()?;
        self.node_mut(child).parent = None;
        Some(child)
    }

    pub(crate) fn cut_right(&mut self, parent: NodeId) -> Option<NodeId> {
        let child = self.node_mut(parent).right.take()?;
        self.node_mut(child).parent = None;
        Some(child)
    }

    /// Unlinks `id` from its parent and returns the former parent.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.node_mut(id).parent.take()?;
        let p = self.node_mut(parent);
        if p.left == Some(id) {
            p.left = None;
        } else {
            debug_assert_eq!(p.right, Some(id));
            p.right = None;
        }
        Some(parent)
    }

    /// The maximum-keyed node of the subtree rooted at `id`.
    pub(crate) fn max_in_subtree(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.right(id) {
            id = r;
        }
        id
    }
}

/// Read-only view of one node, obtained from [`AvlTree::node`](crate::AvlTree::node).
pub struct NodeRef<'t, K, V> {
    id: NodeId,
    node: &'t Node<K, V>,
    left_height: i32,
    right_height: i32,
}

impl<'t, K, V> NodeRef<'t, K, V> {
    pub(crate) fn new<A: Allocator>(arena: &'t Arena<K, V, A>, id: NodeId) -> Option<Self> {
        let node = arena.get(id)?;
        Some(Self {
            id,
            node,
            left_height: arena.height(node.left),
            right_height: arena.height(node.right),
        })
    }

    /// Handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Key currently stored in this node.
    pub fn key(&self) -> &'t K {
        &self.node.key
    }

    /// Value currently stored in this node.
    pub fn value(&self) -> &'t V {
        &self.node.value
    }

    /// Parent handle; `None` at the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// Left child, holding keys not greater than this one.
    pub fn left(&self) -> Option<NodeId> {
        self.node.left
    }

    /// Right child.
    pub fn right(&self) -> Option<NodeId> {
        self.node.right
    }

    /// Cached height; a leaf has height 0.
    pub fn height(&self) -> i32 {
        self.node.height
    }

    /// Left subtree height minus right subtree height.
    pub fn balance_factor(&self) -> i32 {
        self.left_height - self.right_height
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", &self.node.key)
            .field("value", &self.node.value)
            .field("parent", &self.node.parent)
            .field("left", &self.node.left)
            .field("right", &self.node.right)
            .field("height", &self.node.height)
            .finish()
    }
}
