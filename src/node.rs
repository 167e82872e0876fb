//! Trie vertices and the arena handles that link them.
//!
//! Nodes live in a single `Vec` owned by the container; parent and child
//! links are 32-bit arena indices rather than pointers, so a deep clone of
//! the arena clones the whole link structure for free and the parent
//! back-reference can never dangle.

use crate::storage::ChildStorage;

/// Index of a node in a trie's arena.
///
/// Index 0 is always the root. The all-ones value is the null handle, used
/// both for the root's parent link and for the exhausted-cursor sentinel.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);
    pub(crate) const ROOT: NodeId = NodeId(0);

    /// Create an id from an arena position.
    ///
    /// # Panics
    /// Panics if the position is >= 2^32 - 1.
    pub(crate) fn from_usize(index: usize) -> Self {
        assert!(index < u32::MAX as usize, "node arena index too large");
        NodeId(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            f.write_str("NodeId(null)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// One trie vertex.
///
/// `value` and `key` are set together when the node is the terminus of an
/// insert; path nodes created on the way to a deeper terminus carry neither.
/// `symbol` is the symbol under which the parent's storage reaches this
/// node, `None` only for the root.
#[derive(Clone)]
pub(crate) struct Node<K, V, C: ChildStorage> {
    pub(crate) key: Option<K>,
    pub(crate) value: Option<V>,
    pub(crate) children: C,
    pub(crate) parent: NodeId,
    pub(crate) symbol: Option<C::Symbol>,
}

impl<K, V, C: ChildStorage> Node<K, V, C> {
    pub(crate) fn root() -> Self {
        Self {
            key: None,
            value: None,
            children: C::default(),
            parent: NodeId::NULL,
            symbol: None,
        }
    }

    pub(crate) fn child_of(parent: NodeId, symbol: C::Symbol) -> Self {
        Self {
            key: None,
            value: None,
            children: C::default(),
            parent,
            symbol: Some(symbol),
        }
    }

    /// Symbol this node hangs under. Must not be called on the root.
    #[inline]
    pub(crate) fn symbol(&self) -> C::Symbol {
        self.symbol.expect("non-root node has an incoming symbol")
    }
}
