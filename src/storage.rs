//! Child-storage strategies: how one node maps symbols to children.
//!
//! Three interchangeable layouts with different order/cost/memory
//! trade-offs:
//!
//! - [`SortedChildren`]: `BTreeMap`, ascending symbol order, O(log n) ops.
//! - [`HashedChildren`]: `HashMap`, O(1) average ops, iteration order
//!   unspecified and allowed to change across inserts.
//! - [`ArrayChildren`]: one slot per symbol of a declared alphabet, O(1)
//!   ops, ascending order, O(alphabet) bytes per node regardless of
//!   occupancy.
//!
//! Traversal never walks children through an iterator object; it chains
//! [`ChildStorage::first`] and [`ChildStorage::next_after`], which is what
//! lets a cursor resume a sibling scan from nothing but the symbol it came
//! from.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Bound;

use crate::node::NodeId;

/// Per-node mapping from symbol to child.
///
/// Iteration order (the order induced by `first`/`next_after`) must be
/// stable while the storage is not mutated; inserting may reorder it only
/// for strategies whose docs say so.
pub trait ChildStorage: Default {
    /// Symbol type keying the children.
    type Symbol: Copy;

    /// Slot capacity when fixed at compile time, `None` for unbounded
    /// strategies. Checked against the extractor's declared alphabet at
    /// container construction.
    const BOUND: Option<usize>;

    /// Child reached through `symbol`, if present.
    fn get(&self, symbol: Self::Symbol) -> Option<NodeId>;

    /// Record `child` under `symbol`.
    ///
    /// Path creation inserts each symbol at most once per node; a second
    /// insert under the same symbol is a logic error.
    fn insert(&mut self, symbol: Self::Symbol, child: NodeId);

    /// First child in iteration order.
    fn first(&self) -> Option<NodeId>;

    /// Child following `symbol` in iteration order.
    ///
    /// `symbol` must be present; this is the "find the position, resume
    /// after it" primitive of the postorder sibling scan.
    fn next_after(&self, symbol: Self::Symbol) -> Option<NodeId>;

    /// Number of children present.
    fn len(&self) -> usize;

    /// True when the node has no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// SortedChildren
// =============================================================================

/// Ordered-map storage: children iterate in ascending symbol order.
#[derive(Clone)]
pub struct SortedChildren<S> {
    map: BTreeMap<S, NodeId>,
}

impl<S> Default for SortedChildren<S> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<S: Copy + Ord> ChildStorage for SortedChildren<S> {
    type Symbol = S;

    const BOUND: Option<usize> = None;

    #[inline]
    fn get(&self, symbol: S) -> Option<NodeId> {
        self.map.get(&symbol).copied()
    }

    fn insert(&mut self, symbol: S, child: NodeId) {
        let prev = self.map.insert(symbol, child);
        debug_assert!(prev.is_none(), "symbol inserted twice into one node");
    }

    #[inline]
    fn first(&self) -> Option<NodeId> {
        self.map.first_key_value().map(|(_, &id)| id)
    }

    fn next_after(&self, symbol: S) -> Option<NodeId> {
        self.map
            .range((Bound::Excluded(symbol), Bound::Unbounded))
            .next()
            .map(|(_, &id)| id)
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }
}

// =============================================================================
// HashedChildren
// =============================================================================

/// Hash-map storage: O(1) average access, unspecified iteration order.
///
/// The order is stable between mutations, which is all the traversal
/// needs: live cursors hold the trie borrowed, so no insert can land
/// while a sibling scan is in flight.
#[derive(Clone)]
pub struct HashedChildren<S> {
    map: HashMap<S, NodeId>,
}

impl<S> Default for HashedChildren<S> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<S: Copy + Eq + Hash> ChildStorage for HashedChildren<S> {
    type Symbol = S;

    const BOUND: Option<usize> = None;

    #[inline]
    fn get(&self, symbol: S) -> Option<NodeId> {
        self.map.get(&symbol).copied()
    }

    fn insert(&mut self, symbol: S, child: NodeId) {
        let prev = self.map.insert(symbol, child);
        debug_assert!(prev.is_none(), "symbol inserted twice into one node");
    }

    #[inline]
    fn first(&self) -> Option<NodeId> {
        self.map.values().next().copied()
    }

    fn next_after(&self, symbol: S) -> Option<NodeId> {
        let mut entries = self.map.iter();
        for (&sym, _) in entries.by_ref() {
            if sym == symbol {
                return entries.next().map(|(_, &id)| id);
            }
        }
        None
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }
}

// =============================================================================
// ArrayChildren
// =============================================================================

/// Dense, order-preserving mapping from a symbol to an array slot.
///
/// Required by [`ArrayChildren`]. `slot` must be injective and monotone in
/// the symbol's natural order so that slot order equals symbol order.
pub trait SymbolIndex: Copy {
    /// Array slot for this symbol.
    fn slot(self) -> usize;
}

impl SymbolIndex for u8 {
    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl SymbolIndex for u16 {
    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl SymbolIndex for bool {
    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Fixed-array storage: one slot per symbol of an `N`-symbol alphabet.
///
/// O(1) access and ascending iteration order (same order as
/// [`SortedChildren`]), paid for with `N` slots per node regardless of how
/// many are occupied. A symbol whose slot is `>= N` is a precondition
/// violation and panics; it is never silently dropped.
#[derive(Clone)]
pub struct ArrayChildren<S, const N: usize> {
    slots: [NodeId; N],
    len: u32,
    _marker: PhantomData<S>,
}

impl<S, const N: usize> Default for ArrayChildren<S, N> {
    fn default() -> Self {
        Self {
            slots: [NodeId::NULL; N],
            len: 0,
            _marker: PhantomData,
        }
    }
}

impl<S: SymbolIndex, const N: usize> ArrayChildren<S, N> {
    #[inline]
    fn index(symbol: S) -> usize {
        let slot = symbol.slot();
        assert!(
            slot < N,
            "symbol slot {slot} out of range for array storage of {N} slots"
        );
        slot
    }
}

impl<S: SymbolIndex, const N: usize> ChildStorage for ArrayChildren<S, N> {
    type Symbol = S;

    const BOUND: Option<usize> = Some(N);

    #[inline]
    fn get(&self, symbol: S) -> Option<NodeId> {
        let id = self.slots[Self::index(symbol)];
        (!id.is_null()).then_some(id)
    }

    fn insert(&mut self, symbol: S, child: NodeId) {
        let slot = Self::index(symbol);
        debug_assert!(
            self.slots[slot].is_null(),
            "symbol inserted twice into one node"
        );
        self.slots[slot] = child;
        self.len += 1;
    }

    fn first(&self) -> Option<NodeId> {
        self.slots.iter().copied().find(|id| !id.is_null())
    }

    fn next_after(&self, symbol: S) -> Option<NodeId> {
        let from = Self::index(symbol) + 1;
        self.slots[from..].iter().copied().find(|id| !id.is_null())
    }

    #[inline]
    fn len(&self) -> usize {
        self.len as usize
    }
}
