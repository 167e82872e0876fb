//! Cursors and iterators over the postorder value walk.
//!
//! Every traversal form here follows the same order: postorder restricted
//! to valued nodes, so an entry is yielded only after all of its own
//! extensions, and scoped walks yield the prefix node itself last. The
//! forms differ in protocol and borrow:
//!
//! - [`Cursor`]: the primitive. Explicitly advanced, copyable, comparable;
//!   any number coexist over one trie. Exhausted cursors compare equal to
//!   each other regardless of origin.
//! - [`CursorMut`]: exclusive cursor that can rewrite values in place.
//! - [`Iter`] / [`IterMut`] / [`IntoIter`]: standard `Iterator` adapters
//!   over the same walk, for `&Trie`, `&mut Trie`, and `Trie`.
//!
//! Touching a key or advancing through an exhausted cursor is a
//! precondition violation and panics; domain-level absence (an empty trie,
//! a missing prefix) just starts the cursor exhausted.

use std::fmt;
use std::marker::PhantomData;

use crate::extract::{Elements, SymbolExtractor};
use crate::node::{Node, NodeId};
use crate::storage::{ChildStorage, SortedChildren};
use crate::Trie;

// =============================================================================
// Cursor
// =============================================================================

/// Read cursor over the postorder value walk of a trie or prefix subtree.
///
/// Either positioned on an entry or exhausted. `Copy`, so taking a
/// snapshot of a position is a plain assignment; advancing one copy never
/// moves another.
pub struct Cursor<'a, K, V, E = Elements, C = SortedChildren<<E as SymbolExtractor<K>>::Symbol>>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    trie: &'a Trie<K, V, E, C>,
    scope: NodeId,
    current: NodeId,
}

impl<'a, K, V, E, C> Cursor<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    pub(crate) fn scoped(trie: &'a Trie<K, V, E, C>, scope: NodeId) -> Self {
        Self {
            trie,
            scope,
            current: trie.first_valued(scope),
        }
    }

    pub(crate) fn exhausted(trie: &'a Trie<K, V, E, C>) -> Self {
        Self {
            trie,
            scope: NodeId::NULL,
            current: NodeId::NULL,
        }
    }

    /// True once the walk is over (or never had an entry to begin with).
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.current.is_null()
    }

    fn positioned(&self, op: &str) -> &'a Node<K, V, C> {
        assert!(!self.current.is_null(), "{op} on an exhausted cursor");
        self.trie.node(self.current)
    }

    /// Key of the current entry, as captured at insertion.
    ///
    /// Panics when the cursor is exhausted.
    pub fn key(&self) -> &'a K {
        self.positioned("key()")
            .key
            .as_ref()
            .expect("a positioned cursor rests on a keyed node")
    }

    /// Value of the current entry.
    ///
    /// Panics when the cursor is exhausted.
    pub fn value(&self) -> &'a V {
        self.positioned("value()")
            .value
            .as_ref()
            .expect("a positioned cursor rests on a valued node")
    }

    /// Key and value of the current entry.
    ///
    /// Panics when the cursor is exhausted.
    pub fn key_value(&self) -> (&'a K, &'a V) {
        let node = self.positioned("key_value()");
        (
            node.key
                .as_ref()
                .expect("a positioned cursor rests on a keyed node"),
            node.value
                .as_ref()
                .expect("a positioned cursor rests on a valued node"),
        )
    }

    /// Moves to the next entry of the walk, or to the exhausted state.
    ///
    /// Panics when the cursor is already exhausted.
    pub fn advance(&mut self) {
        assert!(!self.current.is_null(), "advance() on an exhausted cursor");
        self.current = self.trie.postorder_next(self.current, self.scope);
    }
}

impl<'a, K, V, E, C> Clone for Cursor<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V, E, C> Copy for Cursor<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
}

impl<'a, K, V, E, C> PartialEq for Cursor<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    /// Exhausted cursors are all equal, whatever trie or scope they came
    /// from; positioned cursors are equal when they sit on the same node
    /// of the same trie.
    fn eq(&self, other: &Self) -> bool {
        if self.current.is_null() && other.current.is_null() {
            return true;
        }
        std::ptr::eq(self.trie, other.trie) && self.current == other.current
    }
}

impl<'a, K, V, E, C> Eq for Cursor<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
}

impl<'a, K, V, E, C> fmt::Debug for Cursor<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exhausted() {
            f.write_str("Cursor(exhausted)")
        } else {
            write!(f, "Cursor({:?})", self.current)
        }
    }
}

// =============================================================================
// CursorMut
// =============================================================================

/// Cursor holding its trie exclusively, able to rewrite values in place.
///
/// Only values are writable through it; the structure is not, so the
/// cursor's position stays valid for as long as it lives.
pub struct CursorMut<'a, K, V, E = Elements, C = SortedChildren<<E as SymbolExtractor<K>>::Symbol>>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    trie: &'a mut Trie<K, V, E, C>,
    scope: NodeId,
    current: NodeId,
}

impl<'a, K, V, E, C> CursorMut<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    pub(crate) fn scoped(trie: &'a mut Trie<K, V, E, C>, scope: NodeId) -> Self {
        let current = trie.first_valued(scope);
        Self {
            trie,
            scope,
            current,
        }
    }

    /// True once the walk is over.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.current.is_null()
    }

    fn positioned(&self, op: &str) -> NodeId {
        assert!(!self.current.is_null(), "{op} on an exhausted cursor");
        self.current
    }

    /// Key of the current entry.
    ///
    /// Panics when the cursor is exhausted.
    pub fn key(&self) -> &K {
        self.trie
            .node(self.positioned("key()"))
            .key
            .as_ref()
            .expect("a positioned cursor rests on a keyed node")
    }

    /// Value of the current entry.
    ///
    /// Panics when the cursor is exhausted.
    pub fn value(&self) -> &V {
        self.trie
            .node(self.positioned("value()"))
            .value
            .as_ref()
            .expect("a positioned cursor rests on a valued node")
    }

    /// Mutable value of the current entry.
    ///
    /// Panics when the cursor is exhausted.
    pub fn value_mut(&mut self) -> &mut V {
        let id = self.positioned("value_mut()");
        self.trie.nodes[id.index()]
            .value
            .as_mut()
            .expect("a positioned cursor rests on a valued node")
    }

    /// Key and value of the current entry.
    ///
    /// Panics when the cursor is exhausted.
    pub fn key_value(&self) -> (&K, &V) {
        let node = self.trie.node(self.positioned("key_value()"));
        (
            node.key
                .as_ref()
                .expect("a positioned cursor rests on a keyed node"),
            node.value
                .as_ref()
                .expect("a positioned cursor rests on a valued node"),
        )
    }

    /// Moves to the next entry of the walk, or to the exhausted state.
    ///
    /// Panics when the cursor is already exhausted.
    pub fn advance(&mut self) {
        let id = self.positioned("advance()");
        self.current = self.trie.postorder_next(id, self.scope);
    }
}

// =============================================================================
// Iter
// =============================================================================

/// Iterator over `(&key, &value)` in postorder, whole-tree or scoped.
pub struct Iter<'a, K, V, E = Elements, C = SortedChildren<<E as SymbolExtractor<K>>::Symbol>>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    trie: &'a Trie<K, V, E, C>,
    scope: NodeId,
    next: NodeId,
}

impl<'a, K, V, E, C> Iter<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    pub(crate) fn scoped(trie: &'a Trie<K, V, E, C>, scope: NodeId) -> Self {
        Self {
            trie,
            scope,
            next: trie.first_valued(scope),
        }
    }

    pub(crate) fn exhausted(trie: &'a Trie<K, V, E, C>) -> Self {
        Self {
            trie,
            scope: NodeId::NULL,
            next: NodeId::NULL,
        }
    }
}

impl<'a, K, V, E, C> Iterator for Iter<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_null() {
            return None;
        }
        let node = self.trie.node(self.next);
        self.next = self.trie.postorder_next(self.next, self.scope);
        Some((
            node.key.as_ref().expect("a walked node carries its key"),
            node.value.as_ref().expect("a walked node carries a value"),
        ))
    }
}

// =============================================================================
// IterMut
// =============================================================================

/// Iterator over `(&key, &mut value)` in postorder.
///
/// The walk is fixed up front, then entries are handed out straight from
/// the arena, so borrows of distinct entries can be held simultaneously.
pub struct IterMut<'a, K, V, E = Elements, C = SortedChildren<<E as SymbolExtractor<K>>::Symbol>>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    /// Arena base. Valid for the whole borrow: no operation reachable
    /// while this iterator lives can grow, shrink, or move the arena.
    base: *mut Node<K, V, C>,
    order: std::vec::IntoIter<NodeId>,
    _trie: PhantomData<&'a mut Trie<K, V, E, C>>,
}

impl<'a, K, V, E, C> IterMut<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    pub(crate) fn new(trie: &'a mut Trie<K, V, E, C>) -> Self {
        let mut order = Vec::with_capacity(trie.count);
        let mut current = trie.first_valued(NodeId::ROOT);
        while !current.is_null() {
            order.push(current);
            current = trie.postorder_next(current, NodeId::ROOT);
        }
        Self {
            base: trie.nodes.as_mut_ptr(),
            order: order.into_iter(),
            _trie: PhantomData,
        }
    }
}

impl<'a, K, V, E, C> Iterator for IterMut<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        // SAFETY: `base` was taken from the exclusive borrow this iterator
        // stands in for (`_trie`), and the arena cannot be touched through
        // any other path while it lives. `order` holds in-bounds indices
        // of valued nodes with no duplicates, so each yielded reference
        // points at a distinct node and never aliases an earlier one.
        let node: &'a mut Node<K, V, C> = unsafe { &mut *self.base.add(id.index()) };
        Some((
            node.key.as_ref().expect("a walked node carries its key"),
            node.value.as_mut().expect("a walked node carries a value"),
        ))
    }
}

// The iterator is the exclusive borrow it was built from; it crosses
// threads exactly when that borrow would.
unsafe impl<'a, K, V, E, C> Send for IterMut<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
    &'a mut Trie<K, V, E, C>: Send,
{
}

unsafe impl<'a, K, V, E, C> Sync for IterMut<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
    &'a mut Trie<K, V, E, C>: Sync,
{
}

// =============================================================================
// IntoIter
// =============================================================================

/// Owning iterator over `(key, value)` in postorder.
pub struct IntoIter<K, V, E = Elements, C = SortedChildren<<E as SymbolExtractor<K>>::Symbol>>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    trie: Trie<K, V, E, C>,
    next: NodeId,
}

impl<K, V, E, C> Iterator for IntoIter<K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_null() {
            return None;
        }
        let id = self.next;
        // Later steps of the walk never look back at a visited node, so
        // its key and value can be moved out.
        self.next = self.trie.postorder_next(id, NodeId::ROOT);
        let node = &mut self.trie.nodes[id.index()];
        Some((
            node.key.take().expect("a walked node carries its key"),
            node.value.take().expect("a walked node carries a value"),
        ))
    }
}

impl<K, V, E, C> IntoIterator for Trie<K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, E, C>;

    fn into_iter(self) -> IntoIter<K, V, E, C> {
        let next = self.first_valued(NodeId::ROOT);
        IntoIter { trie: self, next }
    }
}

impl<'a, K, V, E, C> IntoIterator for &'a Trie<K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, E, C>;

    fn into_iter(self) -> Iter<'a, K, V, E, C> {
        self.iter()
    }
}

impl<'a, K, V, E, C> IntoIterator for &'a mut Trie<K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, E, C>;

    fn into_iter(self) -> IterMut<'a, K, V, E, C> {
        self.iter_mut()
    }
}
