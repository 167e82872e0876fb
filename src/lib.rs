//! # symtrie
//!
//! A prefix tree ("trie") mapping sequence-shaped keys to values, with
//! postorder, value-only iteration over the whole tree or any prefix
//! subtree.
//!
//! Keys decompose into symbols through a pluggable [`SymbolExtractor`], and
//! each node maps symbols to children through a pluggable [`ChildStorage`],
//! so one container type covers byte strings, element sequences, and
//! bit-decomposed integers, with ordered-map, hash-map, or fixed-array
//! child layouts.
//!
//! ## Example
//!
//! ```rust
//! use symtrie::Trie;
//!
//! let mut trie: Trie<String, u32> = Trie::new();
//! trie.insert("car".to_string(), 1);
//! trie.insert("carpet".to_string(), 2);
//! trie.insert("dog".to_string(), 3);
//!
//! assert_eq!(trie.get(&"carpet".to_string()), Some(&2));
//!
//! // Iteration is postorder over valued nodes: every entry comes out
//! // after all of its own extensions.
//! let under_car: Vec<u32> = trie
//!     .prefix_scan(&"car".to_string())
//!     .map(|(_, v)| *v)
//!     .collect();
//! assert_eq!(under_car, [2, 1]);
//! ```
//!
//! ## Design
//!
//! Nodes live in a `Vec` arena owned by the container and link to each
//! other by 32-bit ids, so cloning the container is a plain arena clone and
//! a cursor is nothing more than a shared borrow plus two ids. There is no
//! removal operation: nodes accumulate until the whole tree is destroyed
//! together, which is what lets prefix-scoped cursors hold positions
//! without any reference counting.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extract;
pub mod iter;
mod node;
pub mod storage;

pub use extract::{Alphabetic, Bits, Elements, SymbolExtractor};
pub use iter::{Cursor, CursorMut, IntoIter, Iter, IterMut};
pub use storage::{ArrayChildren, ChildStorage, HashedChildren, SortedChildren, SymbolIndex};

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use smallvec::SmallVec;

use node::{Node, NodeId};

// =============================================================================
// Trie
// =============================================================================

/// A prefix tree mapping sequence-shaped keys to values.
///
/// Features:
/// - Pluggable symbol extraction (`E`) and per-node child storage (`C`)
/// - Postorder, value-only iteration, scopable to any prefix subtree
/// - Independent read cursors with an explicit advance protocol
/// - Arena-backed nodes addressed by 32-bit ids; deep clone is arena clone
///
/// The defaults decompose keys into their elements and store children in
/// ascending symbol order.
pub struct Trie<K, V, E = Elements, C = SortedChildren<<E as SymbolExtractor<K>>::Symbol>>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    /// Node arena. Index 0 is the root and always exists.
    pub(crate) nodes: Vec<Node<K, V, C>>,
    /// Number of valued nodes.
    pub(crate) count: usize,
    _extract: PhantomData<E>,
}

impl<K, V, E, C> Trie<K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    /// Creates an empty trie.
    ///
    /// Panics when the extractor declares an alphabet wider than the child
    /// storage's slot bound, so a mispaired `Alphabetic`/`ArrayChildren`
    /// combination fails at construction rather than mid-insert.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty trie with arena capacity for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        if let (Some(alphabet), Some(bound)) = (E::ALPHABET, C::BOUND) {
            assert!(
                alphabet <= bound,
                "extractor alphabet of {alphabet} symbols exceeds storage bound of {bound} slots"
            );
        }
        let mut arena = Vec::with_capacity(nodes.max(1));
        arena.push(Node::root());
        Self {
            nodes: arena,
            count: 0,
            _extract: PhantomData,
        }
    }

    /// Number of entries (keys with a value).
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no key has a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Destroys the whole tree, leaving a fresh root.
    ///
    /// This is the only way short of dropping the container to shed nodes;
    /// individual entries are never removed.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::root());
        self.count = 0;
    }

    /// Structural counters gathered by a full walk of the arena.
    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats {
            nodes: self.nodes.len(),
            ..TrieStats::default()
        };
        let mut stack: SmallVec<[(NodeId, usize); 32]> = SmallVec::new();
        stack.push((NodeId::ROOT, 0));
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            stats.max_depth = stats.max_depth.max(depth);
            if node.value.is_some() {
                stats.entries += 1;
            }
            if node.key.is_some() {
                stats.keyed += 1;
            }
            if node.children.is_empty() {
                stats.leaves += 1;
            }
            let mut child = node.children.first();
            while let Some(c) = child {
                stack.push((c, depth + 1));
                child = node.children.next_after(self.node(c).symbol());
            }
        }
        debug_assert_eq!(stats.entries, self.count, "entry count out of sync");
        stats
    }

    // =========================================================================
    // Key operations
    // =========================================================================

    /// Inserts `key` with `value`, returning the value it replaces.
    ///
    /// Creates one node per missing symbol along the path; existing nodes
    /// are reused. The terminal node keeps the literal `key` passed here.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let id = self.walk_or_create(&key);
        let node = &mut self.nodes[id.index()];
        node.key = Some(key);
        let previous = node.value.replace(value);
        if previous.is_none() {
            self.count += 1;
        }
        previous
    }

    /// Value stored under `key`, if any. Never creates nodes.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = self.locate(key, E::size(key))?;
        self.node(id).value.as_ref()
    }

    /// Mutable value stored under `key`, if any. Never creates nodes.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.locate(key, E::size(key))?;
        self.nodes[id.index()].value.as_mut()
    }

    /// True when `key` has a value.
    ///
    /// A key whose path exists only as the interior of longer keys has no
    /// value and is not contained.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Write handle for `key`'s value cell, the indexing-operator analog.
    ///
    /// Walks and creates the path like [`insert`](Self::insert) and stores
    /// the literal key at the terminal node, but assigns no value; the
    /// returned [`Slot`] dereferences to the node's `Option<V>` for the
    /// caller to read or fill. Note that even a pure read through a slot
    /// creates the path's nodes.
    pub fn slot(&mut self, key: K) -> Slot<'_, K, V, E, C> {
        let id = self.walk_or_create(&key);
        let node = &mut self.nodes[id.index()];
        node.key = Some(key);
        let was_filled = node.value.is_some();
        Slot {
            trie: self,
            node: id,
            was_filled,
        }
    }

    /// Walks `symbols` symbols of `key` without creating nodes.
    fn locate(&self, key: &K, symbols: usize) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for i in 0..symbols {
            current = self.node(current).children.get(E::symbol_at(key, i))?;
        }
        Some(current)
    }

    /// Walks `key` in full, creating a node per missing symbol.
    fn walk_or_create(&mut self, key: &K) -> NodeId {
        let mut current = NodeId::ROOT;
        for i in 0..E::size(key) {
            let symbol = E::symbol_at(key, i);
            current = match self.node(current).children.get(symbol) {
                Some(child) => child,
                None => {
                    let child = NodeId::from_usize(self.nodes.len());
                    self.nodes.push(Node::child_of(current, symbol));
                    self.nodes[current.index()].children.insert(symbol, child);
                    child
                }
            };
        }
        current
    }

    // =========================================================================
    // Traversal surface
    // =========================================================================

    /// Cursor positioned on the first entry of the postorder walk, or
    /// exhausted when the trie is empty.
    pub fn cursor(&self) -> Cursor<'_, K, V, E, C> {
        Cursor::scoped(self, NodeId::ROOT)
    }

    /// The exhausted cursor every finished traversal compares equal to.
    pub fn end(&self) -> Cursor<'_, K, V, E, C> {
        Cursor::exhausted(self)
    }

    /// Cursor over the whole tree that can mutate values in place.
    ///
    /// Holds the trie exclusively; structural mutation through it is not
    /// possible, so its position never goes stale.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, E, C> {
        CursorMut::scoped(self, NodeId::ROOT)
    }

    /// Iterator over `(&key, &value)` in postorder.
    pub fn iter(&self) -> Iter<'_, K, V, E, C> {
        Iter::scoped(self, NodeId::ROOT)
    }

    /// Iterator over `(&key, &mut value)` in postorder.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, E, C> {
        IterMut::new(self)
    }

    /// Cursor confined to the subtree of keys extending `prefix`.
    ///
    /// The prefix node itself, when valued, is yielded last. An absent
    /// prefix gives a cursor that is already exhausted.
    pub fn prefix_cursor(&self, prefix: &K) -> Cursor<'_, K, V, E, C> {
        self.prefix_cursor_partial(prefix, E::size(prefix))
    }

    /// Like [`prefix_cursor`](Self::prefix_cursor), considering only the
    /// first `symbols` symbols of `prefix`.
    ///
    /// This admits prefixes finer than whole keys, e.g. a single bit of an
    /// integer key under [`Bits`]. Panics when `symbols` exceeds the
    /// prefix's symbol count.
    pub fn prefix_cursor_partial(&self, prefix: &K, symbols: usize) -> Cursor<'_, K, V, E, C> {
        match self.prefix_scope(prefix, symbols) {
            Some(scope) => Cursor::scoped(self, scope),
            None => Cursor::exhausted(self),
        }
    }

    /// Iterator over the entries whose keys extend `prefix`, postorder.
    pub fn prefix_scan(&self, prefix: &K) -> Iter<'_, K, V, E, C> {
        self.prefix_scan_partial(prefix, E::size(prefix))
    }

    /// Like [`prefix_scan`](Self::prefix_scan), considering only the first
    /// `symbols` symbols of `prefix`.
    pub fn prefix_scan_partial(&self, prefix: &K, symbols: usize) -> Iter<'_, K, V, E, C> {
        match self.prefix_scope(prefix, symbols) {
            Some(scope) => Iter::scoped(self, scope),
            None => Iter::exhausted(self),
        }
    }

    fn prefix_scope(&self, prefix: &K, symbols: usize) -> Option<NodeId> {
        let size = E::size(prefix);
        assert!(
            symbols <= size,
            "prefix of {symbols} symbols exceeds the key's {size}"
        );
        self.locate(prefix, symbols)
    }

    // =========================================================================
    // Postorder walk core
    // =========================================================================

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V, C> {
        &self.nodes[id.index()]
    }

    /// First valued node of the postorder walk of `scope`'s subtree, or
    /// null when the subtree holds no value.
    ///
    /// Dives along first children to the bottom, then climbs: an unvalued
    /// node hands over to the subtree of its next sibling, or to its
    /// parent once no siblings remain. The walk never leaves `scope`.
    pub(crate) fn first_valued(&self, scope: NodeId) -> NodeId {
        debug_assert!(!scope.is_null());
        let mut current = scope;
        loop {
            while let Some(child) = self.node(current).children.first() {
                current = child;
            }
            loop {
                if self.node(current).value.is_some() {
                    return current;
                }
                if current == scope {
                    return NodeId::NULL;
                }
                let parent = self.node(current).parent;
                match self
                    .node(parent)
                    .children
                    .next_after(self.node(current).symbol())
                {
                    Some(sibling) => {
                        current = sibling;
                        break;
                    }
                    None => current = parent,
                }
            }
        }
    }

    /// Valued node following `current` in the postorder walk bounded by
    /// `scope`, or null when the walk is over.
    ///
    /// From `current`: the subtrees of its later siblings in storage
    /// order, then the parent itself if valued, then the same procedure
    /// one level up. Reaching `scope` ends the walk; this, not the global
    /// root, is what confines subtree iteration.
    pub(crate) fn postorder_next(&self, current: NodeId, scope: NodeId) -> NodeId {
        debug_assert!(!current.is_null() && !scope.is_null());
        let mut current = current;
        loop {
            if current == scope {
                return NodeId::NULL;
            }
            let parent = self.node(current).parent;
            let mut sibling = self
                .node(parent)
                .children
                .next_after(self.node(current).symbol());
            while let Some(next) = sibling {
                let found = self.first_valued(next);
                if !found.is_null() {
                    return found;
                }
                sibling = self
                    .node(parent)
                    .children
                    .next_after(self.node(next).symbol());
            }
            if self.node(parent).value.is_some() {
                return parent;
            }
            current = parent;
        }
    }
}

impl<K, V, E, C> Default for Trie<K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E, C> Clone for Trie<K, V, E, C>
where
    K: Clone,
    V: Clone,
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol> + Clone,
{
    /// Deep clone: every node's key, value, and child storage. Links are
    /// arena indices, so they denote the clone's own nodes without any
    /// rebinding pass, and the clone shares no structure with the source.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            count: self.count,
            _extract: PhantomData,
        }
    }
}

impl<K, V, E, C> fmt::Debug for Trie<K, V, E, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Slot
// =============================================================================

/// Write handle for one key's value cell, returned by [`Trie::slot`].
///
/// Dereferences to the node's `Option<V>`: reading peeks at the value,
/// assigning `Some` fills the entry, assigning `None` clears it. The
/// container's entry count is reconciled when the handle drops.
pub struct Slot<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    trie: &'a mut Trie<K, V, E, C>,
    node: NodeId,
    was_filled: bool,
}

impl<'a, K, V, E, C> Deref for Slot<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    type Target = Option<V>;

    #[inline]
    fn deref(&self) -> &Option<V> {
        &self.trie.nodes[self.node.index()].value
    }
}

impl<'a, K, V, E, C> DerefMut for Slot<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut Option<V> {
        &mut self.trie.nodes[self.node.index()].value
    }
}

impl<'a, K, V, E, C> Drop for Slot<'a, K, V, E, C>
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    fn drop(&mut self) {
        let filled = self.trie.nodes[self.node.index()].value.is_some();
        match (self.was_filled, filled) {
            (false, true) => self.trie.count += 1,
            (true, false) => self.trie.count -= 1,
            _ => {}
        }
    }
}

// =============================================================================
// TrieStats
// =============================================================================

/// Structural counters for one trie, produced by [`Trie::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Arena nodes, root included.
    pub nodes: usize,
    /// Nodes carrying a value.
    pub entries: usize,
    /// Nodes carrying a key (entries plus value-less slots).
    pub keyed: usize,
    /// Nodes with no children.
    pub leaves: usize,
    /// Symbol depth of the deepest node; the root sits at depth 0.
    pub max_depth: usize,
}


#[cfg(test)]
mod proptests;
