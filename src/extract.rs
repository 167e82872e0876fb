//! Symbol extraction: how a key type decomposes into a symbol sequence.
//!
//! The container never inspects keys directly. Everything it needs, walking
//! down on insert or lookup, it asks of a [`SymbolExtractor`]: how many
//! symbols a key has and what the symbol at a given position is. Extractors
//! are stateless marker types, so the same key type can be decomposed
//! differently per trie ([`Elements`] over raw bytes versus [`Alphabetic`]
//! over a compact letter alphabet, for instance).
//!
//! Extraction must be pure: the same key must always yield the same length
//! and symbols, or the node a key was stored under can no longer be found.

/// Decomposes a key of type `K` into a finite symbol sequence.
pub trait SymbolExtractor<K> {
    /// Symbol produced at each position.
    type Symbol: Copy;

    /// Alphabet size when the extractor only ever emits symbols from a
    /// fixed range, `None` when unbounded. Checked against the child
    /// storage's slot bound at container construction.
    const ALPHABET: Option<usize>;

    /// Number of symbols in `key`. Zero-length keys are valid and map to
    /// the root.
    fn size(key: &K) -> usize;

    /// Symbol at `index`, which the caller keeps below `size(key)`.
    fn symbol_at(key: &K, index: usize) -> Self::Symbol;
}

// =============================================================================
// Elements
// =============================================================================

/// Identity extraction: each element of the key is one symbol.
///
/// Strings decompose into their UTF-8 bytes, vectors and slices into their
/// elements. This is the default extractor.
#[derive(Clone, Copy, Debug, Default)]
pub struct Elements;

impl SymbolExtractor<String> for Elements {
    type Symbol = u8;

    const ALPHABET: Option<usize> = None;

    #[inline]
    fn size(key: &String) -> usize {
        key.len()
    }

    #[inline]
    fn symbol_at(key: &String, index: usize) -> u8 {
        key.as_bytes()[index]
    }
}

impl<'a> SymbolExtractor<&'a str> for Elements {
    type Symbol = u8;

    const ALPHABET: Option<usize> = None;

    #[inline]
    fn size(key: &&'a str) -> usize {
        key.len()
    }

    #[inline]
    fn symbol_at(key: &&'a str, index: usize) -> u8 {
        key.as_bytes()[index]
    }
}

impl<T: Copy> SymbolExtractor<Vec<T>> for Elements {
    type Symbol = T;

    const ALPHABET: Option<usize> = None;

    #[inline]
    fn size(key: &Vec<T>) -> usize {
        key.len()
    }

    #[inline]
    fn symbol_at(key: &Vec<T>, index: usize) -> T {
        key[index]
    }
}

impl<'a, T: Copy> SymbolExtractor<&'a [T]> for Elements {
    type Symbol = T;

    const ALPHABET: Option<usize> = None;

    #[inline]
    fn size(key: &&'a [T]) -> usize {
        key.len()
    }

    #[inline]
    fn symbol_at(key: &&'a [T], index: usize) -> T {
        key[index]
    }
}

// =============================================================================
// Alphabetic
// =============================================================================

/// ASCII-letter extraction onto a compact 52-symbol alphabet.
///
/// Uppercase maps to `0..26`, lowercase to `26..52`, so the whole alphabet
/// fits an array storage of 52 slots. Any non-letter byte in a key is a
/// precondition violation and panics.
#[derive(Clone, Copy, Debug, Default)]
pub struct Alphabetic;

impl Alphabetic {
    /// Symbols emitted per key position.
    pub const LETTERS: usize = 52;

    #[inline]
    fn rank(byte: u8) -> u8 {
        match byte {
            b'A'..=b'Z' => byte - b'A',
            b'a'..=b'z' => byte - b'a' + 26,
            _ => panic!("non-alphabetic byte in key"),
        }
    }
}

impl SymbolExtractor<String> for Alphabetic {
    type Symbol = u8;

    const ALPHABET: Option<usize> = Some(Self::LETTERS);

    #[inline]
    fn size(key: &String) -> usize {
        key.len()
    }

    #[inline]
    fn symbol_at(key: &String, index: usize) -> u8 {
        Self::rank(key.as_bytes()[index])
    }
}

impl<'a> SymbolExtractor<&'a str> for Alphabetic {
    type Symbol = u8;

    const ALPHABET: Option<usize> = Some(Self::LETTERS);

    #[inline]
    fn size(key: &&'a str) -> usize {
        key.len()
    }

    #[inline]
    fn symbol_at(key: &&'a str, index: usize) -> u8 {
        Self::rank(key.as_bytes()[index])
    }
}

// =============================================================================
// Bits
// =============================================================================

/// Bitwise extraction: an unsigned integer becomes its bits, least
/// significant first, always at the type's full width.
///
/// Every key of a given type has the same symbol count, so distinct keys
/// always end at distinct nodes and no key is a proper prefix of another.
/// The alphabet is `{false, true}`, making a two-slot array storage the
/// natural pairing. Prefix scans select by low bits: scoping to the first
/// `n` symbols of `k` selects exactly the keys congruent to `k` modulo
/// `2^n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bits;

macro_rules! bits_extractor {
    ($($ty:ty)*) => {
        $(
            impl SymbolExtractor<$ty> for Bits {
                type Symbol = bool;

                const ALPHABET: Option<usize> = Some(2);

                #[inline]
                fn size(_key: &$ty) -> usize {
                    <$ty>::BITS as usize
                }

                #[inline]
                fn symbol_at(key: &$ty, index: usize) -> bool {
                    (key >> index) & 1 == 1
                }
            }
        )*
    };
}

bits_extractor!(u8 u16 u32 u64 u128 usize);
