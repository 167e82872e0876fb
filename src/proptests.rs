use super::*;

use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

fn validate_trie<K, V, E, C>(trie: &Trie<K, V, E, C>)
where
    E: SymbolExtractor<K>,
    C: ChildStorage<Symbol = E::Symbol>,
{
    assert!(!trie.nodes.is_empty(), "arena must hold the root");
    let root = trie.node(NodeId::ROOT);
    assert!(root.parent.is_null(), "root has no parent");
    assert!(root.symbol.is_none(), "root has no incoming symbol");

    let mut reachable = 0usize;
    let mut valued = 0usize;
    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
        reachable += 1;
        let node = trie.node(id);
        if node.value.is_some() {
            valued += 1;
            assert!(node.key.is_some(), "a valued node must keep its key");
        }
        let mut listed = 0usize;
        let mut child = node.children.first();
        while let Some(c) = child {
            listed += 1;
            assert_eq!(trie.node(c).parent, id, "child must point back at its parent");
            assert!(trie.node(c).symbol.is_some(), "non-root node needs a symbol");
            stack.push(c);
            child = node.children.next_after(trie.node(c).symbol());
        }
        assert_eq!(
            listed,
            node.children.len(),
            "first/next_after must cover the whole storage"
        );
    }
    assert_eq!(reachable, trie.nodes.len(), "every arena node must be reachable");
    assert_eq!(valued, trie.count, "entry count must match valued nodes");
}

/// Iteration-order oracle: lexicographic by symbols, except that a key
/// walks before every proper prefix of itself.
fn postorder_cmp(a: &[u8], b: &[u8]) -> Ordering {
    let common = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    if common == a.len() && common == b.len() {
        Ordering::Equal
    } else if common == a.len() {
        Ordering::Greater
    } else if common == b.len() {
        Ordering::Less
    } else {
        a[common].cmp(&b[common])
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    SlotFill(Vec<u8>, u64),
    SlotPeek(Vec<u8>),
    Get(Vec<u8>),
    Clear,
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A narrow alphabet with short keys maximizes shared prefixes, which
    // is where the walk logic earns its keep; a sprinkle of wide-alphabet
    // keys covers sparse fanout too.
    prop_oneof![
        3 => prop::collection::vec(0u8..4, 0..=12),
        1 => prop::collection::vec(any::<u8>(), 0..=32),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        45 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        15 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::SlotFill(k, v)),
        10 => key.clone().prop_map(Op::SlotPeek),
        28 => key.clone().prop_map(Op::Get),
        2 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=400)
}

fn apply_ops<C>(
    trie: &mut Trie<Vec<u8>, u64, Elements, C>,
    model: &mut BTreeMap<Vec<u8>, u64>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    C: ChildStorage<Symbol = u8>,
{
    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let old_t = trie.insert(key.clone(), value);
                let old_m = model.insert(key, value);
                prop_assert_eq!(old_t, old_m);
            }
            Op::SlotFill(key, value) => {
                let old_t = trie.slot(key.clone()).replace(value);
                let old_m = model.insert(key, value);
                prop_assert_eq!(old_t, old_m);
            }
            Op::SlotPeek(key) => {
                // Peeking creates path nodes but never an entry.
                let got_t = *trie.slot(key.clone());
                let got_m = model.get(&key).copied();
                prop_assert_eq!(got_t, got_m);
            }
            Op::Get(key) => {
                let got_t = trie.get(&key).copied();
                let got_m = model.get(&key).copied();
                prop_assert_eq!(got_t, got_m);
                prop_assert_eq!(trie.contains_key(&key), model.contains_key(&key));
            }
            Op::Clear => {
                trie.clear();
                model.clear();
            }
        }
        prop_assert_eq!(trie.len(), model.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_sorted(ops in ops_strategy()) {
        let mut t: Trie<Vec<u8>, u64> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        apply_ops(&mut t, &mut m, ops)?;

        validate_trie(&t);
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let mut expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        expected.sort_by(|(a, _), (b, _)| postorder_cmp(a, b));
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_equivalence_hashed(ops in ops_strategy()) {
        let mut t: Trie<Vec<u8>, u64, Elements, HashedChildren<u8>> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        apply_ops(&mut t, &mut m, ops)?;

        validate_trie(&t);

        // Sibling order is unspecified, so compare as sets and check the
        // one order guarantee that survives: no entry before one of its
        // own extensions.
        let walked: Vec<Vec<u8>> = t.iter().map(|(k, _)| k.clone()).collect();
        for i in 0..walked.len() {
            for j in (i + 1)..walked.len() {
                prop_assert!(
                    !(walked[j].len() > walked[i].len() && walked[j].starts_with(&walked[i])),
                    "an entry walked before its extension: {:?} before {:?}",
                    walked[i],
                    walked[j]
                );
            }
        }

        let mut got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        got.sort();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_prefix_scan_matches_model(
        keys in prop::collection::vec(key_strategy(), 0..=64),
        prefix in key_strategy(),
    ) {
        let mut t: Trie<Vec<u8>, u64> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        for (i, k) in keys.into_iter().enumerate() {
            t.insert(k.clone(), i as u64);
            m.insert(k, i as u64);
        }

        let got: Vec<(Vec<u8>, u64)> = t
            .prefix_scan(&prefix)
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        let mut expected: Vec<(Vec<u8>, u64)> = m
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        expected.sort_by(|(a, _), (b, _)| postorder_cmp(a, b));
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_cursor_agrees_with_iter(keys in prop::collection::vec(key_strategy(), 0..=64)) {
        let mut t: Trie<Vec<u8>, u64> = Trie::new();
        for (i, k) in keys.into_iter().enumerate() {
            t.insert(k, i as u64);
        }

        let mut via_cursor = Vec::new();
        let mut cursor = t.cursor();
        while !cursor.is_exhausted() {
            via_cursor.push((cursor.key().clone(), *cursor.value()));
            cursor.advance();
        }

        let via_iter: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(via_iter.len(), t.len());
        prop_assert_eq!(via_cursor, via_iter);
    }

    #[test]
    fn prop_clone_detached(
        keys in prop::collection::vec(key_strategy(), 1..=32),
        extra in key_strategy(),
    ) {
        let mut t: Trie<Vec<u8>, u64> = Trie::new();
        for (i, k) in keys.into_iter().enumerate() {
            t.insert(k, i as u64);
        }
        let before: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();

        let mut copy = t.clone();
        copy.insert(extra, 999);
        for (_, v) in copy.iter_mut() {
            *v += 1;
        }

        let after: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(before, after);
        validate_trie(&t);
        validate_trie(&copy);
    }

    #[test]
    fn prop_bits_partial_prefix_selects_congruent_keys(
        keys in prop::collection::btree_set(any::<u16>(), 0..=48),
        pivot in any::<u16>(),
        bits in 0usize..=16,
    ) {
        let mut t: Trie<u16, u32, Bits> = Trie::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(*k, i as u32);
        }

        let got: Vec<u16> = t.prefix_scan_partial(&pivot, bits).map(|(&k, _)| k).collect();

        // Sharing the first `bits` low-order bits is congruence mod 2^bits.
        let modulus = 1u32 << bits;
        let mut expected: Vec<u16> = keys
            .iter()
            .copied()
            .filter(|k| u32::from(*k) % modulus == u32::from(pivot) % modulus)
            .collect();
        expected.sort_by(|a, b| postorder_cmp(&bit_symbols(*a), &bit_symbols(*b)));
        prop_assert_eq!(got, expected);
    }
}

fn bit_symbols(key: u16) -> Vec<u8> {
    (0..u16::BITS).map(|i| ((key >> i) & 1) as u8).collect()
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
    ];

    // The walk is a function of the key set, not of insertion order.
    let mut expected_keys = keys.clone();
    expected_keys.sort_by(|a, b| postorder_cmp(a, b));

    for_each_permutation(&keys, |perm| {
        let mut t: Trie<Vec<u8>, u64> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(k.clone(), v), m.insert(k, v));
        }

        validate_trie(&t);
        let got_keys: Vec<Vec<u8>> = t.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(got_keys, expected_keys);
        for (k, v) in &m {
            assert_eq!(t.get(k), Some(v));
        }
    });
}

#[test]
fn exhaustive_slot_build_matches_insert_build() {
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
    ];

    let mut by_insert: Trie<Vec<u8>, u64> = Trie::new();
    for (i, k) in keys.iter().enumerate() {
        by_insert.insert(k.clone(), i as u64);
    }
    let reference: Vec<(Vec<u8>, u64)> = by_insert.iter().map(|(k, v)| (k.clone(), *v)).collect();

    for_each_permutation(&keys, |perm| {
        let mut by_slot: Trie<Vec<u8>, u64> = Trie::new();
        for k in perm {
            let v = keys.iter().position(|x| x == &k).unwrap() as u64;
            *by_slot.slot(k) = Some(v);
        }

        validate_trie(&by_slot);
        assert_eq!(by_slot.len(), by_insert.len());
        let got: Vec<(Vec<u8>, u64)> = by_slot.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, reference);
    });
}

#[test]
fn postorder_cmp_orders_extensions_first() {
    assert_eq!(postorder_cmp(b"aa", b"a"), Ordering::Less);
    assert_eq!(postorder_cmp(b"a", b"aa"), Ordering::Greater);
    assert_eq!(postorder_cmp(b"ab", b"ac"), Ordering::Less);
    assert_eq!(postorder_cmp(b"a", b"a"), Ordering::Equal);
    assert_eq!(postorder_cmp(b"", b"a"), Ordering::Greater);
}
