use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use wabi_avl::avltree_map::Entry;
use wabi_avl::comparator::{Compare, less_by, natural};
use wabi_avl::{AVLTreeMap, Cursor, Error};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys are drawn from a range smaller than `TEST_SIZE` to force collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

fn entries_strategy(size: impl Into<prop::collection::SizeRange>) -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((key_strategy(), value_strategy()), size)
}

/// Walks the map from `begin` to `end` through cursors.
fn walk_forward<K: Clone, V: Clone, C>(map: &AVLTreeMap<K, V, C>) -> Vec<(K, V)> {
    let mut out = Vec::new();
    let mut cursor = map.begin();
    while !cursor.is_end() {
        let (k, v) = map.get_at(cursor).expect("cursor from a walk must be valid");
        out.push((k.clone(), v.clone()));
        cursor = map.cursor_next(cursor).expect("non-end cursor can advance");
    }
    out
}

/// Walks the map from `end` back to `begin` through cursors.
fn walk_backward<K: Clone, V: Clone, C>(map: &AVLTreeMap<K, V, C>) -> Vec<(K, V)> {
    let mut out = Vec::new();
    let mut cursor = map.end();
    while let Ok(prev) = map.cursor_prev(cursor) {
        let (k, v) = map.get_at(prev).expect("cursor from a walk must be valid");
        out.push((k.clone(), v.clone()));
        cursor = prev;
    }
    out
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    EraseAt(i64),
    Get(i64),
    At(i64),
    Count(i64),
    GetOrInsertDefault(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::EraseAt),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::At),
        1 => key_strategy().prop_map(MapOp::Count),
        1 => key_strategy().prop_map(MapOp::GetOrInsertDefault),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core operations against BTreeMap ────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on both AVLTreeMap and BTreeMap and
    /// asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in prop::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut avl: AVLTreeMap<i64, i64> = AVLTreeMap::new();
        let mut bt: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match *op {
                MapOp::Insert(k, v) => {
                    let expected = !bt.contains_key(&k);
                    bt.entry(k).or_insert(v);
                    let (cursor, inserted) = avl.insert(k, v);
                    prop_assert_eq!(inserted, expected, "insert({}, {})", k, v);
                    prop_assert_eq!(avl.get_at(cursor), Ok((&k, &bt[&k])));
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(avl.remove(&k), bt.remove(&k), "remove({})", k);
                }
                MapOp::EraseAt(k) => {
                    let cursor = avl.find(&k);
                    let expected = bt.remove_entry(&k).ok_or(Error::InvalidCursor);
                    prop_assert_eq!(avl.erase(cursor), expected, "erase(find({}))", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(avl.get(&k), bt.get(&k), "get({})", k);
                }
                MapOp::At(k) => {
                    prop_assert_eq!(avl.at(&k), bt.get(&k).ok_or(Error::NotFound), "at({})", k);
                }
                MapOp::Count(k) => {
                    prop_assert_eq!(avl.count(&k), usize::from(bt.contains_key(&k)), "count({})", k);
                }
                MapOp::GetOrInsertDefault(k) => {
                    let expected = *bt.entry(k).or_default();
                    prop_assert_eq!(*avl.get_or_insert_default(k), expected, "get_or_insert_default({})", k);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(avl.first_key_value(), bt.first_key_value());
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(avl.last_key_value(), bt.last_key_value());
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(avl.pop_first(), bt.pop_first());
                }
                MapOp::PopLast => {
                    prop_assert_eq!(avl.pop_last(), bt.pop_last());
                }
            }
            prop_assert_eq!(avl.len(), bt.len());
        }

        let avl_entries: Vec<_> = avl.iter().map(|(k, v)| (*k, *v)).collect();
        let bt_entries: Vec<_> = bt.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(avl_entries, bt_entries);
    }

    /// Every iteration flavour visits entries in key order and agrees with its length.
    #[test]
    fn iteration_matches_btreemap(entries in entries_strategy(0..TEST_SIZE)) {
        let avl: AVLTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt = BTreeMap::new();
        for &(k, v) in &entries {
            bt.entry(k).or_insert(v);
        }
        let expected: Vec<(i64, i64)> = bt.into_iter().collect();

        prop_assert_eq!(avl.iter().len(), expected.len());
        prop_assert_eq!(avl.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(
            avl.iter().rev().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            expected.iter().rev().copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(avl.keys().copied().collect::<Vec<_>>(), expected.iter().map(|e| e.0).collect::<Vec<_>>());
        prop_assert_eq!(avl.values().copied().collect::<Vec<_>>(), expected.iter().map(|e| e.1).collect::<Vec<_>>());
        prop_assert_eq!(walk_forward(&avl), expected.clone());
        prop_assert_eq!(walk_backward(&avl), expected.iter().rev().copied().collect::<Vec<_>>());
        prop_assert_eq!(avl.into_iter().collect::<Vec<_>>(), expected);
    }

    /// Mutating through `iter_mut` and `values_mut` reaches every value exactly once.
    #[test]
    fn iter_mut_matches_btreemap(entries in entries_strategy(0..TEST_SIZE)) {
        let mut avl: AVLTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt: BTreeMap<i64, i64> = BTreeMap::new();
        for &(k, v) in &entries {
            bt.entry(k).or_insert(v);
        }

        for (k, v) in avl.iter_mut() {
            *v = v.wrapping_add(*k);
        }
        for (k, v) in &mut bt {
            *v = v.wrapping_add(*k);
        }
        for v in avl.values_mut().rev() {
            *v = v.wrapping_mul(3);
        }
        for v in bt.values_mut() {
            *v = v.wrapping_mul(3);
        }

        prop_assert_eq!(avl.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), bt.into_iter().collect::<Vec<_>>());
    }

    /// The height never exceeds the AVL bound for the number of entries.
    #[test]
    fn height_stays_logarithmic(entries in entries_strategy(1..TEST_SIZE)) {
        let avl: AVLTreeMap<i64, i64> = entries.into_iter().collect();
        // Minimum node count of an AVL tree of height h: N(h) = N(h-1) + N(h-2) + 1.
        let (mut below, mut at) = (0usize, 1usize);
        for _ in 1..avl.height() {
            (below, at) = (at, at + below + 1);
        }
        prop_assert!(avl.len() >= at, "height {} with only {} entries", avl.height(), avl.len());
    }

    /// Inserting distinct keys and erasing all of them in any order empties the map.
    #[test]
    fn erase_everything_in_any_order(
        order in prop::collection::btree_set(key_strategy(), 0..500)
            .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    ) {
        let mut avl = AVLTreeMap::new();
        for &k in &order {
            prop_assert!(avl.insert(k, -k).1);
        }
        let cursors: Vec<Cursor> = order.iter().map(|k| avl.find(k)).collect();

        for (k, cursor) in order.iter().zip(cursors.iter().rev()) {
            prop_assert_eq!(avl.remove_entry(k), Some((*k, -*k)));
            // Cursors to still-present keys keep working; erased ones are rejected.
            if let Ok((key, _)) = avl.get_at(*cursor) {
                prop_assert!(avl.contains_key(key));
            }
        }

        prop_assert!(avl.is_empty());
        prop_assert_eq!(avl.len(), 0);
        prop_assert_eq!(avl.height(), 0);
        prop_assert_eq!(avl.begin(), avl.end());
        for cursor in cursors {
            prop_assert_eq!(avl.get_at(cursor), Err(Error::InvalidCursor));
        }
    }

    /// A clone is deep: mutating either side never shows through to the other.
    #[test]
    fn clone_is_independent(entries in entries_strategy(1..TEST_SIZE), extra in key_strategy()) {
        let mut original: AVLTreeMap<i64, i64> = entries.iter().copied().collect();
        let snapshot: Vec<(i64, i64)> = original.iter().map(|(k, v)| (*k, *v)).collect();

        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);
        prop_assert_eq!(copy.height(), original.height());

        let first = copy.first_key_value().map(|(k, _)| *k).unwrap();
        copy.remove(&first);
        copy.insert(extra + 5_000, 0);
        *copy.values_mut().next().unwrap() = 42;
        prop_assert_eq!(original.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), snapshot.clone());

        original.clear();
        prop_assert_eq!(copy.len(), snapshot.len());
        prop_assert!(copy.contains_key(&(extra + 5_000)));
    }

    /// The entry API agrees with BTreeMap's.
    #[test]
    fn entry_api_matches_btreemap(keys in prop::collection::vec(key_strategy(), 0..TEST_SIZE)) {
        let mut avl: AVLTreeMap<i64, u32> = AVLTreeMap::new();
        let mut bt: BTreeMap<i64, u32> = BTreeMap::new();

        for (i, &k) in keys.iter().enumerate() {
            if i % 7 == 6 {
                let removed = match avl.entry(k) {
                    Entry::Occupied(o) => Some(o.remove()),
                    Entry::Vacant(_) => None,
                };
                prop_assert_eq!(removed, bt.remove(&k));
            } else {
                avl.entry(k).and_modify(|c| *c += 1).or_insert(1);
                bt.entry(k).and_modify(|c| *c += 1).or_insert(1);
            }
        }

        prop_assert_eq!(avl.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), bt.into_iter().collect::<Vec<_>>());
    }

    /// Equal contents hash equally regardless of insertion order.
    #[test]
    fn hash_consistent_for_equal_maps(entries in entries_strategy(0..TEST_SIZE)) {
        use std::hash::{BuildHasher, RandomState};

        let forward: AVLTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut backward: AVLTreeMap<i64, i64> = AVLTreeMap::new();
        for &(k, v) in &entries {
            // Keep the first value for each key, like `forward` did.
            backward.entry(k).or_insert(v);
        }
        let backward = backward.into_iter().rev().collect::<AVLTreeMap<_, _>>();

        prop_assert_eq!(&forward, &backward);
        let state = RandomState::new();
        prop_assert_eq!(state.hash_one(&forward), state.hash_one(&backward));
    }
}

// ─── Example scenarios ───────────────────────────────────────────────────────

#[test]
fn in_order_traversal_is_sorted() {
    let mut map = AVLTreeMap::new();
    for k in [5, 3, 8, 1, 4] {
        map.insert(k, ());
    }
    assert_eq!(walk_forward(&map).into_iter().map(|(k, ())| k).collect::<Vec<_>>(), [1, 3, 4, 5, 8]);
    assert_eq!(map.len(), 5);
}

#[test]
fn ascending_inserts_produce_a_perfect_tree() {
    let mut map = AVLTreeMap::new();
    for k in 1..=7 {
        map.insert(k, k);
        assert!(map.height() <= 3);
    }
    assert_eq!(map.height(), 3);
    assert_eq!(map.len(), 7);
}

#[test]
fn duplicate_insert_keeps_existing_value() {
    let mut map = AVLTreeMap::new();
    let (first, inserted) = map.insert("a", 1);
    assert!(inserted);

    let (second, inserted) = map.insert("a", 2);
    assert!(!inserted);
    assert_eq!(second, first);
    assert_eq!(map.get_at(second), Ok((&"a", &1)));
    assert_eq!(map.len(), 1);
}

#[test]
fn erase_by_cursor_removes_the_key() {
    let mut map = AVLTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    let cursor = map.find(&20);
    assert_eq!(map.erase(cursor), Ok((20, 'b')));

    assert!(map.find(&20).is_end());
    assert_eq!(map.find(&20), map.end());
    assert_eq!(map.count(&20), 0);
    assert_eq!(map.len(), 2);
}

#[test]
fn at_reports_missing_key() {
    let map = AVLTreeMap::from([("present", 1)]);
    assert_eq!(map.at(&"missing"), Err(Error::NotFound));
    assert_eq!(map.at(&"present"), Ok(&1));
}

#[test]
fn erase_rejects_foreign_cursor() {
    let mut map = AVLTreeMap::from([(1, 1), (2, 2)]);
    let other = AVLTreeMap::from([(1, 1), (2, 2)]);
    assert_eq!(map.erase(other.begin()), Err(Error::InvalidCursor));
    assert_eq!(map.len(), 2);

    // A clone is another map as well.
    let copy = map.clone();
    assert_eq!(map.erase(copy.begin()), Err(Error::InvalidCursor));
}

// ─── Cursor rules ────────────────────────────────────────────────────────────

#[test]
fn cursor_boundaries() {
    let map = AVLTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);

    assert_eq!(map.cursor_prev(map.begin()), Err(Error::InvalidCursor));
    assert_eq!(map.cursor_next(map.end()), Err(Error::InvalidCursor));
    assert_eq!(map.get_at(map.end()), Err(Error::InvalidCursor));

    let last = map.cursor_prev(map.end()).unwrap();
    assert_eq!(map.get_at(last), Ok((&3, &'c')));
    assert_eq!(map.cursor_next(last), Ok(map.end()));
}

#[test]
fn cursors_survive_unrelated_mutation() {
    let mut map: AVLTreeMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
    let kept = map.find(&50);

    // Removing everything else forces many rotations and successor relinks.
    for k in (0..100).filter(|&k| k != 50) {
        map.remove(&k);
        assert_eq!(map.get_at(kept), Ok((&50, &50)));
    }
    for k in 100..200 {
        map.insert(k, k);
    }
    assert_eq!(map.get_at(kept), Ok((&50, &50)));
    assert_eq!(map.cursor_prev(kept), Err(Error::InvalidCursor));
    assert_eq!(map.get_at(map.cursor_next(kept).unwrap()), Ok((&100, &100)));
}

#[test]
fn clear_invalidates_cursors() {
    let mut map = AVLTreeMap::from([(1, 'a'), (2, 'b')]);
    let first = map.begin();
    let end = map.end();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.get_at(first), Err(Error::InvalidCursor));
    assert_eq!(map.begin(), end);

    // Reinserting the same key reuses storage but not the cursor.
    let (fresh, _) = map.insert(1, 'z');
    assert_ne!(fresh, first);
    assert_eq!(map.get_at(first), Err(Error::InvalidCursor));
    assert_eq!(map.get_at(fresh), Ok((&1, &'z')));
}

#[test]
fn get_at_mut_updates_value() {
    let mut map = AVLTreeMap::from([("k", 1)]);
    let cursor = map.find(&"k");
    *map.get_at_mut(cursor).unwrap().1 = 7;
    assert_eq!(map[&"k"], 7);
    assert_eq!(map.get_at_mut(map.end()).map(|(_, v)| *v), Err(Error::InvalidCursor));
}

// ─── Copy semantics ──────────────────────────────────────────────────────────

#[test]
fn clone_from_is_independent() {
    let source = AVLTreeMap::from([(1, String::from("one")), (2, String::from("two"))]);
    let mut target = AVLTreeMap::from([(3, String::from("three"))]);

    target.clone_from(&source);
    assert_eq!(target, source);

    target.get_mut(&1).unwrap().push('!');
    target.remove(&2);
    assert_eq!(source[&1], "one");
    assert_eq!(source.len(), 2);
}

/// Value whose `clone` panics for one poisoned payload.
#[derive(Debug, PartialEq)]
struct Fragile(i32);

const POISON: i32 = 120;

impl Clone for Fragile {
    fn clone(&self) -> Self {
        assert_ne!(self.0, POISON, "cloning poisoned value");
        Fragile(self.0)
    }
}

#[test]
fn failed_clone_from_leaves_target_intact() {
    let source: AVLTreeMap<i32, Fragile> = (0..40).map(|k| (k, Fragile(100 + k))).collect();
    let mut target: AVLTreeMap<i32, Fragile> = (0..10).map(|k| (k * 10, Fragile(k))).collect();
    let before: Vec<(i32, i32)> = target.iter().map(|(k, v)| (*k, v.0)).collect();
    let cursor = target.find(&30);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| target.clone_from(&source)));
    assert!(outcome.is_err());

    assert_eq!(target.len(), 10);
    assert_eq!(target.iter().map(|(k, v)| (*k, v.0)).collect::<Vec<_>>(), before);
    assert_eq!(target.get_at(cursor), Ok((&30, &Fragile(3))));
    assert_eq!(source.len(), 40);
}

// ─── Comparators ─────────────────────────────────────────────────────────────

#[test]
fn reversed_natural_order() {
    let mut map = AVLTreeMap::with_cmp(natural().rev());
    map.extend([(1, 'a'), (2, 'b'), (3, 'c')]);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
    assert_eq!(map.first_key_value(), Some((&3, &'c')));
    assert_eq!(map.get(&2), Some(&'b'));
}

#[test]
fn predicate_comparator_defines_equivalence() {
    // Keys are equivalent when they agree modulo 10.
    let mut map = AVLTreeMap::with_cmp(less_by(|a: &u32, b: &u32| a % 10 < b % 10));
    assert!(map.insert(13, "thirteen").1);
    assert!(!map.insert(3, "three").1);
    assert!(map.insert(25, "twenty-five").1);

    assert_eq!(map.get_key_value(&43), Some((&13, &"thirteen")));
    assert_eq!(map.count(&5), 1);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [13, 25]);
}

#[test]
fn borrowed_lookup_with_borrowing_comparator() {
    let mut map: AVLTreeMap<String, usize, _> = AVLTreeMap::with_cmp(natural::<str>().borrowing());
    map.insert(String::from("apple"), 5);
    map.insert(String::from("banana"), 6);

    assert_eq!(map.get("apple"), Some(&5));
    assert_eq!(map.at("cherry"), Err(Error::NotFound));
    assert_eq!(map["banana"], 6);
}

// ─── Indexing ────────────────────────────────────────────────────────────────

#[test]
fn index_mut_updates_existing_entry() {
    let mut map = AVLTreeMap::from([(1, 10)]);
    map[&1] += 5;
    assert_eq!(map[&1], 15);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_mut_panics_on_missing_key() {
    let mut map = AVLTreeMap::from([(1, 10)]);
    map[&2] = 0;
}

#[test]
fn get_or_insert_default_inserts_once() {
    let mut map: AVLTreeMap<&str, Vec<u8>> = AVLTreeMap::new();
    map.get_or_insert_default("a").push(1);
    map.get_or_insert_default("a").push(2);
    assert_eq!(map[&"a"], [1, 2]);
    assert_eq!(map.len(), 1);
}

#[test]
fn debug_output_is_a_map() {
    let map = AVLTreeMap::from([(2, "b"), (1, "a")]);
    assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
}
