use arbitrary::{self, unstructured::Unstructured, Arbitrary};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;

use std::{collections::BTreeMap, iter::repeat, ops::Bound};

#[test]
fn test_oset() {
    let seed: u64 = random();
    // let seed: u64 = 14907982542159196592;
    println!("test_oset {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: OSet<u8> = OSet::new();
    let mut btmap: BTreeMap<u8, usize> = BTreeMap::new();

    let mut counts = [0_usize; 11];

    for _i in 0..20_000 {
        let bytes = rng.gen::<[u8; 8]>();
        let mut uns = Unstructured::new(&bytes);

        let op = uns.arbitrary().unwrap();
        // println!("op -- {:?}", op);
        match op {
            Op::Len => {
                counts[0] += 1;
                assert_eq!(index.len(), btmap.values().sum::<usize>());
            }
            Op::IsEmpty => {
                counts[1] += 1;
                assert_eq!(index.is_empty(), btmap.is_empty());
            }
            Op::Insert(key) => {
                counts[2] += 1;
                index.insert(key);
                *btmap.entry(key).or_insert(0) += 1;
            }
            Op::Delete(key) => {
                counts[3] += 1;
                let in_model = match btmap.get_mut(&key) {
                    Some(n) if *n > 1 => {
                        *n -= 1;
                        true
                    }
                    Some(_) => {
                        btmap.remove(&key);
                        true
                    }
                    None => false,
                };
                match index.delete(&key) {
                    Some(k) => {
                        assert_eq!(k, key);
                        assert!(in_model, "delete no key {} in btree", key);
                    }
                    None => assert!(!in_model, "delete no key {} in oset", key),
                }
            }
            Op::Validate => {
                counts[4] += 1;
                index.validate().unwrap();
            }
            Op::Search(key) => {
                counts[5] += 1;
                match (index.search(&key), btmap.contains_key(&key)) {
                    (None, false) => (),
                    (Some(k), true) => assert_eq!(*k, key),
                    (None, true) => panic!("search no key {} in oset", key),
                    (Some(_), false) => panic!("search no key {} in btree", key),
                }
            }
            Op::Min => {
                counts[6] += 1;
                assert_eq!(index.min(), btmap.keys().next());
            }
            Op::Max => {
                counts[7] += 1;
                assert_eq!(index.max(), btmap.keys().next_back());
            }
            Op::Successor(key) => {
                counts[8] += 1;
                let next = btmap
                    .range((Bound::Excluded(key), Bound::Unbounded))
                    .map(|(k, _)| *k)
                    .next();
                match index.successor(&key) {
                    None if !btmap.contains_key(&key) => (),
                    None => assert_eq!(next, None, "for key {}", key),
                    Some(&s) if s == key => {
                        // structural successor landed on a duplicate.
                        let n = btmap.get(&key).copied().unwrap_or(0);
                        assert!(n > 1, "for key {}", key);
                    }
                    Some(&s) => assert_eq!(Some(s), next, "for key {}", key),
                }
            }
            Op::ToText => {
                counts[9] += 1;
                assert_eq!(text_keys(index.to_text()), model_keys(&btmap));
            }
            Op::Extend(keys) => {
                counts[10] += 1;
                for key in keys.iter() {
                    *btmap.entry(*key).or_insert(0) += 1;
                }
                index.extend(keys);
            }
        }
    }

    index.validate().unwrap();
    let n = btmap.values().sum::<usize>();
    assert_eq!(index.len(), n);
    assert_eq!(text_keys(index.to_text()), model_keys(&btmap));

    println!("counts {:?} len:{}/{}", counts, index.len(), n);
}

#[test]
fn test_empty() {
    let mut index: OSet<u64> = OSet::default();

    assert_eq!(index.len(), 0);
    assert_eq!(index.is_empty(), true);
    assert_eq!(index.search(&1), None);
    assert_eq!(index.min(), None);
    assert_eq!(index.max(), None);
    assert_eq!(index.successor(&1), None);
    assert_eq!(index.delete(&1), None);
    assert_eq!(index.to_text(), "");
    assert_eq!(index.render_by_depth(), "nilB");
    index.validate().unwrap();
}

#[test]
fn test_insert_scenario() {
    let mut index: OSet<i32> = OSet::new();
    index.insert(4).insert(5).insert(3).insert(2);

    assert_eq!(index.len(), 4);
    assert_eq!(index.min(), Some(&2));
    assert_eq!(index.max(), Some(&5));
    assert_eq!(index.search(&4), Some(&4));
    assert_eq!(index.search(&3), Some(&3));
    assert_eq!(index.search(&9), None);
    assert_eq!(index.to_text(), "2R 3B 4B 5B");
    assert_eq!(index.to_string(), "2R 3B 4B 5B");

    let depths = index.render_by_depth();
    let mut lines = depths.lines();
    assert_eq!(lines.next(), Some("4B"));
    assert_eq!(lines.next(), Some("3B 5B"));
    assert_eq!(lines.next(), Some("2R nilB nilB nilB"));
    assert_eq!(lines.next(), Some("nilB nilB"));
    assert_eq!(lines.next(), None);

    index.validate().unwrap();
}

#[test]
fn test_delete_scenario() {
    let mut index: OSet<i32> = OSet::new();
    index.insert(3).insert(1).insert(10).insert(0).insert(2).insert(-1);

    assert_eq!(index.len(), 6);
    assert_eq!(index.to_text(), "-1R 0B 1R 2B 3B 10B");
    index.validate().unwrap();

    assert_eq!(index.delete(&1), Some(1));
    assert_eq!(index.len(), 5);
    assert_eq!(index.search(&1), None);
    assert_eq!(index.to_text(), "-1B 0R 2B 3B 10B");
    for key in [-1, 0, 2, 3, 10].iter() {
        assert_eq!(index.search(key), Some(key), "for key {}", key);
    }
    index.validate().unwrap();

    assert_eq!(index.delete(&10), Some(10));
    assert_eq!(index.len(), 4);
    assert_eq!(index.search(&10), None);
    assert_eq!(index.to_text(), "-1B 0B 2R 3B");
    for key in [-1, 0, 2, 3].iter() {
        assert_eq!(index.search(key), Some(key), "for key {}", key);
    }
    index.validate().unwrap();

    assert_eq!(index.delete(&7), None);
    assert_eq!(index.len(), 4);
}

#[test]
fn test_insert_delete_inverse() {
    let seed: u64 = random();
    println!("test_insert_delete_inverse {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: OSet<u32> = OSet::new();
    let keys: Vec<u32> = (0..200).map(|i| i * 2).collect();
    for key in keys.iter() {
        index.insert(*key);
    }

    for _i in 0..100 {
        let key = (rng.gen::<u32>() % 200) * 2 + 1; // odd, never in the tree
        let before: Vec<Option<u32>> =
            keys.iter().map(|k| index.successor(k).copied()).collect();

        index.insert(key);
        assert_eq!(index.delete(&key), Some(key));

        assert_eq!(index.search(&key), None);
        assert_eq!(index.min(), Some(&0));
        assert_eq!(index.max(), Some(&398));
        let after: Vec<Option<u32>> =
            keys.iter().map(|k| index.successor(k).copied()).collect();
        assert_eq!(before, after);
        index.validate().unwrap();
    }
}

#[test]
fn test_duplicates() {
    let mut index: OSet<u64> = OSet::new();
    index.insert(5).insert(5).insert(5).insert(3);

    assert_eq!(index.len(), 4);
    assert_eq!(index.search(&5), Some(&5));
    assert_eq!(text_keys(index.to_text()), vec![3, 5, 5, 5]);
    index.validate().unwrap();

    assert_eq!(index.delete(&5), Some(5));
    assert_eq!(index.len(), 3);
    assert_eq!(index.search(&5), Some(&5));
    index.validate().unwrap();

    assert_eq!(index.delete(&5), Some(5));
    assert_eq!(index.delete(&5), Some(5));
    assert_eq!(index.search(&5), None);
    assert_eq!(index.len(), 1);
    assert_eq!(index.search(&3), Some(&3));
    index.validate().unwrap();
}

#[test]
fn test_successor() {
    let mut index: OSet<u64> = OSet::new();
    index.insert(10).insert(20).insert(30).insert(40);

    assert_eq!(index.successor(&10), Some(&20));
    assert_eq!(index.successor(&20), Some(&30));
    assert_eq!(index.successor(&30), Some(&40));
    assert_eq!(index.successor(&40), None);
    assert_eq!(index.successor(&25), None);

    let mut index: OSet<u64> = OSet::new();
    index.insert(5).insert(5);
    assert_eq!(index.successor(&5), Some(&5));
}

#[test]
fn test_delete_all() {
    let seed: u64 = random();
    println!("test_delete_all {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: OSet<u16> = OSet::new();
    let mut keys = vec![];
    for _i in 0..1_000 {
        let key = rng.gen::<u16>();
        index.insert(key);
        keys.push(key);
    }
    index.validate().unwrap();

    while !keys.is_empty() {
        let off = rng.gen::<usize>() % keys.len();
        let key = keys.remove(off);
        assert_eq!(index.delete(&key), Some(key));
        if keys.len() % 100 == 0 {
            index.validate().unwrap();
        }
    }

    assert_eq!(index.len(), 0);
    assert_eq!(index.to_text(), "");
    assert_eq!(index.render_by_depth(), "nilB");
    index.validate().unwrap();
}

#[test]
fn test_free_list() {
    let mut index: OSet<u8> = OSet::new();
    index.insert(1).insert(2).insert(3);
    assert_eq!(index.slots.len(), 3);

    index.delete(&1);
    index.delete(&3);
    assert_eq!(index.len(), 1);

    // freed slots are taken back before the arena grows.
    index.insert(4).insert(5);
    assert_eq!(index.slots.len(), 3);
    assert_eq!(index.len(), 3);
    index.validate().unwrap();

    index.insert(6);
    assert_eq!(index.slots.len(), 4);
    index.validate().unwrap();
}

#[test]
fn test_render_by_depth() {
    let index: OSet<u8> = OSet::new();
    assert_eq!(index.render_by_depth(), "nilB");

    let mut index: OSet<u8> = OSet::new();
    index.insert(7);
    assert_eq!(index.render_by_depth(), "7B\nnilB nilB");

    index.insert(9);
    assert_eq!(index.render_by_depth(), "7B\nnilB 9R\nnilB nilB");

    // every live node renders once, every nil leaf renders once.
    let seed: u64 = random();
    println!("test_render_by_depth {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: OSet<u16> = OSet::new();
    for _i in 0..500 {
        index.insert(rng.gen::<u16>());
    }
    let text = index.render_by_depth();
    let toks: Vec<&str> = text.split_whitespace().collect();
    let n_nils = toks.iter().filter(|tok| tok.starts_with("nil")).count();
    assert_eq!(toks.len() - n_nils, index.len());
    assert_eq!(n_nils, index.len() + 1);
}

#[derive(Debug, Arbitrary)]
enum Op<K> {
    Len,
    IsEmpty,
    Insert(K),
    Delete(K),
    Validate,
    Search(K),
    Min,
    Max,
    Successor(K),
    ToText,
    Extend(Vec<K>),
}

fn text_keys(text: &str) -> Vec<u8> {
    text.split_whitespace()
        .map(|tok| {
            let digits = tok.trim_end_matches(|ch: char| ch == 'R' || ch == 'B');
            digits.parse::<u8>().unwrap()
        })
        .collect()
}

fn model_keys(btmap: &BTreeMap<u8, usize>) -> Vec<u8> {
    let mut keys = vec![];
    for (key, n) in btmap.iter() {
        keys.extend(repeat(*key).take(*n));
    }
    keys
}
