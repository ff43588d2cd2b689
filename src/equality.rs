//! Formal equality between two groups' children: signature-bucket
//! splitting, escalating-precision permutation search, and wire-bijection
//! verification. Grounded in `original_source/src/groupEquality.cpp`.
//!
//! Two groups are equal when there exists a way to pair up their children
//! (respecting signature buckets) such that every pair is itself equal
//! *and* the pairing induces a consistent bijection between the two
//! groups' wires.

use hashbrown::HashMap;

use crate::gate::group::GroupGate;
use crate::gate::Gate;
use crate::perm::{factorial, Permutation, MAX_PERMUTATIONS};
use crate::wire::WireHandle;

type SigSplit<'a> = Vec<Vec<&'a Gate>>;

/// Buckets `children` by their signature at the given precision level,
/// preserving a deterministic (sorted-by-signature) bucket order so two
/// independently-split groups can be compared bucket-for-bucket. Returns
/// `None` if any bucket's internal permutation count would exceed
/// [`MAX_PERMUTATIONS`] (`groupEquality::TooManyPermutations`).
fn split_on_sig(children: &[Gate], level: usize) -> Option<(SigSplit<'_>, Vec<u64>)> {
    let mut by_sig: std::collections::BTreeMap<u64, Vec<&Gate>> = std::collections::BTreeMap::new();
    for child in children {
        // `sign` takes `&self` (memoization is behind a `RefCell`), so this
        // is free after the first call on an already-frozen circuit --
        // equality is only ever asked of frozen circuits.
        let sig = child.sign(level).expect("equality is only checked on frozen circuits");
        let bucket = by_sig.entry(sig).or_default();
        bucket.push(child);
        if factorial(bucket.len()) > MAX_PERMUTATIONS {
            return None;
        }
    }
    let mut splitted = Vec::with_capacity(by_sig.len());
    let mut sigs = Vec::with_capacity(by_sig.len());
    for (sig, bucket) in by_sig {
        sigs.push(sig);
        splitted.push(bucket);
    }
    Some((splitted, sigs))
}

fn equal_sizes(left: &(SigSplit, Vec<u64>), right: &(SigSplit, Vec<u64>)) -> bool {
    left.1 == right.1 && left.0.iter().zip(&right.0).all(|(a, b)| a.len() == b.len())
}

/// Checks one candidate joint permutation: every paired child must itself be
/// `equals`, and the pairing must induce a consistent, injective map from
/// left wires to right wires (`groupEquality::equalWithPermutation`).
fn equal_with_permutation(left: &SigSplit, right: &SigSplit, perm: &Permutation) -> bool {
    for (pos, bucket) in left.iter().enumerate() {
        let ordering = perm.current(pos);
        for (circ_id, &l) in bucket.iter().enumerate() {
            let r = right[pos][ordering[circ_id]];
            if !l.equals(r) {
                return false;
            }
        }
    }

    let mut lr_map: HashMap<WireHandle, WireHandle> = HashMap::new();
    let mut seen_right: hashbrown::HashSet<WireHandle> = hashbrown::HashSet::new();

    for (pos, bucket) in left.iter().enumerate() {
        let ordering = perm.current(pos);
        for (circ_id, &l) in bucket.iter().enumerate() {
            let r = right[pos][ordering[circ_id]];
            let mut l_wires = l.io_iter();
            let mut r_wires = r.io_iter();
            loop {
                match (l_wires.next(), r_wires.next()) {
                    (Some(lw), Some(rw)) => {
                        if let Some(&existing) = lr_map.get(lw) {
                            if existing != *rw {
                                return false;
                            }
                        } else {
                            lr_map.insert(*lw, *rw);
                        }
                    }
                    (None, None) => break,
                    _ => return false, // mismatched wire counts
                }
            }
        }
    }

    for &rw in lr_map.values() {
        if !seen_right.insert(rw) {
            return false; // non-injective
        }
    }
    true
}

/// Top-level group equality, escalating signature precision only as far as
/// bucket sizes require. Returns `false` (not an error) if no precision
/// level keeps every bucket under [`MAX_PERMUTATIONS`] -- the groups are
/// treated as not provably equal rather than raising.
pub fn groups_equal(a: &GroupGate, b: &GroupGate) -> bool {
    if a.inputs().len() != b.inputs().len() || a.outputs().len() != b.outputs().len() {
        return false;
    }
    if a.children().len() != b.children().len() {
        return false;
    }

    let a_children = a.children();
    let b_children = b.children();

    for level in 0..=crate::config::MAX_PRECISION_LEVEL {
        let left = match split_on_sig(&a_children, level) {
            Some(s) => s,
            None => continue,
        };
        let right = match split_on_sig(&b_children, level) {
            Some(s) => s,
            None => continue,
        };
        if !equal_sizes(&left, &right) {
            return false;
        }

        let bucket_sizes: Vec<usize> = left.0.iter().map(|b| b.len()).collect();
        let mut perm = Permutation::new(&bucket_sizes);
        if equal_with_permutation(&left.0, &right.0, &perm) {
            return true;
        }
        while perm.next() {
            if equal_with_permutation(&left.0, &right.0, &perm) {
                return true;
            }
        }
        return false;
    }
    false
}
