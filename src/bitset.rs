//! A small growable bitset, grounded in `original_source/src/dyn_bitset.cpp`.
//!
//! The original's `DynBitset` backs a hand-rolled word array; here we reuse
//! `bitvec::vec::BitVec`, already part of the dependency stack, as the
//! underlying storage and keep only the handful of operations the rest of
//! the crate actually needs (`set`, `any`, `single_set_bit`).

use bitvec::prelude::*;

#[derive(Debug, Clone, Default)]
pub(crate) struct Bitset {
    bits: BitVec,
}

impl Bitset {
    pub(crate) fn with_capacity(len: usize) -> Self {
        Bitset {
            bits: bitvec![0; len],
        }
    }

    pub(crate) fn set(&mut self, pos: usize) {
        if pos >= self.bits.len() {
            self.bits.resize(pos + 1, false);
        }
        self.bits.set(pos, true);
    }

    pub(crate) fn get(&self, pos: usize) -> bool {
        self.bits.get(pos).map(|b| *b).unwrap_or(false)
    }

    pub(crate) fn any(&self) -> bool {
        self.bits.any()
    }

    /// Returns the index of the unique set bit, or `None` if zero or more
    /// than one bit is set. Grounded in `DynBitset::singleBit`/`whichBit`:
    /// the original keeps a commented-out divide-and-conquer variant
    /// alongside the working linear scan. We take the linear scan -- it's
    /// the one actually exercised by the original, the divide-and-conquer
    /// variant is dead code, not an alternate requirement.
    pub(crate) fn single_set_bit(&self) -> Option<usize> {
        let mut found = None;
        for (idx, bit) in self.bits.iter().enumerate() {
            if *bit {
                if found.is_some() {
                    return None;
                }
                found = Some(idx);
            }
        }
        found
    }
}
