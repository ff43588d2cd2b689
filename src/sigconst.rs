//! Signature mixing primitives shared by [`crate::expr`], [`crate::gate`]
//! and [`crate::gate::group`].
//!
//! Grounded in `original_source/src/gateExpression.cpp`'s `signatureConstants`
//! namespace: each operator/tag gets its own "transform" (`opcst_and`,
//! `opcst_leaftype`, ...), applied to a combination of sub-signatures. The
//! original leaves the exact constants implementation-defined, requiring only
//! that they be fixed, wide, distinct per operator, and deterministic.
//! Rather than hand-roll a mixing function, this reuses `xxhash-rust`'s xxh3
//! (already part of the dependency stack) as the per-operator transform:
//! `transform(seed, x) = xxh3_64_with_seed(&x.to_le_bytes(), seed)`.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Applies a per-operator/tag transform to a 64-bit value. `seed` must be a
/// distinct constant per call site (see the `seed::*` constants below).
#[inline]
pub(crate) fn mix(seed: u64, value: u64) -> u64 {
    xxh3_64_with_seed(&value.to_le_bytes(), seed)
}

/// Distinct seeds for every transform used across the expression tree, the
/// gate "inner signature" and the pin-position signature. Each is an
/// arbitrary odd 64-bit constant; all that matters is that they are pairwise
/// distinct so that structurally different nodes don't collide by
/// construction (signature collisions from hashing alone are still possible
/// and tolerated -- equality implies signature equality, not the converse).
pub(crate) mod seed {
    // Expression-tree operators (4.A).
    pub(crate) const NUMCONST: u64 = 0x9E37_79B9_7F4A_7C15;
    pub(crate) const WIREID: u64 = 0xC2B2_AE3D_27D4_EB4F;
    pub(crate) const SLICE: u64 = 0x1656_67B1_9E37_79F9;
    pub(crate) const SLICEBOUNDS: u64 = 0xFF51_AFD7_ED55_8CCD;
    pub(crate) const MERGE: u64 = 0xC4CE_B9FE_1A85_EC53;

    pub(crate) const BAND: u64 = 0xB492_B66F_BE98_F273;
    pub(crate) const BOR: u64 = 0x2545_F491_4F6C_DD1D;
    pub(crate) const BXOR: u64 = 0x8E1C_7A5F_48B2_E9D1;
    pub(crate) const BADD: u64 = 0xD6E8_FEB8_6659_FD93;
    pub(crate) const BSUB: u64 = 0xA5A5_A5A5_3C3C_3C3D;
    pub(crate) const BMUL: u64 = 0x94D0_49BB_1331_11EB;
    pub(crate) const BDIV: u64 = 0xBF58_476D_1CE4_E5B9;
    pub(crate) const BMOD: u64 = 0x2B72_8F22_D3C7_6B51;
    pub(crate) const BLSR: u64 = 0x6C62_272E_07BB_0142;
    pub(crate) const BLSL: u64 = 0x5851_F42D_4C95_7F2D;
    pub(crate) const BASR: u64 = 0x1446_5CD2_9399_2047;

    pub(crate) const UNOT: u64 = 0x7FEB_352D;

    pub(crate) const UCLSR: u64 = 0x846C_A68B;
    pub(crate) const UCLSL: u64 = 0xD2D9_8B5B;
    pub(crate) const UCASR: u64 = 0x8475_1301;
    pub(crate) const CSTINT: u64 = 0xCC9E_2D51;

    // Gate "inner signature" tags (4.D).
    pub(crate) const LEAFTYPE: u64 = 0x27D4_EB2F_1656_67C5;
}

/// 32-bit prime modulus used by the pin-position signature's `Σ 2^i mod P`
/// construction.
pub(crate) const PIN_POSITION_PRIME: u64 = 0xFFFF_FFFB; // 4294967291, largest 32-bit prime

/// `Σ_{i in indices} 2^i mod PIN_POSITION_PRIME`, used for both the
/// input-pin-index half and the output-pin-index half of a pin-position
/// signature: a 64-bit value formed from two 32-bit halves. The two halves
/// are packed directly -- low = input-pin-index set, high = output-pin-index
/// set -- with no further mixing.
pub(crate) fn pin_index_set_sum(indices: impl Iterator<Item = usize>) -> u32 {
    let mut acc: u64 = 0;
    for i in indices {
        let pow = mod_pow2(i as u64);
        acc = (acc + pow) % PIN_POSITION_PRIME;
    }
    acc as u32
}

fn mod_pow2(exp: u64) -> u64 {
    let mut result: u64 = 1;
    let mut base: u64 = 2 % PIN_POSITION_PRIME;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * base) % PIN_POSITION_PRIME;
        }
        base = (base * base) % PIN_POSITION_PRIME;
        e >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_is_deterministic() {
        assert_eq!(mix(seed::BAND, 42), mix(seed::BAND, 42));
    }

    #[test]
    fn mix_differs_per_seed() {
        assert_ne!(mix(seed::BAND, 42), mix(seed::BOR, 42));
    }

    #[test]
    fn pin_index_set_sum_is_order_independent() {
        let a = pin_index_set_sum(vec![0usize, 3, 5].into_iter());
        let b = pin_index_set_sum(vec![5usize, 0, 3].into_iter());
        assert_eq!(a, b);
    }

    #[test]
    fn pin_index_set_sum_distinguishes_sets() {
        let a = pin_index_set_sum(vec![0usize, 1].into_iter());
        let b = pin_index_set_sum(vec![0usize, 2].into_iter());
        assert_ne!(a, b);
    }
}
