//! Crate-wide tunables. Grounded in the teacher's own Cargo-feature-gated
//! config surface (`lib-garble-rs/Cargo.toml`'s `key_length_search` feature,
//! which swaps in a different search strategy at compile time rather than at
//! runtime) -- this crate follows the same shape for the one tunable spec.md
//! leaves as an open question: how many precision levels [`crate::equality::groups_equal`]
//! is willing to escalate through before giving up on a signature bucket.
//!
//! The default (`2`) matches spec.md §4.E's base precision and is enough for
//! every seed scenario in spec.md §8. The `deep-search` feature raises the
//! ceiling to `15` (spec.md's suggested upper bound) for haystacks with
//! unusually large signature collisions at low precision, at the cost of
//! recomputing neighborhood signatures several levels deeper.

/// Highest precision level [`crate::equality::groups_equal`] will try before
/// treating a group pair as not provably equal.
#[cfg(not(feature = "deep-search"))]
pub const MAX_PRECISION_LEVEL: usize = 2;

#[cfg(feature = "deep-search")]
pub const MAX_PRECISION_LEVEL: usize = 15;
