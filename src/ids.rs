//! Process-wide monotonic id counters.
//!
//! A [`GateId`] uniquely identifies a gate for the lifetime of the process;
//! a registry id uniquely identifies a [`crate::wire::WireRegistry`]. Neither
//! needs to survive across runs -- they only need to be distinct while the
//! process is alive.

use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_GATE_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Globally-unique id assigned to a gate at creation time. Used for O(1)
/// identity comparisons (`CircuitTree::operator==` in the original used the
/// same trick) and as the payload carried in wire adjacency lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GateId(u64);

impl GateId {
    pub(crate) fn fresh() -> Self {
        GateId(NEXT_GATE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Globally-unique id assigned to a [`crate::wire::WireRegistry`] at
/// creation time. Part of the `(registry_id, wire_id)` pair that makes wire
/// equality O(1) and registry-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryId(u64);

impl RegistryId {
    pub(crate) fn fresh() -> Self {
        RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_ids_are_distinct_and_monotonic() {
        let a = GateId::fresh();
        let b = GateId::fresh();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn registry_ids_are_distinct() {
        let a = RegistryId::fresh();
        let b = RegistryId::fresh();
        assert_ne!(a, b);
    }
}
