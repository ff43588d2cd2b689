//! Wire registry: named/anonymous wires, pin connections and aliasing via
//! union-find. Grounded in `original_source/src/wireId.{h,cpp}` and
//! `wireManager.{h,cpp}`.
//!
//! A [`WireRegistry`] is scoped to one [`crate::gate::group::GroupGate`] (the
//! original's `CircuitGroup` owns one `WireManager`). Wires never cross
//! registry boundaries; a [`WireHandle`] used against the wrong registry is
//! an [`Error::ForeignWire`].

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::ids::{GateId, RegistryId};

/// An opaque reference to a wire, scoped to the [`WireRegistry`] that
/// allocated it. Cheap to copy and compare; does not itself resolve
/// aliasing (see [`WireRegistry::resolve`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireHandle {
    registry: RegistryId,
    slot: u32,
}

impl WireHandle {
    /// The wire's pre-canonicalization slot index, stable from creation and
    /// unaffected by later `merge` calls. Used as the "position" input to
    /// the pin-position signature -- it only needs to be a stable per-wire
    /// identifier, not the union-find root.
    pub(crate) fn raw_slot(self) -> u32 {
        self.slot
    }
}

/// The canonical (union-find root) identity of a wire, after any merges.
/// Two handles that were merged resolve to the same `CanonicalWireId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalWireId {
    registry: RegistryId,
    slot: u32,
}

/// One endpoint attached to a wire: a gate and the index of the pin on that
/// gate (input or output, disambiguated by the caller's context). Mirrors
/// `struct PinConnection` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinConnection {
    pub gate: GateId,
    pub pin_index: usize,
}

struct WireSlot {
    parent: u32,
    rank: u8,
    name: Option<String>,
    connections: Vec<PinConnection>,
}

/// Owns every wire created within one group's scope, and the union-find
/// forest that tracks which wires have been merged (aliased) together.
/// Corresponds to `WireManager` in the original.
pub struct WireRegistry {
    id: RegistryId,
    slots: Vec<WireSlot>,
    by_name: HashMap<String, u32>,
}

impl WireRegistry {
    pub fn new() -> Self {
        WireRegistry {
            id: RegistryId::fresh(),
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    fn check_owner(&self, handle: WireHandle) -> Result<()> {
        if handle.registry != self.id {
            return Err(Error::ForeignWire(handle));
        }
        Ok(())
    }

    /// Creates a new named wire. Fails if `name` is already in use in this
    /// registry (`WireManager::fresh` throws `AlreadyDefined`).
    pub fn fresh(&mut self, name: impl Into<String>) -> Result<WireHandle> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::AlreadyDefined(name));
        }
        let slot = self.push_slot(Some(name.clone()));
        self.by_name.insert(name, slot);
        Ok(WireHandle { registry: self.id, slot })
    }

    /// Creates a new anonymous wire with no entry in the name table
    /// (`WireManager::freshInsulated`). Used for synthetic internal nets
    /// that should never be looked up by name.
    pub fn fresh_insulated(&mut self) -> WireHandle {
        let slot = self.push_slot(None);
        WireHandle { registry: self.id, slot }
    }

    fn push_slot(&mut self, name: Option<String>) -> u32 {
        let idx = self.slots.len() as u32;
        self.slots.push(WireSlot {
            parent: idx,
            rank: 0,
            name,
            connections: Vec::new(),
        });
        idx
    }

    pub fn has_wire(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Looks up a wire by name. If `dont_create` is false and no such wire
    /// exists, one is created; otherwise a missing name is `NotDefined`
    /// (`WireManager::wire`).
    pub fn wire(&mut self, name: &str, dont_create: bool) -> Result<WireHandle> {
        if let Some(&slot) = self.by_name.get(name) {
            return Ok(WireHandle { registry: self.id, slot });
        }
        if dont_create {
            return Err(Error::NotDefined(name.to_string()));
        }
        self.fresh(name)
    }

    /// Renames a wire in the name table (`WireManager::rename`).
    pub fn rename(&mut self, handle: WireHandle, new_name: impl Into<String>) -> Result<()> {
        self.check_owner(handle)?;
        let new_name = new_name.into();
        if self.by_name.contains_key(&new_name) {
            return Err(Error::AlreadyDefined(new_name));
        }
        let slot = &mut self.slots[handle.slot as usize];
        if let Some(old) = slot.name.take() {
            self.by_name.remove(&old);
        }
        slot.name = Some(new_name.clone());
        self.by_name.insert(new_name, handle.slot);
        Ok(())
    }

    /// Resolves a handle to its canonical (union-find root) identity,
    /// compressing the path as it walks (`WireId::ufRoot`).
    pub fn resolve(&mut self, handle: WireHandle) -> Result<CanonicalWireId> {
        self.check_owner(handle)?;
        let root = self.find(handle.slot);
        Ok(CanonicalWireId { registry: self.id, slot: root })
    }

    fn find(&mut self, slot: u32) -> u32 {
        let parent = self.slots[slot as usize].parent;
        if parent == slot {
            return slot;
        }
        let root = self.find(parent);
        self.slots[slot as usize].parent = root;
        root
    }

    /// Same as [`Self::resolve`], but takes `&self`: no path compression, so
    /// it stays usable from the read-only, possibly-reentrant signature walk,
    /// which only ever runs post-freeze once the union-find forest has
    /// stopped changing shape. A few extra parent hops cost nothing there.
    pub(crate) fn resolve_const(&self, handle: WireHandle) -> Result<CanonicalWireId> {
        self.check_owner(handle)?;
        let mut slot = handle.slot;
        loop {
            let parent = self.slots[slot as usize].parent;
            if parent == slot {
                return Ok(CanonicalWireId { registry: self.id, slot });
            }
            slot = parent;
        }
    }

    /// Non-compressing counterpart to [`Self::connected_pins`], for the same
    /// reason as [`Self::resolve_const`].
    pub(crate) fn connected_pins_const(&self, handle: WireHandle) -> Result<&[PinConnection]> {
        let root = self.resolve_const(handle)?;
        Ok(&self.slots[root.slot as usize].connections)
    }

    /// Aliases two wires together: from this point on they share one
    /// connection set and resolve to the same [`CanonicalWireId`]
    /// (`WireId::merge`, union-by-rank).
    pub fn merge(&mut self, a: WireHandle, b: WireHandle) -> Result<()> {
        self.check_owner(a)?;
        self.check_owner(b)?;
        let ra = self.find(a.slot);
        let rb = self.find(b.slot);
        if ra == rb {
            return Ok(());
        }
        let (lo, hi) = if self.slots[ra as usize].rank < self.slots[rb as usize].rank {
            (ra, rb)
        } else {
            (rb, ra)
        };
        let moved = std::mem::take(&mut self.slots[lo as usize].connections);
        self.slots[hi as usize].connections.extend(moved);
        self.slots[lo as usize].parent = hi;
        if self.slots[lo as usize].rank == self.slots[hi as usize].rank {
            self.slots[hi as usize].rank += 1;
        }
        Ok(())
    }

    /// Attaches a pin connection to the wire's canonical root.
    pub fn connect(&mut self, handle: WireHandle, conn: PinConnection) -> Result<()> {
        self.check_owner(handle)?;
        let root = self.find(handle.slot);
        self.slots[root as usize].connections.push(conn);
        Ok(())
    }

    /// All pins transitively connected to `handle` (`WireId::connected`).
    /// Because merges already union the connection lists, this is simply
    /// the canonical root's own list -- no further graph walk is needed.
    pub fn connected_pins(&mut self, handle: WireHandle) -> Result<&[PinConnection]> {
        self.check_owner(handle)?;
        let root = self.find(handle.slot);
        Ok(&self.slots[root as usize].connections)
    }

    pub fn name_of(&self, handle: WireHandle) -> Option<&str> {
        self.slots.get(handle.slot as usize).and_then(|s| s.name.as_deref())
    }

    /// This registry's own process-wide unique id, as a plain integer --
    /// used by [`crate::dot`] to build stable `{role}_{registry-id}_{wire-id}`
    /// node names.
    pub(crate) fn id_raw(&self) -> u64 {
        self.id.raw()
    }

    /// Every wire slot ever allocated in this registry, in creation order
    /// (not deduplicated by union-find root -- a merged/forwarder slot is
    /// still a distinct node worth naming in a dump). Used by
    /// [`crate::dot`] to declare one `shape=plain` node per wire.
    pub(crate) fn all_wires(&self) -> impl Iterator<Item = WireHandle> + '_ {
        let id = self.id;
        (0..self.slots.len() as u32).map(move |slot| WireHandle { registry: id, slot })
    }
}

impl Default for WireRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_wire_names_must_be_unique() {
        let mut reg = WireRegistry::new();
        reg.fresh("a").unwrap();
        assert!(matches!(reg.fresh("a"), Err(Error::AlreadyDefined(_))));
    }

    #[test]
    fn dont_create_lookup_fails_on_missing_name() {
        let mut reg = WireRegistry::new();
        assert!(matches!(reg.wire("missing", true), Err(Error::NotDefined(_))));
    }

    #[test]
    fn wire_lookup_creates_when_allowed() {
        let mut reg = WireRegistry::new();
        let w = reg.wire("x", false).unwrap();
        assert_eq!(reg.wire("x", true).unwrap(), w);
    }

    #[test]
    fn merge_unifies_canonical_ids_and_connections() {
        let mut reg = WireRegistry::new();
        let a = reg.fresh("a").unwrap();
        let b = reg.fresh("b").unwrap();
        let gate = GateId::fresh();
        reg.connect(a, PinConnection { gate, pin_index: 0 }).unwrap();
        reg.merge(a, b).unwrap();
        assert_eq!(reg.resolve(a).unwrap(), reg.resolve(b).unwrap());
        assert_eq!(reg.connected_pins(b).unwrap().len(), 1);
    }

    #[test]
    fn foreign_wire_handle_is_rejected() {
        let mut reg_a = WireRegistry::new();
        let mut reg_b = WireRegistry::new();
        let handle = reg_a.fresh("a").unwrap();
        assert!(matches!(reg_b.resolve(handle), Err(Error::ForeignWire(_))));
    }

    #[test]
    fn rename_updates_name_table() {
        let mut reg = WireRegistry::new();
        let w = reg.fresh("old").unwrap();
        reg.rename(w, "new").unwrap();
        assert!(!reg.has_wire("old"));
        assert_eq!(reg.wire("new", true).unwrap(), w);
    }
}
