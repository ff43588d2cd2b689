//! Group gate: a subcircuit with its own wire namespace, children and I/O
//! pins. Grounded in `original_source/src/circuitGroup.{h,cpp}`.
//!
//! The original's `CircuitGroup::computeSignature` is left as
//! `assert(false); // TODO implement` -- there is no formula to port. We
//! build one directly from spec.md §4.D's prose: a group's *inner* signature
//! sums its children's signatures *at the same level* (the containment
//! axis), while the *neighborhood* terms every gate kind shares (`inp_sig`,
//! `out_sig`, `io_sig` in [`crate::gate`]) walk wire adjacency in the
//! *ancestor's* registry at `level - 1` (the connectivity axis). Both need a
//! way to reach from an arbitrary child gate back into its owning group's
//! wire registry and children list without an owning pointer -- that is what
//! [`GroupShared`] and its [`Weak`] back-channel exist for.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use hashbrown::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::gate::{leaf_type_tag, mix_leaftype, CircType, Gate, GateCommon};
use crate::ids::GateId;
use crate::sigconst::pin_index_set_sum;
use crate::wire::{CanonicalWireId, PinConnection, WireHandle, WireRegistry};

/// One I/O pin of a group. `actual` is the wire in *this* group's own
/// registry that the pin exposes internally; `formal` is the wire in the
/// *ancestor's* registry it is wired to once attached -- possibly deferred
/// behind a `formal_name` until attachment (`IOPin`, and
/// `original_source/src/c_api/isomatch.h`'s `build_group_add_input(self,
/// actual, formal)`, whose doc comments spell out exactly this: "actual =
/// name accessed from inside the group", "formal = name accessed from
/// outside the group").
pub struct IoPin {
    actual: WireHandle,
    formal: Option<WireHandle>,
    formal_name: Option<String>,
}

impl IoPin {
    /// A fully-formed pin: both sides already known.
    pub fn new(actual: WireHandle, formal: WireHandle) -> Self {
        IoPin { actual, formal: Some(formal), formal_name: None }
    }

    /// A pin whose outer (formal) side is not yet known; resolved against
    /// the ancestor's registry when this group is attached via
    /// [`GroupGate::add_child`].
    pub fn deferred(actual: WireHandle, formal_name: impl Into<String>) -> Self {
        IoPin { actual, formal: None, formal_name: Some(formal_name.into()) }
    }

    pub fn connect(&mut self, formal: WireHandle) -> Result<()> {
        if self.formal.is_some() {
            return Err(Error::AlreadyConnected);
        }
        self.formal = Some(formal);
        Ok(())
    }

    pub fn actual(&self) -> WireHandle {
        self.actual
    }

    pub fn formal(&self) -> Option<WireHandle> {
        self.formal
    }

    pub fn formal_name(&self) -> Option<&str> {
        self.formal_name.as_deref()
    }
}

/// Everything a child gate needs to reach back into its owning group:
/// the group's own wire registry, its children (for adjacency resolution:
/// a `PinConnection::gate` only carries a [`GateId`], so `child_index`
/// turns that back into a slot in `children`), and the per-wire
/// pin-position signature cache computed at `freeze` time. Bundled behind
/// one `Rc<RefCell<_>>` so a child can reach all three through a single
/// [`Weak`] upgrade (`CircuitTree::ancestor` in the original, generalized:
/// the original only ever dereferences the ancestor as a raw
/// `CircuitGroup*`, which already has all of this through plain member
/// access).
pub(crate) struct GroupShared {
    pub(crate) wires: WireRegistry,
    pub(crate) children: Vec<Gate>,
    pub(crate) child_index: HashMap<GateId, usize>,
    pub(crate) pin_position_sig: HashMap<CanonicalWireId, u64>,
}

impl GroupShared {
    fn new() -> Self {
        GroupShared {
            wires: WireRegistry::new(),
            children: Vec::new(),
            child_index: HashMap::new(),
            pin_position_sig: HashMap::new(),
        }
    }
}

/// What a child gate actually holds: a weak link to its group's shared
/// state. Upgrading fails silently (returns `None`) once the group itself
/// has been dropped, which cannot happen while the child is still alive
/// under normal ownership (the group owns the child), but is the honest
/// signature for a non-owning reference (DESIGN NOTES §9, "cyclic ancestor
/// reference").
pub type AncestorHandle = Weak<RefCell<GroupShared>>;

pub struct GroupGate {
    pub(crate) common: GateCommon,
    name: String,
    shared: Rc<RefCell<GroupShared>>,
    inputs: Vec<IoPin>,
    outputs: Vec<IoPin>,
    input_wires_cache: Vec<WireHandle>,
    output_wires_cache: Vec<WireHandle>,
}

impl GroupGate {
    pub fn new(name: impl Into<String>) -> Self {
        GroupGate {
            common: GateCommon::new(),
            name: name.into(),
            shared: Rc::new(RefCell::new(GroupShared::new())),
            inputs: Vec::new(),
            outputs: Vec::new(),
            input_wires_cache: Vec::new(),
            output_wires_cache: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_frozen(&self) -> bool {
        self.common.frozen.get()
    }

    /// Backed by the shared `RefCell`, so this only needs `&self` -- the
    /// same "memoized/mutable cache behind a shared reference" shape the
    /// signature memo table already uses.
    pub fn wires_mut(&self) -> RefMut<'_, WireRegistry> {
        RefMut::map(self.shared.borrow_mut(), |s| &mut s.wires)
    }

    pub fn wires(&self) -> Ref<'_, WireRegistry> {
        Ref::map(self.shared.borrow(), |s| &s.wires)
    }

    /// Adds `child` to this group (`CircuitGroup::addChild`). If `child` is
    /// itself a group carrying deferred pins (spec.md §4.C), those pins are
    /// resolved against this group's registry first (creating the wire on
    /// demand). Either way, once the child's formal I/O wires are known they
    /// are registered on this group's wire adjacency lists, exactly as a
    /// leaf gate's own constructor already did for its wires at construction
    /// time.
    pub fn add_child(&mut self, mut child: Gate) -> Result<()> {
        self.common.fail_if_frozen()?;

        if let Gate::Group(g) = &mut child {
            {
                let mut shared = self.shared.borrow_mut();
                g.resolve_deferred_pins(&mut shared.wires)?;
            }
            let id = child.id();
            let formal_inputs = child.inputs().to_vec();
            let formal_outputs = child.outputs().to_vec();
            let mut shared = self.shared.borrow_mut();
            for (idx, w) in formal_inputs.iter().enumerate() {
                shared.wires.connect(*w, PinConnection { gate: id, pin_index: idx })?;
            }
            for (idx, w) in formal_outputs.iter().enumerate() {
                shared.wires.connect(*w, PinConnection { gate: id, pin_index: idx })?;
            }
        }

        child.set_ancestor(Rc::downgrade(&self.shared))?;

        let mut shared = self.shared.borrow_mut();
        let idx = shared.children.len();
        shared.child_index.insert(child.id(), idx);
        shared.children.push(child);
        Ok(())
    }

    /// Resolves every deferred pin's formal side against `parent_wires`
    /// (creating the named wire on demand), then refreshes the cached
    /// formal-wire slices used by [`crate::gate::Gate::inputs`]/`outputs`.
    fn resolve_deferred_pins(&mut self, parent_wires: &mut WireRegistry) -> Result<()> {
        for pin in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            if pin.formal.is_none() {
                let name = pin
                    .formal_name
                    .clone()
                    .ok_or_else(|| Error::UnresolvedPin(self.name.clone()))?;
                let w = parent_wires.wire(&name, false)?;
                pin.connect(w)?;
            }
        }
        self.refresh_formal_cache();
        Ok(())
    }

    fn refresh_formal_cache(&mut self) {
        self.input_wires_cache = self.inputs.iter().filter_map(|p| p.formal).collect();
        self.output_wires_cache = self.outputs.iter().filter_map(|p| p.formal).collect();
    }

    /// Requires unfrozen. Accepts either a fully-formed pin or a deferred
    /// one (spec.md §4.C); the formal cache used by the general I/O
    /// iteration only reflects pins whose formal side is already resolved.
    pub fn add_input(&mut self, pin: IoPin) -> Result<()> {
        self.common.fail_if_frozen()?;
        self.inputs.push(pin);
        self.refresh_formal_cache();
        Ok(())
    }

    pub fn add_output(&mut self, pin: IoPin) -> Result<()> {
        self.common.fail_if_frozen()?;
        self.outputs.push(pin);
        self.refresh_formal_cache();
        Ok(())
    }

    pub fn children(&self) -> Ref<'_, [Gate]> {
        Ref::map(self.shared.borrow(), |s| s.children.as_slice())
    }

    pub fn children_mut(&mut self) -> RefMut<'_, [Gate]> {
        RefMut::map(self.shared.borrow_mut(), |s| s.children.as_mut_slice())
    }

    pub fn inputs(&self) -> &[IoPin] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[IoPin] {
        &self.outputs
    }

    /// This group's own inner-scope wires for its declared input pins, in
    /// declaration order. Used when this group is itself the top of a
    /// matching/query call (needle or haystack root) and there is no
    /// ancestor registry to phrase "formal sides" in -- the matcher and
    /// standalone signing both want the group's *own* wires here, not the
    /// (possibly nonexistent) outer ones.
    pub fn actual_input_wires(&self) -> Vec<WireHandle> {
        self.inputs.iter().map(|p| p.actual()).collect()
    }

    pub fn actual_output_wires(&self) -> Vec<WireHandle> {
        self.outputs.iter().map(|p| p.actual()).collect()
    }

    pub(crate) fn input_wires(&self) -> &[WireHandle] {
        &self.input_wires_cache
    }

    pub(crate) fn output_wires(&self) -> &[WireHandle] {
        &self.output_wires_cache
    }

    /// Freezes this group and every child transitively, then computes and
    /// caches each wire's pin-position signature (`CircuitGroup::freeze`).
    pub fn freeze(&mut self) {
        {
            let mut shared = self.shared.borrow_mut();
            for child in shared.children.iter_mut() {
                freeze_recursive(child);
            }
        }
        self.compute_pin_positions();
        self.common.frozen.set(true);
        log::debug!(
            "froze group `{}`: {} children, {} inputs, {} outputs",
            self.name,
            self.shared.borrow().children.len(),
            self.inputs.len(),
            self.outputs.len(),
        );
    }

    /// Pin-position signature (spec.md §4.D): for every wire of this group
    /// bound to at least one declared I/O pin, a 64-bit value packing two
    /// 32-bit halves -- `Σ 2^i mod P` over the input-pin indices the wire is
    /// bound to (low half) and over the output-pin indices (high half).
    fn compute_pin_positions(&mut self) {
        let mut in_positions: HashMap<CanonicalWireId, Vec<usize>> = HashMap::new();
        let mut out_positions: HashMap<CanonicalWireId, Vec<usize>> = HashMap::new();

        let mut shared = self.shared.borrow_mut();
        for (i, pin) in self.inputs.iter().enumerate() {
            if let Ok(canon) = shared.wires.resolve(pin.actual) {
                in_positions.entry(canon).or_default().push(i);
            }
        }
        for (i, pin) in self.outputs.iter().enumerate() {
            if let Ok(canon) = shared.wires.resolve(pin.actual) {
                out_positions.entry(canon).or_default().push(i);
            }
        }

        let mut wires: HashSet<CanonicalWireId> = in_positions.keys().copied().collect();
        wires.extend(out_positions.keys().copied());

        shared.pin_position_sig.clear();
        for w in wires {
            let low = in_positions.get(&w).map(|v| pin_index_set_sum(v.iter().copied())).unwrap_or(0);
            let high = out_positions.get(&w).map(|v| pin_index_set_sum(v.iter().copied())).unwrap_or(0);
            let sig = (low as u64) | ((high as u64) << 32);
            shared.pin_position_sig.insert(w, sig);
        }
    }

    /// Group's own contribution to `compute_signature` (spec.md §4.D):
    /// `mix(tag, sum of children's level-`level` signatures)`. Note this
    /// recurses at the *same* level -- containment, not wire adjacency; the
    /// wire-adjacency terms (`inp_sig`/`out_sig`/`io_sig`) are added
    /// uniformly for every gate kind in [`crate::gate::Gate::sign`].
    pub(crate) fn inner_signature(&self, level: usize) -> Result<u64> {
        let tag = leaf_type_tag(CircType::Group, self.inputs.len(), self.outputs.len());
        let shared = self.shared.borrow();
        let mut acc = 0u64;
        for child in shared.children.iter() {
            acc = acc.wrapping_add(child.sign(level)?);
        }
        Ok(mix_leaftype(tag.wrapping_add(acc)))
    }

    pub(crate) fn inner_equal(&self, other: &GroupGate) -> bool {
        crate::equality::groups_equal(self, other)
    }

    pub(crate) fn connect_wire(&mut self, wire: WireHandle, conn: PinConnection) -> Result<()> {
        self.shared.borrow_mut().wires.connect(wire, conn)
    }

    /// Non-owning access to this group's shared state, for the uniform
    /// neighborhood-signature walk in [`crate::gate::Gate::sign`].
    pub(crate) fn shared_handle(&self) -> Rc<RefCell<GroupShared>> {
        self.shared.clone()
    }
}

fn freeze_recursive(gate: &mut Gate) {
    if let Gate::Group(g) = gate {
        g.freeze();
    } else {
        gate.freeze();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinOp, Expr};
    use crate::gate::comb::CombGate;

    #[test]
    fn empty_groups_are_inner_equal() {
        let mut a = GroupGate::new("a");
        let mut b = GroupGate::new("b");
        a.freeze();
        b.freeze();
        assert!(a.inner_equal(&b));
    }

    fn xor_group(name: &str) -> GroupGate {
        let mut group = GroupGate::new(name);
        let i0 = group.wires_mut().fresh("i0").unwrap();
        let i1 = group.wires_mut().fresh("i1").unwrap();
        let o = group.wires_mut().fresh("o").unwrap();

        let mut comb = CombGate::new();
        {
            let mut wires = group.wires_mut();
            comb.add_input(&mut wires, i0).unwrap();
            comb.add_input(&mut wires, i1).unwrap();
            comb.add_output(&mut wires, Expr::binop(BinOp::Xor, Expr::variable(0), Expr::variable(1)), o)
                .unwrap();
        }
        group.add_child(Gate::Comb(comb)).unwrap();
        group.freeze();
        group
    }

    #[test]
    fn group_signature_is_stable_across_calls() {
        let group = xor_group("g");
        let first = group.inner_signature(2).unwrap();
        let second = group.inner_signature(2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn pin_position_distinguishes_input_from_output_role() {
        let mut group = GroupGate::new("g");
        let a = group.wires_mut().fresh("a").unwrap();
        let b = group.wires_mut().fresh("b").unwrap();
        group.add_input(IoPin::new(a, a)).unwrap();
        group.add_output(IoPin::new(b, b)).unwrap();
        group.freeze();

        let shared = group.shared.borrow();
        let canon_a = shared.wires.resolve_const(a).unwrap();
        let canon_b = shared.wires.resolve_const(b).unwrap();
        let sig_a = *shared.pin_position_sig.get(&canon_a).unwrap();
        let sig_b = *shared.pin_position_sig.get(&canon_b).unwrap();
        assert_ne!(sig_a, sig_b);
        assert_eq!(sig_a & 0xFFFF_FFFF_0000_0000, 0); // pure input role: high half empty
        assert_eq!(sig_b & 0x0000_0000_FFFF_FFFF, 0); // pure output role: low half empty
    }
}
