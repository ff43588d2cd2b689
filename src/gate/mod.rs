//! The gate hierarchy: the five circuit-tree node kinds (spec.md §3
//! "Gate", §4.C) and the shared freeze/signature/equality dispatch that
//! every kind goes through. Grounded in `original_source/src/circuitTree.h`
//! plus its five `circuit*.{h,cpp}` subclasses.
//!
//! The original models this with a `CircuitTree` base class and virtual
//! dispatch (`innerSignature`, `innerEqual`, `toDot`, `computeSignature`).
//! Rust has no ambient vtable story that isn't either dynamic dispatch or an
//! explosion of generics, and the variant set is closed and small (five
//! kinds, fixed forever by the file format) -- a tagged [`Gate`] enum is the
//! idiomatic fit, matching the teacher's own `GateInternal` enum in
//! `circuit/gate.rs`.

pub mod assert_gate;
pub mod comb;
pub mod delay;
pub mod group;
pub mod tristate;

use std::cell::{Cell, RefCell};

use crate::error::{Error, Result};
use crate::ids::GateId;
pub use crate::ids::GateId as Id;
use crate::sigconst::{mix, seed};
use crate::wire::WireHandle;

pub use assert_gate::AssertGate;
pub use comb::CombGate;
pub use delay::DelayGate;
pub use group::GroupGate;
pub use tristate::TristateGate;

/// `enum CircType` in the original; the discriminant order is load-bearing
/// (it is folded directly into every leaf gate's inner signature formula).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CircType {
    Group = 0,
    Comb = 1,
    Delay = 2,
    Tristate = 3,
    Assert = 4,
}

/// Bookkeeping shared by every gate kind: identity, the frozen flag, the
/// per-level memoized signature cache, and (if this gate sits inside a
/// group) a non-owning reference back to that group's ancestor info. Mirrors
/// the protected fields on `CircuitTree`.
pub struct GateCommon {
    id: GateId,
    frozen: Cell<bool>,
    /// Interior mutability is the idiomatic fit here (rather than threading
    /// `&mut Gate` through every recursive `sign`/`equals` call): memoization
    /// is a pure cache over an already-frozen, structurally immutable tree,
    /// so a `RefCell` cache behind a shared reference is the same contract
    /// as the original's mutable `memoSig` member on an otherwise-const
    /// query path.
    memo_sig: RefCell<Vec<Option<u64>>>,
    ancestor: RefCell<Option<group::AncestorHandle>>,
}

impl GateCommon {
    pub(crate) fn new() -> Self {
        GateCommon {
            id: GateId::fresh(),
            frozen: Cell::new(false),
            memo_sig: RefCell::new(Vec::new()),
            ancestor: RefCell::new(None),
        }
    }

    fn fail_if_frozen(&self) -> Result<()> {
        if self.frozen.get() {
            return Err(Error::Frozen);
        }
        Ok(())
    }

    fn fail_if_not_frozen(&self) -> Result<()> {
        if !self.frozen.get() {
            return Err(Error::NotFrozen);
        }
        Ok(())
    }

    fn memo_get(&self, level: usize) -> Option<u64> {
        self.memo_sig.borrow().get(level).copied().flatten()
    }

    fn memo_put(&self, level: usize, sig: u64) {
        let mut memo = self.memo_sig.borrow_mut();
        if memo.len() <= level {
            memo.resize(level + 1, None);
        }
        memo[level] = Some(sig);
    }
}

/// A single node in the circuit tree. Closed, five-variant tagged union
/// (spec.md §3's five gate kinds), replacing the original's open-ended
/// `CircuitTree` subclass hierarchy.
pub enum Gate {
    Comb(CombGate),
    Delay(DelayGate),
    Tristate(TristateGate),
    Assert(AssertGate),
    Group(Box<GroupGate>),
}

/// Iterator over a gate's input-then-output wires (`ConstIoIter` in the
/// original, which chains an inner per-variant iterator). Every variant here
/// already normalizes its wires to two slices, so one concrete chained
/// iterator covers all five kinds -- no per-variant arm, no boxed trait
/// object.
pub struct IoIter<'a> {
    inner: std::iter::Chain<std::slice::Iter<'a, WireHandle>, std::slice::Iter<'a, WireHandle>>,
}

impl<'a> Iterator for IoIter<'a> {
    type Item = &'a WireHandle;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl Gate {
    fn common(&self) -> &GateCommon {
        match self {
            Gate::Comb(g) => &g.common,
            Gate::Delay(g) => &g.common,
            Gate::Tristate(g) => &g.common,
            Gate::Assert(g) => &g.common,
            Gate::Group(g) => &g.common,
        }
    }

    pub fn id(&self) -> GateId {
        self.common().id
    }

    pub fn circ_type(&self) -> CircType {
        match self {
            Gate::Group(_) => CircType::Group,
            Gate::Comb(_) => CircType::Comb,
            Gate::Delay(_) => CircType::Delay,
            Gate::Tristate(_) => CircType::Tristate,
            Gate::Assert(_) => CircType::Assert,
        }
    }

    /// Freezes this gate forever: subsequent structural mutation is
    /// rejected. Required before `sign`/`equals`/matching (`CircuitTree::freeze`).
    pub fn freeze(&mut self) {
        self.common().frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.common().frozen.get()
    }

    pub(crate) fn ancestor(&self) -> Option<group::AncestorHandle> {
        self.common().ancestor.borrow().clone()
    }

    pub(crate) fn set_ancestor(&self, ancestor: group::AncestorHandle) -> Result<()> {
        self.common().fail_if_frozen()?;
        let mut slot = self.common().ancestor.borrow_mut();
        if slot.is_some() {
            return Err(Error::AlreadyHasAncestor);
        }
        *slot = Some(ancestor);
        Ok(())
    }

    pub fn inputs(&self) -> &[WireHandle] {
        match self {
            Gate::Comb(g) => &g.inputs,
            Gate::Delay(g) => std::slice::from_ref(&g.input),
            Gate::Tristate(g) => &g.inputs,
            Gate::Assert(g) => &g.inputs,
            Gate::Group(g) => g.input_wires(),
        }
    }

    pub fn outputs(&self) -> &[WireHandle] {
        match self {
            Gate::Comb(g) => &g.outputs,
            Gate::Delay(g) => std::slice::from_ref(&g.output),
            Gate::Tristate(g) => std::slice::from_ref(&g.output),
            Gate::Assert(_) => &[],
            Gate::Group(g) => g.output_wires(),
        }
    }

    pub fn io_iter(&self) -> IoIter<'_> {
        IoIter {
            inner: self.inputs().iter().chain(self.outputs().iter()),
        }
    }

    /// Computes (and memoizes) this gate's structural signature at the given
    /// precision level. The circuit must be frozen first (`CircuitTree::sign`).
    pub fn sign(&self, level: usize) -> Result<u64> {
        self.common().fail_if_not_frozen()?;
        if let Some(cached) = self.common().memo_get(level) {
            return Ok(cached);
        }
        let sig = self.compute_signature(level)?;
        self.common().memo_put(level, sig);
        Ok(sig)
    }

    /// The full level-`level` signature (spec.md §4.D). `inner_signature` is
    /// the only part that varies in shape per gate kind (and, uniquely for
    /// [`Gate::Group`], in `level` itself -- it recurses into children at
    /// the *same* level, a containment relation rather than a wire-adjacency
    /// one). Everything below that point -- the neighborhood terms
    /// (`inp_sig`, `out_sig`) and the pin-position term (`io_sig`) -- is
    /// identical in shape for every variant, since it only depends on the
    /// gate's own I/O wires and its ancestor, both of which already have a
    /// uniform representation (`inputs()`/`outputs()`/`ancestor()`) on
    /// `Gate` regardless of which variant `self` is.
    fn compute_signature(&self, level: usize) -> Result<u64> {
        let inner = match self {
            Gate::Comb(g) => g.inner_signature()?,
            Gate::Delay(g) => g.inner_signature(),
            Gate::Tristate(g) => g.inner_signature(),
            Gate::Assert(g) => g.inner_signature()?,
            Gate::Group(g) => g.inner_signature(level)?,
        };
        if level == 0 {
            return Ok(inner);
        }

        let ancestor = match self.ancestor().and_then(|weak| weak.upgrade()) {
            Some(rc) => rc,
            None => return Ok(inner),
        };
        let shared = ancestor.borrow();

        let mut inp_sig = 0u64;
        let mut out_sig = 0u64;
        let mut io_sig = 0u64;

        for w in self.inputs() {
            for conn in shared.wires.connected_pins_const(*w)? {
                if let Some(&idx) = shared.child_index.get(&conn.gate) {
                    inp_sig = inp_sig.wrapping_add(shared.children[idx].sign(level - 1)?);
                }
            }
            if let Ok(canon) = shared.wires.resolve_const(*w) {
                io_sig = io_sig.wrapping_add(shared.pin_position_sig.get(&canon).copied().unwrap_or(0));
            }
        }
        for w in self.outputs() {
            for conn in shared.wires.connected_pins_const(*w)? {
                if let Some(&idx) = shared.child_index.get(&conn.gate) {
                    out_sig = out_sig.wrapping_add(shared.children[idx].sign(level - 1)?);
                }
            }
            if let Ok(canon) = shared.wires.resolve_const(*w) {
                io_sig = io_sig.wrapping_add(shared.pin_position_sig.get(&canon).copied().unwrap_or(0));
            }
        }

        Ok(inner.wrapping_add(io_sig).wrapping_add(inp_sig).wrapping_sub(out_sig))
    }

    /// Per-variant structural comparison (`innerEqual` in the original). For
    /// every leaf kind this already is the full equality; for [`Gate::Group`]
    /// it dispatches into [`crate::equality`]'s permutation search, so
    /// prefer [`Gate::equals`] at call sites unless you specifically want to
    /// bypass the type check.
    pub fn inner_equal(&self, other: &Gate) -> bool {
        match (self, other) {
            (Gate::Comb(a), Gate::Comb(b)) => a.inner_equal(b),
            (Gate::Delay(a), Gate::Delay(b)) => a.inner_equal(b),
            (Gate::Tristate(a), Gate::Tristate(b)) => a.inner_equal(b),
            (Gate::Assert(a), Gate::Assert(b)) => a.inner_equal(b),
            (Gate::Group(a), Gate::Group(b)) => a.inner_equal(b),
            _ => false,
        }
    }

    /// Formal equality (spec.md §4.E): same circuit kind and `inner_equal`.
    /// There is no cheap pre-check here beyond the type tag -- signature
    /// comparisons are a caller-side optimization (see
    /// [`crate::equality::groups_equal`]'s bucket splitting), not a
    /// substitute for this full check.
    pub fn equals(&self, other: &Gate) -> bool {
        self.circ_type() == other.circ_type() && self.inner_equal(other)
    }

    /// `toDot` in the original. See [`crate::dot`]. `registry` is the wire
    /// registry `self` was built against (its owning group's, for a direct
    /// child; itself, if `self` is a standalone group).
    pub fn emit_dot(
        &self,
        registry: &crate::wire::WireRegistry,
        out: &mut dyn std::fmt::Write,
        indent: usize,
    ) -> std::fmt::Result {
        crate::dot::emit_gate(self, registry, out, indent)
    }
}

/// Folds a leaf gate's `(circType, input-count, output-count)` triple plus
/// any operator-specific payload through the shared `LEAFTYPE` transform.
/// Shared by Comb/Delay/Tristate/Assert's `innerSignature`.
pub(crate) fn leaf_type_tag(circ: CircType, inputs: usize, outputs: usize) -> u64 {
    ((circ as u64) << 16) | ((inputs as u64) << 8) | (outputs as u64)
}

pub(crate) fn mix_leaftype(payload: u64) -> u64 {
    mix(seed::LEAFTYPE, payload)
}
