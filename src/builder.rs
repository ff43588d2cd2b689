//! Builder API: ordered mutation operations exposed to parsers and
//! (eventually) a C-ABI wrapper. Grounded in
//! `original_source/src/c_api/isomatch.h`'s `build_*` functions.
//!
//! Every leaf-gate builder here takes the parent group directly, mirroring
//! `build_comb(parent)` / `build_delay(parent, input, output)` / etc: a leaf
//! gate has no wire registry of its own, so its wires are always resolved
//! against its parent's. Groups are the exception -- `build_group` takes no
//! parent (a group owns its own registry and may be built in isolation
//! before being attached anywhere); attaching is the separate
//! [`build_group_add_child`].
//!
//! Expression builders are not duplicated here: [`Expr`]'s own associated
//! functions (`constant`, `variable`, `binop`, `unop`, `unop_const`,
//! `slice`, `merge`) already are the expression-builder surface §4.G calls
//! for.

use crate::error::Result;
use crate::expr::Expr;
use crate::gate::group::IoPin;
use crate::gate::{AssertGate, CombGate, DelayGate, Gate, GroupGate, TristateGate};

/// `build_comb` + `build_comb_add_input`/`build_comb_add_output` folded into
/// one call: Rust's ownership makes the builder-then-mutate-then-attach
/// three-step dance in the C API unnecessary ceremony here, since `parent`'s
/// registry is reachable for the whole call. `outputs[i].1`'s `Variable(k)`
/// refers to `inputs[k]`, by declaration order.
pub fn build_comb(parent: &mut GroupGate, inputs: &[&str], outputs: &[(&str, Expr)]) -> Result<()> {
    let mut comb = CombGate::new();
    {
        let mut wires = parent.wires_mut();
        for name in inputs {
            let w = wires.wire(name, false)?;
            comb.add_input(&mut wires, w)?;
        }
        for (name, expr) in outputs {
            let w = wires.wire(name, false)?;
            comb.add_output(&mut wires, expr.clone(), w)?;
        }
    }
    parent.add_child(Gate::Comb(comb))
}

/// `build_delay`.
pub fn build_delay(parent: &mut GroupGate, input: &str, output: &str) -> Result<()> {
    let gate = {
        let mut wires = parent.wires_mut();
        let i = wires.wire(input, false)?;
        let o = wires.wire(output, false)?;
        DelayGate::new(&mut wires, i, o)?
    };
    parent.add_child(Gate::Delay(gate))
}

/// `build_tristate`.
pub fn build_tristate(parent: &mut GroupGate, from: &str, to: &str, enable: &str) -> Result<()> {
    let gate = {
        let mut wires = parent.wires_mut();
        let i = wires.wire(from, false)?;
        let o = wires.wire(to, false)?;
        let e = wires.wire(enable, false)?;
        TristateGate::new(&mut wires, i, o, e)?
    };
    parent.add_child(Gate::Tristate(gate))
}

/// `build_assert` + `build_assert_add_input`.
pub fn build_assert(parent: &mut GroupGate, name: &str, expr: Expr, inputs: &[&str]) -> Result<()> {
    let mut gate = AssertGate::new(name, expr);
    {
        let mut wires = parent.wires_mut();
        for n in inputs {
            let w = wires.wire(n, false)?;
            gate.add_input(&mut wires, w)?;
        }
    }
    parent.add_child(Gate::Assert(gate))
}

/// `build_group`: a fresh, unattached group with its own wire registry.
/// Populate it with the other `build_*` functions (using the new group as
/// `parent`) and [`build_group_add_input`]/[`build_group_add_output`], then
/// attach it with [`build_group_add_child`].
pub fn build_group(name: impl Into<String>) -> GroupGate {
    GroupGate::new(name)
}

/// `build_group_add_child`.
pub fn build_group_add_child(parent: &mut GroupGate, child: GroupGate) -> Result<()> {
    parent.add_child(Gate::Group(Box::new(child)))
}

/// `build_group_add_input`: `actual` is the wire's name as seen from inside
/// `group`; `formal` is the name it will be known by once `group` is
/// attached to a parent. Always deferred, matching the C API's own doc
/// comment (the C-ABI wrapper chooses the deferred form when the group has
/// no ancestor yet) -- a text-based builder never has a concrete outer
/// `WireHandle` in hand yet, only a name.
pub fn build_group_add_input(group: &mut GroupGate, actual: &str, formal: &str) -> Result<()> {
    let actual_handle = group.wires_mut().wire(actual, false)?;
    group.add_input(IoPin::deferred(actual_handle, formal))
}

/// `build_group_add_output`, symmetric to [`build_group_add_input`].
pub fn build_group_add_output(group: &mut GroupGate, actual: &str, formal: &str) -> Result<()> {
    let actual_handle = group.wires_mut().wire(actual, false)?;
    group.add_output(IoPin::deferred(actual_handle, formal))
}

/// `freeze_circuit`.
pub fn freeze_circuit(group: &mut GroupGate) {
    group.freeze();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinOp;

    /// A 2-to-1 multiplexer: `nsel = NOT(sel)`, then two tristates gated by
    /// `sel` and `nsel` both driving `out`.
    fn mux2to1(name: &str) -> GroupGate {
        let mut group = build_group(name);
        build_group_add_input(&mut group, "a", "a").unwrap();
        build_group_add_input(&mut group, "b", "b").unwrap();
        build_group_add_input(&mut group, "sel", "sel").unwrap();
        build_group_add_output(&mut group, "out", "out").unwrap();

        build_comb(
            &mut group,
            &["sel"],
            &[("nsel", Expr::unop(crate::expr::UnOp::Not, Expr::variable(0)))],
        )
        .unwrap();
        build_tristate(&mut group, "a", "out", "sel").unwrap();
        build_tristate(&mut group, "b", "out", "nsel").unwrap();

        group
    }

    #[test]
    fn mux_builds_and_freezes() {
        let mut mux = mux2to1("mux");
        freeze_circuit(&mut mux);
        assert_eq!(mux.children().len(), 3);
        let gate = Gate::Group(Box::new(mux));
        assert!(gate.sign(0).is_ok());
    }

    #[test]
    fn nested_group_attach_resolves_deferred_pins() {
        let mut outer = build_group("outer");
        // The sub-mux's formal pin names are "a"/"b"/"sel"/"out" (mux2to1
        // always sets formal == actual); outer never declared those wires
        // beforehand, so attaching creates them on demand.
        build_group_add_input(&mut outer, "a", "a").unwrap();
        build_group_add_input(&mut outer, "b", "b").unwrap();
        build_group_add_input(&mut outer, "sel", "sel").unwrap();
        build_group_add_output(&mut outer, "out", "out").unwrap();

        let sub = mux2to1("sub_mux");
        build_group_add_child(&mut outer, sub).unwrap();

        freeze_circuit(&mut outer);
        assert_eq!(outer.children().len(), 1);
        let gate = Gate::Group(Box::new(outer));
        assert!(gate.sign(1).is_ok());
    }

    #[test]
    fn assert_gate_builds_against_parent_registry() {
        let mut group = build_group("g");
        build_group_add_input(&mut group, "x", "x").unwrap();
        build_assert(&mut group, "nonzero", Expr::variable(0), &["x"]).unwrap();
        freeze_circuit(&mut group);
        assert_eq!(group.children().len(), 1);
    }

    #[test]
    fn comb_output_variable_refers_to_declared_input_order() {
        let mut group = build_group("g");
        build_group_add_input(&mut group, "a", "a").unwrap();
        build_group_add_input(&mut group, "b", "b").unwrap();
        build_group_add_output(&mut group, "o", "o").unwrap();
        build_comb(
            &mut group,
            &["a", "b"],
            &[("o", Expr::binop(BinOp::Xor, Expr::variable(0), Expr::variable(1)))],
        )
        .unwrap();
        freeze_circuit(&mut group);
        let gate = Gate::Group(Box::new(group));
        assert!(gate.sign(2).is_ok());
    }
}
