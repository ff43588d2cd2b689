//! Dot emitter: a pure, read-only depth-first traversal of a circuit tree
//! producing a Graphviz dump. Grounded in
//! `original_source/src/circuitComb.cpp::toDot`, `circuitDelay.cpp::toDot`,
//! `circuitTristate.cpp::toDot` and `circuitAssert.cpp::toDot` (per-variant
//! node shapes), and `circuitGroup.cpp::toDot` (the `subgraph cluster_*`
//! nesting).
//!
//! Node names follow a `{role}_{registry-id}_{wire-id}` scheme so two
//! separate dumps of the same frozen circuit always agree on names -- useful
//! for diffing dumps across runs. Gate nodes use the gate's own id instead,
//! since a gate (unlike a wire) has no registry of its own.

use std::fmt::{self, Write};

use crate::gate::{CircType, Gate};
use crate::gate::group::GroupGate;
use crate::wire::{WireHandle, WireRegistry};

/// Emits a complete `digraph { ... }` dump of `root` (a root group is the
/// one dumped directly, never nested inside someone else's `digraph`).
/// Nested groups recurse as `subgraph cluster_... { ... }` blocks within it.
pub fn emit_group(root: &GroupGate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", dot_ident(root.name()));
    let registry = root.wires();
    emit_group_body(root, &registry, &mut out, 1);
    let _ = writeln!(out, "}}");
    out
}

fn emit_group_body(group: &GroupGate, registry: &WireRegistry, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    for w in registry.all_wires() {
        let _ = writeln!(out, "{pad}{} [shape=plain];", wire_node_name(registry, w));
    }
    for (i, child) in group.children().iter().enumerate() {
        emit_child(child, i, registry, out, indent);
    }
}

fn emit_child(gate: &Gate, index: usize, registry: &WireRegistry, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    if let Gate::Group(inner) = gate {
        let _ = writeln!(out, "{pad}subgraph cluster_{}_{} {{", dot_ident(inner.name()), index);
        let _ = writeln!(out, "{pad}  label = \"{}\";", inner.name());
        let inner_registry = inner.wires();
        emit_group_body(inner, &inner_registry, out, indent + 1);
        let _ = writeln!(out, "{pad}}}");
        return;
    }

    let node = gate_node_name(gate);
    let (shape, label) = match gate {
        Gate::Comb(_) => ("octagon", None),
        Gate::Delay(_) | Gate::Tristate(_) => ("triangle", None),
        Gate::Assert(a) => ("plain", Some(a.name().to_string())),
        Gate::Group(_) => unreachable!("handled above"),
    };
    match label {
        Some(l) => {
            let _ = writeln!(out, "{pad}{node} [shape={shape}, label=\"{l}\"];");
        }
        None => {
            let _ = writeln!(out, "{pad}{node} [shape={shape}];");
        }
    }

    for w in gate.inputs() {
        let _ = writeln!(out, "{pad}{} -> {node};", wire_node_name(registry, *w));
    }
    for w in gate.outputs() {
        let _ = writeln!(out, "{pad}{node} -> {};", wire_node_name(registry, *w));
    }
}

/// `Gate::emit_dot`'s single-node fallback path: dumps just this gate's own
/// node plus edges to its wires, with no enclosing `digraph`/`subgraph`
/// wrapper (the caller, typically a parent group's own traversal, already
/// opened one).
pub(crate) fn emit_gate(gate: &Gate, registry: &WireRegistry, out: &mut dyn fmt::Write, indent: usize) -> fmt::Result {
    let mut buf = String::new();
    emit_child(gate, 0, registry, &mut buf, indent);
    out.write_str(&buf)
}

fn wire_node_name(registry: &WireRegistry, wire: WireHandle) -> String {
    format!("wire_{}_{}", registry.id_raw(), wire.raw_slot())
}

fn gate_node_name(gate: &Gate) -> String {
    format!("gate_{}", gate.id().raw())
}

fn dot_ident(name: &str) -> String {
    name.chars().map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use crate::expr::Expr;

    #[test]
    fn single_comb_group_emits_octagon_and_wire_nodes() {
        let mut group = build_group("g");
        build_group_add_input(&mut group, "a", "a").unwrap();
        build_group_add_output(&mut group, "o", "o").unwrap();
        build_comb(&mut group, &["a"], &[("o", Expr::variable(0))]).unwrap();
        freeze_circuit(&mut group);

        let dot = emit_group(&group);
        assert!(dot.starts_with("digraph g {"));
        assert!(dot.contains("shape=octagon"));
        assert!(dot.contains("shape=plain"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn nested_group_emits_subgraph_cluster() {
        let mut outer = build_group("outer");
        build_group_add_input(&mut outer, "x", "x").unwrap();
        build_group_add_output(&mut outer, "y", "y").unwrap();

        let mut inner = build_group("inner");
        build_group_add_input(&mut inner, "x", "x").unwrap();
        build_group_add_output(&mut inner, "y", "y").unwrap();
        build_comb(&mut inner, &["x"], &[("y", Expr::variable(0))]).unwrap();
        build_group_add_child(&mut outer, inner).unwrap();

        freeze_circuit(&mut outer);
        let dot = emit_group(&outer);
        assert!(dot.contains("subgraph cluster_inner_0"));
    }

    #[test]
    fn assert_gate_emits_its_own_name_as_label() {
        let mut group = build_group("g");
        build_group_add_input(&mut group, "x", "x").unwrap();
        build_assert(&mut group, "nonzero", Expr::variable(0), &["x"]).unwrap();
        freeze_circuit(&mut group);

        let dot = emit_group(&group);
        assert!(dot.contains("label=\"nonzero\""));
    }

    #[test]
    fn distinct_registries_never_collide_on_wire_node_names() {
        let mut a = build_group("a");
        build_group_add_input(&mut a, "w", "w").unwrap();
        build_group_add_output(&mut a, "o", "o").unwrap();
        build_comb(&mut a, &["w"], &[("o", Expr::variable(0))]).unwrap();
        freeze_circuit(&mut a);

        let mut b = build_group("b");
        build_group_add_input(&mut b, "w", "w").unwrap();
        build_group_add_output(&mut b, "o", "o").unwrap();
        build_comb(&mut b, &["w"], &[("o", Expr::variable(0))]).unwrap();
        freeze_circuit(&mut b);

        assert_ne!(emit_group(&a), emit_group(&b));
    }
}
