//! Combinational gate: N inputs, M outputs, each output driven by an
//! [`Expr`] over the inputs. Grounded in
//! `original_source/src/circuitComb.{h,cpp}`.

use crate::error::Result;
use crate::expr::Expr;
use crate::gate::{leaf_type_tag, mix_leaftype, CircType, GateCommon};
use crate::wire::{PinConnection, WireHandle, WireRegistry};

pub struct CombGate {
    pub(crate) common: GateCommon,
    pub(crate) inputs: Vec<WireHandle>,
    pub(crate) outputs: Vec<WireHandle>,
    pub(crate) exprs: Vec<Expr>,
}

impl CombGate {
    pub fn new() -> Self {
        CombGate {
            common: GateCommon::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            exprs: Vec::new(),
        }
    }

    /// Adds `wire` as the next input (`CircuitComb::addInput`), eagerly
    /// registering this gate on the wire's adjacency list in `registry`
    /// (spec.md §4.C: "construction eagerly registers the gate on each
    /// involved wire's adjacency list").
    pub fn add_input(&mut self, registry: &mut WireRegistry, wire: WireHandle) -> Result<()> {
        let pin_index = self.inputs.len();
        registry.connect(wire, PinConnection { gate: self.common.id, pin_index })?;
        self.inputs.push(wire);
        Ok(())
    }

    /// Adds `expr` as the expression driving the next output wire
    /// (`CircuitComb::addOutput`). `expr`'s `Variable(i)` refers to the
    /// `i`-th input wire by declaration order (spec.md §4.C).
    pub fn add_output(&mut self, registry: &mut WireRegistry, expr: Expr, wire: WireHandle) -> Result<()> {
        let pin_index = self.outputs.len();
        registry.connect(wire, PinConnection { gate: self.common.id, pin_index })?;
        self.outputs.push(wire);
        self.exprs.push(expr);
        Ok(())
    }

    pub fn expressions(&self) -> &[Expr] {
        &self.exprs
    }

    pub(crate) fn inner_signature(&self) -> Result<u64> {
        let mut exprs_sum = 0u64;
        for expr in &self.exprs {
            exprs_sum ^= expr.sign()?;
        }
        let tag = leaf_type_tag(CircType::Comb, self.inputs.len(), self.outputs.len());
        Ok(mix_leaftype(tag ^ exprs_sum))
    }

    pub(crate) fn inner_equal(&self, other: &CombGate) -> bool {
        if self.inputs.len() != other.inputs.len()
            || self.outputs.len() != other.outputs.len()
            || self.exprs.len() != other.exprs.len()
        {
            return false;
        }
        self.exprs.iter().zip(&other.exprs).all(|(a, b)| a.equals(b))
    }
}

impl Default for CombGate {
    fn default() -> Self {
        Self::new()
    }
}
