//! Assertion gate: a boolean predicate over its inputs, no outputs.
//! Grounded in `original_source/src/circuitAssert.{h,cpp}`.

use crate::error::Result;
use crate::expr::Expr;
use crate::gate::{leaf_type_tag, mix_leaftype, CircType, GateCommon};
use crate::wire::{PinConnection, WireHandle, WireRegistry};

pub struct AssertGate {
    pub(crate) common: GateCommon,
    pub(crate) name: String,
    pub(crate) inputs: Vec<WireHandle>,
    pub(crate) expr: Expr,
}

impl AssertGate {
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        AssertGate {
            common: GateCommon::new(),
            name: name.into(),
            inputs: Vec::new(),
            expr,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &Expr {
        &self.expr
    }

    pub fn add_input(&mut self, registry: &mut WireRegistry, wire: WireHandle) -> Result<()> {
        let pin_index = self.inputs.len();
        registry.connect(wire, PinConnection { gate: self.common.id, pin_index })?;
        self.inputs.push(wire);
        Ok(())
    }

    pub(crate) fn inner_signature(&self) -> Result<u64> {
        let tag = leaf_type_tag(CircType::Assert, self.inputs.len(), 0);
        Ok(mix_leaftype(tag.wrapping_add(self.expr.sign()?)))
    }

    pub(crate) fn inner_equal(&self, other: &AssertGate) -> bool {
        self.inputs.len() == other.inputs.len() && self.expr.equals(&other.expr)
    }
}
