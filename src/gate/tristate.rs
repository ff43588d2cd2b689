//! Tristate buffer: input, output and an enable line. Grounded in
//! `original_source/src/circuitTristate.{h,cpp}` -- the original leaves
//! `sign()` as `assert(false); // TODO implement`. We complete it the way
//! the sibling leaf gates already do: fold `(circType, input-count,
//! output-count)` through the same `LEAFTYPE` transform `CircuitDelay` uses,
//! counting the enable line as a second input.

use crate::error::Result;
use crate::gate::{leaf_type_tag, mix_leaftype, CircType, GateCommon};
use crate::wire::{PinConnection, WireHandle, WireRegistry};

pub struct TristateGate {
    pub(crate) common: GateCommon,
    pub(crate) inputs: Vec<WireHandle>,
    pub(crate) output: WireHandle,
}

impl TristateGate {
    /// Wires are fixed at construction; eagerly registers the gate on all
    /// three wires' adjacency lists (spec.md §4.C).
    pub fn new(
        registry: &mut WireRegistry,
        input: WireHandle,
        output: WireHandle,
        enable: WireHandle,
    ) -> Result<Self> {
        let common = GateCommon::new();
        registry.connect(input, PinConnection { gate: common.id, pin_index: 0 })?;
        registry.connect(enable, PinConnection { gate: common.id, pin_index: 1 })?;
        registry.connect(output, PinConnection { gate: common.id, pin_index: 0 })?;
        Ok(TristateGate {
            common,
            inputs: vec![input, enable],
            output,
        })
    }

    pub fn input(&self) -> WireHandle {
        self.inputs[0]
    }

    pub fn output(&self) -> WireHandle {
        self.output
    }

    pub fn enable(&self) -> WireHandle {
        self.inputs[1]
    }

    pub(crate) fn inner_signature(&self) -> u64 {
        mix_leaftype(leaf_type_tag(CircType::Tristate, self.inputs.len(), 1))
    }

    pub(crate) fn inner_equal(&self, _other: &TristateGate) -> bool {
        true
    }
}
