//! Delay (register) gate: one input, one output, no combinational logic.
//! Grounded in `original_source/src/circuitDelay.{h,cpp}`.

use crate::error::Result;
use crate::gate::{leaf_type_tag, mix_leaftype, CircType, GateCommon};
use crate::wire::{PinConnection, WireHandle, WireRegistry};

pub struct DelayGate {
    pub(crate) common: GateCommon,
    pub(crate) input: WireHandle,
    pub(crate) output: WireHandle,
}

impl DelayGate {
    /// Wires are fixed at construction; this eagerly registers the gate on
    /// both wires' adjacency lists (spec.md §4.C).
    pub fn new(registry: &mut WireRegistry, input: WireHandle, output: WireHandle) -> Result<Self> {
        let common = GateCommon::new();
        registry.connect(input, PinConnection { gate: common.id, pin_index: 0 })?;
        registry.connect(output, PinConnection { gate: common.id, pin_index: 0 })?;
        Ok(DelayGate { common, input, output })
    }

    pub fn input(&self) -> WireHandle {
        self.input
    }

    pub fn output(&self) -> WireHandle {
        self.output
    }

    pub(crate) fn inner_signature(&self) -> u64 {
        mix_leaftype(leaf_type_tag(CircType::Delay, 1, 1))
    }

    /// Every delay gate has the same fixed 1-input/1-output shape, so
    /// `innerEqual` degenerates to `true` once the outer dispatch has
    /// already confirmed both gates are delays (`CircuitDelay` carries no
    /// other structural state).
    pub(crate) fn inner_equal(&self, _other: &DelayGate) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireRegistry;

    #[test]
    fn delay_signature_is_fixed() {
        let mut reg = WireRegistry::new();
        let i = reg.fresh("i").unwrap();
        let o = reg.fresh("o").unwrap();
        let a = DelayGate::new(&mut reg, i, o).unwrap();
        let b = DelayGate::new(&mut reg, i, o).unwrap();
        assert_eq!(a.inner_signature(), b.inner_signature());
        assert!(a.inner_equal(&b));
    }
}
