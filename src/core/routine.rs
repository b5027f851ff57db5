use crate::core::{
    gate::{Gate, GateKind},
    wire::WireId,
};

/// An ordered, appendable log of elementary gates plus the wire contracts a
/// caller relies on: declared ancillae are guaranteed restored to zero by
/// the end of the routine, declared outputs are not restored.
///
/// A routine followed by its [`inverse`](Routine::inverse) is the identity
/// on every wire except the declared outputs. Ancilla cleanliness is a
/// logical contract, not runtime-enforced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Routine {
    gates: Vec<Gate>,
    ancillae: Vec<WireId>,
    outputs: Vec<WireId>,
}

impl Routine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    /// Appends another routine's gates and wire declarations.
    pub fn extend(&mut self, other: Routine) {
        self.gates.extend(other.gates);
        for w in other.ancillae {
            self.declare_ancilla(w);
        }
        for w in other.outputs {
            self.declare_output(w);
        }
    }

    /// Declares a wire that must be zero on entry and is restored to zero.
    pub fn declare_ancilla(&mut self, wire: WireId) {
        if !self.ancillae.contains(&wire) {
            self.ancillae.push(wire);
        }
    }

    /// Declares a wire the routine leaves in a changed state.
    pub fn declare_output(&mut self, wire: WireId) {
        if !self.outputs.contains(&wire) {
            self.outputs.push(wire);
        }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn ancillae(&self) -> &[WireId] {
        &self.ancillae
    }

    pub fn outputs(&self) -> &[WireId] {
        &self.outputs
    }

    /// Exact inverse: the same gates in reverse order (every elementary
    /// gate is self-inverse). Wire declarations carry over unchanged.
    pub fn inverse(&self) -> Routine {
        Routine {
            gates: self.gates.iter().rev().copied().collect(),
            ancillae: self.ancillae.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Lifts every gate under one extra control wire: the routine acts as
    /// before when `control` is one and as the identity when it is zero.
    ///
    /// `scratch` must be zero on entry; it carries the intermediate AND
    /// while lifting `CCNOT` gates and is restored after each one.
    pub fn controlled(&self, control: WireId, scratch: WireId) -> Routine {
        let mut lifted = Routine::new();
        for gate in &self.gates {
            match *gate {
                Gate::Not { target } => lifted.push(Gate::cnot(control, target)),
                Gate::Cnot { control: c, target } => lifted.push(Gate::ccnot(c, control, target)),
                Gate::Ccnot {
                    control_a,
                    control_b,
                    target,
                } => {
                    lifted.push(Gate::ccnot(control_a, control_b, scratch));
                    lifted.push(Gate::ccnot(scratch, control, target));
                    lifted.push(Gate::ccnot(control_a, control_b, scratch));
                }
            }
        }
        for &w in &self.ancillae {
            lifted.declare_ancilla(w);
        }
        for &w in &self.outputs {
            lifted.declare_output(w);
        }
        lifted.declare_ancilla(scratch);
        lifted
    }

    /// Flat `(kind, operand wire indices)` export: the artifact handed to
    /// an external gate-level executor.
    pub fn flat_ops(&self) -> Vec<(GateKind, Vec<usize>)> {
        self.gates
            .iter()
            .map(|gate| (gate.kind(), gate.wires().iter().map(|w| w.0).collect()))
            .collect()
    }
}
