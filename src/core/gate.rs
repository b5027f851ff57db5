use std::fmt;

use crate::core::wire::WireId;

/// Payload-free tag of an elementary gate, used in the flat executor
/// handoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    Not,
    Cnot,
    Ccnot,
}

/// One elementary reversible gate: the target is XORed with the AND of the
/// controls (zero, one or two of them). Every kind is self-inverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    Not {
        target: WireId,
    },
    Cnot {
        control: WireId,
        target: WireId,
    },
    Ccnot {
        control_a: WireId,
        control_b: WireId,
        target: WireId,
    },
}

impl Gate {
    pub fn not(target: WireId) -> Self {
        Gate::Not { target }
    }

    pub fn cnot(control: WireId, target: WireId) -> Self {
        Gate::Cnot { control, target }
    }

    pub fn ccnot(control_a: WireId, control_b: WireId, target: WireId) -> Self {
        Gate::Ccnot {
            control_a,
            control_b,
            target,
        }
    }

    pub fn kind(&self) -> GateKind {
        match self {
            Gate::Not { .. } => GateKind::Not,
            Gate::Cnot { .. } => GateKind::Cnot,
            Gate::Ccnot { .. } => GateKind::Ccnot,
        }
    }

    pub fn target(&self) -> WireId {
        match *self {
            Gate::Not { target } | Gate::Cnot { target, .. } | Gate::Ccnot { target, .. } => target,
        }
    }

    /// Operand wires in executor order: controls first, target last.
    pub fn wires(&self) -> Vec<WireId> {
        match *self {
            Gate::Not { target } => vec![target],
            Gate::Cnot { control, target } => vec![control, target],
            Gate::Ccnot {
                control_a,
                control_b,
                target,
            } => vec![control_a, control_b, target],
        }
    }

    /// Applies the gate to a classical bit state.
    pub fn eval(&self, state: &mut [bool]) {
        match *self {
            Gate::Not { target } => state[target.0] = !state[target.0],
            Gate::Cnot { control, target } => {
                let c = state[control.0];
                state[target.0] ^= c;
            }
            Gate::Ccnot {
                control_a,
                control_b,
                target,
            } => {
                let c = state[control_a.0] && state[control_b.0];
                state[target.0] ^= c;
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Gate::Not { target } => write!(f, "NOT({target})"),
            Gate::Cnot { control, target } => write!(f, "CNOT({control}, {target})"),
            Gate::Ccnot {
                control_a,
                control_b,
                target,
            } => write!(f, "CCNOT({control_a}, {control_b}, {target})"),
        }
    }
}
