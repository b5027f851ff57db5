//! Generator for elementary reversible boolean-logic circuits.
//!
//! Everything here emits ordered sequences of `NOT` / `CNOT` / `CCNOT`
//! operations over indexed bit wires: in-place ripple-carry arithmetic
//! (Cuccaro-style adder, subtractor and less-than comparator) and
//! population-count circuits assembled from a precomputed reduction tree.
//!
//! Routines are immutable values once built. They can be run forward,
//! inverted exactly ([`Routine::inverse`]), lifted under an extra control
//! wire ([`Routine::controlled`]) or exported as a flat operation list
//! ([`Routine::flat_ops`]) for an external gate-level executor; this crate
//! never simulates anything itself.

mod core;
mod gadgets;

pub use crate::core::{Gate, GateKind, Register, RegisterRole, Routine, WireAllocator, WireId};
pub use crate::gadgets::{
    ArithWires, PatternWire, ReductionStep, TreePattern, WeightCheckWires, WeightError,
    WeightWires, adder, adder_scratch_len, comparator, emit_adder, emit_mcx, result_wires,
    subtractor, weight_check, weight_circuit, weight_pattern,
};

#[cfg(test)]
pub mod test_utils {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use crate::{Routine, WireId};

    pub fn trng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0)
    }

    /// Applies a routine's gates to a classical bit state, standing in for
    /// the external executor.
    pub fn execute(routine: &Routine, state: &mut [bool]) {
        for gate in routine.gates() {
            gate.eval(state);
        }
    }

    /// Writes `value` across `wires`; with `little_endian`, `wires[0]` is
    /// the least significant bit.
    pub fn load_wires(state: &mut [bool], wires: &[WireId], value: u64, little_endian: bool) {
        for (i, w) in wires.iter().enumerate() {
            let bit = if little_endian { i } else { wires.len() - 1 - i };
            state[w.0] = (value >> bit) & 1 == 1;
        }
    }

    /// Reads the integer stored across `wires`, inverse of [`load_wires`].
    pub fn read_wires(state: &[bool], wires: &[WireId], little_endian: bool) -> u64 {
        let mut value = 0;
        for (i, w) in wires.iter().enumerate() {
            let bit = if little_endian { i } else { wires.len() - 1 - i };
            value |= (state[w.0] as u64) << bit;
        }
        value
    }
}
