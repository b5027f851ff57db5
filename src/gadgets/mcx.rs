//! Multi-controlled NOT over clean ancillae: a CCNOT chain folds the
//! controls pairwise toward the target and uncomputes itself afterwards.

use crate::core::{Gate, Routine, WireId};

/// Emits `target ^= AND(controls)`.
///
/// Needs exactly `controls.len() - 2` ancilla wires for three or more
/// controls (none otherwise); they must be zero on entry and are restored.
/// Zero, one and two controls map straight onto `NOT`, `CNOT` and `CCNOT`.
pub fn emit_mcx(seq: &mut Routine, controls: &[WireId], ancillae: &[WireId], target: WireId) {
    assert_eq!(
        ancillae.len(),
        controls.len().saturating_sub(2),
        "multi-controlled NOT over {} controls needs {} clean ancillae",
        controls.len(),
        controls.len().saturating_sub(2)
    );
    match controls {
        [] => seq.push(Gate::not(target)),
        [c] => seq.push(Gate::cnot(*c, target)),
        [c1, c2] => seq.push(Gate::ccnot(*c1, *c2, target)),
        [rest @ .., last] => {
            // rest has at least two controls here
            let mut chain = vec![Gate::ccnot(rest[0], rest[1], ancillae[0])];
            for i in 2..rest.len() {
                chain.push(Gate::ccnot(rest[i], ancillae[i - 2], ancillae[i - 1]));
            }
            for &gate in &chain {
                seq.push(gate);
            }
            seq.push(Gate::ccnot(*last, ancillae[rest.len() - 2], target));
            for &gate in chain.iter().rev() {
                seq.push(gate);
            }
        }
    }
}
