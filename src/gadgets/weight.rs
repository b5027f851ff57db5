//! Hamming-weight (population count) circuits.
//!
//! A pure planner maps an input width to a balanced pairwise-reduction
//! schedule ([`TreePattern`]); the circuit builder then instantiates the
//! generic ripple-carry adder once per scheduled step. The pattern is a
//! plain serializable value meant to be computed once per width and reused
//! across circuit builds.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{Gate, Register, RegisterRole, Routine, WireAllocator, WireId};
use crate::gadgets::{adder::emit_adder, mcx::emit_mcx};

/// Errors reported while planning or instantiating a weight circuit. All
/// of them precede any gate emission; a routine is never partially built.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The planner needs at least one input line.
    #[error("weight pattern needs at least one input line")]
    EmptyPattern,
    /// A register width does not match the pattern it is bound to.
    #[error("register width {got} does not match the pattern ({expected})")]
    WidthMismatch { expected: usize, got: usize },
    /// The pattern references a wire label outside the bound registers.
    #[error("pattern references unknown wire {0:?}")]
    UnknownWire(PatternWire),
    /// The requested weight does not fit in the result register.
    #[error("weight {weight} does not fit in {bits} result bits")]
    WeightTooLarge { weight: usize, bits: usize },
}

/// Label of a planner wire: an input line or one of the tree carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternWire {
    Line(usize),
    Carry(usize),
}

/// One scheduled reduction: the generic adder folds the first half of
/// `inputs` into the second half in place, with carry number `carry`
/// receiving the overflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionStep {
    pub inputs: Vec<PatternWire>,
    pub carry: usize,
}

/// Balanced pairwise-reduction schedule for one input width.
///
/// `n_lines` is the next power of two at or above the requested width; when
/// the requested width is smaller, the trailing lines must be zero on entry
/// (asserted by the caller, not enforced here). Value object: compute once
/// per width, cache and reuse freely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePattern {
    pub n_lines: usize,
    pub n_carries: usize,
    pub steps: Vec<ReductionStep>,
    /// Wire labels holding the final weight, LSB first.
    pub results: Vec<PatternWire>,
}

/// Plans the reduction tree for `n` input bits. Pure function, no gates.
///
/// Each round halves the surviving wire groups: a group pair feeds one
/// adder instance that keeps the pairwise sum in the second group and
/// spills its overflow onto a fresh carry wire.
pub fn weight_pattern(n: usize) -> Result<TreePattern, Error> {
    if n == 0 {
        return Err(Error::EmptyPattern);
    }
    let n_lines = n.next_power_of_two();
    let rounds = n_lines.trailing_zeros() as usize;
    let n_carries = n_lines - 1;

    // Stack ordered so that pop() hands out line 0 first.
    let mut survivors: Vec<PatternWire> = (0..n_lines).rev().map(PatternWire::Line).collect();
    let mut next_carry = 0;

    let mut steps = Vec::with_capacity(n_carries);
    let mut n_adders = n_lines;
    let mut group = 0;
    for round in 0..rounds {
        n_adders /= 2;
        group += 2;
        debug!("round {round}: {n_adders} adders over {group}-label groups");
        let mut stage_outputs = Vec::new();
        for _ in 0..n_adders {
            let mut inputs = survivors.split_off(survivors.len() - group);
            inputs.reverse();
            let carry = next_carry;
            next_carry += 1;
            stage_outputs.extend_from_slice(&inputs[group / 2..]);
            stage_outputs.push(PatternWire::Carry(carry));
            steps.push(ReductionStep { inputs, carry });
        }
        // the next round consumes outputs in production order
        stage_outputs.reverse();
        survivors = stage_outputs;
    }

    survivors.reverse();
    Ok(TreePattern {
        n_lines,
        n_carries,
        steps,
        results: survivors,
    })
}

/// Registers of a weight circuit.
#[derive(Clone, Debug)]
pub struct WeightWires {
    pub a: Register,
    pub carries: Register,
    pub cin: Register,
}

fn resolve(wire: PatternWire, a: &Register, carries: &Register) -> Result<WireId, Error> {
    match wire {
        PatternWire::Line(i) => a.get(i).ok_or(Error::UnknownWire(wire)),
        PatternWire::Carry(i) => carries.get(i).ok_or(Error::UnknownWire(wire)),
    }
}

/// Maps the pattern's result labels onto a circuit's registers, LSB first.
pub fn result_wires(
    pattern: &TreePattern,
    a: &Register,
    carries: &Register,
) -> Result<Vec<WireId>, Error> {
    pattern
        .results
        .iter()
        .map(|&w| resolve(w, a, carries))
        .collect()
}

/// Builds the population-count circuit for `pattern`.
///
/// Leaves the weight of A's initial bits, in binary, on the pattern's
/// result wires (a mix of A and carry wires, LSB first). Non-result wires
/// end in a deterministic but non-zero state: the routine is meant to be
/// inverted as a whole unit, not uncomputed bit by bit, so every operand
/// and carry wire is declared an output. One carry-in ancilla is shared by
/// all adder instances; each instance restores it.
pub fn weight_circuit(
    alloc: &mut WireAllocator,
    a_len: usize,
    carry_len: usize,
    pattern: &TreePattern,
) -> Result<(Routine, WeightWires), Error> {
    if a_len != pattern.n_lines {
        return Err(Error::WidthMismatch {
            expected: pattern.n_lines,
            got: a_len,
        });
    }
    if carry_len != pattern.n_carries {
        return Err(Error::WidthMismatch {
            expected: pattern.n_carries,
            got: carry_len,
        });
    }
    let a = alloc.allocate(a_len, RegisterRole::OperandA);
    let carries = alloc.allocate(carry_len, RegisterRole::TreeCarry);
    let cin = alloc.allocate(1, RegisterRole::CarryIn);

    // Resolve the whole schedule first: failure must precede any output.
    let mut plan = Vec::with_capacity(pattern.steps.len());
    for step in &pattern.steps {
        let inputs: Vec<WireId> = step
            .inputs
            .iter()
            .map(|&w| resolve(w, &a, &carries))
            .collect::<Result<_, _>>()?;
        let cout = carries
            .get(step.carry)
            .ok_or(Error::UnknownWire(PatternWire::Carry(step.carry)))?;
        plan.push((inputs, cout));
    }

    let cin_wire = cin.wires()[0];
    let mut seq = Routine::new();
    for (inputs, cout) in plan {
        let half = inputs.len() / 2;
        debug!("reduction step: {half}+{half} bits into carry {cout}");
        emit_adder(&mut seq, &inputs[..half], &inputs[half..], cin_wire, Some(cout), &[]);
    }
    seq.declare_ancilla(cin_wire);
    for w in a.iter().chain(carries.iter()) {
        seq.declare_output(w);
    }
    Ok((seq, WeightWires { a, carries, cin }))
}

/// Registers of a weight-equals-k circuit.
#[derive(Clone, Debug)]
pub struct WeightCheckWires {
    pub weight: WeightWires,
    /// Clean ancillae of the multi-controlled NOT; empty without a flag.
    pub scratch: Register,
    pub flag: Option<Register>,
}

/// Builds the `weight(A) == k` predicate.
///
/// Computes the weight, then flips every result wire whose bit of `k`
/// (little-endian) is zero, so the result wires are all ones exactly when
/// the weight equals `k`. With `compute_flag` a multi-controlled NOT folds
/// them into a freshly allocated flag wire.
///
/// Built for the compute–uncompute pattern: apply
/// `weight_check(.., true)`, then the inverse of `weight_check(.., false)`
/// over the same leading wires, and everything is restored except the
/// flag. The flag-less variant also serves callers that use the biased
/// result wires directly as controls for further circuitry.
pub fn weight_check(
    alloc: &mut WireAllocator,
    a_len: usize,
    carry_len: usize,
    weight: usize,
    pattern: &TreePattern,
    compute_flag: bool,
) -> Result<(Routine, WeightCheckWires), Error> {
    let bits = pattern.results.len();
    if bits < usize::BITS as usize && weight >> bits != 0 {
        return Err(Error::WeightTooLarge { weight, bits });
    }

    let (mut seq, wires) = weight_circuit(alloc, a_len, carry_len, pattern)?;
    let results = result_wires(pattern, &wires.a, &wires.carries)?;
    for (i, &w) in results.iter().enumerate() {
        if weight >> i & 1 == 0 {
            seq.push(Gate::not(w));
        }
    }

    let (scratch, flag) = if compute_flag {
        let scratch = alloc.allocate(results.len().saturating_sub(2), RegisterRole::Scratch);
        let flag = alloc.allocate(1, RegisterRole::Flag);
        emit_mcx(&mut seq, &results, scratch.wires(), flag.wires()[0]);
        for w in scratch.iter() {
            seq.declare_ancilla(w);
        }
        seq.declare_output(flag.wires()[0]);
        (scratch, Some(flag))
    } else {
        (alloc.allocate(0, RegisterRole::Scratch), None)
    };

    Ok((
        seq,
        WeightCheckWires {
            weight: wires,
            scratch,
            flag,
        },
    ))
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use test_log::test;

    use super::*;
    use crate::test_utils::{execute, trng};

    use PatternWire::{Carry, Line};

    fn load_bits(state: &mut [bool], wires: &Register, bits: &str) {
        for (w, c) in wires.iter().zip(bits.chars()) {
            state[w.0] = c == '1';
        }
    }

    fn circuit_weight(bits: &str) -> u64 {
        let pattern = weight_pattern(bits.len()).unwrap();
        let mut alloc = WireAllocator::new();
        let (seq, wires) =
            weight_circuit(&mut alloc, pattern.n_lines, pattern.n_carries, &pattern).unwrap();
        let mut state = vec![false; alloc.allocated()];
        load_bits(&mut state, &wires.a, bits);
        execute(&seq, &mut state);

        assert!(!state[wires.cin.wires()[0].0], "shared carry-in not restored");
        let results = result_wires(&pattern, &wires.a, &wires.carries).unwrap();
        results
            .iter()
            .enumerate()
            .map(|(i, w)| (state[w.0] as u64) << i)
            .sum()
    }

    #[test]
    fn plans_single_line() {
        let pattern = weight_pattern(1).unwrap();
        assert_eq!(pattern.n_lines, 1);
        assert_eq!(pattern.n_carries, 0);
        assert!(pattern.steps.is_empty());
        assert_eq!(pattern.results, vec![Line(0)]);
    }

    #[test]
    fn plans_four_lines() {
        let pattern = weight_pattern(4).unwrap();
        assert_eq!(pattern.n_lines, 4);
        assert_eq!(pattern.n_carries, 3);
        assert_eq!(
            pattern.steps,
            vec![
                ReductionStep {
                    inputs: vec![Line(0), Line(1)],
                    carry: 0,
                },
                ReductionStep {
                    inputs: vec![Line(2), Line(3)],
                    carry: 1,
                },
                ReductionStep {
                    inputs: vec![Line(1), Carry(0), Line(3), Carry(1)],
                    carry: 2,
                },
            ]
        );
        assert_eq!(pattern.results, vec![Line(3), Carry(1), Carry(2)]);
    }

    #[test]
    fn rounds_up_to_the_next_power_of_two() {
        let pattern = weight_pattern(5).unwrap();
        assert_eq!(pattern.n_lines, 8);
        assert_eq!(pattern.n_carries, 7);
        assert_eq!(pattern.results.len(), 4);
    }

    #[test]
    fn rejects_zero_lines() {
        assert_eq!(weight_pattern(0), Err(Error::EmptyPattern));
    }

    #[test]
    fn pattern_survives_serialization() {
        let pattern = weight_pattern(8).unwrap();
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(serde_json::from_str::<TreePattern>(&json).unwrap(), pattern);
    }

    #[test]
    fn counts_known_bitstrings() {
        // mixed widths, incl. the non-power-of-two "10110100" -> 100b
        for bits in [
            "0000", "0101", "0001", "1101", "1001", "1111", "10110100", "11001011", "11010000",
        ] {
            let expected = bits.chars().filter(|&c| c == '1').count() as u64;
            assert_eq!(circuit_weight(bits), expected, "bits={bits}");
        }
    }

    #[test]
    fn counts_non_power_of_two_widths() {
        for bits in ["1", "0", "111", "10110", "1111111"] {
            let expected = bits.chars().filter(|&c| c == '1').count() as u64;
            assert_eq!(circuit_weight(bits), expected, "bits={bits}");
        }
    }

    #[test]
    fn counts_random_wide_strings() {
        let mut rng = trng();
        for _ in 0..16 {
            let bits: String = (0..16)
                .map(|_| if rng.random::<bool>() { '1' } else { '0' })
                .collect();
            let expected = bits.chars().filter(|&c| c == '1').count() as u64;
            assert_eq!(circuit_weight(&bits), expected, "bits={bits}");
        }
    }

    #[test]
    fn weight_circuit_inverts_as_a_unit() {
        let pattern = weight_pattern(8).unwrap();
        let mut alloc = WireAllocator::new();
        let (seq, wires) =
            weight_circuit(&mut alloc, pattern.n_lines, pattern.n_carries, &pattern).unwrap();
        let mut state = vec![false; alloc.allocated()];
        load_bits(&mut state, &wires.a, "10110100");
        let original = state.clone();
        execute(&seq, &mut state);
        execute(&seq.inverse(), &mut state);
        assert_eq!(state, original);
    }

    #[test]
    fn rejects_mismatched_register_widths() {
        let pattern = weight_pattern(4).unwrap();
        let mut alloc = WireAllocator::new();
        assert_eq!(
            weight_circuit(&mut alloc, 5, pattern.n_carries, &pattern)
                .err()
                .unwrap(),
            Error::WidthMismatch {
                expected: 4,
                got: 5
            }
        );
        assert_eq!(
            weight_circuit(&mut alloc, 4, 1, &pattern).err().unwrap(),
            Error::WidthMismatch {
                expected: 3,
                got: 1
            }
        );
    }

    #[test]
    fn rejects_unknown_pattern_wires() {
        let mut pattern = weight_pattern(4).unwrap();
        pattern.steps[0].inputs[0] = Carry(99);
        let mut alloc = WireAllocator::new();
        let err = weight_circuit(&mut alloc, 4, 3, &pattern).err().unwrap();
        assert_eq!(err, Error::UnknownWire(Carry(99)));
    }

    /// Runs `weight_check(.., true)` then the inverse of
    /// `weight_check(.., false)` and returns the flag; everything else must
    /// be back in its initial state.
    fn check_and_uncompute(bits: &str, weight: usize) -> bool {
        let pattern = weight_pattern(bits.len()).unwrap();
        let mut alloc = WireAllocator::new();
        let (compute, wires) = weight_check(
            &mut alloc,
            pattern.n_lines,
            pattern.n_carries,
            weight,
            &pattern,
            true,
        )
        .unwrap();
        // same leading wire layout, no flag, no scratch
        let mut shadow = WireAllocator::new();
        let (uncompute, _) = weight_check(
            &mut shadow,
            pattern.n_lines,
            pattern.n_carries,
            weight,
            &pattern,
            false,
        )
        .unwrap();

        let mut state = vec![false; alloc.allocated()];
        load_bits(&mut state, &wires.weight.a, bits);
        let original = state.clone();
        execute(&compute, &mut state);
        execute(&uncompute.inverse(), &mut state);

        let flag_wire = wires.flag.as_ref().unwrap().wires()[0];
        for (i, (&got, &was)) in state.iter().zip(original.iter()).enumerate() {
            if i != flag_wire.0 {
                assert_eq!(got, was, "wire {i} not restored (bits={bits} k={weight})");
            }
        }
        state[flag_wire.0]
    }

    #[test]
    fn flags_matching_weight_and_restores_everything_else() {
        for (bits, weight) in [("10110100", 4), ("0000", 0), ("1111", 4), ("110", 2)] {
            assert!(check_and_uncompute(bits, weight), "bits={bits} k={weight}");
        }
        for (bits, weight) in [("10110100", 3), ("0000", 1), ("1111", 0), ("110", 3)] {
            assert!(!check_and_uncompute(bits, weight), "bits={bits} k={weight}");
        }
    }

    #[test]
    fn rejects_oversized_weight() {
        let pattern = weight_pattern(4).unwrap();
        let mut alloc = WireAllocator::new();
        let err = weight_check(&mut alloc, 4, 3, 8, &pattern, true).err().unwrap();
        assert_eq!(err, Error::WeightTooLarge { weight: 8, bits: 3 });
    }
}
