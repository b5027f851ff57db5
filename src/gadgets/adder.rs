//! Cuccaro ripple-carry arithmetic (quant-ph/0410184): in-place addition of
//! two registers of possibly unequal width with one shared carry ancilla,
//! plus the subtractor and less-than comparator derived from it by operand
//! negation.

use log::debug;

use crate::core::{Gate, Register, RegisterRole, Routine, WireAllocator, WireId};
use crate::gadgets::mcx::emit_mcx;

/// Registers of one arithmetic routine. `cout` is present iff the routine
/// was built with an overflow wire; `scratch` holds the clean wires the
/// carry propagation borrows for unequal widths (empty otherwise).
#[derive(Clone, Debug)]
pub struct ArithWires {
    pub a: Register,
    pub b: Register,
    pub cin: Register,
    pub cout: Option<Register>,
    pub scratch: Register,
}

/// Majority primitive on (carry, b, a): folds the running carry into `a`,
/// which serves as scratch until the mirrored chain unwinds it.
fn majority(seq: &mut Routine, c: WireId, b: WireId, a: WireId) {
    seq.push(Gate::cnot(a, b));
    seq.push(Gate::cnot(a, c));
    seq.push(Gate::ccnot(c, b, a));
}

/// Inverse of [`majority`]; the comparator unwinds with this so `b` comes
/// back untouched.
fn majority_dag(seq: &mut Routine, c: WireId, b: WireId, a: WireId) {
    seq.push(Gate::ccnot(c, b, a));
    seq.push(Gate::cnot(a, c));
    seq.push(Gate::cnot(a, b));
}

/// Unmajority-and-add primitive: restores `a` and writes the sum bit into
/// `b`.
fn unmajority(seq: &mut Routine, c: WireId, b: WireId, a: WireId) {
    seq.push(Gate::not(b));
    seq.push(Gate::cnot(c, b));
    seq.push(Gate::ccnot(c, b, a));
    seq.push(Gate::not(b));
    seq.push(Gate::cnot(a, c));
    seq.push(Gate::cnot(a, b));
}

struct Layout {
    /// Shared width, `min(a_len, b_len)`.
    m: usize,
    /// Top shared bit index, `m - 1`.
    end: usize,
    /// `end` minus one when the top bit is folded by the middle logic
    /// directly (plain modulo reduction), `end` otherwise.
    ends: usize,
    b_is_bigger: bool,
}

fn layout(a_len: usize, b_len: usize, overflow: bool) -> Layout {
    let m = a_len.min(b_len);
    let b_is_bigger = b_len > m;
    let sub = if overflow || b_is_bigger { 0 } else { 1 };
    let end = m - 1;
    Layout {
        m,
        end,
        ends: end - sub,
        b_is_bigger,
    }
}

/// Number of clean scratch wires [`emit_adder`] borrows for the carry
/// propagation through `b`'s extra high bits. Zero whenever `b` is at most
/// as wide as `a`.
pub fn adder_scratch_len(a_len: usize, b_len: usize, overflow: bool) -> usize {
    let m = a_len.min(b_len);
    if m == 0 || b_len <= m {
        return 0;
    }
    // widest multi-controlled NOT: the carry plus every extra bit of b
    // (minus the topmost target when there is no overflow wire)
    let controls = b_len - m + usize::from(overflow);
    controls.saturating_sub(2)
}

/// Middle logic between the forward and mirrored chains: routes the final
/// carry into the top of `b`, through `b`'s extra high bits, or into the
/// overflow wire.
///
/// In comparator mode (`restore_b`) `b` is never written here; only the
/// overflow wire takes information, and `a` is compared as if
/// complement-extended to the wider operand's width.
fn middle_logic(
    seq: &mut Routine,
    a: &[WireId],
    b: &[WireId],
    cout: Option<WireId>,
    lay: &Layout,
    scratch: &[WireId],
    restore_b: bool,
) {
    let a_len = a.len();
    let b_len = b.len();
    if !lay.b_is_bigger {
        if restore_b && a_len > b_len {
            if let Some(cout) = cout {
                debug!("middle logic: comparator, a is wider, a_len={a_len} b_len={b_len}");
                // a is negated at this point, so its extra bits already
                // hold the complement: the flag fires iff the running
                // carry ripples through zeros all the way up
                let mut controls = vec![a[lay.ends]];
                controls.extend_from_slice(&a[lay.ends + 1..]);
                let need = controls.len().saturating_sub(2);
                emit_mcx(seq, &controls, &scratch[..need], cout);
            }
            return;
        }
        debug!("middle logic: shared top, a_len={a_len} b_len={b_len}");
        let outbit = cout.unwrap_or(b[lay.end]);
        seq.push(Gate::cnot(a[lay.ends], outbit));
        if cout.is_none() && a_len == b_len {
            // plain modulo-2^w reduction, as in Cuccaro's paper
            seq.push(Gate::cnot(a[lay.end], outbit));
        } else if a_len > b_len {
            seq.push(Gate::cnot(a[lay.ends + 1], outbit));
        }
    } else if restore_b {
        if let Some(cout) = cout {
            debug!("middle logic: comparator, b is bigger, a_len={a_len} b_len={b_len}");
            // a compares as if complement-extended to b's width: the flag
            // fires iff the running carry or any extra bit of b is set
            let mut controls = vec![a[lay.ends]];
            controls.extend_from_slice(&b[lay.end + 1..]);
            for &w in &controls {
                seq.push(Gate::not(w));
            }
            let need = controls.len().saturating_sub(2);
            emit_mcx(seq, &controls, &scratch[..need], cout);
            for &w in &controls {
                seq.push(Gate::not(w));
            }
            seq.push(Gate::not(cout));
        }
    } else {
        // b extends past the shared width: the carry held in a's top
        // scratch bit increments b's extra high bits. Each flip needs the
        // carry together with every lower extra bit's pre-increment value,
        // so the propagation goes top-down as multi-controlled NOTs over
        // still-unchanged bits.
        debug!("middle logic: b is bigger, a_len={a_len} b_len={b_len}");
        let carry = a[lay.ends];
        let extra = &b[lay.end + 1..];
        if let Some(cout) = cout {
            let mut controls = vec![carry];
            controls.extend_from_slice(extra);
            let need = controls.len().saturating_sub(2);
            emit_mcx(seq, &controls, &scratch[..need], cout);
        }
        for i in (0..extra.len()).rev() {
            let mut controls = vec![carry];
            controls.extend_from_slice(&extra[..i]);
            let need = controls.len().saturating_sub(2);
            emit_mcx(seq, &controls, &scratch[..need], extra[i]);
        }
    }
}

/// Emits the ripple-carry core over explicit wires, addressed LSB first.
///
/// `cin` must be zero on entry and is restored. `cout`, when present, must
/// be zero on entry and receives the true carry of the addition. With
/// `restore_b` the unmajority chain is replaced by the inverse majority
/// chain: `b` is structurally restored and only `cout` keeps information
/// (comparator mode).
fn emit_core(
    seq: &mut Routine,
    a: &[WireId],
    b: &[WireId],
    cin: WireId,
    cout: Option<WireId>,
    scratch: &[WireId],
    restore_b: bool,
) {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 || b_len == 0 {
        // identity on the other operand
        return;
    }
    let need = if restore_b {
        a_len.abs_diff(b_len).saturating_sub(1)
    } else {
        adder_scratch_len(a_len, b_len, cout.is_some())
    };
    assert!(
        scratch.len() >= need,
        "carry propagation over unequal widths needs {need} clean scratch wires, got {}",
        scratch.len()
    );
    if b_len == 1 && !restore_b {
        // Fixed base-case pattern, no carry ancilla involved.
        seq.push(Gate::cnot(a[0], b[0]));
        if let Some(cout) = cout {
            seq.push(Gate::not(b[0]));
            seq.push(Gate::ccnot(a[0], b[0], cout));
            seq.push(Gate::not(b[0]));
            if a_len > 1 {
                seq.push(Gate::cnot(a[1], cout));
            }
        }
        return;
    }

    let lay = layout(a_len, b_len, cout.is_some());
    debug!(
        "ripple layout: m={} end={} ends={} b_is_bigger={}",
        lay.m, lay.end, lay.ends, lay.b_is_bigger
    );

    majority(seq, cin, b[0], a[0]);
    for j in 0..lay.ends {
        majority(seq, a[j], b[j + 1], a[j + 1]);
    }

    middle_logic(seq, a, b, cout, &lay, scratch, restore_b);

    if restore_b {
        for j in (0..lay.ends).rev() {
            majority_dag(seq, a[j], b[j + 1], a[j + 1]);
        }
        majority_dag(seq, cin, b[0], a[0]);
    } else {
        for j in (0..lay.ends).rev() {
            unmajority(seq, a[j], b[j + 1], a[j + 1]);
        }
        unmajority(seq, cin, b[0], a[0]);
    }
}

/// Emits `B := A + B` over caller-provided wires, addressed LSB first; the
/// composition primitive behind [`adder`] and the weight-circuit builder.
///
/// `cin` must be zero on entry and is restored. `cout`, when present, must
/// be zero on entry and receives the true carry; without it the sum wraps
/// modulo `2^b.len()`. `scratch` must hold at least
/// [`adder_scratch_len`] clean wires; they are restored.
pub fn emit_adder(
    seq: &mut Routine,
    a: &[WireId],
    b: &[WireId],
    cin: WireId,
    cout: Option<WireId>,
    scratch: &[WireId],
) {
    emit_core(seq, a, b, cin, cout, scratch, false);
}

fn alloc_wires(
    alloc: &mut WireAllocator,
    a_len: usize,
    b_len: usize,
    overflow: bool,
    scratch_len: usize,
) -> ArithWires {
    let a = alloc.allocate(a_len, RegisterRole::OperandA);
    let b = alloc.allocate(b_len, RegisterRole::OperandB);
    let cin = alloc.allocate(1, RegisterRole::CarryIn);
    let cout = overflow.then(|| alloc.allocate(1, RegisterRole::CarryOut));
    let scratch = alloc.allocate(scratch_len, RegisterRole::Scratch);
    ArithWires {
        a,
        b,
        cin,
        cout,
        scratch,
    }
}

/// Big-endian is a pure addressing transform: bit 0 moves to the other end
/// of the register, the algorithm itself is unchanged.
fn addressed(reg: &Register, little_endian: bool) -> Vec<WireId> {
    let mut wires = reg.wires().to_vec();
    if !little_endian {
        wires.reverse();
    }
    wires
}

fn declare_arith(seq: &mut Routine, wires: &ArithWires) {
    seq.declare_ancilla(wires.cin.wires()[0]);
    for w in wires.scratch.iter() {
        seq.declare_ancilla(w);
    }
    for w in wires.b.iter() {
        seq.declare_output(w);
    }
    if let Some(cout) = &wires.cout {
        seq.declare_output(cout.wires()[0]);
    }
}

/// Builds the in-place adder `B := A + B`.
///
/// The low `b_len` bits of the sum land in B; with `overflow` the true
/// carry lands on the carry-out wire, without it the result is reduced
/// modulo `2^b_len`. A is unchanged and the carry-in ancilla is restored.
/// Widths need not be equal and either may be zero (identity on the other
/// operand).
pub fn adder(
    alloc: &mut WireAllocator,
    a_len: usize,
    b_len: usize,
    overflow: bool,
    little_endian: bool,
) -> (Routine, ArithWires) {
    let scratch_len = adder_scratch_len(a_len, b_len, overflow);
    let wires = alloc_wires(alloc, a_len, b_len, overflow, scratch_len);
    let a = addressed(&wires.a, little_endian);
    let b = addressed(&wires.b, little_endian);
    let cout = wires.cout.as_ref().map(|r| r.wires()[0]);
    let mut seq = Routine::new();
    emit_core(
        &mut seq,
        &a,
        &b,
        wires.cin.wires()[0],
        cout,
        wires.scratch.wires(),
        false,
    );
    declare_arith(&mut seq, &wires);
    (seq, wires)
}

/// Builds the in-place subtractor `B := A - B` using the two's-complement
/// trick: negate A, add, negate A and B back.
///
/// When the true difference is negative the result wraps to
/// `2^b_len + (A - B)`; with `overflow` the carry-out wire records that the
/// difference was negative.
pub fn subtractor(
    alloc: &mut WireAllocator,
    a_len: usize,
    b_len: usize,
    overflow: bool,
    little_endian: bool,
) -> (Routine, ArithWires) {
    let scratch_len = adder_scratch_len(a_len, b_len, overflow);
    let wires = alloc_wires(alloc, a_len, b_len, overflow, scratch_len);
    let a = addressed(&wires.a, little_endian);
    let b = addressed(&wires.b, little_endian);
    let cout = wires.cout.as_ref().map(|r| r.wires()[0]);
    let mut seq = Routine::new();
    for &w in &a {
        seq.push(Gate::not(w));
    }
    emit_core(
        &mut seq,
        &a,
        &b,
        wires.cin.wires()[0],
        cout,
        wires.scratch.wires(),
        false,
    );
    for &w in &a {
        seq.push(Gate::not(w));
    }
    for &w in &b {
        seq.push(Gate::not(w));
    }
    declare_arith(&mut seq, &wires);
    (seq, wires)
}

/// Builds the less-than comparator: the carry-out wire ends one iff
/// `A < B`, the narrower operand compared as if zero-extended to the wider
/// width. A and B are numerically unchanged; the adder's sum is
/// structurally undone rather than measured.
pub fn comparator(
    alloc: &mut WireAllocator,
    a_len: usize,
    b_len: usize,
    little_endian: bool,
) -> (Routine, ArithWires) {
    let scratch_len = a_len.abs_diff(b_len).saturating_sub(1);
    let wires = alloc_wires(alloc, a_len, b_len, true, scratch_len);
    let a = addressed(&wires.a, little_endian);
    let b = addressed(&wires.b, little_endian);
    let cout = wires.cout.as_ref().map(|r| r.wires()[0]);
    let mut seq = Routine::new();
    for &w in &a {
        seq.push(Gate::not(w));
    }
    emit_core(
        &mut seq,
        &a,
        &b,
        wires.cin.wires()[0],
        cout,
        wires.scratch.wires(),
        true,
    );
    for &w in &a {
        seq.push(Gate::not(w));
    }
    seq.declare_ancilla(wires.cin.wires()[0]);
    for w in wires.scratch.iter() {
        seq.declare_ancilla(w);
    }
    if let Some(cout) = &wires.cout {
        seq.declare_output(cout.wires()[0]);
    }
    (seq, wires)
}
