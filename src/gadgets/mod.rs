pub mod adder;
pub mod mcx;
pub mod weight;

pub use adder::{ArithWires, adder, adder_scratch_len, comparator, emit_adder, subtractor};
pub use mcx::emit_mcx;
pub use weight::{
    Error as WeightError, PatternWire, ReductionStep, TreePattern, WeightCheckWires, WeightWires,
    result_wires, weight_check, weight_circuit, weight_pattern,
};
