pub mod gate;
pub mod routine;
pub mod wire;

pub use gate::{Gate, GateKind};
pub use routine::Routine;
pub use wire::{Register, RegisterRole, WireAllocator, WireId};
