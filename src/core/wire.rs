use std::{fmt, ops::Deref};

/// Identity of one bit wire in the flat address space shared by all
/// registers of a single circuit build. Carries no value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(pub usize);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for WireId {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Semantic role a register plays inside a routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterRole {
    /// Left operand; restored by the arithmetic routines.
    OperandA,
    /// Right operand; receives the in-place result.
    OperandB,
    /// The shared ripple-carry ancilla, zero on entry and restored.
    CarryIn,
    /// Overflow wire: zero on entry, holds the true carry on exit.
    CarryOut,
    /// Carry outputs of the population-count reduction tree.
    TreeCarry,
    /// Borrowed scratch wires (multi-controlled NOT chain), restored.
    Scratch,
    /// Predicate result bit.
    Flag,
}

/// An ordered group of wires with a fixed width and a role. Immutable once
/// allocated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    wires: Vec<WireId>,
    role: RegisterRole,
}

impl Register {
    pub(crate) fn new(wires: Vec<WireId>, role: RegisterRole) -> Self {
        Self { wires, role }
    }

    pub fn role(&self) -> RegisterRole {
        self.role
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<WireId> {
        self.wires.get(index).copied()
    }

    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }

    pub fn iter(&self) -> impl Iterator<Item = WireId> + '_ {
        self.wires.iter().copied()
    }
}

/// Sequential wire allocator: one instance per circuit build, used strictly
/// allocate-then-freeze. An explicit value threaded through every builder
/// call; there is no global counter.
#[derive(Debug, Default)]
pub struct WireAllocator {
    next: usize,
}

impl WireAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next `width` wire indices as a register. Width zero is
    /// allowed and yields an empty register.
    pub fn allocate(&mut self, width: usize, role: RegisterRole) -> Register {
        let wires = (self.next..self.next + width).map(WireId).collect();
        self.next += width;
        Register::new(wires, role)
    }

    /// Total number of wires handed out so far; an executor binding the
    /// produced routine needs a state at least this wide.
    pub fn allocated(&self) -> usize {
        self.next
    }
}
