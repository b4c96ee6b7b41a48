//! Word machine register file.
//!
//! 32 word registers. Registers 0-23 are general purpose; the top eight are
//! reserved by the calling convention:
//! - `start` / `end`: bounds of the current stack frame
//! - `offset`, `new`, `temp`, `temp1`: scratch for frame arithmetic
//! - `rv`: return value
//! - `ra`: return address, written by `jal`

use crate::machine::instruction::Reg;
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// Number of registers.
pub const REGISTER_COUNT: usize = 32;

/// Highest general purpose register.
pub const MAX_GPR: Reg = 23;

pub const START: Reg = 24;
pub const END: Reg = 25;
pub const OFFSET: Reg = 26;
pub const NEW: Reg = 27;
pub const TEMP: Reg = 28;
pub const TEMP1: Reg = 29;
pub const RETURN_VALUE: Reg = 30;
pub const RETURN_ADDRESS: Reg = 31;

/// Assembly names of the reserved registers.
pub const ALIASES: [(&str, Reg); 8] = [
    ("start", START),
    ("end", END),
    ("offset", OFFSET),
    ("new", NEW),
    ("temp", TEMP),
    ("temp1", TEMP1),
    ("rv", RETURN_VALUE),
    ("ra", RETURN_ADDRESS),
];

/// Parse `r0`..`r31` or a reserved alias.
pub fn parse_register(name: &str) -> Option<Reg> {
    let name = name.trim().to_ascii_lowercase();
    if let Some((_, reg)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Some(*reg);
    }
    let index: usize = name.strip_prefix('r')?.parse().ok()?;
    if index < REGISTER_COUNT {
        Some(index as Reg)
    } else {
        None
    }
}

/// Canonical assembly name of a register.
pub fn register_name(reg: Reg) -> String {
    match ALIASES.iter().find(|(_, r)| *r == reg) {
        Some((alias, _)) => alias.to_string(),
        None => format!("r{}", reg),
    }
}

/// The register file plus program counter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    values: [Word; REGISTER_COUNT],
    /// Index of the next instruction.
    pub pc: usize,
}

impl Registers {
    /// Create a register file with everything zeroed.
    pub fn new() -> Self {
        Self {
            values: [0; REGISTER_COUNT],
            pc: 0,
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.values = [0; REGISTER_COUNT];
        self.pc = 0;
    }

    /// Read a register. Indices wrap modulo 32.
    #[inline]
    pub fn get(&self, reg: Reg) -> Word {
        self.values[reg as usize % REGISTER_COUNT]
    }

    /// Write a register. Indices wrap modulo 32.
    #[inline]
    pub fn set(&mut self, reg: Reg, value: Word) {
        self.values[reg as usize % REGISTER_COUNT] = value;
    }

    /// All register values in index order.
    pub fn values(&self) -> &[Word; REGISTER_COUNT] {
        &self.values
    }

    /// Advance the program counter by one, returning the old value.
    pub fn advance_pc(&mut self) -> usize {
        let old = self.pc;
        self.pc += 1;
        old
    }

    /// Set the program counter to an absolute instruction index.
    pub fn jump(&mut self, target: usize) {
        self.pc = target;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
