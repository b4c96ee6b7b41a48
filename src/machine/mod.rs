//! The word machine.
//!
//! A small register machine for running console programs:
//! - 32 word registers, the top eight reserved by the calling convention
//! - separate instruction store, indexed by the program counter
//! - sparse data memory with the console register on the bus

pub mod execute;
pub mod instruction;
pub mod memory;
pub mod program;
pub mod registers;

pub use execute::{Machine, MachineError, MachineState};
pub use instruction::{BinaryOp, Instruction, Reg, UnaryOp};
pub use memory::{Bus, BusError, Memory};
pub use program::{DataSegment, ProgramImage};
pub use registers::Registers;
