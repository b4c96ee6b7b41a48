//! Execution engine for the word machine.
//!
//! Implements the fetch-execute cycle and all instruction behaviors.

use crate::device::OutputRegister;
use crate::machine::instruction::{BinaryOp, Instruction, Reg, UnaryOp};
use crate::machine::memory::{Bus, BusError, Memory};
use crate::machine::program::ProgramImage;
use crate::machine::registers::Registers;
use crate::word::{self, Word};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Machine is running normally.
    Running,
    /// Machine executed `halt`.
    Halted,
    /// Machine stopped on an error.
    Error,
}

/// The word machine, writing console output to `O`.
pub struct Machine<O> {
    /// Registers and program counter.
    pub regs: Registers,
    /// Data memory with the console mapped in.
    pub bus: Bus<O>,
    /// Current execution state.
    pub state: MachineState,
    /// Instruction count.
    pub cycles: u64,
    program: ProgramImage,
    last_instr: Option<Instruction>,
}

impl<O: OutputRegister> Machine<O> {
    /// Create an empty machine with the console at the default address.
    pub fn new(console: O) -> Self {
        Self::from_bus(Bus::new(console))
    }

    /// Create an empty machine with the console at `console_addr`.
    pub fn with_console_address(console: O, console_addr: u32) -> Self {
        Self::from_bus(Bus::with_console_address(console, console_addr))
    }

    fn from_bus(bus: Bus<O>) -> Self {
        Self {
            regs: Registers::new(),
            bus,
            state: MachineState::Running,
            cycles: 0,
            program: ProgramImage::default(),
            last_instr: None,
        }
    }

    /// Replace the program and reset to its initial state.
    pub fn load(&mut self, image: ProgramImage) {
        debug!(
            "loading {} instructions and {} data words",
            image.len(),
            image.data_len()
        );
        self.program = image;
        self.reset();
    }

    /// Reset registers and memory, keeping the program and console.
    ///
    /// The console is not cleared; it models an external device.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.bus.mem.clear();
        for seg in &self.program.data {
            self.bus.mem.load_segment(seg.base, &seg.words);
        }
        self.state = MachineState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// The loaded program.
    pub fn program(&self) -> &ProgramImage {
        &self.program
    }

    /// Data memory.
    pub fn memory(&self) -> &Memory {
        &self.bus.mem
    }

    /// The console device.
    pub fn console(&self) -> &O {
        &self.bus.console
    }

    pub fn console_mut(&mut self) -> &mut O {
        &mut self.bus.console
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed, or an error. Any error
    /// moves the machine to [`MachineState::Error`].
    pub fn step(&mut self) -> Result<Instruction, MachineError> {
        if self.state != MachineState::Running {
            return Err(MachineError::NotRunning(self.state));
        }

        match self.step_inner() {
            Ok(instr) => Ok(instr),
            Err(e) => {
                self.state = MachineState::Error;
                Err(e)
            }
        }
    }

    fn step_inner(&mut self) -> Result<Instruction, MachineError> {
        // Fetch
        let pc = self.regs.pc;
        let instr = *self
            .program
            .instructions
            .get(pc)
            .ok_or(MachineError::PcOutOfRange(pc))?;

        // Advance before executing; jumps override
        self.regs.advance_pc();

        trace!("{:04}: {:?}", pc, instr);
        self.execute(instr)?;

        self.cycles += 1;
        self.last_instr = Some(instr);
        Ok(instr)
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, MachineError> {
        let start_cycles = self.cycles;

        while self.state == MachineState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, MachineError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == MachineState::Running && self.cycles < limit {
            self.step()?;
        }

        if self.state == MachineState::Running {
            warn!("stopped after {} cycles without halting", max_cycles);
        }
        Ok(self.cycles - start_cycles)
    }

    /// Execute a fetched instruction.
    fn execute(&mut self, instr: Instruction) -> Result<(), MachineError> {
        match instr {
            // ==================== Memory ====================

            Instruction::Load { dest, addr } => {
                let value = self.bus.read(self.address_in(addr))?;
                self.regs.set(dest, value);
            }

            Instruction::Store { addr, src } => {
                let addr = self.address_in(addr);
                let value = self.regs.get(src);
                self.bus.write(addr, value)?;
            }

            // ==================== Arithmetic ====================

            Instruction::Binary { op, dest, a, b } => {
                let x = self.regs.get(a);
                let y = self.regs.get(b);
                self.regs.set(dest, binary(op, x, y)?);
            }

            Instruction::Unary { op, dest, a } => {
                let x = self.regs.get(a);
                let value = match op {
                    UnaryOp::Not => flag(x == 0),
                    UnaryOp::Invert => !x,
                    UnaryOp::Negate => x.wrapping_neg(),
                };
                self.regs.set(dest, value);
            }

            Instruction::AddImm { dest, src, imm } => {
                let value = self.regs.get(src).wrapping_add(imm);
                self.regs.set(dest, value);
            }

            Instruction::Literal { dest, value } => {
                self.regs.set(dest, value);
            }

            // ==================== Control Flow ====================

            Instruction::Goto { target } => {
                self.regs.jump(target);
            }

            Instruction::JumpIfFalse { cond, target } => {
                if self.regs.get(cond) == 0 {
                    self.regs.jump(target);
                }
            }

            Instruction::GotoRegister { src } => {
                let target = self.regs.get(src);
                let target = usize::try_from(target).map_err(|_| MachineError::BadJump(target))?;
                self.regs.jump(target);
            }

            Instruction::JumpAndLink { link, target } => {
                // pc already points past this instruction
                let ret = self.regs.pc as Word;
                self.regs.set(link, ret);
                self.regs.jump(target);
            }

            Instruction::Halt => {
                self.state = MachineState::Halted;
            }

            Instruction::Nop => {}
        }

        Ok(())
    }

    /// A register holding an address, reinterpreted as unsigned.
    fn address_in(&self, reg: Reg) -> u32 {
        self.regs.get(reg) as u32
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the machine is halted.
    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// Check if the machine is running.
    pub fn is_running(&self) -> bool {
        self.state == MachineState::Running
    }
}

impl<O> std::fmt::Debug for Machine<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("pc", &self.regs.pc)
            .field("program_len", &self.program.len())
            .finish()
    }
}

/// -1 for true, 0 for false.
fn flag(b: bool) -> Word {
    if b {
        -1
    } else {
        0
    }
}

fn binary(op: BinaryOp, x: Word, y: Word) -> Result<Word, MachineError> {
    let value = match op {
        BinaryOp::Add => x.wrapping_add(y),
        BinaryOp::Sub => x.wrapping_sub(y),
        BinaryOp::Mul => x.wrapping_mul(y),
        BinaryOp::Div => word::c_div(x, y).ok_or(MachineError::DivisionByZero)?,
        BinaryOp::Mod => word::c_mod(x, y).ok_or(MachineError::DivisionByZero)?,
        BinaryOp::Lt => flag(x < y),
        BinaryOp::Gt => flag(x > y),
        BinaryOp::Le => flag(x <= y),
        BinaryOp::Ge => flag(x >= y),
        BinaryOp::Eq => flag(x == y),
        BinaryOp::Ne => flag(x != y),
        BinaryOp::And => x & y,
        BinaryOp::Or => x | y,
        BinaryOp::Xor => x ^ y,
        BinaryOp::Lshift => x.wrapping_shl(y as u32),
        BinaryOp::Rshift => x.wrapping_shr(y as u32),
    };
    Ok(value)
}

/// Errors that can occur during execution.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("machine not running: {0:?}")]
    NotRunning(MachineState),

    #[error("program counter {0} is outside the program")]
    PcOutOfRange(usize),

    #[error("jump to negative address {0}")]
    BadJump(Word),

    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    #[error("division by zero")]
    DivisionByZero,
}
