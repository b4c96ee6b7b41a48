//! Word machine instruction set.
//!
//! Every instruction names registers by index and may carry one immediate.
//! Programs live apart from data memory; jump targets are instruction
//! indices.

use crate::word::Word;
use serde::{Deserialize, Serialize};

/// A register index, 0-31.
pub type Reg = u8;

/// Two-operand register operations: `d := a op b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Xor,
    Lshift,
    Rshift,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 16] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Lshift,
        BinaryOp::Rshift,
    ];

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Lt => "lt",
            BinaryOp::Gt => "gt",
            BinaryOp::Le => "le",
            BinaryOp::Ge => "ge",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Lshift => "lshift",
            BinaryOp::Rshift => "rshift",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }
}

/// One-operand register operations: `d := op a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// -1 if zero, else 0.
    Not,
    /// Bitwise complement.
    Invert,
    Negate,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 3] = [UnaryOp::Not, UnaryOp::Invert, UnaryOp::Negate];

    pub fn mnemonic(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Invert => "invert",
            UnaryOp::Negate => "negate",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }
}

/// A decoded word machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instr", rename_all = "snake_case")]
pub enum Instruction {
    // ==================== Memory ====================

    /// `dest := mem[addr]`
    Load { dest: Reg, addr: Reg },

    /// `mem[addr] := src`; the console address goes to the output register
    Store { addr: Reg, src: Reg },

    // ==================== Arithmetic ====================

    /// `dest := a op b`
    Binary { op: BinaryOp, dest: Reg, a: Reg, b: Reg },

    /// `dest := op a`
    Unary { op: UnaryOp, dest: Reg, a: Reg },

    /// `dest := src + imm`
    AddImm { dest: Reg, src: Reg, imm: Word },

    /// `dest := value`
    Literal { dest: Reg, value: Word },

    // ==================== Control Flow ====================

    /// `pc := target`
    Goto { target: usize },

    /// `pc := target` if `cond == 0`
    JumpIfFalse { cond: Reg, target: usize },

    /// `pc := src`
    GotoRegister { src: Reg },

    /// `link := pc + 1; pc := target`
    JumpAndLink { link: Reg, target: usize },

    /// Stop the machine.
    Halt,

    Nop,
}

impl Instruction {
    /// Register operands, in source order.
    pub fn registers(&self) -> Vec<Reg> {
        match *self {
            Instruction::Load { dest, addr } => vec![dest, addr],
            Instruction::Store { addr, src } => vec![addr, src],
            Instruction::Binary { dest, a, b, .. } => vec![dest, a, b],
            Instruction::Unary { dest, a, .. } => vec![dest, a],
            Instruction::AddImm { dest, src, .. } => vec![dest, src],
            Instruction::Literal { dest, .. } => vec![dest],
            Instruction::JumpIfFalse { cond, .. } => vec![cond],
            Instruction::GotoRegister { src } => vec![src],
            Instruction::JumpAndLink { link, .. } => vec![link],
            Instruction::Goto { .. } | Instruction::Halt | Instruction::Nop => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_operands() {
        let instr = Instruction::Binary { op: BinaryOp::Add, dest: 3, a: 1, b: 2 };
        assert_eq!(instr.registers(), vec![3, 1, 2]);
        assert_eq!(Instruction::JumpAndLink { link: 31, target: 4 }.registers(), vec![31]);
        assert!(Instruction::Goto { target: 0 }.registers().is_empty());
    }
}
