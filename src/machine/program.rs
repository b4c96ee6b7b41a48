//! Loadable programs.

use crate::machine::instruction::{Instruction, Reg};
use crate::machine::registers::REGISTER_COUNT;
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// Initial contents for a run of data memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSegment {
    pub base: u32,
    pub words: Vec<Word>,
}

/// An assembled program: instructions plus preloaded data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramImage {
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub data: Vec<DataSegment>,
}

impl ProgramImage {
    /// An image with code only.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            data: Vec::new(),
        }
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Total number of preloaded data words.
    pub fn data_len(&self) -> usize {
        self.data.iter().map(|seg| seg.words.len()).sum()
    }

    /// The first register operand outside the register file, with the
    /// index of the instruction naming it.
    pub fn invalid_register(&self) -> Option<(usize, Reg)> {
        self.instructions.iter().enumerate().find_map(|(index, instr)| {
            instr
                .registers()
                .into_iter()
                .find(|&reg| reg as usize >= REGISTER_COUNT)
                .map(|reg| (index, reg))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_register() {
        let mut image = ProgramImage::from_instructions(vec![
            Instruction::Literal { dest: 31, value: 1 },
            Instruction::Halt,
        ]);
        assert_eq!(image.invalid_register(), None);

        image.instructions.push(Instruction::Load { dest: 2, addr: 40 });
        assert_eq!(image.invalid_register(), Some((2, 40)));
    }
}
