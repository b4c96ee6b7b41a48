//! Disassembler for word machine programs.
//!
//! Output is valid assembler input: jump targets are printed as instruction
//! indices and data segments as `.word` lists.

use crate::machine::instruction::Instruction;
use crate::machine::program::ProgramImage;
use crate::machine::registers::register_name;

/// Words per `.word` line in listings.
const WORDS_PER_LINE: usize = 8;

/// Disassemble a single instruction to text.
pub fn disassemble_instruction(instr: &Instruction) -> String {
    let r = |reg: u8| register_name(reg);

    match *instr {
        Instruction::Load { dest, addr } => format!("load {}, {}", r(dest), r(addr)),
        Instruction::Store { addr, src } => format!("store {}, {}", r(addr), r(src)),
        Instruction::Binary { op, dest, a, b } => {
            format!("{} {}, {}, {}", op.mnemonic(), r(dest), r(a), r(b))
        }
        Instruction::Unary { op, dest, a } => format!("{} {}, {}", op.mnemonic(), r(dest), r(a)),
        Instruction::AddImm { dest, src, imm } => format!("addl {}, {}, {}", r(dest), r(src), imm),
        Instruction::Literal { dest, value } => format!("literal {}, {}", r(dest), value),
        Instruction::Goto { target } => format!("goto {}", target),
        Instruction::JumpIfFalse { cond, target } => format!("jf {}, {}", r(cond), target),
        Instruction::GotoRegister { src } => format!("jr {}", r(src)),
        Instruction::JumpAndLink { link, target } => format!("jal {}, {}", r(link), target),
        Instruction::Halt => "halt".to_string(),
        Instruction::Nop => "nop".to_string(),
    }
}

/// Disassemble a whole program image.
pub fn disassemble(image: &ProgramImage) -> String {
    let mut output = String::new();
    output.push_str("; word machine disassembly\n");
    output.push_str("; -----------------------\n\n");

    for (addr, instr) in image.instructions.iter().enumerate() {
        let line = disassemble_instruction(instr);
        output.push_str(&format!("    {:<28} ; {:04}\n", line, addr));
    }

    for seg in image.data.iter().filter(|seg| !seg.words.is_empty()) {
        output.push_str(&format!("\n    .data {:#010x}\n", seg.base));
        for chunk in seg.words.chunks(WORDS_PER_LINE) {
            let values: Vec<String> = chunk.iter().map(|w| w.to_string()).collect();
            output.push_str(&format!("    .word {}\n", values.join(", ")));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;
    use crate::machine::instruction::BinaryOp;
    use crate::machine::program::DataSegment;

    #[test]
    fn test_disassemble_halt() {
        assert_eq!(disassemble_instruction(&Instruction::Halt), "halt");
    }

    #[test]
    fn test_disassemble_uses_aliases() {
        let text = disassemble_instruction(&Instruction::JumpAndLink { link: 31, target: 12 });
        assert_eq!(text, "jal ra, 12");

        let text = disassemble_instruction(&Instruction::Binary {
            op: BinaryOp::Ge,
            dest: 7,
            a: 1,
            b: 4,
        });
        assert_eq!(text, "ge r7, r1, r4");
    }

    #[test]
    fn test_listing_reassembles() {
        let image = ProgramImage {
            instructions: vec![
                Instruction::Literal { dest: 1, value: 0x10 },
                Instruction::Load { dest: 2, addr: 1 },
                Instruction::JumpIfFalse { cond: 2, target: 0 },
                Instruction::Halt,
            ],
            data: vec![DataSegment { base: 0x10, words: (1..=10).collect() }],
        };

        let listing = disassemble(&image);
        assert!(listing.contains(".data 0x00000010"));
        assert_eq!(assemble(&listing).unwrap(), image);
    }

    #[test]
    fn test_empty_segment_omitted() {
        let image = ProgramImage {
            instructions: vec![Instruction::Halt],
            data: vec![
                DataSegment { base: 0x20, words: Vec::new() },
                DataSegment { base: 0x40, words: vec![7] },
            ],
        };

        let listing = disassemble(&image);
        assert!(!listing.contains(".data 0x00000020"));

        let reassembled = assemble(&listing).unwrap();
        assert_eq!(reassembled.data, vec![DataSegment { base: 0x40, words: vec![7] }]);
    }
}
