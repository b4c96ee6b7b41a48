//! Two-pass assembler for word machine programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//!         .data 0x1000        ; following data starts at 0x1000
//! msg:    .string "hi\n"      ; words 'h', 'i', '\n', 0
//! nums:   .word 1, -2, 0x10
//!
//!         .text               ; back to code (the default section)
//! main:   literal r1, msg     ; data labels are addresses
//!         literal r2, console ; console register address
//! loop:   load r3, r1         ; r3 := mem[r1]
//!         jf r3, done         ; jump if r3 == 0
//!         store r2, r3        ; mem[r2] := r3
//!         addl r1, r1, 1
//!         goto loop
//! done:   halt
//! ```
//!
//! Registers are `r0`-`r31` or the aliases `start end offset new temp
//! temp1 rv ra`. Immediates are decimal, `0x` hex, `'c'` or a label.
//! The symbol `console` is predefined as the console register's bus
//! address; a label of the same name overrides it.

use crate::device::CONSOLE_ADDRESS;
use crate::machine::instruction::{BinaryOp, Instruction, Reg, UnaryOp};
use crate::machine::program::{DataSegment, ProgramImage};
use crate::machine::registers::{self, RETURN_ADDRESS};
use crate::word::{Word, TERMINATOR};
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the predefined console address symbol.
pub const CONSOLE_SYMBOL: &str = "console";

/// Assemble source code into a program image, with `console` bound to
/// [`CONSOLE_ADDRESS`].
pub fn assemble(source: &str) -> Result<ProgramImage, AssemblerError> {
    assemble_with_console(source, CONSOLE_ADDRESS)
}

/// Assemble source code for a machine whose console register sits at
/// `console_addr`.
pub fn assemble_with_console(
    source: &str,
    console_addr: u32,
) -> Result<ProgramImage, AssemblerError> {
    let mut asm = Assembler::new(console_addr);
    asm.assemble(source)
}

/// Which location counter a line advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Text,
    Data,
}

/// A parsed source line, with operands not yet resolved.
#[derive(Debug)]
enum Statement {
    Instr { mnemonic: String, operands: Vec<String> },
    Text,
    Data(u32),
    Words(Vec<String>),
    Str(Vec<Word>),
}

/// The assembler state.
struct Assembler {
    section: Section,
    /// Next instruction index.
    text_addr: usize,
    /// Next data address.
    data_addr: u32,
    /// Symbol table (label -> value).
    symbols: HashMap<String, Word>,
    /// Bus address bound to `console` unless a label shadows it.
    console_addr: u32,
    /// Statements collected in pass 1, with their line numbers.
    statements: Vec<(usize, Statement)>,
}

impl Assembler {
    fn new(console_addr: u32) -> Self {
        Self {
            console_addr,
            section: Section::Text,
            text_addr: 0,
            data_addr: 0,
            symbols: HashMap::new(),
            statements: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<ProgramImage, AssemblerError> {
        // Pass 1: parse lines and assign label values
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Pass 2: resolve operands and encode
        let image = self.encode()?;
        debug!(
            "assembled {} instructions, {} data words, {} labels",
            image.len(),
            image.data_len(),
            self.symbols.len()
        );
        Ok(image)
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            return Ok(());
        }

        let (label, rest) = split_label(line);
        if let Some(label) = label {
            self.define_label(label, line_num)?;
        }

        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(());
        }

        let stmt = parse_statement(rest, line_num)?;
        self.advance(&stmt, line_num)?;
        self.statements.push((line_num, stmt));
        Ok(())
    }

    fn define_label(&mut self, label: &str, line_num: usize) -> Result<(), AssemblerError> {
        let value = match self.section {
            Section::Text => self.text_addr as Word,
            Section::Data => self.data_addr as Word,
        };
        if self.symbols.insert(label.to_string(), value).is_some() {
            return Err(AssemblerError::DuplicateLabel {
                line: line_num,
                label: label.to_string(),
            });
        }
        Ok(())
    }

    /// Move the location counters past a statement.
    fn advance(&mut self, stmt: &Statement, line_num: usize) -> Result<(), AssemblerError> {
        match stmt {
            Statement::Instr { .. } => {
                if self.section != Section::Text {
                    return Err(syntax(line_num, "instruction inside .data section"));
                }
                self.text_addr += 1;
            }
            Statement::Text => self.section = Section::Text,
            Statement::Data(base) => {
                self.section = Section::Data;
                self.data_addr = *base;
            }
            Statement::Words(values) => self.advance_data(values.len(), line_num)?,
            Statement::Str(words) => self.advance_data(words.len(), line_num)?,
        }
        Ok(())
    }

    fn advance_data(&mut self, count: usize, line_num: usize) -> Result<(), AssemblerError> {
        if self.section != Section::Data {
            return Err(syntax(line_num, "data directive outside .data section"));
        }
        self.data_addr = self.data_addr.wrapping_add(count as u32);
        Ok(())
    }

    fn encode(&self) -> Result<ProgramImage, AssemblerError> {
        let mut image = ProgramImage::default();

        for (line_num, stmt) in &self.statements {
            let line_num = *line_num;
            match stmt {
                Statement::Instr { mnemonic, operands } => {
                    let instr = self.parse_instruction(mnemonic, operands, line_num)?;
                    image.instructions.push(instr);
                }
                Statement::Text => {}
                Statement::Data(base) => image.data.push(DataSegment {
                    base: *base,
                    words: Vec::new(),
                }),
                Statement::Words(values) => {
                    let words = values
                        .iter()
                        .map(|v| self.parse_value(v, line_num))
                        .collect::<Result<Vec<_>, _>>()?;
                    current_segment(&mut image, line_num)?.words.extend(words);
                }
                Statement::Str(words) => {
                    current_segment(&mut image, line_num)?.words.extend(words);
                }
            }
        }

        image.data.retain(|seg| !seg.words.is_empty());
        Ok(image)
    }

    fn parse_instruction(
        &self,
        mnemonic: &str,
        ops: &[String],
        line_num: usize,
    ) -> Result<Instruction, AssemblerError> {
        if let Some(op) = BinaryOp::from_mnemonic(mnemonic) {
            expect_operands(mnemonic, ops, 3, line_num)?;
            return Ok(Instruction::Binary {
                op,
                dest: reg(&ops[0], line_num)?,
                a: reg(&ops[1], line_num)?,
                b: reg(&ops[2], line_num)?,
            });
        }

        if let Some(op) = UnaryOp::from_mnemonic(mnemonic) {
            expect_operands(mnemonic, ops, 2, line_num)?;
            return Ok(Instruction::Unary {
                op,
                dest: reg(&ops[0], line_num)?,
                a: reg(&ops[1], line_num)?,
            });
        }

        let instr = match mnemonic {
            "load" => {
                expect_operands(mnemonic, ops, 2, line_num)?;
                Instruction::Load {
                    dest: reg(&ops[0], line_num)?,
                    addr: reg(&ops[1], line_num)?,
                }
            }
            "store" => {
                expect_operands(mnemonic, ops, 2, line_num)?;
                Instruction::Store {
                    addr: reg(&ops[0], line_num)?,
                    src: reg(&ops[1], line_num)?,
                }
            }
            "addl" => {
                expect_operands(mnemonic, ops, 3, line_num)?;
                Instruction::AddImm {
                    dest: reg(&ops[0], line_num)?,
                    src: reg(&ops[1], line_num)?,
                    imm: self.parse_value(&ops[2], line_num)?,
                }
            }
            "literal" | "li" => {
                expect_operands(mnemonic, ops, 2, line_num)?;
                Instruction::Literal {
                    dest: reg(&ops[0], line_num)?,
                    value: self.parse_value(&ops[1], line_num)?,
                }
            }
            "goto" | "j" => {
                expect_operands(mnemonic, ops, 1, line_num)?;
                Instruction::Goto {
                    target: self.parse_target(&ops[0], line_num)?,
                }
            }
            "jf" => {
                expect_operands(mnemonic, ops, 2, line_num)?;
                Instruction::JumpIfFalse {
                    cond: reg(&ops[0], line_num)?,
                    target: self.parse_target(&ops[1], line_num)?,
                }
            }
            "jr" => {
                expect_operands(mnemonic, ops, 1, line_num)?;
                Instruction::GotoRegister {
                    src: reg(&ops[0], line_num)?,
                }
            }
            // `jal target` links through `ra`
            "jal" if ops.len() == 1 => Instruction::JumpAndLink {
                link: RETURN_ADDRESS,
                target: self.parse_target(&ops[0], line_num)?,
            },
            "jal" => {
                expect_operands(mnemonic, ops, 2, line_num)?;
                Instruction::JumpAndLink {
                    link: reg(&ops[0], line_num)?,
                    target: self.parse_target(&ops[1], line_num)?,
                }
            }
            "halt" | "hlt" => {
                expect_operands(mnemonic, ops, 0, line_num)?;
                Instruction::Halt
            }
            "nop" => {
                expect_operands(mnemonic, ops, 0, line_num)?;
                Instruction::Nop
            }
            _ => {
                return Err(AssemblerError::UnknownMnemonic {
                    line: line_num,
                    mnemonic: mnemonic.to_string(),
                })
            }
        };

        Ok(instr)
    }

    /// Parse an immediate: number, character literal or label.
    fn parse_value(&self, operand: &str, line_num: usize) -> Result<Word, AssemblerError> {
        let operand = operand.trim();

        if operand.starts_with('\'') {
            return parse_char_literal(operand, line_num);
        }

        if let Some(n) = parse_number(operand) {
            return word_from_i64(n).ok_or_else(|| AssemblerError::ValueOutOfRange {
                line: line_num,
                value: operand.to_string(),
            });
        }

        if is_identifier(operand) {
            return self
                .symbols
                .get(operand)
                .copied()
                .or_else(|| (operand == CONSOLE_SYMBOL).then_some(self.console_addr as Word))
                .ok_or_else(|| AssemblerError::UndefinedLabel {
                    line: line_num,
                    label: operand.to_string(),
                });
        }

        Err(syntax(line_num, format!("invalid operand `{}`", operand)))
    }

    /// Parse a jump target: an instruction index.
    fn parse_target(&self, operand: &str, line_num: usize) -> Result<usize, AssemblerError> {
        let value = self.parse_value(operand, line_num)?;
        usize::try_from(value).map_err(|_| AssemblerError::ValueOutOfRange {
            line: line_num,
            value: operand.trim().to_string(),
        })
    }
}

fn current_segment(
    image: &mut ProgramImage,
    line_num: usize,
) -> Result<&mut DataSegment, AssemblerError> {
    image
        .data
        .last_mut()
        .ok_or_else(|| syntax(line_num, "data directive outside .data section"))
}

fn parse_statement(text: &str, line_num: usize) -> Result<Statement, AssemblerError> {
    let (head, rest) = match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim()),
        None => (text, ""),
    };
    let head = head.to_ascii_lowercase();

    match head.as_str() {
        ".text" => Ok(Statement::Text),
        ".data" => {
            let base = parse_number(rest)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| syntax(line_num, ".data requires an address"))?;
            Ok(Statement::Data(base))
        }
        ".word" => {
            let values = split_operands(rest);
            if values.is_empty() {
                return Err(syntax(line_num, ".word requires at least one value"));
            }
            Ok(Statement::Words(values))
        }
        ".string" => {
            let mut words = parse_string_literal(rest, line_num)?;
            words.push(TERMINATOR);
            Ok(Statement::Str(words))
        }
        _ if head.starts_with('.') => Err(syntax(line_num, format!("unknown directive {}", head))),
        _ => Ok(Statement::Instr {
            mnemonic: head,
            operands: split_operands(rest),
        }),
    }
}

fn expect_operands(
    mnemonic: &str,
    ops: &[String],
    count: usize,
    line_num: usize,
) -> Result<(), AssemblerError> {
    if ops.len() != count {
        return Err(syntax(
            line_num,
            format!("{} takes {} operands, found {}", mnemonic, count, ops.len()),
        ));
    }
    Ok(())
}

fn reg(name: &str, line_num: usize) -> Result<Reg, AssemblerError> {
    registers::parse_register(name).ok_or_else(|| AssemblerError::BadRegister {
        line: line_num,
        name: name.trim().to_string(),
    })
}

fn syntax(line: usize, message: impl Into<String>) -> AssemblerError {
    AssemblerError::SyntaxError {
        line,
        message: message.into(),
    }
}

/// Remove a `;` comment, ignoring semicolons inside quotes.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in line.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ';' => return &line[..idx],
            None => {}
        }
    }
    line
}

/// Split a leading `label:` from the rest of the line.
fn split_label(line: &str) -> (Option<&str>, &str) {
    let end = line
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
        .map(|(idx, _)| idx)
        .unwrap_or(line.len());

    if end > 0 && line[end..].starts_with(':') && is_identifier(&line[..end]) {
        (Some(&line[..end]), &line[end + 1..])
    } else {
        (None, line)
    }
}

/// Split comma-separated operands, keeping quoted commas.
fn split_operands(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ',' => {
                out.push(current.trim().to_string());
                current.clear();
                continue;
            }
            None => {}
        }
        current.push(c);
    }

    let last = current.trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last.to_string());
    }
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Parse a decimal or `0x` hex number, optionally negative.
fn parse_number(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse::<i64>().ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Accept anything that fits either a signed or an unsigned 32-bit word.
fn word_from_i64(n: i64) -> Option<Word> {
    if n >= Word::MIN as i64 && n <= Word::MAX as i64 {
        Some(n as Word)
    } else if n >= 0 && n <= u32::MAX as i64 {
        Some(n as u32 as Word)
    } else {
        None
    }
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

/// Decode the characters between two quotes.
fn decode_quoted(body: &str, line_num: usize) -> Result<Vec<Word>, AssemblerError> {
    let mut out = Vec::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        let c = if c == '\\' {
            let next = chars
                .next()
                .ok_or_else(|| syntax(line_num, "dangling escape"))?;
            unescape(next).ok_or_else(|| syntax(line_num, format!("unknown escape \\{}", next)))?
        } else {
            c
        };
        out.push(c as u32 as Word);
    }
    Ok(out)
}

fn parse_char_literal(s: &str, line_num: usize) -> Result<Word, AssemblerError> {
    let body = s
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| syntax(line_num, format!("invalid character literal {}", s)))?;

    match decode_quoted(body, line_num)?.as_slice() {
        [w] => Ok(*w),
        _ => Err(syntax(line_num, format!("invalid character literal {}", s))),
    }
}

fn parse_string_literal(s: &str, line_num: usize) -> Result<Vec<Word>, AssemblerError> {
    let body = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| syntax(line_num, ".string requires a quoted string"))?;
    decode_quoted(body, line_num)
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("bad register on line {line}: {name}")]
    BadRegister { line: usize, name: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("duplicate label on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: String },
}
