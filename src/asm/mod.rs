//! Assembler and disassembler for word machine programs.
//!
//! This module provides:
//! - A two-pass assembler (text → program image)
//! - A disassembler (program image → text)
//! - JSON image files
//! - Built-in programs

pub mod assembler;
pub mod disasm;
pub mod image;
pub mod programs;

pub use assembler::{assemble, assemble_with_console, AssemblerError};
pub use disasm::disassemble;
pub use image::{load_image, save_image, ImageError};
