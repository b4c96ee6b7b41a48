//! # mmio-console
//!
//! Character and decimal output through a single-word memory-mapped
//! console register.
//!
//! The core is two emitters: one copies a zero-terminated word sequence to
//! the register, the other writes an integer in decimal one place value at
//! a time. Around them sit a small word machine whose bus maps the console
//! register, and an assembler for programs that drive it.

pub mod asm;
pub mod config;
pub mod device;
pub mod emit;
pub mod machine;
pub mod word;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use asm::{assemble, disassemble, load_image, save_image, AssemblerError, ImageError};
pub use config::{Config, ConfigError};
pub use device::{DeviceError, MmioRegister, OutputRegister, RecordingSink, StreamSink, CONSOLE_ADDRESS};
pub use emit::{emit_int, emit_int_with, emit_sequence, greet, DigitPolicy, EmitError, SUCCESS};
pub use machine::{Instruction, Machine, MachineError, MachineState, ProgramImage};
pub use word::Word;

#[cfg(feature = "tui")]
pub use tui::run_debugger;
