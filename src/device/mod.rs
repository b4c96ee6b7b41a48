//! The console output device.
//!
//! A console is a single write-only word register. Every word written to it
//! is observed externally as one character. Writes are the only operation;
//! the register has no read semantics.
//!
//! Hosted builds never turn [`CONSOLE_ADDRESS`] into a pointer. The address
//! names the register on the word machine's bus, and real hardware is bound
//! through [`MmioRegister`] with a pointer supplied by the platform.

pub mod mmio;
pub mod sink;

pub use mmio::MmioRegister;
pub use sink::{RecordingSink, StreamSink};

use crate::word::Word;
use thiserror::Error;

/// Bus address of the console register.
pub const CONSOLE_ADDRESS: u32 = 0xffff_ffff;

/// A write-only, single-word output register.
pub trait OutputRegister {
    /// Write one word to the register.
    fn write_word(&mut self, word: Word) -> Result<(), DeviceError>;
}

impl<O: OutputRegister + ?Sized> OutputRegister for &mut O {
    fn write_word(&mut self, word: Word) -> Result<(), DeviceError> {
        (**self).write_word(word)
    }
}

impl<O: OutputRegister + ?Sized> OutputRegister for Box<O> {
    fn write_word(&mut self, word: Word) -> Result<(), DeviceError> {
        (**self).write_word(word)
    }
}

/// Errors raised by an output device.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("console stream error: {0}")]
    Io(#[from] std::io::Error),
}
