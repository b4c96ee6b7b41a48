//! Word machine data memory and console bus.
//!
//! Memory is sparse: only cells that have been written (or preloaded) exist.
//! One address belongs to the console: stores there go to the output
//! register instead of memory, and loads from it fail.

use crate::device::{DeviceError, OutputRegister, CONSOLE_ADDRESS};
use crate::word::Word;
use std::collections::BTreeMap;
use thiserror::Error;

/// Sparse word-addressed data memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    cells: BTreeMap<u32, Word>,
}

impl Memory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self { cells: BTreeMap::new() }
    }

    /// Read a cell that may never have been written.
    pub fn get(&self, addr: u32) -> Option<Word> {
        self.cells.get(&addr).copied()
    }

    /// Write a cell.
    pub fn set(&mut self, addr: u32, value: Word) {
        self.cells.insert(addr, value);
    }

    /// Write consecutive cells starting at `base`. Addresses wrap.
    pub fn load_segment(&mut self, base: u32, words: &[Word]) {
        for (i, &w) in words.iter().enumerate() {
            self.cells.insert(base.wrapping_add(i as u32), w);
        }
    }

    /// Clear all memory.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Populated cells in address order (for debugging).
    pub fn dump(&self) -> Vec<(u32, Word)> {
        self.cells.iter().map(|(&a, &w)| (a, w)).collect()
    }
}

/// Data memory with the console register mapped in.
#[derive(Debug, Clone)]
pub struct Bus<O> {
    pub mem: Memory,
    pub console: O,
    console_addr: u32,
}

impl<O: OutputRegister> Bus<O> {
    /// A bus with the console at [`CONSOLE_ADDRESS`].
    pub fn new(console: O) -> Self {
        Self::with_console_address(console, CONSOLE_ADDRESS)
    }

    /// A bus with the console at a custom address.
    pub fn with_console_address(console: O, console_addr: u32) -> Self {
        Self {
            mem: Memory::new(),
            console,
            console_addr,
        }
    }

    pub fn console_address(&self) -> u32 {
        self.console_addr
    }

    /// Load a word.
    pub fn read(&self, addr: u32) -> Result<Word, BusError> {
        if addr == self.console_addr {
            return Err(BusError::WriteOnly(addr));
        }
        self.mem.get(addr).ok_or(BusError::Uninitialised(addr))
    }

    /// Store a word, routing console writes to the output register.
    pub fn write(&mut self, addr: u32, value: Word) -> Result<(), BusError> {
        if addr == self.console_addr {
            self.console.write_word(value)?;
        } else {
            self.mem.set(addr, value);
        }
        Ok(())
    }
}

/// Errors raised by bus accesses.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("read of uninitialised address {0:#010x}")]
    Uninitialised(u32),

    #[error("read of write-only console register at {0:#010x}")]
    WriteOnly(u32),

    #[error("console device error: {0}")]
    Device(#[from] DeviceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingSink;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        mem.set(10, 42);

        assert_eq!(mem.get(10), Some(42));
        assert_eq!(mem.get(11), None);
    }

    #[test]
    fn test_load_segment() {
        let mut mem = Memory::new();
        mem.load_segment(0x100, &[1, 2, 3]);

        assert_eq!(mem.dump(), vec![(0x100, 1), (0x101, 2), (0x102, 3)]);
    }

    #[test]
    fn test_console_store_bypasses_memory() {
        let mut bus = Bus::new(RecordingSink::new());
        bus.write(CONSOLE_ADDRESS, 'x' as Word).unwrap();

        assert_eq!(bus.console.words(), &['x' as Word]);
        assert!(bus.mem.is_empty());
    }

    #[test]
    fn test_console_is_write_only() {
        let bus = Bus::new(RecordingSink::new());
        assert!(matches!(bus.read(CONSOLE_ADDRESS), Err(BusError::WriteOnly(_))));
    }

    #[test]
    fn test_uninitialised_read() {
        let bus = Bus::new(RecordingSink::new());
        assert!(matches!(bus.read(4), Err(BusError::Uninitialised(4))));
    }

    #[test]
    fn test_custom_console_address() {
        let mut bus = Bus::with_console_address(RecordingSink::new(), 0x20);
        bus.write(0x20, 1).unwrap();
        bus.write(CONSOLE_ADDRESS, 2).unwrap();

        assert_eq!(bus.console.words(), &[1]);
        assert_eq!(bus.read(CONSOLE_ADDRESS).unwrap(), 2);
    }
}
