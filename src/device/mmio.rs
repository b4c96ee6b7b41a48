//! Volatile binding to a real memory-mapped register.

use super::{DeviceError, OutputRegister};
use crate::word::Word;
use std::ptr::NonNull;

/// A console register reached through a volatile pointer.
///
/// The pointer comes from the platform (a linker symbol, a device tree
/// entry, a mapped page); this type never fabricates one from an integer.
#[derive(Debug)]
pub struct MmioRegister {
    addr: NonNull<Word>,
}

impl MmioRegister {
    /// Bind to the register at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must point to a word-sized, word-aligned register (or memory
    /// cell) that stays valid for writes for the lifetime of the binding,
    /// and nothing else may hold a conflicting reference to it.
    pub unsafe fn new(addr: NonNull<Word>) -> Self {
        Self { addr }
    }

    /// The bound address.
    pub fn addr(&self) -> NonNull<Word> {
        self.addr
    }
}

impl OutputRegister for MmioRegister {
    fn write_word(&mut self, word: Word) -> Result<(), DeviceError> {
        // SAFETY: validity of the pointer is guaranteed by the contract of `new`.
        unsafe {
            core::ptr::write_volatile(self.addr.as_ptr(), word);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmio_writes_through_pointer() {
        let mut cell: Word = 0;
        let ptr = NonNull::from(&mut cell);
        let mut reg = unsafe { MmioRegister::new(ptr) };

        reg.write_word('A' as Word).unwrap();
        assert_eq!(unsafe { core::ptr::read_volatile(ptr.as_ptr()) }, 'A' as Word);

        reg.write_word('B' as Word).unwrap();
        assert_eq!(unsafe { core::ptr::read_volatile(ptr.as_ptr()) }, 'B' as Word);
    }
}
