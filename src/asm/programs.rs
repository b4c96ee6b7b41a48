//! Programs shipped with the crate.

use crate::asm::assembler::{assemble, assemble_with_console, AssemblerError};
use crate::machine::program::ProgramImage;

/// The greeting program: writes what [`crate::emit::greet`] writes.
pub const HELLO: &str = include_str!("programs/hello.asm");

/// Assemble [`HELLO`].
pub fn hello() -> Result<ProgramImage, AssemblerError> {
    assemble(HELLO)
}

/// Assemble [`HELLO`] for a console register at `console_addr`.
pub fn hello_at(console_addr: u32) -> Result<ProgramImage, AssemblerError> {
    assemble_with_console(HELLO, console_addr)
}

/// Look up a built-in program by name.
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "hello" => Some(HELLO),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingSink;
    use crate::emit;
    use crate::machine::registers::RETURN_VALUE;
    use crate::machine::Machine;

    #[test]
    fn test_hello_assembles() {
        let image = hello().unwrap();
        assert_eq!(image.data.len(), 1);
        assert_eq!(image.data[0].base, 0x1000);
        assert_eq!(image.data[0].words.len(), "hello world\n".len() + 1);
    }

    #[test]
    fn test_hello_matches_native_greeting() {
        let mut machine = Machine::new(RecordingSink::new());
        machine.load(hello().unwrap());
        machine.run().unwrap();

        let mut native = RecordingSink::new();
        emit::greet(&mut native).unwrap();

        assert!(machine.is_halted());
        assert_eq!(machine.console(), &native);
        assert_eq!(machine.console().text(), "hello world\n0000000130");
        assert_eq!(machine.regs.get(RETURN_VALUE), emit::SUCCESS);
    }

    #[test]
    fn test_hello_leaves_string_untouched() {
        let mut machine = Machine::new(RecordingSink::new());
        machine.load(hello().unwrap());
        machine.run().unwrap();

        assert_eq!(machine.memory().get(0x1000), Some('h' as i32));
        assert_eq!(machine.memory().len(), "hello world\n".len() + 1);
    }

    #[test]
    fn test_hello_follows_relocated_console() {
        let mut machine = Machine::with_console_address(RecordingSink::new(), 0x2000);
        machine.load(hello_at(0x2000).unwrap());
        machine.run().unwrap();

        assert!(machine.is_halted());
        assert_eq!(machine.console().text(), "hello world\n0000000130");
        assert_eq!(machine.memory().get(0x2000), None);
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin("hello").is_some());
        assert!(builtin("goodbye").is_none());
    }
}
