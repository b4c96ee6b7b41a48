//! Word machine programs checked against the native emitters.

use mmio_console::asm::programs;
use mmio_console::device::CONSOLE_ADDRESS;
use mmio_console::emit::{emit_int, emit_sequence};
use mmio_console::word::{encode_str, Word};
use mmio_console::{assemble, disassemble, Machine, MachineState, RecordingSink};
use proptest::prelude::*;

/// The integer routine from the hello program, called on `value`.
fn print_int_program(value: Word) -> String {
    let routine = programs::HELLO
        .split_once("; r1: non-negative value")
        .map(|(_, rest)| rest)
        .unwrap();

    format!(
        "        literal r1, {}\n        jal print_int\n        halt\n; r1: non-negative value{}",
        value, routine
    )
}

fn run(source: &str) -> Machine<RecordingSink> {
    let mut machine = Machine::new(RecordingSink::new());
    machine.load(assemble(source).unwrap());
    machine.run_limited(1_000_000).unwrap();
    machine
}

#[test]
fn hello_program_writes_greeting() {
    let machine = run(programs::HELLO);

    assert_eq!(machine.state, MachineState::Halted);
    assert_eq!(machine.console().text(), "hello world\n0000000130");
}

#[test]
fn hello_program_survives_disassembly() {
    let image = assemble(programs::HELLO).unwrap();
    let listing = disassemble(&image);

    assert_eq!(assemble(&listing).unwrap(), image);
}

#[test]
fn console_can_move() {
    let source = r#"
        literal r1, 0x2000
        literal r2, 'Z'
        store r1, r2
        halt
    "#;

    let mut machine = Machine::with_console_address(RecordingSink::new(), 0x2000);
    machine.load(assemble(source).unwrap());
    machine.run().unwrap();

    assert_eq!(machine.console().text(), "Z");
    assert!(machine.memory().is_empty());
}

#[test]
fn hello_program_follows_console_address() {
    for addr in [0x2000, 0x8000_0000, CONSOLE_ADDRESS] {
        let mut machine = Machine::with_console_address(RecordingSink::new(), addr);
        machine.load(programs::hello_at(addr).unwrap());
        machine.run().unwrap();

        assert_eq!(machine.console().text(), "hello world\n0000000130");
        assert_eq!(machine.memory().len(), "hello world\n".len() + 1);
    }
}

#[test]
fn console_store_through_default_address() {
    let source = format!(
        "literal r1, {}\nliteral r2, 'q'\nstore r1, r2\nhalt",
        CONSOLE_ADDRESS
    );
    assert_eq!(run(&source).console().text(), "q");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn machine_print_int_matches_native(value in 0..=Word::MAX) {
        let machine = run(&print_int_program(value));

        let mut native = RecordingSink::new();
        emit_int(&mut native, value).unwrap();

        prop_assert!(machine.is_halted());
        prop_assert_eq!(machine.console(), &native);
    }

    #[test]
    fn machine_print_string_matches_native(s in "[a-z ]{0,24}") {
        let source = format!(
            ".data 0x40\nmsg: .string \"{}\"\n.text\nliteral r1, msg\njal print_string\nhalt\n{}",
            s,
            programs::HELLO
                .split_once("; r1: address of a zero-terminated string")
                .map(|(_, rest)| rest)
                .and_then(|rest| rest.split_once("; r1: non-negative value"))
                .map(|(routine, _)| routine)
                .unwrap(),
        );
        let machine = run(&source);

        let mut native = RecordingSink::new();
        emit_sequence(&mut native, &encode_str(&s)).unwrap();

        prop_assert_eq!(machine.console(), &native);
    }
}
