//! TUI debugger for the word machine.
//!
//! Provides an interactive terminal-based debugger with:
//! - Disassembly around the program counter
//! - Register file view
//! - Console output pane
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{run_debugger, DebuggerApp};
