//! Debugger application state and logic.

use crate::asm::disasm::disassemble_instruction;
use crate::device::RecordingSink;
use crate::machine::{Machine, ProgramImage};
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged; console output is recorded.
    pub machine: Machine<RecordingSink>,
    /// Breakpoints (by instruction index).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in populated cells.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(image: ProgramImage, console_addr: u32) -> Self {
        let mut machine = Machine::with_console_address(RecordingSink::new(), console_addr);
        machine.load(image);

        Self {
            machine,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.machine.is_running() {
            self.status = format!("Machine stopped: {:?}", self.machine.state);
            self.running = false;
            return;
        }

        let pc = self.machine.regs.pc;
        match self.machine.step() {
            Ok(instr) => {
                self.status = format!("PC={:04}: {}", pc, disassemble_instruction(&instr));
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.machine.is_running() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.machine.cycles);
            return;
        }

        let pc = self.machine.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at the current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.machine.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Reset the machine and clear the console.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.machine.console_mut().clear();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Get disassembly around the current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let pc = self.machine.regs.pc;
        let start = pc.saturating_sub(lines / 2);

        self.machine
            .program()
            .instructions
            .iter()
            .enumerate()
            .skip(start)
            .take(lines)
            .map(|(addr, instr)| (addr, disassemble_instruction(instr), addr == pc))
            .collect()
    }
}

/// Run the debugger with a program.
pub fn run_debugger(image: ProgramImage, console_addr: u32) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(image, console_addr);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => {
                            app.mem_scroll = app.mem_scroll.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            if app.mem_scroll + 1 < app.machine.memory().len() {
                                app.mem_scroll += 1;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::programs;
    use crate::device::CONSOLE_ADDRESS;

    fn app() -> DebuggerApp {
        DebuggerApp::new(programs::hello().unwrap(), CONSOLE_ADDRESS)
    }

    #[test]
    fn test_step_updates_status() {
        let mut app = app();
        app.step();

        assert_eq!(app.machine.regs.pc, 1);
        assert!(app.status.starts_with("PC=0000: literal r1"));
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app();
        app.step();
        app.toggle_breakpoint();
        app.machine.reset();

        app.run();
        for _ in 0..10 {
            app.tick();
        }

        assert!(!app.running);
        assert_eq!(app.machine.regs.pc, 1);
        assert!(app.status.contains("Breakpoint"));
    }

    #[test]
    fn test_run_to_halt_and_reset() {
        let mut app = app();
        app.run();
        while app.running {
            app.tick();
        }

        assert!(app.machine.is_halted());
        assert_eq!(app.machine.console().text(), "hello world\n0000000130");

        app.reset();
        assert!(app.machine.console().is_empty());
        assert!(app.machine.is_running());
    }

    #[test]
    fn test_disassembly_window_marks_pc() {
        let app = app();
        let lines = app.get_disassembly(4);

        assert_eq!(lines.len(), 4);
        assert!(lines[0].2);
        assert!(!lines[1].2);
    }
}
