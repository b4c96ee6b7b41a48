//! WebAssembly bindings for the word machine and emitters.
//!
//! This module provides JavaScript-friendly wrappers around the core types.

use crate::asm::assembler::assemble;
use crate::asm::disasm::disassemble_instruction;
use crate::device::RecordingSink;
use crate::emit::{self, DigitPolicy};
use crate::machine::{Machine, ProgramImage};
use js_sys::Int32Array;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly machine wrapper. Console output is buffered.
#[wasm_bindgen]
pub struct WasmMachine {
    machine: Machine<RecordingSink>,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a new machine instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            machine: Machine::new(RecordingSink::new()),
        }
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let image = assemble(source).map_err(|e| JsError::new(&e.to_string()))?;
        let len = image.len();
        self.machine = Machine::new(RecordingSink::new());
        self.machine.load(image);
        Ok(len)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self
            .machine
            .step()
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(disassemble_instruction(&instr))
    }

    /// Run until halt or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> Result<u64, JsError> {
        self.machine
            .run_limited(max_cycles as u64)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(self.machine.cycles)
    }

    /// Reset to the loaded program's initial state and clear the console.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.machine.reset();
        self.machine.console_mut().clear();
    }

    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.machine.is_halted()
    }

    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.machine.cycles
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.machine.regs.pc
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.machine.state)
    }

    /// Everything written to the console so far.
    #[wasm_bindgen]
    pub fn output(&self) -> String {
        self.machine.console().text()
    }

    /// All 32 registers as a typed array.
    #[wasm_bindgen]
    pub fn registers(&self) -> Int32Array {
        Int32Array::from(&self.machine.regs.values()[..])
    }

    /// Registers, pc and cycle count as a JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> String {
        serde_json::json!({
            "registers": self.machine.regs.values().to_vec(),
            "pc": self.machine.regs.pc,
            "cycles": self.machine.cycles,
        })
        .to_string()
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the image as JSON.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<String, JsError> {
    let image: ProgramImage = assemble(source).map_err(|e| JsError::new(&e.to_string()))?;
    crate::asm::image::render_image(&image).map_err(|e| JsError::new(&e.to_string()))
}

/// Render an integer the way the integer emitter writes it.
#[wasm_bindgen]
pub fn wasm_emit_int(value: i32, suppress_zeros: bool) -> Result<String, JsError> {
    let policy = if suppress_zeros {
        DigitPolicy::SuppressLeading
    } else {
        DigitPolicy::AllPlaces
    };
    let mut sink = RecordingSink::new();
    emit::emit_int_with(&mut sink, value, policy).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(sink.text())
}
