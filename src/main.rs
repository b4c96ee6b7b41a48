//! mmio-console - CLI Entry Point
//!
//! Commands:
//! - `mmio-console hello` - Write the greeting and 130 to the console
//! - `mmio-console emit-str <text>` - Write a string
//! - `mmio-console emit-int <value>` - Write an integer in decimal
//! - `mmio-console run <program>` - Run an assembly file or image on the word machine
//! - `mmio-console debug <program>` - Interactive debugger
//! - `mmio-console asm <source>` - Assemble to a JSON image
//! - `mmio-console disasm <image>` - Disassemble an image

use clap::{Parser, Subcommand};
use log::{debug, info};
use mmio_console::asm::programs;
use mmio_console::{Config, ProgramImage};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mmio-console")]
#[command(version = "0.1.0")]
#[command(about = "Character and decimal output through a memory-mapped console register")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the greeting line, then 130 in decimal
    Hello,
    /// Write a string to the console
    EmitStr {
        /// Text to write
        text: String,
    },
    /// Write an integer in decimal
    EmitInt {
        /// Value to write
        #[arg(allow_hyphen_values = true)]
        value: i32,
        /// Skip zeros above the most significant digit
        #[arg(short, long)]
        suppress_zeros: bool,
    },
    /// Run a program on the word machine until it halts
    Run {
        /// Assembly file (.asm), JSON image, or built-in program name
        program: String,
        /// Maximum number of cycles to run
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
    },
    /// Interactive debugger
    Debug {
        /// Assembly file (.asm), JSON image, or built-in program name
        program: String,
    },
    /// Assemble source to a JSON image
    Asm {
        /// Path to the source file
        source: String,
        /// Output image file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble an image to readable text
    Disasm {
        /// Path to the image file
        image: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    debug!("configuration: {:?}", config);

    match cli.command {
        Some(Commands::Hello) | None => {
            hello();
        }
        Some(Commands::EmitStr { text }) => {
            emit_str(&config, &text);
        }
        Some(Commands::EmitInt { value, suppress_zeros }) => {
            emit_int(&config, value, suppress_zeros);
        }
        Some(Commands::Run { program, max_cycles, trace }) => {
            let max_cycles = max_cycles.unwrap_or(config.machine.max_cycles);
            run_program(&config, &program, max_cycles, trace || config.machine.trace);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&config, &program);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&config, &source, output);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
    }
}

fn stdout_console() -> mmio_console::StreamSink<std::io::Stdout> {
    mmio_console::StreamSink::stdout()
}

fn finish(mut console: mmio_console::StreamSink<std::io::Stdout>) {
    if let Err(e) = console.flush() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn hello() {
    let mut console = stdout_console();
    match mmio_console::greet(&mut console) {
        Ok(code) => debug!("greeting returned {}", code),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
    finish(console);
}

fn emit_str(config: &Config, text: &str) {
    use mmio_console::emit::emit_sequence_bounded;
    use mmio_console::word::encode_str;

    let mut console = stdout_console();
    let seq = encode_str(text);
    if let Err(e) = emit_sequence_bounded(&mut console, &seq, config.emitter.max_sequence_len) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    finish(console);
}

fn emit_int(config: &Config, value: i32, suppress_zeros: bool) {
    use mmio_console::DigitPolicy;

    let policy = if suppress_zeros {
        DigitPolicy::SuppressLeading
    } else {
        config.emitter.digits
    };

    let mut console = stdout_console();
    if let Err(e) = mmio_console::emit_int_with(&mut console, value, policy) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    finish(console);
}

/// Load a program: assembly source, JSON image, or built-in name.
fn load_program(config: &Config, path: &str) -> ProgramImage {
    use mmio_console::asm::assembler::assemble_with_console;
    use mmio_console::load_image;

    let source = if path.ends_with(".asm") {
        match std::fs::read_to_string(path) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        }
    } else if !std::path::Path::new(path).exists() {
        programs::builtin(path).map(str::to_string)
    } else {
        None
    };

    let image = match source {
        Some(source) => match assemble_with_console(&source, config.console.address) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        },
        None => match load_image(path) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("❌ Failed to load image: {}", e);
                std::process::exit(1);
            }
        },
    };

    if image.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    info!("loaded {} ({} instructions)", path, image.len());
    image
}

fn run_program(config: &Config, path: &str, max_cycles: u64, trace: bool) {
    use mmio_console::asm::disasm::disassemble_instruction;
    use mmio_console::Machine;

    let image = load_program(config, path);
    let mut machine = Machine::with_console_address(stdout_console(), config.console.address);
    machine.load(image);

    let mut cycles = 0u64;
    while machine.is_running() && cycles < max_cycles {
        let pc = machine.regs.pc;

        match machine.step() {
            Ok(instr) => {
                if trace {
                    eprintln!("{:04}: {}", pc, disassemble_instruction(&instr));
                }
                cycles += 1;
            }
            Err(e) => {
                eprintln!("❌ Machine error at PC={}: {}", pc, e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = machine.console_mut().flush() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    info!("{} cycles, state {:?}", cycles, machine.state);
    if cycles >= max_cycles && machine.is_running() {
        eprintln!();
        eprintln!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }
}

#[cfg(feature = "tui")]
fn debug_program(config: &Config, path: &str) {
    use mmio_console::run_debugger;

    let image = load_program(config, path);
    if let Err(e) = run_debugger(image, config.console.address) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_config: &Config, _path: &str) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

/// Where `asm` writes its image: `output` if given, else the source path
/// with a `.json` extension. Never the source itself.
fn output_path(source_path: &str, output: Option<String>) -> Result<PathBuf, String> {
    let out_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(source_path).with_extension("json"));
    if out_path == Path::new(source_path) {
        return Err(format!("Refusing to overwrite the source file {}", source_path));
    }
    Ok(out_path)
}

fn assemble_file(config: &Config, source_path: &str, output: Option<String>) {
    use mmio_console::asm::assembler::assemble_with_console;
    use mmio_console::save_image;

    let out_path = match output_path(source_path, output) {
        Ok(path) => path.display().to_string(),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let image = match assemble_with_console(&source, config.console.address) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "✓ Assembled {} instructions, {} data words",
        image.len(),
        image.data_len()
    );

    if let Err(e) = save_image(&out_path, &image) {
        eprintln!("❌ Failed to save image: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(image_path: &str) {
    use mmio_console::{disassemble, load_image};

    let image = match load_image(image_path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", disassemble(&image));
}

fn run_self_test() {
    use mmio_console::word::encode_str;
    use mmio_console::{emit_int, emit_sequence, greet, Machine, RecordingSink};

    println!("━━━ mmio-console Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        print!("{}... ", name);
        if ok {
            println!("✓");
            passed += 1;
        } else {
            println!("✗");
            failed += 1;
        }
    };

    let mut sink = RecordingSink::new();
    let ok = emit_sequence(&mut sink, &encode_str("hi")).is_ok() && sink.text() == "hi";
    check("Sequence emitter writes each word", ok);

    let mut sink = RecordingSink::new();
    let ok = emit_int(&mut sink, 130).is_ok() && sink.text() == "0000000130";
    check("Integer emitter on 130", ok);

    let mut sink = RecordingSink::new();
    let ok = emit_int(&mut sink, 0).is_ok() && sink.text() == "0000000000";
    check("Integer emitter on 0", ok);

    let mut sink = RecordingSink::new();
    let ok = emit_int(&mut sink, i32::MAX).is_ok() && sink.text() == "2147483647";
    check("Integer emitter at i32::MAX", ok);

    let mut sink = RecordingSink::new();
    check("Negative input rejected", emit_int(&mut sink, -1).is_err() && sink.is_empty());

    let mut native = RecordingSink::new();
    let ok = match (greet(&mut native), programs::hello()) {
        (Ok(_), Ok(image)) => {
            let mut machine = Machine::new(RecordingSink::new());
            machine.load(image);
            machine.run().is_ok() && machine.console() == &native
        }
        _ => false,
    };
    check("Word machine greeting matches native", ok);

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
