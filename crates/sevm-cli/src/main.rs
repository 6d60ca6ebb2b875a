#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use color_eyre::{eyre::WrapErr, Result};
use sevm::{alloy_primitives::hex, load, Assembler, Env, Interpreter, U256};
use sevm_cli::read_code;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the instructions of a program.
    Disasm {
        /// Hex bytecode, a path to a `.hex`, `.bin` or `.evm` file, or a mnemonic listing.
        code: String,
    },
    /// Execute a program and print the outcome.
    Run {
        /// Hex bytecode, a path to a `.hex`, `.bin` or `.evm` file, or a mnemonic listing.
        code: String,
        /// Hex-encoded call data.
        #[arg(long)]
        calldata: Option<String>,
        /// The call value.
        #[arg(long, default_value = "0")]
        value: U256,
        /// Abort after executing this many instructions.
        #[arg(long)]
        step_limit: Option<u64>,
        /// Abort when the stack grows past this many items.
        #[arg(long)]
        stack_limit: Option<usize>,
        /// Abort when memory grows past this many bytes.
        #[arg(long)]
        memory_limit: Option<usize>,
    },
    /// Assemble a mnemonic listing into hex bytecode.
    Asm {
        /// A mnemonic listing, or a path to a `.evm` file.
        code: String,
        /// The width in bytes of label pointers.
        #[arg(long, default_value_t = Assembler::DEFAULT_JUMP_PTR_WIDTH)]
        jump_ptr_width: u8,
    },
}

fn main() -> Result<()> {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
    let _ = color_eyre::install();
    let _ = init_tracing_subscriber();

    let cli = Cli::parse();
    let asm = Assembler::new();
    match cli.cmd {
        Cmd::Disasm { code } => {
            let program = load(&read_code(&code, &asm)?);
            print!("{program}");
        }
        Cmd::Run { code, calldata, value, step_limit, stack_limit, memory_limit } => {
            let program = load(&read_code(&code, &asm)?);
            let calldata = match calldata {
                Some(calldata) => hex::decode(calldata).wrap_err("invalid calldata")?,
                None => Vec::new(),
            };
            let mut interpreter = Interpreter::new();
            interpreter.step_limit(step_limit).stack_limit(stack_limit).memory_limit(memory_limit);
            let r = interpreter.exec(&program, &Env::new(&calldata, value))?;
            println!("{}", if r.reverted { "reverted" } else { "success" });
            println!("steps: {}", r.steps);
            println!("output: {}", hex::encode_prefixed(&r.output));
            println!("stack:");
            for (i, value) in r.stack.iter().rev().enumerate() {
                println!("{i:>4}: {value:#066x}");
            }
        }
        Cmd::Asm { code, jump_ptr_width } => {
            let mut asm = asm;
            asm.jump_ptr_width(jump_ptr_width);
            let code = read_code(&code, &asm)?;
            println!("{}", hex::encode_prefixed(code));
        }
    }
    Ok(())
}

fn init_tracing_subscriber() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::prelude::*;
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env());
    registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).try_init()
}
