//! interp - Run a MicroScala source file
//!
//! The command-line front-end for the MicroScala interpreter. It reads a
//! source file, echoes it under an `Input:` header, then evaluates it and
//! prints `println` output under an `Output:` header.
//!
//! # Usage
//!
//! ```bash
//! # Interpret the default ./Test1.scala
//! interp
//!
//! # Interpret a specific file
//! interp demos/factorial.scala
//!
//! # Debug mode (recognized, no semantic effect)
//! interp -d demos/factorial.scala
//! ```
//!
//! Any diagnostic is printed in the interpreter's terminal format and the
//! process exits with a nonzero status.

use anyhow::{anyhow, Context};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use microscala::{run_source, RunError};

/// Deep recursion is part of the language contract (at least 10 000
/// frames), so evaluation runs on a thread with a generous stack.
const INTERP_STACK_BYTES: usize = 256 * 1024 * 1024;

/// Run a MicroScala source file
#[derive(Parser, Debug)]
#[command(name = "interp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Turn on debug mode
    #[arg(short = 'd', long)]
    debug: bool,

    /// MicroScala source file to interpret
    #[arg(default_value = "./Test1.scala")]
    source: PathBuf,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // --debug is accepted for compatibility and changes nothing.
    let _ = args.debug;

    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("cannot read {}", args.source.display()))?;

    let handle = thread::Builder::new()
        .name("interp".to_string())
        .stack_size(INTERP_STACK_BYTES)
        .spawn(move || interpret(&source))
        .context("failed to spawn interpreter thread")?;

    let outcome = handle
        .join()
        .map_err(|_| anyhow!("interpreter thread panicked"))?;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(diagnostic) => {
            // Diagnostics belong to the interpreter's transcript, so they
            // go to stdout like the rest of it.
            println!("{}", diagnostic.render().red());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn interpret(source: &str) -> Result<(), RunError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_source(source, &mut out)?;
    out.flush()?;
    Ok(())
}
