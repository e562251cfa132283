//! # MicroScala - a tiny Scala-like language, interpreted
//!
//! MicroScala is a statically typed toy language with 64-bit integers,
//! integer lists, first-order recursive functions, and imperative control
//! flow. This crate is an end-to-end tree-walking interpreter for it:
//!
//! ```text
//! source text -> Lexer -> Token stream -> Parser -> AST -> Interpreter -> stdout
//! ```
//!
//! ## Quick Start
//!
//! Run a program and capture its output:
//!
//! ```rust
//! use microscala::{parse_source, eval::Interpreter};
//!
//! let source = r#"
//! object Demo {
//!     def main(args : Array[String]) {
//!         println(1 :: 2 :: 3 :: Nil);
//!     }
//! }
//! "#;
//!
//! let program = parse_source(source).unwrap();
//! let mut out = Vec::new();
//! Interpreter::new(&program, &mut out).run().unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "[1, 2, 3]\n");
//! ```
//!
//! ## Language notes
//!
//! A few deliberately preserved quirks of the language:
//!
//! - `.tail` drops the first **and last** elements of a list.
//! - `.isEmpty` is true for integer operands.
//! - `&&` and `||` evaluate both operands; there is no short-circuiting.
//! - A global variable shadows locals and parameters of the same name, in
//!   reads and writes alike.
//!
//! ## Modules
//!
//! - [`ast`]: Abstract Syntax Tree definitions and the pretty printer
//! - [`lexer`]: Tokenization of MicroScala source text
//! - [`parser`]: Recursive descent parser producing the AST
//! - [`error`]: Error types and terminal diagnostic rendering
//! - [`eval`]: Runtime values, environments, and the interpreter

#![doc(html_root_url = "https://docs.rs/microscala/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

// Re-exports for convenience
pub use ast::{DecVar, Expr, Function, Literal, Program, Span, Stmt, Type, UNDEFINED};
pub use error::{LexError, ParseError, RunError};
pub use eval::{Environment, EvalError, Interpreter, Value};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use std::io::Write;

/// Parses a MicroScala source string into an AST.
///
/// This is the primary entry point for parsing.
///
/// # Arguments
///
/// * `source` - The MicroScala source text to parse
///
/// # Returns
///
/// A [`Program`] on success, or the first [`ParseError`] on failure; the
/// parser does not recover.
///
/// # Example
///
/// ```rust
/// use microscala::parse_source;
///
/// let source = "object P { def main(args : Array[String]) { println(42); } }";
///
/// let program = parse_source(source).unwrap();
/// assert_eq!(program.name, "P");
/// ```
pub fn parse_source(source: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(source);
    parser.parse()
}

/// Parses and runs a MicroScala source string, writing the interpreter's
/// full transcript to `out`.
///
/// The transcript is the `Input:` header, the echoed source lines, the
/// `Output:` header, and one line per `println`. Any lexical, syntactic,
/// or runtime failure stops the run and is returned as a [`RunError`];
/// rendering it with [`RunError::render`] yields the terminal diagnostic.
///
/// # Example
///
/// ```rust
/// use microscala::run_source;
///
/// let source = "object P { def main(args : Array[String]) { println(7); } }";
///
/// let mut out = Vec::new();
/// run_source(source, &mut out).unwrap();
/// let transcript = String::from_utf8(out).unwrap();
/// assert!(transcript.contains("Output:"));
/// assert!(transcript.ends_with("7\n\n"));
/// ```
pub fn run_source<W: Write>(source: &str, out: &mut W) -> Result<(), RunError> {
    writeln!(out, "\nInput:\n")?;
    for line in source.lines() {
        writeln!(out, "{}", line)?;
    }

    let program = parse_source(source)?;

    writeln!(out, "Output:\n")?;
    let mut interpreter = Interpreter::new(&program, &mut *out);
    interpreter.run()?;
    writeln!(out)?;

    Ok(())
}
