//! Error types for the MicroScala interpreter.
//!
//! This module defines the error types for the front half of the pipeline
//! and the rendering of terminal diagnostics.
//!
//! # Error Categories
//!
//! - [`LexError`]: unrecognized input during tokenization
//! - [`ParseError`]: grammar mismatches, reported as `"X expected"`
//! - [`RunError`]: any failure surfaced by [`run_source`](crate::run_source)
//!
//! Runtime failures are [`EvalError`](crate::eval::EvalError)s, defined
//! next to the values they talk about.
//!
//! # Diagnostic rendering
//!
//! Positioned diagnostics echo the offending source line, place a caret
//! under the offending token, and append `at pos=N` where `N` is the
//! 0-based character offset within that line:
//!
//! ```text
//!     var x : Int = Nil
//!                   ^
//! ; expected at pos=18
//! ```
//!
//! Positionless (runtime) diagnostics render as
//! `***** Error <message> *****`.

use crate::ast::Span;
use crate::eval::EvalError;
use thiserror::Error;

/// Errors that can occur during lexical analysis.
///
/// The [`Lexer`](crate::lexer::Lexer) accumulates these while also
/// emitting an `Unknown` token, which the parser turns into a fatal
/// `"X expected"` diagnostic at its next expectation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at line {}, column {}", span.line, span.column)]
    UnexpectedChar {
        /// The unexpected character
        ch: char,
        /// Location in the source
        span: Span,
    },
}

/// Errors that can occur during parsing.
///
/// These are produced by the [`Parser`](crate::parser::Parser) when the
/// token stream does not match the MicroScala grammar. Every variant
/// carries the 0-based character offset of the offending token within its
/// line and the text of that line, for caret rendering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A grammar expectation failed.
    ///
    /// `expected` names the terminal or construct the grammar required at
    /// this point (`"object"`, `";"`, `"statement"`, ...).
    #[error("{expected} expected")]
    Expected {
        /// What the grammar required here
        expected: String,
        /// 0-based character offset within the offending line
        position: usize,
        /// The text of the offending line
        line: String,
    },

    /// An integer literal does not fit a signed 64-bit integer.
    #[error("integer literal out of range")]
    IntegerOutOfRange {
        /// The offending literal text
        lexeme: String,
        /// 0-based character offset within the offending line
        position: usize,
        /// The text of the offending line
        line: String,
    },
}

impl ParseError {
    /// Returns the 0-based offset of the diagnostic within its line.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Expected { position, .. } => *position,
            ParseError::IntegerOutOfRange { position, .. } => *position,
        }
    }

    /// Returns the text of the offending source line.
    pub fn line(&self) -> &str {
        match self {
            ParseError::Expected { line, .. } => line,
            ParseError::IntegerOutOfRange { line, .. } => line,
        }
    }

    /// Renders the full caret diagnostic: the echoed line, a caret under
    /// the offending position, and the message with `at pos=N` appended.
    pub fn render(&self) -> String {
        format!(
            "{}\n{}^\n{} at pos={}",
            self.line(),
            " ".repeat(self.position()),
            self,
            self.position()
        )
    }
}

/// Any failure surfaced by [`run_source`](crate::run_source).
///
/// Wraps the phase-specific errors so callers that drive the whole
/// pipeline handle one type.
#[derive(Error, Debug)]
pub enum RunError {
    /// The source did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Writing interpreter output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Renders the terminal diagnostic for this error.
    pub fn render(&self) -> String {
        match self {
            RunError::Parse(err) => err.render(),
            RunError::Eval(err) => err.render(),
            RunError::Io(err) => format!("***** Error {} *****", err),
        }
    }
}
