//! Evaluation of MicroScala programs.
//!
//! This module provides the runtime half of the interpreter: the value
//! representation, the scope-stack environment with its global-first
//! resolution rule, and the tree-walking [`Interpreter`].
//!
//! # Example
//!
//! ```rust
//! use microscala::eval::Interpreter;
//! use microscala::parse_source;
//!
//! let program = parse_source(
//!     "object P { def main(args : Array[String]) { println(7 :: Nil); } }",
//! )
//! .unwrap();
//!
//! let mut out = Vec::new();
//! Interpreter::new(&program, &mut out).run().unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "[7]\n");
//! ```

pub mod interpreter;
pub mod value;

pub use interpreter::Interpreter;
pub use value::{Environment, EvalError, Value};
