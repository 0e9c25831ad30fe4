//! A small stack language for driving a robot around a 5x5 board.
//!
//! Running a program takes three steps, each of which can fail with its own
//! error type:
//! 1. split the source into tokens with [`tokenizer::tokenize`]
//! 1. compile the tokens to bytecode with [`compiler::compile`]
//! 1. execute the bytecode on a [`vm::Vm`]
//!
//! [`vm::Vm::run`] does all three and is what you usually want:
//!
//! ```
//! use toyrobot_lib::vm::Vm;
//!
//! let mut vm = Vm::with_output(vec![]);
//! vm.run("0 0 NORTH PLACE MOVE REPORT").unwrap();
//! assert_eq!(vm.into_output(), b"0,1,NORTH\n");
//! ```
//!
//! The VM keeps its robot and stack between runs, so a REPL can feed it one
//! line at a time.
pub mod bytecode;
pub mod compiler;
pub mod opcode;
pub mod tokenizer;
pub mod value;
pub mod vm;

use thiserror::Error;

pub use compiler::CompileError;
pub use tokenizer::LexError;
pub use vm::RuntimeError;

/// the first error raised by any stage of [`vm::Vm::run`]
#[derive(Error, Debug)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}
