//! The stack machine that runs compiled programs.
//!
//! A [`Vm`] owns the robot, the evaluation stack, the output sink and the
//! dictionary. Execution walks a [`Tape`] one instruction at a time: `PUSH_VAL`
//! pushes a literal, `EXEC_WORD` looks a name up and invokes the word, which may
//! read from and jump around the same tape.
//!
//! Execution stops at the end of the tape or at the first failing
//! instruction. Whatever happened before the failure stays done.

use std::collections::HashMap;
use std::io::{self, Stdout, Write};
use std::result::Result as StdResult;

use thiserror::Error;
use tracing::{debug, trace};

use crate::compiler;
use crate::opcode::OpCode;
use crate::tokenizer;
use crate::value::ValueType;

pub mod built_ins;
pub mod robot;
pub mod stack;
pub mod tape;

pub use built_ins::BuiltIn;
pub use robot::{Placement, Robot};
pub use stack::Stack;
pub use tape::Tape;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("unknown word {0}")]
    UnknownWord(String),

    #[error("stack is empty")]
    StackEmpty,

    #[error("types do not match: {left} and {right}")]
    TypesDoNotMatch { left: ValueType, right: ValueType },

    #[error("unsupported type {found} for {word}")]
    UnsupportedType {
        word: &'static str,
        found: ValueType,
    },

    #[error("expected {expected} for {word}, got {found}")]
    ExpectedType {
        word: &'static str,
        expected: ValueType,
        found: ValueType,
    },

    #[error("invalid direction {0}")]
    InvalidDirection(String),

    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("integer overflow in {0}")]
    Overflow(&'static str),

    #[error("jump to {target} is outside of the program ({len} bytes)")]
    JumpOutOfBounds { target: usize, len: usize },

    #[error("invalid instruction {byte:#04x} at {offset}")]
    InvalidInstruction { offset: usize, byte: u8 },

    #[error("invalid value type {tag:#04x} at {offset}")]
    InvalidType { offset: usize, tag: u8 },

    #[error("unexpected end of bytecode at {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("invalid utf-8 in bytecode at {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("writing output: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T> = StdResult<T, RuntimeError>;

/// returned by [`Vm::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// an instruction ran, there is more to do
    Continue,
    /// the instruction pointer reached the end of the tape
    Finished,
}

/// Everything a word is allowed to touch.
#[derive(Debug)]
pub struct Machine<W> {
    pub robot: Robot,
    pub stack: Stack,
    pub out: W,
}

/// Maps upper-cased word names to builtins. Filled once, when the VM is
/// created.
#[derive(Debug, Clone, Default)]
pub struct Dictionary(HashMap<String, BuiltIn>);

impl Dictionary {
    pub fn load_env(&mut self) {
        for (name, word) in built_ins::DEFAULT_WORDS {
            self.0.insert((*name).into(), *word);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<BuiltIn> {
        self.0.get(&name.to_uppercase()).copied()
    }
}

pub struct Vm<W: Write = Stdout> {
    machine: Machine<W>,
    dictionary: Dictionary,
}

impl Vm<Stdout> {
    /// a VM printing to stdout
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Vm<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Vm<W> {
    pub fn with_output(out: W) -> Self {
        let mut dictionary = Dictionary::default();
        dictionary.load_env();
        Self {
            machine: Machine {
                robot: Robot::default(),
                stack: Stack::default(),
                out,
            },
            dictionary,
        }
    }

    /// Tokenizes, compiles and executes one program. Robot and stack carry
    /// over from earlier runs.
    pub fn run(&mut self, src: &str) -> StdResult<(), crate::Error> {
        let tokens = tokenizer::tokenize(src)?;
        let code = compiler::compile(&tokens)?;
        self.execute(&code)?;
        Ok(())
    }

    /// executes compiled bytecode until it ends or fails
    pub fn execute(&mut self, code: &[u8]) -> Result<()> {
        let mut tape = Tape::new(code);
        while self.step(&mut tape)? == ExecOutcome::Continue {}
        debug!(bytes = code.len(), "program finished");
        Ok(())
    }

    /// executes exactly one instruction
    pub fn step(&mut self, tape: &mut Tape) -> Result<ExecOutcome> {
        if tape.is_finished() {
            return Ok(ExecOutcome::Finished);
        }
        let offset = tape.ip();
        let byte = tape.read_literal_byte()?;
        match OpCode::from_repr(byte) {
            Some(OpCode::PushVal) => {
                let value = tape.read_value()?;
                trace!(offset, ?value, "PUSH_VAL");
                self.machine.stack.push(value);
            }
            Some(OpCode::ExecWord) => {
                let name = tape.read_text()?;
                trace!(offset, %name, "EXEC_WORD");
                let word = self
                    .dictionary
                    .lookup(&name)
                    .ok_or(RuntimeError::UnknownWord(name))?;
                word.invoke(&mut self.machine, tape)?;
            }
            None => return Err(RuntimeError::InvalidInstruction { offset, byte }),
        }
        Ok(if tape.is_finished() {
            ExecOutcome::Finished
        } else {
            ExecOutcome::Continue
        })
    }

    pub fn robot(&self) -> &Robot {
        &self.machine.robot
    }

    pub fn stack(&self) -> &Stack {
        &self.machine.stack
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn output(&self) -> &W {
        &self.machine.out
    }

    pub fn into_output(self) -> W {
        self.machine.out
    }
}
