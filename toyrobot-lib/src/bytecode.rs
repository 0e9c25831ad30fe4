//! Turns bytecode back into a readable listing. Used by the developer views
//! of the interpreter and by tests.

use std::fmt;

use crate::opcode::{self, OpCode};
use crate::value::Value;
use crate::vm::{Result, RuntimeError, Tape};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    PushVal(Value),
    ExecWord(String),
    /// the inline target byte following `IF` or `JMP`
    Operand(u8),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushVal(v) => write!(f, "{} {} {}", OpCode::PushVal, v.value_type(), v.quoted()),
            Instruction::ExecWord(name) => write!(f, "{} {}", OpCode::ExecWord, name),
            Instruction::Operand(b) => write!(f, "OPERAND {}", b),
        }
    }
}

/// a decoded program
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// byte offset and instruction, in program order
    pub entries: Vec<(usize, Instruction)>,
}

impl Listing {
    /// index of the entry starting at `offset`
    pub fn index_of(&self, offset: usize) -> Option<usize> {
        self.entries
            .binary_search_by_key(&offset, |(o, _)| *o)
            .ok()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (offset, inst) in &self.entries {
            writeln!(f, "{:04}: {}", offset, inst)?;
        }
        Ok(())
    }
}

pub fn disassemble(code: &[u8]) -> Result<Listing> {
    let mut tape = Tape::new(code);
    let mut entries = vec![];
    while !tape.is_finished() {
        let offset = tape.ip();
        let byte = tape.read_literal_byte()?;
        match OpCode::from_repr(byte) {
            Some(OpCode::PushVal) => entries.push((offset, Instruction::PushVal(tape.read_value()?))),
            Some(OpCode::ExecWord) => {
                let name = tape.read_text()?;
                let operand = opcode::takes_operand(&name);
                entries.push((offset, Instruction::ExecWord(name)));
                if operand {
                    let offset = tape.ip();
                    entries.push((offset, Instruction::Operand(tape.read_literal_byte()?)));
                }
            }
            None => return Err(RuntimeError::InvalidInstruction { offset, byte }),
        }
    }
    Ok(Listing { entries })
}
