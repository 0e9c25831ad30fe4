use crate::opcode::NUL;
use crate::value::{Direction, Value, ValueType};
use crate::vm::{Result, RuntimeError};

/// The bytecode of one program together with its instruction pointer.
///
/// This is the only control state words get to see: a branching word reads
/// its target with [`read_literal_byte`](Tape::read_literal_byte) and moves
/// the instruction pointer with [`jump_to`](Tape::jump_to).
#[derive(Debug, Clone)]
pub struct Tape<'a> {
    code: &'a [u8],
    ip: usize,
}

impl<'a> Tape<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, ip: 0 }
    }

    /// offset of the next byte to be read
    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn is_finished(&self) -> bool {
        self.ip >= self.code.len()
    }

    /// reads the byte under the instruction pointer and advances past it
    pub fn read_literal_byte(&mut self) -> Result<u8> {
        let byte = *self
            .code
            .get(self.ip)
            .ok_or(RuntimeError::UnexpectedEnd { offset: self.ip })?;
        self.ip += 1;
        Ok(byte)
    }

    /// Moves the instruction pointer. Jumping to the very end is allowed and
    /// halts the program.
    pub fn jump_to(&mut self, target: usize) -> Result<()> {
        if target > self.code.len() {
            return Err(RuntimeError::JumpOutOfBounds {
                target,
                len: self.code.len(),
            });
        }
        self.ip = target;
        Ok(())
    }

    /// reads up to the next NUL, leaving the pointer after it
    pub(crate) fn read_terminated(&mut self) -> Result<&'a [u8]> {
        let start = self.ip;
        let len = self.code[start.min(self.code.len())..]
            .iter()
            .position(|b| *b == NUL)
            .ok_or(RuntimeError::UnexpectedEnd {
                offset: self.code.len(),
            })?;
        self.ip = start + len + 1;
        Ok(&self.code[start..start + len])
    }

    pub(crate) fn read_text(&mut self) -> Result<String> {
        let offset = self.ip;
        let bytes = self.read_terminated()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| RuntimeError::InvalidUtf8 { offset })
    }

    /// decodes the type tag and payload that follow a `PUSH_VAL`
    pub(crate) fn read_value(&mut self) -> Result<Value> {
        let offset = self.ip;
        let tag = self.read_literal_byte()?;
        let ty = ValueType::from_repr(tag).ok_or(RuntimeError::InvalidType { offset, tag })?;
        Ok(match ty {
            ValueType::Int => Value::Int(self.read_literal_byte()?.into()),
            ValueType::Direction => {
                let ordinal = self.read_literal_byte()?;
                let d = Direction::from_repr(ordinal)
                    .ok_or_else(|| RuntimeError::InvalidDirection(ordinal.to_string()))?;
                Value::Direction(d)
            }
            ValueType::Bool => Value::Bool(self.read_literal_byte()? != 0),
            ValueType::Str => Value::Str(self.read_text()?),
        })
    }
}
