//! The bytecode encoding shared by the compiler, the VM and the disassembler.
//!
//! A program is a flat byte stream made of two instructions:
//!
//! - `PUSH_VAL <type> <payload>`: the type byte is a [`ValueType`](crate::value::ValueType).
//!   INT, DIRECTION and BOOL carry a single payload byte, STRING carries its
//!   bytes followed by a NUL.
//! - `EXEC_WORD <name bytes> 0x00`: look the name up in the dictionary and run it.
//!
//! Words that branch (`IF`, `JMP`) are followed by one more byte, the absolute
//! offset to jump to. The words read it themselves, the VM does not know about it.

use strum_macros::{Display, FromRepr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum OpCode {
    #[strum(serialize = "PUSH_VAL")]
    PushVal = 0x01,
    #[strum(serialize = "EXEC_WORD")]
    ExecWord = 0x02,
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

/// terminates STRING payloads and word names
pub const NUL: u8 = 0x00;

/// Jump targets are a single byte, so no branch can land past this offset.
pub const MAX_ADDRESS: usize = u8::MAX as usize;

/// the conditional branch word, followed by its target byte
pub const IF_WORD: &str = "IF";
/// the unconditional branch word, followed by its target byte
pub const JMP_WORD: &str = "JMP";

/// whether a word reads an inline target byte after its name
pub fn takes_operand(word: &str) -> bool {
    word == IF_WORD || word == JMP_WORD
}
