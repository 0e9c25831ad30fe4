//! The words every VM starts out with.
//!
//! Each word is a variant of [`BuiltIn`]. The dictionary maps names to
//! variants and [`BuiltIn::invoke`] dispatches on them. A word sees the
//! machine state and the [`Tape`], nothing else.

use std::io::Write;

use tracing::debug;

use crate::value::Value;
use crate::vm::{Machine, Result, RuntimeError, Stack, Tape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltIn {
    // robot
    Place,
    Move,
    Left,
    Right,
    Report,
    Board,
    // stack
    Dup,
    Drop,
    Swap,
    Over,
    Rot,
    Clear,
    Print,
    PrintStack,
    Cr,
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // comparison
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    // control flow
    If,
    Jmp,
}

/// every name the dictionary is loaded with, several names may share a word
pub const DEFAULT_WORDS: &[(&str, BuiltIn)] = &[
    ("PLACE", BuiltIn::Place),
    ("MOVE", BuiltIn::Move),
    ("LEFT", BuiltIn::Left),
    ("RIGHT", BuiltIn::Right),
    ("REPORT", BuiltIn::Report),
    ("BOARD", BuiltIn::Board),
    ("DUP", BuiltIn::Dup),
    ("DROP", BuiltIn::Drop),
    ("SWAP", BuiltIn::Swap),
    ("OVER", BuiltIn::Over),
    ("ROT", BuiltIn::Rot),
    ("XX", BuiltIn::Clear),
    ("CLEAR", BuiltIn::Clear),
    (".", BuiltIn::Print),
    ("PRN", BuiltIn::Print),
    ("V", BuiltIn::PrintStack),
    ("CR", BuiltIn::Cr),
    ("+", BuiltIn::Add),
    ("-", BuiltIn::Sub),
    ("*", BuiltIn::Mul),
    ("/", BuiltIn::Div),
    ("MOD", BuiltIn::Mod),
    ("=", BuiltIn::Eq),
    ("EQ", BuiltIn::Eq),
    ("<>", BuiltIn::Neq),
    ("NEQ", BuiltIn::Neq),
    ("<", BuiltIn::Lt),
    ("LT", BuiltIn::Lt),
    (">", BuiltIn::Gt),
    ("GT", BuiltIn::Gt),
    ("<=", BuiltIn::Lte),
    ("LTE", BuiltIn::Lte),
    (">=", BuiltIn::Gte),
    ("GTE", BuiltIn::Gte),
    ("IF", BuiltIn::If),
    ("JMP", BuiltIn::Jmp),
];

impl BuiltIn {
    pub fn invoke<W: Write>(self, m: &mut Machine<W>, tape: &mut Tape) -> Result<()> {
        use BuiltIn::*;
        match self {
            Place => place(m),
            Move => {
                m.robot.advance();
                Ok(())
            }
            Left => {
                m.robot.turn_left();
                Ok(())
            }
            Right => {
                m.robot.turn_right();
                Ok(())
            }
            Report => {
                m.out.write_all(m.robot.report().as_bytes())?;
                Ok(())
            }
            Board => {
                m.out.write_all(m.robot.board().as_bytes())?;
                Ok(())
            }

            Dup => {
                let top = m.stack.try_pop()?;
                m.stack.push(top.clone());
                m.stack.push(top);
                Ok(())
            }
            Drop => m.stack.try_pop().map(|_| ()),
            Swap => {
                let a = m.stack.try_pop()?;
                let b = m.stack.try_pop()?;
                m.stack.push(a);
                m.stack.push(b);
                Ok(())
            }
            Over => {
                let a = m.stack.try_pop()?;
                let b = m.stack.try_pop()?;
                m.stack.push(b.clone());
                m.stack.push(a);
                m.stack.push(b);
                Ok(())
            }
            Rot => {
                let a = m.stack.try_pop()?;
                let b = m.stack.try_pop()?;
                let c = m.stack.try_pop()?;
                m.stack.push(b);
                m.stack.push(a);
                m.stack.push(c);
                Ok(())
            }
            Clear => {
                m.stack = Stack::default();
                Ok(())
            }
            Print => {
                let top = m.stack.try_pop()?;
                writeln!(m.out, "{}", top)?;
                Ok(())
            }
            PrintStack => {
                if m.stack.is_empty() {
                    return Err(RuntimeError::StackEmpty);
                }
                for v in m.stack.iter() {
                    writeln!(m.out, "{}", v.quoted())?;
                }
                Ok(())
            }
            Cr => {
                writeln!(m.out)?;
                Ok(())
            }

            Add => arithmetic(&mut m.stack, "+", i64::checked_add),
            Sub => arithmetic(&mut m.stack, "-", i64::checked_sub),
            Mul => arithmetic(&mut m.stack, "*", i64::checked_mul),
            Div => division(&mut m.stack, "/", i64::checked_div),
            Mod => division(&mut m.stack, "MOD", i64::checked_rem),

            Eq => comparison(&mut m.stack, "=", |l, r| l == r),
            Neq => comparison(&mut m.stack, "<>", |l, r| l != r),
            Lt => comparison(&mut m.stack, "<", |l, r| l < r),
            Gt => comparison(&mut m.stack, ">", |l, r| l > r),
            Lte => comparison(&mut m.stack, "<=", |l, r| l <= r),
            Gte => comparison(&mut m.stack, ">=", |l, r| l >= r),

            If => {
                let cond = m.stack.pop_bool("IF")?;
                let target = tape.read_literal_byte()?;
                if !cond {
                    tape.jump_to(target.into())?;
                }
                Ok(())
            }
            Jmp => {
                let target = tape.read_literal_byte()?;
                tape.jump_to(target.into())
            }
        }
    }
}

/// ( x y facing -- )
fn place<W: Write>(m: &mut Machine<W>) -> Result<()> {
    let facing = m.stack.try_pop()?;
    let y = m.stack.pop_int("PLACE")?;
    let x = m.stack.pop_int("PLACE")?;
    let facing = match facing {
        Value::Direction(d) => d,
        other => return Err(RuntimeError::InvalidDirection(other.quoted())),
    };
    if !m.robot.place(x, y, facing) {
        debug!(x, y, "ignoring PLACE off the board");
    }
    Ok(())
}

fn arithmetic(stack: &mut Stack, word: &'static str, op: fn(i64, i64) -> Option<i64>) -> Result<()> {
    let (left, right) = stack.pop_int_pair(word)?;
    let res = op(left, right).ok_or(RuntimeError::Overflow(word))?;
    stack.push(Value::Int(res));
    Ok(())
}

fn division(stack: &mut Stack, word: &'static str, op: fn(i64, i64) -> Option<i64>) -> Result<()> {
    let (left, right) = stack.pop_int_pair(word)?;
    if right == 0 {
        return Err(RuntimeError::DivisionByZero(word));
    }
    let res = op(left, right).ok_or(RuntimeError::Overflow(word))?;
    stack.push(Value::Int(res));
    Ok(())
}

fn comparison(stack: &mut Stack, word: &'static str, op: fn(i64, i64) -> bool) -> Result<()> {
    let (left, right) = stack.pop_int_pair(word)?;
    stack.push(Value::Bool(op(left, right)));
    Ok(())
}
