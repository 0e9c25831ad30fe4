//! Runtime values, the things that live on the evaluation stack.
//!
//! Every value carries its own tag. The tag byte is also what the compiler
//! writes after a `PUSH_VAL` opcode, so [`ValueType`] doubles as part of the
//! bytecode encoding.

use derive_more::From;
use std::fmt;
use strum_macros::{Display, FromRepr};

/// Compass direction the robot can face.
///
/// The discriminants are the ordinals stored in the bytecode, and the order
/// matters: turning right walks forwards through it, turning left backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// quarter turn counter-clockwise
    pub fn left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    /// quarter turn clockwise
    pub fn right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// the unit step (dx, dy) one move in this direction makes
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// arrow used when rendering the board
    pub fn glyph(self) -> &'static str {
        match self {
            Direction::North => "^",
            Direction::East => ">",
            Direction::South => "v",
            Direction::West => "<",
        }
    }

    /// parses a compass word, ignoring case
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "NORTH" => Some(Direction::North),
            "EAST" => Some(Direction::East),
            "SOUTH" => Some(Direction::South),
            "WEST" => Some(Direction::West),
            _ => None,
        }
    }
}

/// The tag of a [`Value`], also the type byte that follows `PUSH_VAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum ValueType {
    #[strum(serialize = "INT")]
    Int = 0,
    #[strum(serialize = "DIRECTION")]
    Direction = 1,
    #[strum(serialize = "BOOL")]
    Bool = 2,
    #[strum(serialize = "STRING")]
    Str = 3,
}

/// A tagged runtime value. Values are moved on and off the stack by value,
/// nothing on the stack is ever shared.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Value {
    Int(i64),
    Direction(Direction),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Direction(_) => ValueType::Direction,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::Str,
        }
    }

    /// the form `V` uses: like Display, but strings are quoted and escaped
    pub fn quoted(&self) -> String {
        match self {
            Value::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Direction(d) => write!(f, "{}", d),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}
