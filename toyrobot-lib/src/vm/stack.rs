use derive_more::{Deref, DerefMut};

use crate::value::{Value, ValueType};
use crate::vm::{Result, RuntimeError};

/// type that is used at runtime to represent the evaluation stack.
/// The last element is the top.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref, DerefMut)]
pub struct Stack(Vec<Value>);

impl Stack {
    pub fn try_pop(&mut self) -> Result<Value> {
        self.0.pop().ok_or(RuntimeError::StackEmpty)
    }

    /// Pops the two operands of a binary word, checking that they share a
    /// type. Returns them as (left, right): the first popped value is the
    /// right hand side.
    pub fn pop_pair(&mut self) -> Result<(Value, Value)> {
        let right = self.try_pop()?;
        let left = self.try_pop()?;
        if left.value_type() != right.value_type() {
            return Err(RuntimeError::TypesDoNotMatch {
                left: left.value_type(),
                right: right.value_type(),
            });
        }
        Ok((left, right))
    }

    /// like [`pop_pair`](Stack::pop_pair), but both operands must be INT
    pub fn pop_int_pair(&mut self, word: &'static str) -> Result<(i64, i64)> {
        match self.pop_pair()? {
            (Value::Int(left), Value::Int(right)) => Ok((left, right)),
            (left, _) => Err(RuntimeError::UnsupportedType {
                word,
                found: left.value_type(),
            }),
        }
    }

    pub fn pop_int(&mut self, word: &'static str) -> Result<i64> {
        match self.try_pop()? {
            Value::Int(i) => Ok(i),
            other => Err(RuntimeError::ExpectedType {
                word,
                expected: ValueType::Int,
                found: other.value_type(),
            }),
        }
    }

    pub fn pop_bool(&mut self, word: &'static str) -> Result<bool> {
        match self.try_pop()? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::ExpectedType {
                word,
                expected: ValueType::Bool,
                found: other.value_type(),
            }),
        }
    }
}

impl From<Vec<Value>> for Stack {
    fn from(values: Vec<Value>) -> Self {
        Stack(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_order() {
        let mut stack = Stack::from(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(stack.pop_int_pair("-").unwrap(), (1, 2));
        assert!(stack.is_empty());
        assert!(matches!(stack.try_pop(), Err(RuntimeError::StackEmpty)));
    }

    #[test]
    fn test_type_checks() {
        let mut stack = Stack::from(vec![Value::Int(1), Value::Bool(true)]);
        assert!(matches!(
            stack.pop_pair(),
            Err(RuntimeError::TypesDoNotMatch {
                left: ValueType::Int,
                right: ValueType::Bool
            })
        ));

        let mut stack = Stack::from(vec![Value::Bool(false), Value::Bool(true)]);
        assert!(matches!(
            stack.pop_int_pair("+"),
            Err(RuntimeError::UnsupportedType { word: "+", .. })
        ));

        let mut stack = Stack::from(vec![Value::Int(0)]);
        assert!(matches!(
            stack.pop_bool("IF"),
            Err(RuntimeError::ExpectedType { .. })
        ));
    }
}
