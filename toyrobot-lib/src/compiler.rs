//! Single pass compiler from tokens to bytecode.
//!
//! Every token is translated on its own, in order. The only state carried
//! between tokens is the stack of pending fixups: `IF` (and `ELSE`) emit a
//! placeholder target byte and remember where it is, `FI` fills in the
//! innermost one with the offset of whatever comes next.

use thiserror::Error;
use tracing::{debug, trace};

use crate::opcode::{self, OpCode, IF_WORD, JMP_WORD, NUL};
use crate::tokenizer::{Token, TokenKind};
use crate::value::ValueType;

pub trait Compilable {
    fn compile_into(&self, compiler: &mut Compiler) -> Result<(), CompileError>;
}

pub type CompilationResult = Result<Vec<u8>, CompileError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unbalanced FI, there is no open IF")]
    UnbalancedFi,

    #[error("unbalanced IF, {open} block(s) not closed with FI")]
    UnterminatedIf { open: usize },

    #[error("ELSE outside of an IF block")]
    UnbalancedElse,

    #[error("IF block already has an ELSE")]
    DuplicateElse,

    #[error("invalid literal {lexeme}: {reason}")]
    InvalidLiteral {
        lexeme: String,
        reason: &'static str,
    },

    #[error("program too large, jump target {target} does not fit in a byte")]
    ProgramTooLarge { target: usize },
}

macro_rules! compilation_error {
    ($($err:tt)+) => {
        return Err(CompileError::$($err)*)
    };
}

/// A branch whose target byte has been emitted but not filled in yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfFrame {
    /// offset of the placeholder byte
    pub patch_location: usize,
    /// set once an ELSE re-pointed this frame at its JMP
    pub has_else: bool,
}

#[derive(Debug, Default)]
pub struct Compiler {
    text: Vec<u8>,
    fixups: Vec<IfFrame>,
}

/// compiles a token sequence into a complete program
pub fn compile(tokens: &[Token]) -> CompilationResult {
    let mut compiler = Compiler::default();
    tokens.compile_into(&mut compiler)?;
    compiler.finish()
}

impl Compiler {
    /// Returns the finished bytecode. Fails if an IF was left open.
    pub fn finish(self) -> CompilationResult {
        if !self.fixups.is_empty() {
            compilation_error!(UnterminatedIf {
                open: self.fixups.len()
            });
        }
        debug!(bytes = self.text.len(), "compiled program");
        Ok(self.text)
    }

    fn push_val(&mut self, ty: ValueType, payload: &[u8]) {
        self.text.push(OpCode::PushVal.into());
        self.text.push(ty as u8);
        self.text.extend_from_slice(payload);
    }

    fn exec_word(&mut self, name: &str) {
        self.text.push(OpCode::ExecWord.into());
        self.text.extend_from_slice(name.as_bytes());
        self.text.push(NUL);
    }

    /// emits a branch word plus a zeroed target byte, returns the byte's offset
    fn branch(&mut self, name: &str) -> usize {
        self.exec_word(name);
        self.text.push(0);
        self.text.len() - 1
    }

    /// points the placeholder at `location` to the end of the code so far
    fn patch(&mut self, location: usize) -> Result<(), CompileError> {
        let target = self.text.len();
        if target > opcode::MAX_ADDRESS {
            compilation_error!(ProgramTooLarge { target });
        }
        trace!(location, target, "patched branch target");
        self.text[location] = target as u8;
        Ok(())
    }

    fn open_if(&mut self) {
        let patch_location = self.branch(IF_WORD);
        self.fixups.push(IfFrame {
            patch_location,
            has_else: false,
        });
    }

    fn compile_else(&mut self) -> Result<(), CompileError> {
        let frame = match self.fixups.last() {
            Some(frame) => *frame,
            None => compilation_error!(UnbalancedElse),
        };
        if frame.has_else {
            compilation_error!(DuplicateElse);
        }
        // the true arm jumps over the false arm, the IF lands right after that jump
        let jmp_location = self.branch(JMP_WORD);
        self.patch(frame.patch_location)?;
        if let Some(frame) = self.fixups.last_mut() {
            frame.patch_location = jmp_location;
            frame.has_else = true;
        }
        Ok(())
    }

    fn close_if(&mut self) -> Result<(), CompileError> {
        match self.fixups.pop() {
            Some(frame) => self.patch(frame.patch_location),
            None => compilation_error!(UnbalancedFi),
        }
    }
}

impl Compilable for Token {
    fn compile_into(&self, compiler: &mut Compiler) -> Result<(), CompileError> {
        use TokenKind::*;
        match &self.kind {
            // only the low byte survives, larger numbers wrap
            Number(n) => compiler.push_val(ValueType::Int, &[*n as u8]),
            Direction(d) => compiler.push_val(ValueType::Direction, &[*d as u8]),
            Bool(b) => compiler.push_val(ValueType::Bool, &[u8::from(*b)]),
            Str(s) => {
                if s.as_bytes().contains(&NUL) {
                    compilation_error!(InvalidLiteral {
                        lexeme: self.lexeme.clone(),
                        reason: "strings can not contain NUL"
                    });
                }
                let mut payload = s.as_bytes().to_vec();
                payload.push(NUL);
                compiler.push_val(ValueType::Str, &payload);
            }
            Word(w) => match w.as_str() {
                "IF" => compiler.open_if(),
                "ELSE" => compiler.compile_else()?,
                "FI" => compiler.close_if()?,
                name => {
                    if name.is_empty() || name.as_bytes().contains(&NUL) {
                        compilation_error!(InvalidLiteral {
                            lexeme: self.lexeme.clone(),
                            reason: "not a valid word name"
                        });
                    }
                    compiler.exec_word(name)
                }
            },
        }
        Ok(())
    }
}

impl Compilable for [Token] {
    fn compile_into(&self, compiler: &mut Compiler) -> Result<(), CompileError> {
        for token in self {
            token.compile_into(compiler)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use crate::value::Direction;

    const PUSH: u8 = OpCode::PushVal as u8;
    const EXEC: u8 = OpCode::ExecWord as u8;
    const INT: u8 = ValueType::Int as u8;
    const DIR: u8 = ValueType::Direction as u8;
    const BOOL: u8 = ValueType::Bool as u8;
    const STR: u8 = ValueType::Str as u8;

    fn compile_src(src: &str) -> CompilationResult {
        compile(&tokenize(src).unwrap())
    }

    #[test]
    fn test_place() {
        assert_eq!(
            compile_src("0 0 NORTH PLACE").unwrap(),
            vec![
                PUSH,
                INT,
                0,
                PUSH,
                INT,
                0,
                PUSH,
                DIR,
                Direction::North as u8,
                EXEC,
                b'P',
                b'L',
                b'A',
                b'C',
                b'E',
                0,
            ]
        );
    }

    #[test]
    fn test_word() {
        assert_eq!(
            compile_src("move").unwrap(),
            vec![EXEC, b'M', b'O', b'V', b'E', 0]
        );
    }

    #[test]
    fn test_numbers_are_truncated_to_a_byte() {
        assert_eq!(compile_src("300").unwrap(), vec![PUSH, INT, 44]);
        assert_eq!(compile_src("255").unwrap(), vec![PUSH, INT, 255]);
    }

    #[test]
    fn test_if_fi() {
        let want = vec![
            PUSH, BOOL, 1, //
            EXEC, b'I', b'F', 0, 19, //
            PUSH, STR, b'h', b'e', b'l', b'l', b'o', 0, //
            EXEC, b'.', 0,
        ];
        assert_eq!(compile_src("true IF \"hello\" . FI").unwrap(), want);
    }

    #[test]
    fn test_fi_emits_no_bytes() {
        let with_fi = compile_src("false IF FI").unwrap();
        assert_eq!(with_fi, vec![PUSH, BOOL, 0, EXEC, b'I', b'F', 0, 8]);
        assert_eq!(with_fi[7] as usize, with_fi.len());
    }

    #[test]
    fn test_nested_if_else() {
        let src = "5 DUP 5 EQ IF \"5\" . ELSE DUP 5 GT IF \"BIGUN\" . \
                   ELSE \"SMALLUN\" . FI FI DROP";
        let want = vec![
            PUSH, INT, 5, // 0
            EXEC, b'D', b'U', b'P', 0, // 3
            PUSH, INT, 5, // 8
            EXEC, b'E', b'Q', 0, // 11
            EXEC, b'I', b'F', 0, 0x21, // 15
            PUSH, STR, b'5', 0, // 20
            EXEC, b'.', 0, // 24
            EXEC, b'J', b'M', b'P', 0, 0x50, // 27
            EXEC, b'D', b'U', b'P', 0, // 33
            PUSH, INT, 5, // 38
            EXEC, b'G', b'T', 0, // 41
            EXEC, b'I', b'F', 0, 0x43, // 45
            PUSH, STR, b'B', b'I', b'G', b'U', b'N', 0, // 50
            EXEC, b'.', 0, // 58
            EXEC, b'J', b'M', b'P', 0, 0x50, // 61
            PUSH, STR, b'S', b'M', b'A', b'L', b'L', b'U', b'N', 0, // 67
            EXEC, b'.', 0, // 77
            EXEC, b'D', b'R', b'O', b'P', 0, // 80
        ];
        assert_eq!(compile_src(src).unwrap(), want);
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(
            compile_src("IF 1 ."),
            Err(CompileError::UnterminatedIf { open: 1 })
        );
        assert_eq!(compile_src("1 . FI"), Err(CompileError::UnbalancedFi));
        assert_eq!(compile_src("ELSE FI"), Err(CompileError::UnbalancedElse));
        assert_eq!(
            compile_src("true IF ELSE ELSE FI"),
            Err(CompileError::DuplicateElse)
        );
    }

    #[test]
    fn test_target_must_fit_in_a_byte() {
        let src = format!("true IF {} FI", "MOVE ".repeat(50));
        assert!(matches!(
            compile_src(&src),
            Err(CompileError::ProgramTooLarge { .. })
        ));
        // without a branch there is no address to overflow
        assert!(compile_src(&"MOVE ".repeat(100)).is_ok());
    }

    #[test]
    fn test_nul_in_string() {
        let tokens = vec![Token {
            kind: TokenKind::Str("a\0b".into()),
            lexeme: "\"a\0b\"".into(),
        }];
        assert!(matches!(
            compile(&tokens),
            Err(CompileError::InvalidLiteral { .. })
        ));
    }
}
