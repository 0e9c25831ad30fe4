//! Turns a line of source into tokens.
//!
//! The scan is a single left-to-right pass over the characters, dispatching on
//! the class of the current character. There is no backtracking, and tokens
//! keep nothing of the source except their lexeme.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;
use tracing::debug;

use crate::value::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// the text the token was read from, as written
    pub lexeme: String,
}

/// The kind of a token together with its literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Number(i64),
    Direction(Direction),
    Bool(bool),
    /// the text between the quotes, escapes resolved
    Str(String),
    /// an identifier, upper-cased. Resolved against the dictionary at run time
    Word(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid token, unexpected '{0}'")]
    UnexpectedCharacter(char),

    #[error("invalid token, expecting number but got '{0}'")]
    MalformedNumber(String),

    #[error("unterminated string \"{0}")]
    UnterminatedString(String),
}

pub type LexResult<T> = Result<T, LexError>;

/// tokenizes a whole program
pub fn tokenize(src: &str) -> LexResult<Vec<Token>> {
    let tokens = Tokenizer::new(src).collect::<LexResult<Vec<_>>>()?;
    debug!(count = tokens.len(), "tokenized program");
    Ok(tokens)
}

/// Format characters (Unicode category Cf), as inclusive ranges.
const FORMAT_CHARS: &[(char, char)] = &[
    ('\u{ad}', '\u{ad}'),
    ('\u{600}', '\u{605}'),
    ('\u{61c}', '\u{61c}'),
    ('\u{6dd}', '\u{6dd}'),
    ('\u{70f}', '\u{70f}'),
    ('\u{890}', '\u{891}'),
    ('\u{8e2}', '\u{8e2}'),
    ('\u{180e}', '\u{180e}'),
    ('\u{200b}', '\u{200f}'),
    ('\u{202a}', '\u{202e}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206f}'),
    ('\u{feff}', '\u{feff}'),
    ('\u{fff9}', '\u{fffb}'),
    ('\u{110bd}', '\u{110bd}'),
    ('\u{110cd}', '\u{110cd}'),
    ('\u{13430}', '\u{1343f}'),
    ('\u{1bca0}', '\u{1bca3}'),
    ('\u{1d173}', '\u{1d17a}'),
    ('\u{e0001}', '\u{e0001}'),
    ('\u{e0020}', '\u{e007f}'),
];

/// Whether `c` can start a word: not a control, format or private-use
/// character, and not a noncharacter.
fn is_printable(c: char) -> bool {
    let cp = c as u32;
    let private_use = matches!(cp, 0xe000..=0xf8ff | 0xf0000..=0x10ffff);
    let noncharacter = matches!(cp, 0xfdd0..=0xfdef) || cp & 0xfffe == 0xfffe;
    !(c.is_control()
        || private_use
        || noncharacter
        || FORMAT_CHARS.iter().any(|&(lo, hi)| (lo..=hi).contains(&c)))
}

/// Lazily yields the tokens of a source string. After the first error the
/// iterator is exhausted.
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            failed: false,
        }
    }

    fn next_token(&mut self) -> LexResult<Option<Token>> {
        while let Some(&c) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '#' => self.skip_comment(),
                '"' => return self.string().map(Some),
                c if c.is_numeric() => return self.number().map(Some),
                c if is_printable(c) => return Ok(Some(self.word())),
                c => return Err(LexError::UnexpectedCharacter(c)),
            }
        }
        Ok(None)
    }

    /// consumes the maximal run of non-whitespace characters
    fn lexeme(&mut self) -> String {
        let mut lexeme = String::new();
        while let Some(c) = self.chars.next_if(|c| !c.is_whitespace()) {
            lexeme.push(c);
        }
        lexeme
    }

    fn skip_comment(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                break;
            }
        }
    }

    fn number(&mut self) -> LexResult<Token> {
        let lexeme = self.lexeme();
        let n = lexeme
            .parse::<i64>()
            .map_err(|_| LexError::MalformedNumber(lexeme.clone()))?;
        Ok(Token {
            kind: TokenKind::Number(n),
            lexeme,
        })
    }

    fn string(&mut self) -> LexResult<Token> {
        // opening quote
        self.chars.next();
        let mut text = String::new();
        loop {
            match self.chars.next() {
                None => return Err(LexError::UnterminatedString(text)),
                Some('"') => break,
                Some('\\') => match self.chars.next() {
                    None => return Err(LexError::UnterminatedString(text)),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(c) => text.push(c),
            }
        }
        Ok(Token {
            lexeme: format!("\"{}\"", text),
            kind: TokenKind::Str(text),
        })
    }

    fn word(&mut self) -> Token {
        let lexeme = self.lexeme();
        let upper = lexeme.to_uppercase();
        let kind = if let Some(d) = Direction::from_word(&upper) {
            TokenKind::Direction(d)
        } else {
            match upper.as_str() {
                "TRUE" => TokenKind::Bool(true),
                "FALSE" => TokenKind::Bool(false),
                _ => TokenKind::Word(upper),
            }
        };
        Token { kind, lexeme }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let res = self.next_token();
        if res.is_err() {
            self.failed = true;
        }
        res.transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn word(w: &str) -> TokenKind {
        TokenKind::Word(w.into())
    }

    #[test]
    fn test_place_line() {
        let tokens = tokenize("3 2 NORTH PLACE").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token {
                    kind: TokenKind::Number(3),
                    lexeme: "3".into()
                },
                Token {
                    kind: TokenKind::Number(2),
                    lexeme: "2".into()
                },
                Token {
                    kind: TokenKind::Direction(Direction::North),
                    lexeme: "NORTH".into()
                },
                Token {
                    kind: word("PLACE"),
                    lexeme: "PLACE".into()
                },
            ]
        );
    }

    #[test]
    fn test_words_are_upper_cased() {
        let tokens = tokenize("move Left").unwrap();
        assert_eq!(tokens[0].kind, word("MOVE"));
        assert_eq!(tokens[0].lexeme, "move");
        assert_eq!(tokens[1].kind, word("LEFT"));
    }

    #[test]
    fn test_directions_and_bools() {
        assert_eq!(
            kinds("north SOUTH East WEST true FALSE"),
            vec![
                TokenKind::Direction(Direction::North),
                TokenKind::Direction(Direction::South),
                TokenKind::Direction(Direction::East),
                TokenKind::Direction(Direction::West),
                TokenKind::Bool(true),
                TokenKind::Bool(false),
            ]
        );
    }

    #[test]
    fn test_operators_are_words() {
        assert_eq!(
            kinds("+ - * / <= ."),
            vec![
                word("+"),
                word("-"),
                word("*"),
                word("/"),
                word("<="),
                word(".")
            ]
        );
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize("\"hello world\"").unwrap();
        assert_eq!(
            tokens,
            vec![Token {
                kind: TokenKind::Str("hello world".into()),
                lexeme: "\"hello world\"".into()
            }]
        );
        assert_eq!(
            kinds(r#""say \"hi\"""#),
            vec![TokenKind::Str("say \"hi\"".into())]
        );
    }

    #[test]
    fn test_comments_run_to_end_of_line() {
        assert_eq!(
            kinds("MOVE # LEFT RIGHT\nREPORT # trailing"),
            vec![word("MOVE"), word("REPORT")]
        );
        assert_eq!(kinds("# nothing at all"), vec![]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize("1 2x"),
            Err(LexError::MalformedNumber("2x".into()))
        );
        assert_eq!(
            tokenize("\"no end"),
            Err(LexError::UnterminatedString("no end".into()))
        );
        assert_eq!(
            tokenize("MOVE \u{7}"),
            Err(LexError::UnexpectedCharacter('\u{7}'))
        );
    }

    #[test]
    fn test_invisible_characters_are_rejected() {
        assert_eq!(
            tokenize("MOVE \u{200B}"),
            Err(LexError::UnexpectedCharacter('\u{200B}'))
        );
        assert_eq!(
            tokenize("\u{FEFF}0 0 NORTH PLACE"),
            Err(LexError::UnexpectedCharacter('\u{FEFF}'))
        );
        assert_eq!(
            tokenize("\u{E000}"),
            Err(LexError::UnexpectedCharacter('\u{E000}'))
        );
        assert_eq!(kinds("ÉTAT →"), vec![word("ÉTAT"), word("→")]);
    }

    #[test]
    fn test_non_ascii_digits_start_a_number() {
        assert_eq!(
            tokenize("\u{663}"),
            Err(LexError::MalformedNumber("\u{663}".into()))
        );
    }

    #[test]
    fn test_tokenizing_is_repeatable() {
        let src = "5 DUP 5 EQ IF \"5\" . ELSE \"DIFFERENT\" . FI";
        assert_eq!(tokenize(src), tokenize(src));
    }
}
