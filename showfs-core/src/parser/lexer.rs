//! Tokenizer for the meta selector

use super::error::{ParseError, ParseErrorKind, ParseResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Identifier(String),
    Dot,
    Plus,
    Minus,
    Asterisk,
    Slash,
    LeftParen,
    RightParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Str(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Asterisk => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based column in the whole expression
    pub column: usize,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    /// Columns of characters that precede the lexed text
    offset: usize,
}

impl Lexer {
    /// `offset` is the number of characters before `text` in the full source.
    pub fn new(text: &str, offset: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            offset,
        }
    }

    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn column(&self, pos: usize) -> usize {
        self.offset + pos + 1
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn next_token(&mut self) -> ParseResult<Option<Token>> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '0'..='9' => self.number()?,
            '"' | '\'' => self.string(c)?,
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => {
                self.pos += 1;
                match c {
                    '.' => TokenKind::Dot,
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Asterisk,
                    '/' => TokenKind::Slash,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    other => {
                        return Err(ParseError::at(
                            ParseErrorKind::UnexpectedChar(other),
                            self.column(start),
                        ))
                    }
                }
            }
        };

        Ok(Some(Token {
            kind,
            column: self.column(start),
        }))
    }

    fn number(&mut self) -> ParseResult<TokenKind> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        // `2k` is neither a number nor an identifier
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::at(ParseErrorKind::InvalidNumber(text), self.column(start)))
    }

    fn string(&mut self, quote: char) -> ParseResult<TokenKind> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::at(
                        ParseErrorKind::UnterminatedString,
                        self.column(start),
                    ))
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(TokenKind::Str(value));
                }
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| {
                        ParseError::at(ParseErrorKind::UnterminatedString, self.column(start))
                    })?;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += 1;
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        TokenKind::Identifier(self.chars[start..self.pos].iter().collect())
    }
}
