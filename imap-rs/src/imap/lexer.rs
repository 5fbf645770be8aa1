//! IMAP command tokenizer
//!
//! Splits the client byte stream into atoms (bare or quoted) and end-of-line
//! markers. Tokens are produced lazily, one per call to [`Lexer::next`].

use crate::error::{LexError, Result};
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Maximum size of a single token (atom or quoted string)
pub const MAX_TOKEN_LENGTH: usize = 8192;

/// Maximum size of one command line, line terminator excluded
pub const MAX_LINE_LENGTH: usize = 65536;

/// Kind of lexical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare atom or quoted string
    Atom,
    /// CRLF (or bare LF) terminating a command
    EndOfLine,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Atom => write!(f, "Atom"),
            TokenKind::EndOfLine => write!(f, "EndOfLine"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn atom(value: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Atom,
            value: value.into(),
        }
    }

    pub fn end_of_line() -> Self {
        Self {
            kind: TokenKind::EndOfLine,
            value: String::new(),
        }
    }
}

/// Tokenizer over a buffered async reader
pub struct Lexer<R> {
    reader: R,
    /// Bytes consumed since the last end of line
    line_length: usize,
}

impl<R: AsyncBufRead + Unpin> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_length: 0,
        }
    }

    /// Next token, or `None` once the input is exhausted
    ///
    /// Suspends until enough input is available to complete the token.
    pub async fn next(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace().await?;

        let byte = match self.peek().await? {
            Some(byte) => byte,
            None => return Ok(None),
        };

        match byte {
            b'\n' => {
                self.end_line();
                Ok(Some(Token::end_of_line()))
            }
            b'\r' => match self.peek_second().await? {
                Some(b'\n') => {
                    self.end_line();
                    Ok(Some(Token::end_of_line()))
                }
                _ => Err(LexError::BareCarriageReturn.into()),
            },
            b'"' => {
                self.bump()?;
                self.quoted().await.map(Some)
            }
            _ => self.atom().await.map(Some),
        }
    }

    async fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b' ' | b'\t') = self.peek().await? {
            self.bump()?;
        }
        Ok(())
    }

    async fn atom(&mut self) -> Result<Token> {
        let mut bytes = Vec::new();

        while let Some(byte) = self.peek().await? {
            if matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b'"') {
                break;
            }
            push_byte(&mut bytes, byte)?;
            self.bump()?;
        }

        Ok(Token::atom(into_text(bytes)?))
    }

    /// Quoted string body; the opening quote is already consumed
    async fn quoted(&mut self) -> Result<Token> {
        let mut bytes = Vec::new();

        loop {
            match self.peek().await? {
                None | Some(b'\r' | b'\n') => return Err(LexError::UnterminatedQuote.into()),
                Some(b'"') => {
                    self.bump()?;
                    break;
                }
                Some(b'\\') => {
                    self.bump()?;
                    match self.peek().await? {
                        Some(escaped @ (b'"' | b'\\')) => {
                            push_byte(&mut bytes, escaped)?;
                            self.bump()?;
                        }
                        Some(other) => return Err(LexError::InvalidEscape(other as char).into()),
                        None => return Err(LexError::UnterminatedQuote.into()),
                    }
                }
                Some(byte) => {
                    push_byte(&mut bytes, byte)?;
                    self.bump()?;
                }
            }
        }

        Ok(Token::atom(into_text(bytes)?))
    }

    async fn peek(&mut self) -> Result<Option<u8>> {
        let buf = self.reader.fill_buf().await?;
        Ok(buf.first().copied())
    }

    /// Byte after a `\r`, consuming the `\r`
    async fn peek_second(&mut self) -> Result<Option<u8>> {
        self.reader.consume(1);
        self.peek().await
    }

    /// Consume one byte of the current line
    fn bump(&mut self) -> Result<()> {
        if self.line_length >= MAX_LINE_LENGTH {
            return Err(LexError::LineTooLong(MAX_LINE_LENGTH).into());
        }
        self.reader.consume(1);
        self.line_length += 1;
        Ok(())
    }

    /// Consume the final `\n` of a line terminator and start a new line
    fn end_line(&mut self) {
        self.reader.consume(1);
        self.line_length = 0;
    }
}

fn push_byte(bytes: &mut Vec<u8>, byte: u8) -> Result<()> {
    if bytes.len() >= MAX_TOKEN_LENGTH {
        return Err(LexError::TokenTooLong(MAX_TOKEN_LENGTH).into());
    }
    bytes.push(byte);
    Ok(())
}

fn into_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| LexError::InvalidUtf8.into())
}
