use crate::imap::lexer::TokenKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication backend error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No mailbox selected")]
    NoMailboxSelected,
}

impl ImapError {
    /// True when the token stream can no longer be trusted to be aligned on
    /// a command boundary and the connection has to be closed.
    pub fn is_framing(&self) -> bool {
        matches!(self, ImapError::Lex(_) | ImapError::Parse(_))
    }
}

/// Malformed input detected by the tokenizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated quoted string")]
    UnterminatedQuote,

    #[error("invalid escape sequence '\\{0}' in quoted string")]
    InvalidEscape(char),

    #[error("carriage return not followed by line feed")]
    BareCarriageReturn,

    #[error("token exceeds {0} bytes")]
    TokenTooLong(usize),

    #[error("command line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("token is not valid UTF-8")]
    InvalidUtf8,
}

/// Token of the wrong kind where the grammar required another one
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parser expected token type {expected} but got {found}")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },

    #[error("Parser expected token type {expected} but got end of input")]
    UnexpectedEof { expected: TokenKind },
}

pub type Result<T> = std::result::Result<T, ImapError>;
