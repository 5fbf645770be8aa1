//! IMAP command parsing
//!
//! IMAP commands have the format: `tag COMMAND arguments\r\n`
//! Example: A001 LOGIN john password
//!
//! The parser pulls tokens from the [`Lexer`] with one token of lookahead and
//! never backtracks. A token of the wrong kind is a [`ParseError`]; the
//! stream is then out of step with command boundaries and the caller is
//! expected to drop the connection.

use crate::error::{ParseError, Result};
use crate::imap::lexer::{Lexer, Token, TokenKind};
use crate::imap::{Command, CommandKind};
use tokio::io::AsyncBufRead;
use tracing::debug;

pub struct Parser<R> {
    lexer: Lexer<R>,
}

impl<R: AsyncBufRead + Unpin> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lexer: Lexer::new(reader),
        }
    }

    /// Parse the next command
    ///
    /// Returns `None` when the input ends cleanly between two commands.
    pub async fn next(&mut self) -> Result<Option<Command>> {
        let tag = match self.lexer.next().await? {
            Some(token) => expect(token, TokenKind::Atom)?.value,
            None => return Ok(None),
        };
        let raw_command = self.match_token(TokenKind::Atom).await?.value;

        let kind = match raw_command.to_ascii_lowercase().as_str() {
            "noop" => self.no_arguments(CommandKind::Noop).await?,
            "capability" => self.no_arguments(CommandKind::Capability).await?,
            "login" => self.login().await?,
            "logout" => self.no_arguments(CommandKind::Logout).await?,
            "select" => self.select().await?,
            "list" => self.list().await?,
            "fetch" => self.fetch().await?,
            _ => self.unknown(raw_command).await?,
        };

        debug!("Parsed {} command with tag {}", kind.name(), tag);
        Ok(Some(Command::new(tag, kind)))
    }

    async fn no_arguments(&mut self, kind: CommandKind) -> Result<CommandKind> {
        self.match_token(TokenKind::EndOfLine).await?;
        Ok(kind)
    }

    async fn login(&mut self) -> Result<CommandKind> {
        let username = self.match_token(TokenKind::Atom).await?.value;
        let password = self.match_token(TokenKind::Atom).await?.value;
        self.match_token(TokenKind::EndOfLine).await?;

        Ok(CommandKind::Login { username, password })
    }

    async fn select(&mut self) -> Result<CommandKind> {
        let mailbox = self.match_token(TokenKind::Atom).await?.value;
        self.match_token(TokenKind::EndOfLine).await?;

        Ok(CommandKind::Select { mailbox })
    }

    async fn list(&mut self) -> Result<CommandKind> {
        let arguments = self.rest_of_line().await?;
        Ok(CommandKind::List { arguments })
    }

    async fn fetch(&mut self) -> Result<CommandKind> {
        let mut arguments = self.rest_of_line().await?.into_iter();
        let sequence = arguments.next();
        let rest = arguments.collect::<Vec<_>>();
        let data_item = (!rest.is_empty()).then(|| rest.join(" "));

        Ok(CommandKind::Fetch {
            sequence,
            data_item,
        })
    }

    async fn unknown(&mut self, keyword: String) -> Result<CommandKind> {
        self.skip_rest_of_line().await?;
        Ok(CommandKind::Unknown { keyword })
    }

    /// Consume tokens up to and including the next end of line
    async fn rest_of_line(&mut self) -> Result<Vec<String>> {
        let mut values = Vec::new();
        loop {
            match self.lexer.next().await? {
                Some(Token {
                    kind: TokenKind::Atom,
                    value,
                }) => values.push(value),
                Some(Token {
                    kind: TokenKind::EndOfLine,
                    ..
                }) => return Ok(values),
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: TokenKind::EndOfLine,
                    }
                    .into())
                }
            }
        }
    }

    /// Discard tokens up to and including the next end of line
    async fn skip_rest_of_line(&mut self) -> Result<()> {
        loop {
            match self.lexer.next().await? {
                Some(Token {
                    kind: TokenKind::Atom,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::EndOfLine,
                    ..
                }) => return Ok(()),
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: TokenKind::EndOfLine,
                    }
                    .into())
                }
            }
        }
    }

    async fn match_token(&mut self, expected: TokenKind) -> Result<Token> {
        match self.lexer.next().await? {
            Some(token) => expect(token, expected),
            None => Err(ParseError::UnexpectedEof { expected }.into()),
        }
    }
}

fn expect(token: Token, expected: TokenKind) -> Result<Token> {
    if token.kind == expected {
        Ok(token)
    } else {
        Err(ParseError::UnexpectedToken {
            expected,
            found: token.kind,
        }
        .into())
    }
}
