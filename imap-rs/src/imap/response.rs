//! IMAP server responses
//!
//! A response is one tagged status line, optionally preceded by untagged
//! (`* ...`) lines, plus a flag telling the connection driver to hang up once
//! the response has been written.

use crate::error::ImapError;
use crate::imap::Session;
use std::fmt;

/// Status of a tagged response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    No,
    Bad,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::No => write!(f, "NO"),
            Status::Bad => write!(f, "BAD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    tag: String,
    status: Status,
    message: String,
    extra: Vec<String>,
    close: bool,
}

impl Response {
    fn new(tag: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            status,
            message: message.into(),
            extra: Vec::new(),
            close: false,
        }
    }

    pub fn ok(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tag, Status::Ok, message)
    }

    pub fn no(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tag, Status::No, message)
    }

    pub fn bad(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tag, Status::Bad, message)
    }

    /// Append an untagged line (without the leading `* `)
    pub fn extra(mut self, line: impl Into<String>) -> Self {
        self.push_extra(line);
        self
    }

    pub fn push_extra(&mut self, line: impl Into<String>) {
        self.extra.push(line.into());
    }

    /// Close the connection after this response is sent
    pub fn should_close(mut self) -> Self {
        self.close = true;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn extra_lines(&self) -> &[String] {
        &self.extra
    }

    pub fn closes_connection(&self) -> bool {
        self.close
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.extra {
            write!(f, "* {}\r\n", line)?;
        }
        write!(f, "{} {} {}\r\n", self.tag, self.status, self.message)
    }
}

/// Turn a collaborator failure into a NO response that closes the connection
///
/// The failure is reported through the session's logger.
pub fn internal_error(
    session: &Session,
    tag: impl Into<String>,
    command_name: &str,
    err: &ImapError,
) -> Response {
    let message = format!("{} {}", command_name, err);
    session.log(&message);
    Response::no(tag, message).should_close()
}
