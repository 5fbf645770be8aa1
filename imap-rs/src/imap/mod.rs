//! IMAP server implementation
//!
//! Pipeline: [`lexer`] → [`parser`] → [`command`] executed against a
//! [`session`] → [`response`]. Supported commands: NOOP, CAPABILITY, LOGIN,
//! LOGOUT, SELECT; LIST and FETCH are accepted but answered with BAD.

pub mod auth;
pub mod command;
pub mod lexer;
pub mod maildir;
pub mod parser;
pub mod response;
pub mod server;
pub mod session;
pub mod store;

pub use auth::{AcceptAll, CredentialVerifier};
pub use command::{Command, CommandKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use maildir::MaildirStore;
pub use parser::Parser;
pub use response::{Response, Status};
pub use server::{serve_connection, ImapServer};
pub use session::{Session, SessionLog, SessionState, TracingLog};
pub use store::{MailboxInfo, MailboxStore, MemoryStore};
