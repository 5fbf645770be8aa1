//! imap-rs: IMAP4rev1 command core
//!
//! Tokenizer, parser and session state machine for a line-oriented IMAP
//! server, plus a small TCP driver around them.
//!
//! # Example
//!
//! ```no_run
//! use imap_rs::imap::{Command, MailboxInfo, MemoryStore, Parser, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new().with_mailbox(MailboxInfo::empty("INBOX"));
//!     let mut session = Session::with_store(Arc::new(store));
//!
//!     let input = "a1 LOGIN john secret\r\na2 SELECT INBOX\r\n";
//!     let mut parser = Parser::new(input.as_bytes());
//!     while let Some(command) = parser.next().await? {
//!         print!("{}", command.execute(&mut session).await);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`imap`]: IMAP protocol implementation

pub mod config;
pub mod error;
pub mod imap;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImapError, LexError, ParseError, Result};
