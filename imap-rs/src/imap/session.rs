//! IMAP session state
//!
//! One [`Session`] exists per connection. It tracks whether the client has
//! logged in and which mailbox, if any, is selected. Commands mutate it
//! through [`crate::imap::Command::execute`].

use crate::error::{ImapError, Result};
use crate::imap::auth::{AcceptAll, CredentialVerifier};
use crate::imap::store::{MailboxInfo, MailboxStore};
use crate::imap::Response;
use std::sync::Arc;
use tracing::{debug, info};

/// Flags advertised for every selected mailbox
const MAILBOX_FLAGS: &str = "FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)";

/// IMAP session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not authenticated
    NotAuthenticated,
    /// Successful LOGIN
    Authenticated,
}

/// Sink for session-level diagnostics
#[cfg_attr(test, mockall::automock)]
pub trait SessionLog: Send + Sync {
    fn log(&self, message: &str);
}

/// [`SessionLog`] writing to `tracing`, labelled with the connection peer
#[derive(Debug, Clone)]
pub struct TracingLog {
    peer: String,
}

impl TracingLog {
    pub fn new(peer: impl Into<String>) -> Self {
        Self { peer: peer.into() }
    }
}

impl SessionLog for TracingLog {
    fn log(&self, message: &str) {
        info!(peer = %self.peer, "{}", message);
    }
}

/// Per-connection IMAP session
pub struct Session {
    state: SessionState,
    /// Name the client logged in with
    user: Option<String>,
    /// Currently selected mailbox (if any)
    selected: Option<MailboxInfo>,
    store: Arc<dyn MailboxStore>,
    verifier: Arc<dyn CredentialVerifier>,
    log: Arc<dyn SessionLog>,
}

impl Session {
    pub fn new(
        store: Arc<dyn MailboxStore>,
        verifier: Arc<dyn CredentialVerifier>,
        log: Arc<dyn SessionLog>,
    ) -> Self {
        Self {
            state: SessionState::NotAuthenticated,
            user: None,
            selected: None,
            store,
            verifier,
            log,
        }
    }

    /// Session accepting any LOGIN and logging through `tracing`
    pub fn with_store(store: Arc<dyn MailboxStore>) -> Self {
        Self::new(store, Arc::new(AcceptAll), Arc::new(TracingLog::new("local")))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn selected_mailbox(&self) -> Option<&MailboxInfo> {
        self.selected.as_ref()
    }

    pub fn log(&self, message: &str) {
        self.log.log(message);
    }

    /// Ask the credential verifier about a LOGIN attempt
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<bool> {
        self.verifier.verify(username, password).await
    }

    /// Move to the Authenticated state
    pub fn authenticate(&mut self, username: &str) {
        info!("Session authenticated as {}", username);
        self.state = SessionState::Authenticated;
        self.user = Some(username.to_string());
    }

    /// Resolve `name` through the store and make it the selected mailbox
    ///
    /// Any previous selection is dropped first, so a failed SELECT leaves
    /// nothing selected.
    pub async fn select_mailbox(&mut self, name: &str) -> Result<bool> {
        self.selected = None;

        match self.store.select(name).await? {
            Some(info) => {
                debug!("Selected mailbox {} ({} messages)", info.name, info.exists);
                self.selected = Some(info);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Attach the selected mailbox's status lines to a response
    pub fn add_mailbox_info(&self, response: &mut Response) -> Result<()> {
        let info = self.selected.as_ref().ok_or(ImapError::NoMailboxSelected)?;

        response.push_extra(MAILBOX_FLAGS);
        response.push_extra(format!("{} EXISTS", info.exists));
        response.push_extra(format!("{} RECENT", info.recent));
        if let Some(unseen) = info.first_unseen {
            response.push_extra(format!(
                "OK [UNSEEN {}] Message {} is first unseen",
                unseen, unseen
            ));
        }
        response.push_extra(format!("OK [UIDVALIDITY {}] UIDs valid", info.uid_validity));
        response.push_extra(format!("OK [UIDNEXT {}] Predicted next UID", info.uid_next));

        Ok(())
    }

    /// Back to NotAuthenticated, dropping user and selection
    pub fn logout(&mut self) {
        info!("LOGOUT");
        self.state = SessionState::NotAuthenticated;
        self.user = None;
        self.selected = None;
    }
}
