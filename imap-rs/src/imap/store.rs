//! Mailbox lookup used by SELECT

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Summary of a mailbox, as reported when it is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxInfo {
    /// Mailbox name (e.g., "INBOX")
    pub name: String,
    /// Number of messages
    pub exists: usize,
    /// Number of messages with the \Recent flag
    pub recent: usize,
    /// Sequence number of the first unseen message
    pub first_unseen: Option<usize>,
    pub uid_validity: u32,
    pub uid_next: u32,
}

impl MailboxInfo {
    /// Empty mailbox with the given name
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: 0,
            recent: 0,
            first_unseen: None,
            uid_validity: 1,
            uid_next: 1,
        }
    }
}

/// Backend resolving mailbox names
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxStore: Send + Sync {
    /// Look up a mailbox by name
    ///
    /// `Ok(None)` means the mailbox does not exist. `Err` is reserved for
    /// failures of the backend itself.
    async fn select(&self, name: &str) -> Result<Option<MailboxInfo>>;
}

/// In-memory store with a fixed set of mailboxes
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    mailboxes: HashMap<String, MailboxInfo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mailbox(mut self, info: MailboxInfo) -> Self {
        self.mailboxes.insert(normalize(&info.name), info);
        self
    }
}

#[async_trait]
impl MailboxStore for MemoryStore {
    async fn select(&self, name: &str) -> Result<Option<MailboxInfo>> {
        Ok(self.mailboxes.get(&normalize(name)).cloned())
    }
}

/// INBOX is case-insensitive, every other name is not
fn normalize(name: &str) -> String {
    if name.eq_ignore_ascii_case("INBOX") {
        "INBOX".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store = MemoryStore::new().with_mailbox(MailboxInfo::empty("Archive"));

        assert!(store.select("Archive").await.unwrap().is_some());
        assert!(store.select("archive").await.unwrap().is_none());
        assert!(store.select("Missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_inbox_any_case() {
        let store = MemoryStore::new().with_mailbox(MailboxInfo::empty("inbox"));

        let info = store.select("InBoX").await.unwrap().unwrap();
        assert_eq!(info.name, "inbox");
    }
}
