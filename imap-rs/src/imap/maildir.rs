//! Maildir-backed mailbox store
//!
//! INBOX maps to the Maildir root, every other mailbox `Name` to the
//! `.Name` subfolder. Only message counts are read; message contents are
//! never opened.

use crate::error::{ImapError, Result};
use crate::imap::store::{MailboxInfo, MailboxStore};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// UID validity reported for every folder
const UID_VALIDITY: u32 = 1;

pub struct MaildirStore {
    root: PathBuf,
}

impl MaildirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Folder for a mailbox name, `None` for names that cannot be a folder
    fn folder_path(&self, name: &str) -> Option<PathBuf> {
        if name.eq_ignore_ascii_case("INBOX") {
            return Some(self.root.clone());
        }

        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }

        // Maildir convention: subfolders start with a dot
        Some(self.root.join(format!(".{}", name)))
    }

    fn scan(name: &str, folder: &Path) -> Result<MailboxInfo> {
        // Messages in new/ are recent and unseen; they get the lowest sequence numbers
        let new = list_messages(&folder.join("new"))?;
        let cur = list_messages(&folder.join("cur"))?;

        let first_unseen = if !new.is_empty() {
            Some(1)
        } else {
            cur.iter()
                .position(|filename| !maildir_flags(filename).contains('S'))
                .map(|index| index + 1)
        };

        let exists = new.len() + cur.len();

        Ok(MailboxInfo {
            name: name.to_string(),
            exists,
            recent: new.len(),
            first_unseen,
            uid_validity: UID_VALIDITY,
            uid_next: exists as u32 + 1,
        })
    }
}

#[async_trait]
impl MailboxStore for MaildirStore {
    async fn select(&self, name: &str) -> Result<Option<MailboxInfo>> {
        let folder = match self.folder_path(name) {
            Some(folder) => folder,
            None => return Ok(None),
        };

        if !folder.is_dir() {
            debug!("Mailbox folder {} not found", folder.display());
            return Ok(None);
        }

        Self::scan(name, &folder).map(Some)
    }
}

/// Sorted file names in a Maildir subdirectory; a missing directory is empty
fn list_messages(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        ImapError::Storage(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ImapError::Storage(e.to_string()))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();

    Ok(names)
}

/// Info flags of a Maildir file name (`unique:2,FLAGS`)
fn maildir_flags(filename: &str) -> &str {
    filename.split(":2,").nth(1).unwrap_or("")
}
