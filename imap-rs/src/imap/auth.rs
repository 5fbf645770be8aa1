//! LOGIN credential verification
//!
//! No credential store is wired in yet: the default [`AcceptAll`] verifier
//! lets every LOGIN through. Deployments plug their own [`CredentialVerifier`]
//! into the session.

use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` rejects the credentials, `Err` means the check itself failed
    async fn verify(&self, username: &str, password: &str) -> Result<bool>;
}

/// Accepts any username/password pair
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl CredentialVerifier for AcceptAll {
    async fn verify(&self, _username: &str, _password: &str) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accept_all() {
        assert!(AcceptAll.verify("john", "secret").await.unwrap());
        assert!(AcceptAll.verify("", "").await.unwrap());
    }
}
