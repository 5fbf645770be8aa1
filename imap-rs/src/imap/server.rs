//! IMAP server implementation
//!
//! Handles TCP connections and drives one session per connection

use crate::config::Config;
use crate::error::Result;
use crate::imap::{CredentialVerifier, MailboxStore, Parser, Session, SessionLog, TracingLog};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// IMAP server
pub struct ImapServer {
    config: Arc<Config>,
    store: Arc<dyn MailboxStore>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl ImapServer {
    /// Create a new IMAP server
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn MailboxStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            config,
            store,
            verifier,
        }
    }

    /// Start the IMAP server
    pub async fn start(&self) -> Result<()> {
        let addr = &self.config.server.listen_addr;
        let listener = TcpListener::bind(addr).await?;

        info!("IMAP server listening on {}", addr);

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("New IMAP connection from {}", peer_addr);

                    let log: Arc<dyn SessionLog> =
                        Arc::new(TracingLog::new(peer_addr.to_string()));
                    let session =
                        Session::new(Arc::clone(&self.store), Arc::clone(&self.verifier), log);
                    let greeting = self.config.server.greeting.clone();

                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, &greeting, session).await {
                            error!("Error handling IMAP connection from {}: {}", peer_addr, e);
                        }
                        info!("IMAP connection from {} closed", peer_addr);
                    });
                }
                Err(e) => {
                    error!("Failed to accept IMAP connection: {}", e);
                }
            }
        }
    }
}

/// Run one session over a connected stream until it ends
///
/// Stops after a response that requests a close, when the client closes its
/// side between commands, or after answering a lexer/parser error with an
/// untagged BAD. I/O errors are returned.
pub async fn serve_connection<S>(stream: S, greeting: &str, mut session: Session) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut parser = Parser::new(BufReader::new(reader));

    writer
        .write_all(format!("* OK {}\r\n", greeting).as_bytes())
        .await?;

    loop {
        match parser.next().await {
            Ok(Some(command)) => {
                let response = command.execute(&mut session).await;
                let wire = response.to_string();
                debug!("Sending: {}", wire.trim_end());
                writer.write_all(wire.as_bytes()).await?;

                if response.closes_connection() {
                    break;
                }
            }
            Ok(None) => {
                info!("Connection closed by client");
                break;
            }
            Err(e) if e.is_framing() => {
                warn!("Failed to parse command: {}", e);
                writer
                    .write_all(format!("* BAD {}\r\n", e).as_bytes())
                    .await?;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    writer.flush().await?;
    Ok(())
}
