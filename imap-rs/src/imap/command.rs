//! IMAP commands and their execution
//!
//! A [`Command`] is built by the parser for exactly one request and consumed
//! by [`Command::execute`], which applies it to the connection's [`Session`].

use crate::imap::response::internal_error;
use crate::imap::{Response, Session};
use tracing::{debug, info};

/// Capability tokens advertised by CAPABILITY
pub const CAPABILITIES: &[&str] = &["IMAP4rev1"];

/// A parsed command with the tag it was sent under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub tag: String,
    pub kind: CommandKind,
}

/// IMAP command parsed from client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// NOOP - No operation (keepalive)
    Noop,

    /// CAPABILITY - List server capabilities
    Capability,

    /// LOGIN username password - Authenticate
    Login { username: String, password: String },

    /// LOGOUT - Close connection
    Logout,

    /// SELECT mailbox - Select a mailbox
    Select { mailbox: String },

    /// LIST ... - Not implemented, arguments kept for the reply
    List { arguments: Vec<String> },

    /// FETCH sequence items - Not implemented
    Fetch {
        sequence: Option<String>,
        data_item: Option<String>,
    },

    /// Anything else, with the keyword as the client sent it
    Unknown { keyword: String },
}

impl CommandKind {
    /// Upper-case keyword, for logging
    pub fn name(&self) -> &str {
        match self {
            CommandKind::Noop => "NOOP",
            CommandKind::Capability => "CAPABILITY",
            CommandKind::Login { .. } => "LOGIN",
            CommandKind::Logout => "LOGOUT",
            CommandKind::Select { .. } => "SELECT",
            CommandKind::List { .. } => "LIST",
            CommandKind::Fetch { .. } => "FETCH",
            CommandKind::Unknown { keyword } => keyword,
        }
    }
}

impl Command {
    pub fn new(tag: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            tag: tag.into(),
            kind,
        }
    }

    /// Run the command against the session
    ///
    /// Never fails: every outcome, including backend failures, is expressed
    /// as a response. Responses to backend failures request a close.
    pub async fn execute(self, session: &mut Session) -> Response {
        let Command { tag, kind } = self;
        debug!(
            "Handling IMAP command {} in state {:?}",
            kind.name(),
            session.state()
        );

        match kind {
            CommandKind::Noop => Response::ok(tag, "NOOP completed"),

            CommandKind::Capability => Response::ok(tag, "CAPABILITY completed")
                .extra(format!("CAPABILITY {}", CAPABILITIES.join(" "))),

            CommandKind::Login { username, password } => {
                handle_login(session, tag, &username, &password).await
            }

            CommandKind::Logout => {
                session.logout();
                Response::ok(tag, "LOGOUT completed")
                    .extra("BYE IMAP4rev1 Server logging out")
                    .should_close()
            }

            CommandKind::Select { mailbox } => handle_select(session, tag, &mailbox).await,

            CommandKind::List { arguments } => {
                let message = echo("LIST", &arguments);
                session.log(&message);
                Response::bad(tag, message)
            }

            CommandKind::Fetch {
                sequence,
                data_item,
            } => {
                let arguments: Vec<String> = sequence.into_iter().chain(data_item).collect();
                let message = echo("FETCH", &arguments);
                session.log(&message);
                Response::bad(tag, message)
            }

            CommandKind::Unknown { keyword } => {
                let message = format!("unknown '{}' command", keyword);
                session.log(&message);
                Response::bad(tag, message)
            }
        }
    }
}

async fn handle_login(
    session: &mut Session,
    tag: String,
    username: &str,
    password: &str,
) -> Response {
    if session.is_authenticated() {
        let message = "LOGIN already logged in";
        session.log(message);
        return Response::bad(tag, message);
    }

    info!("LOGIN attempt for user: {}", username);

    match session.verify_credentials(username, password).await {
        Ok(true) => {
            session.authenticate(username);
            Response::ok(tag, "LOGIN completed")
        }
        Ok(false) => {
            session.log(&format!("LOGIN rejected for {}", username));
            Response::no(tag, "LOGIN failure")
        }
        Err(e) => internal_error(session, tag, "LOGIN", &e),
    }
}

async fn handle_select(session: &mut Session, tag: String, mailbox: &str) -> Response {
    if !session.is_authenticated() {
        let message = "SELECT not authenticated";
        session.log(message);
        return Response::bad(tag, message);
    }

    match session.select_mailbox(mailbox).await {
        Ok(true) => {}
        Ok(false) => return Response::no(tag, "SELECT No such mailbox"),
        Err(e) => return internal_error(session, tag, "SELECT", &e),
    }

    let mut response = Response::ok(tag.clone(), "SELECT completed");
    match session.add_mailbox_info(&mut response) {
        Ok(()) => response,
        Err(e) => internal_error(session, tag, "SELECT", &e),
    }
}

/// "<NAME> <args> not implemented"; empty arguments are shown as `""`
fn echo(name: &str, arguments: &[String]) -> String {
    let mut message = name.to_string();
    for argument in arguments {
        message.push(' ');
        if argument.is_empty() {
            message.push_str("\"\"");
        } else {
            message.push_str(argument);
        }
    }
    message.push_str(" not implemented");
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImapError;
    use crate::imap::auth::{AcceptAll, MockCredentialVerifier};
    use crate::imap::response::Status;
    use crate::imap::session::{MockSessionLog, SessionState, TracingLog};
    use crate::imap::store::{MailboxInfo, MemoryStore, MockMailboxStore};
    use std::sync::Arc;

    fn session() -> Session {
        let store = MemoryStore::new().with_mailbox(MailboxInfo::empty("INBOX"));
        Session::with_store(Arc::new(store))
    }

    fn login() -> Command {
        Command::new(
            "a1",
            CommandKind::Login {
                username: "john".to_string(),
                password: "secret".to_string(),
            },
        )
    }

    fn select(mailbox: &str) -> Command {
        Command::new(
            "a2",
            CommandKind::Select {
                mailbox: mailbox.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_noop() {
        let mut session = session();
        let res = Command::new("x9", CommandKind::Noop).execute(&mut session).await;
        assert_eq!(res.to_string(), "x9 OK NOOP completed\r\n");
    }

    #[tokio::test]
    async fn test_capability_in_any_state() {
        let mut session = session();

        for _ in 0..2 {
            let res = Command::new("c1", CommandKind::Capability)
                .execute(&mut session)
                .await;
            assert_eq!(res.status(), Status::Ok);
            assert_eq!(res.extra_lines(), &["CAPABILITY IMAP4rev1".to_string()]);
            login().execute(&mut session).await;
        }
    }

    #[tokio::test]
    async fn test_login_twice() {
        let mut session = session();

        let res = login().execute(&mut session).await;
        assert_eq!(res.to_string(), "a1 OK LOGIN completed\r\n");
        assert_eq!(session.state(), SessionState::Authenticated);

        let res = login().execute(&mut session).await;
        assert_eq!(res.status(), Status::Bad);
        assert!(res.message().contains("already logged in"));
        assert!(!res.closes_connection());
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().times(1).returning(|_, _| Ok(false));

        let mut session = Session::new(
            Arc::new(MemoryStore::new()),
            Arc::new(verifier),
            Arc::new(TracingLog::new("test")),
        );

        let res = login().execute(&mut session).await;
        assert_eq!(res.to_string(), "a1 NO LOGIN failure\r\n");
        assert!(!res.closes_connection());
        assert_eq!(session.state(), SessionState::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_login_verifier_error_closes() {
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .returning(|_, _| Err(ImapError::Authentication("backend down".to_string())));

        let mut log = MockSessionLog::new();
        log.expect_log().times(1).return_const(());

        let mut session = Session::new(
            Arc::new(MemoryStore::new()),
            Arc::new(verifier),
            Arc::new(log),
        );

        let res = login().execute(&mut session).await;
        assert_eq!(res.status(), Status::No);
        assert!(res.message().starts_with("LOGIN "));
        assert!(res.closes_connection());
        assert_eq!(session.state(), SessionState::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_select_before_login() {
        let mut session = session();

        let res = select("INBOX").execute(&mut session).await;
        assert_eq!(res.to_string(), "a2 BAD SELECT not authenticated\r\n");
        assert!(!res.closes_connection());
        assert_eq!(session.state(), SessionState::NotAuthenticated);
        assert!(session.selected_mailbox().is_none());
    }

    #[tokio::test]
    async fn test_select_existing_mailbox() {
        let mut session = session();
        login().execute(&mut session).await;

        let res = select("INBOX").execute(&mut session).await;
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.message(), "SELECT completed");
        assert!(res.extra_lines().contains(&"0 EXISTS".to_string()));
        assert_eq!(session.selected_mailbox().map(|m| m.name.as_str()), Some("INBOX"));
    }

    #[tokio::test]
    async fn test_select_missing_mailbox() {
        let mut session = session();
        login().execute(&mut session).await;

        let res = select("Nope").execute(&mut session).await;
        assert_eq!(res.to_string(), "a2 NO SELECT No such mailbox\r\n");
        assert!(!res.closes_connection());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_select_store_error_is_internal_error() {
        let mut store = MockMailboxStore::new();
        store
            .expect_select()
            .returning(|_| Err(ImapError::Storage("permission denied".to_string())));

        let mut log = MockSessionLog::new();
        log.expect_log()
            .withf(|message| message.starts_with("SELECT ") && message.contains("permission denied"))
            .times(1)
            .return_const(());

        let mut session = Session::new(Arc::new(store), Arc::new(AcceptAll), Arc::new(log));
        session.authenticate("john");

        let res = select("INBOX").execute(&mut session).await;
        assert_eq!(res.status(), Status::No);
        assert!(res.closes_connection());
        assert_eq!(res.tag(), "a2");
    }

    #[tokio::test]
    async fn test_logout_from_any_state() {
        for authenticate in [false, true] {
            let mut session = session();
            if authenticate {
                login().execute(&mut session).await;
                select("INBOX").execute(&mut session).await;
            }

            let res = Command::new("a3", CommandKind::Logout)
                .execute(&mut session)
                .await;
            assert_eq!(
                res.to_string(),
                "* BYE IMAP4rev1 Server logging out\r\na3 OK LOGOUT completed\r\n"
            );
            assert!(res.closes_connection());
            assert_eq!(session.state(), SessionState::NotAuthenticated);
            assert!(session.selected_mailbox().is_none());
        }
    }

    #[tokio::test]
    async fn test_list_and_fetch_are_placeholders() {
        let mut session = session();
        login().execute(&mut session).await;

        let res = Command::new(
            "l1",
            CommandKind::List {
                arguments: vec!["".to_string(), "*".to_string()],
            },
        )
        .execute(&mut session)
        .await;
        assert_eq!(res.to_string(), "l1 BAD LIST \"\" * not implemented\r\n");

        let res = Command::new(
            "f1",
            CommandKind::Fetch {
                sequence: Some("1:*".to_string()),
                data_item: Some("FLAGS".to_string()),
            },
        )
        .execute(&mut session)
        .await;
        assert_eq!(res.to_string(), "f1 BAD FETCH 1:* FLAGS not implemented\r\n");
        assert!(!res.closes_connection());

        let res = Command::new(
            "f2",
            CommandKind::Fetch {
                sequence: None,
                data_item: None,
            },
        )
        .execute(&mut session)
        .await;
        assert_eq!(res.to_string(), "f2 BAD FETCH not implemented\r\n");
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut session = session();
        let res = Command::new(
            "u1",
            CommandKind::Unknown {
                keyword: "STATUS".to_string(),
            },
        )
        .execute(&mut session)
        .await;

        assert_eq!(res.status(), Status::Bad);
        assert!(res.message().contains("STATUS"));
        assert!(!res.closes_connection());
    }
}
