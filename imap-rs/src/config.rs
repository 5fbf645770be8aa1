use crate::error::{ImapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Text of the untagged OK greeting
    pub greeting: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub maildir_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty, compact or json
    pub format: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ImapError::Config(e.to_string()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ImapError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "127.0.0.1:1143".to_string(),
                greeting: "IMAP4rev1 Service Ready".to_string(),
            },
            storage: StorageConfig {
                maildir_path: "/tmp/maildir".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_addr = "0.0.0.0:143"
            greeting = "ready"

            [storage]
            maildir_path = "/var/mail/john"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen_addr, "0.0.0.0:143");
        assert_eq!(config.server.greeting, "ready");
        assert_eq!(config.storage.maildir_path, "/var/mail/john");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[server]\nlisten_addr = 1").unwrap_err();
        assert!(matches!(err, ImapError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/imap-rs.toml").unwrap_err();
        assert!(matches!(err, ImapError::Config(_)));
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string(&Config::default()).unwrap();
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:1143");
    }
}
