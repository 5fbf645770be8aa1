use anyhow::Context;
use clap::Parser;
use imap_rs::config::{Config, LoggingConfig};
use imap_rs::imap::{AcceptAll, ImapServer, MaildirStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "imap-rs", about = "IMAP4rev1 server", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listen address, overrides the configuration file
    #[arg(short, long)]
    listen: Option<String>,
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::from_file(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        Config::default()
    };
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    init_logging(&config.logging);

    info!("Starting imap-rs server");
    info!("  IMAP listening on: {}", config.server.listen_addr);
    info!("  Maildir path: {}", config.storage.maildir_path);

    let store = Arc::new(MaildirStore::new(config.storage.maildir_path.clone()));
    let server = ImapServer::new(Arc::new(config), store, Arc::new(AcceptAll));

    server.start().await?;

    Ok(())
}
