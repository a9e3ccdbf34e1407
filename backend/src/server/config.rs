//! Startup options and resolved server configuration.
//!
//! Backend selection is explicit: the resolved [`ServerConfig`] names one
//! user backend, one medication backend, and one notification channel, and
//! the wiring in `crate::server` constructs exactly those adapters.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::Key;
use clap::{Parser, ValueEnum};
use tracing::warn;

/// Command-line options for the backend binary.
#[derive(Debug, Parser)]
#[command(name = "medtrack-backend", about = "Medication reminder backend")]
pub struct ServerOptions {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// PostgreSQL URL for registered accounts; falls back to the
    /// DATABASE_URL environment variable, then to in-memory accounts.
    #[arg(long)]
    pub database_url: Option<String>,

    /// JSON file holding the medication lists; in-memory when absent.
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Notification channel for due-dose reminders.
    #[arg(long, value_enum, default_value = "log")]
    pub notifier: NotifierChannel,

    /// Endpoint for the webhook notifier channel.
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Allow the session cookie over plain HTTP (development only).
    #[arg(long)]
    pub cookie_insecure: bool,
}

/// Available notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierChannel {
    /// No channel; reminders are never arranged.
    Off,
    /// Structured log lines through `tracing`.
    Log,
    /// JSON POSTs to a configured endpoint.
    Webhook,
}

/// User account backend, selected at startup.
#[derive(Debug, Clone)]
pub enum UserBackend {
    /// Diesel over the given PostgreSQL URL.
    Postgres(String),
    /// Process-lifetime in-memory accounts.
    Memory,
}

/// Medication storage backend, selected at startup.
#[derive(Debug, Clone)]
pub enum MedicationBackend {
    /// JSON document at the given path.
    File(PathBuf),
    /// Process-lifetime in-memory lists.
    Memory,
}

/// Notification backend, selected at startup.
#[derive(Debug, Clone)]
pub enum NotifierBackend {
    /// No channel.
    Off,
    /// Structured log lines.
    Log,
    /// Webhook POSTs to the given endpoint.
    Webhook(String),
}

/// Fully resolved server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind: SocketAddr,
    pub(crate) users: UserBackend,
    pub(crate) medications: MedicationBackend,
    pub(crate) notifier: NotifierBackend,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("key", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("bind", &self.bind)
            .field("users", &self.users)
            .field("medications", &self.medications)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl ServerConfig {
    /// Resolve options and environment into a configuration.
    pub fn from_options(options: ServerOptions) -> io::Result<Self> {
        let database_url = options
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok());

        let notifier = match options.notifier {
            NotifierChannel::Off => NotifierBackend::Off,
            NotifierChannel::Log => NotifierBackend::Log,
            NotifierChannel::Webhook => {
                let endpoint = options.webhook_url.ok_or_else(|| {
                    io::Error::other("--webhook-url is required with --notifier webhook")
                })?;
                NotifierBackend::Webhook(endpoint)
            }
        };

        Ok(Self {
            key: load_session_key()?,
            cookie_secure: !options.cookie_insecure,
            bind: options.bind,
            users: database_url.map_or(UserBackend::Memory, UserBackend::Postgres),
            medications: options
                .data_file
                .map_or(MedicationBackend::Memory, MedicationBackend::File),
            notifier,
        })
    }

    /// Address the server will bind to.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind
    }
}

/// Load session key material from `SESSION_KEY_FILE`.
///
/// Debug builds (or `SESSION_ALLOW_EPHEMERAL=1`) fall back to a generated
/// key so local sessions work without provisioning; release builds refuse
/// to start without key material, since an ephemeral key invalidates every
/// session on restart.
fn load_session_key() -> io::Result<Key> {
    let key_path = std::env::var("SESSION_KEY_FILE")
        .unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = std::env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}
