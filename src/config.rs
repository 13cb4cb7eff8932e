//! Runtime configuration: data location, bind address, and advisor endpoint.
//!
//! Every setting has a default and an `ADHERA_*` environment override,
//! so the binary runs with no configuration at all.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Adhera";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Single-user deployment: all records belong to this owner.
pub const DEFAULT_USER_ID: &str = "local";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8420";
const DEFAULT_ADVISOR_URL: &str = "http://localhost:11434";
const DEFAULT_ADVISOR_MODEL: &str = "llama3.2";
const DEFAULT_ADVISOR_TIMEOUT_SECS: u64 = 120;

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "adhera=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },
    #[error("cannot determine a data directory; set ADHERA_DATA_DIR")]
    NoDataDir,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub advisor_url: String,
    pub advisor_model: String,
    pub advisor_timeout_secs: u64,
    /// Seed demo medications and logs at startup when the database is empty.
    pub seed_demo: bool,
}

impl Config {
    /// Resolve configuration from the environment.
    ///
    /// `ADHERA_DATA_DIR`, `ADHERA_BIND`, `ADHERA_ADVISOR_URL`,
    /// `ADHERA_ADVISOR_MODEL`, `ADHERA_ADVISOR_TIMEOUT_SECS`, and
    /// `ADHERA_SEED_DEMO` override the defaults. An unparsable timeout
    /// falls back to the default; an unparsable bind address is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = match std::env::var("ADHERA_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_data_dir().ok_or(ConfigError::NoDataDir)?,
        };
        let bind_addr = match std::env::var("ADHERA_BIND") {
            Ok(value) => parse_bind_addr(&value)?,
            Err(_) => parse_bind_addr(DEFAULT_BIND_ADDR)?,
        };
        let advisor_url =
            std::env::var("ADHERA_ADVISOR_URL").unwrap_or_else(|_| DEFAULT_ADVISOR_URL.to_string());
        let advisor_model = std::env::var("ADHERA_ADVISOR_MODEL")
            .unwrap_or_else(|_| DEFAULT_ADVISOR_MODEL.to_string());
        let advisor_timeout_secs = std::env::var("ADHERA_ADVISOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ADVISOR_TIMEOUT_SECS);
        let seed_demo = std::env::var("ADHERA_SEED_DEMO")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            bind_addr,
            advisor_url,
            advisor_model,
            advisor_timeout_secs,
            seed_demo,
        })
    }

    /// Path of the SQLite database inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("adhera.db")
    }
}

/// Platform data directory, e.g. `~/.local/share/adhera` on Linux.
fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("adhera"))
}

fn parse_bind_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
