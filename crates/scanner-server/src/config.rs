use anyhow::{bail, Context, Result};
use scanner_core::{SettingsStore, MAX_ROWS};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Full websocket URL of the journal stream, token included.
    pub ws_url: String,
    pub bind_addr: SocketAddr,
    pub settings_path: PathBuf,
    pub max_rows: usize,
    /// Whether new-stock alerts may go out to external channels.
    pub notify_new_stocks: bool,
    /// Whether dropped messages are reported with their raw payload.
    pub report_errors: bool,
    pub stream_buffer: usize,
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ws_url = var("SCANNER_WS_URL").context("SCANNER_WS_URL must be set")?;
        if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
            bail!("SCANNER_WS_URL must start with ws:// or wss://");
        }

        let config = Self {
            ws_url,
            bind_addr: var("SCANNER_BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3030".to_string())
                .parse()
                .context("SCANNER_BIND_ADDR is not a socket address")?,
            settings_path: var("SCANNER_SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(SettingsStore::default_path),
            max_rows: var("SCANNER_MAX_ROWS")
                .map(|v| v.parse())
                .transpose()
                .context("SCANNER_MAX_ROWS must be a positive integer")?
                .unwrap_or(MAX_ROWS),
            notify_new_stocks: parse_bool(var("SCANNER_NOTIFY_NEW_STOCKS"), true)
                .context("SCANNER_NOTIFY_NEW_STOCKS must be true or false")?,
            report_errors: parse_bool(var("SCANNER_REPORT_ERRORS"), true)
                .context("SCANNER_REPORT_ERRORS must be true or false")?,
            stream_buffer: var("SCANNER_STREAM_BUFFER")
                .map(|v| v.parse())
                .transpose()
                .context("SCANNER_STREAM_BUFFER must be a positive integer")?
                .unwrap_or(256),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            bail!("SCANNER_MAX_ROWS must be at least 1");
        }
        if self.stream_buffer == 0 {
            bail!("SCANNER_STREAM_BUFFER must be at least 1");
        }
        Ok(())
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => bail!("unrecognized boolean {:?}", other),
        },
    }
}
