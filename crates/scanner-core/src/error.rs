use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Malformed breakpoint table: {0}")]
    MalformedTable(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
