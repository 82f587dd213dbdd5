//! Scanner journal stream: envelope decoding and the websocket reader.

mod websocket;

pub use websocket::{JournalWebSocket, StreamItem};

use scanner_core::StockEvent;
use serde::Deserialize;
use thiserror::Error;

/// Header type of frames that carry a stock event.
pub const JOURNAL_TYPE: &str = "journal";

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Malformed frame: {reason}")]
    Malformed { reason: String, raw: String },

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl StreamError {
    /// Frame text that failed to decode, if this is a decode error.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            StreamError::Malformed { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Journal(StockEvent),
    /// Any other header type; carries the type for logging.
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    header: Header,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "type")]
    kind: String,
}

/// Decode one text frame. Only journal payloads are parsed into events.
pub fn decode_frame(text: &str) -> Result<Frame, StreamError> {
    let malformed = |reason: String| StreamError::Malformed {
        reason,
        raw: text.to_string(),
    };

    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| malformed(format!("envelope: {}", e)))?;

    if envelope.header.kind != JOURNAL_TYPE {
        return Ok(Frame::Ignored(envelope.header.kind));
    }

    let event = serde_json::from_value(envelope.payload)
        .map_err(|e| malformed(format!("journal payload: {}", e)))?;
    Ok(Frame::Journal(event))
}
