use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use scanner_core::StockEvent;

use crate::{decode_frame, Frame, StreamError};

/// Decoded journal event, or the decode failure with its raw frame.
pub type StreamItem = Result<StockEvent, StreamError>;

/// Reads the scanner websocket and hands frames to a single consumer in
/// arrival order. One connection per `run`; reconnecting is up to the caller.
pub struct JournalWebSocket {
    url: String,
    tx: mpsc::Sender<StreamItem>,
    shutdown: Arc<Notify>,
}

impl JournalWebSocket {
    pub fn new(url: impl Into<String>, buffer: usize) -> (Self, mpsc::Receiver<StreamItem>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let ws = Self {
            url: url.into(),
            tx,
            shutdown: Arc::new(Notify::new()),
        };
        (ws, rx)
    }

    /// Handle that stops a running (or not yet started) `run`.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Stream until the server closes, the consumer goes away, or shutdown.
    pub async fn run(&self) -> Result<(), StreamError> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();
        tracing::info!("Connected to scanner journal stream");

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !self.handle_message(&text).await {
                                tracing::info!("Journal consumer dropped, closing stream");
                                let _ = write.send(Message::Close(None)).await;
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!("Journal stream closed by server");
                            return Ok(());
                        }
                        Some(Err(e)) => {
                            return Err(StreamError::WebSocket(e.to_string()));
                        }
                        _ => {}
                    }
                }
                _ = self.shutdown.notified() => {
                    tracing::info!("Journal stream shutdown requested");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
            }
        }
    }

    /// Returns `false` once the receiving side is gone.
    async fn handle_message(&self, text: &str) -> bool {
        let item = match decode_frame(text) {
            Ok(Frame::Journal(event)) => Ok(event),
            Ok(Frame::Ignored(kind)) => {
                tracing::trace!(kind = %kind, "Skipping non-journal frame");
                return true;
            }
            Err(e) => Err(e),
        };
        self.tx.send(item).await.is_ok()
    }
}
