//! The single consumer of the journal stream.
//!
//! Messages are handled one at a time, start to finish. A bad message is
//! logged, reported and dropped; it never stops the loop.

use std::sync::Arc;

use journal_stream::{StreamError, StreamItem};
use notification_service::{Alert, NotificationService};
use scanner_core::{DiagnosticSink, Outcome, PresentationSink, StockEvent};
use tokio::sync::mpsc;

use crate::state::AppState;

pub struct Processor {
    state: AppState,
    sink: Arc<dyn PresentationSink>,
    diagnostics: Arc<dyn DiagnosticSink>,
    notifications: Option<NotificationService>,
}

impl Processor {
    pub fn new(
        state: AppState,
        sink: Arc<dyn PresentationSink>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            state,
            sink,
            diagnostics,
            notifications: None,
        }
    }

    /// External channel for new-stock alerts; leave unset to keep them on screen only.
    pub fn with_notifications(mut self, notifications: NotificationService) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub async fn run(self, mut rx: mpsc::Receiver<StreamItem>) {
        let mut handled: u64 = 0;
        while let Some(item) = rx.recv().await {
            self.handle(item).await;
            handled += 1;
        }
        tracing::info!(handled, "Journal stream ended, processor stopping");
    }

    pub async fn handle(&self, item: StreamItem) -> Option<Outcome> {
        match item {
            Ok(event) => Some(self.handle_event(event).await),
            Err(e) => {
                self.handle_error(&e);
                None
            }
        }
    }

    async fn handle_event(&self, event: StockEvent) -> Outcome {
        // Snapshot so a settings save mid-event cannot split one decision.
        let settings = self.state.current_settings().await;

        let (outcome, rows) = {
            let mut scanner = self.state.scanner.lock().await;
            let outcome = scanner.process(event, settings.as_ref(), &chrono::Local::now());
            let rows = outcome.is_accepted().then(|| scanner.rows());
            (outcome, rows)
        };

        if let Some(rows) = rows {
            self.sink.publish_rows(&rows);
        }

        if let Some(alert) = outcome.novelty() {
            self.sink.publish_novelty(alert);
            if let Some(notifications) = &self.notifications {
                notifications.send_alert(Alert::new_stock(
                    alert.symbol.clone(),
                    alert.change_percentage.clone(),
                    alert.timestamp.clone(),
                ));
            }
        }

        outcome
    }

    fn handle_error(&self, error: &StreamError) {
        match error.raw_payload() {
            Some(raw) => {
                tracing::warn!(error = %error, payload = %raw, "Dropping malformed journal message");
                self.diagnostics.report(error, raw);
            }
            None => tracing::warn!(error = %error, "Journal stream error"),
        }
    }
}
