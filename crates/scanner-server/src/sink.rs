//! Outbound collaborators: websocket fan-out and diagnostic reporting.

use std::sync::{Arc, RwLock};

use notification_service::{Alert, NotificationService};
use scanner_core::{DiagnosticSink, NoveltyAlert, PresentationSink, ScannerRow};
use tokio::sync::broadcast;

use crate::state::{AppState, ScannerUpdate};

/// Fans rows and novelty cues out to connected clients and remembers the
/// latest cue for polling clients.
pub struct BroadcastSink {
    updates: broadcast::Sender<ScannerUpdate>,
    latest_novelty: Arc<RwLock<Option<NoveltyAlert>>>,
}

impl BroadcastSink {
    pub fn new(state: &AppState) -> Self {
        Self {
            updates: state.updates.clone(),
            latest_novelty: state.latest_novelty.clone(),
        }
    }
}

impl PresentationSink for BroadcastSink {
    fn publish_rows(&self, rows: &[ScannerRow]) {
        // No subscribers is fine.
        let _ = self.updates.send(ScannerUpdate::Rows(rows.to_vec()));
    }

    fn publish_novelty(&self, alert: &NoveltyAlert) {
        tracing::info!(
            symbol = %alert.symbol,
            change = %alert.change_percentage,
            at = %alert.timestamp,
            "New stock with news"
        );
        if let Ok(mut latest) = self.latest_novelty.write() {
            *latest = Some(alert.clone());
        }
        let _ = self.updates.send(ScannerUpdate::Novelty(alert.clone()));
    }
}

/// Mails or posts dropped-message incidents with their raw payload.
pub struct ErrorReporter {
    notifications: NotificationService,
    enabled: bool,
}

impl ErrorReporter {
    pub fn new(notifications: NotificationService, enabled: bool) -> Self {
        Self {
            notifications,
            enabled,
        }
    }
}

impl DiagnosticSink for ErrorReporter {
    fn report(&self, error: &(dyn std::error::Error + Send + Sync), raw_payload: &str) {
        if self.enabled {
            self.notifications
                .send_alert(Alert::processing_error(error.to_string(), raw_payload));
        }
    }
}
