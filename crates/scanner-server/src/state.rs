use std::sync::{Arc, RwLock as SyncRwLock};

use scanner_core::{NoveltyAlert, Scanner, ScannerRow, SettingsStore, ThresholdConfig};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};

/// Pushed to websocket clients whenever the view changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ScannerUpdate {
    Rows(Vec<ScannerRow>),
    Novelty(NoveltyAlert),
}

#[derive(Clone)]
pub struct AppState {
    /// Only the stream processor mutates this; handlers take snapshots.
    pub scanner: Arc<Mutex<Scanner>>,
    /// `None` means nothing is stored and every event passes the filter.
    pub settings: Arc<RwLock<Option<ThresholdConfig>>>,
    pub store: SettingsStore,
    /// Written from the processing path without awaiting, so cues land in
    /// publish order.
    pub latest_novelty: Arc<SyncRwLock<Option<NoveltyAlert>>>,
    pub updates: broadcast::Sender<ScannerUpdate>,
}

impl AppState {
    pub fn new(scanner: Scanner, store: SettingsStore, settings: Option<ThresholdConfig>) -> Self {
        let (updates, _) = broadcast::channel(256);
        Self {
            scanner: Arc::new(Mutex::new(scanner)),
            settings: Arc::new(RwLock::new(settings)),
            store,
            latest_novelty: Arc::new(SyncRwLock::new(None)),
            updates,
        }
    }

    pub async fn rows(&self) -> Vec<ScannerRow> {
        self.scanner.lock().await.rows()
    }

    pub fn latest_novelty(&self) -> Option<NoveltyAlert> {
        self.latest_novelty.read().ok().and_then(|latest| latest.clone())
    }

    pub async fn current_settings(&self) -> Option<ThresholdConfig> {
        self.settings.read().await.clone()
    }
}
