use crate::{NoveltyAlert, ScannerRow};

/// Receives the visible rows and novelty cues. Implementations must not block
/// the processing loop.
pub trait PresentationSink: Send + Sync {
    fn publish_rows(&self, rows: &[ScannerRow]);
    fn publish_novelty(&self, alert: &NoveltyAlert);
}

/// Where dropped-message incidents go for later inspection. Delivery is
/// best-effort; failures stay inside the sink.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &(dyn std::error::Error + Send + Sync), raw_payload: &str);
}
