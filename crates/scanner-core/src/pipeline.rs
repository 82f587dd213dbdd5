//! Per-event processing: filter, novelty decision, buffer insert.

use chrono::{DateTime, TimeZone};

use crate::filter::{self, RejectReason, Verdict};
use crate::novelty::{self, NoveltyAlert};
use crate::{RecordBuffer, ScannerRow, StockEvent, ThresholdConfig, TierTables};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rejected(RejectReason),
    Accepted { novelty: Option<NoveltyAlert> },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    pub fn novelty(&self) -> Option<&NoveltyAlert> {
        match self {
            Outcome::Accepted { novelty } => novelty.as_ref(),
            Outcome::Rejected(_) => None,
        }
    }
}

/// Owns the visible rows. Every event runs to completion before the next.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    buffer: RecordBuffer<ScannerRow>,
    tiers: TierTables,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: RecordBuffer::with_capacity(capacity),
            tiers: TierTables::default(),
        }
    }

    pub fn process<Tz: TimeZone>(
        &mut self,
        event: StockEvent,
        config: Option<&ThresholdConfig>,
        captured_at: &DateTime<Tz>,
    ) -> Outcome
    where
        Tz::Offset: std::fmt::Display,
    {
        if let Verdict::Rejected(reason) = filter::evaluate(&event, config) {
            tracing::trace!(symbol = %event.symbol, ?reason, "Event filtered out");
            return Outcome::Rejected(reason);
        }

        let novelty = novelty::evaluate(&event, captured_at);
        let row = ScannerRow::annotate(event, &self.tiers, captured_at);
        tracing::debug!(
            symbol = row.symbol(),
            change = %row.change_percentage,
            novel = novelty.is_some(),
            "Event accepted"
        );
        if let Some(evicted) = self.buffer.insert(row) {
            tracing::trace!(symbol = evicted.symbol(), "Oldest row evicted");
        }

        Outcome::Accepted { novelty }
    }

    /// Newest-first snapshot of the visible rows.
    pub fn rows(&self) -> Vec<ScannerRow> {
        self.buffer.to_vec()
    }

    pub fn buffer(&self) -> &RecordBuffer<ScannerRow> {
        &self.buffer
    }
}
