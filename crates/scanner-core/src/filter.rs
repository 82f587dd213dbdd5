//! Threshold filtering of incoming events.
//!
//! A value sitting exactly on a cutoff never passes, whichever direction the
//! user picked: `above` fails on `<=`, `below` fails on `>=`.

use serde::Serialize;

use crate::{Direction, Metric, MetricThreshold, StockEvent, ThresholdConfig};

/// Why an event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "metric", rename_all = "snake_case")]
pub enum RejectReason {
    /// Only rising stocks are scanned.
    NonPositiveChange,
    /// First metric, in [`Metric::ALL`] order, that missed its cutoff.
    Threshold(Metric),
    MissingNews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// True when `value` does not meet the threshold.
pub fn fails_threshold(value: f64, threshold: &MetricThreshold) -> bool {
    match threshold.direction {
        Direction::Above => value <= threshold.cutoff,
        Direction::Below => value >= threshold.cutoff,
    }
}

/// Full filter decision for one event.
///
/// Events must carry a positive `price_change_ratio`; anything else is
/// rejected before any threshold is looked at, even with no stored config.
/// A missing config accepts every event that passes that guard.
pub fn evaluate(event: &StockEvent, config: Option<&ThresholdConfig>) -> Verdict {
    let ratio = event.price_change_ratio;
    if ratio.is_nan() || ratio <= 0.0 {
        return Verdict::Rejected(RejectReason::NonPositiveChange);
    }

    let Some(config) = config else {
        return Verdict::Accepted;
    };

    if let Some(metric) = Metric::ALL
        .into_iter()
        .find(|m| fails_threshold(event.metric(*m), config.threshold(*m)))
    {
        return Verdict::Rejected(RejectReason::Threshold(metric));
    }

    if config.require_news && !event.has_news() {
        return Verdict::Rejected(RejectReason::MissingNews);
    }

    Verdict::Accepted
}

/// Accept/reject against a concrete config.
pub fn accept(event: &StockEvent, config: &ThresholdConfig) -> bool {
    evaluate(event, Some(config)).is_accepted()
}
