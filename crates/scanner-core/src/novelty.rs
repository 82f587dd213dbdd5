//! First-alert-with-news detection.
//!
//! Stateless: the stream marks a symbol's first alert with `alert_count == 1`
//! and nothing here remembers symbols already seen. If the upstream repeats
//! a first alert, the notification fires again.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{format, StockEvent};

pub fn is_novel(event: &StockEvent) -> bool {
    event.alert_count == 1 && event.has_news()
}

/// Payload for the on-screen cue and the external notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoveltyAlert {
    pub symbol: String,
    pub change_percentage: String,
    pub timestamp: String,
}

impl NoveltyAlert {
    pub fn title(&self) -> String {
        format!("New Stock Added: {}", self.symbol)
    }

    pub fn body(&self) -> String {
        format!(
            "{} has been added with a {} change.",
            self.symbol, self.change_percentage
        )
    }
}

pub fn evaluate<Tz: TimeZone>(event: &StockEvent, captured_at: &DateTime<Tz>) -> Option<NoveltyAlert>
where
    Tz::Offset: std::fmt::Display,
{
    is_novel(event).then(|| NoveltyAlert {
        symbol: event.symbol.clone(),
        change_percentage: format::percentage(event.price_change_ratio),
        timestamp: format::timestamp(captured_at),
    })
}
