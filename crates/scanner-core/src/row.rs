use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{format, StockEvent, Tier, TierMetric, TierTables};

/// An accepted event with everything the front end needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerRow {
    pub event: StockEvent,
    pub change_percentage: String,
    pub has_news: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_url: Option<String>,
    pub volume: String,
    pub market_cap: String,
    pub shares_float: String,
    pub volume_tier: Option<Tier>,
    pub market_cap_tier: Option<Tier>,
    pub shares_float_tier: Option<Tier>,
    /// Cell background classes keyed by metric; untiered cells are absent.
    pub cell_classes: BTreeMap<String, String>,
    pub captured_at: String,
}

impl ScannerRow {
    pub fn annotate<Tz: TimeZone>(
        event: StockEvent,
        tiers: &TierTables,
        captured_at: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let tier = |value: u64, metric: TierMetric| {
            let tier = tiers.classify(value as f64, metric);
            if tier.is_none() {
                // Styling is skipped for this cell; the row itself is kept.
                tracing::warn!(
                    symbol = %event.symbol,
                    metric = metric.as_str(),
                    value,
                    "No color tier matched, breakpoint table has no catch-all"
                );
            }
            tier
        };

        let volume_tier = tier(event.volume, TierMetric::Volume);
        let market_cap_tier = tier(event.market_cap, TierMetric::MarketCap);
        let shares_float_tier = tier(event.shares_float, TierMetric::SharesFloat);

        let cell_classes = [
            (TierMetric::Volume, volume_tier),
            (TierMetric::MarketCap, market_cap_tier),
            (TierMetric::SharesFloat, shares_float_tier),
        ]
        .into_iter()
        .filter_map(|(metric, tier)| {
            tier.map(|t| (metric.as_str().to_string(), t.css_class().to_string()))
        })
        .collect();

        let has_news = event.has_news();
        let news_url =
            has_news.then(|| format::news_redirect_url(&event.symbol, &event.internal_url));

        Self {
            change_percentage: format::percentage(event.price_change_ratio),
            has_news,
            news_url,
            volume: format::thousands(event.volume),
            market_cap: format::thousands(event.market_cap),
            shares_float: format::thousands(event.shares_float),
            volume_tier,
            market_cap_tier,
            shares_float_tier,
            cell_classes,
            captured_at: format::timestamp(captured_at),
            event,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.event.symbol
    }
}
