use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single scanner event as delivered by the journal stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvent {
    pub symbol: String,
    pub price: f64,
    /// Fractional change since the reference price (0.05 == +5%).
    pub price_change_ratio: f64,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    pub volume: u64,
    pub market_cap: u64,
    pub shares_float: u64,
    pub alert_count: u32,
    /// Path fragment of the news page; only used to build links.
    pub internal_url: String,
}

impl StockEvent {
    pub fn has_news(&self) -> bool {
        !self.news.is_empty()
    }

    /// Value of a filtered metric, widened to `f64` for cutoff comparison.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Price => self.price,
            Metric::Volume => self.volume as f64,
            Metric::MarketCap => self.market_cap as f64,
            Metric::SharesFloat => self.shares_float as f64,
            Metric::AlertCount => self.alert_count as f64,
        }
    }
}

/// News entry attached to an event. Only the title is interpreted; the rest
/// is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metrics the filter compares against user cutoffs, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Price,
    Volume,
    MarketCap,
    SharesFloat,
    AlertCount,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Price,
        Metric::Volume,
        Metric::MarketCap,
        Metric::SharesFloat,
        Metric::AlertCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Price => "price",
            Metric::Volume => "volume",
            Metric::MarketCap => "market_cap",
            Metric::SharesFloat => "shares_float",
            Metric::AlertCount => "alert_count",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the cutoff a value has to land on to pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricThreshold {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub cutoff: f64,
}

impl MetricThreshold {
    pub fn above(cutoff: f64) -> Self {
        Self {
            direction: Direction::Above,
            cutoff,
        }
    }

    pub fn below(cutoff: f64) -> Self {
        Self {
            direction: Direction::Below,
            cutoff,
        }
    }
}

/// Market bias the user tagged their settings with. Stored, never filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bull,
    Bear,
}

/// User filter settings. Every field falls back to its default when missing
/// from stored JSON, so older settings files keep loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub price: MetricThreshold,
    pub volume: MetricThreshold,
    pub market_cap: MetricThreshold,
    pub shares_float: MetricThreshold,
    pub alert_count: MetricThreshold,
    pub require_news: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl ThresholdConfig {
    pub fn threshold(&self, metric: Metric) -> &MetricThreshold {
        match metric {
            Metric::Price => &self.price,
            Metric::Volume => &self.volume,
            Metric::MarketCap => &self.market_cap,
            Metric::SharesFloat => &self.shares_float,
            Metric::AlertCount => &self.alert_count,
        }
    }

    pub fn threshold_mut(&mut self, metric: Metric) -> &mut MetricThreshold {
        match metric {
            Metric::Price => &mut self.price,
            Metric::Volume => &mut self.volume,
            Metric::MarketCap => &mut self.market_cap,
            Metric::SharesFloat => &mut self.shares_float,
            Metric::AlertCount => &mut self.alert_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_wire_fields() {
        let raw = r#"{
            "symbol": "ABCD",
            "price": 3.21,
            "price_change_ratio": 0.1532,
            "news": [{"title": "ABCD announces merger", "id": 991}],
            "volume": 1250000,
            "market_cap": 85000000,
            "shares_float": 4200000,
            "alert_count": 1,
            "internal_url": "abcd-announces-merger"
        }"#;

        let event: StockEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.symbol, "ABCD");
        assert_eq!(event.volume, 1_250_000);
        assert!(event.has_news());
        assert_eq!(event.news[0].title.as_deref(), Some("ABCD announces merger"));
        assert_eq!(event.news[0].extra.get("id"), Some(&Value::from(991)));
        assert_eq!(event.metric(Metric::MarketCap), 85_000_000.0);
    }

    #[test]
    fn test_event_without_news_field_has_empty_news() {
        let raw = r#"{"symbol":"X","price":1.0,"price_change_ratio":0.01,
            "volume":1,"market_cap":1,"shares_float":1,"alert_count":2,"internal_url":""}"#;
        let event: StockEvent = serde_json::from_str(raw).unwrap();
        assert!(!event.has_news());
    }

    #[test]
    fn test_event_rejects_negative_volume() {
        let raw = r#"{"symbol":"X","price":1.0,"price_change_ratio":0.01,"news":[],
            "volume":-5,"market_cap":1,"shares_float":1,"alert_count":2,"internal_url":""}"#;
        assert!(serde_json::from_str::<StockEvent>(raw).is_err());
    }

    #[test]
    fn test_default_config_is_above_zero_everywhere() {
        let config = ThresholdConfig::default();
        for metric in Metric::ALL {
            assert_eq!(*config.threshold(metric), MetricThreshold::above(0.0));
        }
        assert!(!config.require_news);
        assert!(config.sentiment.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ThresholdConfig = serde_json::from_str(
            r#"{"volume": {"direction": "below", "cutoff": 500000}, "require_news": true}"#,
        )
        .unwrap();
        assert_eq!(config.volume, MetricThreshold::below(500_000.0));
        assert_eq!(config.price, MetricThreshold::default());
        assert!(config.require_news);
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let result = serde_json::from_str::<ThresholdConfig>(
            r#"{"price": {"direction": "sideways", "cutoff": 1}}"#,
        );
        assert!(result.is_err());
    }
}
