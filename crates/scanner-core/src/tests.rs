#[cfg(test)]
mod pipeline_tests {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::{
        Metric, MetricThreshold, NewsItem, Outcome, RejectReason, Scanner, StockEvent,
        ThresholdConfig, Tier, MAX_ROWS,
    };

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 15, 14, 32, 7).unwrap()
    }

    fn event(symbol: &str) -> StockEvent {
        StockEvent {
            symbol: symbol.to_string(),
            price: 3.15,
            price_change_ratio: 0.18,
            news: vec![],
            volume: 300_000,
            market_cap: 60_000_000,
            shares_float: 8_000_000,
            alert_count: 2,
            internal_url: format!("{}-update", symbol.to_lowercase()),
        }
    }

    fn with_news(mut e: StockEvent) -> StockEvent {
        e.news.push(NewsItem {
            title: Some("Company announces pivotal trial results".to_string()),
            ..Default::default()
        });
        e
    }

    #[test]
    fn test_eleven_accepted_events_keep_two_through_eleven() {
        let mut scanner = Scanner::new();
        for i in 1..=11 {
            let outcome = scanner.process(event(&format!("S{i}")), None, &at());
            assert!(outcome.is_accepted());
        }

        let symbols: Vec<String> = scanner.rows().iter().map(|r| r.symbol().to_string()).collect();
        let expected: Vec<String> = (2..=11).rev().map(|i| format!("S{i}")).collect();
        assert_eq!(symbols, expected);
        assert_eq!(scanner.buffer().len(), MAX_ROWS);
    }

    #[test]
    fn test_rejected_events_leave_rows_untouched() {
        let mut scanner = Scanner::new();
        scanner.process(event("KEEP"), None, &at());

        let config = ThresholdConfig {
            volume: MetricThreshold::above(1_000_000.0),
            ..Default::default()
        };
        let mut busy = event("BUSY");
        busy.volume = 1_000_000;
        assert_eq!(
            scanner.process(busy, Some(&config), &at()),
            Outcome::Rejected(RejectReason::Threshold(Metric::Volume))
        );

        let mut falling = event("FALL");
        falling.price_change_ratio = -0.04;
        assert_eq!(
            scanner.process(falling, None, &at()),
            Outcome::Rejected(RejectReason::NonPositiveChange)
        );

        let rows = scanner.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol(), "KEEP");
    }

    #[test]
    fn test_first_alert_with_news_raises_novelty_and_inserts_row() {
        let mut scanner = Scanner::new();
        let mut first = with_news(event("NEWS"));
        first.alert_count = 1;

        let outcome = scanner.process(first.clone(), Some(&ThresholdConfig::default()), &at());
        let alert = outcome.novelty().expect("novelty expected");
        assert_eq!(alert.symbol, "NEWS");
        assert_eq!(alert.change_percentage, "18.00%");
        assert_eq!(alert.timestamp, "14:32:07 15/11/2024");

        let mut repeat = first;
        repeat.alert_count = 2;
        let outcome = scanner.process(repeat, Some(&ThresholdConfig::default()), &at());
        assert!(outcome.is_accepted());
        assert!(outcome.novelty().is_none());

        assert_eq!(scanner.rows().len(), 2);
    }

    #[test]
    fn test_novelty_fires_again_on_repeated_first_alert() {
        let mut scanner = Scanner::new();
        let mut e = with_news(event("DUPE"));
        e.alert_count = 1;
        assert!(scanner.process(e.clone(), None, &at()).novelty().is_some());
        assert!(scanner.process(e, None, &at()).novelty().is_some());
        assert_eq!(scanner.rows().len(), 2);
    }

    #[test]
    fn test_require_news_filters_before_novelty() {
        let mut scanner = Scanner::new();
        let config = ThresholdConfig {
            require_news: true,
            ..Default::default()
        };
        let mut e = event("QUIET");
        e.alert_count = 1;
        assert_eq!(
            scanner.process(e, Some(&config), &at()),
            Outcome::Rejected(RejectReason::MissingNews)
        );
        assert!(scanner.rows().is_empty());
    }

    #[test]
    fn test_rows_carry_presentation_annotations() {
        let mut scanner = Scanner::new();
        scanner.process(with_news(event("TIER")), None, &at());
        let row = &scanner.rows()[0];
        assert_eq!(row.volume_tier, Some(Tier::Dark));
        assert_eq!(row.market_cap_tier, Some(Tier::Darkest));
        assert_eq!(row.shares_float_tier, Some(Tier::Darkest));
        assert_eq!(row.volume, "300,000");
        assert_eq!(
            row.news_url.as_deref(),
            Some("https://www.stocktitan.net/news/TIER/tier-update.html")
        );
        assert_eq!(row.captured_at, "14:32:07 15/11/2024");
    }

    #[test]
    fn test_custom_capacity() {
        let mut scanner = Scanner::with_capacity(3);
        for i in 0..5 {
            scanner.process(event(&format!("C{i}")), None, &at());
        }
        let symbols: Vec<_> = scanner.rows().into_iter().map(|r| r.event.symbol).collect();
        assert_eq!(symbols, vec!["C4", "C3", "C2"]);
    }
}
