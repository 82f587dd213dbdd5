//! Display formatting shared by rows and alerts.

use chrono::{DateTime, TimeZone};

const NEWS_BASE_URL: &str = "https://www.stocktitan.net/news";

/// `1234567` -> `"1,234,567"`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fraction to percent with two decimals: `0.1234` -> `"12.34%"`.
pub fn percentage(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// 24-hour time followed by day/month/year, e.g. `"14:05:09 19/10/2026"`.
pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S %d/%m/%Y").to_string()
}

pub fn news_redirect_url(symbol: &str, internal_url: &str) -> String {
    format!("{}/{}/{}.html", NEWS_BASE_URL, symbol, internal_url)
}
