//! Bucketed color tiers for volume, market cap and shares float.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ScannerError;

/// Visual severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Light,
    Medium,
    Dark,
    Darkest,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Light => "light",
            Tier::Medium => "medium",
            Tier::Dark => "dark",
            Tier::Darkest => "darkest",
        }
    }

    /// Background class used by the web front end.
    pub fn css_class(&self) -> &'static str {
        match self {
            Tier::Light => "bg-green-300",
            Tier::Medium => "bg-green-500",
            Tier::Dark => "bg-green-700",
            Tier::Darkest => "bg-green-900",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Exclusive upper bound of this bucket.
    pub ceiling: f64,
    pub tier: Tier,
}

impl Breakpoint {
    pub const fn new(ceiling: f64, tier: Tier) -> Self {
        Self { ceiling, tier }
    }
}

/// Breakpoints ordered by ceiling; the last one is the `+inf` catch-all.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    pub(crate) breakpoints: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new(breakpoints: Vec<Breakpoint>) -> Result<Self, ScannerError> {
        let table = Self { breakpoints };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ScannerError> {
        let last = self
            .breakpoints
            .last()
            .ok_or_else(|| ScannerError::MalformedTable("table is empty".into()))?;

        if let Some(pair) = self
            .breakpoints
            .windows(2)
            .find(|pair| pair[0].ceiling.partial_cmp(&pair[1].ceiling) != Some(Ordering::Less))
        {
            return Err(ScannerError::MalformedTable(format!(
                "ceilings not strictly increasing at {} -> {}",
                pair[0].ceiling, pair[1].ceiling
            )));
        }

        if last.ceiling != f64::INFINITY {
            return Err(ScannerError::MalformedTable(format!(
                "last ceiling is {} instead of +inf",
                last.ceiling
            )));
        }

        Ok(())
    }

    /// Index of the first breakpoint whose ceiling is strictly above `value`.
    /// Doubles as the severity ordering of the table.
    pub fn position(&self, value: f64) -> Option<usize> {
        self.breakpoints.iter().position(|b| value < b.ceiling)
    }

    /// `None` only for a table without a catch-all.
    pub fn classify(&self, value: f64) -> Option<Tier> {
        self.position(value).map(|i| self.breakpoints[i].tier)
    }
}

/// Metrics that get a color tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMetric {
    Volume,
    MarketCap,
    SharesFloat,
}

impl TierMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierMetric::Volume => "volume",
            TierMetric::MarketCap => "market_cap",
            TierMetric::SharesFloat => "shares_float",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierTables {
    pub volume: BreakpointTable,
    pub market_cap: BreakpointTable,
    pub shares_float: BreakpointTable,
}

impl TierTables {
    pub fn table(&self, metric: TierMetric) -> &BreakpointTable {
        match metric {
            TierMetric::Volume => &self.volume,
            TierMetric::MarketCap => &self.market_cap,
            TierMetric::SharesFloat => &self.shares_float,
        }
    }

    pub fn classify(&self, value: f64, metric: TierMetric) -> Option<Tier> {
        self.table(metric).classify(value)
    }
}

impl Default for TierTables {
    // Small caps and tight floats are the interesting end, so those two
    // scales run dark to light while volume runs light to dark.
    fn default() -> Self {
        use Tier::*;
        Self {
            volume: BreakpointTable {
                breakpoints: vec![
                    Breakpoint::new(100_000.0, Light),
                    Breakpoint::new(250_000.0, Medium),
                    Breakpoint::new(500_000.0, Dark),
                    Breakpoint::new(f64::INFINITY, Darkest),
                ],
            },
            market_cap: BreakpointTable {
                breakpoints: vec![
                    Breakpoint::new(100_000_000.0, Darkest),
                    Breakpoint::new(200_000_000.0, Dark),
                    Breakpoint::new(1_000_000_000.0, Medium),
                    Breakpoint::new(f64::INFINITY, Light),
                ],
            },
            shares_float: BreakpointTable {
                breakpoints: vec![
                    Breakpoint::new(10_000_000.0, Darkest),
                    Breakpoint::new(50_000_000.0, Dark),
                    Breakpoint::new(100_000_000.0, Medium),
                    Breakpoint::new(f64::INFINITY, Light),
                ],
            },
        }
    }
}
