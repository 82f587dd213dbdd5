pub mod buffer;
pub mod error;
pub mod filter;
pub mod format;
pub mod novelty;
pub mod pipeline;
pub mod row;
pub mod settings;
pub mod tiers;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use buffer::{RecordBuffer, MAX_ROWS};
pub use error::*;
pub use filter::{accept, RejectReason, Verdict};
pub use novelty::{is_novel, NoveltyAlert};
pub use pipeline::{Outcome, Scanner};
pub use row::ScannerRow;
pub use settings::SettingsStore;
pub use tiers::{Breakpoint, BreakpointTable, Tier, TierMetric, TierTables};
pub use traits::*;
pub use types::*;
