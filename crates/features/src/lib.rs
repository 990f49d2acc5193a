//! Tariff and time-series computations for the tariff dashboard.
//!
//! This crate handles:
//! - Per-line total tariffs (sector rate excluded) and regime averages
//! - Count-based trailing windows
//! - Market shares and effective-tariff summaries per code

pub mod aggregator;
pub mod summarizer;
pub mod window;

pub use aggregator::{aggregate, average_rate, LineTotals, TotalRate};
pub use summarizer::{
    market_share, EntitySummary, ShareObservation, Stat, SummaryResult, TariffObservation,
    TimeSeriesSummarizer,
};
pub use window::TrailingMean;
