//! Query surface of the tariff dashboard.
//!
//! Combines the cached dataset, the tariff aggregator and the time-series
//! summarizer into one per-code result, and renders it for the terminal.

pub mod dashboard;
pub mod facade;
pub mod report;
pub mod table;

pub use dashboard::Dashboard;
pub use facade::{
    DestinationLine, DestinationSummary, HierarchySummary, Lookup, OriginLine, OriginSummary,
    QueryFacade, QueryResult,
};
pub use report::format_query;
pub use table::{format_money, format_percent, SummaryTable};
