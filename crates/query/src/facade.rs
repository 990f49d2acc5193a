//! Per-code lookups over a loaded dataset.
//!
//! A query runs three independent lookups: the origin schedule, the
//! destination schedule and the time-series history. Any of them may come
//! back [`Lookup::NotFound`] without affecting the others. Queries never
//! fail; only loading the dataset can.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tariff_core::config::SummaryConfig;
use tariff_core::{Dataset, DestinationRow, Hierarchy, OriginRow, Rate, TariffComponents, NOT_AVAILABLE};
use tariff_features::{aggregate, SummaryResult, TimeSeriesSummarizer, TotalRate};
use tracing::debug;

/// Outcome of one lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// The found value, if any.
    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

/// Chapter, heading and subheading descriptions of a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySummary {
    pub chapter: String,
    pub heading: String,
    pub subheading: String,
}

impl HierarchySummary {
    /// Taken from one row; missing or blank descriptions read as `N/A`.
    pub fn from_hierarchy(hierarchy: &Hierarchy) -> Self {
        Self {
            chapter: describe(hierarchy.hs2.as_deref()),
            heading: describe(hierarchy.hs4.as_deref()),
            subheading: describe(hierarchy.hs6.as_deref()),
        }
    }
}

fn describe(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// One origin tariff line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginLine {
    pub hs8: Option<String>,
    pub description: Option<String>,
    /// Rate text as it appears in the schedule.
    pub rate_text: Option<String>,
    pub total: Rate,
}

/// Origin schedule for one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginSummary {
    pub code: String,
    pub hierarchy: HierarchySummary,
    pub lines: Vec<OriginLine>,
    /// Mean of the line totals; `None` when no line has a rate.
    pub average: Option<f64>,
}

/// One destination tariff line with its rate components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationLine {
    pub hs8: Option<String>,
    pub description: Option<String>,
    pub components: TariffComponents,
    /// Sum of the additive components; the sector rate is not included.
    pub total: Rate,
}

/// Destination schedule for one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSummary {
    pub code: String,
    pub hierarchy: HierarchySummary,
    pub lines: Vec<DestinationLine>,
    pub average: Option<f64>,
}

/// Everything known about one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub code: String,
    pub origin: Lookup<OriginSummary>,
    pub destination: Lookup<DestinationSummary>,
    pub history: Lookup<SummaryResult>,
}

/// Read-only query surface over a dataset snapshot.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    dataset: Arc<Dataset>,
    summarizer: TimeSeriesSummarizer,
}

impl QueryFacade {
    pub fn new(dataset: Arc<Dataset>, config: &SummaryConfig) -> Self {
        Self {
            dataset,
            summarizer: TimeSeriesSummarizer::new(config),
        }
    }

    /// Run all three lookups for a code.
    ///
    /// The code is trimmed and otherwise used as given; a malformed code is
    /// simply not found.
    pub fn query(&self, code: &str) -> QueryResult {
        let code = code.trim();
        if code.is_empty() {
            return QueryResult {
                code: String::new(),
                origin: Lookup::NotFound,
                destination: Lookup::NotFound,
                history: Lookup::NotFound,
            };
        }
        let result = QueryResult {
            code: code.to_string(),
            origin: self.origin(code),
            destination: self.destination(code),
            history: self.history(code),
        };
        debug!(
            code,
            origin = result.origin.is_found(),
            destination = result.destination.is_found(),
            history = result.history.is_found(),
            "query complete"
        );
        result
    }

    /// Origin lines and their average rate.
    pub fn origin(&self, code: &str) -> Lookup<OriginSummary> {
        let rows = self.dataset.origin_rows(code);
        let Some(first) = rows.first() else {
            return Lookup::NotFound;
        };
        let totals = aggregate::<OriginRow>(&rows);

        let lines = rows
            .iter()
            .zip(&totals.totals)
            .map(|(row, total)| OriginLine {
                hs8: row.hs8.clone(),
                description: row.hierarchy.hs8.clone(),
                rate_text: row.rate.clone(),
                total: *total,
            })
            .collect();

        Lookup::Found(OriginSummary {
            code: code.to_string(),
            hierarchy: HierarchySummary::from_hierarchy(&first.hierarchy),
            lines,
            average: totals.average,
        })
    }

    /// Destination lines with component rates and their average total.
    pub fn destination(&self, code: &str) -> Lookup<DestinationSummary> {
        let rows = self.dataset.destination_rows(code);
        let Some(first) = rows.first() else {
            return Lookup::NotFound;
        };
        let totals = aggregate::<DestinationRow>(&rows);

        let lines = rows
            .iter()
            .map(|row| DestinationLine {
                hs8: row.hs8.clone(),
                description: row.hierarchy.hs8.clone(),
                components: row.components.clone(),
                total: row.total_rate(),
            })
            .collect();

        Lookup::Found(DestinationSummary {
            code: code.to_string(),
            hierarchy: HierarchySummary::from_hierarchy(&first.hierarchy),
            lines,
            average: totals.average,
        })
    }

    /// Trailing summary of the participation and effective-tariff series.
    pub fn history(&self, code: &str) -> Lookup<SummaryResult> {
        self.summarizer.summarize(&self.dataset, code).into()
    }
}
