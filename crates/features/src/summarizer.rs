//! Participation and effective-tariff summaries for one code.
//!
//! Both series are sliced by exact code, sorted by date and summarized
//! independently: the latest record of each series gives the "last" values,
//! and the last `trailing_window` records give the averages. Effective
//! tariffs are rescaled from the stored fraction to percent here and nowhere
//! else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tariff_core::config::{EntityConfig, SummaryConfig};
use tariff_core::{coerce_numeric, Dataset, EffectiveTariffRecord, ParticipationRecord};
use tracing::debug;

use crate::window::TrailingMean;

/// Last value and trailing average of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub last: f64,
    pub average: f64,
}

/// Summary of one entity across both series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Display name.
    pub label: String,
    /// Short tag for table headers.
    pub short: String,
    /// Participation value.
    pub value: Stat,
    /// Market share in percent.
    pub share: Stat,
    /// Effective tariff in percent.
    pub effective_tariff: Stat,
}

/// Market shares for one participation period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareObservation {
    pub date: NaiveDate,
    pub domestic: f64,
    pub competitor: f64,
}

/// Effective tariffs, in percent, for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffObservation {
    pub date: NaiveDate,
    pub domestic: f64,
    pub competitor: f64,
}

/// Time-series summary for one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Latest participation period.
    pub participation_date: NaiveDate,
    /// Latest effective-tariff period.
    pub tariff_date: NaiveDate,
    /// Configured window size.
    pub window: usize,
    /// Participation records averaged (at most `window`).
    pub participation_periods: usize,
    /// Effective-tariff records averaged (at most `window`).
    pub tariff_periods: usize,
    pub domestic: EntitySummary,
    pub competitor: EntitySummary,
    /// Full share history, oldest first.
    pub share_series: Vec<ShareObservation>,
    /// Full effective-tariff history in percent, oldest first.
    pub tariff_series: Vec<TariffObservation>,
}

/// An entity's share of the total in percent; zero when the total is not positive.
#[inline]
pub fn market_share(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

/// Participation period with coerced values and derived shares.
#[derive(Debug, Clone, Copy)]
struct ParticipationPoint {
    date: NaiveDate,
    domestic: f64,
    competitor: f64,
    domestic_share: f64,
    competitor_share: f64,
}

impl ParticipationPoint {
    fn from_record(record: &ParticipationRecord) -> Self {
        let domestic = coerce_numeric(record.domestic.as_deref());
        let competitor = coerce_numeric(record.competitor.as_deref());
        let total = coerce_numeric(record.total.as_deref());
        Self {
            date: record.date,
            domestic,
            competitor,
            domestic_share: market_share(domestic, total),
            competitor_share: market_share(competitor, total),
        }
    }
}

/// Trailing windows for one entity's metric pair.
struct PairWindow {
    domestic: TrailingMean,
    competitor: TrailingMean,
}

impl PairWindow {
    fn new(window: usize) -> Self {
        Self {
            domestic: TrailingMean::new(window),
            competitor: TrailingMean::new(window),
        }
    }

    fn push(&mut self, domestic: f64, competitor: f64) {
        self.domestic.push(domestic);
        self.competitor.push(competitor);
    }

    fn stats(&self) -> (Stat, Stat) {
        (stat(&self.domestic), stat(&self.competitor))
    }
}

fn stat(window: &TrailingMean) -> Stat {
    Stat {
        last: window.last().unwrap_or(0.0),
        average: window.mean().unwrap_or(0.0),
    }
}

/// Builds [`SummaryResult`]s from the loaded series.
#[derive(Debug, Clone)]
pub struct TimeSeriesSummarizer {
    window: usize,
    effective_tariff_scale: f64,
    domestic: EntityConfig,
    competitor: EntityConfig,
}

impl TimeSeriesSummarizer {
    /// Create a summarizer from the summary policy.
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            window: config.trailing_window.max(1),
            effective_tariff_scale: config.effective_tariff_scale,
            domestic: config.domestic.clone(),
            competitor: config.competitor.clone(),
        }
    }

    /// Summarize a code; `None` when either series has no records for it.
    pub fn summarize(&self, dataset: &Dataset, code: &str) -> Option<SummaryResult> {
        let participation = dataset.participation_for(code);
        let tariffs = dataset.effective_tariffs_for(code);
        debug!(
            code,
            participation = participation.len(),
            effective_tariffs = tariffs.len(),
            "summarizing time series"
        );
        self.summarize_records(&participation, &tariffs)
    }

    /// Summarize already-sliced records, in any order.
    pub fn summarize_records(
        &self,
        participation: &[&ParticipationRecord],
        tariffs: &[&EffectiveTariffRecord],
    ) -> Option<SummaryResult> {
        if participation.is_empty() || tariffs.is_empty() {
            return None;
        }

        let mut participation = participation.to_vec();
        participation.sort_by_key(|r| r.date);
        let mut tariffs = tariffs.to_vec();
        tariffs.sort_by_key(|r| r.date);

        let mut values = PairWindow::new(self.window);
        let mut shares = PairWindow::new(self.window);
        let mut share_series = Vec::with_capacity(participation.len());
        for record in &participation {
            let point = ParticipationPoint::from_record(record);
            values.push(point.domestic, point.competitor);
            shares.push(point.domestic_share, point.competitor_share);
            share_series.push(ShareObservation {
                date: point.date,
                domestic: point.domestic_share,
                competitor: point.competitor_share,
            });
        }

        let mut effective = PairWindow::new(self.window);
        let mut tariff_series = Vec::with_capacity(tariffs.len());
        for record in &tariffs {
            let observation = TariffObservation {
                date: record.date,
                domestic: self.to_percent(record.domestic.as_deref()),
                competitor: self.to_percent(record.competitor.as_deref()),
            };
            effective.push(observation.domestic, observation.competitor);
            tariff_series.push(observation);
        }

        let (dom_value, comp_value) = values.stats();
        let (dom_share, comp_share) = shares.stats();
        let (dom_tariff, comp_tariff) = effective.stats();

        Some(SummaryResult {
            participation_date: participation.last()?.date,
            tariff_date: tariffs.last()?.date,
            window: self.window,
            participation_periods: values.domestic.count(),
            tariff_periods: effective.domestic.count(),
            domestic: EntitySummary {
                label: self.domestic.label.clone(),
                short: self.domestic.short.clone(),
                value: dom_value,
                share: dom_share,
                effective_tariff: dom_tariff,
            },
            competitor: EntitySummary {
                label: self.competitor.label.clone(),
                short: self.competitor.short.clone(),
                value: comp_value,
                share: comp_share,
                effective_tariff: comp_tariff,
            },
            share_series,
            tariff_series,
        })
    }

    /// Stored effective tariff to percent.
    fn to_percent(&self, raw: Option<&str>) -> f64 {
        coerce_numeric(raw) * self.effective_tariff_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn part(code: &str, d: NaiveDate, mx: &str, cn: &str, total: &str) -> ParticipationRecord {
        ParticipationRecord {
            code: code.to_string(),
            date: d,
            domestic: Some(mx.to_string()),
            competitor: Some(cn.to_string()),
            total: Some(total.to_string()),
        }
    }

    fn tariff(code: &str, d: NaiveDate, mx: &str, cn: &str) -> EffectiveTariffRecord {
        EffectiveTariffRecord {
            code: code.to_string(),
            date: d,
            domestic: Some(mx.to_string()),
            competitor: Some(cn.to_string()),
        }
    }

    fn summarizer() -> TimeSeriesSummarizer {
        TimeSeriesSummarizer::new(&SummaryConfig::default())
    }

    #[test]
    fn test_market_share_zero_total() {
        assert_eq!(market_share(40.0, 0.0), 0.0);
        assert_eq!(market_share(0.0, 0.0), 0.0);
        assert_eq!(market_share(40.0, -5.0), 0.0);
        assert_relative_eq!(market_share(25.0, 200.0), 12.5);
    }

    #[test]
    fn test_empty_series_is_none() {
        let dataset = Dataset {
            participation: vec![part("870321", date(2024, 1), "1", "1", "2")],
            ..Dataset::default()
        };
        assert!(summarizer().summarize(&dataset, "870321").is_none());
        assert!(summarizer().summarize(&dataset, "999999").is_none());
    }

    #[test]
    fn test_effective_tariff_rescaled() {
        let p = part("870321", date(2024, 1), "40", "10", "0");
        let t = tariff("870321", date(2024, 1), "0.12", "0.46");
        let result = summarizer().summarize_records(&[&p], &[&t]).unwrap();

        assert_relative_eq!(result.domestic.effective_tariff.last, 12.0, epsilon = 1e-9);
        assert_relative_eq!(result.competitor.effective_tariff.last, 46.0, epsilon = 1e-9);
        // Zero total: shares are zero, not an error.
        assert_eq!(result.domestic.share.last, 0.0);
        assert_eq!(result.competitor.share.last, 0.0);
        assert_eq!(result.domestic.value.last, 40.0);
    }

    #[test]
    fn test_short_history_averages_everything() {
        let records: Vec<_> = (1..=3)
            .map(|m| part("870321", date(2024, m), &(m * 10).to_string(), "0", "100"))
            .collect();
        let refs: Vec<_> = records.iter().collect();
        let t = tariff("870321", date(2024, 3), "0.1", "0.2");

        let result = summarizer().summarize_records(&refs, &[&t]).unwrap();
        assert_eq!(result.participation_periods, 3);
        assert_relative_eq!(result.domestic.value.average, 20.0);
        assert_relative_eq!(result.domestic.share.average, 20.0, epsilon = 1e-9);
        assert_eq!(result.domestic.value.last, 30.0);
    }

    #[test]
    fn test_window_uses_last_twelve_by_date() {
        // Fifteen months, supplied newest first.
        let records: Vec<_> = (1..=15)
            .rev()
            .map(|i| {
                let d = date(2023 + (i as i32 - 1) / 12, (i - 1) % 12 + 1);
                part("870321", d, &i.to_string(), "0", "0")
            })
            .collect();
        let refs: Vec<_> = records.iter().collect();
        let t = tariff("870321", date(2024, 1), "0", "0");

        let result = summarizer().summarize_records(&refs, &[&t]).unwrap();
        assert_eq!(result.participation_periods, 12);
        assert_eq!(result.domestic.value.last, 15.0);
        assert_relative_eq!(result.domestic.value.average, 9.5, epsilon = 1e-12);
        assert_eq!(result.participation_date, date(2024, 3));
        assert_eq!(result.share_series.first().unwrap().date, date(2023, 1));
    }

    #[test]
    fn test_series_last_dates_are_independent() {
        let p = [
            part("870321", date(2024, 5), "1", "1", "2"),
            part("870321", date(2024, 6), "1", "1", "2"),
        ];
        let t = [tariff("870321", date(2024, 3), "0.1", "0.2")];
        let p_refs: Vec<_> = p.iter().collect();
        let t_refs: Vec<_> = t.iter().collect();

        let result = summarizer().summarize_records(&p_refs, &t_refs).unwrap();
        assert_eq!(result.participation_date, date(2024, 6));
        assert_eq!(result.tariff_date, date(2024, 3));
        assert_eq!(result.tariff_periods, 1);
    }

    #[test]
    fn test_non_numeric_coerced_to_zero() {
        let p = part("870321", date(2024, 1), "n/d", "30", "abc");
        let t = tariff("870321", date(2024, 1), "", "x");
        let result = summarizer().summarize_records(&[&p], &[&t]).unwrap();

        assert_eq!(result.domestic.value.last, 0.0);
        assert_eq!(result.competitor.value.last, 30.0);
        assert_eq!(result.competitor.share.last, 0.0);
        assert_eq!(result.domestic.effective_tariff.last, 0.0);
    }

    #[test]
    fn test_window_and_scale_are_configurable() {
        let config = SummaryConfig {
            trailing_window: 2,
            effective_tariff_scale: 1.0,
            ..SummaryConfig::default()
        };
        let summarizer = TimeSeriesSummarizer::new(&config);
        let p: Vec<_> = (1..=4)
            .map(|m| part("870321", date(2024, m), &m.to_string(), "0", "10"))
            .collect();
        let t = tariff("870321", date(2024, 1), "46", "0");
        let p_refs: Vec<_> = p.iter().collect();

        let result = summarizer.summarize_records(&p_refs, &[&t]).unwrap();
        assert_relative_eq!(result.domestic.value.average, 3.5);
        assert_relative_eq!(result.domestic.effective_tariff.last, 46.0);
    }

    #[test]
    fn test_summarize_filters_by_code() {
        let dataset = Dataset {
            participation: vec![
                part("870321", date(2024, 1), "50", "25", "100"),
                part("870322", date(2024, 2), "999", "999", "999"),
            ],
            effective_tariffs: vec![tariff("870321", date(2024, 1), "0.05", "0.25")],
            ..Dataset::default()
        };

        let result = summarizer().summarize(&dataset, "870321").unwrap();
        assert_relative_eq!(result.domestic.share.last, 50.0);
        assert_relative_eq!(result.competitor.share.average, 25.0);
        assert_eq!(result.share_series.len(), 1);
        assert_eq!(result.tariff_series.len(), 1);
        assert_eq!(result.domestic.label, "México");
    }
}
