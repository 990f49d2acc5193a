//! Tariff totals per line and averages across lines.
//!
//! A destination line's total is the sum of its general, trade-remedy,
//! reciprocal and special-program rates. The sector-specific (Section 232)
//! rate is shown alongside but never summed.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tariff_core::{parse_rate, DestinationRow, OriginRow, Rate, RateComponent, TariffComponents};

/// Anything with a total tariff rate.
pub trait TotalRate {
    /// The total, or `Absent` when no contributing field has a value.
    fn total_rate(&self) -> Rate;
}

impl TotalRate for OriginRow {
    fn total_rate(&self) -> Rate {
        parse_rate(self.rate.as_deref())
    }
}

impl TotalRate for TariffComponents {
    fn total_rate(&self) -> Rate {
        let mut total = 0.0;
        let mut found = false;

        for component in RateComponent::SUMMED {
            if let Rate::Value(v) = parse_rate(self.get(component)) {
                total += v;
                found = true;
            }
        }

        if found {
            Rate::Value(total)
        } else {
            Rate::Absent
        }
    }
}

impl TotalRate for DestinationRow {
    fn total_rate(&self) -> Rate {
        self.components.total_rate()
    }
}

/// Mean of the present rates; `None` when every rate is absent.
pub fn average_rate<I>(rates: I) -> Option<f64>
where
    I: IntoIterator<Item = Rate>,
{
    let values: Vec<f64> = rates.into_iter().filter_map(Rate::value).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Per-line totals of one regime and their average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTotals {
    /// Total per line, in input order.
    pub totals: Vec<Rate>,
    /// Mean over lines with a total.
    pub average: Option<f64>,
}

/// Compute every line's total and the regime average.
pub fn aggregate<T: TotalRate>(rows: &[&T]) -> LineTotals {
    let totals: Vec<Rate> = rows.iter().map(|row| row.total_rate()).collect();
    let average = average_rate(totals.iter().copied());
    LineTotals { totals, average }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tariff_core::Hierarchy;

    fn components(
        general: Option<&str>,
        trade_remedy: Option<&str>,
        reciprocal: Option<&str>,
        special_program: Option<&str>,
    ) -> TariffComponents {
        TariffComponents {
            general: general.map(String::from),
            trade_remedy: trade_remedy.map(String::from),
            sector: Some("25%".to_string()),
            reciprocal: reciprocal.map(String::from),
            special_program: special_program.map(String::from),
        }
    }

    fn origin(rate: Option<&str>) -> OriginRow {
        OriginRow {
            hs6: "870321".to_string(),
            hs8: None,
            hierarchy: Hierarchy::default(),
            rate: rate.map(String::from),
        }
    }

    #[test]
    fn test_destination_example() {
        let line = components(Some("15%"), Some("Ex."), Some("7.5"), None);
        assert_eq!(line.total_rate(), Rate::Value(22.5));
    }

    #[test]
    fn test_all_absent_is_absent() {
        let line = components(None, Some(""), Some("n/a"), None);
        assert_eq!(line.total_rate(), Rate::Absent);
    }

    #[test]
    fn test_single_zero_field_is_a_value() {
        let line = components(None, None, Some("Libre"), None);
        assert_eq!(line.total_rate(), Rate::Value(0.0));
    }

    #[test]
    fn test_sum_ignores_field_order() {
        let values = [Some("1.5"), Some("20%"), None, Some("3")];
        let expected = 24.5;
        for shift in 0..4 {
            let v = |i: usize| values[(i + shift) % 4];
            let line = components(v(0), v(1), v(2), v(3));
            assert_eq!(line.total_rate(), Rate::Value(expected));
        }
    }

    #[test]
    fn test_sector_rate_never_counts() {
        let base = components(Some("2.5%"), None, Some("10%"), None);
        let expected = base.total_rate();
        for sector in [None, Some(""), Some("0"), Some("25%"), Some("50"), Some("Ex."), Some("abc")] {
            let mut line = base.clone();
            line.sector = sector.map(String::from);
            assert_eq!(line.total_rate(), expected);
        }

        let only_sector = TariffComponents {
            sector: Some("25%".to_string()),
            ..TariffComponents::default()
        };
        assert_eq!(only_sector.total_rate(), Rate::Absent);
    }

    #[test]
    fn test_origin_total() {
        assert_eq!(origin(Some("15%")).total_rate(), Rate::Value(15.0));
        assert_eq!(origin(Some("Ex.")).total_rate(), Rate::Value(0.0));
        assert_eq!(origin(None).total_rate(), Rate::Absent);
    }

    #[test]
    fn test_average_skips_absent() {
        let avg = average_rate([Rate::Value(10.0), Rate::Absent, Rate::Value(20.0)]).unwrap();
        assert_relative_eq!(avg, 15.0);
        assert_eq!(average_rate([Rate::Absent, Rate::Absent]), None);
        assert_eq!(average_rate(std::iter::empty()), None);
    }

    #[test]
    fn test_aggregate_lines() {
        let rows = [origin(Some("10")), origin(Some("bad")), origin(Some("Ex."))];
        let refs: Vec<&OriginRow> = rows.iter().collect();
        let totals = aggregate(&refs);
        assert_eq!(
            totals.totals,
            vec![Rate::Value(10.0), Rate::Absent, Rate::Value(0.0)]
        );
        assert_relative_eq!(totals.average.unwrap(), 5.0);
    }
}
