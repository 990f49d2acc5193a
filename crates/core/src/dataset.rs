//! The loaded, read-only dataset.

use serde::{Deserialize, Serialize};

use crate::types::{DestinationRow, EffectiveTariffRecord, OriginRow, ParticipationRecord};

/// The four tables of the workbook, immutable once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Origin-regime (LIGIE) lines.
    pub origin: Vec<OriginRow>,
    /// Destination-regime (HTS) lines.
    pub destination: Vec<DestinationRow>,
    /// Trade participation series.
    pub participation: Vec<ParticipationRecord>,
    /// Effective tariff series.
    pub effective_tariffs: Vec<EffectiveTariffRecord>,
}

impl Dataset {
    /// Origin lines whose HS6 code equals `code`.
    pub fn origin_rows<'a>(&'a self, code: &str) -> Vec<&'a OriginRow> {
        self.origin.iter().filter(|row| row.hs6 == code).collect()
    }

    /// Destination lines whose HS6 code equals `code`.
    pub fn destination_rows<'a>(&'a self, code: &str) -> Vec<&'a DestinationRow> {
        self.destination.iter().filter(|row| row.hs6 == code).collect()
    }

    /// Participation records for `code`, in source order.
    pub fn participation_for<'a>(&'a self, code: &str) -> Vec<&'a ParticipationRecord> {
        self.participation.iter().filter(|r| r.code == code).collect()
    }

    /// Effective tariff records for `code`, in source order.
    pub fn effective_tariffs_for<'a>(&'a self, code: &str) -> Vec<&'a EffectiveTariffRecord> {
        self.effective_tariffs.iter().filter(|r| r.code == code).collect()
    }

    /// Row counts per table, for logging.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.origin.len(),
            self.destination.len(),
            self.participation.len(),
            self.effective_tariffs.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hierarchy;
    use chrono::NaiveDate;

    fn origin(hs6: &str, hs8: &str) -> OriginRow {
        OriginRow {
            hs6: hs6.to_string(),
            hs8: Some(hs8.to_string()),
            hierarchy: Hierarchy::default(),
            rate: Some("10".to_string()),
        }
    }

    #[test]
    fn test_exact_code_match() {
        let dataset = Dataset {
            origin: vec![
                origin("870321", "87032101"),
                origin("870321", "87032199"),
                origin("870322", "87032201"),
            ],
            ..Dataset::default()
        };

        assert_eq!(dataset.origin_rows("870321").len(), 2);
        assert!(dataset.origin_rows("87032").is_empty());
        assert!(dataset.origin_rows("8703210").is_empty());
    }

    #[test]
    fn test_series_slices() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dataset = Dataset {
            participation: vec![ParticipationRecord {
                code: "010121".to_string(),
                date,
                domestic: None,
                competitor: None,
                total: None,
            }],
            ..Dataset::default()
        };

        assert_eq!(dataset.participation_for("010121").len(), 1);
        assert!(dataset.participation_for("10121").is_empty());
        assert!(dataset.effective_tariffs_for("010121").is_empty());
        assert_eq!(dataset.counts(), (0, 0, 1, 0));
    }
}
