//! Configuration structures for the tariff dashboard.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workbook location and layout.
    pub dataset: DatasetConfig,
    /// Time-series summary policy.
    pub summary: SummaryConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make every summary meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.summary.trailing_window == 0 {
            return Err(Error::config("summary.trailing_window must be at least 1"));
        }
        if !self.summary.effective_tariff_scale.is_finite()
            || self.summary.effective_tariff_scale <= 0.0
        {
            return Err(Error::config(
                "summary.effective_tariff_scale must be a positive number",
            ));
        }
        if self.dataset.code_width == 0 {
            return Err(Error::config("dataset.code_width must be at least 1"));
        }
        Ok(())
    }
}

/// Workbook location, sheet names and column contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the workbook (spreadsheet file or directory of CSV sheets).
    pub path: PathBuf,
    /// Sheet names.
    pub sheets: SheetNames,
    /// Origin-regime (LIGIE) columns.
    pub origin: OriginColumns,
    /// Destination-regime (HTS) columns.
    pub destination: DestinationColumns,
    /// Columns shared by both time series.
    pub series: SeriesColumns,
    /// Width classification codes are zero-padded to in the time series.
    pub code_width: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/LIGIE_HTS_Dashboard.xlsx"),
            sheets: SheetNames::default(),
            origin: OriginColumns::default(),
            destination: DestinationColumns::default(),
            series: SeriesColumns::default(),
            code_width: 6,
        }
    }
}

/// Names of the four sheets in the workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub origin: String,
    pub destination: String,
    pub participation: String,
    pub effective_tariff: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            origin: "LIGIE".to_string(),
            destination: "HTS".to_string(),
            participation: "Participación".to_string(),
            effective_tariff: "Aranceles efectivos".to_string(),
        }
    }
}

/// Hierarchy description columns shared by both regimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyColumns {
    /// Chapter description (optional in the source).
    pub hs2_description: String,
    /// Heading description (optional in the source).
    pub hs4_description: String,
    /// Subheading description.
    pub hs6_description: String,
    /// Tariff line description.
    pub hs8_description: String,
}

impl Default for HierarchyColumns {
    fn default() -> Self {
        Self {
            hs2_description: "Descripción HS2".to_string(),
            hs4_description: "Descripción HS4".to_string(),
            hs6_description: "Descripción HS6".to_string(),
            hs8_description: "Descripción HS8".to_string(),
        }
    }
}

/// Origin-regime (LIGIE) column names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginColumns {
    pub hs6: String,
    pub hs8: String,
    pub hierarchy: HierarchyColumns,
    /// The single rate column.
    pub rate: String,
}

impl Default for OriginColumns {
    fn default() -> Self {
        Self {
            hs6: "HS6 México".to_string(),
            hs8: "HS8 México".to_string(),
            hierarchy: HierarchyColumns::default(),
            rate: "LIGIE".to_string(),
        }
    }
}

/// Destination-regime (HTS) column names, after canonical renaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationColumns {
    pub hs6: String,
    pub hs8: String,
    pub hierarchy: HierarchyColumns,
    /// General (MFN) rate.
    pub general: String,
    /// Trade-remedy rate (Section 301).
    pub trade_remedy: String,
    /// Sector-specific rate (Section 232). Displayed, never summed.
    pub sector: String,
    /// Reciprocal rate, canonical name.
    pub reciprocal: String,
    /// Raw source name of the reciprocal rate column.
    pub reciprocal_source: String,
    /// Special-program rate, canonical name.
    pub special_program: String,
    /// Raw source name of the special-program column (a blank header).
    pub special_program_source: String,
    /// Auxiliary column dropped when present.
    pub auxiliary: String,
    /// Placeholder rows below the header that carry no data.
    pub placeholder_rows: usize,
}

impl Default for DestinationColumns {
    fn default() -> Self {
        Self {
            hs6: "HS6".to_string(),
            hs8: "HS8 Estados Unidos".to_string(),
            hierarchy: HierarchyColumns::default(),
            general: "EU General".to_string(),
            trade_remedy: "EU 301".to_string(),
            sector: "EU 232".to_string(),
            reciprocal: "Recíproco".to_string(),
            reciprocal_source: "EU IEEPA".to_string(),
            special_program: "Fentanilo".to_string(),
            special_program_source: "Unnamed: 12".to_string(),
            auxiliary: "#".to_string(),
            placeholder_rows: 1,
        }
    }
}

/// Column names of the participation and effective-tariff sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesColumns {
    pub code: String,
    pub date: String,
    /// Accepted in place of `date` when the canonical name is absent.
    pub date_alias: String,
    /// Total participation across all partners.
    pub total: String,
}

impl Default for SeriesColumns {
    fn default() -> Self {
        Self {
            code: "Subpartida".to_string(),
            date: "Date".to_string(),
            date_alias: "date".to_string(),
            total: "Total".to_string(),
        }
    }
}

/// A compared entity (trading partner).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Display name.
    pub label: String,
    /// Short tag used in table headers.
    pub short: String,
    /// Column carrying the entity in both time series.
    pub column: String,
}

/// Time-series summary policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Number of most recent records averaged.
    pub trailing_window: usize,
    /// Multiplier from the stored effective-tariff scale to percent.
    ///
    /// The source feed stores fractions (0.46), displayed as 46.0.
    pub effective_tariff_scale: f64,
    /// Domestic entity.
    pub domestic: EntityConfig,
    /// Competitor entity.
    pub competitor: EntityConfig,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            trailing_window: 12,
            effective_tariff_scale: 100.0,
            domestic: EntityConfig {
                label: "México".to_string(),
                short: "Mx".to_string(),
                column: "Mexico".to_string(),
            },
            competitor: EntityConfig {
                label: "China".to_string(),
                short: "Ch".to_string(),
                column: "China".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.summary.trailing_window, 12);
        assert_eq!(config.summary.effective_tariff_scale, 100.0);
        assert_eq!(config.dataset.sheets.participation, "Participación");
        assert_eq!(config.dataset.destination.special_program_source, "Unnamed: 12");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "summary": { "trailing_window": 6 } }"#).unwrap();
        assert_eq!(config.summary.trailing_window, 6);
        assert_eq!(config.summary.effective_tariff_scale, 100.0);
        assert_eq!(config.summary.domestic.column, "Mexico");
        assert_eq!(config.dataset.code_width, 6);
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.summary.trailing_window = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_json_file("/nonexistent/tariff-config.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
