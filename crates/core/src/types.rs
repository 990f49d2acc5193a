//! Core record types for the tariff dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shown when an optional description is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Descriptions at each level of the classification hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    /// Chapter (HS2) description.
    pub hs2: Option<String>,
    /// Heading (HS4) description.
    pub hs4: Option<String>,
    /// Subheading (HS6) description.
    pub hs6: Option<String>,
    /// Tariff line (HS8) description.
    pub hs8: Option<String>,
}

/// One origin-regime (LIGIE) tariff line. Fields keep the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginRow {
    pub hs6: String,
    pub hs8: Option<String>,
    pub hierarchy: Hierarchy,
    /// Raw LIGIE rate text.
    pub rate: Option<String>,
}

/// Named rate components of a destination-regime line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateComponent {
    /// General (MFN) rate.
    General,
    /// Trade-remedy rate (Section 301).
    TradeRemedy,
    /// Sector-specific rate (Section 232).
    Sector,
    /// Reciprocal rate.
    Reciprocal,
    /// Special-program rate.
    SpecialProgram,
}

impl RateComponent {
    /// Every component, in display order.
    pub const ALL: [RateComponent; 5] = [
        RateComponent::General,
        RateComponent::TradeRemedy,
        RateComponent::Sector,
        RateComponent::Reciprocal,
        RateComponent::SpecialProgram,
    ];

    /// Components that make up a line's total. The sector rate is not one of them.
    pub const SUMMED: [RateComponent; 4] = [
        RateComponent::General,
        RateComponent::TradeRemedy,
        RateComponent::Reciprocal,
        RateComponent::SpecialProgram,
    ];

    /// Whether the component contributes to the total.
    pub fn is_summed(self) -> bool {
        !matches!(self, RateComponent::Sector)
    }
}

/// Raw text of each rate component on a destination line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffComponents {
    pub general: Option<String>,
    pub trade_remedy: Option<String>,
    pub sector: Option<String>,
    pub reciprocal: Option<String>,
    pub special_program: Option<String>,
}

impl TariffComponents {
    /// Raw text of a component.
    pub fn get(&self, component: RateComponent) -> Option<&str> {
        let field = match component {
            RateComponent::General => &self.general,
            RateComponent::TradeRemedy => &self.trade_remedy,
            RateComponent::Sector => &self.sector,
            RateComponent::Reciprocal => &self.reciprocal,
            RateComponent::SpecialProgram => &self.special_program,
        };
        field.as_deref()
    }

    /// Mutable access to a component's raw text.
    pub fn get_mut(&mut self, component: RateComponent) -> &mut Option<String> {
        match component {
            RateComponent::General => &mut self.general,
            RateComponent::TradeRemedy => &mut self.trade_remedy,
            RateComponent::Sector => &mut self.sector,
            RateComponent::Reciprocal => &mut self.reciprocal,
            RateComponent::SpecialProgram => &mut self.special_program,
        }
    }
}

/// One destination-regime (HTS) tariff line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRow {
    pub hs6: String,
    pub hs8: Option<String>,
    pub hierarchy: Hierarchy,
    pub components: TariffComponents,
}

/// Trade participation for one code and reporting period.
///
/// Values are kept as source text and coerced when summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    /// Zero-padded HS6 code.
    pub code: String,
    pub date: NaiveDate,
    pub domestic: Option<String>,
    pub competitor: Option<String>,
    pub total: Option<String>,
}

/// Effective (applied) tariff for one code and reporting period.
///
/// Stored on the source's fractional scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveTariffRecord {
    /// Zero-padded HS6 code.
    pub code: String,
    pub date: NaiveDate,
    pub domestic: Option<String>,
    pub competitor: Option<String>,
}

/// Left-pad a code with zeros up to `width` characters.
pub fn pad_code(raw: &str, width: usize) -> String {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len >= width {
        return trimmed.to_string();
    }
    let mut padded = "0".repeat(width - len);
    padded.push_str(trimmed);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_is_not_summed() {
        assert!(!RateComponent::Sector.is_summed());
        assert!(!RateComponent::SUMMED.contains(&RateComponent::Sector));
        for component in RateComponent::SUMMED {
            assert!(component.is_summed());
        }
    }

    #[test]
    fn test_component_access() {
        let mut components = TariffComponents::default();
        *components.get_mut(RateComponent::Reciprocal) = Some("10%".to_string());
        assert_eq!(components.get(RateComponent::Reciprocal), Some("10%"));
        assert_eq!(components.get(RateComponent::Sector), None);
    }

    #[test]
    fn test_pad_code() {
        assert_eq!(pad_code("10121", 6), "010121");
        assert_eq!(pad_code("870321", 6), "870321");
        assert_eq!(pad_code(" 8703 ", 6), "008703");
        assert_eq!(pad_code("12345678", 6), "12345678");
    }
}
