//! Tariff rate parsing.
//!
//! Every conversion from spreadsheet text to a tariff rate goes through
//! [`parse_rate`]. The time series use the looser [`coerce_numeric`] policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Words that mark a line as duty-free ("Ex.", "Exento", "Libre", "Free").
const EXEMPTION_MARKERS: [&str; 3] = ["ex", "libre", "free"];

/// A tariff rate in percent, or the absence of one.
///
/// `Absent` is not zero: it is skipped by sums and means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rate {
    /// Non-negative rate in percentage units.
    Value(f64),
    /// No usable value in the source.
    Absent,
}

impl Rate {
    /// The rate as an option.
    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            Rate::Value(v) => Some(v),
            Rate::Absent => None,
        }
    }

    /// Whether the source carried no usable value.
    #[inline]
    pub fn is_absent(self) -> bool {
        matches!(self, Rate::Absent)
    }
}

impl From<Rate> for Option<f64> {
    fn from(rate: Rate) -> Self {
        rate.value()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Value(v) => write!(f, "{v:.2}%"),
            Rate::Absent => write!(f, "N/A"),
        }
    }
}

/// Parse free-form tariff text into a [`Rate`].
///
/// - blank or missing → `Absent`
/// - contains an exemption marker (case-insensitive) → `0.0`
/// - number with optional `%` → that number
/// - anything else, negative or non-finite → `Absent`
pub fn parse_rate(raw: Option<&str>) -> Rate {
    let Some(raw) = raw else {
        return Rate::Absent;
    };
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return Rate::Absent;
    }
    if EXEMPTION_MARKERS.iter().any(|marker| text.contains(marker)) {
        return Rate::Value(0.0);
    }

    match text.replace('%', "").trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Rate::Value(v),
        _ => Rate::Absent,
    }
}

/// Parse a time-series field, treating anything non-numeric as zero.
pub fn coerce_numeric(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
