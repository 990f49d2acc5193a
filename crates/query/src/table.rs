//! The two-row summary table shown under the charts.
//!
//! Cells are display strings: money as `$1,234.56`, percentages as `12.34%`.

use serde::{Deserialize, Serialize};
use tariff_features::{EntitySummary, Stat, SummaryResult};

/// Label of the first column.
const CONCEPT_HEADER: &str = "Concepto";

/// Summary table: a concept column plus value, share and tariff per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SummaryTable {
    /// Build the last-period and trailing-average rows.
    pub fn from_summary(summary: &SummaryResult) -> Self {
        let mut headers = vec![CONCEPT_HEADER.to_string()];
        headers.extend(entity_headers(&summary.domestic));
        headers.extend(entity_headers(&summary.competitor));

        let last_label = format!(
            "Último Dato ({})",
            summary.participation_date.format("%B %Y")
        );
        let average_label = format!("Promedio {} Meses", summary.window);

        let mut last = vec![last_label];
        last.extend(entity_cells(&summary.domestic, |s| s.last));
        last.extend(entity_cells(&summary.competitor, |s| s.last));

        let mut average = vec![average_label];
        average.extend(entity_cells(&summary.domestic, |s| s.average));
        average.extend(entity_cells(&summary.competitor, |s| s.average));

        Self {
            headers,
            rows: vec![last, average],
        }
    }

    /// Fixed-width text rendering, one line per row.
    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|i| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .chain(std::iter::once(&self.headers[i]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&render_line(&self.headers, &widths));
        out.push_str(&render_line(
            &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
            &widths,
        ));
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
        }
        out
    }
}

fn entity_headers(entity: &EntitySummary) -> [String; 3] {
    [
        format!("Part. $ ({})", entity.short),
        format!("Share % ({})", entity.short),
        format!("Arancel % ({})", entity.short),
    ]
}

fn entity_cells(entity: &EntitySummary, pick: impl Fn(&Stat) -> f64) -> [String; 3] {
    [
        format_money(pick(&entity.value)),
        format_percent(pick(&entity.share)),
        format_percent(pick(&entity.effective_tariff)),
    ]
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            if i == 0 {
                format!("{cell:<w$}")
            } else {
                format!("{cell:>w$}")
            }
        })
        .collect();
    let mut line = line.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

/// `1234.5` → `$1,234.50`.
pub fn format_money(value: f64) -> String {
    let grouped = group_thousands(value, 2);
    match grouped.strip_prefix('-') {
        Some(abs) => format!("-${abs}"),
        None => format!("${grouped}"),
    }
}

/// `12.345` → `12.35%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", group_thousands(value, 2))
}

/// Fixed decimals with a comma every three integer digits.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
