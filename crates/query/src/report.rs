//! Plain-text rendering of a query result.

use tariff_core::{Rate, RateComponent, NOT_AVAILABLE};

use crate::facade::{DestinationSummary, Lookup, OriginSummary, QueryResult};
use crate::table::{format_percent, SummaryTable};

/// Column headers for the destination components, in display order.
const COMPONENT_HEADERS: [(RateComponent, &str); 5] = [
    (RateComponent::General, "General"),
    (RateComponent::TradeRemedy, "301"),
    (RateComponent::Sector, "232"),
    (RateComponent::Reciprocal, "Recíproco"),
    (RateComponent::SpecialProgram, "Fentanilo"),
];

/// Format every section of a query result.
pub fn format_query(result: &QueryResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Subpartida {} ===\n\n", result.code));

    out.push_str("México (LIGIE)\n");
    match &result.origin {
        Lookup::Found(origin) => out.push_str(&format_origin(origin)),
        Lookup::NotFound => out.push_str("  no encontrada\n"),
    }
    out.push('\n');

    out.push_str("Estados Unidos (HTS)\n");
    match &result.destination {
        Lookup::Found(destination) => out.push_str(&format_destination(destination)),
        Lookup::NotFound => out.push_str("  no encontrada\n"),
    }
    out.push('\n');

    out.push_str("Comercio y aranceles efectivos\n");
    match &result.history {
        Lookup::Found(summary) => {
            out.push_str(&SummaryTable::from_summary(summary).render());
            out.push_str(&format!(
                "Último arancel efectivo: {} ({} periodos)\n",
                summary.tariff_date.format("%B %Y"),
                summary.tariff_periods
            ));
        }
        Lookup::NotFound => out.push_str("  historial insuficiente\n"),
    }

    out
}

fn format_origin(origin: &OriginSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Capítulo:   {}\n", origin.hierarchy.chapter));
    out.push_str(&format!("  Partida:    {}\n", origin.hierarchy.heading));
    out.push_str(&format!("  Subpartida: {}\n", origin.hierarchy.subheading));
    out.push_str(&format!("  {:<10} {:<40} {:>10} {:>10}\n", "HS8", "Descripción", "LIGIE", "Total"));
    for line in &origin.lines {
        out.push_str(
            format!(
                "  {:<10} {:<40} {:>10} {:>10}\n",
                cell(line.hs8.as_deref()),
                truncate(cell(line.description.as_deref()), 40),
                cell(line.rate_text.as_deref()),
                line.total.to_string(),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out.push_str(&format!("  Promedio: {}\n", format_average(origin.average)));
    out
}

fn format_destination(destination: &DestinationSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Capítulo:   {}\n", destination.hierarchy.chapter));
    out.push_str(&format!("  Partida:    {}\n", destination.hierarchy.heading));
    out.push_str(&format!("  Subpartida: {}\n", destination.hierarchy.subheading));

    out.push_str(&format!("  {:<10} {:<30}", "HS8", "Descripción"));
    for (_, header) in COMPONENT_HEADERS {
        out.push_str(&format!(" {header:>10}"));
    }
    out.push_str(&format!(" {:>10}\n", "Total"));

    for line in &destination.lines {
        let mut text = format!(
            "  {:<10} {:<30}",
            cell(line.hs8.as_deref()),
            truncate(cell(line.description.as_deref()), 30),
        );
        for (component, _) in COMPONENT_HEADERS {
            text.push_str(&format!(" {:>10}", cell(line.components.get(component))));
        }
        text.push_str(&format!(" {:>10}", line.total.to_string()));
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("  Promedio: {}\n", format_average(destination.average)));
    out
}

fn format_average(average: Option<f64>) -> String {
    match average {
        Some(v) => format_percent(v),
        None => Rate::Absent.to_string(),
    }
}

fn cell(text: Option<&str>) -> &str {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => NOT_AVAILABLE,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
