//! Workbook loading and normalization.
//!
//! This is the only place that addresses columns by name. Everything past
//! this point works on typed records.
//!
//! - Origin (LIGIE): kept as raw text.
//! - Destination (HTS): auxiliary column and placeholder rows dropped, rate
//!   columns renamed to canonical names, hierarchy forward-filled.
//! - Time series: headers trimmed, date column aliased and parsed, codes
//!   zero-padded.
//!
//! Any structural problem fails the whole load; no partial dataset is returned.

use tariff_core::config::{DestinationColumns, HierarchyColumns, SeriesColumns};
use tariff_core::{
    pad_code, Config, Dataset, DestinationRow, EffectiveTariffRecord, Error, Hierarchy,
    OriginRow, ParticipationRecord, RateComponent, Result, TariffComponents,
};
use tracing::{debug, info, warn};

use crate::sheet::{rename_header, Cell, RawSheet, WorkbookSource};

/// Loads the four tables of the workbook into a [`Dataset`].
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    config: Config,
}

impl DatasetLoader {
    /// Create a loader for the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Read and normalize every table.
    pub fn load(&self, source: &mut dyn WorkbookSource) -> Result<Dataset> {
        let sheets = &self.config.dataset.sheets;
        info!(source = %source.describe(), "loading tariff workbook");

        let origin = self.load_origin(source.sheet(&sheets.origin)?)?;
        let destination = self.load_destination(source.sheet(&sheets.destination)?)?;
        let participation = self.load_participation(source.sheet(&sheets.participation)?)?;
        let effective_tariffs =
            self.load_effective_tariffs(source.sheet(&sheets.effective_tariff)?)?;

        let dataset = Dataset {
            origin,
            destination,
            participation,
            effective_tariffs,
        };
        let (o, d, p, e) = dataset.counts();
        info!(
            origin = o,
            destination = d,
            participation = p,
            effective_tariffs = e,
            "tariff workbook loaded"
        );
        Ok(dataset)
    }

    /// Origin regime: hierarchy plus a single rate column, all raw text.
    pub fn load_origin(&self, mut sheet: RawSheet) -> Result<Vec<OriginRow>> {
        let cols = &self.config.dataset.origin;
        sheet.rows.retain(|row| !is_blank(row));

        let hs6 = required(&sheet, &cols.hs6)?;
        let hs8 = required(&sheet, &cols.hs8)?;
        let rate = required(&sheet, &cols.rate)?;
        let hierarchy = HierarchyLayout::resolve(&sheet, &cols.hierarchy)?;

        // Chapter and heading rows carry no subheading code and never match a query.
        let rows = sheet
            .rows
            .iter()
            .filter_map(|row| {
                Some(OriginRow {
                    hs6: code_text(row, hs6)?,
                    hs8: text(row, Some(hs8)),
                    hierarchy: hierarchy.read(row),
                    rate: text(row, Some(rate)),
                })
            })
            .collect::<Vec<_>>();

        debug!(
            sheet = %sheet.name,
            rows = rows.len(),
            skipped = sheet.len() - rows.len(),
            "origin table loaded"
        );
        Ok(rows)
    }

    /// Destination regime: multi-component rates with canonical column names.
    pub fn load_destination(&self, mut sheet: RawSheet) -> Result<Vec<DestinationRow>> {
        let cols = &self.config.dataset.destination;

        if sheet.drop_column(&cols.auxiliary) {
            debug!(sheet = %sheet.name, column = %cols.auxiliary, "dropped auxiliary column");
        }
        canonicalize_destination_headers(&mut sheet.headers, cols);

        let placeholders = cols.placeholder_rows.min(sheet.rows.len());
        sheet.rows.drain(..placeholders);
        sheet.rows.retain(|row| !is_blank(row));

        let hs6 = required(&sheet, &cols.hs6)?;
        let hs8 = required(&sheet, &cols.hs8)?;
        let hierarchy = HierarchyLayout::resolve(&sheet, &cols.hierarchy)?;
        let components = component_columns(&sheet, cols)?;

        let mut fill = vec![hs6, hierarchy.hs6];
        fill.extend(hierarchy.hs2);
        fill.extend(hierarchy.hs4);
        forward_fill(&mut sheet.rows, &fill);

        let rows = sheet
            .rows
            .iter()
            .filter_map(|row| {
                let code = code_text(row, hs6)?;
                let mut parsed = TariffComponents::default();
                for (component, col) in &components {
                    *parsed.get_mut(*component) = text(row, Some(*col));
                }
                Some(DestinationRow {
                    hs6: code,
                    hs8: text(row, Some(hs8)),
                    hierarchy: hierarchy.read(row),
                    components: parsed,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            sheet = %sheet.name,
            rows = rows.len(),
            skipped = sheet.len() - rows.len(),
            "destination table loaded"
        );
        Ok(rows)
    }

    /// Participation series: code, date, domestic, competitor and total values.
    pub fn load_participation(&self, sheet: RawSheet) -> Result<Vec<ParticipationRecord>> {
        let (sheet, layout) = self.prepare_series(sheet)?;
        let total = sheet.column(&self.config.dataset.series.total);
        if total.is_none() {
            warn!(sheet = %sheet.name, "no total column; market shares will read as zero");
        }

        let mut records = Vec::with_capacity(sheet.len());
        for (idx, row) in sheet.rows.iter().enumerate() {
            let Some((code, date)) = layout.key(&sheet, idx, row)? else {
                continue;
            };
            records.push(ParticipationRecord {
                code,
                date,
                domestic: text(row, layout.domestic),
                competitor: text(row, layout.competitor),
                total: text(row, total),
            });
        }

        debug!(sheet = %sheet.name, rows = records.len(), "participation series loaded");
        Ok(records)
    }

    /// Effective tariff series: code, date and per-entity fractional rates.
    pub fn load_effective_tariffs(&self, sheet: RawSheet) -> Result<Vec<EffectiveTariffRecord>> {
        let (sheet, layout) = self.prepare_series(sheet)?;

        let mut records = Vec::with_capacity(sheet.len());
        for (idx, row) in sheet.rows.iter().enumerate() {
            let Some((code, date)) = layout.key(&sheet, idx, row)? else {
                continue;
            };
            records.push(EffectiveTariffRecord {
                code,
                date,
                domestic: text(row, layout.domestic),
                competitor: text(row, layout.competitor),
            });
        }

        debug!(sheet = %sheet.name, rows = records.len(), "effective tariff series loaded");
        Ok(records)
    }

    fn prepare_series(&self, mut sheet: RawSheet) -> Result<(RawSheet, SeriesLayout)> {
        normalize_series_headers(&mut sheet.headers, &self.config.dataset.series);
        sheet.rows.retain(|row| !is_blank(row));

        let summary = &self.config.summary;
        let layout = SeriesLayout {
            code: required(&sheet, &self.config.dataset.series.code)?,
            date: required(&sheet, &self.config.dataset.series.date)?,
            domestic: optional(&sheet, &summary.domestic.column),
            competitor: optional(&sheet, &summary.competitor.column),
            code_width: self.config.dataset.code_width,
        };
        Ok((sheet, layout))
    }
}

/// Rename the reciprocal and special-program columns to their canonical names.
///
/// A rename is skipped when the canonical name already exists, so applying
/// this twice leaves the headers unchanged.
pub fn canonicalize_destination_headers(headers: &mut [String], cols: &DestinationColumns) {
    let renames = [
        (&cols.reciprocal_source, &cols.reciprocal),
        (&cols.special_program_source, &cols.special_program),
    ];
    for (source, canonical) in renames {
        if rename_header(headers, source, canonical) {
            debug!(from = %source, to = %canonical, "renamed destination column");
        }
    }
}

/// Trim header whitespace and accept the lowercase date alias.
pub fn normalize_series_headers(headers: &mut [String], cols: &SeriesColumns) {
    for header in headers.iter_mut() {
        let trimmed = header.trim();
        if trimmed.len() != header.len() {
            *header = trimmed.to_string();
        }
    }
    rename_header(headers, &cols.date_alias, &cols.date);
}

/// Copy the last non-empty value of each column down into empty cells.
pub fn forward_fill(rows: &mut [Vec<Cell>], columns: &[usize]) {
    for &col in columns {
        let mut last: Option<Cell> = None;
        for row in rows.iter_mut() {
            if row.len() <= col {
                row.resize(col + 1, Cell::Empty);
            }
            if row[col].is_empty() {
                if let Some(value) = &last {
                    row[col] = value.clone();
                }
            } else {
                last = Some(row[col].clone());
            }
        }
    }
}

/// Column positions of the hierarchy descriptions.
#[derive(Debug, Clone, Copy)]
struct HierarchyLayout {
    hs2: Option<usize>,
    hs4: Option<usize>,
    hs6: usize,
    hs8: usize,
}

impl HierarchyLayout {
    fn resolve(sheet: &RawSheet, cols: &HierarchyColumns) -> Result<Self> {
        let layout = Self {
            hs2: optional(sheet, &cols.hs2_description),
            hs4: optional(sheet, &cols.hs4_description),
            hs6: required(sheet, &cols.hs6_description)?,
            hs8: required(sheet, &cols.hs8_description)?,
        };
        if layout.hs2.is_none() || layout.hs4.is_none() {
            warn!(sheet = %sheet.name, "chapter or heading descriptions missing");
        }
        Ok(layout)
    }

    fn read(&self, row: &[Cell]) -> Hierarchy {
        Hierarchy {
            hs2: text(row, self.hs2),
            hs4: text(row, self.hs4),
            hs6: text(row, Some(self.hs6)),
            hs8: text(row, Some(self.hs8)),
        }
    }
}

/// Column positions shared by both time series.
#[derive(Debug, Clone, Copy)]
struct SeriesLayout {
    code: usize,
    date: usize,
    domestic: Option<usize>,
    competitor: Option<usize>,
    code_width: usize,
}

impl SeriesLayout {
    /// Code and date of a series row; `None` for a row with a blank date.
    fn key(
        &self,
        sheet: &RawSheet,
        idx: usize,
        row: &[Cell],
    ) -> Result<Option<(String, chrono::NaiveDate)>> {
        let code = pad_code(&text(row, Some(self.code)).unwrap_or_default(), self.code_width);
        let cell = row.get(self.date).unwrap_or(&Cell::Empty);
        if cell.is_empty() {
            warn!(sheet = %sheet.name, line = idx + 2, code = %code, "row without a date skipped");
            return Ok(None);
        }
        let date = cell.as_date().ok_or_else(|| {
            // +2: header is line 1 and rows are 1-based.
            Error::data(format!(
                "sheet '{}' line {}: unparseable date {:?}",
                sheet.name,
                idx + 2,
                cell.as_text().unwrap_or_default()
            ))
        })?;
        Ok(Some((code, date)))
    }
}

fn component_columns(
    sheet: &RawSheet,
    cols: &DestinationColumns,
) -> Result<Vec<(RateComponent, usize)>> {
    RateComponent::ALL
        .iter()
        .map(|&component| {
            let name = match component {
                RateComponent::General => &cols.general,
                RateComponent::TradeRemedy => &cols.trade_remedy,
                RateComponent::Sector => &cols.sector,
                RateComponent::Reciprocal => &cols.reciprocal,
                RateComponent::SpecialProgram => &cols.special_program,
            };
            required(sheet, name).map(|col| (component, col))
        })
        .collect()
}

fn required(sheet: &RawSheet, name: &str) -> Result<usize> {
    sheet
        .column(name)
        .ok_or_else(|| Error::missing_column(&sheet.name, name))
}

fn optional(sheet: &RawSheet, name: &str) -> Option<usize> {
    sheet.column(name)
}

fn text(row: &[Cell], col: Option<usize>) -> Option<String> {
    col.and_then(|c| row.get(c)).and_then(Cell::as_text)
}

/// Trimmed classification code; `None` when the cell is blank.
fn code_text(row: &[Cell], col: usize) -> Option<String> {
    text(row, Some(col)).map(|code| code.trim().to_string())
}

fn is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}
