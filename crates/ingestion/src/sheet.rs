//! Raw sheets and the workbook sources that produce them.
//!
//! A sheet is a header row plus rows of loosely typed cells. Blank header
//! cells are named `Unnamed: <position>`, so a column with no title can still
//! be addressed (and renamed) by the loader.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate, NaiveDateTime};
use tariff_core::{Error, Result};
use tracing::debug;

/// Excel day zero (serial dates count from here, including the 1900 leap bug).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Last serial Excel can represent (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Month-first before day-first; the day-first forms only catch what cannot be month-first.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y", "%d-%m-%Y",
];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

static EMPTY_CELL: Cell = Cell::Empty;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    /// Whether the cell carries nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The cell as source text. Numbers print without a trailing `.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(dt) => Some(dt.date().format("%Y-%m-%d").to_string()),
        }
    }

    /// The cell as a calendar date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Empty => None,
            Cell::Date(dt) => Some(dt.date()),
            Cell::Number(serial) => excel_serial_to_date(*serial),
            Cell::Text(s) => parse_date_text(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<NaiveDate> for Cell {
    fn from(date: NaiveDate) -> Self {
        Cell::Date(date.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

/// Convert an Excel serial day number to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.floor() as u64))
}

/// Parse a date written as text (ISO, slashed, or year-month).
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    // "2024-03" reads as the first of the month.
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok()
}

/// A sheet as read from the source: headers plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Create a sheet from explicit headers and rows.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a sheet from a grid whose first row holds the headers.
    pub fn from_grid<I>(name: impl Into<String>, grid: I) -> Self
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        let mut grid = grid.into_iter();
        let headers = grid
            .next()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| header_name(idx, cell))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.into(),
            headers,
            rows: grid.collect(),
        }
    }

    /// Read a sheet from CSV text.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let name = name.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| Error::workbook(format!("sheet '{name}' line {}: {e}", idx + 1)))?;
            let mut cells: Vec<Cell> = record.iter().map(Cell::from).collect();
            if idx == 0 {
                // Spreadsheet exports sometimes carry a BOM on the first header.
                if let Some(Cell::Text(first)) = cells.first_mut() {
                    *first = first.trim_start_matches('\u{feff}').to_string();
                }
            }
            grid.push(cells);
        }

        Ok(Self::from_grid(name, grid))
    }

    /// Position of a column by exact header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at `(row, col)`; short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Remove a column and its cells. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column(name) else {
            return false;
        };
        self.headers.remove(idx);
        for row in &mut self.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
        true
    }

    /// Rename a column unless the target name is already taken.
    ///
    /// Returns whether a rename happened.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        rename_header(&mut self.headers, from, to)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rename `from` to `to` in a header list unless `to` is already present.
pub fn rename_header(headers: &mut [String], from: &str, to: &str) -> bool {
    if headers.iter().any(|h| h == to) {
        return false;
    }
    match headers.iter_mut().find(|h| h.as_str() == from) {
        Some(header) => {
            *header = to.to_string();
            true
        }
        None => false,
    }
}

fn header_name(idx: usize, cell: &Cell) -> String {
    cell.as_text()
        .unwrap_or_else(|| format!("Unnamed: {idx}"))
}

/// Anything that can hand out sheets by name.
pub trait WorkbookSource: Send {
    /// Read a whole sheet. A missing sheet is `Error::MissingSheet`.
    fn sheet(&mut self, name: &str) -> Result<RawSheet>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Pick a source for a path: a directory of CSV sheets, or a spreadsheet file.
pub fn open_source(path: impl AsRef<Path>) -> Box<dyn WorkbookSource> {
    let path = path.as_ref();
    if path.is_dir() {
        Box::new(CsvWorkbook::new(path))
    } else {
        Box::new(XlsxWorkbook::new(path))
    }
}

/// A spreadsheet file (xlsx, xlsm, xls, ods).
///
/// The file is opened per sheet read, so the source holds no open handle.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    path: PathBuf,
}

impl XlsxWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet(&mut self, name: &str) -> Result<RawSheet> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            Error::workbook(format!("failed to open '{}': {e}", self.path.display()))
        })?;

        if !workbook.sheet_names().iter().any(|n| n == name) {
            return Err(Error::missing_sheet(name));
        }

        let range = workbook.worksheet_range(name).map_err(|e| {
            Error::workbook(format!(
                "failed to read sheet '{name}' from '{}': {e}",
                self.path.display()
            ))
        })?;

        // Ranges start at the first used cell; keep absolute column positions.
        let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
        let grid = range.rows().map(|row| {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(cell_from_data));
            cells
        });

        let sheet = RawSheet::from_grid(name, grid);
        debug!(sheet = name, rows = sheet.len(), "read spreadsheet sheet");
        Ok(sheet)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match excel_serial_to_date(serial).and_then(|d| d.and_hms_opt(0, 0, 0)) {
                Some(date) => Cell::Date(date),
                None => Cell::Number(serial),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// A directory holding one `<sheet>.csv` file per sheet.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

impl WorkbookSource for CsvWorkbook {
    fn sheet(&mut self, name: &str) -> Result<RawSheet> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(Error::missing_sheet(name));
        }
        let file = File::open(&path)
            .map_err(|e| Error::workbook(format!("failed to open '{}': {e}", path.display())))?;
        let sheet = RawSheet::from_csv_reader(name, file)?;
        debug!(sheet = name, rows = sheet.len(), "read csv sheet");
        Ok(sheet)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Sheets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: HashMap<String, RawSheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, keyed by its name.
    pub fn with_sheet(mut self, sheet: RawSheet) -> Self {
        self.insert(sheet);
        self
    }

    pub fn insert(&mut self, sheet: RawSheet) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet(&mut self, name: &str) -> Result<RawSheet> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::missing_sheet(name))
    }

    fn describe(&self) -> String {
        format!("in-memory workbook ({} sheets)", self.sheets.len())
    }
}
