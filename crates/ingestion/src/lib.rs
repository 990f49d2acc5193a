//! Workbook ingestion and normalization for the tariff dashboard.
//!
//! This crate handles:
//! - Reading sheets from spreadsheet files, CSV directories or memory
//! - Normalizing the four tables into typed records
//! - Caching the loaded dataset for the process lifetime

pub mod cache;
pub mod loader;
pub mod sheet;

pub use cache::DatasetHandle;
pub use loader::DatasetLoader;
pub use sheet::{open_source, Cell, CsvWorkbook, MemoryWorkbook, RawSheet, WorkbookSource, XlsxWorkbook};
