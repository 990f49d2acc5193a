//! Session-level entry point: a cached dataset plus the query facade.

use tariff_core::{Config, Result};
use tariff_ingestion::{DatasetHandle, DatasetLoader, WorkbookSource};
use tracing::info;

use crate::facade::{QueryFacade, QueryResult};
use crate::table::SummaryTable;

/// Answers code queries against a workbook loaded once per process.
pub struct Dashboard {
    handle: DatasetHandle,
    config: Config,
}

impl Dashboard {
    /// Dashboard over the workbook named in the configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            handle: DatasetHandle::from_config(&config),
            config,
        }
    }

    /// Dashboard over an explicit source.
    pub fn with_source(config: Config, source: Box<dyn WorkbookSource>) -> Self {
        Self {
            handle: DatasetHandle::new(DatasetLoader::new(&config), source),
            config,
        }
    }

    /// Query one code. Only the first load can fail; lookups themselves never do.
    pub fn query(&self, code: &str) -> Result<QueryResult> {
        let dataset = self.handle.get()?;
        Ok(QueryFacade::new(dataset, &self.config.summary).query(code))
    }

    /// Summary table for a result with history.
    pub fn summary_table(&self, result: &QueryResult) -> Option<SummaryTable> {
        result.history.found().map(SummaryTable::from_summary)
    }

    /// Re-read the workbook.
    pub fn reload(&self) -> Result<()> {
        let dataset = self.handle.reload()?;
        let (origin, destination, participation, tariffs) = dataset.counts();
        info!(origin, destination, participation, tariffs, "dataset reloaded");
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_loaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tariff_core::{Error, Rate};
    use tariff_ingestion::{Cell, MemoryWorkbook, RawSheet};

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn workbook() -> MemoryWorkbook {
        let ligie = RawSheet::new(
            "LIGIE",
            headers(&["HS6 México", "Descripción HS2", "Descripción HS6", "HS8 México", "Descripción HS8", "LIGIE"]),
            vec![
                row(&["870321", "Vehículos", "Automóviles", "87032101", "Nuevos", "20%"]),
                row(&["870321", "Vehículos", "Automóviles", "87032199", "Usados", "Ex."]),
            ],
        );
        let hts = RawSheet::from_grid(
            "HTS",
            vec![
                row(&[
                    "#", "HS6", "Descripción HS6", "HS8 Estados Unidos", "Descripción HS8",
                    "EU General", "EU 301", "EU 232", "EU IEEPA", "", "", "", "",
                ]),
                row(&["", "", "", "", "", "", "", "", "", "", "", "", "Fentanilo"]),
                row(&["1", "870321", "Cars", "87032101", "New", "15%", "Ex.", "25%", "7.5", "", "", "", ""]),
                row(&["2", "040120", "Milk", "04012000", "Fresh", "Free", "", "", "", "", "", "", ""]),
            ],
        );
        let participation = RawSheet::new(
            "Participación",
            headers(&["Subpartida", "Date", "Mexico", "China", "Total"]),
            (1..=14)
                .map(|m| {
                    let date = format!("{}-{:02}-01", 2023 + (m - 1) / 12, (m - 1) % 12 + 1);
                    row(&["870321", date.as_str(), "50", "25", "100"])
                })
                .collect(),
        );
        let tariffs = RawSheet::new(
            "Aranceles efectivos",
            headers(&["Subpartida", "date", "Mexico", "China"]),
            vec![row(&["870321", "2024-02-01", "0.12", "0.46"])],
        );
        MemoryWorkbook::new()
            .with_sheet(ligie)
            .with_sheet(hts)
            .with_sheet(participation)
            .with_sheet(tariffs)
    }

    fn dashboard() -> Dashboard {
        Dashboard::with_source(Config::default(), Box::new(workbook()))
    }

    #[test]
    fn test_end_to_end_query() {
        let dashboard = dashboard();
        assert!(!dashboard.is_loaded());

        let result = dashboard.query("870321").unwrap();
        assert!(dashboard.is_loaded());

        let origin = result.origin.found().unwrap();
        assert_eq!(origin.average, Some(10.0));
        assert_eq!(origin.hierarchy.heading, "N/A");

        let destination = result.destination.found().unwrap();
        assert_eq!(destination.lines.len(), 1);
        assert_eq!(destination.lines[0].total, Rate::Value(22.5));

        let history = result.history.found().unwrap();
        assert_eq!(history.participation_periods, 12);
        assert_eq!(history.share_series.len(), 14);

        let table = dashboard.summary_table(&result).unwrap();
        assert_eq!(table.rows[0][0], "Último Dato (February 2024)");
        assert_eq!(table.rows[0][2], "50.00%");
        assert_eq!(table.rows[0][3], "12.00%");
        assert_eq!(table.rows[0][6], "46.00%");
    }

    #[test]
    fn test_destination_only_code() {
        let result = dashboard().query("040120").unwrap();
        assert!(!result.origin.is_found());
        assert!(result.destination.is_found());
        assert!(!result.history.is_found());
    }

    #[test]
    fn test_blank_code_not_found() {
        let mut workbook = workbook();
        workbook.insert(RawSheet::new(
            "LIGIE",
            headers(&["HS6 México", "Descripción HS6", "HS8 México", "Descripción HS8", "LIGIE"]),
            vec![
                row(&["", "Capítulo 87", "", "", ""]),
                row(&["870321", "Automóviles", "87032101", "Nuevos", "20%"]),
            ],
        ));
        let dashboard = Dashboard::with_source(Config::default(), Box::new(workbook));

        let result = dashboard.query("   ").unwrap();
        assert!(!result.origin.is_found());
        assert!(!result.destination.is_found());
        assert!(!result.history.is_found());
        assert_eq!(dashboard.query("870321").unwrap().origin.found().unwrap().lines.len(), 1);
    }

    #[test]
    fn test_unknown_code_is_not_an_error() {
        let dashboard = dashboard();
        let result = dashboard.query("999999").unwrap();
        assert!(!result.origin.is_found());
        assert!(dashboard.summary_table(&result).is_none());
    }

    #[test]
    fn test_failed_load_halts_session() {
        let dashboard = Dashboard::with_source(Config::default(), Box::new(MemoryWorkbook::new()));
        assert!(matches!(dashboard.query("870321"), Err(Error::MissingSheet(_))));
        assert!(matches!(dashboard.query("870321"), Err(Error::LoadHalted(_))));
    }

    #[test]
    fn test_reload() {
        let dashboard = dashboard();
        dashboard.query("870321").unwrap();
        dashboard.reload().unwrap();
        assert!(dashboard.query("870321").unwrap().origin.is_found());
    }
}
