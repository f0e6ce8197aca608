//! # Workbook Reading Module
//!
//! Decodes `.xlsx` workbooks (a zip container of SpreadsheetML parts) into an
//! in-memory [`Grid`] of the active worksheet. Besides cell values the reader
//! resolves each cell's style index to its background [`Fill`], which the
//! timetable classifier uses to tell delivery modes apart.
use crate::error::TimetableError;
use crate::helpers::reader::UnifiedReader;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use tracing::info;

pub(crate) mod cell;
pub(crate) mod grid;
pub(crate) mod reference;
pub(crate) mod styles;
pub(crate) mod xlsx;

pub use cell::Cell;
pub use cell::CellValue;
pub use grid::Grid;
pub use styles::Fill;
pub use styles::FillColor;
pub use styles::Styles;
pub use xlsx::Workbook;

/// Errors describing a structurally invalid workbook.
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Missing workbook part '{0}'")]
    FileError(String),

    #[error("Workbook '{0}' has no worksheets")]
    WorkbookEmptyError(String),

    #[error("Workbook '{0}' has no sheet at index {1}")]
    SheetNotFoundError(String, usize),

    #[error("Cell {0} refers to missing shared string {1}")]
    SharedStringError(String, usize),
}

/// Loads the active worksheet of the workbook at `location` (path or http(s) URL).
pub fn load_active_grid(location: &str, timeout: Duration) -> Result<Grid, TimetableError> {
    let reader = UnifiedReader::new(location, timeout)?;
    let mut workbook = Workbook::open(location, reader)?;
    debug!(workbook = location, sheets = ?workbook.sheet_names(), active = workbook.active_sheet_name(), "reading active sheet");
    let grid = workbook.read_active_sheet()?;
    info!(workbook = location, sheet = %grid.name, rows = grid.max_row(), "loaded timetable sheet");
    Ok(grid)
}

/// Loads the active worksheet from workbook bytes supplied by the caller.
pub fn load_active_grid_from_bytes(name: &str, bytes: Vec<u8>) -> Result<Grid, TimetableError> {
    let mut workbook = Workbook::open(name, UnifiedReader::from_bytes(bytes))?;
    workbook.read_active_sheet()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::xlsx::fixture;

    #[test]
    fn loads_grid_from_bytes() {
        let bytes = fixture::workbook(&[("Лист1", vec![fixture::shared("D6", "ИС25")])], 0);
        let grid = load_active_grid_from_bytes("bytes.xlsx", bytes).unwrap();
        assert_eq!(grid.file_name, "bytes.xlsx");
        assert_eq!(grid.text(6, 4).as_deref(), Some("ИС25"));
    }

    #[test]
    fn loads_grid_from_file() {
        let bytes = fixture::workbook(&[("Лист1", vec![fixture::shared("A7", "Вторник")])], 0);
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), bytes).unwrap();
        let location = file.path().to_string_lossy().to_string();
        let grid = load_active_grid(&location, Duration::from_secs(1)).unwrap();
        assert_eq!(grid.text(7, 1).as_deref(), Some("Вторник"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_active_grid("does/not/exist.xlsx", Duration::from_secs(1)).is_err());
    }
}
