//! Workbook importer - Excel (.xlsx/.xlsm) → in-memory Inputs sheet

use crate::error::{FuseError, FuseResult};
use crate::types::CellValue;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads the Inputs sheet of an OPGEE workbook
pub struct InputsImporter {
    path: PathBuf,
}

impl InputsImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the named sheet in full
    pub fn import(&self, sheet_name: &str) -> FuseResult<InputSheet> {
        if !self.path.exists() {
            return Err(FuseError::Workbook(format!(
                "workbook not found: {}",
                self.path.display()
            )));
        }

        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            FuseError::Workbook(format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(FuseError::MissingSheet(sheet_name.to_string()));
        }

        let cells = workbook.worksheet_range(sheet_name)?;
        info!(
            workbook = %self.path.display(),
            sheet = sheet_name,
            "loaded sheet"
        );
        debug!(start = ?cells.start(), end = ?cells.end(), "sheet extent");

        Ok(InputSheet::new(sheet_name, cells))
    }
}

/// A fully loaded worksheet addressed by absolute 0-based coordinates
#[derive(Debug, Clone)]
pub struct InputSheet {
    name: String,
    cells: Range<Data>,
}

impl InputSheet {
    pub fn new(name: impl Into<String>, cells: Range<Data>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell at an absolute position; cells outside the used area are missing
    pub fn cell(&self, row: u32, col: u32) -> CellValue {
        self.cells
            .get_value((row, col))
            .map(CellValue::from)
            .unwrap_or(CellValue::Missing)
    }

    /// Last used row, if the sheet has any cells
    pub fn last_row(&self) -> Option<u32> {
        self.cells.end().map(|(row, _)| row)
    }

    /// Last used column, if the sheet has any cells
    pub fn last_column(&self) -> Option<u32> {
        self.cells.end().map(|(_, col)| col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(cells: &[((u32, u32), Data)], end: (u32, u32)) -> InputSheet {
        let mut range = Range::new((0, 0), end);
        for (pos, value) in cells {
            range.set_value(*pos, value.clone());
        }
        InputSheet::new("Inputs", range)
    }

    #[test]
    fn test_cell_lookup_absolute() {
        let sheet = sheet_with(
            &[
                ((4, 7), Data::String("Alpha".to_string())),
                ((8, 7), Data::Float(1.0)),
            ],
            (10, 8),
        );
        assert_eq!(sheet.cell(4, 7), CellValue::Text("Alpha".to_string()));
        assert_eq!(sheet.cell(8, 7), CellValue::Number(1.0));
        assert_eq!(sheet.cell(9, 7), CellValue::Missing);
        // Outside the used range
        assert_eq!(sheet.cell(50, 50), CellValue::Missing);
        assert_eq!(sheet.last_row(), Some(10));
        assert_eq!(sheet.last_column(), Some(8));
    }

    #[test]
    fn test_import_missing_file() {
        let importer = InputsImporter::new("does-not-exist.xlsm");
        let result = importer.import("Inputs");
        assert!(matches!(result, Err(FuseError::Workbook(_))));
    }
}
