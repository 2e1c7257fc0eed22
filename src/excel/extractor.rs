//! Range extraction - one sheet column → ordered raw values

use crate::error::{FuseError, FuseResult};
use crate::excel::InputSheet;
use crate::schema::{RowSchema, SheetLayout};
use crate::types::CellValue;
use std::ops::Range;

/// Raw cells of one column, in schema order
pub type RawFieldValues = Vec<CellValue>;

/// Pulls schema rows out of the Inputs sheet
pub struct RangeExtractor<'a> {
    schema: &'a RowSchema,
    layout: &'a SheetLayout,
}

impl<'a> RangeExtractor<'a> {
    pub fn new(schema: &'a RowSchema, layout: &'a SheetLayout) -> Self {
        Self { schema, layout }
    }

    /// Fail when the sheet ends before the last schema row
    pub fn check_bounds(&self, sheet: &InputSheet) -> FuseResult<()> {
        let last_row = sheet
            .last_row()
            .ok_or_else(|| FuseError::EmptySheet(sheet.name().to_string()))?;
        let needed = self.layout.sheet_row(self.schema.last_row());
        if needed > last_row {
            return Err(FuseError::RangeOutOfBounds {
                row: needed,
                last_row,
            });
        }
        Ok(())
    }

    /// Field columns present on the sheet
    pub fn columns(&self, sheet: &InputSheet) -> Range<u32> {
        match sheet.last_column() {
            Some(last) if last >= self.layout.first_data_column => {
                self.layout.first_data_column..last + 1
            }
            _ => 0..0,
        }
    }

    /// Header cell holding the field's display name
    pub fn display_name(&self, sheet: &InputSheet, col: u32) -> CellValue {
        sheet.cell(self.layout.sheet_row(self.layout.name_row), col)
    }

    /// Concatenate the cells of every schema range in `col`.
    ///
    /// The result always has `schema.row_count()` entries; absent cells are
    /// `CellValue::Missing`. Callers run [`Self::check_bounds`] once per sheet
    /// first.
    pub fn extract(&self, sheet: &InputSheet, col: u32) -> RawFieldValues {
        let mut values = Vec::with_capacity(self.schema.row_count());
        for range in self.schema.ranges() {
            for row in range.rows() {
                values.push(sheet.cell(self.layout.sheet_row(row), col));
            }
        }
        values
    }
}
