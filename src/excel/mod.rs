//! Excel input for the Inputs sheet
//!
//! - Import: open the workbook and load the Inputs sheet into memory
//! - Extract: pull one column's values according to the row schema

mod extractor;
mod importer;

pub use extractor::{RangeExtractor, RawFieldValues};
pub use importer::{InputSheet, InputsImporter};
