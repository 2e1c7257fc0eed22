//! fuse-opgee - OPGEE workbook to OPGEE v4 configuration converter
//!
//! This library reads the field columns of an OPGEE 3.0c "Inputs" sheet,
//! turns each into a parameter record, and merges the records into an OPGEE v4
//! XML configuration document.
//!
//! # Pipeline
//!
//! - [`excel::RangeExtractor`] pulls each column's rows according to the [`schema::RowSchema`]
//! - [`core::FieldAssembler`] names the values, floors GOR/WOR, drops unused rows
//!   and applies the [`core::ConversionTable`]
//! - [`document::DocumentMerger`] updates the analysis settings and swaps in the
//!   fresh Field elements
//! - [`document::save`] writes the canonical XML, [`export`] the name/API CSV
//!
//! # Example
//!
//! ```no_run
//! use fuse_opgee::pipeline::{Pipeline, RunOptions};
//! use std::path::PathBuf;
//!
//! let report = Pipeline::new().run(&RunOptions {
//!     workbook: PathBuf::from("OPGEE_3.0c_Test.xlsm"),
//!     document: PathBuf::from("fuse.xml"),
//!     names_csv: None,
//!     dry_run: false,
//! })?;
//!
//! println!("Fields: {}", report.fields.len());
//! # Ok::<(), fuse_opgee::error::FuseError>(())
//! ```

pub mod cli;
pub mod core;
pub mod document;
pub mod error;
pub mod excel;
pub mod export;
pub mod pipeline;
pub mod project;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use error::{FuseError, FuseResult};
pub use pipeline::{Pipeline, RunOptions, RunReport};
pub use types::{CellValue, FieldRecord, ParamValue, SelectorWarning};
