//! Field record assembly and code-to-label conversion

pub mod assembler;
pub mod converter;

pub use assembler::{AssembledField, FieldAssembler, RunContext, RATIO_FLOOR};
pub use converter::ConversionTable;
