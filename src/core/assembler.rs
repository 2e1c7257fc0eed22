//! Field assembly - raw column values → named parameter record

use crate::core::ConversionTable;
use crate::schema::{RowSchema, REMOVED_PARAMETERS};
use crate::types::{CellValue, FieldRecord, ParamValue, SelectorWarning};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Value substituted for a zero or non-numeric GOR/WOR.
/// OPGEE divides by both ratios, so they must never be written as zero.
pub const RATIO_FLOOR: &str = "0.00001";

/// Parameters subject to the ratio floor
const FLOORED_RATIOS: &[&str] = &["GOR", "WOR"];

/// Synthetic names count up from here: "Field 501", "Field 502", ...
const SYNTHETIC_NAME_BASE: u32 = 500;

/// Mutable state scoped to a single conversion run
#[derive(Debug, Default)]
pub struct RunContext {
    unnamed_columns: u32,
    synthesized: Vec<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field display name for a header cell, synthesizing one when it is missing
    pub fn resolve_name(&mut self, header: &CellValue) -> String {
        if !header.is_missing() {
            return header.to_string();
        }
        self.unnamed_columns += 1;
        let name = format!("Field {}", SYNTHETIC_NAME_BASE + self.unnamed_columns);
        warn!(name = %name, "header cell empty, synthesized field name");
        self.synthesized.push(name.clone());
        name
    }

    /// Names synthesized so far, in order
    pub fn synthesized(&self) -> &[String] {
        &self.synthesized
    }
}

/// A finished record plus what the converter had to say about it
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledField {
    pub record: FieldRecord,
    pub warnings: Vec<SelectorWarning>,
}

/// Builds field records from extracted column values
pub struct FieldAssembler<'a> {
    schema: &'a RowSchema,
    conversions: &'a ConversionTable,
}

impl<'a> FieldAssembler<'a> {
    pub fn new(schema: &'a RowSchema, conversions: &'a ConversionTable) -> Self {
        Self {
            schema,
            conversions,
        }
    }

    /// Assemble one column. Returns `None` when every value is missing.
    ///
    /// Selector slots are lifted out first; the remaining values map onto the
    /// scalar parameter names by position. When the counts differ only the
    /// overlapping prefix is kept.
    pub fn assemble(&self, name: String, raw: &[CellValue]) -> Option<AssembledField> {
        if raw.iter().all(CellValue::is_missing) {
            debug!(field = %name, "all values missing, skipping column");
            return None;
        }

        let slots = self.schema.selectors();
        let mut selector_positions = HashSet::new();
        let mut selectors = Vec::with_capacity(slots.len());
        for slot in &slots {
            let flags: Vec<CellValue> = raw
                .iter()
                .skip(slot.offset)
                .take(slot.width)
                .cloned()
                .collect();
            selector_positions.extend(slot.offset..slot.offset + slot.width);
            selectors.push((slot.name.as_str(), flags));
        }

        let mut flat = raw
            .iter()
            .enumerate()
            .filter(|(i, _)| !selector_positions.contains(i))
            .map(|(_, cell)| cell);

        let scalar_count = self.schema.scalar_names().len();
        let flat_count = raw.len()
            - selector_positions
                .iter()
                .filter(|&&i| i < raw.len())
                .count();
        if flat_count != scalar_count {
            warn!(
                field = %name,
                values = flat_count,
                parameters = scalar_count,
                "value count does not match schema, keeping the overlapping prefix"
            );
        }

        let mut record = FieldRecord::new(name);
        for param in self.schema.parameter_names() {
            if let Some((_, flags)) = selectors.iter().find(|(n, _)| *n == param) {
                record.insert(param, ParamValue::Selector(flags.clone()));
                continue;
            }
            if let Some(cell) = flat.next() {
                let value = if FLOORED_RATIOS.contains(&param) {
                    floor_ratio(&cell.to_param_string())
                } else {
                    cell.to_param_string()
                };
                record.insert(param, ParamValue::Scalar(value));
            }
        }

        for param in REMOVED_PARAMETERS {
            record.remove(param);
        }

        let warnings = self.conversions.apply(&mut record);
        debug!(field = %record.name, params = record.len(), "assembled field");

        Some(AssembledField { record, warnings })
    }
}

/// Keep a ratio if it is a non-zero number, otherwise use [`RATIO_FLOOR`]
pub fn floor_ratio(value: &str) -> String {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed != 0.0 => value.to_string(),
        _ => RATIO_FLOOR.to_string(),
    }
}
