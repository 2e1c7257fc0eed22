//! One conversion run: workbook → records → merged document → files

use crate::core::{ConversionTable, FieldAssembler, RunContext};
use crate::document::{self, AnalysisSettings, Document, DocumentMerger, MergeReport};
use crate::error::FuseResult;
use crate::excel::{InputSheet, InputsImporter, RangeExtractor};
use crate::export::NameApiRows;
use crate::schema::{RowSchema, SheetLayout};
use crate::types::{FieldRecord, SelectorWarning};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Everything that defines how a workbook maps onto the document
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub layout: SheetLayout,
    pub schema: RowSchema,
    pub conversions: ConversionTable,
    pub analysis: AnalysisSettings,
}

/// Files touched by a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub workbook: PathBuf,
    pub document: PathBuf,
    pub names_csv: Option<PathBuf>,
    /// Compute everything but write nothing
    pub dry_run: bool,
}

/// Records assembled from one sheet
#[derive(Debug, Clone, Default)]
pub struct AssembledSheet {
    /// One record per distinct field name, in first-seen column order
    pub records: Vec<FieldRecord>,
    /// Columns with no values at all
    pub skipped: Vec<String>,
    pub synthesized_names: Vec<String>,
    pub warnings: Vec<SelectorWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub fields: Vec<String>,
    pub skipped: Vec<String>,
    pub synthesized_names: Vec<String>,
    pub warnings: Vec<SelectorWarning>,
    pub merge: MergeReport,
    /// Number of fields in the name/API export
    pub exported: usize,
    pub dry_run: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn every field column of the sheet into a record
    pub fn assemble_sheet(&self, sheet: &InputSheet) -> FuseResult<AssembledSheet> {
        let mut ctx = RunContext::new();
        let extractor = RangeExtractor::new(&self.schema, &self.layout);
        let assembler = FieldAssembler::new(&self.schema, &self.conversions);
        extractor.check_bounds(sheet)?;

        let mut records: IndexMap<String, FieldRecord> = IndexMap::new();
        let mut out = AssembledSheet::default();

        for col in extractor.columns(sheet) {
            let name = ctx.resolve_name(&extractor.display_name(sheet, col));
            let raw = extractor.extract(sheet, col);
            debug!(column = col, field = %name, "extracted column");

            match assembler.assemble(name.clone(), &raw) {
                Some(field) => {
                    out.warnings.extend(field.warnings);
                    if records.insert(name.clone(), field.record).is_some() {
                        warn!(field = %name, column = col, "duplicate field name, later column wins");
                    }
                }
                None => out.skipped.push(name),
            }
        }

        out.records = records.into_values().collect();
        out.synthesized_names = ctx.synthesized().to_vec();
        info!(
            fields = out.records.len(),
            skipped = out.skipped.len(),
            "assembled field records"
        );
        Ok(out)
    }

    /// Merge records into a loaded document
    pub fn merge(&self, doc: &mut Document, records: &[FieldRecord]) -> MergeReport {
        DocumentMerger::new(self.analysis.clone()).merge(doc, records)
    }

    /// Full run against files on disk
    pub fn run(&self, options: &RunOptions) -> FuseResult<RunReport> {
        let sheet = InputsImporter::new(&options.workbook).import(&self.layout.sheet_name)?;
        let assembled = self.assemble_sheet(&sheet)?;

        let mut doc = Document::load(&options.document)?;
        let merge = self.merge(&mut doc, &assembled.records);

        let rows = NameApiRows::collect(&doc);
        if options.dry_run {
            info!("dry run, nothing written");
        } else {
            if let Some(csv_path) = &options.names_csv {
                rows.write_csv(csv_path)?;
            }
            document::save(&doc, &options.document)?;
        }

        Ok(RunReport {
            fields: assembled.records.iter().map(|r| r.name.clone()).collect(),
            skipped: assembled.skipped,
            synthesized_names: assembled.synthesized_names,
            warnings: assembled.warnings,
            merge,
            exported: rows.len(),
            dry_run: options.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use calamine::{Data, Range};

    /// Blank sheet in the built-in layout with room for `fields` columns plus one
    /// trailing empty column
    fn blank(fields: u32) -> Range<Data> {
        Range::new((0, 0), (114, 7 + fields))
    }

    fn set(range: &mut Range<Data>, field: u32, table_row: u32, value: Data) {
        range.set_value((table_row, 7 + field), value);
    }

    fn header(range: &mut Range<Data>, field: u32, name: &str) {
        set(range, field, 4, Data::String(name.to_string()));
    }

    #[test]
    fn test_assemble_sheet_names_and_skips() {
        let mut range = blank(4);
        header(&mut range, 0, "Alpha");
        set(&mut range, 0, 33, Data::Float(30.0));
        set(&mut range, 1, 33, Data::Float(25.0));
        set(&mut range, 3, 33, Data::Float(20.0));
        let sheet = InputSheet::new("Inputs", range);

        let assembled = Pipeline::new().assemble_sheet(&sheet).unwrap();
        let names: Vec<&str> = assembled.records.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["Alpha", "Field 501", "Field 503"]);
        assert_eq!(assembled.skipped, vec!["Field 502", "Field 504"]);
        assert_eq!(
            assembled.synthesized_names,
            vec!["Field 501", "Field 502", "Field 503", "Field 504"]
        );
        assert_eq!(assembled.records[1].scalar("API"), Some("25"));
    }

    #[test]
    fn test_assemble_sheet_duplicate_names() {
        let mut range = blank(3);
        for (field, (name, api)) in [("Alpha", 1.0), ("Beta", 2.0), ("Alpha", 3.0)]
            .into_iter()
            .enumerate()
        {
            header(&mut range, field as u32, name);
            set(&mut range, field as u32, 33, Data::Float(api));
        }
        let sheet = InputSheet::new("Inputs", range);

        let assembled = Pipeline::new().assemble_sheet(&sheet).unwrap();
        let names: Vec<&str> = assembled.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(assembled.records[0].scalar("API"), Some("3"));
    }

    #[test]
    fn test_assemble_sheet_collects_selector_warnings() {
        let mut range = blank(1);
        header(&mut range, 0, "Alpha");
        set(&mut range, 0, 33, Data::Float(30.0));
        set(&mut range, 0, 95, Data::Float(1.0));
        set(&mut range, 0, 97, Data::Float(1.0));
        let sheet = InputSheet::new("Inputs", range);

        let assembled = Pipeline::new().assemble_sheet(&sheet).unwrap();
        assert_eq!(assembled.warnings.len(), 2);
        assert!(matches!(
            &assembled.warnings[0],
            SelectorWarning::NoneActive { param, .. } if param == "ecosystem_richness"
        ));
        assert!(matches!(
            &assembled.warnings[1],
            SelectorWarning::SeveralActive { param, .. } if param == "field_development_intensity"
        ));

        let record = &assembled.records[0];
        assert_eq!(record.scalar("field_development_intensity"), Some("High"));
        assert_eq!(
            record.get("ecosystem_richness").map(|v| v.to_string()),
            Some("[nan, nan, nan]".to_string())
        );
    }

    #[test]
    fn test_assemble_sheet_too_short() {
        let range: Range<Data> = Range::new((0, 0), (100, 8));
        let sheet = InputSheet::new("Inputs", range);
        assert!(Pipeline::new().assemble_sheet(&sheet).is_err());
    }

    #[test]
    fn test_numeric_header_becomes_name() {
        let mut range = blank(1);
        set(&mut range, 0, 4, Data::Int(77));
        set(&mut range, 0, 33, Data::Float(10.0));
        let sheet = InputSheet::new("Inputs", range);

        let assembled = Pipeline::new().assemble_sheet(&sheet).unwrap();
        assert_eq!(assembled.records[0].name, "77");
        // Only the trailing empty column needed a synthetic name
        assert_eq!(assembled.synthesized_names, vec!["Field 501"]);
        assert_eq!(CellValue::from(&Data::Int(77)).to_string(), "77");
    }
}
