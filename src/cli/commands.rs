use crate::document::Document;
use crate::error::FuseResult;
use crate::export::export_name_api;
use crate::pipeline::{Pipeline, RunOptions, RunReport};
use crate::project;
use colored::Colorize;
use std::path::PathBuf;

/// Where the workbook comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookSource {
    /// Given directly
    Path(PathBuf),
    /// Named by a project file, found in `dir`
    Project { file: PathBuf, dir: PathBuf },
}

impl WorkbookSource {
    pub fn resolve(&self) -> FuseResult<PathBuf> {
        match self {
            WorkbookSource::Path(path) => Ok(path.clone()),
            WorkbookSource::Project { file, dir } => project::resolve_workbook(file, dir),
        }
    }
}

/// Execute the convert command
pub fn convert(
    source: WorkbookSource,
    document: PathBuf,
    names_csv: Option<PathBuf>,
    dry_run: bool,
    verbose: bool,
) -> FuseResult<()> {
    let workbook = source.resolve()?;

    println!("{}", "🛢  fuse-opgee - Converting workbook".bold().green());
    println!("   Workbook: {}", workbook.display());
    println!("   Document: {}", document.display());
    if let Some(ref csv) = names_csv {
        println!("   Name/API CSV: {}", csv.display());
    }
    println!();

    if dry_run {
        println!(
            "{}",
            "📋 DRY RUN MODE - No changes will be written\n".yellow()
        );
    }

    let options = RunOptions {
        workbook,
        document,
        names_csv,
        dry_run,
    };
    let report = Pipeline::new().run(&options)?;
    print_report(&report, verbose);

    Ok(())
}

fn print_report(report: &RunReport, verbose: bool) {
    println!(
        "{} {} fields",
        "✅ Converted".bold().green(),
        report.fields.len()
    );
    if verbose {
        for name in &report.fields {
            println!("      {}", name.bright_blue());
        }
    }

    if !report.merge.added.is_empty() {
        println!("   Added:    {}", report.merge.added.join(", ").cyan());
    }
    if !report.merge.replaced.is_empty() {
        println!("   Replaced: {} fields", report.merge.replaced.len());
    }
    if !report.merge.removed.is_empty() {
        println!(
            "   Removed:  {}",
            report.merge.removed.join(", ").bright_yellow()
        );
    }
    if !report.synthesized_names.is_empty() {
        println!(
            "   Unnamed columns: {}",
            report.synthesized_names.join(", ").dimmed()
        );
    }
    if verbose && !report.skipped.is_empty() {
        println!("   Empty columns skipped: {}", report.skipped.len());
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{}", "⚠️  Selector warnings:".yellow().bold());
        for warning in &report.warnings {
            println!("   {}", warning.to_string().yellow());
        }
    }

    println!();
    if report.dry_run {
        println!("{}", "📋 Dry run complete - no changes written".yellow());
    } else {
        println!(
            "{}",
            format!("💾 Document written ({} fields exported)", report.exported).green()
        );
    }
}

/// Execute the export-names command
pub fn export_names(document: PathBuf, output: PathBuf) -> FuseResult<()> {
    println!("{}", "📤 fuse-opgee - Exporting names and API".bold().green());
    println!("   Document: {}", document.display());
    println!("   Output:   {}\n", output.display());

    let doc = Document::load(&document)?;
    let rows = export_name_api(&doc, &output)?;

    println!(
        "{}",
        format!("✅ Exported {} field names and API values", rows.len())
            .bold()
            .green()
    );
    Ok(())
}
