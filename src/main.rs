use clap::{ArgGroup, Parser, Subcommand};
use fuse_opgee::cli::{self, WorkbookSource};
use fuse_opgee::error::{FuseError, FuseResult};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fuse-opgee")]
#[command(about = "Convert the OPGEE Inputs workbook into the OPGEE v4 field configuration XML")]
#[command(long_about = "fuse-opgee - OPGEE 3.0c workbook → OPGEE v4 fields

Reads every field column of the 'Inputs' sheet, converts coded values to
their OPGEE v4 labels, and rewrites the configuration document: the
FUSE_run analysis is updated, every <Field modifies=\"template\"> is rebuilt
from the workbook, and fields no longer in the workbook are removed.

COMMANDS:
  convert       - Workbook → configuration document (+ optional name/API CSV)
  export-names  - Regenerate the name/API CSV from an existing document

EXAMPLES:
  fuse-opgee convert --workbook OPGEE_3.0c_Test.xlsm --document fuse.xml
  fuse-opgee convert --project-file project_name.txt --workbook-dir data \\
      --document fuse.xml --names-csv field_name_api.csv
  fuse-opgee export-names fuse.xml field_name_api.csv

Set RUST_LOG (e.g. RUST_LOG=fuse_opgee=debug) for detailed logs.")]
#[command(version)]
struct Cli {
    /// Show progress logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Convert the workbook into the configuration document.

The workbook is given directly with --workbook, or resolved from a project
name file: the file's text (whitespace removed) names
<workbook-dir>/OPGEE_3.0c_<project>.xlsm.

A missing or empty document is created from scratch. The document is
overwritten in place; use --dry-run to see what would change.")]
    /// Convert the workbook into the configuration document
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["workbook", "project_file"])
    ))]
    Convert {
        /// Path to the OPGEE workbook (.xlsm/.xlsx)
        #[arg(short, long, env = "FUSE_WORKBOOK")]
        workbook: Option<PathBuf>,

        /// Text file holding the project name
        #[arg(short, long, env = "FUSE_PROJECT_FILE")]
        project_file: Option<PathBuf>,

        /// Directory holding OPGEE_3.0c_<project>.xlsm
        #[arg(long, env = "FUSE_WORKBOOK_DIR", default_value = ".")]
        workbook_dir: PathBuf,

        /// Configuration document to update
        #[arg(short, long, env = "FUSE_DOCUMENT")]
        document: PathBuf,

        /// Also write field names and API gravity to this CSV file
        #[arg(long, env = "FUSE_NAMES_CSV")]
        names_csv: Option<PathBuf>,

        /// Run everything but write nothing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Write field names and API gravity from a document to CSV
    ExportNames {
        /// Configuration document to read
        document: PathBuf,

        /// Output CSV file
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fuse_opgee=info"
    } else {
        "fuse_opgee=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> FuseResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            workbook,
            project_file,
            workbook_dir,
            document,
            names_csv,
            dry_run,
        } => {
            let source = match (workbook, project_file) {
                (Some(path), _) => WorkbookSource::Path(path),
                (None, Some(file)) => WorkbookSource::Project {
                    file,
                    dir: workbook_dir,
                },
                (None, None) => {
                    return Err(FuseError::Project(
                        "either --workbook or --project-file is required".to_string(),
                    ))
                }
            };
            cli::convert(source, document, names_csv, dry_run, cli.verbose)
        }

        Commands::ExportNames { document, output } => cli::export_names(document, output),
    }
}
