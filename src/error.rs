use thiserror::Error;

pub type FuseResult<T> = Result<T, FuseError>;

#[derive(Error, Debug)]
pub enum FuseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("Sheet '{0}' has no cells")]
    EmptySheet(String),

    #[error("Row range out of bounds: schema needs sheet row {row}, last row is {last_row}")]
    RangeOutOfBounds { row: u32, last_row: u32 },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Project file error: {0}")]
    Project(String),
}

impl From<roxmltree::Error> for FuseError {
    fn from(err: roxmltree::Error) -> Self {
        FuseError::Xml(err.to_string())
    }
}

impl From<calamine::Error> for FuseError {
    fn from(err: calamine::Error) -> Self {
        FuseError::Workbook(err.to_string())
    }
}
