//! Export error types

use ledgerdesk_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;

impl From<ExportError> for CoreError {
    fn from(error: ExportError) -> Self {
        CoreError::Export {
            message: error.to_string(),
        }
    }
}
