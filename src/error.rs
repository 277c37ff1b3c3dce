use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads its configuration, reads source workbooks, or writes the merged
/// destination.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the YAML configuration cannot be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Raised when the column filter is not a valid regular expression.
    #[error("invalid column filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors raised while opening the zip container of an xlsx workbook.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Errors raised while scanning workbook XML parts.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Raised when a workbook does not follow the expected package layout.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a workbook does not contain any sheet to copy from.
    #[error("workbook has no sheets: {0}")]
    EmptyWorkbook(PathBuf),

    /// Raised when copying a sheet would exceed the xlsx grid.
    #[error("sheet limit exceeded: {0}")]
    SheetLimit(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
