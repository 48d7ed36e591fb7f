//! Error types for dataset loading and role configuration.

use thiserror::Error;

/// Errors that can occur while loading a dataset or a role configuration.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML parse error in a role configuration file.
    #[error("Failed to parse role configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file contains no header row.
    #[error("Dataset has no header row")]
    MissingHeader,

    /// The file contains a header but no data rows.
    #[error("Dataset has no data rows")]
    Empty,

    /// A data row's cell count does not match the header length.
    #[error("Row at line {line} has {actual} cells, expected {expected}")]
    RowArity {
        /// 1-based line number in the source file.
        line: u64,
        /// Header length.
        expected: usize,
        /// Cell count actually found.
        actual: usize,
    },
}
