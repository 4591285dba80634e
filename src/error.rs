use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dicomcompare operations.
///
/// Only problems that stop a run before or outside the comparison itself end
/// up here; everything found while comparing is recorded in the results.
#[derive(Debug, Error)]
pub enum DicomCompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to extract archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to open DICOM file {path}: {source}")]
    DicomOpen {
        path: PathBuf,
        #[source]
        source: Box<dicom_object::ReadError>,
    },

    #[error("Failed to write CSV report to {path}: {source}")]
    ReportCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write JSON report to {path}: {source}")]
    ReportJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported report format: {0}")]
    UnsupportedReportFormat(String),

    #[error("At least two files are required for comparison, got {0}")]
    NotEnoughFiles(usize),
}
