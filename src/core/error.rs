use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading region records or configuration.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("negative geometry in {path} (row {row}): width={width}, height={height}")]
    NegativeGeometry {
        path: PathBuf,
        row: usize,
        width: i64,
        height: i64,
    },

    #[error("malformed annotation {path}: {source}")]
    Annotation {
        path: PathBuf,
        #[source]
        source: crate::source::annotation_xml::AnnotationError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
