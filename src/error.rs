use std::path::PathBuf;

use thiserror::Error;

/// Failures loading country metadata or outlines
#[derive(Error, Debug)]
pub enum GeoDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid country metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("invalid GeoJSON in {path}: {message}")]
    GeoJson { path: PathBuf, message: String },

    #[error("no playable countries after merging metadata and outlines")]
    Empty,
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("geographic data unavailable: {0}")]
    DataUnavailable(#[from] GeoDataError),

    #[error("no countries available for quiz")]
    NoCountries,

    #[error("question count must be between 1 and {max}, got {got}")]
    InvalidQuestionCount { got: usize, max: usize },
}
