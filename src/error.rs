//! Error types shared by the page pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A string that cannot be used as a page title
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TitleError {
    #[error("page title is empty")]
    Empty,
    #[error("page title {0:?} contains characters other than ASCII letters and digits")]
    InvalidCharacter(String),
}

/// Failure reading or writing a page
#[derive(Debug, Error)]
pub enum StoreError {
    /// No persisted content exists for the title
    #[error("page {title} not found")]
    NotFound { title: String },
    #[error("storage failure for page {title} at {}: {source}", path.display())]
    Io {
        title: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure loading or executing a template
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}
