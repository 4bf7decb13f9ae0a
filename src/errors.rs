//! Errors for the parts of the crate that touch the outside world: loading word lists, parsing
//! grid templates, and writing puzzles. Failing to fill a grid is not an error in this sense; see
//! [`crate::fill::FillFailure`] for that.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("grid template has no rows")]
    EmptyTemplate,

    #[error("grid template row {row} has {found} cells, expected {expected}")]
    RaggedTemplate { row: usize, expected: usize, found: usize },

    #[error("grid template row {row}, column {column}: {letter:?} doesn't fit in a single cell")]
    UnsupportedLetter { row: usize, column: usize, letter: char },

    #[error("could not serialize puzzle: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }
}
