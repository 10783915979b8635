use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoadError>;

/// Coarse classification of a [`LoadError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    InvalidFormat,
    BoundsExceeded,
    CapacityExceeded,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed document: {0}")]
    Parse(String),

    #[error("{context} is missing required field '{field}'")]
    MissingField {
        context: String,
        field: &'static str,
    },

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("{what}: range {offset}+{length} exceeds {limit} bytes")]
    BoundsExceeded {
        what: String,
        offset: usize,
        length: usize,
        limit: usize,
    },

    #[error("too many {kind}: {count} exceeds the configured maximum of {max}")]
    CapacityExceeded {
        kind: &'static str,
        count: usize,
        max: usize,
    },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Io { .. } => ErrorKind::Io,
            LoadError::Json { .. } | LoadError::Parse(_) | LoadError::MissingField { .. } => {
                ErrorKind::Parse
            }
            LoadError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            LoadError::BoundsExceeded { .. } => ErrorKind::BoundsExceeded,
            LoadError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
        }
    }

    pub(crate) fn missing(context: impl Into<String>, field: &'static str) -> Self {
        LoadError::MissingField {
            context: context.into(),
            field,
        }
    }
}

/// Fails with `CapacityExceeded` when `count` is over `max`.
pub fn check_capacity(kind: &'static str, count: usize, max: usize) -> Result<()> {
    if count > max {
        return Err(LoadError::CapacityExceeded { kind, count, max });
    }
    Ok(())
}
