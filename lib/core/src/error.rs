use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Corrupt store {}: {reason}", .path.display())]
    CorruptFormat { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {}: {source}", .path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Proposed record has an empty value for column '{0}'")]
    MissingField(String),
}

/// Stable failure classes, so pipelines can branch without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    CorruptFormat,
    Io,
    MissingField,
}

impl ErrorKind {
    /// Process exit status for this failure. `1` is reserved for a
    /// near-duplicate rejection, `0` for success.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::CorruptFormat => 4,
            ErrorKind::Io => 5,
            ErrorKind::MissingField => 6,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::CorruptFormat { .. } => ErrorKind::CorruptFormat,
            Error::Io(_) | Error::PathIo { .. } => ErrorKind::Io,
            Error::MissingField(_) => ErrorKind::MissingField,
        }
    }

    /// I/O failure while touching `path`.
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::PathIo {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
