//! Custom error types and result handling for Tankobon operations.
//!
//! All fallible operations return a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`.
//!
//! Errors fall into three groups. [`Error::MalformedChapterName`] is the only
//! recoverable one: the collector records it and moves on. Precondition
//! failures ([`Error::MissingConfig`], [`Error::InvalidConfig`],
//! [`Error::NotFound`], [`Error::InvalidPath`]) are raised before anything on
//! disk is touched. Everything else aborts the run where it happens and
//! leaves partial output behind.
use std::path::PathBuf;

/// Type alias for Results with Tankobon errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Tankobon operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// Regular expression compilation errors
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// Failure to read a persisted XML document
    #[error(transparent)]
    XmlRead(#[from] quick_xml::de::DeError),
    /// Failure to serialize an XML document
    #[error(transparent)]
    XmlWrite(#[from] quick_xml::se::SeError),
    #[error(transparent)]
    VolumeBuilder(#[from] crate::volume::VolumeConfigBuilderError),
    /// A chapter file name that does not follow `<series> <number>`.
    /// Recoverable: the file is skipped.
    #[error("Malformed chapter name '{name}': {reason}")]
    MalformedChapterName { name: String, reason: String },
    /// A chapter archive that could not be opened as a ZIP container
    #[error("Cannot open chapter archive '{0:?}': {1}")]
    InvalidArchive(PathBuf, zip::result::ZipError),
    /// The persisted series configuration is absent
    #[error("Configuration '{0:?}' not found. Run `tankobon init` first.")]
    MissingConfig(PathBuf),
    /// Configuration values that make a run impossible
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for failed blocking tasks
    #[error("Asynchronous task failed: {0}")]
    AsyncTaskError(String),
    /// Error for resources that couldn't be found (e.g., source directory)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether the run may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MalformedChapterName { .. })
    }
}

/// A blocking task that panicked or was cancelled.
impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Error::AsyncTaskError(error.to_string())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}
