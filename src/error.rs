//! The public error type for the ledger library and CLI.
//!
//! Internally, fallible plumbing (file IO, JSON, config parsing) is written against
//! `anyhow::Result` so that context can be attached freely. At the public boundary those errors
//! are tagged with an `ErrorType` using `IntoResult::pub_result`.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The result type returned by public functions of this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A broad category for an `Error`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The ledger home directory or its configuration file is missing or malformed.
    Config,
    /// The data file could not be read, parsed or written.
    Store,
    /// User input could not be turned into a well-formed transaction or event.
    Validation,
    /// An event or transaction that was required to exist does not.
    NotFound,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error with a category. The underlying error, including its context chain, is held as an
/// `anyhow::Error`.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, error: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: error.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Attempts to downcast the underlying error to a concrete type, e.g. `ValidationErrors`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::new(ErrorType::Internal, e)
    }
}

impl From<crate::model::ValidationErrors> for Error {
    fn from(e: crate::model::ValidationErrors) -> Self {
        Error::new(ErrorType::Validation, e)
    }
}

/// Converts any result whose error can become an `anyhow::Error` into a public `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

/// Returns an `ErrorType::NotFound` error with the given message.
pub(crate) fn not_found(message: impl Into<String>) -> Error {
    Error::new(ErrorType::NotFound, anyhow::anyhow!(message.into()))
}
