//! Error types for Z21 container operations.
//!
//! This module provides the [`Error`] enum which represents every failure
//! that can escape a parse or write call, along with a convenient
//! [`Result<T>`] type alias.
//!
//! Not every problem surfaces here. A file that is not a ZIP archive and a
//! broken XML payload are both recovered locally and reported through
//! [`ParseOutcome::Fallback`](crate::ParseOutcome::Fallback) instead. What
//! remains are failures with no safe partial result: I/O, archive member
//! corruption, and queries against an SQLite payload whose schema does not
//! match.
//!
//! # Example
//!
//! ```rust,no_run
//! use z21cfg::{Container, Error};
//!
//! fn load(path: &str) -> z21cfg::Result<()> {
//!     let container = Container::open(path)?;
//!     match container.parse() {
//!         Ok(outcome) => {
//!             println!("{} locomotives", outcome.config().locomotives.len());
//!             Ok(())
//!         }
//!         Err(Error::Database(e)) => {
//!             eprintln!("Unexpected database layout: {}", e);
//!             Err(Error::Database(e))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```

use std::io;

/// The main error type for Z21 container operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Container | [`Zip`][Self::Zip], [`MissingPayload`][Self::MissingPayload] | Damaged or unexpected archive |
/// | Payload | [`Database`][Self::Database] | SQLite schema does not match |
/// | Compatibility | [`UnsupportedFeature`][Self::UnsupportedFeature] | XML write-back |
/// | Model | [`InvalidFunctionNumber`][Self::InvalidFunctionNumber], [`InvalidValue`][Self::InvalidValue], [`FunctionNotFound`][Self::FunctionNotFound] | Bad edits |
/// | Resources | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | Oversized payload |
/// | Identity | [`UnresolvedLocomotives`][Self::UnresolvedLocomotives] | Strict write mode |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The ZIP container could not be read or written.
    ///
    /// Opening a file that is not a ZIP archive at all never produces this
    /// error during parsing; that case falls back to an unknown block. It is
    /// returned when a member is damaged, or when the writer cannot open the
    /// original container.
    #[error("ZIP container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A query against the SQLite payload failed.
    ///
    /// The reader does not validate the schema up front, so a missing table
    /// or column shows up here and aborts the whole parse.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The requested operation is not supported for this container.
    ///
    /// Writing back a container whose payload is XML is the main example.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// The container has no `.sqlite` or `.xml` member to write back into.
    #[error("Container has no locomotive payload member")]
    MissingPayload,

    /// A function number outside `0..=127` was used in an edit.
    #[error("Invalid function number {number}: must be between 0 and 127")]
    InvalidFunctionNumber {
        /// The rejected function number.
        number: u32,
    },

    /// No function with the given number exists on the locomotive.
    #[error("Function F{number} not found")]
    FunctionNotFound {
        /// The missing function number.
        number: u8,
    },

    /// A model value could not be encoded for the backing store.
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue {
        /// The field that holds the value.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// A resource limit was exceeded.
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// Some locomotives could not be matched to a stored row.
    ///
    /// Only returned when [`WriteOptions::strict_identity`] is enabled;
    /// by default unresolved locomotives are skipped and listed in the
    /// [`WriteResult`].
    ///
    /// [`WriteOptions::strict_identity`]: crate::write::WriteOptions::strict_identity
    /// [`WriteResult`]: crate::write::WriteResult
    #[error("{count} locomotive(s) could not be matched to a stored vehicle: {}", names.join(", "))]
    UnresolvedLocomotives {
        /// Number of unresolved locomotives.
        count: usize,
        /// Display names of the unresolved locomotives.
        names: Vec<String>,
    },
}

impl Error {
    /// Returns `true` if retrying the same call might succeed.
    ///
    /// Only transient I/O errors qualify.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Returns `true` if this error comes from the SQLite payload.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Database(_))
    }

    /// Returns `true` if the operation is not supported for this container.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFeature { .. } | Error::MissingPayload
        )
    }

    /// Creates an InvalidValue error.
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

/// A specialized Result type for Z21 container operations.
pub type Result<T> = std::result::Result<T, Error>;
