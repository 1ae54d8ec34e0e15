//! Error types for the package crate.

use miette::Diagnostic;
use takup_utils::error::{FileSystemError, HashError};
use thiserror::Error;

/// Errors that can occur while reading a package.
#[derive(Error, Diagnostic, Debug)]
pub enum PackageError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(takup_package::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(
        code(takup_package::zip),
        help("Make sure the file is a complete, uncorrupted APK")
    )]
    Zip(#[from] zip::result::ZipError),

    #[error("Entry `{entry}` not found in package")]
    #[diagnostic(code(takup_package::missing_entry))]
    MissingEntry { entry: String },

    #[error("Malformed binary resource: {0}")]
    #[diagnostic(code(takup_package::malformed))]
    MalformedChunk(String),

    #[error("Manifest does not declare a package name")]
    #[diagnostic(code(takup_package::missing_package))]
    MissingPackage,

    #[error(transparent)]
    #[diagnostic(code(takup_package::filesystem))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(takup_package::hash))]
    Hash(#[from] HashError),
}

/// A specialized Result type for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            PackageError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

pub(crate) fn malformed(message: impl Into<String>) -> PackageError {
    PackageError::MalformedChunk(message.into())
}
