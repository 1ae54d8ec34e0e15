//! Error types for takup-core.

use std::path::PathBuf;

use miette::Diagnostic;
use takup_utils::error::FileSystemError;
use thiserror::Error;

/// Errors that abort a build.
///
/// Per-package failures never surface here; they are logged and the package
/// is skipped.
#[derive(Error, Diagnostic, Debug)]
pub enum BuildError {
    #[error("No package files found in {}", dir.display())]
    #[diagnostic(
        code(takup::no_packages),
        help("Point takup at the directory holding the APKs to publish")
    )]
    NoPackagesFound { dir: PathBuf },

    #[error("None of the {attempted} package file(s) in {} could be read", dir.display())]
    #[diagnostic(
        code(takup::no_records),
        help("Re-run with -v to see why each package was rejected")
    )]
    NoRecordsBuilt { dir: PathBuf, attempted: usize },

    #[error("Error while {action}")]
    #[diagnostic(code(takup::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(takup::archive))]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid configuration file: {0}")]
    #[diagnostic(code(takup::config), help("Check your configuration syntax"))]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(takup::invalid_config))]
    InvalidConfig(String),

    #[error(transparent)]
    #[diagnostic(code(takup::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    #[diagnostic(code(takup::filesystem))]
    FileSystem(#[from] FileSystemError),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, BuildError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, BuildError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            BuildError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
