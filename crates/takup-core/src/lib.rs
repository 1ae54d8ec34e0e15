use error::BuildError;

pub mod archive;
pub mod batch;
pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod manifest;
pub mod record;

pub use batch::{run_build, BuildSummary};
pub use config::{BuildConfig, FileConfig};

pub type BuildResult<T> = std::result::Result<T, BuildError>;
