//! Drives a full build: discover packages, read them, assign record ids and
//! write both outputs.

use std::path::{Path, PathBuf};

use rayon::{
    iter::{IntoParallelRefIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use takup_package::{try_read_package, ManifestSource, PackageError, PackageMetadata};
use takup_utils::fs::{list_files_with_extension, write_file};
use tracing::{debug, error, info};

use crate::{
    archive::build_archive,
    config::BuildConfig,
    error::BuildError,
    manifest::render_manifest,
    record::PackageRecord,
    BuildResult,
};

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of package files found.
    pub discovered: usize,
    pub records: Vec<PackageRecord>,
    pub manifest_path: PathBuf,
    pub archive_path: PathBuf,
}

impl BuildSummary {
    /// Packages that were found but could not be read.
    pub fn skipped(&self) -> usize {
        self.discovered - self.records.len()
    }

    pub fn icon_count(&self) -> usize {
        self.records.iter().filter(|record| record.icon.is_some()).count()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Lists the package files in the target directory, sorted by name.
///
/// # Errors
///
/// [`BuildError::NoPackagesFound`] if the directory holds no package files.
pub fn discover_packages(config: &BuildConfig) -> BuildResult<Vec<PathBuf>> {
    let files = list_files_with_extension(&config.target_dir, &config.extension)?;
    if files.is_empty() {
        return Err(BuildError::NoPackagesFound {
            dir: config.target_dir.clone(),
        });
    }
    info!("Found {} package file(s)", files.len());
    Ok(files)
}

/// Reads every file on a pool of `config.jobs` workers, then logs and
/// classifies the results in discovery order. Record ids count successes
/// only, starting at 1.
pub fn build_records<S: ManifestSource>(
    files: &[PathBuf],
    config: &BuildConfig,
) -> BuildResult<Vec<PackageRecord>> {
    let pool = ThreadPoolBuilder::new().num_threads(config.jobs).build()?;
    debug!(jobs = config.jobs, files = files.len(), "reading packages");

    let results: Vec<Result<PackageMetadata, PackageError>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| try_read_package::<S>(path))
            .collect()
    });

    let mut records: Vec<PackageRecord> = Vec::with_capacity(files.len());
    for (path, result) in files.iter().zip(results) {
        let name = display_name(path);
        info!("Processing: {name}");

        let metadata = match result {
            Ok(metadata) => metadata,
            Err(err) => {
                error!(path = %path.display(), "Error reading package: {err}");
                continue;
            }
        };

        let id = records.len() as u32 + 1;
        let record = PackageRecord::new(id, &config.platform, metadata);
        info!("  {} ({})", record.display_name, record.identifier);
        info!("    Type: {}, Version: {}", record.role, record.version);
        debug!(
            id,
            prerequisite = %record.prerequisite,
            min_sdk = %record.min_sdk,
            has_icon = record.icon.is_some(),
            "record built"
        );
        records.push(record);
    }

    Ok(records)
}

/// Runs a complete build with `S` as the package reader.
///
/// Nothing is written unless at least one package was read successfully.
///
/// # Errors
///
/// * [`BuildError::InvalidConfig`] if `config` fails validation.
/// * [`BuildError::NoPackagesFound`] if there is nothing to read.
/// * [`BuildError::NoRecordsBuilt`] if every package failed.
/// * Filesystem and archive errors while writing the outputs.
pub fn run_build<S: ManifestSource>(config: &BuildConfig) -> BuildResult<BuildSummary> {
    config.validate()?;
    info!("Scanning folder: {}", config.target_dir.display());

    let files = discover_packages(config)?;
    let records = build_records::<S>(&files, config)?;
    if records.is_empty() {
        return Err(BuildError::NoRecordsBuilt {
            dir: config.target_dir.clone(),
            attempted: files.len(),
        });
    }

    let text = render_manifest(&records);

    let manifest_path = config.manifest_path();
    write_file(&manifest_path, text.as_bytes())?;
    info!("Created {}", manifest_path.display());

    let archive_path = config.archive_path();
    let archive = build_archive(&config.manifest_entry, &text, &records)?;
    write_file(&archive_path, &archive)?;
    info!("Created {}", archive_path.display());

    Ok(BuildSummary {
        discovered: files.len(),
        records,
        manifest_path,
        archive_path,
    })
}
