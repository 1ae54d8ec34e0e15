//! APK reading.
//!
//! An APK is a zip archive; the decoders here read the compiled
//! `AndroidManifest.xml` and the optional `resources.arsc` out of it.

mod chunk;
pub mod table;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use tracing::{debug, trace};
use zip::{result::ZipError, ZipArchive};

pub use table::ResourceTable;
pub use xml::parse_xml;

use crate::{
    error::{ErrorContext, PackageError, Result},
    manifest::ManifestInfo,
    traits::ManifestSource,
};

/// Name of the compiled manifest entry.
pub const ANDROID_MANIFEST: &str = "AndroidManifest.xml";

/// Name of the compiled resource table entry.
pub const RESOURCE_TABLE: &str = "resources.arsc";

/// Magic bytes for PNG images.
pub const PNG_MAGIC_BYTES: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// An opened APK with its manifest and resource table decoded.
pub struct ApkFile {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
    manifest: ManifestInfo,
    resources: ResourceTable,
}

impl ApkFile {
    fn read_entry(archive: &mut ZipArchive<BufReader<File>>, entry: &str) -> Result<Vec<u8>> {
        let mut file = archive.by_name(entry).map_err(|err| {
            match err {
                ZipError::FileNotFound => {
                    PackageError::MissingEntry {
                        entry: entry.to_string(),
                    }
                }
                other => PackageError::Zip(other),
            }
        })?;

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)
            .with_context(|| format!("reading entry {entry}"))?;
        Ok(data)
    }
}

impl ManifestSource for ApkFile {
    type Resources = ResourceTable;

    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening package {}", path.display()))?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let manifest_data = Self::read_entry(&mut archive, ANDROID_MANIFEST)?;
        let manifest = ManifestInfo::from_root(parse_xml(&manifest_data)?)?;

        let resources = match Self::read_entry(&mut archive, RESOURCE_TABLE) {
            Ok(data) => ResourceTable::parse(&data)?,
            Err(PackageError::MissingEntry { .. }) => {
                debug!(path = %path.display(), "package has no resource table");
                ResourceTable::empty()
            }
            Err(err) => return Err(err),
        };

        debug!(
            path = %path.display(),
            package = %manifest.package,
            entries = archive.len(),
            "opened package"
        );

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            manifest,
            resources,
        })
    }

    fn manifest(&self) -> &ManifestInfo {
        &self.manifest
    }

    fn resources(&self) -> &Self::Resources {
        &self.resources
    }

    fn extract(&mut self, entry: &str) -> Result<Vec<u8>> {
        Self::read_entry(&mut self.archive, entry)
    }
}

impl Drop for ApkFile {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "closing package");
    }
}
