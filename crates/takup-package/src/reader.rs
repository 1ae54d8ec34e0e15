//! Turns one opened package into a normalized metadata record.

use std::path::Path;

use takup_utils::{
    fs::{file_stats, FileStats},
    hash::calculate_checksum,
    string::{collapse_whitespace, last_segment},
};
use tracing::{debug, error, warn};

use crate::{
    apk::PNG_MAGIC_BYTES,
    error::Result,
    manifest::{AttrValue, ManifestInfo, XmlElement},
    traits::{ManifestSource, ResourceResolver},
};

/// Version string used when the manifest declares none.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Platform level used when the manifest has no `uses-sdk` minimum.
pub const DEFAULT_MIN_SDK: &str = "1";

/// Name of the `meta-data` entry carrying a package description.
pub const DESCRIPTION_META_NAME: &str = "app_desc";

/// Install metadata read from a single package file, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub identifier: String,
    pub display_name: String,
    pub version: String,
    pub version_code: u64,
    pub min_sdk: String,
    pub icon: Option<Vec<u8>>,
    /// Single-line description; empty when the package has none.
    pub description: String,
    /// Hex-encoded SHA-256 of the file.
    pub hash: String,
    pub size: u64,
    pub filename: String,
}

/// Reads a package, logging and swallowing any failure.
///
/// Returns `None` when the package cannot be read; the caller skips it.
pub fn read_package<S: ManifestSource>(path: &Path) -> Option<PackageMetadata> {
    match try_read_package::<S>(path) {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            error!(path = %path.display(), "Error reading package: {err}");
            None
        }
    }
}

/// Reads a package, releasing its handle before returning either way.
pub fn try_read_package<S: ManifestSource>(path: &Path) -> Result<PackageMetadata> {
    let mut source = S::open(path)?;
    let result = describe(&mut source, path);
    source.close();
    result
}

fn describe<S: ManifestSource>(source: &mut S, path: &Path) -> Result<PackageMetadata> {
    let manifest = source.manifest();
    let resources = source.resources();

    let identifier = manifest.package.clone();
    let display_name = display_name(manifest, resources);
    let min_sdk = min_sdk(manifest, resources);
    let description = manifest
        .application()
        .map(|app| description(app, resources))
        .unwrap_or_default();
    let version = manifest
        .version_name
        .clone()
        .filter(|version| !version.is_empty())
        .unwrap_or_else(|| DEFAULT_VERSION.to_string());
    let declared_code = manifest.version_code.filter(|code| *code != 0);
    let icon_path = icon_path(manifest, resources);

    let icon = icon_path.and_then(|entry| extract_icon(source, &identifier, &entry));

    let stats = file_stats(path)?;
    let hash = calculate_checksum(path)?;
    let version_code = version_code(declared_code, stats, path);
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(PackageMetadata {
        identifier,
        display_name,
        version,
        version_code,
        min_sdk,
        icon,
        description: collapse_whitespace(&description),
        hash,
        size: stats.size,
        filename,
    })
}

/// The declared version code, or the file's modification time when the
/// manifest declares none (or zero).
fn version_code(declared: Option<u64>, stats: FileStats, path: &Path) -> u64 {
    if let Some(code) = declared {
        return code;
    }
    if stats.modified_secs == 0 {
        debug!(path = %path.display(), "no version code and no modification time, using 0");
    } else {
        debug!(
            path = %path.display(),
            mtime = stats.modified_secs,
            "no version code, using modification time"
        );
    }
    stats.modified_secs
}

/// Resolves a value and renders the first result as text.
fn first_text<R: ResourceResolver + ?Sized>(resources: &R, value: &AttrValue) -> Option<String> {
    resources
        .resolve(value)
        .first()
        .and_then(AttrValue::to_plain_string)
}

fn display_name<R: ResourceResolver + ?Sized>(manifest: &ManifestInfo, resources: &R) -> String {
    let label = manifest.application_label();
    if let Some(AttrValue::String(literal)) = label {
        return literal.clone();
    }
    label
        .and_then(|value| first_text(resources, value))
        .unwrap_or_else(|| last_segment(&manifest.package).to_string())
}

fn min_sdk<R: ResourceResolver + ?Sized>(manifest: &ManifestInfo, resources: &R) -> String {
    manifest
        .root
        .first_child("uses-sdk")
        .and_then(|sdk| sdk.attr("minSdkVersion"))
        .and_then(|value| first_text(resources, value))
        .filter(|level| !level.is_empty())
        .unwrap_or_else(|| DEFAULT_MIN_SDK.to_string())
}

fn icon_path<R: ResourceResolver + ?Sized>(manifest: &ManifestInfo, resources: &R) -> Option<String> {
    let icon = manifest.application()?.attr("icon")?;
    let path = first_text(resources, icon);
    if path.is_none() {
        debug!(package = %manifest.package, "icon reference did not resolve");
    }
    path
}

fn description<R: ResourceResolver + ?Sized>(application: &XmlElement, resources: &R) -> String {
    // only the first app_desc entry counts, even if it resolves to nothing
    let from_meta = application
        .children_named("meta-data")
        .find(|meta| meta.attr("name").and_then(AttrValue::as_str) == Some(DESCRIPTION_META_NAME))
        .and_then(|meta| meta.attr("value"))
        .and_then(|value| first_text(resources, value))
        .filter(|text| !text.is_empty());

    from_meta
        .or_else(|| {
            application
                .attr("description")
                .and_then(|value| first_text(resources, value))
        })
        .unwrap_or_default()
}

fn extract_icon<S: ManifestSource>(source: &mut S, identifier: &str, entry: &str) -> Option<Vec<u8>> {
    match source.extract(entry) {
        Ok(data) => {
            if !data.starts_with(&PNG_MAGIC_BYTES) {
                debug!(package = identifier, icon = entry, "icon is not a PNG image");
            }
            Some(data)
        }
        Err(err) => {
            warn!(package = identifier, icon = entry, "Could not extract icon: {err}");
            None
        }
    }
}
