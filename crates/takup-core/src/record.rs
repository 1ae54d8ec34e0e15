use takup_package::PackageMetadata;

use crate::classify::{classify_role, infer_prerequisite, Role};

/// One manifest row: a successfully read package plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Position among successfully read packages, starting at 1.
    pub id: u32,
    pub platform: String,
    pub role: Role,
    pub identifier: String,
    pub display_name: String,
    pub version: String,
    pub version_code: u64,
    pub filename: String,
    pub icon: Option<Vec<u8>>,
    pub description: String,
    pub hash: String,
    pub min_sdk: String,
    /// Host prerequisite token; empty when none could be inferred.
    pub prerequisite: String,
    pub size: u64,
}

impl PackageRecord {
    /// Classifies `metadata` and assigns it the record id `id`.
    pub fn new(id: u32, platform: &str, metadata: PackageMetadata) -> Self {
        let role = classify_role(&metadata.identifier);
        let prerequisite =
            infer_prerequisite(&metadata.identifier, &metadata.version, &metadata.filename);

        Self {
            id,
            platform: platform.to_string(),
            role,
            identifier: metadata.identifier,
            display_name: metadata.display_name,
            version: metadata.version,
            version_code: metadata.version_code,
            filename: metadata.filename,
            icon: metadata.icon,
            description: metadata.description,
            hash: metadata.hash,
            min_sdk: metadata.min_sdk,
            prerequisite,
            size: metadata.size,
        }
    }

    /// Entry name of this record's icon in the bundle, or an empty string if
    /// the package had no icon.
    pub fn icon_asset_name(&self) -> String {
        if self.icon.is_some() {
            format!("icon_{}.png", self.id)
        } else {
            String::new()
        }
    }
}
