//! The `product.inf` text format.
//!
//! One line per record, 13 comma-separated fields:
//!
//! ```text
//! platform,role,identifier,name,version,versionCode,filename,icon,description,hash,minSdk,prerequisite,size
//! ```
//!
//! Fields are neither quoted nor escaped. Lines are separated by `\n` with no
//! trailing newline.

use crate::{constants::UNKNOWN_SIZE, record::PackageRecord};

pub const FIELD_SEPARATOR: &str = ",";
pub const LINE_SEPARATOR: &str = "\n";

pub fn render_line(record: &PackageRecord) -> String {
    let size = if record.size > 0 {
        record.size.to_string()
    } else {
        UNKNOWN_SIZE.to_string()
    };

    let fields: [&str; 13] = [
        &record.platform,
        record.role.as_str(),
        &record.identifier,
        &record.display_name,
        &record.version,
        &record.version_code.to_string(),
        &record.filename,
        &record.icon_asset_name(),
        &record.description,
        &record.hash,
        &record.min_sdk,
        &record.prerequisite,
        &size,
    ];

    fields.join(FIELD_SEPARATOR)
}

pub fn render_manifest(records: &[PackageRecord]) -> String {
    records
        .iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}
