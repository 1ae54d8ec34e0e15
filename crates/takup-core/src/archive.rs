//! The `product.infz` bundle: the manifest text plus every extracted icon in
//! one deflate-compressed zip.

use std::io::{Cursor, Write};

use tracing::trace;
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

use crate::{
    constants::ARCHIVE_COMPRESSION_LEVEL,
    error::ErrorContext,
    record::PackageRecord,
    BuildResult,
};

fn entry_options() -> SimpleFileOptions {
    // fixed timestamp so identical input yields identical bytes
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL))
        .last_modified_time(DateTime::default())
}

/// Builds the bundle in memory. The manifest is the first entry, followed by
/// one `icon_<id>.png` entry per record with an icon, in record order.
pub fn build_archive(
    manifest_entry: &str,
    manifest_text: &str,
    records: &[PackageRecord],
) -> BuildResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = entry_options();

    writer.start_file(manifest_entry, options)?;
    writer
        .write_all(manifest_text.as_bytes())
        .with_context(|| format!("compressing {manifest_entry}"))?;

    for record in records {
        let Some(icon) = &record.icon else {
            continue;
        };
        let name = record.icon_asset_name();
        trace!(entry = %name, bytes = icon.len(), "adding icon");
        writer.start_file(name.as_str(), options)?;
        writer
            .write_all(icon)
            .with_context(|| format!("compressing {name}"))?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;
    use crate::record::tests::metadata;

    fn records() -> Vec<PackageRecord> {
        let mut with_icon = metadata("com.example.one", "one.apk");
        with_icon.icon = Some(b"\x89PNG first".to_vec());
        let without_icon = metadata("com.example.two", "two.apk");
        let mut another_icon = metadata("com.example.three", "three.apk");
        another_icon.icon = Some(b"\x89PNG third".to_vec());

        vec![
            PackageRecord::new(1, "Android", with_icon),
            PackageRecord::new(2, "Android", without_icon),
            PackageRecord::new(3, "Android", another_icon),
        ]
    }

    #[test]
    fn test_archive_layout() {
        let records = records();
        let bytes = build_archive("product.inf", "line one\nline two", &records).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names = Vec::new();
        for i in 0..archive.len() {
            names.push(archive.by_index(i).unwrap().name().to_string());
        }
        assert_eq!(names, vec!["product.inf", "icon_1.png", "icon_3.png"]);

        let mut manifest = String::new();
        archive
            .by_name("product.inf")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        assert_eq!(manifest, "line one\nline two");

        let mut icon = archive.by_name("icon_3.png").unwrap();
        assert_eq!(icon.compression(), CompressionMethod::Deflated);
        let mut data = Vec::new();
        icon.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"\x89PNG third");
    }

    #[test]
    fn test_archive_is_deterministic() {
        let records = records();
        let first = build_archive("product.inf", "a,b,c", &records).unwrap();
        let second = build_archive("product.inf", "a,b,c", &records).unwrap();
        assert_eq!(first, second);
    }
}
