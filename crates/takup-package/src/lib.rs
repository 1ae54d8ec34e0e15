//! Package reading for the takup update builder.
//!
//! This crate opens Android packages and reads the install metadata an update
//! manifest needs: identity, version, display name, icon, description,
//! checksum and size.
//!
//! Package formats plug in through [`ManifestSource`]; [`ApkFile`] is the
//! implementation for APKs, decoding the compiled manifest and resource table
//! stored inside the zip container.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use takup_package::{read_package, ApkFile};
//!
//! if let Some(metadata) = read_package::<ApkFile>(Path::new("plugin.apk")) {
//!     println!("{} {}", metadata.identifier, metadata.version);
//! }
//! ```

pub mod apk;
pub mod error;
pub mod manifest;
pub mod reader;
pub mod traits;

pub use apk::{ApkFile, ANDROID_MANIFEST, PNG_MAGIC_BYTES, RESOURCE_TABLE};
pub use error::{ErrorContext, PackageError, Result};
pub use manifest::{AttrValue, ManifestInfo, XmlAttribute, XmlElement};
pub use reader::{read_package, try_read_package, PackageMetadata};
pub use traits::{ManifestSource, ResourceResolver};
