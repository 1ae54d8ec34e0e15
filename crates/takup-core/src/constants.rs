//! Constants used throughout takup-core.

/// Identifier prefix of system plugins (flavor packages).
pub const SYSTEM_PLUGIN_PREFIX: &str = "com.atakmap.app.flavor.";

/// Identifier prefix shared by plugins.
pub const PLUGIN_PREFIX: &str = "com.atakmap.android";

/// Identifier suffix of plugins.
pub const PLUGIN_SUFFIX: &str = ".plugin";

/// Host application a prerequisite token refers to.
pub const PREREQUISITE_HOST: &str = "com.atakmap.app";

/// Default file name of the text manifest.
pub const DEFAULT_MANIFEST_NAME: &str = "product.inf";

/// Default file name of the compressed bundle.
pub const DEFAULT_ARCHIVE_NAME: &str = "product.infz";

/// Default entry name of the manifest inside the bundle.
pub const DEFAULT_MANIFEST_ENTRY: &str = "product.inf";

pub const DEFAULT_PLATFORM: &str = "Android";

pub const DEFAULT_EXTENSION: &str = "apk";

/// Serialized size for records whose size is not positive.
pub const UNKNOWN_SIZE: &str = "-1";

/// Compression level used for the bundle.
pub const ARCHIVE_COMPRESSION_LEVEL: i64 = 9;
