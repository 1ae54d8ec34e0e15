use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{
        DEFAULT_ARCHIVE_NAME, DEFAULT_EXTENSION, DEFAULT_MANIFEST_ENTRY, DEFAULT_MANIFEST_NAME,
        DEFAULT_PLATFORM,
    },
    error::{BuildError, ErrorContext},
    BuildResult,
};

/// Settings for one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory scanned for packages; both outputs are written here too.
    pub target_dir: PathBuf,

    /// File name of the text manifest.
    /// Default: product.inf
    pub manifest_name: String,

    /// File name of the compressed bundle.
    /// Default: product.infz
    pub archive_name: String,

    /// Name of the manifest entry inside the bundle.
    /// Default: product.inf
    pub manifest_entry: String,

    /// Value of the platform column.
    /// Default: Android
    pub platform: String,

    /// Package file extension, without the leading dot. Matched
    /// case-insensitively.
    /// Default: apk
    pub extension: String,

    /// Number of packages read concurrently.
    /// Default: available parallelism
    pub jobs: usize,
}

/// Overrides read from a TOML configuration file.
///
/// Every field is optional; the target directory always comes from the
/// command line.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub manifest_name: Option<String>,
    pub archive_name: Option<String>,
    pub manifest_entry: Option<String>,
    pub platform: Option<String>,
    pub extension: Option<String>,
    pub jobs: Option<usize>,
}

impl FileConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> BuildResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: FileConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl BuildConfig {
    pub fn new<P: Into<PathBuf>>(target_dir: P) -> Self {
        Self {
            target_dir: target_dir.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            manifest_entry: DEFAULT_MANIFEST_ENTRY.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            jobs: default_jobs(),
        }
    }

    /// Applies the fields set in `file` on top of the current values.
    pub fn merge(mut self, file: FileConfig) -> Self {
        if let Some(name) = file.manifest_name {
            self.manifest_name = name;
        }
        if let Some(name) = file.archive_name {
            self.archive_name = name;
        }
        if let Some(entry) = file.manifest_entry {
            self.manifest_entry = entry;
        }
        if let Some(platform) = file.platform {
            self.platform = platform;
        }
        if let Some(extension) = file.extension {
            self.extension = extension;
        }
        if let Some(jobs) = file.jobs {
            self.jobs = jobs;
        }
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if let Some(jobs) = jobs {
            self.jobs = jobs;
        }
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.target_dir.join(&self.manifest_name)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.target_dir.join(&self.archive_name)
    }

    pub fn validate(&self) -> BuildResult<()> {
        let names = [
            ("manifest_name", &self.manifest_name),
            ("archive_name", &self.archive_name),
            ("manifest_entry", &self.manifest_entry),
            ("platform", &self.platform),
            ("extension", &self.extension),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(BuildError::InvalidConfig(format!("`{field}` cannot be empty")));
            }
        }

        for (field, value) in [
            ("manifest_name", &self.manifest_name),
            ("archive_name", &self.archive_name),
        ] {
            if value.contains(['/', '\\']) {
                return Err(BuildError::InvalidConfig(format!(
                    "`{field}` must be a file name, not a path: {value}"
                )));
            }
        }

        if self.manifest_name == self.archive_name {
            return Err(BuildError::InvalidConfig(
                "`manifest_name` and `archive_name` must differ".into(),
            ));
        }

        if self.extension.starts_with('.') {
            return Err(BuildError::InvalidConfig(format!(
                "`extension` must not start with a dot: {}",
                self.extension
            )));
        }

        if self.jobs == 0 {
            return Err(BuildError::InvalidConfig(
                "`jobs` must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::new("/srv/updates");
        assert_eq!(config.manifest_name, "product.inf");
        assert_eq!(config.archive_name, "product.infz");
        assert_eq!(config.manifest_entry, "product.inf");
        assert_eq!(config.platform, "Android");
        assert_eq!(config.extension, "apk");
        assert!(config.jobs >= 1);
        assert_eq!(
            config.manifest_path(),
            PathBuf::from("/srv/updates/product.inf")
        );
        assert_eq!(
            config.archive_path(),
            PathBuf::from("/srv/updates/product.infz")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_then_cli() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "platform = \"Android-test\"\njobs = 2\nextension = \"APK\"").unwrap();

        let file_config = FileConfig::from_path(file.path()).unwrap();
        let config = BuildConfig::new(".")
            .merge(file_config)
            .with_jobs(Some(6));
        assert_eq!(config.platform, "Android-test");
        assert_eq!(config.extension, "APK");
        assert_eq!(config.jobs, 6);
        assert_eq!(config.manifest_name, "product.inf");

        let config = config.with_jobs(None);
        assert_eq!(config.jobs, 6);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "target_dir = \"/tmp\"").unwrap();
        assert!(matches!(
            FileConfig::from_path(file.path()),
            Err(BuildError::Config(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            FileConfig::from_path("/nonexistent/takup.toml"),
            Err(BuildError::IoError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = BuildConfig::new(".");

        let mut config = base.clone();
        config.archive_name = config.manifest_name.clone();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.extension = ".apk".into();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.jobs = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.manifest_entry = " ".into();
        assert!(config.validate().is_err());

        let mut config = base;
        config.manifest_name = "out/product.inf".into();
        assert!(matches!(
            config.validate(),
            Err(BuildError::InvalidConfig(_))
        ));
    }
}
