use std::{
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use crate::error::{FileSystemError, FileSystemResult};

/// Size and modification time of a file, as needed for manifest records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub size: u64,
    /// Modification time in whole seconds since the Unix epoch, or `0` when
    /// the platform cannot report one.
    pub modified_secs: u64,
}

/// Lists the regular files in `dir` whose name ends with `.{extension}`,
/// compared case-insensitively.
///
/// Results are sorted by file name so repeated runs over the same directory
/// see the same order regardless of how the platform enumerates entries.
///
/// # Errors
///
/// * [`FileSystemError::NotADirectory`] if `dir` exists but is not a directory.
/// * [`FileSystemError::Directory`] if the directory cannot be read.
///
/// # Example
///
/// ```no_run
/// use takup_utils::error::FileSystemResult;
/// use takup_utils::fs::list_files_with_extension;
///
/// fn main() -> FileSystemResult<()> {
///     for apk in list_files_with_extension("/srv/updates", "apk")? {
///         println!("{}", apk.display());
///     }
///     Ok(())
/// }
/// ```
pub fn list_files_with_extension<P: AsRef<Path>>(
    dir: P,
    extension: &str,
) -> FileSystemResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if dir.exists() && !dir.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let read_failed = |err: std::io::Error| {
        FileSystemError::Directory {
            path: dir.to_path_buf(),
            action: "read",
            source: err,
        }
    };

    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(&suffix))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads the size and modification time of a file.
///
/// # Errors
///
/// * [`FileSystemError::File`] if the file metadata cannot be read.
pub fn file_stats<P: AsRef<Path>>(path: P) -> FileSystemResult<FileStats> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|err| {
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "stat",
            source: err,
        }
    })?;

    let modified_secs = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    Ok(FileStats {
        size: metadata.len(),
        modified_secs,
    })
}

/// Writes `contents` to `path`, replacing any existing file.
///
/// # Errors
///
/// * [`FileSystemError::File`] if the file cannot be written.
pub fn write_file<P: AsRef<Path>>(path: P, contents: &[u8]) -> FileSystemResult<()> {
    let path = path.as_ref();
    fs::write(path, contents).map_err(|err| {
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "write",
            source: err,
        }
    })
}
