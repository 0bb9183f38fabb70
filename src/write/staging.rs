//! Output file handling.
//!
//! Overwriting the source container goes through a temporary file in the
//! same directory that is renamed over the target only after the new
//! archive is complete. A failed or interrupted write leaves the original
//! untouched.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Where a container is being written.
#[derive(Debug)]
pub(crate) enum OutputFile {
    /// Written in place at a path distinct from the source.
    Direct { file: File, path: PathBuf },
    /// Written to a sibling temporary file, then renamed over `target`.
    Staged { temp: NamedTempFile, target: PathBuf },
}

impl OutputFile {
    /// Creates the output for `target`.
    pub(crate) fn create(target: &Path, staged: bool) -> Result<Self> {
        if !staged {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(target)?;
            return Ok(OutputFile::Direct {
                file,
                path: target.to_path_buf(),
            });
        }

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".z21-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        log::debug!(
            "staging output for {} in {}",
            target.display(),
            temp.path().display()
        );
        Ok(OutputFile::Staged {
            temp,
            target: target.to_path_buf(),
        })
    }

    pub(crate) fn is_staged(&self) -> bool {
        matches!(self, OutputFile::Staged { .. })
    }

    pub(crate) fn file_mut(&mut self) -> &mut File {
        match self {
            OutputFile::Direct { file, .. } => file,
            OutputFile::Staged { temp, .. } => temp.as_file_mut(),
        }
    }

    /// Flushes to disk and, when staged, replaces the target.
    pub(crate) fn commit(self) -> Result<PathBuf> {
        match self {
            OutputFile::Direct { file, path } => {
                file.sync_all()?;
                Ok(path)
            }
            OutputFile::Staged { temp, target } => {
                temp.as_file().sync_all()?;
                if let Ok(metadata) = fs::metadata(&target) {
                    fs::set_permissions(temp.path(), metadata.permissions())?;
                }
                temp.persist(&target).map_err(|e| Error::Io(e.error))?;
                Ok(target)
            }
        }
    }

    /// Removes whatever was written. A staged temporary file is deleted on
    /// drop; a direct output is deleted explicitly.
    pub(crate) fn discard(self) {
        if let OutputFile::Direct { file, path } = self {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("could not remove partial output {}: {}", path.display(), e);
            }
        }
    }
}

/// Returns `true` if both paths name the same existing file, including
/// through symlinks and hard links.
#[cfg(unix)]
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// Returns `true` if both paths name the same existing file.
#[cfg(not(unix))]
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
