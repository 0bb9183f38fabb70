//! Scoped on-disk copies of SQLite payloads.
//!
//! SQLite needs a file path, so a payload member is written to a uniquely
//! named temporary file before it is opened. The file is deleted when the
//! [`TempDatabase`] is dropped, on success and error paths alike.

use std::io::Write;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;

use crate::Result;

/// A payload database materialized to a temporary file.
#[derive(Debug)]
pub struct TempDatabase {
    file: NamedTempFile,
}

impl TempDatabase {
    /// Writes `bytes` to a fresh temporary file.
    pub fn materialize(bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("z21-")
            .suffix(".sqlite")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        log::debug!(
            "materialized {} byte payload at {}",
            bytes.len(),
            file.path().display()
        );
        Ok(Self { file })
    }

    /// Returns the path of the temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Opens the database read-only.
    pub fn open_read_only(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            self.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Opens the database for writing.
    pub fn open_read_write(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            self.path(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Reads the current database file back into memory.
    ///
    /// All connections must be closed first so the file is complete.
    pub fn read_back(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.path())?)
    }
}
