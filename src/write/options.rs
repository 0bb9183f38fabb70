//! Write options and results.

use std::path::PathBuf;

use crate::edit::UnresolvedLocomotive;

/// Options for writing a container back.
///
/// # Example
///
/// ```rust
/// use z21cfg::write::WriteOptions;
///
/// let options = WriteOptions::new().strict_identity(true).level(9)?;
/// assert!(options.strict_identity);
/// assert_eq!(options.level, Some(9));
/// # Ok::<(), z21cfg::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Fail instead of skipping locomotives with no matching stored row.
    ///
    /// When set, an unresolved locomotive aborts the write with
    /// [`Error::UnresolvedLocomotives`](crate::Error::UnresolvedLocomotives)
    /// before any output file is created.
    pub strict_identity: bool,
    /// Deflate level (1-9) for the rewritten payload member. `None` uses the
    /// library default. Other members are copied without recompression.
    pub level: Option<u32>,
}

impl WriteOptions {
    /// Creates write options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables strict identity resolution.
    pub fn strict_identity(mut self, strict: bool) -> Self {
        self.strict_identity = strict;
        self
    }

    /// Sets the payload compression level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) for levels
    /// outside 1-9.
    pub fn level(mut self, level: u32) -> crate::Result<Self> {
        if !(1..=9).contains(&level) {
            return Err(crate::Error::invalid_value(
                "compression level",
                level.to_string(),
            ));
        }
        self.level = Some(level);
        Ok(self)
    }

    /// Sets the payload compression level, clamping into 1-9.
    pub fn level_clamped(mut self, level: u32) -> Self {
        self.level = Some(level.clamp(1, 9));
        self
    }
}

/// Result of a write.
#[must_use = "write result lists locomotives that were not written"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// The file that was written.
    pub output: PathBuf,
    /// Name of the rewritten payload member.
    pub payload_member: String,
    /// Size of the rewritten payload in bytes, uncompressed.
    pub payload_bytes: u64,
    /// Members copied unchanged.
    pub members_copied: usize,
    /// Locomotives written to their stored rows.
    pub locomotives_updated: usize,
    /// Locomotives skipped because no stored row matched.
    pub unresolved: Vec<UnresolvedLocomotive>,
    /// Function rows inserted.
    pub functions_inserted: usize,
    /// Function rows updated.
    pub functions_updated: usize,
    /// Function rows deleted.
    pub functions_deleted: usize,
    /// Whether the output was staged in a temporary file and swapped in.
    pub staged: bool,
}

impl WriteResult {
    /// Returns `true` if every locomotive was written.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns the total number of members in the output.
    pub fn total_members(&self) -> usize {
        self.members_copied + 1
    }
}
