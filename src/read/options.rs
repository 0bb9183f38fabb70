//! Parse options.

/// Default cap on the declared size of a payload member (256 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u64 = 256 * 1024 * 1024;

/// Options for parsing a container.
///
/// # Example
///
/// ```rust
/// use z21cfg::read::ParseOptions;
///
/// let options = ParseOptions::new().max_payload_size(16 * 1024 * 1024);
/// assert_eq!(options.max_payload_size, 16 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Largest payload member accepted, by declared uncompressed size.
    ///
    /// Larger payloads fail with
    /// [`Error::ResourceLimitExceeded`](crate::Error::ResourceLimitExceeded)
    /// before any of their data is read.
    pub max_payload_size: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl ParseOptions {
    /// Creates parse options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload size limit.
    pub fn max_payload_size(mut self, bytes: u64) -> Self {
        self.max_payload_size = bytes;
        self
    }

    /// Removes the payload size limit.
    pub fn unlimited(mut self) -> Self {
        self.max_payload_size = u64::MAX;
        self
    }
}
