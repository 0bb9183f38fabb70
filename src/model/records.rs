//! Records that are read but never written back.

/// A switched accessory such as a turnout or signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accessory {
    /// Accessory decoder address.
    pub address: u32,
    /// Display name.
    pub name: String,
    /// Accessory type label.
    pub kind: String,
    /// Current switching state.
    pub state: u32,
}

/// A track layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// Display name.
    pub name: String,
    /// Track system label.
    pub track_type: String,
    /// Block names.
    pub blocks: Vec<String>,
}

/// Bytes kept verbatim because they could not be parsed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UnknownBlock {
    /// Offset of the block within its source.
    pub offset: u64,
    /// Length of the block in bytes.
    pub length: u64,
    /// The raw bytes.
    pub data: Vec<u8>,
}

impl UnknownBlock {
    /// Captures a complete input as one block starting at offset zero.
    pub fn whole(data: Vec<u8>) -> Self {
        Self {
            offset: 0,
            length: data.len() as u64,
            data,
        }
    }
}

impl std::fmt::Debug for UnknownBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnknownBlock")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}
