//! Container information types.

use zip::CompressionMethod;

use crate::format::PayloadMember;
use crate::format::detect::Signature;

/// One member of a container.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    /// Name inside the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Compression method.
    pub method: CompressionMethod,
    /// Whether this member holds the locomotive payload.
    pub is_payload: bool,
}

/// Information about a container file, without parsing its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInfo {
    /// File size in bytes.
    pub file_size: u64,
    /// Signature of the first bytes.
    pub signature: Signature,
    /// Whether the ZIP reader accepted the file.
    pub is_zip: bool,
    /// Archive members, in central directory order.
    pub members: Vec<MemberInfo>,
    /// The detected payload member.
    pub payload: Option<PayloadMember>,
    /// Archive comment, if any.
    pub comment: Option<String>,
}

impl ContainerInfo {
    /// Returns the total uncompressed size of all members.
    pub fn total_size(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Returns the total compressed size of all members.
    pub fn packed_size(&self) -> u64 {
        self.members.iter().map(|m| m.compressed_size).sum()
    }

    /// Returns the compression ratio (packed / unpacked).
    pub fn compression_ratio(&self) -> f64 {
        let total = self.total_size();
        if total == 0 {
            1.0
        } else {
            self.packed_size() as f64 / total as f64
        }
    }

    /// Returns the members that are not the payload.
    pub fn assets(&self) -> impl Iterator<Item = &MemberInfo> {
        self.members.iter().filter(|m| !m.is_payload)
    }
}
