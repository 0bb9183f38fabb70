//! Signature sniffing.
//!
//! Classifies the first bytes of a stream. This is diagnostic only: whether a
//! file is treated as a container is decided by the ZIP reader accepting it,
//! so a self-extracting stub in front of a valid archive still parses.

use std::io::{self, Read, Seek};

use super::reader::BinaryReader;

/// Kind of data recognized from leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// ZIP local file header (`PK\x03\x04`).
    Zip,
    /// ZIP end-of-central-directory record at offset zero (empty archive).
    EmptyZip,
    /// Bare SQLite 3 database file.
    Sqlite,
    /// Text that looks like an XML document.
    Xml,
    /// Nothing recognized.
    Unknown,
}

impl Signature {
    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Signature::Zip => "ZIP",
            Signature::EmptyZip => "empty ZIP",
            Signature::Sqlite => "SQLite",
            Signature::Xml => "XML",
            Signature::Unknown => "unknown",
        }
    }

    /// Returns whether this looks like a ZIP archive.
    pub fn is_zip(&self) -> bool {
        matches!(self, Signature::Zip | Signature::EmptyZip)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Known signatures, longest first so prefixes cannot shadow each other.
const SIGNATURES: &[(&[u8], Signature)] = &[
    // "SQLite format 3\0"
    (b"SQLite format 3\0", Signature::Sqlite),
    // 'P' 'K' 0x03 0x04
    (&[0x50, 0x4B, 0x03, 0x04], Signature::Zip),
    // 'P' 'K' 0x05 0x06
    (&[0x50, 0x4B, 0x05, 0x06], Signature::EmptyZip),
];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Bytes examined when sniffing.
const SNIFF_LEN: usize = 16;

/// Classifies a byte prefix.
pub fn classify(prefix: &[u8]) -> Signature {
    for (magic, signature) in SIGNATURES {
        if prefix.starts_with(magic) {
            return *signature;
        }
    }

    let text = prefix.strip_prefix(UTF8_BOM).unwrap_or(prefix);
    let first = text.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'<') {
        return Signature::Xml;
    }

    Signature::Unknown
}

/// Sniffs the signature at the current position without consuming input.
pub fn sniff<R: Read + Seek>(reader: &mut BinaryReader<R>) -> io::Result<Signature> {
    let available = reader.remaining()?.min(SNIFF_LEN as u64) as usize;
    let prefix = reader.peek(available)?;
    Ok(classify(&prefix))
}
