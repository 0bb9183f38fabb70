//! Payload formats and their readers.
//!
//! A Z21 container is a ZIP archive. Its locomotive data lives in a single
//! payload member, either a legacy XML document or an SQLite database. This
//! module decides which one is present and holds the reader for each.

pub mod detect;
pub mod reader;
pub mod sqlite;
pub mod xml;

use std::fmt;

/// File extension of the SQLite payload member.
pub const SQLITE_EXTENSION: &str = ".sqlite";

/// File extension of the XML payload member.
pub const XML_EXTENSION: &str = ".xml";

/// The payload format of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    /// Legacy XML document (format 1).
    Xml,
    /// SQLite database (format 2).
    Sqlite,
}

impl PayloadFormat {
    /// Returns the format generation number.
    pub fn generation(&self) -> u32 {
        match self {
            PayloadFormat::Xml => 1,
            PayloadFormat::Sqlite => 2,
        }
    }

    /// Returns whether modifications can be written back.
    pub fn supports_write(&self) -> bool {
        matches!(self, PayloadFormat::Sqlite)
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Xml => write!(f, "XML (format 1)"),
            PayloadFormat::Sqlite => write!(f, "SQLite (format 2)"),
        }
    }
}

/// The payload member chosen from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadMember {
    /// Member name inside the archive.
    pub name: String,
    /// Detected format.
    pub format: PayloadFormat,
}

/// Picks the payload member from archive member names.
///
/// The first `.sqlite` member wins over any `.xml` member. Extensions are
/// matched case-sensitively. Returns `None` when neither is present.
pub fn detect_payload<'a, I>(names: I) -> Option<PayloadMember>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first_xml = None;
    for name in names {
        if name.ends_with(SQLITE_EXTENSION) {
            return Some(PayloadMember {
                name: name.to_string(),
                format: PayloadFormat::Sqlite,
            });
        }
        if first_xml.is_none() && name.ends_with(XML_EXTENSION) {
            first_xml = Some(name);
        }
    }
    first_xml.map(|name| PayloadMember {
        name: name.to_string(),
        format: PayloadFormat::Xml,
    })
}
