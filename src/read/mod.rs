//! Container reading API.
//!
//! Parsing never fails on input that merely has the wrong shape. A file
//! that is not a ZIP archive, or a ZIP whose XML payload is broken, comes
//! back as [`ParseOutcome::Fallback`] with the raw bytes kept in a single
//! [`UnknownBlock`](crate::model::UnknownBlock). Errors are reserved for
//! I/O failures, damaged archive members and SQLite payloads that do not
//! match the expected schema.
//!
//! # Example
//!
//! ```rust,no_run
//! use z21cfg::read::Container;
//!
//! let container = Container::open("layout.z21")?;
//! let outcome = container.parse()?;
//! if outcome.is_fallback() {
//!     eprintln!("not a Z21 container, kept raw data");
//! }
//! for loco in &outcome.config().locomotives {
//!     println!("{}: {}", loco.address, loco.name);
//! }
//! # Ok::<(), z21cfg::Error>(())
//! ```

mod container;
mod info;
mod options;

pub use container::Container;
pub use info::{ContainerInfo, MemberInfo};
pub use options::{DEFAULT_MAX_PAYLOAD_SIZE, ParseOptions};

use std::io::{Cursor, Read, Seek, SeekFrom};

use zip::ZipArchive;

use crate::format::detect::sniff;
use crate::format::reader::BinaryReader;
use crate::format::{PayloadFormat, PayloadMember, detect_payload, sqlite, xml};
use crate::model::{FallbackReason, ParseOutcome, ParsedConfiguration};
use crate::{Error, Result};

/// Parses a container from a seekable reader.
pub fn parse_reader<R: Read + Seek>(mut reader: R, options: &ParseOptions) -> Result<ParseOutcome> {
    match ZipArchive::new(&mut reader) {
        Ok(mut archive) => parse_archive(&mut archive, options),
        Err(e) => {
            log::debug!("input is not a ZIP container: {}", e);
            capture_raw(&mut reader)
        }
    }
}

/// Parses a container held in memory.
pub fn parse_bytes(data: &[u8]) -> Result<ParseOutcome> {
    parse_reader(Cursor::new(data), &ParseOptions::default())
}

fn capture_raw<R: Read + Seek>(reader: R) -> Result<ParseOutcome> {
    let mut reader = BinaryReader::new(reader);
    reader.seek(SeekFrom::Start(0))?;
    let signature = sniff(&mut reader)?;
    let len = reader.len()?;
    log::debug!("capturing {} bytes of {} data as one unknown block", len, signature);
    let data = reader.read_bytes(len as usize)?;
    Ok(ParseOutcome::fallback(data, FallbackReason::NotZip))
}

fn parse_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    options: &ParseOptions,
) -> Result<ParseOutcome> {
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let Some(member) = detect_payload(names.iter().map(String::as_str)) else {
        log::debug!("container has no payload member ({} members)", names.len());
        return Ok(ParseOutcome::Parsed(ParsedConfiguration::new()));
    };

    log::debug!("payload member '{}' is {}", member.name, member.format);
    let bytes = read_payload(archive, &member, options)?;

    match member.format {
        PayloadFormat::Sqlite => Ok(ParseOutcome::Parsed(sqlite::parse(&bytes)?)),
        PayloadFormat::Xml => Ok(xml::parse(&bytes)),
    }
}

pub(crate) fn read_payload<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    member: &PayloadMember,
    options: &ParseOptions,
) -> Result<Vec<u8>> {
    let file = archive.by_name(&member.name)?;
    let size = file.size();
    if size > options.max_payload_size {
        return Err(Error::ResourceLimitExceeded(format!(
            "payload '{}' is {} bytes, limit is {}",
            member.name, size, options.max_payload_size
        )));
    }

    let mut bytes = Vec::with_capacity(size.min(DEFAULT_MAX_PAYLOAD_SIZE) as usize);
    file.take(options.max_payload_size.saturating_add(1))
        .read_to_end(&mut bytes)?;
    if bytes.len() as u64 > options.max_payload_size {
        return Err(Error::ResourceLimitExceeded(format!(
            "payload '{}' exceeds {} bytes",
            member.name, options.max_payload_size
        )));
    }
    Ok(bytes)
}
