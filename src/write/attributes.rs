//! Host attributes of the re-encoded payload member.
//!
//! The zip writer records every member it encodes as created on Unix. Once
//! the archive is rebuilt, the payload's central directory record gets back
//! the host byte and external attribute word it had in the source, so DOS
//! and Windows attribute bits survive a write like those of raw-copied
//! members do.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::format::reader::BinaryReader;

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4B50;
const EOCD_SIZE: usize = 22;

/// Offset of the host byte ("version made by", high byte) in a central header.
const HOST_OFFSET: u64 = 5;
/// Offset of the external attributes in a central header.
const EXTERNAL_OFFSET: u64 = 38;

/// Host system and external attributes of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HostAttributes {
    pub(crate) host: u8,
    pub(crate) external: u32,
}

#[derive(Debug, Clone, Copy)]
struct CentralRecord {
    offset: u64,
    attributes: HostAttributes,
}

/// Reads the attributes of `name` from an archive's central directory.
///
/// Returns `None` when the member is absent or the archive uses ZIP64
/// directory records.
pub(crate) fn read_attributes<R: Read + Seek>(
    inner: R,
    name: &str,
) -> io::Result<Option<HostAttributes>> {
    Ok(find_record(inner, name)?.map(|record| record.attributes))
}

/// Overwrites the attributes of `name` in a finished archive. Returns
/// whether anything changed.
pub(crate) fn restore_attributes<F: Read + Write + Seek>(
    file: &mut F,
    name: &str,
    attributes: HostAttributes,
) -> io::Result<bool> {
    let Some(record) = find_record(&mut *file, name)? else {
        log::debug!("no central record for '{}', attributes left as written", name);
        return Ok(false);
    };
    if record.attributes == attributes {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(record.offset + HOST_OFFSET))?;
    file.write_all(&[attributes.host])?;
    file.seek(SeekFrom::Start(record.offset + EXTERNAL_OFFSET))?;
    file.write_all(&attributes.external.to_le_bytes())?;
    file.flush()?;
    log::debug!(
        "restored host {} attributes {:#010x} on '{}'",
        attributes.host,
        attributes.external,
        name
    );
    Ok(true)
}

fn find_record<R: Read + Seek>(inner: R, name: &str) -> io::Result<Option<CentralRecord>> {
    let mut reader = BinaryReader::new(inner);
    let Some((directory, entries)) = central_directory(&mut reader)? else {
        return Ok(None);
    };

    reader.seek(SeekFrom::Start(directory))?;
    for _ in 0..entries {
        let offset = reader.position()?;
        if reader.read_u32()? != CENTRAL_HEADER_SIGNATURE {
            return Ok(None);
        }
        let host = reader.read_u16()?.to_le_bytes()[1];
        reader.seek(SeekFrom::Current(22))?;
        let name_len = reader.read_u16()?;
        let extra_len = reader.read_u16()?;
        let comment_len = reader.read_u16()?;
        reader.seek(SeekFrom::Current(4))?;
        let external = reader.read_u32()?;
        reader.seek(SeekFrom::Current(4))?;

        let entry_name = reader.read_bytes(usize::from(name_len))?;
        if entry_name == name.as_bytes() {
            return Ok(Some(CentralRecord {
                offset,
                attributes: HostAttributes { host, external },
            }));
        }
        reader.seek(SeekFrom::Current(
            i64::from(extra_len) + i64::from(comment_len),
        ))?;
    }
    Ok(None)
}

/// Locates the central directory through the end-of-central-directory
/// record. The record is the last signature whose comment length reaches
/// exactly to the end of the input.
fn central_directory<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
) -> io::Result<Option<(u64, u16)>> {
    let len = reader.len()?;
    let window = len.min((EOCD_SIZE + usize::from(u16::MAX)) as u64);
    let start = len - window;
    reader.seek(SeekFrom::Start(start))?;
    let tail = reader.read_bytes(window as usize)?;
    if tail.len() < EOCD_SIZE {
        return Ok(None);
    }

    let found = (0..=tail.len() - EOCD_SIZE).rev().find(|&at| {
        let comment_len = u16::from_le_bytes([tail[at + 20], tail[at + 21]]);
        tail[at..at + 4] == EOCD_SIGNATURE && at + EOCD_SIZE + usize::from(comment_len) == tail.len()
    });
    let Some(at) = found else {
        return Ok(None);
    };

    let entries = u16::from_le_bytes([tail[at + 10], tail[at + 11]]);
    let offset = u32::from_le_bytes([tail[at + 16], tail[at + 17], tail[at + 18], tail[at + 19]]);
    if entries == u16::MAX || offset == u32::MAX {
        log::debug!("ZIP64 central directory, member attributes not restored");
        return Ok(None);
    }
    Ok(Some((u64::from(offset), entries)))
}
