//! Round-trip writer.
//!
//! Writing merges an edited [`ParsedConfiguration`] into a fresh read of the
//! original container:
//!
//! 1. The original archive is reopened and its payload located. Containers
//!    with an XML payload, or none, are rejected before any output exists.
//! 2. The SQLite payload is copied to a temporary database and every
//!    locomotive is written to the row its identity resolves to, in one
//!    transaction.
//! 3. A new archive is written. Every other member is copied raw, so its
//!    compressed bytes, method, timestamp and attributes are unchanged. The
//!    payload member is replaced by the committed database, deflated, and
//!    keeps the host system and external attributes of the original.
//! 4. If the output is the source file, the new archive is staged in a
//!    sibling temporary file and renamed over the original at the end.
//!
//! # Example
//!
//! ```rust,no_run
//! use z21cfg::read::Container;
//!
//! let container = Container::open("layout.z21")?;
//! let mut config = container.parse()?.into_config();
//! if let Some(loco) = config.find_by_address_mut(3) {
//!     loco.name = "BR 218 021-5".into();
//! }
//! let result = container.write_in_place(&mut config)?;
//! println!("updated {} locomotives", result.locomotives_updated);
//! # Ok::<(), z21cfg::Error>(())
//! ```

mod attributes;
mod options;
mod staging;

pub use options::{WriteOptions, WriteResult};

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::db::TempDatabase;
use crate::edit::{SyncReport, sync_locomotives};
use crate::format::{PayloadFormat, PayloadMember, detect_payload};
use crate::model::ParsedConfiguration;
use crate::read::{ParseOptions, read_payload};
use crate::{Error, Result};

use attributes::{HostAttributes, read_attributes, restore_attributes};
use staging::{OutputFile, same_file};

/// Writes `config` into a copy of the container at `source`, saved at `output`.
///
/// `output` may be the same file as `source`; the original is then replaced
/// atomically once the new archive is complete. Identity tokens resolved
/// during the write are stored back on `config`'s locomotives.
///
/// # Errors
///
/// - [`Error::UnsupportedFeature`] if the payload is XML.
/// - [`Error::MissingPayload`] if the container has no payload member.
/// - [`Error::UnresolvedLocomotives`] in strict mode, when some locomotive
///   has no matching row. Nothing is written.
/// - [`Error::InvalidValue`] if a function duration is not a number.
pub fn write_container(
    source: &Path,
    config: &mut ParsedConfiguration,
    output: &Path,
    options: &WriteOptions,
) -> Result<WriteResult> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(source)?))?;
    let member = payload_member(&archive)?;

    let payload = read_payload(&mut archive, &member, &ParseOptions::new().unlimited())?;
    let (database, report) = apply_edits(&payload, config, options)?;
    let attributes = read_attributes(BufReader::new(File::open(source)?), &member.name)?;

    let mut out = OutputFile::create(output, same_file(source, output))?;
    let staged = out.is_staged();
    let rebuilt = rebuild_archive(
        &mut archive,
        &member,
        &database,
        attributes,
        out.file_mut(),
        options,
    );
    let members_copied = match rebuilt {
        Ok(copied) => copied,
        Err(e) => {
            out.discard();
            return Err(e);
        }
    };
    let output = out.commit()?;

    for (index, resolution) in &report.resolved {
        if let Some(loco) = config.locomotives.get_mut(*index) {
            loco.vehicle_id = Some(resolution.id);
        }
    }

    log::info!(
        "wrote {} ({} locomotives updated, {} members copied{})",
        output.display(),
        report.locomotives_updated,
        members_copied,
        if staged { ", replaced atomically" } else { "" }
    );

    Ok(WriteResult {
        output,
        payload_member: member.name,
        payload_bytes: database.len() as u64,
        members_copied,
        locomotives_updated: report.locomotives_updated,
        unresolved: report.unresolved,
        functions_inserted: report.functions_inserted,
        functions_updated: report.functions_updated,
        functions_deleted: report.functions_deleted,
        staged,
    })
}

fn payload_member<R: Read + Seek>(archive: &ZipArchive<R>) -> Result<PayloadMember> {
    match detect_payload(archive.file_names()) {
        Some(member) if member.format == PayloadFormat::Sqlite => Ok(member),
        Some(_) => Err(Error::UnsupportedFeature {
            feature: "XML payload write-back",
        }),
        None => Err(Error::MissingPayload),
    }
}

/// Applies the model to a temporary copy of the payload database and
/// returns the committed database bytes.
fn apply_edits(
    payload: &[u8],
    config: &ParsedConfiguration,
    options: &WriteOptions,
) -> Result<(Vec<u8>, SyncReport)> {
    let db = TempDatabase::materialize(payload)?;
    let mut conn = db.open_read_write()?;

    let tx = conn.transaction()?;
    let report = sync_locomotives(&tx, &config.locomotives)?;
    if options.strict_identity && !report.is_complete() {
        return Err(Error::UnresolvedLocomotives {
            count: report.unresolved.len(),
            names: report.unresolved.iter().map(|u| u.name.clone()).collect(),
        });
    }
    tx.commit()?;
    conn.close().map_err(|(_, e)| e)?;

    let bytes = db.read_back()?;
    Ok((bytes, report))
}

/// Copies every member of `archive` into a new archive on `file`, replacing
/// the payload. Returns the number of members copied unchanged.
fn rebuild_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    payload: &PayloadMember,
    database: &[u8],
    attributes: Option<HostAttributes>,
    file: &mut File,
    options: &WriteOptions,
) -> Result<usize> {
    let mut writer = ZipWriter::new(BufWriter::new(&mut *file));
    let mut copied = 0;

    for index in 0..archive.len() {
        let member = archive.by_index_raw(index)?;
        if member.name() != payload.name {
            log::debug!("copying member '{}' unchanged", member.name());
            writer.raw_copy_file(member)?;
            copied += 1;
            continue;
        }

        let mut file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(options.level.map(i64::from));
        if let Some(modified) = member.last_modified() {
            file_options = file_options.last_modified_time(modified);
        }
        if let Some(mode) = member.unix_mode() {
            file_options = file_options.unix_permissions(mode);
        }
        let name = member.name().to_string();
        drop(member);

        log::debug!("replacing payload member '{}' ({} bytes)", name, database.len());
        writer.start_file(name, file_options)?;
        writer.write_all(database)?;
    }

    if !archive.comment().is_empty() {
        writer.set_raw_comment(archive.comment().into());
    }

    let mut buffered = writer.finish()?;
    buffered.flush()?;
    drop(buffered);

    if let Some(attributes) = attributes {
        restore_attributes(file, &payload.name, attributes)?;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        std::fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
    }

    #[test]
    fn test_xml_payload_rejected_before_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("old.z21");
        let output = dir.path().join("out.z21");
        write_zip(&source, &[("loco_data.xml", b"<z21/>")]);

        let err = write_container(
            &source,
            &mut ParsedConfiguration::new(),
            &output,
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFeature { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_payload_rejected() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("assets.z21");
        write_zip(&source, &[("a.png", b"\x89PNG")]);

        let err = write_container(
            &source,
            &mut ParsedConfiguration::new(),
            &source,
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingPayload));
    }

    #[test]
    fn test_non_zip_source_is_error() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("plain.bin");
        std::fs::write(&source, b"not a zip").unwrap();

        let err = write_container(
            &source,
            &mut ParsedConfiguration::new(),
            &dir.path().join("out.z21"),
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Zip(_)));
    }
}
