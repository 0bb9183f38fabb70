//! Shared test utilities for integration tests.
//!
//! Fixture containers are built for real: an SQLite payload is created with
//! `rusqlite` in a temporary file, then zipped together with image members
//! the way a Z21 app export lays them out.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Name of the SQLite payload member in fixture containers.
pub const SQLITE_MEMBER: &str = "export/5f2c/Loco.sqlite";

/// Name of the XML payload member in fixture containers.
pub const XML_MEMBER: &str = "export/5f2c/loco_data.xml";

/// Archive comment written into every fixture.
pub const COMMENT: &str = "Z21 export";

/// Schema of the tables the library touches.
pub const SCHEMA: &str = "
    CREATE TABLE vehicles (
        id INTEGER PRIMARY KEY, type INTEGER, name TEXT, address INTEGER,
        max_speed INTEGER, traction_direction INTEGER, position INTEGER,
        image_name TEXT);
    CREATE TABLE functions (
        id INTEGER PRIMARY KEY, vehicle_id INTEGER, function INTEGER,
        position INTEGER, shortcut TEXT, time REAL, image_name TEXT,
        button_type INTEGER, is_configured INTEGER, show_function_number INTEGER);
    CREATE TABLE update_history (id INTEGER PRIMARY KEY, to_database_version INTEGER);
    CREATE TABLE layout_data (id INTEGER PRIMARY KEY, name TEXT);
    INSERT INTO update_history (to_database_version) VALUES (1), (4);
";

/// One locomotive: `Loco A`, address 3, speed 120, forward, F0 light.
pub const SINGLE_LOCO: &str = "
    INSERT INTO vehicles VALUES (1, 0, 'Loco A', 3, 120, 1, 0, 'loco_a.png');
    INSERT INTO functions VALUES (1, 1, 0, 0, '', NULL, 'light', 0, 1, 1);
";

/// Three locomotives and a wagon, with functions {F0, F2, F5} on `BR 218`.
pub const FLEET: &str = "
    INSERT INTO vehicles VALUES (10, 0, 'BR 218', 3, 120, 1, 0, 'br218.png');
    INSERT INTO vehicles VALUES (11, 0, 'V 100', 44, 100, 0, 1, 'v100.png');
    INSERT INTO vehicles VALUES (12, 1, 'Wagon', 0, 0, 0, 2, NULL);
    INSERT INTO vehicles VALUES (13, 0, 'Köf II', 7, 40, 1, 3, NULL);
    INSERT INTO functions VALUES (1, 10, 0, 0, 'L', NULL, 'light', 0, 1, 1);
    INSERT INTO functions VALUES (2, 10, 2, 1, '', NULL, 'horn', 1, 1, 1);
    INSERT INTO functions VALUES (3, 10, 5, 2, '', 3.0, 'bell', 2, 1, 1);
    INSERT INTO functions VALUES (4, 11, 0, 0, '', NULL, 'light', 0, 1, 1);
    INSERT INTO layout_data VALUES (1, 'Shelf');
";

/// A member to put in a fixture container.
pub struct Member<'a> {
    pub name: &'a str,
    pub data: Vec<u8>,
    pub method: CompressionMethod,
}

impl<'a> Member<'a> {
    pub fn deflated(name: &'a str, data: impl Into<Vec<u8>>) -> Self {
        Member {
            name,
            data: data.into(),
            method: CompressionMethod::Deflated,
        }
    }

    pub fn stored(name: &'a str, data: impl Into<Vec<u8>>) -> Self {
        Member {
            name,
            data: data.into(),
            method: CompressionMethod::Stored,
        }
    }
}

/// Timestamp on every fixture member.
pub fn fixture_time() -> DateTime {
    DateTime::from_date_and_time(2021, 5, 4, 12, 30, 10).expect("valid date")
}

/// Fake PNG bytes, distinct per seed.
pub fn png(seed: u8) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend((0..512u32).map(|i| (i as u8).wrapping_mul(seed)));
    data
}

/// Creates an SQLite payload from [`SCHEMA`] plus `rows`.
pub fn sqlite_payload(rows: &str) -> Vec<u8> {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("payload.sqlite");
    let conn = Connection::open(&path).expect("create database");
    conn.execute_batch(SCHEMA).expect("schema");
    conn.execute_batch(rows).expect("rows");
    conn.close().map_err(|(_, e)| e).expect("close database");
    std::fs::read(&path).expect("read database")
}

/// Zips `members` in order, with fixed timestamps and the fixture comment.
pub fn build_container(members: &[Member<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for member in members {
        let options = SimpleFileOptions::default()
            .compression_method(member.method)
            .last_modified_time(fixture_time())
            .unix_permissions(0o640);
        writer.start_file(member.name, options).expect("start member");
        writer.write_all(&member.data).expect("write member");
    }
    writer.set_comment(COMMENT);
    writer.finish().expect("finish archive").into_inner()
}

/// The usual export layout around an SQLite payload built from `rows`.
pub fn sqlite_container(rows: &str) -> Vec<u8> {
    build_container(&[
        Member::deflated("export/5f2c/meta.json", br#"{"app":"Z21","version":"1.4"}"#.to_vec()),
        Member::stored("export/5f2c/lok_3.png", png(3)),
        Member::deflated(SQLITE_MEMBER, sqlite_payload(rows)),
        Member::deflated("export/5f2c/icons/light.png", png(7)),
    ])
}

/// An export around an XML payload.
pub fn xml_container(xml: &str) -> Vec<u8> {
    build_container(&[
        Member::stored("export/5f2c/lok_3.png", png(3)),
        Member::deflated(XML_MEMBER, xml.as_bytes().to_vec()),
    ])
}

/// Writes `bytes` to `name` inside a fresh temporary directory.
pub fn write_fixture(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    (dir, path)
}

/// Raw view of a member, for byte-identity checks.
#[derive(Debug, PartialEq)]
pub struct RawMember {
    pub name: String,
    pub method: CompressionMethod,
    pub compressed: Vec<u8>,
    pub crc32: u32,
    pub modified: Option<DateTime>,
    pub unix_mode: Option<u32>,
}

/// Lists every member of the container at `path` without decompressing.
pub fn raw_members(path: &Path) -> Vec<RawMember> {
    let file = std::fs::File::open(path).expect("open container");
    let mut archive = ZipArchive::new(file).expect("valid zip");
    (0..archive.len())
        .map(|i| {
            let mut member = archive.by_index_raw(i).expect("member");
            let mut compressed = Vec::new();
            member.read_to_end(&mut compressed).expect("raw bytes");
            RawMember {
                name: member.name().to_string(),
                method: member.compression(),
                compressed,
                crc32: member.crc32(),
                modified: member.last_modified(),
                unix_mode: member.unix_mode(),
            }
        })
        .collect()
}

/// Extracts the SQLite payload of the container at `path` and opens it.
///
/// Returns the directory holding the database so it outlives the connection.
pub fn open_payload(path: &Path) -> (TempDir, Connection) {
    let file = std::fs::File::open(path).expect("open container");
    let mut archive = ZipArchive::new(file).expect("valid zip");
    let mut data = Vec::new();
    archive
        .by_name(SQLITE_MEMBER)
        .expect("payload member")
        .read_to_end(&mut data)
        .expect("payload bytes");

    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("payload.sqlite");
    std::fs::write(&db_path, data).expect("write payload");
    let conn = Connection::open(&db_path).expect("open payload");
    (dir, conn)
}

/// Function numbers stored for `vehicle_id`, ascending.
pub fn stored_functions(conn: &Connection, vehicle_id: i64) -> Vec<i64> {
    let mut stmt = conn
        .prepare("SELECT function FROM functions WHERE vehicle_id = ?1 ORDER BY function")
        .expect("prepare");
    stmt.query_map([vehicle_id], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows")
}

/// Finds the central directory record of `name` in `bytes`. Returns the
/// record offset, the host byte and the external attributes.
pub fn central_attributes(bytes: &[u8], name: &str) -> Option<(usize, u8, u32)> {
    (0..bytes.len().saturating_sub(46)).find_map(|at| {
        if &bytes[at..at + 4] != b"PK\x01\x02" {
            return None;
        }
        let name_len = u16::from_le_bytes([bytes[at + 28], bytes[at + 29]]) as usize;
        if bytes.get(at + 46..at + 46 + name_len)? != name.as_bytes() {
            return None;
        }
        let external = u32::from_le_bytes(bytes[at + 38..at + 42].try_into().ok()?);
        Some((at, bytes[at + 5], external))
    })
}

/// Rewrites the host byte and external attributes of `name`, as an archiver
/// on another system would have recorded them.
pub fn set_central_attributes(bytes: &mut [u8], name: &str, host: u8, external: u32) {
    let (at, _, _) = central_attributes(bytes, name).expect("central record");
    bytes[at + 5] = host;
    bytes[at + 38..at + 42].copy_from_slice(&external.to_le_bytes());
}
