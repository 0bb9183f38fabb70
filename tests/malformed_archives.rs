//! Tests for malformed and corrupted container handling.
//!
//! Input with the wrong shape is captured, not rejected. Input that looks
//! right but breaks mid-read is an error.

mod common;

use common::{FLEET, Member, SQLITE_MEMBER, XML_MEMBER};
use z21cfg::read::{Container, parse_bytes};
use z21cfg::{Error, FallbackReason};

#[test]
fn test_plain_text_is_one_block() {
    let data = b"Lok;Adresse\nBR 218;3\n";
    let outcome = parse_bytes(data).unwrap();
    assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::NotZip));

    let config = outcome.config();
    assert!(config.locomotives.is_empty());
    assert_eq!(config.unknown_blocks.len(), 1);
    assert_eq!(config.unknown_blocks[0].offset, 0);
    assert_eq!(config.unknown_blocks[0].length, data.len() as u64);
    assert_eq!(config.unknown_blocks[0].data, data.to_vec());
}

#[test]
fn test_empty_input_is_one_empty_block() {
    let outcome = parse_bytes(&[]).unwrap();
    assert!(outcome.is_fallback());
    assert_eq!(outcome.config().unknown_blocks.len(), 1);
    assert_eq!(outcome.config().unknown_blocks[0].length, 0);
}

#[test]
fn test_bare_sqlite_file_is_not_a_container() {
    let payload = common::sqlite_payload(common::SINGLE_LOCO);
    let outcome = parse_bytes(&payload).unwrap();
    assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::NotZip));
    assert!(outcome.config().locomotives.is_empty());
    assert_eq!(outcome.config().unknown_blocks[0].data, payload);
}

#[test]
fn test_truncated_container_is_captured() {
    let bytes = common::sqlite_container(FLEET);
    let truncated = &bytes[..bytes.len() / 2];
    let outcome = parse_bytes(truncated).unwrap();
    assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::NotZip));
    assert_eq!(
        outcome.config().unknown_blocks[0].length,
        truncated.len() as u64
    );
}

#[test]
fn test_malformed_xml_payload_is_captured() {
    let xml = "<z21><locos><loco><name>Lok</name></locos>";
    let outcome = parse_bytes(&common::xml_container(xml)).unwrap();
    assert!(matches!(
        outcome.fallback_reason(),
        Some(FallbackReason::MalformedXml(_))
    ));

    let config = outcome.config();
    assert!(config.locomotives.is_empty());
    assert_eq!(config.unknown_blocks.len(), 1);
    assert_eq!(config.unknown_blocks[0].length, xml.len() as u64);
    assert_eq!(config.unknown_blocks[0].data, xml.as_bytes());
}

#[test]
fn test_malformed_xml_keeps_multibyte_length() {
    let xml = "<z21><name>Köf – Ü</name>";
    let outcome = parse_bytes(&common::xml_container(xml)).unwrap();
    assert!(outcome.is_fallback());
    assert_eq!(
        outcome.config().unknown_blocks[0].length,
        xml.as_bytes().len() as u64
    );
}

#[test]
fn test_garbage_sqlite_payload_is_error() {
    let bytes = common::build_container(&[Member::deflated(
        SQLITE_MEMBER,
        b"this is not a database at all, just text".repeat(50),
    )]);
    let err = parse_bytes(&bytes).unwrap_err();
    assert!(err.is_database_error(), "unexpected error: {:?}", err);
}

#[test]
fn test_unexpected_schema_is_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("other.sqlite");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch("CREATE TABLE cars (id INTEGER PRIMARY KEY, model TEXT);")
        .unwrap();
    drop(conn);

    let bytes = common::build_container(&[Member::deflated(
        SQLITE_MEMBER,
        std::fs::read(&db_path).unwrap(),
    )]);
    let err = parse_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[test]
fn test_corrupted_member_data_is_error() {
    let mut bytes = common::build_container(&[Member::stored(
        XML_MEMBER,
        "<z21><locos></locos></z21>".repeat(200).into_bytes(),
    )]);
    // Local header (30 bytes) plus the member name, then the stored data.
    let inside = 30 + XML_MEMBER.len() + 100;
    bytes[inside] ^= 0xA5;

    let err = parse_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Error::Io(_) | Error::Zip(_)), "unexpected error: {:?}", err);
}

#[test]
fn test_write_from_non_zip_source_fails() {
    let (dir, path) = common::write_fixture("notes.z21", b"no archive here");
    let container = Container::open(&path).unwrap();
    let mut config = container.parse().unwrap().into_config();
    assert_eq!(config.unknown_blocks.len(), 1);

    let output = dir.path().join("out.z21");
    let err = container.write(&mut config, &output).unwrap_err();
    assert!(matches!(err, Error::Zip(_)));
    assert!(!output.exists());
}

#[test]
fn test_open_directory_is_error() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(Container::open(dir.path()).is_err());
}
