//! Path-based container handle.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::{ContainerInfo, MemberInfo, ParseOptions, parse_reader};
use crate::format::detect::sniff;
use crate::format::detect_payload;
use crate::format::reader::BinaryReader;
use crate::model::{ParseOutcome, ParsedConfiguration};
use crate::write::{WriteOptions, WriteResult, write_container};
use crate::Result;

/// A container file on disk.
///
/// Holds only the path. Every call opens the file afresh, so a `Container`
/// never sees stale data and never keeps a handle open between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    path: PathBuf,
}

impl Container {
    /// Opens a container, checking that the path is a readable file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            )
            .into());
        }
        Ok(Self { path })
    }

    /// Returns the container path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses the container with default options.
    pub fn parse(&self) -> Result<ParseOutcome> {
        self.parse_with_options(&ParseOptions::default())
    }

    /// Parses the container.
    pub fn parse_with_options(&self, options: &ParseOptions) -> Result<ParseOutcome> {
        let file = BufReader::new(File::open(&self.path)?);
        parse_reader(file, options)
    }

    /// Describes the container members without parsing the payload.
    pub fn info(&self) -> Result<ContainerInfo> {
        let mut reader = BinaryReader::new(BufReader::new(File::open(&self.path)?));
        let signature = sniff(&mut reader)?;
        let file_size = reader.len()?;

        let mut archive = match ZipArchive::new(reader.into_inner()) {
            Ok(archive) => archive,
            Err(e) => {
                log::debug!("{} is not a ZIP container: {}", self.path.display(), e);
                return Ok(ContainerInfo {
                    file_size,
                    signature,
                    is_zip: false,
                    members: Vec::new(),
                    payload: None,
                    comment: None,
                });
            }
        };

        let payload = detect_payload(archive.file_names());
        let mut members = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            members.push(MemberInfo {
                name: file.name().to_string(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                method: file.compression(),
                is_payload: payload.as_ref().is_some_and(|p| p.name == file.name()),
            });
        }

        let comment = (!archive.comment().is_empty())
            .then(|| String::from_utf8_lossy(archive.comment()).into_owned());

        Ok(ContainerInfo {
            file_size,
            signature,
            is_zip: true,
            members,
            payload,
            comment,
        })
    }

    /// Writes `config` back to `output`, using this container as the source.
    ///
    /// See [`write_container`] for the guarantees.
    pub fn write(
        &self,
        config: &mut ParsedConfiguration,
        output: impl AsRef<Path>,
    ) -> Result<WriteResult> {
        self.write_with_options(config, output, &WriteOptions::default())
    }

    /// Writes `config` back over this container.
    pub fn write_in_place(&self, config: &mut ParsedConfiguration) -> Result<WriteResult> {
        self.write_with_options(config, &self.path, &WriteOptions::default())
    }

    /// Writes `config` to `output` with explicit options.
    pub fn write_with_options(
        &self,
        config: &mut ParsedConfiguration,
        output: impl AsRef<Path>,
        options: &WriteOptions,
    ) -> Result<WriteResult> {
        write_container(&self.path, config, output.as_ref(), options)
    }
}
