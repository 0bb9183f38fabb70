//! The parsed configuration root and the tagged parse result.

use std::fmt;

use super::{Accessory, Layout, Locomotive, UnknownBlock};

/// Everything read from one container.
///
/// Created fresh by every parse. Only locomotives and their functions are
/// written back; edits to the other collections are not persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedConfiguration {
    /// Format version from the payload, 0 when the payload does not carry one.
    pub version: u32,
    /// Locomotives in stored display order.
    pub locomotives: Vec<Locomotive>,
    /// Accessories.
    pub accessories: Vec<Accessory>,
    /// Track layouts.
    pub layouts: Vec<Layout>,
    /// Input that could not be parsed, kept verbatim.
    pub unknown_blocks: Vec<UnknownBlock>,
}

impl ParsedConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first locomotive with the given address.
    pub fn find_by_address(&self, address: u32) -> Option<&Locomotive> {
        self.locomotives.iter().find(|l| l.address == address)
    }

    /// Returns a mutable reference to the first locomotive with the given address.
    pub fn find_by_address_mut(&mut self, address: u32) -> Option<&mut Locomotive> {
        self.locomotives.iter_mut().find(|l| l.address == address)
    }

    /// Returns the first locomotive whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Locomotive> {
        let needle = name.to_lowercase();
        self.locomotives
            .iter()
            .find(|l| l.name.to_lowercase() == needle)
    }

    /// Returns all locomotives whose name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&Locomotive> {
        let needle = term.to_lowercase();
        self.locomotives
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Returns `true` if nothing was parsed and nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.locomotives.is_empty()
            && self.accessories.is_empty()
            && self.layouts.is_empty()
            && self.unknown_blocks.is_empty()
    }
}

/// Why a parse fell back to capturing raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The input is not a ZIP archive.
    NotZip,
    /// The XML payload is not well-formed. Holds the parser message.
    MalformedXml(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotZip => write!(f, "not a ZIP container"),
            FallbackReason::MalformedXml(msg) => write!(f, "malformed XML payload: {}", msg),
        }
    }
}

/// Result of a successful parse.
///
/// Recoverable problems do not raise errors; they produce
/// [`Fallback`](Self::Fallback), whose configuration holds exactly one
/// [`UnknownBlock`] with the raw input.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The payload was parsed (or the container had no payload).
    Parsed(ParsedConfiguration),
    /// The input was captured as opaque bytes.
    Fallback {
        /// The configuration holding the captured block.
        config: ParsedConfiguration,
        /// What went wrong.
        reason: FallbackReason,
    },
}

impl ParseOutcome {
    /// Returns the configuration regardless of outcome.
    pub fn config(&self) -> &ParsedConfiguration {
        match self {
            ParseOutcome::Parsed(config) | ParseOutcome::Fallback { config, .. } => config,
        }
    }

    /// Consumes the outcome and returns the configuration.
    pub fn into_config(self) -> ParsedConfiguration {
        match self {
            ParseOutcome::Parsed(config) | ParseOutcome::Fallback { config, .. } => config,
        }
    }

    /// Returns `true` for [`Fallback`](Self::Fallback).
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    /// Returns the fallback reason, if any.
    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            ParseOutcome::Fallback { reason, .. } => Some(reason),
            ParseOutcome::Parsed(_) => None,
        }
    }

    pub(crate) fn fallback(data: Vec<u8>, reason: FallbackReason) -> Self {
        let config = ParsedConfiguration {
            unknown_blocks: vec![UnknownBlock::whole(data)],
            ..Default::default()
        };
        ParseOutcome::Fallback { config, reason }
    }
}
