//! # z21cfg
//!
//! Read, edit and write back Z21 model-railway configuration files.
//!
//! A `.z21` file is a ZIP archive. One member holds the locomotive data,
//! either a legacy XML document (`*.xml`, format 1) or an SQLite database
//! (`*.sqlite`, format 2). The other members are icons, images and
//! metadata that this crate never interprets and always preserves.
//!
//! Both payload formats are read into the same [`ParsedConfiguration`].
//! Edits to locomotives and their functions can be written back into
//! SQLite containers; everything except the payload member is copied into
//! the new archive byte for byte.
//!
//! ## Quick Start
//!
//! ### Reading a Container
//!
//! ```rust,no_run
//! use z21cfg::{Container, Result};
//!
//! fn main() -> Result<()> {
//!     let container = Container::open("layout.z21")?;
//!     let config = container.parse()?.into_config();
//!
//!     for loco in &config.locomotives {
//!         println!("{} (address {}), {} functions",
//!             loco.name, loco.address, loco.function_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Editing and Writing Back
//!
//! ```rust,no_run
//! use z21cfg::{ButtonKind, Container, FunctionInfo, Result};
//!
//! fn main() -> Result<()> {
//!     let container = Container::open("layout.z21")?;
//!     let mut config = container.parse()?.into_config();
//!
//!     if let Some(loco) = config.find_by_address_mut(3) {
//!         loco.name = "BR 218".into();
//!         let number = loco.next_unused_function_number().unwrap_or(0);
//!         let mut horn = FunctionInfo::new(number)?
//!             .with_image("horn")
//!             .with_position(loco.next_position());
//!         horn.set_timed(2.5)?;
//!         loco.insert_function(horn)?;
//!         if let Some(light) = loco.function_mut(0) {
//!             light.set_button(ButtonKind::PushButton);
//!         }
//!     }
//!
//!     let result = container.write(&mut config, "layout-edited.z21")?;
//!     println!("{} locomotives written", result.locomotives_updated);
//!     Ok(())
//! }
//! ```
//!
//! ## Malformed Input
//!
//! Input that cannot be parsed structurally is kept, not rejected. A file
//! that is not a ZIP archive, or a container whose XML payload is broken,
//! parses to [`ParseOutcome::Fallback`] holding the raw bytes in a single
//! [`UnknownBlock`]:
//!
//! ```rust
//! use z21cfg::{FallbackReason, read::parse_bytes};
//!
//! let outcome = parse_bytes(b"definitely not a zip").unwrap();
//! assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::NotZip));
//! assert_eq!(outcome.config().unknown_blocks[0].length, 20);
//! ```
//!
//! An SQLite payload whose schema does not match is a hard error
//! ([`Error::Database`]), since no partial model can be trusted.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `bundled` | Yes | Compile SQLite from source |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod db;
pub mod edit;
pub mod error;
pub mod format;
pub mod model;
pub mod read;
pub mod write;

pub use error::{Error, Result};
pub use format::PayloadFormat;
pub use model::{
    Accessory, ButtonKind, FallbackReason, FunctionInfo, Layout, Locomotive, ParseOutcome,
    ParsedConfiguration, UnknownBlock, VehicleId,
};
pub use read::{Container, ContainerInfo, ParseOptions};
pub use write::{WriteOptions, WriteResult};
