//! In-memory representation of a parsed Z21 container.
//!
//! The model is the same for both payload formats. It is built fresh by
//! each parse, edited in place by the caller, and handed to the writer.

mod config;
mod function;
mod locomotive;
mod records;

pub use config::{FallbackReason, ParseOutcome, ParsedConfiguration};
pub use function::{ButtonKind, FunctionInfo, FunctionNumber, MAX_FUNCTION_NUMBER, NO_DURATION};
pub use locomotive::{Locomotive, VehicleId};
pub use records::{Accessory, Layout, UnknownBlock};

pub(crate) use function::{format_duration, validate_number};
