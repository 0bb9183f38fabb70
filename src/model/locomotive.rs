//! Locomotive records and their function table.

use std::collections::BTreeMap;
use std::fmt;

use super::function::{FunctionInfo, FunctionNumber, MAX_FUNCTION_NUMBER, validate_number};
use crate::{Error, Result};

/// Row identifier of a vehicle in the SQLite payload.
///
/// Carried on a [`Locomotive`] loaded from a database so that write-back can
/// find the same row even after the address and name were edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(i64);

impl VehicleId {
    /// Wraps a raw row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A locomotive and its configured functions.
///
/// Functions are held in a single map keyed by function number. The boolean
/// per-slot view returned by [`functions`](Self::functions) is computed from
/// it, so both views always have the same keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Locomotive {
    /// DCC decoder address. Not guaranteed unique.
    pub address: u32,
    /// Display name.
    pub name: String,
    /// Maximum speed parameter.
    pub speed: u32,
    /// Default travel direction, `true` for forward.
    pub direction: bool,
    /// Configuration variables by CV number.
    pub cvs: BTreeMap<u16, u8>,
    /// Backing row, if this locomotive was loaded from or written to a
    /// database payload.
    pub vehicle_id: Option<VehicleId>,
    function_details: BTreeMap<FunctionNumber, FunctionInfo>,
}

impl Default for Locomotive {
    fn default() -> Self {
        Self {
            address: 0,
            name: String::new(),
            speed: 0,
            direction: true,
            cvs: BTreeMap::new(),
            vehicle_id: None,
            function_details: BTreeMap::new(),
        }
    }
}

impl Locomotive {
    /// Creates a locomotive with the given address and name.
    pub fn new(address: u32, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the legacy view: function number to active flag.
    pub fn functions(&self) -> BTreeMap<FunctionNumber, bool> {
        self.function_details
            .iter()
            .map(|(number, info)| (*number, info.active))
            .collect()
    }

    /// Returns the detailed function map.
    pub fn function_details(&self) -> &BTreeMap<FunctionNumber, FunctionInfo> {
        &self.function_details
    }

    /// Returns the function at `number`.
    pub fn function(&self, number: FunctionNumber) -> Option<&FunctionInfo> {
        self.function_details.get(&number)
    }

    /// Returns a mutable reference to the function at `number`.
    pub fn function_mut(&mut self, number: FunctionNumber) -> Option<&mut FunctionInfo> {
        self.function_details.get_mut(&number)
    }

    /// Returns `true` if a function is configured at `number`.
    pub fn has_function(&self, number: FunctionNumber) -> bool {
        self.function_details.contains_key(&number)
    }

    /// Returns the number of configured functions.
    pub fn function_count(&self) -> usize {
        self.function_details.len()
    }

    /// Adds or replaces a function, returning the previous one at that number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFunctionNumber`] if the number is above 127.
    pub fn insert_function(&mut self, info: FunctionInfo) -> Result<Option<FunctionInfo>> {
        validate_number(info.number() as u32)?;
        Ok(self.function_details.insert(info.number(), info))
    }

    /// Removes and returns the function at `number`.
    pub fn remove_function(&mut self, number: FunctionNumber) -> Option<FunctionInfo> {
        self.function_details.remove(&number)
    }

    /// Moves a function to another number.
    ///
    /// A function already at `new` is replaced and returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FunctionNotFound`] if nothing is at `old`, or
    /// [`Error::InvalidFunctionNumber`] if `new` is above 127.
    pub fn renumber_function(
        &mut self,
        old: FunctionNumber,
        new: FunctionNumber,
    ) -> Result<Option<FunctionInfo>> {
        let new = validate_number(new as u32)?;
        if !self.function_details.contains_key(&old) {
            return Err(Error::FunctionNotFound { number: old });
        }
        if old == new {
            return Ok(None);
        }
        let Some(mut info) = self.function_details.remove(&old) else {
            return Err(Error::FunctionNotFound { number: old });
        };
        info.set_number(new);
        Ok(self.function_details.insert(new, info))
    }

    /// Enables or disables the function at `number`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FunctionNotFound`] if nothing is at `number`.
    pub fn set_function_active(&mut self, number: FunctionNumber, active: bool) -> Result<()> {
        let info = self
            .function_details
            .get_mut(&number)
            .ok_or(Error::FunctionNotFound { number })?;
        info.active = active;
        Ok(())
    }

    /// Returns the lowest function number in `0..=127` that is free.
    pub fn next_unused_function_number(&self) -> Option<FunctionNumber> {
        (0..=MAX_FUNCTION_NUMBER).find(|n| !self.function_details.contains_key(n))
    }

    /// Returns the position a newly appended function should get.
    pub fn next_position(&self) -> i64 {
        self.function_details
            .values()
            .map(|f| f.position)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Returns functions in display order: by position, then by number.
    pub fn sorted_functions(&self) -> Vec<&FunctionInfo> {
        let mut functions: Vec<_> = self.function_details.values().collect();
        functions.sort_by_key(|f| (f.position, f.number()));
        functions
    }

    /// Replaces the whole function table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFunctionNumber`] if any number is above 127;
    /// the current table is left unchanged in that case.
    pub fn set_functions<I>(&mut self, functions: I) -> Result<()>
    where
        I: IntoIterator<Item = FunctionInfo>,
    {
        let mut details = BTreeMap::new();
        for info in functions {
            validate_number(info.number() as u32)?;
            details.insert(info.number(), info);
        }
        self.function_details = details;
        Ok(())
    }
}

impl fmt::Display for Locomotive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (address {})", self.name, self.address)
    }
}
