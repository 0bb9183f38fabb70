//! Matching in-memory locomotives to stored vehicle rows.
//!
//! Address and name can both change in the same session that triggers a
//! write, so neither is a stable key. Lookup cascades:
//!
//! 1. the stored [`VehicleId`], if a locomotive row with that id still exists
//! 2. a locomotive row with the same address
//! 3. a locomotive row with exactly the same name (case-sensitive)
//!
//! When several rows match at steps 2 or 3, the lowest id wins.

use std::fmt;

use rusqlite::{Connection, OptionalExtension, params};

use crate::Result;
use crate::format::sqlite::{LOCOMOTIVE_TYPE, locomotive_exists};
use crate::model::{Locomotive, VehicleId};

/// Which lookup step found the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedBy {
    /// The stored identity token.
    Token,
    /// The DCC address.
    Address,
    /// The display name.
    Name,
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedBy::Token => write!(f, "stored id"),
            ResolvedBy::Address => write!(f, "address"),
            ResolvedBy::Name => write!(f, "name"),
        }
    }
}

/// A resolved vehicle row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The row id.
    pub id: VehicleId,
    /// How it was found.
    pub via: ResolvedBy,
}

/// Resolves the stored row for `loco`, or `None` if no step matches.
pub fn resolve(conn: &Connection, loco: &Locomotive) -> Result<Option<Resolution>> {
    if let Some(id) = loco.vehicle_id {
        if locomotive_exists(conn, id.as_i64())? {
            return Ok(Some(Resolution {
                id,
                via: ResolvedBy::Token,
            }));
        }
        log::debug!("stored vehicle {} no longer exists, falling back", id);
    }

    let by_address: Option<i64> = conn
        .query_row(
            "SELECT id FROM vehicles WHERE type = ?1 AND address = ?2 ORDER BY id LIMIT 1",
            params![LOCOMOTIVE_TYPE, loco.address],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = by_address {
        return Ok(Some(Resolution {
            id: VehicleId::new(id),
            via: ResolvedBy::Address,
        }));
    }

    let by_name: Option<i64> = conn
        .query_row(
            "SELECT id FROM vehicles WHERE type = ?1 AND name = ?2 ORDER BY id LIMIT 1",
            params![LOCOMOTIVE_TYPE, loco.name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(by_name.map(|id| Resolution {
        id: VehicleId::new(id),
        via: ResolvedBy::Name,
    }))
}
