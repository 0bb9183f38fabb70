//! Writing locomotive edits into the payload database.

use std::collections::BTreeSet;

use rusqlite::{Connection, OptionalExtension, params};

use super::identity::{Resolution, resolve};
use crate::format::sqlite::DIRECTION_FORWARD;
use crate::model::{FunctionInfo, Locomotive, MAX_FUNCTION_NUMBER, NO_DURATION, VehicleId};
use crate::{Error, Result};

/// A locomotive that no stored row could be matched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLocomotive {
    /// Index in [`ParsedConfiguration::locomotives`](crate::ParsedConfiguration::locomotives).
    pub index: usize,
    /// Address at write time.
    pub address: u32,
    /// Name at write time.
    pub name: String,
}

/// Counts of changes applied to the payload database.
#[must_use = "sync report lists locomotives that were not written"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Vehicle rows updated.
    pub locomotives_updated: usize,
    /// Function rows inserted.
    pub functions_inserted: usize,
    /// Function rows updated in place.
    pub functions_updated: usize,
    /// Function rows deleted.
    pub functions_deleted: usize,
    /// Row resolved for each written locomotive, by model index.
    pub resolved: Vec<(usize, Resolution)>,
    /// Locomotives whose changes were not written.
    pub unresolved: Vec<UnresolvedLocomotive>,
}

impl SyncReport {
    /// Returns `true` if every locomotive was written.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns the total number of function rows touched.
    pub fn functions_changed(&self) -> usize {
        self.functions_inserted + self.functions_updated + self.functions_deleted
    }
}

/// Function row changes for one vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionChanges {
    /// Rows inserted.
    pub inserted: usize,
    /// Rows updated.
    pub updated: usize,
    /// Rows deleted.
    pub deleted: usize,
}

/// Writes every locomotive to its resolved row.
///
/// Locomotives that cannot be resolved are skipped and listed in the
/// report. The caller owns the surrounding transaction.
pub fn sync_locomotives(conn: &Connection, locomotives: &[Locomotive]) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for (index, loco) in locomotives.iter().enumerate() {
        let Some(resolution) = resolve(conn, loco)? else {
            log::warn!(
                "no stored vehicle matches locomotive '{}' (address {}), changes not written",
                loco.name,
                loco.address
            );
            report.unresolved.push(UnresolvedLocomotive {
                index,
                address: loco.address,
                name: loco.name.clone(),
            });
            continue;
        };

        log::debug!(
            "locomotive '{}' resolved to vehicle {} by {}",
            loco.name,
            resolution.id,
            resolution.via
        );
        update_vehicle(conn, resolution.id, loco)?;
        let changes = reconcile_functions(conn, resolution.id, loco)?;

        report.locomotives_updated += 1;
        report.functions_inserted += changes.inserted;
        report.functions_updated += changes.updated;
        report.functions_deleted += changes.deleted;
        report.resolved.push((index, resolution));
    }

    Ok(report)
}

/// Updates the vehicle row's name, address, speed and direction.
pub fn update_vehicle(conn: &Connection, id: VehicleId, loco: &Locomotive) -> Result<()> {
    let direction = if loco.direction { DIRECTION_FORWARD } else { 0 };
    conn.execute(
        "UPDATE vehicles SET name = ?1, address = ?2, max_speed = ?3, traction_direction = ?4 \
         WHERE id = ?5",
        params![loco.name, loco.address, loco.speed, direction, id.as_i64()],
    )?;
    Ok(())
}

/// Makes the stored function rows of `id` match the locomotive.
///
/// Rows whose number is gone from the model are deleted, rows still present
/// are updated in place, and new numbers are inserted. Existence is checked
/// per function number. Stored rows with a NULL or out-of-range number are
/// never loaded into the model and are left alone.
pub fn reconcile_functions(
    conn: &Connection,
    id: VehicleId,
    loco: &Locomotive,
) -> Result<FunctionChanges> {
    let vehicle = id.as_i64();
    let mut changes = FunctionChanges::default();

    let stored: BTreeSet<i64> = {
        let mut stmt = conn.prepare_cached("SELECT function FROM functions WHERE vehicle_id = ?1")?;
        let numbers = stmt
            .query_map(params![vehicle], |row| row.get::<_, Option<i64>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        numbers.into_iter().flatten().collect()
    };

    let removed = stored
        .iter()
        .filter_map(|n| u8::try_from(*n).ok())
        .filter(|n| *n <= MAX_FUNCTION_NUMBER && !loco.has_function(*n));
    for number in removed {
        changes.deleted += conn.execute(
            "DELETE FROM functions WHERE vehicle_id = ?1 AND function = ?2",
            params![vehicle, number],
        )?;
    }

    for info in loco.function_details().values() {
        let time = stored_time(info)?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM functions WHERE vehicle_id = ?1 AND function = ?2",
                params![vehicle, info.number()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        if exists {
            conn.execute(
                "UPDATE functions SET position = ?1, shortcut = ?2, time = ?3, image_name = ?4, \
                 button_type = ?5, is_configured = 1, show_function_number = 1 \
                 WHERE vehicle_id = ?6 AND function = ?7",
                params![
                    info.position,
                    info.shortcut,
                    time,
                    info.image_name,
                    info.button.code(),
                    vehicle,
                    info.number()
                ],
            )?;
            changes.updated += 1;
        } else {
            conn.execute(
                "INSERT INTO functions (vehicle_id, function, position, shortcut, time, \
                 image_name, button_type, is_configured, show_function_number) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 1)",
                params![
                    vehicle,
                    info.number(),
                    info.position,
                    info.shortcut,
                    time,
                    info.image_name,
                    info.button.code()
                ],
            )?;
            changes.inserted += 1;
        }
    }

    Ok(changes)
}

/// Encodes a duration for the `time` column: NULL for the "0" sentinel.
fn stored_time(info: &FunctionInfo) -> Result<Option<f64>> {
    let text = info.duration.trim();
    if text.is_empty() || text == NO_DURATION {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::invalid_value("duration", info.duration.clone()))
}
