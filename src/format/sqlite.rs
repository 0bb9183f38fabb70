//! SQLite payload reader (format 2).
//!
//! The payload is materialized to a temporary file and queried with a fixed
//! projection per table. Each query maps into its own row struct, so a
//! missing table or column fails the query and the whole parse.
//!
//! Tables read:
//!
//! | Table | Required | Used for |
//! |-------|----------|----------|
//! | `vehicles` | yes | locomotives (`type = 0`) |
//! | `functions` | yes | function slots per vehicle |
//! | `update_history` | yes | format version |
//! | `layout_data` | yes | layout names |

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db::TempDatabase;
use crate::model::{
    ButtonKind, FunctionInfo, Layout, Locomotive, NO_DURATION, ParsedConfiguration, VehicleId,
    format_duration, validate_number,
};
use crate::Result;

/// Vehicle `type` code for locomotives.
pub const LOCOMOTIVE_TYPE: i64 = 0;

/// Stored `traction_direction` code meaning forward.
pub const DIRECTION_FORWARD: i64 = 1;

/// Parses an SQLite payload.
///
/// The temporary copy of the database is removed before this returns,
/// whether or not parsing succeeded.
pub fn parse(bytes: &[u8]) -> Result<ParsedConfiguration> {
    let db = TempDatabase::materialize(bytes)?;
    let conn = db.open_read_only()?;
    let config = read_connection(&conn)?;
    drop(conn);
    Ok(config)
}

/// Reads a configuration from an open payload database.
pub fn read_connection(conn: &Connection) -> Result<ParsedConfiguration> {
    let mut config = ParsedConfiguration::new();

    if let Some(version) = read_version(conn)? {
        config.version = version;
    }

    for vehicle in read_vehicles(conn)? {
        let mut loco = vehicle.into_locomotive();
        let id = loco.vehicle_id.map(VehicleId::as_i64).unwrap_or_default();
        for row in read_functions(conn, id)? {
            if let Some(info) = row.into_function() {
                if let Err(e) = loco.insert_function(info) {
                    log::warn!("skipping stored function: {}", e);
                }
            }
        }
        config.locomotives.push(loco);
    }

    config.layouts = read_layouts(conn)?;

    log::debug!(
        "read {} locomotives and {} layouts from SQLite payload (version {})",
        config.locomotives.len(),
        config.layouts.len(),
        config.version
    );
    Ok(config)
}

fn read_version(conn: &Connection) -> Result<Option<u32>> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(to_database_version) FROM update_history",
        [],
        |row| row.get(0),
    )?;
    Ok(max.and_then(|v| u32::try_from(v).ok()).filter(|v| *v != 0))
}

/// Projection of `vehicles` used for locomotives.
#[derive(Debug)]
struct VehicleRow {
    id: i64,
    name: Option<String>,
    address: Option<i64>,
    max_speed: Option<i64>,
    traction_direction: Option<i64>,
}

impl VehicleRow {
    const QUERY: &'static str = "SELECT id, name, address, max_speed, traction_direction \
         FROM vehicles WHERE type = ?1 ORDER BY position";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            address: row.get(2)?,
            max_speed: row.get(3)?,
            traction_direction: row.get(4)?,
        })
    }

    fn into_locomotive(self) -> Locomotive {
        let mut loco = Locomotive::new(to_u32(self.address), self.name.unwrap_or_default());
        loco.speed = to_u32(self.max_speed);
        loco.direction = self.traction_direction == Some(DIRECTION_FORWARD);
        loco.vehicle_id = Some(VehicleId::new(self.id));
        loco
    }
}

fn read_vehicles(conn: &Connection) -> Result<Vec<VehicleRow>> {
    let mut stmt = conn.prepare(VehicleRow::QUERY)?;
    let rows = stmt
        .query_map(params![LOCOMOTIVE_TYPE], VehicleRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Projection of `functions` for one vehicle.
#[derive(Debug)]
struct FunctionRow {
    function: Option<i64>,
    position: Option<i64>,
    shortcut: Option<String>,
    time: Value,
    image_name: Option<String>,
    button_type: Option<i64>,
}

impl FunctionRow {
    const QUERY: &'static str = "SELECT function, position, shortcut, time, image_name, button_type \
         FROM functions WHERE vehicle_id = ?1 ORDER BY position";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            function: row.get(0)?,
            position: row.get(1)?,
            shortcut: row.get(2)?,
            time: row.get(3)?,
            image_name: row.get(4)?,
            button_type: row.get(5)?,
        })
    }

    /// Every stored row counts as an active function.
    fn into_function(self) -> Option<FunctionInfo> {
        let Some(raw) = self.function else {
            log::warn!("skipping stored function without a number");
            return None;
        };
        let Some(number) = u32::try_from(raw).ok().and_then(|n| validate_number(n).ok()) else {
            log::warn!("skipping stored function with out-of-range number {}", raw);
            return None;
        };
        let mut info = FunctionInfo::unchecked(number);
        info.position = self.position.unwrap_or_default();
        info.shortcut = self.shortcut.unwrap_or_default();
        info.image_name = self.image_name.unwrap_or_default();
        info.button = ButtonKind::from_code(self.button_type.unwrap_or_default());
        info.duration = duration_text(self.time);
        info.active = true;
        Some(info)
    }
}

fn read_functions(conn: &Connection, vehicle_id: i64) -> Result<Vec<FunctionRow>> {
    let mut stmt = conn.prepare_cached(FunctionRow::QUERY)?;
    let rows = stmt
        .query_map(params![vehicle_id], FunctionRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn read_layouts(conn: &Connection) -> Result<Vec<Layout>> {
    let mut stmt = conn.prepare("SELECT name FROM layout_data ORDER BY id")?;
    let layouts = stmt
        .query_map([], |row| {
            Ok(Layout {
                name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                ..Default::default()
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(layouts)
}

fn to_u32(value: Option<i64>) -> u32 {
    let raw = value.unwrap_or_default();
    u32::try_from(raw).unwrap_or_else(|_| {
        log::warn!("stored value {} does not fit the model, using 0", raw);
        0
    })
}

/// Converts a stored `time` cell to the model's duration text.
fn duration_text(value: Value) -> String {
    match value {
        Value::Null => NO_DURATION.to_string(),
        Value::Real(secs) => format_duration(secs),
        Value::Integer(secs) => secs.to_string(),
        Value::Text(text) => text,
        Value::Blob(_) => NO_DURATION.to_string(),
    }
}

/// Returns whether a locomotive row with this id exists.
pub(crate) fn locomotive_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT id FROM vehicles WHERE id = ?1 AND type = ?2",
            params![id, LOCOMOTIVE_TYPE],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE vehicles (
            id INTEGER PRIMARY KEY, type INTEGER, name TEXT, address INTEGER,
            max_speed INTEGER, traction_direction INTEGER, position INTEGER);
        CREATE TABLE functions (
            id INTEGER PRIMARY KEY, vehicle_id INTEGER, function INTEGER,
            position INTEGER, shortcut TEXT, time REAL, image_name TEXT,
            button_type INTEGER, is_configured INTEGER, show_function_number INTEGER);
        CREATE TABLE update_history (to_database_version INTEGER);
        CREATE TABLE layout_data (id INTEGER PRIMARY KEY, name TEXT);
    ";

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    #[test]
    fn test_reads_locomotives_in_position_order() {
        let conn = connection();
        conn.execute_batch(
            "INSERT INTO vehicles VALUES (1, 0, 'Second', 4, 100, 0, 2);
             INSERT INTO vehicles VALUES (2, 0, 'First', 3, 120, 1, 1);
             INSERT INTO vehicles VALUES (3, 1, 'Wagon', 0, 0, 0, 0);",
        )
        .unwrap();

        let config = read_connection(&conn).unwrap();
        assert_eq!(config.version, 0);
        let names: Vec<_> = config.locomotives.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);

        let first = &config.locomotives[0];
        assert_eq!(first.address, 3);
        assert_eq!(first.speed, 120);
        assert!(first.direction);
        assert_eq!(first.vehicle_id, Some(VehicleId::new(2)));
        assert!(!config.locomotives[1].direction);
    }

    #[test]
    fn test_null_columns_default() {
        let conn = connection();
        conn.execute_batch("INSERT INTO vehicles (id, type) VALUES (9, 0);")
            .unwrap();

        let loco = &read_connection(&conn).unwrap().locomotives[0];
        assert_eq!(loco.address, 0);
        assert_eq!(loco.name, "");
        assert_eq!(loco.speed, 0);
        assert!(!loco.direction);
    }

    #[test]
    fn test_reads_functions() {
        let conn = connection();
        conn.execute_batch(
            "INSERT INTO vehicles VALUES (1, 0, 'Loco', 3, 120, 1, 0);
             INSERT INTO functions VALUES (1, 1, 0, 0, 'L', NULL, 'light', 0, 1, 1);
             INSERT INTO functions VALUES (2, 1, 2, 1, '', 3.0, 'horn', 2, 1, 1);
             INSERT INTO functions VALUES (3, 1, 300, 2, '', NULL, 'bad', 0, 1, 1);
             INSERT INTO functions VALUES (4, 1, 200, 3, '', NULL, 'bad', 0, 1, 1);
             INSERT INTO functions VALUES (5, 1, 128, 4, '', NULL, 'bad', 0, 1, 1);
             INSERT INTO functions VALUES (6, 1, 127, 5, '', NULL, 'top', 0, 1, 1);",
        )
        .unwrap();

        let loco = &read_connection(&conn).unwrap().locomotives[0];
        let numbers: Vec<_> = loco.functions().into_keys().collect();
        assert_eq!(numbers, vec![0, 2, 127]);

        let light = loco.function(0).unwrap();
        assert_eq!(light.shortcut, "L");
        assert_eq!(light.duration, "0");
        assert_eq!(light.button, ButtonKind::Momentary);
        assert!(light.active);

        let horn = loco.function(2).unwrap();
        assert_eq!(horn.duration, "3.0");
        assert_eq!(horn.button, ButtonKind::Timed);
        assert_eq!(horn.position, 1);
    }

    #[test]
    fn test_reads_version_and_layouts() {
        let conn = connection();
        conn.execute_batch(
            "INSERT INTO update_history VALUES (3);
             INSERT INTO update_history VALUES (7);
             INSERT INTO layout_data VALUES (1, 'Shelf');
             INSERT INTO layout_data VALUES (2, NULL);",
        )
        .unwrap();

        let config = read_connection(&conn).unwrap();
        assert_eq!(config.version, 7);
        let names: Vec<_> = config.layouts.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Shelf", ""]);
    }

    #[test]
    fn test_empty_history_keeps_default_version() {
        let conn = connection();
        assert_eq!(read_connection(&conn).unwrap().version, 0);
    }

    #[test]
    fn test_missing_history_or_layout_table_is_fatal() {
        for table in ["update_history", "layout_data"] {
            let conn = connection();
            conn.execute_batch(&format!("DROP TABLE {table};")).unwrap();
            let err = read_connection(&conn).unwrap_err();
            assert!(err.is_database_error(), "{table}: {err:?}");
        }
    }

    #[test]
    fn test_missing_functions_table_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE vehicles (id INTEGER PRIMARY KEY, type INTEGER, name TEXT,
                address INTEGER, max_speed INTEGER, traction_direction INTEGER, position INTEGER);
             INSERT INTO vehicles (id, type) VALUES (1, 0);",
        )
        .unwrap();
        let err = read_connection(&conn).unwrap_err();
        assert!(err.is_database_error());
    }

    #[test]
    fn test_duration_text() {
        assert_eq!(duration_text(Value::Null), "0");
        assert_eq!(duration_text(Value::Real(2.5)), "2.5");
        assert_eq!(duration_text(Value::Real(4.0)), "4.0");
        assert_eq!(duration_text(Value::Integer(5)), "5");
        assert_eq!(duration_text(Value::Text("1.5".into())), "1.5");
    }

    #[test]
    fn test_locomotive_exists() {
        let conn = connection();
        conn.execute_batch(
            "INSERT INTO vehicles (id, type) VALUES (1, 0);
             INSERT INTO vehicles (id, type) VALUES (2, 1);",
        )
        .unwrap();
        assert!(locomotive_exists(&conn, 1).unwrap());
        assert!(!locomotive_exists(&conn, 2).unwrap());
        assert!(!locomotive_exists(&conn, 3).unwrap());
    }

    #[test]
    fn test_parse_garbage_bytes_fails() {
        assert!(parse(&[0x5A; 2048]).is_err());
    }
}
