//! Applying model edits to an SQLite payload.
//!
//! Used by the writer, but public so that callers holding their own
//! connection to a payload database can apply the same updates.
//!
//! # Example
//!
//! ```rust
//! use rusqlite::Connection;
//! use z21cfg::edit::{ResolvedBy, resolve};
//! use z21cfg::Locomotive;
//!
//! let conn = Connection::open_in_memory()?;
//! conn.execute_batch(
//!     "CREATE TABLE vehicles (id INTEGER PRIMARY KEY, type INTEGER, name TEXT, address INTEGER);
//!      INSERT INTO vehicles VALUES (12, 0, 'BR 218', 3);",
//! )?;
//!
//! let loco = Locomotive::new(3, "renamed");
//! let found = resolve(&conn, &loco)?.unwrap();
//! assert_eq!(found.id.as_i64(), 12);
//! assert_eq!(found.via, ResolvedBy::Address);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod identity;
mod sync;

pub use identity::{Resolution, ResolvedBy, resolve};
pub use sync::{
    FunctionChanges, SyncReport, UnresolvedLocomotive, reconcile_functions, sync_locomotives,
    update_vehicle,
};
