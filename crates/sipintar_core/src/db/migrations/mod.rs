//! Forward-only schema steps for the local store.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(target user_version, script)`, ascending.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_local_collections.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

/// Brings `conn` up to [`latest_version`] in a single transaction.
///
/// Returns the version found before any step ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<_> = STEPS.iter().filter(|(version, _)| *version > found).collect();
    if pending.is_empty() {
        return Ok(found);
    }

    let tx = conn.transaction()?;
    for &&(version, script) in &pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration { version, source })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={} to={} steps={}",
        found,
        supported,
        pending.len()
    );
    Ok(found)
}
