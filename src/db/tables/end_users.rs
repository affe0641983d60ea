//! End user database operations

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use crate::models::EndUser;

impl Database {
    pub fn get_end_user(&self, wallet_address: &str) -> SqliteResult<Option<EndUser>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT wallet_address, has_created_agent, created_at
             FROM end_users WHERE wallet_address = ?1",
            [wallet_address],
            map_end_user_row,
        )
        .optional()
    }

    /// Conditional insert: a no-op if the address already exists. Returns
    /// the row and whether this call created it.
    pub fn insert_end_user_if_absent(&self, wallet_address: &str) -> SqliteResult<(EndUser, bool)> {
        let created = {
            let conn = self.conn.lock().unwrap();
            let now = Utc::now().to_rfc3339();
            let changed = conn.execute(
                "INSERT OR IGNORE INTO end_users (wallet_address, has_created_agent, created_at)
                 VALUES (?1, 0, ?2)",
                rusqlite::params![wallet_address, now],
            )?;
            changed > 0
        };

        let user = self
            .get_end_user(wallet_address)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok((user, created))
    }

    pub fn mark_agent_created(&self, wallet_address: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn.execute(
            "UPDATE end_users SET has_created_agent = 1 WHERE wallet_address = ?1",
            [wallet_address],
        )?;
        Ok(rows_affected > 0)
    }
}

fn map_end_user_row(row: &rusqlite::Row) -> SqliteResult<EndUser> {
    let created_at_str: String = row.get(2)?;
    Ok(EndUser {
        wallet_address: row.get(0)?,
        has_created_agent: row.get::<_, i32>(1)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
