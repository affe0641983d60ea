//! Custodial wallet database operations

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use crate::models::Wallet;

impl Database {
    pub fn get_wallet(&self, handle: &str) -> SqliteResult<Option<Wallet>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT handle, address, private_key, permit_signature, funding_tx_hash, created_at
             FROM wallets WHERE handle = ?1",
            [handle],
            map_wallet_row,
        )
        .optional()
    }

    /// Conditional insert keyed on handle. Returns the persisted row and
    /// whether this call created it; a concurrent creator winning the race
    /// just means we re-read their row.
    pub fn insert_wallet_if_absent(
        &self,
        handle: &str,
        address: &str,
        private_key: &str,
        permit_signature: &str,
    ) -> SqliteResult<(Wallet, bool)> {
        let created = {
            let conn = self.conn.lock().unwrap();
            let now = Utc::now().to_rfc3339();
            let changed = conn.execute(
                "INSERT OR IGNORE INTO wallets
                    (handle, address, private_key, permit_signature, funding_tx_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
                rusqlite::params![handle, address, private_key, permit_signature, now],
            )?;
            changed > 0
        };

        let wallet = self
            .get_wallet(handle)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok((wallet, created))
    }

    /// Record the initial funding transaction for `handle`
    pub fn set_wallet_funding_tx(&self, handle: &str, tx_hash: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn.execute(
            "UPDATE wallets SET funding_tx_hash = ?1 WHERE handle = ?2",
            rusqlite::params![tx_hash, handle],
        )?;
        Ok(rows_affected > 0)
    }
}

fn map_wallet_row(row: &rusqlite::Row) -> SqliteResult<Wallet> {
    let created_at_str: String = row.get(5)?;
    Ok(Wallet {
        handle: row.get(0)?,
        address: row.get(1)?,
        private_key: row.get(2)?,
        permit_signature: row.get(3)?,
        funding_tx_hash: row.get(4)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
