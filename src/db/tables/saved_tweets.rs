//! Saved (ingested) timeline entry database operations

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::SavedTweet;

impl Database {
    /// Persist ingested timeline entries. Keyed by (handle, external id), so
    /// re-running an ingestion after a partial failure skips rows already
    /// saved. Returns the number of newly inserted rows.
    pub fn save_timeline_entries(
        &self,
        handle: &str,
        entries: &[(String, String, Option<String>)],
    ) -> SqliteResult<usize> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let mut inserted = 0;
        for (external_id, content, posted_at) in entries {
            inserted += conn.execute(
                "INSERT OR IGNORE INTO saved_tweets
                    (handle, external_tweet_id, content, posted_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![handle, external_id, content, posted_at, now],
            )?;
        }

        Ok(inserted)
    }

    pub fn list_saved_tweets(&self, handle: &str, limit: usize) -> SqliteResult<Vec<SavedTweet>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT handle, external_tweet_id, content, posted_at, created_at
             FROM saved_tweets WHERE handle = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;

        let entries = stmt
            .query_map(rusqlite::params![handle, limit as i64], map_saved_tweet_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }
}

fn map_saved_tweet_row(row: &rusqlite::Row) -> SqliteResult<SavedTweet> {
    let created_at_str: String = row.get(4)?;
    Ok(SavedTweet {
        handle: row.get(0)?,
        external_tweet_id: row.get(1)?,
        content: row.get(2)?,
        posted_at: row.get(3)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
