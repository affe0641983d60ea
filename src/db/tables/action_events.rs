//! Action event (audit log) database operations

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::ActionEvent;

impl Database {
    pub fn insert_action_event(
        &self,
        from_handle: &str,
        to_handle: Option<&str>,
        action_type: &str,
        main_output: &str,
        extra_data: Option<&str>,
        top_level_type: &str,
    ) -> SqliteResult<ActionEvent> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO action_events
                (from_handle, to_handle, action_type, main_output, extra_data,
                 top_level_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                from_handle,
                to_handle,
                action_type,
                main_output,
                extra_data,
                top_level_type,
                now.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();

        Ok(ActionEvent {
            id,
            from_handle: from_handle.to_string(),
            to_handle: to_handle.map(|s| s.to_string()),
            action_type: action_type.to_string(),
            main_output: main_output.to_string(),
            extra_data: extra_data.map(|s| s.to_string()),
            top_level_type: top_level_type.to_string(),
            created_at: now,
        })
    }

    pub fn list_action_events_for_handle(
        &self,
        handle: &str,
        limit: usize,
    ) -> SqliteResult<Vec<ActionEvent>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, from_handle, to_handle, action_type, main_output, extra_data,
                    top_level_type, created_at
             FROM action_events WHERE from_handle = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;

        let events = stmt
            .query_map(rusqlite::params![handle, limit as i64], map_action_event_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(events)
    }
}

fn map_action_event_row(row: &rusqlite::Row) -> SqliteResult<ActionEvent> {
    let created_at_str: String = row.get(7)?;
    Ok(ActionEvent {
        id: row.get(0)?,
        from_handle: row.get(1)?,
        to_handle: row.get(2)?,
        action_type: row.get(3)?,
        main_output: row.get(4)?,
        extra_data: row.get(5)?,
        top_level_type: row.get(6)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
