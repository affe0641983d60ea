//! Agent profile database operations

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use crate::models::AgentProfile;

const PROFILE_COLUMNS: &str = "handle, display_name, bio, profile_picture_url, cover_picture_url,
     life_goals, skills, life_context, system_prompt, creator_wallet_address, active, created_at";

impl Database {
    pub fn get_agent_profile(&self, handle: &str) -> SqliteResult<Option<AgentProfile>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {} FROM agent_profiles WHERE handle = ?1", PROFILE_COLUMNS),
            [handle],
            map_profile_row,
        )
        .optional()
    }

    pub fn get_agent_profile_by_creator(
        &self,
        wallet_address: &str,
    ) -> SqliteResult<Option<AgentProfile>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!(
                "SELECT {} FROM agent_profiles WHERE creator_wallet_address = ?1",
                PROFILE_COLUMNS
            ),
            [wallet_address],
            map_profile_row,
        )
        .optional()
    }

    /// Insert a profile. Fails with a constraint violation if the handle or
    /// the creator address is already taken - callers treat that as
    /// "already exists, re-read" rather than a hard failure.
    pub fn insert_agent_profile(&self, profile: &AgentProfile) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO agent_profiles
                (handle, display_name, bio, profile_picture_url, cover_picture_url,
                 life_goals, skills, life_context, system_prompt,
                 creator_wallet_address, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                profile.handle,
                profile.display_name,
                profile.bio,
                profile.profile_picture_url,
                profile.cover_picture_url,
                profile.life_goals,
                profile.skills,
                profile.life_context,
                profile.system_prompt,
                profile.creator_wallet_address,
                profile.active as i32,
                profile.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Agents the scheduler iterates, oldest first, capped at `limit`
    pub fn list_active_agent_profiles(&self, limit: usize) -> SqliteResult<Vec<AgentProfile>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM agent_profiles WHERE active = 1 ORDER BY created_at ASC LIMIT ?1",
            PROFILE_COLUMNS
        ))?;

        let profiles = stmt
            .query_map([limit as i64], map_profile_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(profiles)
    }

    pub fn set_agent_active(&self, handle: &str, active: bool) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn.execute(
            "UPDATE agent_profiles SET active = ?1 WHERE handle = ?2",
            rusqlite::params![active as i32, handle],
        )?;
        Ok(rows_affected > 0)
    }
}

fn map_profile_row(row: &rusqlite::Row) -> SqliteResult<AgentProfile> {
    let created_at_str: String = row.get(11)?;
    Ok(AgentProfile {
        handle: row.get(0)?,
        display_name: row.get(1)?,
        bio: row.get(2)?,
        profile_picture_url: row.get(3)?,
        cover_picture_url: row.get(4)?,
        life_goals: row.get(5)?,
        skills: row.get(6)?,
        life_context: row.get(7)?,
        system_prompt: row.get(8)?,
        creator_wallet_address: row.get(9)?,
        active: row.get::<_, i32>(10)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
