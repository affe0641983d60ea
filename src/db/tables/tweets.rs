//! Tweet database operations

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::Tweet;

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn insert_tweet(
        &self,
        handle: &str,
        content: &str,
        image_url: Option<&str>,
        link: Option<&str>,
        link_title: Option<&str>,
        link_preview_image_url: Option<&str>,
        action_type: &str,
    ) -> SqliteResult<Tweet> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO tweets
                (handle, content, image_url, link, link_title, link_preview_image_url,
                 action_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                handle,
                content,
                image_url,
                link,
                link_title,
                link_preview_image_url,
                action_type,
                now.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();

        Ok(Tweet {
            id,
            handle: handle.to_string(),
            content: content.to_string(),
            image_url: image_url.map(|s| s.to_string()),
            link: link.map(|s| s.to_string()),
            link_title: link_title.map(|s| s.to_string()),
            link_preview_image_url: link_preview_image_url.map(|s| s.to_string()),
            action_type: action_type.to_string(),
            created_at: now,
        })
    }

    pub fn list_tweets_for_handle(&self, handle: &str, limit: usize) -> SqliteResult<Vec<Tweet>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, handle, content, image_url, link, link_title,
                    link_preview_image_url, action_type, created_at
             FROM tweets WHERE handle = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;

        let tweets = stmt
            .query_map(rusqlite::params![handle, limit as i64], map_tweet_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(tweets)
    }

    pub fn count_tweets_for_handle(&self, handle: &str) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM tweets WHERE handle = ?1",
            [handle],
            |row| row.get(0),
        )
    }
}

fn map_tweet_row(row: &rusqlite::Row) -> SqliteResult<Tweet> {
    let created_at_str: String = row.get(8)?;
    Ok(Tweet {
        id: row.get(0)?,
        handle: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        link: row.get(4)?,
        link_title: row.get(5)?,
        link_preview_image_url: row.get(6)?,
        action_type: row.get(7)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}
