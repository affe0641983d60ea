use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed storage. All table-group methods live in `db::tables` as
/// `impl Database` blocks.
///
/// Uniqueness is enforced at the storage layer (primary keys and UNIQUE
/// constraints on the natural keys), so concurrent ensure-exists callers
/// cannot create duplicate rows; a conditional insert that hits a
/// constraint simply means "already exists, re-read".
pub struct Database {
    pub(super) conn: Mutex<Connection>,
}

impl Database {
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS end_users (
                wallet_address TEXT PRIMARY KEY,
                has_created_agent INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_profiles (
                handle TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                bio TEXT,
                profile_picture_url TEXT,
                cover_picture_url TEXT,
                life_goals TEXT,
                skills TEXT,
                life_context TEXT,
                system_prompt TEXT,
                creator_wallet_address TEXT UNIQUE,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS wallets (
                handle TEXT PRIMARY KEY,
                address TEXT NOT NULL,
                private_key TEXT NOT NULL,
                permit_signature TEXT NOT NULL,
                funding_tx_hash TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tweets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                handle TEXT NOT NULL,
                content TEXT NOT NULL,
                image_url TEXT,
                link TEXT,
                link_title TEXT,
                link_preview_image_url TEXT,
                action_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS saved_tweets (
                handle TEXT NOT NULL,
                external_tweet_id TEXT NOT NULL,
                content TEXT NOT NULL,
                posted_at TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(handle, external_tweet_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS action_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                from_handle TEXT NOT NULL,
                to_handle TEXT,
                action_type TEXT NOT NULL,
                main_output TEXT NOT NULL,
                extra_data TEXT,
                top_level_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tweets_handle ON tweets (handle, created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_action_events_handle
             ON action_events (from_handle, created_at)",
            [],
        )?;

        Ok(())
    }
}
