//! Chat log database - conversations and the exchanges recorded against them
pub mod migration;

pub use migration::MigrationManager;

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatLogStats {
    pub conversations: i64,
    pub messages: i64,
}

/// Read-write handle on the chat log tables
pub struct ChatLog {
    pool: Pool<SqliteConnectionManager>,
}

impl ChatLog {
    /// Open (or create) the database file and apply pending chat log migrations
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        info!("Opening chat log at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path)
            .with_flags(
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                    | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )
            });
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create chat log connection pool: {}", e))?;

        {
            let mut conn = pool.get()?;
            let mut migrator = MigrationManager::new(&mut conn);
            migrator.initialize_database()?;
        }

        info!("Chat log initialized successfully");
        Ok(Self { pool })
    }

    /// Insert a new conversation for `user_id` and return its id
    pub fn create_conversation(&self, user_id: &str) -> anyhow::Result<i64> {
        let conn = self.pool.get()?;
        conn.execute("INSERT INTO conversations (user_id) VALUES (?1)", params![user_id])?;
        let id = conn.last_insert_rowid();
        debug!("Created conversation {} for user {}", id, user_id);
        Ok(id)
    }

    /// Record one prompt/reply exchange against a conversation
    pub fn store_message(
        &self,
        conversation_id: i64,
        user_message: &str,
        ai_response: &str,
    ) -> anyhow::Result<i64> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO chat_messages (conversation_id, user_message, ai_response)
             VALUES (?1, ?2, ?3)",
            params![conversation_id, user_message, ai_response],
        )?;
        Ok(conn.last_insert_rowid())
    }

    #[cfg(test)]
    pub(crate) fn message_count(&self, conversation_id: i64) -> anyhow::Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM chat_messages WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_stats(&self) -> anyhow::Result<ChatLogStats> {
        let conn = self.pool.get()?;
        let conversations = conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;
        let messages = conn.query_row("SELECT COUNT(*) FROM chat_messages", [], |row| row.get(0))?;
        Ok(ChatLogStats { conversations, messages })
    }
}
