//! Chat log schema migrations

use rusqlite::{Connection, OptionalExtension, Result};
use tracing::{error, info};

/// Applies the chat log migrations that a database has not seen yet
pub struct MigrationManager<'a> {
    conn: &'a mut Connection,
}

impl<'a> MigrationManager<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }

    /// Bring the database up to the latest chat log schema
    pub fn initialize_database(&mut self) -> Result<()> {
        info!("Initializing chat log schema...");

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        let current_version = self.get_current_version()?;
        info!("Current chat log schema version: {}", current_version);

        self.apply_migrations()
    }

    fn apply_migrations(&mut self) -> Result<()> {
        for (version, migration_sql) in get_migrations() {
            if self.has_migration_applied(version)? {
                continue;
            }
            info!("Applying migration {}...", version);

            let tx = self.conn.transaction()?;
            if let Err(e) = tx.execute_batch(migration_sql) {
                error!("Failed to apply migration {}: {}", version, e);
                return Err(e);
            }
            tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
            tx.commit()?;

            info!("Migration {} applied successfully", version);
        }
        Ok(())
    }

    pub fn get_current_version(&self) -> Result<i32> {
        self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }

    pub fn has_migration_applied(&self, version: i32) -> Result<bool> {
        self.conn
            .query_row("SELECT 1 FROM schema_version WHERE version = ?1", [version], |_| Ok(()))
            .optional()
            .map(|found| found.is_some())
    }
}

fn get_migrations() -> Vec<(i32, &'static str)> {
    vec![(1, include_str!("migrations/001_chat_log.sql"))]
}
