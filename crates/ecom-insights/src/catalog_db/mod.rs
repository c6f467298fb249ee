//! Catalog database module - imported e-commerce tables and their read path
pub mod importer;
pub mod schema;

pub use importer::{run_import, ImportError, ImportReport, Importer, TableOutcome, TableReport};
pub use schema::{ColumnSpec, Dataset, SqlType, Table, DATASETS};

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// A table row keyed by column name, in table column order
pub type Record = Map<String, Value>;

/// Read-only view over the imported catalog tables
pub struct CatalogStore {
    pool: Pool<SqliteConnectionManager>,
}

impl CatalogStore {
    /// Open an existing database file without write access
    pub fn open_read_only(db_path: &Path) -> anyhow::Result<Self> {
        info!("Opening catalog (read-only) at: {}", db_path.display());
        let manager = SqliteConnectionManager::file(db_path).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        );
        let pool = Pool::builder()
            .max_size(8)
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create catalog connection pool: {}", e))?;
        Ok(Self { pool })
    }

    /// Every row of `table`, in whatever order SQLite yields them
    pub fn dump_table(&self, table: Table) -> anyhow::Result<Vec<Record>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table.name()))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map([], |row| {
                let mut record = Map::with_capacity(columns.len());
                for (idx, name) in columns.iter().enumerate() {
                    record.insert(name.clone(), sql_to_json(row.get_ref(idx)?));
                }
                Ok(record)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Dumped {} rows from {}", rows.len(), table);
        Ok(rows)
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
