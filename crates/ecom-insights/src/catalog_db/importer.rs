//! CSV importer - destructive refresh of the catalog tables
//!
//! A run drops and recreates every catalog table, then loads each dataset
//! strictly in order. Each table is inserted inside its own transaction;
//! a failing table is rolled back and logged while the remaining datasets
//! still load.

use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, error, info};

use super::schema::{self, Dataset, Table, DATASETS};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("required column '{column}' missing from {file}")]
    MissingColumn { file: &'static str, column: &'static str },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Result of loading a single dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Imported { rows: usize },
    MissingFile { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct TableReport {
    pub table: Table,
    pub outcome: TableOutcome,
}

/// Per-table outcomes of one import run, in load order
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub tables: Vec<TableReport>,
}

impl ImportReport {
    pub fn outcome(&self, table: Table) -> Option<&TableOutcome> {
        self.tables.iter().find(|t| t.table == table).map(|t| &t.outcome)
    }

    pub fn total_rows(&self) -> usize {
        self.tables
            .iter()
            .map(|t| match t.outcome {
                TableOutcome::Imported { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| !matches!(t.outcome, TableOutcome::Imported { .. }))
            .count()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Import summary:")?;
        for report in &self.tables {
            match &report.outcome {
                TableOutcome::Imported { rows } => {
                    writeln!(f, "   {:<22} {} rows", report.table.name(), rows)?
                }
                TableOutcome::MissingFile { path } => {
                    writeln!(f, "   {:<22} skipped (missing {})", report.table.name(), path.display())?
                }
                TableOutcome::Failed { reason } => {
                    writeln!(f, "   {:<22} failed ({})", report.table.name(), reason)?
                }
            }
        }
        write!(
            f,
            "   {} rows total, {} table(s) not imported",
            self.total_rows(),
            self.failures()
        )
    }
}

pub struct Importer {
    conn: Connection,
    data_dir: PathBuf,
}

impl Importer {
    /// Open (or create) the database file and bind it to a CSV directory
    pub fn open(db_path: &Path, data_dir: &Path) -> anyhow::Result<Self> {
        info!("Opening catalog database at: {}", db_path.display());
        let conn = Connection::open(db_path)?;
        Ok(Self::with_connection(conn, data_dir))
    }

    pub fn with_connection(conn: Connection, data_dir: &Path) -> Self {
        Self { conn, data_dir: data_dir.to_path_buf() }
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drop and recreate all catalog tables. This is a full reset.
    pub fn reset_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(&schema::reset_sql())?;
        debug!("Recreated {} catalog tables", DATASETS.len());
        Ok(())
    }

    /// Load one CSV file into its table, returning the number of rows inserted.
    pub fn load_dataset(&mut self, dataset: &Dataset) -> Result<usize, ImportError> {
        let path = self.data_dir.join(dataset.file_name);
        if !path.exists() {
            return Err(ImportError::MissingFile(path));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        let headers = reader.headers()?.clone();
        let mut positions = Vec::with_capacity(dataset.columns.len());
        for column in dataset.columns {
            let position = headers.iter().position(|h| h.trim() == column.name);
            if position.is_none() {
                if column.required {
                    return Err(ImportError::MissingColumn {
                        file: dataset.file_name,
                        column: column.name,
                    });
                }
                debug!("{} has no '{}' column, storing NULL", dataset.file_name, column.name);
            }
            positions.push(position);
        }

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&dataset.insert_sql())?;
            for record in &records {
                let values = positions.iter().zip(dataset.columns).map(|(position, column)| {
                    position.and_then(|i| record.get(i)).or(column.default)
                });
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    /// Reset the schema and load every dataset in order.
    pub fn run(&mut self) -> anyhow::Result<ImportReport> {
        info!("⏳ Starting import...");
        self.reset_schema()?;

        let mut report = ImportReport::default();
        for dataset in DATASETS.iter() {
            let outcome = match self.load_dataset(dataset) {
                Ok(rows) => {
                    info!("✅ Imported {} rows into {}", rows, dataset.table);
                    TableOutcome::Imported { rows }
                }
                Err(ImportError::MissingFile(path)) => {
                    error!("❌ File not found: {}", path.display());
                    TableOutcome::MissingFile { path }
                }
                Err(e) => {
                    error!("❌ Failed to import {}: {}", dataset.table, e);
                    TableOutcome::Failed { reason: e.to_string() }
                }
            };
            report.tables.push(TableReport { table: dataset.table, outcome });
        }

        if report.failures() == 0 {
            info!("✅ All data imported successfully!");
        } else {
            info!("Import finished with {} table(s) not imported", report.failures());
        }
        Ok(report)
    }
}

/// Entry point used by the `import` subcommand
pub fn run_import(db_path: &Path, data_dir: &Path) -> anyhow::Result<ImportReport> {
    Importer::open(db_path, data_dir)?.run()
}
