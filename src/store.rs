use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};

use crate::models::JobAdRecord;

pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.init()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: PathBuf::from(":memory:"),
        };
        store.init()?;
        Ok(store)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS job_ads (
                id TEXT PRIMARY KEY,
                title TEXT,
                full_text TEXT,
                job_type TEXT,
                deadline DATE
            );
            "#,
        )?;
        Ok(())
    }

    /// Start a batch of writes. Nothing is persisted until [`Batch::commit`].
    pub fn begin(&mut self) -> Result<Batch<'_>> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;
        Ok(Batch { tx })
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM job_ads", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Result<Option<JobAdRecord>> {
        self.conn
            .query_row(
                "SELECT id, title, full_text, job_type, deadline FROM job_ads WHERE id = ?1",
                [id],
                row_to_record,
            )
            .optional()
            .context("Failed to load job ad")
    }
}

/// Writes of one harvest run. Dropping an uncommitted batch rolls it back.
pub struct Batch<'a> {
    tx: Transaction<'a>,
}

impl Batch<'_> {
    /// Sees rows inserted earlier in this batch.
    pub fn contains(&self, id: &str) -> Result<bool> {
        let found: Option<String> = self
            .tx
            .query_row("SELECT id FROM job_ads WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn insert(&self, record: &JobAdRecord) -> Result<()> {
        self.tx
            .execute(
                "INSERT INTO job_ads (id, title, full_text, job_type, deadline)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.title,
                    record.full_text,
                    record.job_type,
                    record.deadline
                ],
            )
            .with_context(|| format!("Failed to insert job ad {}", record.id))?;
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit().context("Failed to commit job ads")
    }

    pub fn rollback(self) -> Result<()> {
        self.tx.rollback().context("Failed to roll back job ads")
    }
}

#[cfg(test)]
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<JobAdRecord> {
    Ok(JobAdRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        full_text: row.get(2)?,
        job_type: row.get(3)?,
        deadline: row.get(4)?,
    })
}
