//! Main store implementation.

use std::io;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use incubator_core::IncubationRepository;
use incubator_types::{CompletedIncubation, Incubation, timestamp};

use crate::error::{Error, Result};
use crate::models::{RECORD_COLUMNS, RecordRow};
use crate::schema;

/// Column names of the history CSV export.
const HISTORY_CSV_HEADER: [&str; 8] = [
    "inicio",
    "ovos",
    "raca",
    "observacoes",
    "ovoscopia",
    "nascimentos",
    "fim",
    "dias",
];

/// SQLite-based store for the active incubation and its history.
pub struct Store {
    conn: Connection,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Entries found in the input.
    pub total: usize,
    /// Entries written to the database.
    pub imported: usize,
    /// Entries already present (or, for the active record, not applied).
    pub skipped: usize,
    /// One message per entry that could not be decoded or validated.
    pub errors: Vec<String>,
}

/// Totals over the whole history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub cycles: usize,
    pub eggs: u64,
    pub hatched: u64,
    /// Hatched over set eggs, in percent.
    pub hatch_rate: f32,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Active record operations
impl Store {
    /// Get the active record, if any.
    pub fn get_active(&self) -> Result<Option<Incubation>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM active_incubation WHERE id = 1"),
                [],
                |row| Ok(RecordRow::from_row(row)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(Err(e)) => Err(Error::ActiveRecordCorrupt {
                field: "row",
                reason: e.to_string(),
            }),
            Some(Ok(row)) => row
                .into_incubation()
                .map(Some)
                .map_err(|(field, reason)| Error::ActiveRecordCorrupt { field, reason }),
        }
    }

    /// Replace the active record.
    pub fn put_active(&self, record: &Incubation) -> Result<()> {
        write_active(&self.conn, record)?;
        debug!("Saved active record started {}", timestamp::format(record.started_at));
        Ok(())
    }

    /// Delete the active record. Returns whether one existed.
    pub fn delete_active(&self) -> Result<bool> {
        let deleted = delete_active(&self.conn)?;
        debug!("Cleared active record ({} rows)", deleted);
        Ok(deleted > 0)
    }
}

// History operations
impl Store {
    /// List completed cycles in insertion order.
    ///
    /// A single undecodable row fails the whole call.
    pub fn list_history(&self) -> Result<Vec<CompletedIncubation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM incubation_history ORDER BY id"
        ))?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, RecordRow::from_row(row))))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, decoded) = row?;
            let record = decoded
                .map_err(|e| e.to_string())
                .and_then(|r| r.into_completed().map_err(|(field, reason)| format!("{field}: {reason}")))
                .map_err(|reason| Error::HistoryArchiveCorrupt { row: id, reason })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Append one completed cycle. Returns its row id.
    pub fn insert_history(&self, record: &CompletedIncubation) -> Result<i64> {
        let id = insert_history(&self.conn, record)?;
        debug!("Appended history row {}", id);
        Ok(id)
    }

    /// Append to the history and delete the active record in one transaction.
    pub fn archive_cycle(&self, record: &CompletedIncubation) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let id = insert_history(&tx, record)?;
        delete_active(&tx)?;
        tx.commit()?;

        info!("Archived {} incubation as history row {}", record.species_name, id);
        Ok(())
    }

    /// Number of archived cycles.
    pub fn count_history(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM incubation_history", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Totals over all archived cycles.
    pub fn history_stats(&self) -> Result<HistoryStats> {
        let history = self.list_history()?;
        let eggs: u64 = history.iter().map(|r| u64::from(r.egg_count)).sum();
        let hatched: u64 = history.iter().map(|r| u64::from(r.hatched_count)).sum();

        Ok(HistoryStats {
            cycles: history.len(),
            eggs,
            hatched,
            hatch_rate: if eggs == 0 {
                0.0
            } else {
                (hatched as f64 * 100.0 / eggs as f64) as f32
            },
        })
    }
}

// Export and import
impl Store {
    /// Export the history as a pretty-printed JSON array using the archive field names.
    pub fn export_history_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list_history()?)?)
    }

    /// Export the history as CSV with a header row.
    pub fn export_history_csv(&self) -> Result<String> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(HISTORY_CSV_HEADER)?;
        for record in self.list_history()? {
            wtr.serialize(&record)?;
        }

        let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Import history entries from a JSON array, skipping ones already stored.
    pub fn import_history_json(&self, data: &str) -> Result<ImportResult> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(data)?;
        let parsed = entries.into_iter().enumerate().map(|(i, value)| {
            serde_json::from_value::<CompletedIncubation>(value)
                .map_err(|e| format!("entry {}: {}", i + 1, e))
        });
        self.import_completed(parsed)
    }

    /// Import history entries from CSV (header row required).
    pub fn import_history_csv(&self, data: &str) -> Result<ImportResult> {
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(data.as_bytes());
        let parsed: Vec<_> = rdr
            .deserialize::<CompletedIncubation>()
            .enumerate()
            .map(|(i, r)| r.map_err(|e| format!("row {}: {}", i + 2, e)))
            .collect();
        self.import_completed(parsed)
    }

    fn import_completed(
        &self,
        entries: impl IntoIterator<Item = std::result::Result<CompletedIncubation, String>>,
    ) -> Result<ImportResult> {
        let mut known = self.list_history()?;
        let mut result = ImportResult::default();

        let tx = self.conn.unchecked_transaction()?;
        for entry in entries {
            result.total += 1;
            let entry = entry.and_then(|r| r.validate().map(|()| r).map_err(|e| e.to_string()));
            match entry {
                Err(msg) => result.errors.push(msg),
                Ok(record) if known.contains(&record) => result.skipped += 1,
                Ok(record) => {
                    insert_history(&tx, &record)?;
                    known.push(record);
                    result.imported += 1;
                }
            }
        }
        tx.commit()?;

        info!(
            "Imported {} of {} history entries ({} skipped, {} errors)",
            result.imported,
            result.total,
            result.skipped,
            result.errors.len()
        );
        Ok(result)
    }

    /// Import the active record from the legacy single-row CSV.
    ///
    /// Nothing is written if an active record already exists.
    pub fn import_legacy_active_csv(&self, data: &str) -> Result<ImportResult> {
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(data.as_bytes());
        let mut result = ImportResult::default();

        for (i, row) in rdr.deserialize::<Incubation>().enumerate() {
            result.total += 1;
            let record = row
                .map_err(|e| e.to_string())
                .and_then(|r| r.validate().map(|()| r).map_err(|e| e.to_string()));

            match record {
                Err(msg) => result.errors.push(format!("row {}: {}", i + 2, msg)),
                Ok(_) if self.get_active()?.is_some() => result.skipped += 1,
                Ok(record) => {
                    self.put_active(&record)?;
                    result.imported += 1;
                }
            }
        }

        info!(
            "Imported {} active record(s), {} skipped",
            result.imported, result.skipped
        );
        Ok(result)
    }
}

fn execute_record(conn: &Connection, sql: &str, record: &Incubation) -> Result<usize> {
    Ok(conn.execute(
        sql,
        rusqlite::params![
            timestamp::format(record.started_at),
            record.egg_count,
            record.species_name,
            record.notes,
            record.fertility_check_count,
            record.hatched_count,
            record.ended_at.map(timestamp::format),
            record.duration_days,
        ],
    )?)
}

fn write_active(conn: &Connection, record: &Incubation) -> Result<()> {
    execute_record(
        conn,
        "INSERT OR REPLACE INTO active_incubation (id, started_at, egg_count, species_name, notes,
         fertility_check_count, hatched_count, ended_at, duration_days)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        record,
    )?;
    Ok(())
}

fn delete_active(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM active_incubation WHERE id = 1", [])?)
}

fn insert_history(conn: &Connection, record: &CompletedIncubation) -> Result<i64> {
    execute_record(
        conn,
        "INSERT INTO incubation_history (started_at, egg_count, species_name, notes,
         fertility_check_count, hatched_count, ended_at, duration_days)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        &Incubation::from(record.clone()),
    )?;
    Ok(conn.last_insert_rowid())
}

impl IncubationRepository for Store {
    fn load_active(&self) -> incubator_core::Result<Option<Incubation>> {
        Ok(self.get_active()?)
    }

    fn save_active(&self, record: &Incubation) -> incubator_core::Result<()> {
        Ok(self.put_active(record)?)
    }

    fn clear_active(&self) -> incubator_core::Result<()> {
        self.delete_active()?;
        Ok(())
    }

    fn load_history(&self) -> incubator_core::Result<Vec<CompletedIncubation>> {
        Ok(self.list_history()?)
    }

    fn append_history(&self, record: &CompletedIncubation) -> incubator_core::Result<()> {
        self.insert_history(record)?;
        Ok(())
    }

    fn archive(&self, record: &CompletedIncubation) -> incubator_core::Result<()> {
        Ok(self.archive_cycle(record)?)
    }
}
