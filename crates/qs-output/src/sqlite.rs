//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! four tables: `finished_clients`, `queue_lengths`, `lost_clients`, and
//! `server_snapshots`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{FinishedRow, LostRow, OutputResult, QueueSampleRow, ServerSnapshotRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS finished_clients (
                 client_id      INTEGER PRIMARY KEY,
                 server_id      INTEGER NOT NULL,
                 departure_tick INTEGER NOT NULL,
                 waiting_time   INTEGER NOT NULL,
                 service_time   INTEGER NOT NULL,
                 sojourn_time   INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS queue_lengths (
                 tick         INTEGER PRIMARY KEY,
                 queue_length INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS lost_clients (
                 client_id INTEGER PRIMARY KEY,
                 tick      INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS server_snapshots (
                 tick             INTEGER NOT NULL,
                 server_id        INTEGER NOT NULL,
                 busy             INTEGER NOT NULL,
                 client_id        INTEGER,
                 elapsed          INTEGER NOT NULL,
                 service_duration INTEGER NOT NULL,
                 queue_length     INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

/// SQLite integers are signed 64-bit; IDs and ticks never approach `i64::MAX`.
fn int(v: u64) -> i64 {
    v as i64
}

impl OutputWriter for SqliteWriter {
    fn write_finished(&mut self, rows: &[FinishedRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO finished_clients \
                 (client_id, server_id, departure_tick, waiting_time, service_time, sojourn_time) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    int(row.client_id),
                    row.server_id,
                    int(row.departure_tick),
                    int(row.waiting_time),
                    int(row.service_time),
                    int(row.sojourn_time),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_queue_sample(&mut self, row: &QueueSampleRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO queue_lengths (tick, queue_length) VALUES (?1, ?2)",
            rusqlite::params![int(row.tick), int(row.length)],
        )?;
        Ok(())
    }

    fn write_lost(&mut self, rows: &[LostRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO lost_clients (client_id, tick) VALUES (?1, ?2)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![int(row.client_id), int(row.tick)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_server_snapshots(&mut self, rows: &[ServerSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO server_snapshots \
                 (tick, server_id, busy, client_id, elapsed, service_duration, queue_length) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for row in rows {
                // Idle servers store NULL rather than the CSV sentinel.
                let client = row.busy.then(|| int(row.client_id));
                stmt.execute(rusqlite::params![
                    int(row.tick),
                    row.server_id,
                    row.busy as i64,
                    client,
                    int(row.elapsed),
                    int(row.service_duration),
                    int(row.queue_length),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
