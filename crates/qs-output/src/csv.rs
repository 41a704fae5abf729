//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//! - `finished_clients.csv`
//! - `queue_lengths.csv`
//! - `lost_clients.csv`
//! - `server_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{FinishedRow, LostRow, OutputResult, QueueSampleRow, ServerSnapshotRow};

pub const FINISHED_HEADER: [&str; 6] =
    ["client_id", "server_id", "departure_tick", "waiting_time", "service_time", "sojourn_time"];
pub const QUEUE_HEADER: [&str; 2] = ["tick", "queue_length"];
pub const LOST_HEADER: [&str; 2] = ["tick", "client_id"];
pub const SNAPSHOT_HEADER: [&str; 7] =
    ["tick", "server_id", "busy", "client_id", "elapsed", "service_duration", "queue_length"];

/// Writes simulation output to four CSV files.
pub struct CsvWriter {
    finished:  Writer<File>,
    queue:     Writer<File>,
    lost:      Writer<File>,
    snapshots: Writer<File>,
    closed:    bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut finished = Writer::from_path(dir.join("finished_clients.csv"))?;
        finished.write_record(FINISHED_HEADER)?;

        let mut queue = Writer::from_path(dir.join("queue_lengths.csv"))?;
        queue.write_record(QUEUE_HEADER)?;

        let mut lost = Writer::from_path(dir.join("lost_clients.csv"))?;
        lost.write_record(LOST_HEADER)?;

        let mut snapshots = Writer::from_path(dir.join("server_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        Ok(Self { finished, queue, lost, snapshots, closed: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_finished(&mut self, rows: &[FinishedRow]) -> OutputResult<()> {
        for row in rows {
            self.finished.write_record(&[
                row.client_id.to_string(),
                row.server_id.to_string(),
                row.departure_tick.to_string(),
                row.waiting_time.to_string(),
                row.service_time.to_string(),
                row.sojourn_time.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_queue_sample(&mut self, row: &QueueSampleRow) -> OutputResult<()> {
        self.queue
            .write_record(&[row.tick.to_string(), row.length.to_string()])?;
        Ok(())
    }

    fn write_lost(&mut self, rows: &[LostRow]) -> OutputResult<()> {
        for row in rows {
            self.lost
                .write_record(&[row.tick.to_string(), row.client_id.to_string()])?;
        }
        Ok(())
    }

    fn write_server_snapshots(&mut self, rows: &[ServerSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.server_id.to_string(),
                (row.busy as u8).to_string(),
                row.client_id.to_string(),
                row.elapsed.to_string(),
                row.service_duration.to_string(),
                row.queue_length.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.finished.flush()?;
        self.queue.flush()?;
        self.lost.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}
