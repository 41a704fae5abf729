//! The `OutputWriter` trait implemented by all backend writers.

use qs_sim::RunRecords;

use crate::{FinishedRow, LostRow, OutputResult, QueueSampleRow, ServerSnapshotRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// When driven by [`SimOutputObserver`][crate::SimOutputObserver], errors are
/// stored and retrieved with `take_error` after the run.
pub trait OutputWriter {
    /// Write a batch of completed services.
    fn write_finished(&mut self, rows: &[FinishedRow]) -> OutputResult<()>;

    /// Write one queue-length sample.
    fn write_queue_sample(&mut self, row: &QueueSampleRow) -> OutputResult<()>;

    /// Write a batch of lost clients.
    fn write_lost(&mut self, rows: &[LostRow]) -> OutputResult<()>;

    /// Write the per-server rows of one snapshot.
    fn write_server_snapshots(&mut self, rows: &[ServerSnapshotRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Write everything a finished run has accumulated, then `finish` the writer.
///
/// The alternative to attaching a `SimOutputObserver` while running.
pub fn write_records<W: OutputWriter>(writer: &mut W, records: &RunRecords<'_>) -> OutputResult<()> {
    let finished: Vec<FinishedRow> = records.finished.iter().map(FinishedRow::from).collect();
    writer.write_finished(&finished)?;
    for sample in records.queue_lengths {
        writer.write_queue_sample(&sample.into())?;
    }
    let lost: Vec<LostRow> = records.lost.iter().map(LostRow::from).collect();
    writer.write_lost(&lost)?;
    writer.finish()
}
