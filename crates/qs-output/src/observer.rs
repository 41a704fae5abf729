//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use log::warn;
use qs_core::Tick;
use qs_service::ServerUnit;
use qs_sim::{SimObserver, StepResult};

use crate::row::{FinishedRow, LostRow, QueueSampleRow, ServerSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that streams every tick's completions, losses, and queue
/// sample, plus periodic server snapshots, to any [`OutputWriter`] backend
/// (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, step: &StepResult) {
        if !step.completed.is_empty() {
            let rows: Vec<FinishedRow> = step.completed.iter().map(FinishedRow::from).collect();
            let result = self.writer.write_finished(&rows);
            self.store_err(result);
        }
        if !step.lost.is_empty() {
            let rows: Vec<LostRow> = step.lost.iter().map(LostRow::from).collect();
            let result = self.writer.write_lost(&rows);
            self.store_err(result);
        }
        let row = QueueSampleRow { tick: step.tick.0, length: step.queue_length as u64 };
        let result = self.writer.write_queue_sample(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, servers: &[ServerUnit], queue_length: usize) {
        let rows: Vec<ServerSnapshotRow> = servers
            .iter()
            .map(|s| ServerSnapshotRow::of(tick, s, queue_length))
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_server_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
