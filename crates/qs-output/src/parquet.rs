//! Parquet output backend (feature `parquet`).
//!
//! Creates four files in the configured output directory:
//! - `finished_clients.parquet`
//! - `queue_lengths.parquet`
//! - `lost_clients.parquet`
//! - `server_snapshots.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{FinishedRow, LostRow, OutputResult, QueueSampleRow, ServerSnapshotRow};

/// Queue samples arrive one per tick; they are buffered into batches this big.
const QUEUE_BATCH_ROWS: usize = 4096;

fn finished_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("client_id",      DataType::UInt64, false),
        Field::new("server_id",      DataType::UInt32, false),
        Field::new("departure_tick", DataType::UInt64, false),
        Field::new("waiting_time",   DataType::UInt64, false),
        Field::new("service_time",   DataType::UInt64, false),
        Field::new("sojourn_time",   DataType::UInt64, false),
    ]))
}

fn queue_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",         DataType::UInt64, false),
        Field::new("queue_length", DataType::UInt64, false),
    ]))
}

fn lost_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",      DataType::UInt64, false),
        Field::new("client_id", DataType::UInt64, false),
    ]))
}

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",             DataType::UInt64,  false),
        Field::new("server_id",        DataType::UInt32,  false),
        Field::new("busy",             DataType::Boolean, false),
        Field::new("client_id",        DataType::UInt64,  true),
        Field::new("elapsed",          DataType::UInt64,  false),
        Field::new("service_duration", DataType::UInt64,  false),
        Field::new("queue_length",     DataType::UInt64,  false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(dir: &Path, name: &str, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(dir.join(name))?;
    Ok(ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))?)
}

fn u64_column(values: impl Iterator<Item = u64>) -> ArrayRef {
    let mut b = UInt64Builder::new();
    values.for_each(|v| b.append_value(v));
    Arc::new(b.finish())
}

fn u32_column(values: impl Iterator<Item = u32>) -> ArrayRef {
    let mut b = UInt32Builder::new();
    values.for_each(|v| b.append_value(v));
    Arc::new(b.finish())
}

/// A table's writer and schema; `None` writer once closed.
struct Table {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl Table {
    fn new(dir: &Path, name: &str, schema: Arc<Schema>) -> OutputResult<Self> {
        Ok(Self { writer: Some(open(dir, name, &schema)?), schema })
    }

    fn write(&mut self, columns: Vec<ArrayRef>) -> OutputResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let batch = RecordBatch::try_new(Arc::clone(&self.schema), columns)?;
        writer.write(&batch)?;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}

/// Writes simulation output to four Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    finished:     Table,
    queue:        Table,
    lost:         Table,
    snapshots:    Table,
    queue_buffer: Vec<QueueSampleRow>,
}

impl ParquetWriter {
    /// Create all four Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Ok(Self {
            finished:     Table::new(dir, "finished_clients.parquet", finished_schema())?,
            queue:        Table::new(dir, "queue_lengths.parquet", queue_schema())?,
            lost:         Table::new(dir, "lost_clients.parquet", lost_schema())?,
            snapshots:    Table::new(dir, "server_snapshots.parquet", snapshot_schema())?,
            queue_buffer: Vec::with_capacity(QUEUE_BATCH_ROWS),
        })
    }

    fn flush_queue(&mut self) -> OutputResult<()> {
        if self.queue_buffer.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.queue_buffer);
        self.queue.write(vec![
            u64_column(rows.iter().map(|r| r.tick)),
            u64_column(rows.iter().map(|r| r.length)),
        ])
    }
}

impl OutputWriter for ParquetWriter {
    fn write_finished(&mut self, rows: &[FinishedRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.finished.write(vec![
            u64_column(rows.iter().map(|r| r.client_id)),
            u32_column(rows.iter().map(|r| r.server_id)),
            u64_column(rows.iter().map(|r| r.departure_tick)),
            u64_column(rows.iter().map(|r| r.waiting_time)),
            u64_column(rows.iter().map(|r| r.service_time)),
            u64_column(rows.iter().map(|r| r.sojourn_time)),
        ])
    }

    fn write_queue_sample(&mut self, row: &QueueSampleRow) -> OutputResult<()> {
        self.queue_buffer.push(*row);
        if self.queue_buffer.len() >= QUEUE_BATCH_ROWS {
            self.flush_queue()?;
        }
        Ok(())
    }

    fn write_lost(&mut self, rows: &[LostRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.lost.write(vec![
            u64_column(rows.iter().map(|r| r.tick)),
            u64_column(rows.iter().map(|r| r.client_id)),
        ])
    }

    fn write_server_snapshots(&mut self, rows: &[ServerSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut busy = BooleanBuilder::new();
        let mut clients = UInt64Builder::new();
        for row in rows {
            busy.append_value(row.busy);
            clients.append_option(row.busy.then_some(row.client_id));
        }
        self.snapshots.write(vec![
            u64_column(rows.iter().map(|r| r.tick)),
            u32_column(rows.iter().map(|r| r.server_id)),
            Arc::new(busy.finish()),
            Arc::new(clients.finish()),
            u64_column(rows.iter().map(|r| r.elapsed)),
            u64_column(rows.iter().map(|r| r.service_duration)),
            u64_column(rows.iter().map(|r| r.queue_length)),
        ])
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.flush_queue()?;
        self.finished.close()?;
        self.queue.close()?;
        self.lost.close()?;
        self.snapshots.close()?;
        Ok(())
    }
}
