//! `qs-output` — simulation output writers and text reports for rust_qs.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                        |
//! |-----------|---------|----------------------------------------------------------------------|
//! | *(none)*  | CSV     | `finished_clients.csv`, `queue_lengths.csv`, `lost_clients.csv`, `server_snapshots.csv` |
//! | `sqlite`  | SQLite  | `output.db`                                                          |
//! | `parquet` | Parquet | one `.parquet` file per table, same names as CSV                     |
//!
//! All backends implement [`OutputWriter`] and are driven either live by
//! [`SimOutputObserver`] (which implements `qs_sim::SimObserver`) or after
//! the fact by [`write_records`].  The [`report`] module prints the classic
//! per-client listings and the statistics block.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qs_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run_to_end(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod report;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{FinishedRow, LostRow, QueueSampleRow, ServerSnapshotRow};
pub use writer::{write_records, OutputWriter};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use self::parquet::ParquetWriter;
