//! `qs-sim` — tick loop orchestrator for the rust_qs queueing simulator.
//!
//! # Four-pass tick loop
//!
//! ```text
//! for tick in 0..duration:
//!   ① Completion — advance every server; finished services are recorded.
//!   ② Arrivals   — draw n ~ Poisson(λ); each arrival gets a fresh ClientId
//!                  and is enqueued, or lost if the queue is at capacity.
//!   ③ Assignment — each idle server takes the queue head (FIFO).
//!   ④ Sampling   — record (tick, queue length) after assignment.
//! ```
//!
//! The passes are never reordered or interleaved, and tick `t + 1` is never
//! started before tick `t` completes.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs [`replicate`] on Rayon's thread pool.             |
//! | `serde`    | Derives `Serialize` on [`RunSummary`] / [`MeanTimes`]. |
//!
//! # Quick-start
//!
//! ```rust
//! use qs_core::SimConfig;
//! use qs_sim::SimBuilder;
//!
//! let mut config = SimConfig::new(0.5, 3.0, 2);
//! config.seed = 7;
//! let mut sim = SimBuilder::new(config).build()?;
//! let records = sim.run(1_000)?;
//! assert_eq!(records.queue_lengths.len(), 1_000);
//! println!("mean queue length: {:?}", sim.mean_queue_length());
//! # Ok::<(), qs_sim::SimError>(())
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod records;
pub mod replicate;
pub mod sim;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use records::{LostRecord, QueueSample, RunRecords, StepResult};
pub use replicate::replicate;
pub use sim::Sim;
pub use stats::{MeanTimes, RunSummary};
