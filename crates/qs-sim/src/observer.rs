//! Simulation observer trait for progress reporting and data collection.

use qs_core::Tick;
use qs_service::ServerUnit;

use crate::StepResult;

/// Callbacks invoked by [`Sim::run_with`][crate::Sim::run_with] at key points
/// in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — loss printer
///
/// ```rust,ignore
/// struct LossPrinter;
///
/// impl SimObserver for LossPrinter {
///     fn on_tick_end(&mut self, step: &StepResult) {
///         for lost in &step.lost {
///             println!("Time:{} LostClientIndex:{}", lost.tick.0, lost.client_id.0);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after all four passes of a tick have run.
    fn on_tick_end(&mut self, _step: &StepResult) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with read-only access to every server.
    fn on_snapshot(&mut self, _tick: Tick, _servers: &[ServerUnit], _queue_length: usize) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
