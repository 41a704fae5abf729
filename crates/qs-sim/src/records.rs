//! Output records accumulated by the engine.

use qs_core::{ClientId, Tick};
use qs_service::{ClientRecord, CompletionRecord};

use crate::stats::{self, MeanTimes};

/// A client turned away because the queue was full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LostRecord {
    pub tick:      Tick,
    pub client_id: ClientId,
}

impl LostRecord {
    pub fn of(client: &ClientRecord) -> Self {
        Self { tick: client.arrival_tick, client_id: client.id }
    }
}

/// Queue length observed at the end of a tick (after assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSample {
    pub tick:   Tick,
    pub length: usize,
}

/// What happened during one call to [`Sim::step`](crate::Sim::step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub tick:         Tick,
    /// Services that completed this tick, in server order.
    pub completed:    Vec<CompletionRecord>,
    /// Clients that arrived this tick (admitted or not).
    pub arrivals:     u64,
    /// Arrivals rejected because the queue was full.
    pub lost:         Vec<LostRecord>,
    /// Clients moved from the queue to a server this tick.
    pub assigned:     usize,
    /// Queue length after the assignment pass.
    pub queue_length: usize,
}

impl StepResult {
    pub(crate) fn new(tick: Tick) -> Self {
        Self {
            tick,
            completed:    Vec::new(),
            arrivals:     0,
            lost:         Vec::new(),
            assigned:     0,
            queue_length: 0,
        }
    }

    /// Arrivals that were enqueued.
    #[inline]
    pub fn admitted(&self) -> u64 {
        self.arrivals - self.lost.len() as u64
    }
}

/// Borrowed view of everything a run has accumulated so far.
#[derive(Debug, Clone, Copy)]
pub struct RunRecords<'a> {
    /// Completed services, in completion order.
    pub finished:      &'a [CompletionRecord],
    /// One sample per simulated tick.
    pub queue_lengths: &'a [QueueSample],
    /// Rejected arrivals; always empty with an unbounded queue.
    pub lost:          &'a [LostRecord],
}

impl RunRecords<'_> {
    pub fn mean_queue_length(&self) -> Option<f64> {
        stats::mean_queue_length(self.queue_lengths)
    }

    pub fn mean_times(&self) -> Option<MeanTimes> {
        stats::mean_times(self.finished)
    }
}
