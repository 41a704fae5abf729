//! Plain data row types written by output backends.

use qs_core::Tick;
use qs_service::{CompletionRecord, ServerUnit};
use qs_sim::{LostRecord, QueueSample};

/// One completed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedRow {
    pub client_id:      u64,
    pub server_id:      u32,
    pub departure_tick: u64,
    pub waiting_time:   u64,
    pub service_time:   u64,
    pub sojourn_time:   u64,
}

impl From<&CompletionRecord> for FinishedRow {
    fn from(r: &CompletionRecord) -> Self {
        Self {
            client_id:      r.client_id.0,
            server_id:      r.server_id.0,
            departure_tick: r.departure_tick.0,
            waiting_time:   r.waiting_time,
            service_time:   r.service_time,
            sojourn_time:   r.sojourn_time,
        }
    }
}

/// Queue length sampled at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSampleRow {
    pub tick:   u64,
    pub length: u64,
}

impl From<&QueueSample> for QueueSampleRow {
    fn from(s: &QueueSample) -> Self {
        Self { tick: s.tick.0, length: s.length as u64 }
    }
}

/// A client turned away because the queue was full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LostRow {
    pub tick:      u64,
    pub client_id: u64,
}

impl From<&LostRecord> for LostRow {
    fn from(l: &LostRecord) -> Self {
        Self { tick: l.tick.0, client_id: l.client_id.0 }
    }
}

/// The state of one server at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSnapshotRow {
    pub tick:             u64,
    pub server_id:        u32,
    pub busy:             bool,
    /// Client being served; `u64::MAX` while idle.
    pub client_id:        u64,
    pub elapsed:          u64,
    pub service_duration: u64,
    pub queue_length:     u64,
}

impl ServerSnapshotRow {
    /// Sentinel stored in `client_id` for an idle server.
    pub const NO_CLIENT: u64 = u64::MAX;

    pub fn of(tick: Tick, server: &ServerUnit, queue_length: usize) -> Self {
        Self {
            tick:             tick.0,
            server_id:        server.id().0,
            busy:             !server.is_idle(),
            client_id:        server.current_client().map_or(Self::NO_CLIENT, |c| c.id.0),
            elapsed:          server.elapsed(),
            service_duration: server.service_duration(),
            queue_length:     queue_length as u64,
        }
    }
}
