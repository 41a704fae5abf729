//! Per-client lifecycle record.

use qs_core::{ClientId, ServerId, Tick};

/// Where a client is in its lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ClientStatus {
    /// Admitted and waiting in the queue.
    Waiting,
    /// Turned away on arrival because the queue was full.
    Lost,
    /// Held by a server.
    Serving,
    /// Service completed; the client has left.
    Finished,
}

/// A client's timestamps from arrival to departure.
///
/// Created on arrival, stamped by the server that takes it
/// (`service_start`), and stamped again on completion (`departure`).  The
/// record moves from the queue into exactly one server and is never shared.
///
/// Invariant once set: `arrival_tick <= service_start <= departure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    pub id:            ClientId,
    pub arrival_tick:  Tick,
    /// `None` until a server begins serving the client.
    pub service_start: Option<Tick>,
    /// `None` until service completes.
    pub departure:     Option<Tick>,
    /// The server that is serving (or served) this client.
    pub server:        Option<ServerId>,
    pub status:        ClientStatus,
}

impl ClientRecord {
    /// A freshly arrived client, waiting.
    pub fn arrived(id: ClientId, now: Tick) -> Self {
        Self {
            id,
            arrival_tick:  now,
            service_start: None,
            departure:     None,
            server:        None,
            status:        ClientStatus::Waiting,
        }
    }

    /// Ticks spent in the queue.  `None` until service starts.
    #[inline]
    pub fn waiting_time(&self) -> Option<u64> {
        self.service_start.map(|s| s - self.arrival_tick)
    }

    /// Ticks spent being served.  `None` until service completes.
    #[inline]
    pub fn service_time(&self) -> Option<u64> {
        Some(self.departure? - self.service_start?)
    }

    /// Total ticks in the system.  `None` until service completes.
    #[inline]
    pub fn sojourn_time(&self) -> Option<u64> {
        self.departure.map(|d| d - self.arrival_tick)
    }

    /// The completion summary, once all three timestamps are set.
    pub fn completion(&self) -> Option<CompletionRecord> {
        Some(CompletionRecord {
            client_id:      self.id,
            server_id:      self.server?,
            departure_tick: self.departure?,
            waiting_time:   self.waiting_time()?,
            service_time:   self.service_time()?,
            sojourn_time:   self.sojourn_time()?,
        })
    }
}

/// Statistics for one completed service.  `sojourn_time` always equals
/// `waiting_time + service_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRecord {
    pub client_id:      ClientId,
    pub server_id:      ServerId,
    pub departure_tick: Tick,
    pub waiting_time:   u64,
    pub service_time:   u64,
    pub sojourn_time:   u64,
}
