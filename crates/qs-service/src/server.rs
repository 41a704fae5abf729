//! The single-server service state machine.

use log::trace;
use qs_core::{RandomSource, ServerId, Tick};

use crate::{ClientRecord, ClientStatus, CompletionRecord, ServiceError, ServiceResult};

/// Zero-length draws tolerated before falling back to the shifted draw.
///
/// Conditioning an exponential on being ≥ 1 is the same as adding 1 to a
/// fresh draw, so the fallback keeps the distribution while bounding the loop
/// for tiny means.
const MAX_ZERO_DRAWS: usize = 64;

/// Whether a server currently holds a client.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ServerState {
    Idle,
    Busy,
}

/// One server: holds at most one client and counts down its service.
///
/// The state is derived from `current`, so "a client is held iff the server
/// is busy" cannot be violated.  While busy, `elapsed <= service_duration`.
#[derive(Debug, Clone)]
pub struct ServerUnit {
    id:               ServerId,
    /// Mean service duration in ticks.
    service_rate:     f64,
    service_duration: u64,
    elapsed:          u64,
    current:          Option<ClientRecord>,
    busy_ticks:       u64,
    served:           u64,
}

impl ServerUnit {
    /// An idle server whose service durations have mean `service_rate` ticks.
    pub fn new(id: ServerId, service_rate: f64) -> Self {
        Self {
            id,
            service_rate,
            service_duration: 0,
            elapsed:          0,
            current:          None,
            busy_ticks:       0,
            served:           0,
        }
    }

    #[inline]
    pub fn id(&self) -> ServerId {
        self.id
    }

    #[inline]
    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    #[inline]
    pub fn state(&self) -> ServerState {
        if self.current.is_some() { ServerState::Busy } else { ServerState::Idle }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Ticks of work the current service needs; 0 while idle.
    #[inline]
    pub fn service_duration(&self) -> u64 {
        self.service_duration
    }

    /// Ticks of work done on the current service; 0 while idle.
    #[inline]
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// The client being served, if any.
    #[inline]
    pub fn current_client(&self) -> Option<&ClientRecord> {
        self.current.as_ref()
    }

    /// Ticks on which the server held a client when advanced, release ticks
    /// included.  Equals the summed `service_time` of completed services plus
    /// `elapsed` of the current one.
    #[inline]
    pub fn busy_ticks(&self) -> u64 {
        self.busy_ticks
    }

    /// Number of services completed.
    #[inline]
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Advance the server by one tick.
    ///
    /// Completion is checked before work is done: a service assigned at tick
    /// `t` with duration `d` works on ticks `t+1 ..= t+d` and is released at
    /// tick `t + d + 1`.
    ///
    /// - Busy and finished: stamps the departure, releases the client, returns
    ///   its `CompletionRecord`, and goes idle.
    /// - Busy otherwise: consumes one tick of work.
    /// - Idle: nothing.
    pub fn advance(&mut self, now: Tick) -> Option<CompletionRecord> {
        let client = self.current.as_mut()?;
        self.busy_ticks += 1;
        if self.elapsed < self.service_duration {
            self.elapsed += 1;
            return None;
        }

        client.departure = Some(now);
        client.status = ClientStatus::Finished;
        let record = client.completion();

        self.current = None;
        self.elapsed = 0;
        self.service_duration = 0;
        self.served += 1;
        record
    }

    /// Start serving `client` at tick `now`.
    ///
    /// Samples a whole-tick duration from `rng`, discarding draws that
    /// truncate to zero, so the duration is always at least 1.
    ///
    /// Returns [`ServiceError::ServerBusy`] if the server already holds a
    /// client; the rejected `client` is handed back inside the error.
    pub fn assign<R: RandomSource>(
        &mut self,
        now:        Tick,
        mut client: ClientRecord,
        rng:        &mut R,
    ) -> ServiceResult<()> {
        if self.current.is_some() {
            return Err(ServiceError::ServerBusy(self.id, Box::new(client)));
        }

        self.service_duration = self.sample_duration(rng);
        self.elapsed = 0;

        client.service_start = Some(now);
        client.server = Some(self.id);
        client.status = ClientStatus::Serving;
        trace!(
            "{now}: {} assigned {} for {} ticks",
            self.id, client.id, self.service_duration
        );
        self.current = Some(client);
        Ok(())
    }

    fn sample_duration<R: RandomSource>(&self, rng: &mut R) -> u64 {
        for _ in 0..MAX_ZERO_DRAWS {
            let ticks = rng.service_draw(self.service_rate) as u64;
            if ticks > 0 {
                return ticks;
            }
        }
        1 + rng.service_draw(self.service_rate) as u64
    }
}
