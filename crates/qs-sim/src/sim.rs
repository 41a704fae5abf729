//! The `Sim` struct and its tick loop.

use std::collections::VecDeque;

use log::{debug, info, trace};
use qs_core::{Capacity, ClientId, RandomSource, SimConfig, SimRng, Tick};
use qs_service::{ClientRecord, ClientStatus, CompletionRecord, ServerUnit};

use crate::records::{LostRecord, QueueSample, RunRecords, StepResult};
use crate::stats::{self, MeanTimes, RunSummary};
use crate::{NoopObserver, SimObserver, SimResult};

/// The queueing simulation engine.
///
/// `Sim<R>` owns the FIFO waiting queue, the servers, the random source, and
/// the accumulated output sequences, and drives the four-pass tick loop:
///
/// 1. **Completion**: every server is advanced; finished services are
///    appended to `finished`.
/// 2. **Arrivals**: `n ~ Poisson(arrival_rate)` clients arrive, each with a
///    fresh `ClientId`.  Each is enqueued if the capacity admits it, otherwise
///    recorded in `lost`.
/// 3. **Assignment**: each idle server (ascending `ServerId`) takes the queue
///    head.
/// 4. **Sampling**: `(tick, queue length)` is appended to `queue_lengths`.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: RandomSource = SimRng> {
    config:        SimConfig,
    capacity:      Capacity,
    tick:          Tick,
    rng:           R,
    servers:       Vec<ServerUnit>,
    queue:         VecDeque<ClientRecord>,
    next_client:   ClientId,
    finished:      Vec<CompletionRecord>,
    lost:          Vec<LostRecord>,
    queue_lengths: Vec<QueueSample>,
}

impl<R: RandomSource> Sim<R> {
    pub(crate) fn new(config: SimConfig, rng: R, servers: Vec<ServerUnit>) -> Self {
        Self {
            capacity:      config.capacity(),
            config,
            tick:          Tick::ZERO,
            rng,
            servers,
            queue:         VecDeque::new(),
            next_client:   ClientId(0),
            finished:      Vec::new(),
            lost:          Vec::new(),
            queue_lengths: Vec::new(),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run `duration` ticks from the current tick and return the accumulated
    /// records.  On a fresh engine this simulates ticks `0..duration`.
    /// A duration of 0 changes nothing.
    pub fn run(&mut self, duration: u64) -> SimResult<RunRecords<'_>> {
        self.run_with(duration, &mut NoopObserver)
    }

    /// Run until `config.end_tick()` (no-op if already there).
    pub fn run_to_end<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunRecords<'_>> {
        let remaining = self.config.end_tick().0.saturating_sub(self.tick.0);
        self.run_with(remaining, observer)
    }

    /// Like [`run`](Self::run), calling observer hooks at every tick boundary.
    pub fn run_with<O: SimObserver>(
        &mut self,
        duration: u64,
        observer: &mut O,
    ) -> SimResult<RunRecords<'_>> {
        let rates: Vec<f64> = self.servers.iter().map(ServerUnit::service_rate).collect();
        info!(
            "running {duration} ticks from {}: λ={} mean service={:?} capacity={}",
            self.tick,
            self.config.arrival_rate,
            rates,
            self.capacity,
        );

        let interval = self.config.output_interval_ticks;
        for _ in 0..duration {
            let now = self.tick;
            observer.on_tick_start(now);
            let step = self.step()?;
            observer.on_tick_end(&step);
            if interval > 0 && now.0.is_multiple_of(interval) {
                observer.on_snapshot(now, &self.servers, self.queue.len());
            }
        }
        observer.on_sim_end(self.tick);

        info!(
            "stopped at {}: {} arrivals, {} finished, {} lost, {} in service, {} queued",
            self.tick,
            self.arrivals(),
            self.finished.len(),
            self.lost.len(),
            self.in_service(),
            self.queue.len(),
        );
        Ok(self.records())
    }

    /// Process the current tick (all four passes) and advance the clock.
    pub fn step(&mut self) -> SimResult<StepResult> {
        let now = self.tick;
        let step = self.process_tick(now)?;
        self.tick = now.next();
        Ok(step)
    }

    // ── Read-only views ───────────────────────────────────────────────────

    /// The validated configuration the engine was built from.  Read-only:
    /// rates and capacity are fixed once [`SimBuilder::build`] has checked
    /// them.
    ///
    /// [`SimBuilder::build`]: crate::SimBuilder::build
    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The next tick to be processed (= number of ticks simulated so far).
    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn records(&self) -> RunRecords<'_> {
        RunRecords {
            finished:      &self.finished,
            queue_lengths: &self.queue_lengths,
            lost:          &self.lost,
        }
    }

    #[inline]
    pub fn finished(&self) -> &[CompletionRecord] {
        &self.finished
    }

    #[inline]
    pub fn lost(&self) -> &[LostRecord] {
        &self.lost
    }

    #[inline]
    pub fn queue_lengths(&self) -> &[QueueSample] {
        &self.queue_lengths
    }

    #[inline]
    pub fn servers(&self) -> &[ServerUnit] {
        &self.servers
    }

    /// Clients currently waiting, head first.
    pub fn waiting(&self) -> impl Iterator<Item = &ClientRecord> {
        self.queue.iter()
    }

    /// Number of clients currently waiting.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Number of clients currently held by a server.
    pub fn in_service(&self) -> usize {
        self.servers.iter().filter(|s| !s.is_idle()).count()
    }

    /// Number of client IDs allocated so far, lost clients included.
    #[inline]
    pub fn arrivals(&self) -> u64 {
        self.next_client.0
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    /// Mean of the per-tick queue-length samples; `None` before any tick.
    pub fn mean_queue_length(&self) -> Option<f64> {
        stats::mean_queue_length(&self.queue_lengths)
    }

    /// Mean waiting / service / sojourn times; `None` until a service completes.
    pub fn mean_times(&self) -> Option<MeanTimes> {
        stats::mean_times(&self.finished)
    }

    /// Fraction of server-ticks with a client held; `None` before any tick.
    pub fn utilisation(&self) -> Option<f64> {
        stats::utilisation(&self.servers, self.tick.0)
    }

    /// Fraction of arrivals that were lost; `None` before any arrival.
    pub fn loss_ratio(&self) -> Option<f64> {
        stats::ratio(self.lost.len() as u64, self.arrivals())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed:              self.config.seed,
            ticks:             self.tick.0,
            servers:           self.servers.len(),
            arrivals:          self.arrivals(),
            finished:          self.finished.len(),
            lost:              self.lost.len(),
            in_service:        self.in_service(),
            queued:            self.queue.len(),
            mean_queue_length: self.mean_queue_length(),
            mean_times:        self.mean_times(),
            utilisation:       self.utilisation(),
            loss_ratio:        self.loss_ratio(),
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<StepResult> {
        let mut step = StepResult::new(now);

        // ── Pass 1: completions ───────────────────────────────────────────
        for server in &mut self.servers {
            if let Some(record) = server.advance(now) {
                step.completed.push(record);
            }
        }
        self.finished.extend_from_slice(&step.completed);

        // ── Pass 2: arrivals and admission ────────────────────────────────
        //
        // The ID is allocated before the capacity check, so rejected clients
        // still consume one.
        step.arrivals = self.rng.arrivals(self.config.arrival_rate);
        for _ in 0..step.arrivals {
            let id = self.next_client;
            self.next_client = id.next();

            let mut client = ClientRecord::arrived(id, now);
            if self.capacity.admits(self.queue.len()) {
                self.queue.push_back(client);
            } else {
                client.status = ClientStatus::Lost;
                debug!("{now}: queue full ({}), lost {id}", self.capacity);
                step.lost.push(LostRecord::of(&client));
            }
        }
        self.lost.extend_from_slice(&step.lost);

        // ── Pass 3: assign waiting clients to idle servers ────────────────
        for server in self.servers.iter_mut().filter(|s| s.is_idle()) {
            let Some(client) = self.queue.pop_front() else {
                break;
            };
            server.assign(now, client, &mut self.rng)?;
            step.assigned += 1;
        }

        // ── Pass 4: sample the post-assignment queue length ───────────────
        step.queue_length = self.queue.len();
        self.queue_lengths.push(QueueSample { tick: now, length: step.queue_length });

        trace!(
            "{now}: {} done, {} arrived, {} lost, {} assigned, queue {}",
            step.completed.len(),
            step.arrivals,
            step.lost.len(),
            step.assigned,
            step.queue_length,
        );
        Ok(step)
    }
}
