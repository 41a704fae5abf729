//! Simulation parameters and the admission-capacity policy.

use std::fmt;

use crate::{QsError, QsResult, Tick};

// ── Capacity ──────────────────────────────────────────────────────────────────

/// Upper bound on the waiting queue, checked when a client arrives.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Capacity {
    /// Every arrival is enqueued; no client is ever lost.
    #[default]
    Unbounded,
    /// An arrival is enqueued only while fewer than `n` clients are waiting.
    Bounded(usize),
}

impl Capacity {
    /// Interpret a raw queue limit, where `0` means "no limit".
    #[inline]
    pub fn from_limit(limit: usize) -> Self {
        match limit {
            0 => Capacity::Unbounded,
            n => Capacity::Bounded(n),
        }
    }

    /// Whether an arrival finding `queued` clients already waiting is admitted.
    #[inline]
    pub fn admits(self, queued: usize) -> bool {
        match self {
            Capacity::Unbounded  => true,
            Capacity::Bounded(n) => queued < n,
        }
    }

    /// The numeric limit, or `None` when unbounded.
    #[inline]
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Unbounded  => None,
            Capacity::Bounded(n) => Some(n),
        }
    }

    #[inline]
    pub fn is_bounded(self) -> bool {
        matches!(self, Capacity::Bounded(_))
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Unbounded  => write!(f, "unbounded"),
            Capacity::Bounded(n) => write!(f, "{n}"),
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built in code or deserialized from JSON by the application crate
/// (with the `serde` feature) and passed to `qs_sim::SimBuilder`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Mean number of arrivals per tick (Poisson λ).  Must be finite and ≥ 0.
    pub arrival_rate: f64,

    /// Mean service duration in ticks (the Exponential's scale).  Must be
    /// finite and > 0.
    pub service_rate: f64,

    /// Number of identical servers.  At least 1.
    pub server_count: usize,

    /// Maximum number of waiting clients.  0 = unbounded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub capacity: usize,

    /// Ticks simulated by `Sim::run_to_end`.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count for parallel replications.  `None` uses all
    /// logical cores.
    #[cfg_attr(feature = "serde", serde(default))]
    pub num_threads: Option<usize>,

    /// Emit a server snapshot every N ticks.  0 disables snapshots.
    #[cfg_attr(feature = "serde", serde(default))]
    pub output_interval_ticks: u64,
}

impl SimConfig {
    /// A configuration with an unbounded queue, no snapshots, seed 0, and
    /// zero `total_ticks`; adjust the public fields as needed.
    pub fn new(arrival_rate: f64, service_rate: f64, server_count: usize) -> Self {
        Self {
            arrival_rate,
            service_rate,
            server_count,
            capacity:              0,
            total_ticks:           0,
            seed:                  0,
            num_threads:           None,
            output_interval_ticks: 0,
        }
    }

    /// The admission policy implied by `capacity`.
    #[inline]
    pub fn capacity(&self) -> Capacity {
        Capacity::from_limit(self.capacity)
    }

    /// The tick at which `run_to_end` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject parameters for which the model is undefined.
    pub fn validate(&self) -> QsResult<()> {
        if !(self.arrival_rate.is_finite() && self.arrival_rate >= 0.0) {
            return Err(QsError::InvalidRate {
                what:     "arrival rate",
                expected: "finite and non-negative",
                value:    self.arrival_rate,
            });
        }
        if !(self.service_rate.is_finite() && self.service_rate > 0.0) {
            return Err(QsError::InvalidRate {
                what:     "service rate",
                expected: "finite and positive",
                value:    self.service_rate,
            });
        }
        if self.server_count == 0 {
            return Err(QsError::NoServers);
        }
        if self.num_threads == Some(0) {
            return Err(QsError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
