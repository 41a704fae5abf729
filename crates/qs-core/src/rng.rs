//! Deterministic randomness for arrivals and service durations.
//!
//! # Determinism strategy
//!
//! A run draws every random number from a single `SimRng` in a fixed order
//! (one arrival draw per tick, one or more service draws per assignment), so a
//! seed fully determines the output.  Independent replications derive their
//! seeds from the root seed with [`SimRng::child`]:
//!
//!   seed = root.next_u64() XOR (offset * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive offsets uniformly across the seed space.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Poisson};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── RandomSource ──────────────────────────────────────────────────────────────

/// Supplies the two kinds of random draws the engine needs.
///
/// The engine only ever calls these methods with parameters that passed
/// `SimConfig::validate`.
pub trait RandomSource {
    /// Number of clients arriving in one tick, `Poisson(rate)`.
    /// A rate of zero yields zero arrivals.
    fn arrivals(&mut self, rate: f64) -> u64;

    /// One raw service-duration draw, `Exponential` with the given mean
    /// (in ticks).  The caller truncates it to whole ticks.
    fn service_draw(&mut self, mean: f64) -> f64;
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG.
///
/// Used only from the single-threaded tick loop.  Parallel replications each
/// own a `SimRng` derived from the root one.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset, used to seed
    /// independent replications deterministically from the root seed.
    pub fn child(&mut self, offset: u64) -> SimRng {
        SimRng::new(self.child_seed(offset))
    }

    /// The seed [`child`](Self::child) would use, without constructing the RNG.
    pub fn child_seed(&mut self, offset: u64) -> u64 {
        self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT)
    }

    /// Expose the inner `SmallRng` for use with other `rand` distributions.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }
}

impl RandomSource for SimRng {
    fn arrivals(&mut self, rate: f64) -> u64 {
        if rate <= 0.0 {
            return 0;
        }
        match Poisson::new(rate) {
            Ok(dist) => dist.sample(&mut self.0) as u64,
            Err(_)   => 0,
        }
    }

    fn service_draw(&mut self, mean: f64) -> f64 {
        match Exp::new(1.0 / mean) {
            Ok(dist) => dist.sample(&mut self.0),
            Err(_)   => 0.0,
        }
    }
}

// ── ScriptedSource ────────────────────────────────────────────────────────────

/// A [`RandomSource`] that replays fixed sequences.
///
/// Each call pops the next scripted value; once a sequence is exhausted the
/// fallback is used (no arrivals, and a one-tick service).  Handy for
/// reproducing an exact tick-by-tick scenario.
///
/// ```rust
/// use qs_core::{RandomSource, ScriptedSource};
///
/// let mut src = ScriptedSource::new([1, 0, 3], [4.7]);
/// assert_eq!(src.arrivals(0.5), 1);
/// assert_eq!(src.arrivals(0.5), 0);
/// assert_eq!(src.arrivals(0.5), 3);
/// assert_eq!(src.arrivals(0.5), 0); // exhausted
/// assert_eq!(src.service_draw(10.0), 4.7);
/// assert_eq!(src.service_draw(10.0), 1.0); // exhausted
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    arrivals: VecDeque<u64>,
    services: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new(
        arrivals: impl IntoIterator<Item = u64>,
        services: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            arrivals: arrivals.into_iter().collect(),
            services: services.into_iter().collect(),
        }
    }

    /// Scripted values not yet consumed, `(arrivals, services)`.
    pub fn remaining(&self) -> (usize, usize) {
        (self.arrivals.len(), self.services.len())
    }
}

impl RandomSource for ScriptedSource {
    fn arrivals(&mut self, _rate: f64) -> u64 {
        self.arrivals.pop_front().unwrap_or(0)
    }

    fn service_draw(&mut self, _mean: f64) -> f64 {
        self.services.pop_front().unwrap_or(1.0)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn arrivals(&mut self, rate: f64) -> u64 {
        (**self).arrivals(rate)
    }

    fn service_draw(&mut self, mean: f64) -> f64 {
        (**self).service_draw(mean)
    }
}
