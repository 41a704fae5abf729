//! Fluent builder for constructing a [`Sim`].

use log::debug;
use qs_core::{QsError, RandomSource, ServerId, SimConfig, SimRng};
use qs_service::ServerUnit;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — rates, server count, capacity, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                  |
/// |------------------------|------------------------------------------|
/// | `.random_source(r)`    | `SimRng::new(config.seed)`               |
/// | `.service_rates(v)`    | `config.service_rate` for every server   |
///
/// # Example
///
/// ```rust
/// use qs_core::{ScriptedSource, SimConfig};
/// use qs_sim::SimBuilder;
///
/// let sim = SimBuilder::new(SimConfig::new(1.0, 4.0, 2))
///     .random_source(ScriptedSource::new([2, 0, 1], [3.0, 5.0]))
///     .build()?;
/// assert_eq!(sim.servers().len(), 2);
/// # Ok::<(), qs_sim::SimError>(())
/// ```
pub struct SimBuilder<R: RandomSource = SimRng> {
    config:        SimConfig,
    rng:           R,
    service_rates: Option<Vec<f64>>,
}

impl SimBuilder<SimRng> {
    /// Create a builder drawing randomness from `SimRng::new(config.seed)`.
    pub fn new(config: SimConfig) -> Self {
        let rng = SimRng::new(config.seed);
        Self { config, rng, service_rates: None }
    }
}

impl<R: RandomSource> SimBuilder<R> {
    /// Replace the random source (e.g. with a `ScriptedSource` for an exact
    /// tick-by-tick scenario).
    pub fn random_source<S: RandomSource>(self, rng: S) -> SimBuilder<S> {
        SimBuilder {
            config:        self.config,
            rng,
            service_rates: self.service_rates,
        }
    }

    /// Give each server its own mean service duration (must be length
    /// `server_count`).  If not called, every server uses
    /// `config.service_rate`.
    pub fn service_rates(mut self, rates: Vec<f64>) -> Self {
        self.service_rates = Some(rates);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`] at tick 0.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;
        let server_count = self.config.server_count;

        let rates = match self.service_rates {
            Some(r) => {
                if r.len() != server_count {
                    return Err(SimError::ServerCountMismatch {
                        expected: server_count,
                        got:      r.len(),
                        what:     "service rates",
                    });
                }
                if let Some(&bad) = r.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
                    return Err(QsError::InvalidRate {
                        what:     "per-server service rate",
                        expected: "finite and positive",
                        value:    bad,
                    }
                    .into());
                }
                r
            }
            None => vec![self.config.service_rate; server_count],
        };

        let servers = rates
            .into_iter()
            .enumerate()
            .map(|(i, rate)| ServerUnit::new(ServerId(i as u32), rate))
            .collect();

        debug!(
            "built sim: λ={} mean service={} servers={} capacity={}",
            self.config.arrival_rate,
            self.config.service_rate,
            server_count,
            self.config.capacity(),
        );

        Ok(Sim::new(self.config, self.rng, servers))
    }
}
