//! Independent replications of one scenario.
//!
//! Replication `i` uses seed `SimRng::new(config.seed).child_seed(i)` (seeds
//! are derived sequentially up front), so the set of results depends only on
//! the config, not on thread count or scheduling.  With the `parallel`
//! feature the runs execute on Rayon's pool; results always come back in
//! replication order.

use log::info;
use qs_core::{SimConfig, SimRng};

use crate::{NoopObserver, RunSummary, SimBuilder, SimResult};

/// Run `replications` independent copies of `config` for
/// `config.total_ticks` ticks each and return their summaries.
pub fn replicate(config: &SimConfig, replications: usize) -> SimResult<Vec<RunSummary>> {
    config.validate()?;

    let mut root = SimRng::new(config.seed);
    let seeds: Vec<u64> = (0..replications as u64).map(|i| root.child_seed(i)).collect();
    info!(
        "running {replications} replications of {} ticks",
        config.total_ticks
    );

    let run_one = |seed: u64| -> SimResult<RunSummary> {
        let mut cfg = config.clone();
        cfg.seed = seed;
        let mut sim = SimBuilder::new(cfg).build()?;
        sim.run_to_end(&mut NoopObserver)?;
        Ok(sim.summary())
    };

    #[cfg(not(feature = "parallel"))]
    {
        seeds.into_iter().map(run_one).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let run = move || -> SimResult<Vec<RunSummary>> {
            seeds.into_par_iter().map(run_one).collect()
        };
        match config.num_threads {
            None => run(),
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| crate::SimError::ThreadPool(e.to_string()))?
                .install(run),
        }
    }
}
