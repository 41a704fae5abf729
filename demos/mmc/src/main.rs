//! mmc — the reference single-server scenario for the rust_qs simulator.
//!
//! One server, λ = 0.01 arrivals per tick, mean service 60 ticks, unbounded
//! queue, 7 200 ticks.  Writes CSV output and a JSON summary to
//! `output/mmc/`, prints the statistics block, then runs a batch of
//! independent replications.
//!
//! Set `LIST_RECORDS` to also print every finished client, queue sample, and
//! lost client.  Set `RUST_LOG=debug` (or `trace`) for engine logging.

use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use qs_core::SimConfig;
use qs_output::report::{show_clients, show_lost, show_queue, write_summary};
use qs_output::{CsvWriter, SimOutputObserver};
use qs_sim::stats::mean_of;
use qs_sim::{replicate, SimBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const REPLICATIONS: usize = 32;
const OUT_DIR:      &str  = "output/mmc";
const LIST_RECORDS: bool  = false; // per-record listings (7 200+ lines)

// serde defaults fill in capacity (0 = unbounded) and num_threads (all cores).
const CONFIG_JSON: &str = r#"{
    "arrival_rate":          0.01,
    "service_rate":          60.0,
    "server_count":          1,
    "total_ticks":           7200,
    "seed":                  42,
    "output_interval_ticks": 600
}"#;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = Path::new(OUT_DIR);

    let config: SimConfig =
        serde_json::from_str(CONFIG_JSON).context("parsing embedded scenario config")?;
    println!("=== mmc — rust_qs queueing simulator ===");
    println!(
        "λ={}/tick  mean service={} ticks  servers={}  capacity={}  ticks={}  seed={}",
        config.arrival_rate,
        config.service_rate,
        config.server_count,
        config.capacity(),
        config.total_ticks,
        config.seed,
    );
    println!();

    // 1. Single run with CSV output.
    let mut sim = SimBuilder::new(config.clone()).build()?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let writer = CsvWriter::new(out_dir)?;
    let mut obs = SimOutputObserver::new(writer);

    let t0 = Instant::now();
    sim.run_to_end(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  output written to {}", out_dir.display());
    println!();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if LIST_RECORDS {
        show_clients(&mut out, sim.finished())?;
        show_queue(&mut out, sim.queue_lengths())?;
        show_lost(&mut out, sim.lost())?;
    }
    let summary = sim.summary();
    write_summary(&mut out, &summary)?;
    writeln!(out)?;

    let summary_path = out_dir.join("summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    info!("wrote {}", summary_path.display());

    // 2. Independent replications of the same scenario.
    let t0 = Instant::now();
    let runs = replicate(&config, REPLICATIONS)?;
    let elapsed = t0.elapsed();

    let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.3}"));
    writeln!(out, "{REPLICATIONS} replications in {:.3} s", elapsed.as_secs_f64())?;
    writeln!(
        out,
        "  mean queue length : {}",
        fmt(mean_of(runs.iter().map(|r| r.mean_queue_length)))
    )?;
    writeln!(
        out,
        "  mean waiting time : {}",
        fmt(mean_of(runs.iter().map(|r| r.mean_times.map(|t| t.waiting))))
    )?;
    writeln!(
        out,
        "  mean staying time : {}",
        fmt(mean_of(runs.iter().map(|r| r.mean_times.map(|t| t.sojourn))))
    )?;
    writeln!(
        out,
        "  utilisation       : {}",
        fmt(mean_of(runs.iter().map(|r| r.utilisation)))
    )?;

    Ok(())
}
