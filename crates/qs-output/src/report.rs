//! Plain-text listings and the statistics summary.
//!
//! Every function writes to any [`io::Write`], so callers choose between
//! stdout, a file, or a buffer in tests.

use std::io::{self, Write};

use qs_service::CompletionRecord;
use qs_sim::{LostRecord, QueueSample, RunSummary};

/// One line per completed client.
pub fn show_clients<W: Write>(out: &mut W, finished: &[CompletionRecord]) -> io::Result<()> {
    for r in finished {
        writeln!(
            out,
            "ClientIndex:{} Waiting:{} Serving:{} Staying:{}",
            r.client_id.0, r.waiting_time, r.service_time, r.sojourn_time
        )?;
    }
    Ok(())
}

/// One line per tick's queue-length sample.
pub fn show_queue<W: Write>(out: &mut W, samples: &[QueueSample]) -> io::Result<()> {
    for s in samples {
        writeln!(out, "Time: {} QueueLength: {}", s.tick.0, s.length)?;
    }
    Ok(())
}

/// One line per lost client.
pub fn show_lost<W: Write>(out: &mut W, lost: &[LostRecord]) -> io::Result<()> {
    for l in lost {
        writeln!(out, "Time:{} LostClientIndex:{}", l.tick.0, l.client_id.0)?;
    }
    Ok(())
}

fn or_na(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_owned(), |v| v.to_string())
}

/// The statistics block: mean queue length and mean per-client times, plus
/// counts.  Undefined means print as `n/a`.
pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    let times = summary.mean_times;
    writeln!(out, "------------------------Statistics------------------------")?;
    writeln!(out, " MeanQueueLength:{}", or_na(summary.mean_queue_length))?;
    writeln!(out, " MeanWaitingTime:{}", or_na(times.map(|t| t.waiting)))?;
    writeln!(out, " MeanServingTime:{}", or_na(times.map(|t| t.service)))?;
    writeln!(out, " MeanStayingTime:{}", or_na(times.map(|t| t.sojourn)))?;
    writeln!(
        out,
        " Arrivals:{} Finished:{} Lost:{} InService:{} Queued:{}",
        summary.arrivals, summary.finished, summary.lost, summary.in_service, summary.queued
    )?;
    writeln!(
        out,
        " Utilisation:{} LossRatio:{}",
        or_na(summary.utilisation),
        or_na(summary.loss_ratio)
    )?;
    Ok(())
}
