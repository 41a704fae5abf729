//! Aggregate statistics over accumulated run records.
//!
//! Every function here is pure.  "No data" (an empty run, or a run in which no
//! service has completed yet) is an ordinary outcome and is reported as `None`
//! rather than an error or a sentinel value.

use qs_service::{CompletionRecord, ServerUnit};

use crate::QueueSample;

/// Mean per-client times over all completed services, in ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeanTimes {
    pub waiting: f64,
    pub service: f64,
    pub sojourn: f64,
}

/// Headline numbers for one run, as consumed by reports and replications.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunSummary {
    pub seed:              u64,
    pub ticks:             u64,
    pub servers:           usize,
    pub arrivals:          u64,
    pub finished:          usize,
    pub lost:              usize,
    pub in_service:        usize,
    pub queued:            usize,
    pub mean_queue_length: Option<f64>,
    pub mean_times:        Option<MeanTimes>,
    pub utilisation:       Option<f64>,
    pub loss_ratio:        Option<f64>,
}

/// Arithmetic mean of the sampled queue lengths.
pub fn mean_queue_length(samples: &[QueueSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let total: u64 = samples.iter().map(|s| s.length as u64).sum();
    Some(total as f64 / samples.len() as f64)
}

/// Arithmetic means of waiting, service, and sojourn times.
pub fn mean_times(finished: &[CompletionRecord]) -> Option<MeanTimes> {
    if finished.is_empty() {
        return None;
    }
    let (w, s, j) = finished.iter().fold((0u64, 0u64, 0u64), |(w, s, j), r| {
        (w + r.waiting_time, s + r.service_time, j + r.sojourn_time)
    });
    let n = finished.len() as f64;
    Some(MeanTimes {
        waiting: w as f64 / n,
        service: s as f64 / n,
        sojourn: j as f64 / n,
    })
}

/// Occupied server-ticks (release ticks included) divided by server-ticks
/// available over `ticks` ticks.
pub fn utilisation(servers: &[ServerUnit], ticks: u64) -> Option<f64> {
    let busy: u64 = servers.iter().map(ServerUnit::busy_ticks).sum();
    ratio(busy, ticks * servers.len() as u64)
}

/// `num / den`, or `None` when `den` is zero.
pub fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Mean of a sequence of optional values, skipping `None`s.
///
/// Used to average per-replication statistics; `None` if every value is
/// `None`.
pub fn mean_of(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
