//! Integration tests for qs-sim.

use std::collections::HashSet;

use qs_core::{Capacity, ClientId, QsError, ScriptedSource, ServerId, SimConfig, Tick};
use qs_service::ServerUnit;

use crate::{
    LostRecord, NoopObserver, QueueSample, Sim, SimBuilder, SimError, SimObserver, StepResult,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(arrival_rate: f64, service_rate: f64, servers: usize) -> SimConfig {
    SimConfig {
        arrival_rate,
        service_rate,
        server_count:          servers,
        capacity:              0,
        total_ticks:           100,
        seed:                  42,
        num_threads:           Some(1),
        output_interval_ticks: 0,
    }
}

/// A sim driven by scripted arrival counts and service draws.
fn scripted(
    servers:  usize,
    capacity: usize,
    arrivals: impl IntoIterator<Item = u64>,
    services: impl IntoIterator<Item = f64>,
) -> Sim<ScriptedSource> {
    let mut config = test_config(1.0, 1.0, servers);
    config.capacity = capacity;
    SimBuilder::new(config)
        .random_source(ScriptedSource::new(arrivals, services))
        .build()
        .unwrap()
}

fn lengths(sim: &Sim<ScriptedSource>) -> Vec<usize> {
    sim.queue_lengths().iter().map(|s| s.length).collect()
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = SimBuilder::new(test_config(0.5, 3.0, 3)).build().unwrap();
        assert_eq!(sim.servers().len(), 3);
        assert_eq!(sim.current_tick(), Tick(0));
        assert_eq!(sim.capacity(), Capacity::Unbounded);
        assert!(sim.servers().iter().all(ServerUnit::is_idle));
        let ids: Vec<_> = sim.servers().iter().map(ServerUnit::id).collect();
        assert_eq!(ids, [ServerId(0), ServerId(1), ServerId(2)]);
    }

    #[test]
    fn non_positive_service_rate_fails_fast() {
        let result = SimBuilder::new(test_config(0.5, 0.0, 1)).build();
        assert!(matches!(
            result,
            Err(SimError::Config(QsError::InvalidRate { what: "service rate", .. }))
        ));
    }

    #[test]
    fn negative_arrival_rate_fails_fast() {
        let result = SimBuilder::new(test_config(-1.0, 3.0, 1)).build();
        assert!(matches!(result, Err(SimError::Config(QsError::InvalidRate { .. }))));
    }

    #[test]
    fn zero_servers_fails_fast() {
        let result = SimBuilder::new(test_config(0.5, 3.0, 0)).build();
        assert!(matches!(result, Err(SimError::Config(QsError::NoServers))));
    }

    #[test]
    fn service_rate_count_mismatch_errors() {
        let result = SimBuilder::new(test_config(0.5, 3.0, 2))
            .service_rates(vec![1.0])
            .build();
        assert!(matches!(
            result,
            Err(SimError::ServerCountMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn invalid_per_server_rate_errors() {
        let result = SimBuilder::new(test_config(0.5, 3.0, 2))
            .service_rates(vec![1.0, -4.0])
            .build();
        assert!(matches!(result, Err(SimError::Config(QsError::InvalidRate { .. }))));
    }

    #[test]
    fn per_server_rates_applied() {
        let sim = SimBuilder::new(test_config(0.5, 3.0, 2))
            .service_rates(vec![1.5, 9.0])
            .build()
            .unwrap();
        assert_eq!(sim.servers()[0].service_rate(), 1.5);
        assert_eq!(sim.servers()[1].service_rate(), 9.0);
    }

    #[test]
    fn built_config_is_exposed_read_only() {
        let mut config = test_config(0.5, 3.0, 2);
        config.capacity = 2;
        let sim = SimBuilder::new(config.clone()).build().unwrap();
        assert_eq!(sim.config(), &config);
        assert_eq!(sim.capacity(), sim.config().capacity());

        // Changing the caller's copy does not reach the engine.
        config.arrival_rate = -1.0;
        config.capacity = 0;
        assert_eq!(sim.config().arrival_rate, 0.5);
        assert_eq!(sim.capacity(), Capacity::Bounded(2));
    }

    #[test]
    fn rebuilding_with_changed_config_revalidates() {
        let sim = SimBuilder::new(test_config(0.5, 3.0, 1)).build().unwrap();
        let mut changed = sim.config().clone();
        changed.arrival_rate = -1.0;
        assert!(matches!(
            SimBuilder::new(changed).build(),
            Err(SimError::Config(QsError::InvalidRate { what: "arrival rate", .. }))
        ));
    }

    #[test]
    fn nonzero_capacity_is_bounded() {
        let mut config = test_config(0.5, 3.0, 1);
        config.capacity = 4;
        let sim = SimBuilder::new(config).build().unwrap();
        assert_eq!(sim.capacity(), Capacity::Bounded(4));
    }
}

// ── Basic run ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn zero_duration_is_noop() {
        let mut sim = SimBuilder::new(test_config(2.0, 3.0, 1)).build().unwrap();
        let records = sim.run(0).unwrap();
        assert!(records.finished.is_empty());
        assert!(records.queue_lengths.is_empty());
        assert!(records.lost.is_empty());
        assert_eq!(sim.current_tick(), Tick(0));
        assert_eq!(sim.mean_queue_length(), None);
        assert_eq!(sim.mean_times(), None);
        assert_eq!(sim.utilisation(), None);
        assert_eq!(sim.loss_ratio(), None);
    }

    #[test]
    fn run_samples_every_tick_in_order() {
        let mut sim = SimBuilder::new(test_config(0.7, 3.0, 2)).build().unwrap();
        let records = sim.run(25).unwrap();
        let ticks: Vec<u64> = records.queue_lengths.iter().map(|s| s.tick.0).collect();
        assert_eq!(ticks, (0..25).collect::<Vec<_>>());
        assert_eq!(sim.current_tick(), Tick(25));
    }

    #[test]
    fn consecutive_runs_continue_the_clock() {
        let mut sim = SimBuilder::new(test_config(0.7, 3.0, 2)).build().unwrap();
        sim.run(5).unwrap();
        sim.run(3).unwrap();
        assert_eq!(sim.current_tick(), Tick(8));
        assert_eq!(sim.queue_lengths().len(), 8);
        assert_eq!(sim.queue_lengths()[7].tick, Tick(7));
    }

    #[test]
    fn run_to_end_stops_at_total_ticks() {
        let mut sim = SimBuilder::new(test_config(0.7, 3.0, 2)).build().unwrap();
        sim.run(30).unwrap();
        sim.run_to_end(&mut NoopObserver).unwrap();
        assert_eq!(sim.current_tick(), Tick(100));
        sim.run_to_end(&mut NoopObserver).unwrap();
        assert_eq!(sim.current_tick(), Tick(100));
    }

    #[test]
    fn step_matches_recorded_state() {
        let mut sim = SimBuilder::new(test_config(1.2, 4.0, 1)).build().unwrap();
        for expected in 0..40 {
            let step = sim.step().unwrap();
            assert_eq!(step.tick, Tick(expected));
            assert_eq!(step.queue_length, sim.queued());
            assert_eq!(sim.queue_lengths().last().unwrap().length, step.queue_length);
        }
    }

    /// Observer that counts hooks.
    #[derive(Default)]
    struct HookCounter {
        starts:    usize,
        ends:      usize,
        snapshots: Vec<Tick>,
        end_tick:  Option<Tick>,
        arrivals:  u64,
    }
    impl SimObserver for HookCounter {
        fn on_tick_start(&mut self, _t: Tick) { self.starts += 1; }
        fn on_tick_end(&mut self, step: &StepResult) {
            self.ends += 1;
            self.arrivals += step.arrivals;
        }
        fn on_snapshot(&mut self, t: Tick, servers: &[ServerUnit], _q: usize) {
            assert_eq!(servers.len(), 2);
            self.snapshots.push(t);
        }
        fn on_sim_end(&mut self, t: Tick) { self.end_tick = Some(t); }
    }

    #[test]
    fn observer_called_correct_number_of_times() {
        let mut config = test_config(0.9, 3.0, 2);
        config.output_interval_ticks = 3;
        let mut sim = SimBuilder::new(config).build().unwrap();
        let mut obs = HookCounter::default();
        sim.run_with(7, &mut obs).unwrap();
        assert_eq!(obs.starts, 7);
        assert_eq!(obs.ends, 7);
        assert_eq!(obs.snapshots, [Tick(0), Tick(3), Tick(6)]);
        assert_eq!(obs.end_tick, Some(Tick(7)));
        assert_eq!(obs.arrivals, sim.arrivals());
    }

    #[test]
    fn zero_interval_disables_snapshots() {
        let mut sim = SimBuilder::new(test_config(0.9, 3.0, 2)).build().unwrap();
        let mut obs = HookCounter::default();
        sim.run_with(10, &mut obs).unwrap();
        assert!(obs.snapshots.is_empty());
    }
}

// ── Exact scenarios ───────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn single_client_timeline() {
        // Arrives at 0, served from 0 for 2 units of work, leaves at 3.
        let mut sim = scripted(1, 0, [1], [2.0]);
        sim.run(5).unwrap();
        let rec = sim.finished()[0];
        assert_eq!(sim.finished().len(), 1);
        assert_eq!(rec.client_id, ClientId(0));
        assert_eq!(rec.departure_tick, Tick(3));
        assert_eq!((rec.waiting_time, rec.service_time, rec.sojourn_time), (0, 3, 3));
        assert_eq!(lengths(&sim), [0, 0, 0, 0, 0]);
    }

    #[test]
    fn queue_is_first_come_first_served() {
        let mut sim = scripted(1, 0, [3], [1.0, 1.0, 1.0]);
        sim.run(7).unwrap();

        let order: Vec<ClientId> = sim.finished().iter().map(|r| r.client_id).collect();
        assert_eq!(order, [ClientId(0), ClientId(1), ClientId(2)]);

        let waits: Vec<u64> = sim.finished().iter().map(|r| r.waiting_time).collect();
        assert_eq!(waits, [0, 2, 4]);
        let sojourns: Vec<u64> = sim.finished().iter().map(|r| r.sojourn_time).collect();
        assert_eq!(sojourns, [2, 4, 6]);
        assert_eq!(lengths(&sim), [2, 2, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn completion_frees_server_for_same_tick_arrival() {
        // Client 0 leaves at tick 2 (pass 1); client 1 arrives at tick 2
        // (pass 2) and is assigned immediately (pass 3).
        let mut sim = scripted(1, 0, [1, 0, 1], [1.0, 1.0]);
        sim.run(5).unwrap();
        let rec = sim.finished()[1];
        assert_eq!(rec.client_id, ClientId(1));
        assert_eq!(rec.waiting_time, 0);
        assert_eq!(sim.finished()[0].departure_tick, Tick(2));
        assert_eq!(rec.departure_tick, Tick(4));
    }

    #[test]
    fn servers_work_in_parallel() {
        let mut sim = scripted(2, 0, [2], [1.0, 3.0]);
        let step = sim.step().unwrap();
        assert_eq!(step.assigned, 2);
        assert_eq!(sim.in_service(), 2);

        sim.run(4).unwrap();
        let done: Vec<(ClientId, ServerId, Tick)> = sim
            .finished()
            .iter()
            .map(|r| (r.client_id, r.server_id, r.departure_tick))
            .collect();
        assert_eq!(
            done,
            [(ClientId(0), ServerId(0), Tick(2)), (ClientId(1), ServerId(1), Tick(4))]
        );
    }

    #[test]
    fn at_most_one_assignment_per_server_per_tick() {
        let mut sim = scripted(1, 0, [4], [5.0]);
        let step = sim.step().unwrap();
        assert_eq!(step.arrivals, 4);
        assert_eq!(step.assigned, 1);
        assert_eq!(step.queue_length, 3);
    }

    #[test]
    fn burst_beyond_capacity_is_lost() {
        // capacity 1, one server busy for a long time.
        // t0: client 0 enqueued then assigned.  t1: client 1 waits.
        // t2: a burst of three finds the queue full.
        let mut sim = scripted(1, 1, [1, 1, 3], [10.0]);
        let records = sim.run(3).unwrap();

        assert_eq!(
            records.lost,
            [
                LostRecord { tick: Tick(2), client_id: ClientId(2) },
                LostRecord { tick: Tick(2), client_id: ClientId(3) },
                LostRecord { tick: Tick(2), client_id: ClientId(4) },
            ]
        );
        assert_eq!(
            records.queue_lengths,
            [
                QueueSample { tick: Tick(0), length: 0 },
                QueueSample { tick: Tick(1), length: 1 },
                QueueSample { tick: Tick(2), length: 1 },
            ]
        );
        assert_eq!(sim.arrivals(), 5);
        assert_eq!(sim.in_service() + sim.queued() + sim.lost().len(), 5);
        assert_eq!(sim.loss_ratio(), Some(0.6));
    }

    #[test]
    fn burst_fills_free_queue_slots_first() {
        // capacity 2, queue empty but server busy: of a burst of 4 at t1,
        // two are admitted and two lost.
        let mut sim = scripted(1, 2, [1, 4], [10.0]);
        let step0 = sim.step().unwrap();
        assert!(step0.lost.is_empty());
        let step1 = sim.step().unwrap();
        assert_eq!(step1.admitted(), 2);
        let lost_ids: Vec<ClientId> = step1.lost.iter().map(|l| l.client_id).collect();
        assert_eq!(lost_ids, [ClientId(3), ClientId(4)]);
        assert_eq!(step1.queue_length, 2);
    }

    #[test]
    fn unbounded_queue_never_loses() {
        let mut sim = scripted(1, 0, [50, 50], [100.0]);
        sim.run(2).unwrap();
        assert!(sim.lost().is_empty());
        assert_eq!(sim.queued(), 99);
    }

    #[test]
    fn waiting_clients_visible_in_fifo_order() {
        let mut sim = scripted(1, 0, [4], [5.0]);
        sim.step().unwrap();
        let ids: Vec<ClientId> = sim.waiting().map(|c| c.id).collect();
        assert_eq!(ids, [ClientId(1), ClientId(2), ClientId(3)]);
    }

    #[test]
    fn utilisation_counts_occupied_ticks() {
        // One server, one client with 3 units of work over 10 ticks: busy on
        // ticks 1..=3 plus the release tick 4.
        let mut sim = scripted(1, 0, [1], [3.0]);
        sim.run(10).unwrap();
        assert_eq!(sim.finished()[0].service_time, 4);
        assert_eq!(sim.utilisation(), Some(0.4));
    }

    #[test]
    fn back_to_back_service_is_fully_utilised() {
        // A fresh client is assigned on every release tick, so after tick 0
        // the server is never without a client.
        let mut sim = scripted(1, 0, [10], [2.0; 10]);
        sim.run(11).unwrap();
        assert_eq!(sim.finished().len(), 3);
        assert_eq!(sim.utilisation(), Some(10.0 / 11.0));
    }
}

// ── Properties under random draws ─────────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;

    fn configs() -> Vec<SimConfig> {
        let mut out = Vec::new();
        for (i, &(lambda, mean, servers, capacity)) in [
            (0.3, 2.0, 1, 0),
            (0.9, 3.0, 1, 0),
            (2.0, 1.5, 3, 0),
            (1.5, 4.0, 2, 3),
            (3.0, 6.0, 1, 1),
            (0.05, 60.0, 1, 0),
        ]
        .iter()
        .enumerate()
        {
            let mut c = test_config(lambda, mean, servers);
            c.capacity = capacity;
            c.seed = 1_000 + i as u64;
            out.push(c);
        }
        out
    }

    #[test]
    fn timestamps_are_ordered() {
        for config in configs() {
            let mut sim = SimBuilder::new(config).build().unwrap();
            sim.run(2_000).unwrap();
            for r in sim.finished() {
                assert!(r.service_time >= 1, "{r:?}");
                assert_eq!(r.sojourn_time, r.waiting_time + r.service_time);
                assert!(r.departure_tick.0 >= r.sojourn_time);
            }
        }
    }

    #[test]
    fn queue_never_exceeds_capacity() {
        for config in configs() {
            let limit = config.capacity().limit();
            let mut sim = SimBuilder::new(config).build().unwrap();
            sim.run(2_000).unwrap();
            if let Some(limit) = limit {
                assert!(sim.queue_lengths().iter().all(|s| s.length <= limit));
            } else {
                assert!(sim.lost().is_empty());
            }
        }
    }

    #[test]
    fn every_client_id_is_accounted_for_once() {
        for config in configs() {
            let mut sim = SimBuilder::new(config).build().unwrap();
            sim.run(1_500).unwrap();

            let mut seen = HashSet::new();
            let finished = sim.finished().iter().map(|r| r.client_id);
            let lost = sim.lost().iter().map(|l| l.client_id);
            let serving = sim
                .servers()
                .iter()
                .filter_map(|s| s.current_client().map(|c| c.id));
            let waiting = sim.waiting().map(|c| c.id);
            for id in finished.chain(lost).chain(serving).chain(waiting) {
                assert!(seen.insert(id), "{id} appears twice");
            }

            assert_eq!(seen.len() as u64, sim.arrivals());
            assert_eq!(
                sim.finished().len() + sim.in_service() + sim.queued() + sim.lost().len(),
                sim.arrivals() as usize
            );
            assert!(seen.iter().all(|id| id.0 < sim.arrivals()));
        }
    }

    #[test]
    fn no_arrivals_means_empty_queue() {
        let mut sim = SimBuilder::new(test_config(0.0, 60.0, 1)).build().unwrap();
        let records = sim.run(50).unwrap();
        assert!(records.finished.is_empty());
        assert_eq!(records.queue_lengths.len(), 50);
        assert!(records.queue_lengths.iter().all(|s| s.length == 0));
        assert_eq!(sim.mean_queue_length(), Some(0.0));
        assert_eq!(sim.mean_times(), None);
        assert_eq!(sim.arrivals(), 0);
    }

    #[test]
    fn same_seed_same_records() {
        for config in configs() {
            let mut a = SimBuilder::new(config.clone()).build().unwrap();
            let mut b = SimBuilder::new(config).build().unwrap();
            a.run(1_000).unwrap();
            b.run(1_000).unwrap();
            assert_eq!(a.finished(), b.finished());
            assert_eq!(a.queue_lengths(), b.queue_lengths());
            assert_eq!(a.lost(), b.lost());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut c1 = test_config(0.9, 3.0, 1);
        let mut c2 = c1.clone();
        c1.seed = 1;
        c2.seed = 2;
        let mut a = SimBuilder::new(c1).build().unwrap();
        let mut b = SimBuilder::new(c2).build().unwrap();
        a.run(500).unwrap();
        b.run(500).unwrap();
        assert_ne!(a.queue_lengths(), b.queue_lengths());
    }

    #[test]
    fn aggregates_are_idempotent() {
        let mut sim = SimBuilder::new(test_config(0.9, 3.0, 1)).build().unwrap();
        sim.run(800).unwrap();
        assert_eq!(sim.mean_queue_length(), sim.mean_queue_length());
        assert_eq!(sim.mean_times(), sim.mean_times());
        assert_eq!(sim.summary(), sim.summary());
        assert_eq!(sim.records().mean_queue_length(), sim.mean_queue_length());
    }

    #[test]
    fn mean_times_are_consistent() {
        let mut sim = SimBuilder::new(test_config(0.5, 3.0, 2)).build().unwrap();
        sim.run(3_000).unwrap();
        let m = sim.mean_times().unwrap();
        assert!(m.waiting >= 0.0);
        assert!(m.service >= 1.0);
        assert!((m.sojourn - (m.waiting + m.service)).abs() < 1e-9);
    }

    #[test]
    fn utilisation_is_a_fraction() {
        for config in configs() {
            let mut sim = SimBuilder::new(config).build().unwrap();
            sim.run(1_000).unwrap();
            let u = sim.utilisation().unwrap();
            assert!((0.0..=1.0).contains(&u), "utilisation {u}");
        }
    }

    #[test]
    fn overloaded_single_server_is_nearly_always_busy() {
        // λ·E[S] ≫ 1: the server should almost never be idle.
        let mut sim = SimBuilder::new(test_config(2.0, 5.0, 1)).build().unwrap();
        sim.run(2_000).unwrap();
        assert!(sim.utilisation().unwrap() > 0.9);
        assert!(sim.mean_queue_length().unwrap() > 10.0);
    }

    #[test]
    fn summary_matches_accessors() {
        let mut config = test_config(1.5, 4.0, 2);
        config.capacity = 3;
        let mut sim = SimBuilder::new(config).build().unwrap();
        sim.run(600).unwrap();
        let s = sim.summary();
        assert_eq!(s.seed, 42);
        assert_eq!(s.ticks, 600);
        assert_eq!(s.servers, 2);
        assert_eq!(s.arrivals, sim.arrivals());
        assert_eq!(s.finished, sim.finished().len());
        assert_eq!(s.lost, sim.lost().len());
        assert_eq!(s.finished + s.in_service + s.queued + s.lost, s.arrivals as usize);
    }
}

// ── Statistics helpers ────────────────────────────────────────────────────────

#[cfg(test)]
mod stats_tests {
    use crate::stats::{mean_of, mean_queue_length, ratio};

    use super::*;

    #[test]
    fn mean_queue_length_of_samples() {
        let samples = [
            QueueSample { tick: Tick(0), length: 1 },
            QueueSample { tick: Tick(1), length: 2 },
            QueueSample { tick: Tick(2), length: 6 },
        ];
        assert_eq!(mean_queue_length(&samples), Some(3.0));
        assert_eq!(mean_queue_length(&[]), None);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(1, 4), Some(0.25));
        assert_eq!(ratio(0, 0), None);
    }

    #[test]
    fn mean_of_skips_missing() {
        assert_eq!(mean_of([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean_of([None, None]), None);
    }
}

// ── Replications ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod replicate_tests {
    use super::*;
    use crate::replicate;

    #[test]
    fn one_summary_per_replication() {
        let config = test_config(0.5, 3.0, 1);
        let summaries = replicate(&config, 4).unwrap();
        assert_eq!(summaries.len(), 4);
        assert!(summaries.iter().all(|s| s.ticks == 100));
        let seeds: HashSet<u64> = summaries.iter().map(|s| s.seed).collect();
        assert_eq!(seeds.len(), 4);
    }

    #[test]
    fn replications_are_reproducible() {
        let config = test_config(0.8, 2.0, 2);
        assert_eq!(replicate(&config, 3).unwrap(), replicate(&config, 3).unwrap());
    }

    #[test]
    fn zero_replications_is_empty() {
        assert!(replicate(&test_config(0.8, 2.0, 2), 0).unwrap().is_empty());
    }

    #[test]
    fn invalid_config_rejected_before_running() {
        let result = replicate(&test_config(0.8, 0.0, 2), 3);
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}
