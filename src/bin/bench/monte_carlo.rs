// Monte Carlo Infrastructure: N seeded runs per scenario, mean ± 95% CI

use generator_engine::*;
use tracing::{debug, info, trace};

use crate::report::*;
use crate::scenarios::{Autopilot, Scenario};

use std::time::Instant;

/// 60 Hz display refresh.
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(scenario: &Scenario, seed: u64, max_seconds: f64) -> RunResult {
    let start = Instant::now();
    let mut sim = GeneratorSimulation::new(seed, 1720.0, 1066.0);
    let mut pilot = Autopilot::new(scenario, seed);
    let mut cues = CueQueue::default();
    let mut host = CompletionLatch::default();

    let mut now_ms = 0.0;
    let mut corrections = 0u32;
    while !sim.is_completed() && sim.state().elapsed < max_seconds {
        if pilot.act(&mut sim, now_ms, &mut cues).is_some() {
            corrections += 1;
        }
        let frame = sim.frame(now_ms, &mut cues, &mut host);
        for event in &frame.events {
            debug!(scenario = scenario.name, seed, t = frame.snapshot.elapsed, ?event);
        }
        for cue in cues.drain() {
            trace!(cue = cue.name());
        }
        now_ms += FRAME_MS;
    }

    let stats = sim.stats();
    RunResult {
        scenario: scenario.name.to_string(),
        seed,
        completed: sim.is_completed(),
        completion_time: stats.completed_at,
        simulated_seconds: sim.state().elapsed,
        frames: stats.frames,
        cooldowns: stats.cooldowns,
        surges: stats.surges,
        milestones: stats.milestones,
        corrections,
        elapsed_ms: start.elapsed().as_millis(),
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(scenario: &Scenario, n_runs: usize, base_seed: u64, max_seconds: f64) -> MonteCarloReport {
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed.wrapping_add(i as u64);
        let result = run_single(scenario, seed, max_seconds);
        info!(
            scenario = scenario.name,
            seed,
            completed = result.completed,
            cooldowns = result.cooldowns,
            "run finished"
        );
        results.push(result);
    }
    aggregate(scenario, results)
}

fn aggregate(scenario: &Scenario, results: Vec<RunResult>) -> MonteCarloReport {
    let n = results.len();
    let completed = results.iter().filter(|r| r.completed).count();
    let metric = |f: fn(&RunResult) -> f64| Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>());

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        n_runs: n,
        completion_rate: if n > 0 { completed as f64 / n as f64 } else { 0.0 },
        completion_time: Stats::from_samples(
            &results.iter().filter_map(|r| r.completion_time).collect::<Vec<_>>(),
        ),
        cooldowns: metric(|r| r.cooldowns as f64),
        surges: metric(|r| r.surges as f64),
        corrections: metric(|r| r.corrections as f64),
        elapsed_ms: metric(|r| r.elapsed_ms as f64),
        individual_runs: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::scenarios;

    #[test]
    fn same_seed_same_run() {
        let all = scenarios();
        let a = run_single(&all[1], 11, 30.0);
        let b = run_single(&all[1], 11, 30.0);
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.cooldowns, b.cooldowns);
        assert_eq!(a.surges, b.surges);
        assert_eq!(a.completion_time, b.completion_time);
    }

    #[test]
    fn runs_stop_at_time_limit() {
        let all = scenarios();
        let r = run_single(&all[0], 2, 5.0);
        assert!(!r.completed);
        assert!(r.simulated_seconds >= 5.0 && r.simulated_seconds < 5.1);
        assert_eq!(r.corrections, 0);
    }

    #[test]
    fn report_counts_runs() {
        let all = scenarios();
        let rep = run_monte_carlo(&all[0], 3, 0, 2.0);
        assert_eq!(rep.n_runs, 3);
        assert_eq!(rep.individual_runs.len(), 3);
        assert_eq!(rep.completion_time.n, 0);
    }
}
