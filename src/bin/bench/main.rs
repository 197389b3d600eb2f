// Generator Benchmark Runner
// Monte Carlo over seeds, scripted players, seedable ChaCha noise
//
// Usage:
//   cargo run --release --bin bench                       # All scenarios, 30 runs each
//   cargo run --release --bin bench -- --runs 5           # Quick mode
//   cargo run --release --bin bench -- ATTENTIVE          # Filter by name
//   cargo run --release --bin bench -- --json out.json    # Write JSON report
//   cargo run --release --bin bench -- --seed 42 -v       # Custom base seed, event log

mod monte_carlo;
mod report;
mod scenarios;

use clap::Parser;
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bench", about = "Monte Carlo runs of the generator task under scripted players")]
struct Cli {
    /// Runs per scenario.
    #[arg(long, default_value_t = 30)]
    runs: usize,

    /// Base seed; run i uses seed + i.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Give up on a run after this many task-clock seconds.
    #[arg(long, default_value_t = 180.0)]
    max_seconds: f64,

    /// Write the full report here as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log every simulation event.
    #[arg(short, long)]
    verbose: bool,

    /// Only run scenarios whose name or label contains this.
    filter: Option<String>,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower) || s.label.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Generator Benchmark Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {} | Limit: {:.0}s",
        cli.runs, cli.seed, cli.max_seconds);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<30} {:>6} {:>14} {:>12} {:>10} {:>8}",
        "Scenario", "Done%", "Finish(s)", "Cooldowns", "Surges", "Time");
    println!("  {}", "-".repeat(86));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed, cli.max_seconds);

        let finish = if report.completion_time.n > 0 {
            format!("{:.1}±{:.1}", report.completion_time.mean, report.completion_time.half_width())
        } else {
            "-".to_string()
        };
        println!("  {:<30} {:>5.0}% {:>14} {:>7.2}±{:<4.2} {:>10.2} {:>6.0}ms",
            report.label,
            report.completion_rate * 100.0,
            finish,
            report.cooldowns.mean, report.cooldowns.half_width(),
            report.surges.mean,
            report.elapsed_ms.mean,
        );

        mc_reports.push(report);
    }

    println!("  {}", "-".repeat(86));
    println!("  Suite time: {:.1}s\n", suite_start.elapsed().as_secs_f64());

    if let Some(path) = &cli.json {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis().to_string();
        let report = BenchReport {
            timestamp,
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            n_runs_per_scenario: cli.runs,
            base_seed: cli.seed,
            max_seconds: cli.max_seconds,
            scenarios: mc_reports,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("  Results saved to: {}\n", path.display());
    }

    Ok(())
}
