// Peg Simulation Runner - sweeps collateral price paths through the peg model
// Seedable ChaCha8 PRNG for the random walk, Monte Carlo aggregation, JSON report
//
// Usage:
//   cargo run --release --bin peg-sim                        # All scenarios, reference params
//   cargo run --release --bin peg-sim -- --config run.toml   # Params/horizon/feed from TOML
//   cargo run --release --bin peg-sim -- --runs 100 random   # Filter by name, 100 seeds
//   cargo run --release --bin peg-sim -- --time-series       # Per-step JSONL output
//   RUST_LOG=peg.step=debug cargo run --bin peg-sim -- flat  # Trace every step

mod metrics;
mod monte_carlo;
mod report;
mod scenarios;
mod time_series;

use clap::Parser;
use peg_model::RunConfig;
use std::error::Error;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

use monte_carlo::{run_monte_carlo, RunSettings};
use report::SuiteReport;
use scenarios::{scenarios, Scenario};

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "peg-sim", version, about = "Collateral-backed token peg simulator")]
struct Cli {
    /// TOML run config (params, horizon, feed). Defaults to the reference run.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seeded runs per stochastic scenario.
    #[arg(long, default_value_t = 30)]
    runs: usize,

    /// Base seed; run i uses seed + i.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the configured horizon.
    #[arg(long)]
    steps: Option<u64>,

    /// Half-width of the band around the peg counted as held.
    #[arg(long, default_value_t = metrics::DEFAULT_PEG_BAND)]
    peg_band: f64,

    /// Share of steps (percent) that must sit inside the band for a run to hold.
    #[arg(long, default_value_t = 95.0)]
    min_band_pct: f64,

    /// Write per-step JSONL for every run.
    #[arg(long)]
    time_series: bool,

    /// Directory for reports.
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,

    /// Only run scenarios whose name, label or feed kind contains this.
    filter: Option<String>,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config.horizon = steps;
    }

    let all_scenarios = scenarios(&config.feed);
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => all_scenarios.iter().filter(|s| s.matches(f)).collect(),
        None => all_scenarios.iter().collect(),
    };
    if to_run.is_empty() {
        return Err(format!("no scenarios match filter {:?}", cli.filter).into());
    }

    let ts_dir = cli.time_series.then(|| cli.out_dir.join("time-series"));
    let settings = RunSettings {
        params: &config.params,
        horizon: config.horizon,
        peg_band: cli.peg_band,
        min_band_pct: cli.min_band_pct,
        time_series_dir: ts_dir.as_deref(),
    };

    info!(
        scenarios = to_run.len(),
        horizon = config.horizon,
        runs = cli.runs,
        seed = cli.seed,
        "starting peg simulation suite"
    );

    let suite_start = Instant::now();
    let mut reports = Vec::with_capacity(to_run.len());
    for scenario in &to_run {
        let report = run_monte_carlo(scenario, &settings, cli.runs, cli.seed)?;
        info!(
            scenario = %report.label,
            runs = report.n_runs,
            hold_rate = report.peg_hold_rate,
            band_pct = report.peg_band_pct.mean,
            max_dev = report.max_peg_deviation.max,
            redeemed = report.total_redeemed.mean,
            "scenario done"
        );
        reports.push(report);
    }
    info!(elapsed_s = suite_start.elapsed().as_secs_f64(), "suite done");

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis().to_string();
    let report = SuiteReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        base_seed: cli.seed,
        runs_per_stochastic_scenario: cli.runs,
        params: config.params.clone(),
        scenarios: reports,
    };

    std::fs::create_dir_all(&cli.out_dir)?;
    let path = cli.out_dir.join(format!("peg-sim-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    info!(path = %path.display(), "report written");
    Ok(())
}
