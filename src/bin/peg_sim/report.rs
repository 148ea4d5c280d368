// Peg Simulation Report Types
// Structured JSON output for offline analysis; no rendering happens here

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

/// z-score of a two-sided 95% interval.
const Z_95: f64 = 1.96;

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        // Sample variance; a single run has no spread.
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let half_width = Z_95 * std_dev / (n as f64).sqrt();
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn collect<T>(items: &[T], metric: impl Fn(&T) -> f64) -> Self {
        Self::from_samples(&items.iter().map(metric).collect::<Vec<_>>())
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub scenario: String,
    pub seed: u64,
    pub steps: u64,
    pub peg_held: bool,
    pub peg_band_pct: f64,
    pub max_peg_deviation: f64,
    pub mean_token_price: f64,
    pub min_token_price: f64,
    pub total_redeemed: f64,
    pub peak_base_fee: f64,
    pub final_token_price: f64,
    pub final_token_supply: f64,
    pub final_collateral_price: f64,
    pub elapsed_us: u128,
}

// ─── Scenario Report (per-scenario aggregation) ─────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario_name: String,
    pub label: String,
    pub feed: String,
    pub n_runs: usize,
    pub peg_hold_rate: f64,
    pub peg_band_pct: Stats,
    pub max_peg_deviation: Stats,
    pub mean_token_price: Stats,
    pub total_redeemed: Stats,
    pub peak_base_fee: Stats,
    pub final_token_supply: Stats,
    pub individual_runs: Vec<RunResult>,
}

impl ScenarioReport {
    pub fn aggregate(name: &str, label: &str, feed: &str, runs: Vec<RunResult>) -> Self {
        let n = runs.len();
        let held = runs.iter().filter(|r| r.peg_held).count();
        Self {
            scenario_name: name.to_string(),
            label: label.to_string(),
            feed: feed.to_string(),
            n_runs: n,
            peg_hold_rate: if n > 0 { held as f64 / n as f64 } else { 0.0 },
            peg_band_pct: Stats::collect(&runs, |r| r.peg_band_pct),
            max_peg_deviation: Stats::collect(&runs, |r| r.max_peg_deviation),
            mean_token_price: Stats::collect(&runs, |r| r.mean_token_price),
            total_redeemed: Stats::collect(&runs, |r| r.total_redeemed),
            peak_base_fee: Stats::collect(&runs, |r| r.peak_base_fee),
            final_token_supply: Stats::collect(&runs, |r| r.final_token_supply),
            individual_runs: runs,
        }
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub base_seed: u64,
    pub runs_per_stochastic_scenario: usize,
    pub params: peg_model::ModelParams,
    pub scenarios: Vec<ScenarioReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let stats = Stats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.std_dev - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!(stats.ci_lower < stats.mean && stats.mean < stats.ci_upper);
    }

    #[test]
    fn test_stats_single_and_empty() {
        let one = Stats::from_samples(&[7.0]);
        assert_eq!(one.std_dev, 0.0);
        assert_eq!(one.ci_lower, 7.0);
        assert_eq!(one.ci_upper, 7.0);

        let none = Stats::from_samples(&[]);
        assert_eq!(none.n, 0);
        assert_eq!(none.mean, 0.0);
    }
}
