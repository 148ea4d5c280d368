// Per-Run Metric Trackers - peg band, redemption and fee summaries
// Computed from a finished SimulationState; the engine never sees these

use peg_model::step::PEG;
use peg_model::{Series, SimulationState};

/// Default half-width of the band around the peg counted as "held".
pub const DEFAULT_PEG_BAND: f64 = 0.05;

// ─── Peg Tracker ────────────────────────────────────────────────────────────

/// Tracks per-step token price deviation from the peg.
pub struct PegTracker {
    pub total_steps: u64,
    pub steps_within_band: u64,
    pub band: f64,
    pub max_deviation: f64,
}

impl PegTracker {
    pub fn new(band: f64) -> Self {
        Self {
            total_steps: 0,
            steps_within_band: 0,
            band,
            max_deviation: 0.0,
        }
    }

    pub fn record(&mut self, token_price: f64) {
        let deviation = (token_price - PEG).abs();
        self.total_steps += 1;
        self.max_deviation = self.max_deviation.max(deviation);
        if deviation <= self.band {
            self.steps_within_band += 1;
        }
    }

    /// Percentage of steps within the band.
    pub fn band_pct(&self) -> f64 {
        if self.total_steps == 0 {
            return 100.0;
        }
        (self.steps_within_band as f64 / self.total_steps as f64) * 100.0
    }
}

// ─── Run Summary ────────────────────────────────────────────────────────────

pub struct RunSummary {
    pub peg: PegTracker,
    pub mean_token_price: f64,
    pub min_token_price: f64,
    pub total_redeemed: f64,
    pub peak_base_fee: f64,
}

impl RunSummary {
    /// Summarise every step after the seed.
    pub fn from_state(state: &SimulationState, band: f64) -> Self {
        let prices = state.series(Series::TokenPrice).get(1..).unwrap_or_default();
        let mut peg = PegTracker::new(band);
        for &p in prices {
            peg.record(p);
        }

        let mean_token_price = if prices.is_empty() {
            PEG
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };
        let min_token_price = prices.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            peg,
            mean_token_price,
            min_token_price: if min_token_price.is_finite() { min_token_price } else { PEG },
            total_redeemed: state.series(Series::RedeemedAmount).iter().sum(),
            peak_base_fee: state
                .series(Series::BaseFee)
                .iter()
                .copied()
                .fold(0.0, f64::max),
        }
    }
}
