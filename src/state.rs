// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite - Simulation State

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::params::DEFAULT_INNATE_DEMAND;

// ─── StepRecord ──────────────────────────────────────────────────────────────

/// One step's worth of the eight tracked quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub collateral_price: f64,
    pub momentum: f64,
    pub base_fee: f64,
    pub redeemed_amount: f64,
    pub token_price: f64,
    pub token_demand: f64,
    pub trove_issuance: f64,
    pub token_supply: f64,
}

impl StepRecord {
    /// Seed values at step 0.
    pub const GENESIS: StepRecord = StepRecord {
        collateral_price: 500.0,
        momentum: 0.0,
        base_fee: 0.0,
        redeemed_amount: 0.0,
        token_price: 1.0,
        token_demand: 100.0,
        trove_issuance: 100.0,
        token_supply: 100.0,
    };

    pub fn get(&self, series: Series) -> f64 {
        match series {
            Series::CollateralPrice => self.collateral_price,
            Series::Momentum => self.momentum,
            Series::BaseFee => self.base_fee,
            Series::RedeemedAmount => self.redeemed_amount,
            Series::TokenPrice => self.token_price,
            Series::TokenDemand => self.token_demand,
            Series::TroveIssuance => self.trove_issuance,
            Series::TokenSupply => self.token_supply,
        }
    }

    /// First non-finite quantity, if any.
    pub fn first_non_finite(&self) -> Option<(Series, f64)> {
        Series::ALL
            .iter()
            .map(|&s| (s, self.get(s)))
            .find(|(_, v)| !v.is_finite())
    }
}

impl Default for StepRecord {
    fn default() -> Self {
        Self::GENESIS
    }
}

// ─── Series ──────────────────────────────────────────────────────────────────

/// Names of the tracked sequences, as exposed to reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    CollateralPrice,
    Momentum,
    BaseFee,
    RedeemedAmount,
    TokenPrice,
    TokenDemand,
    TroveIssuance,
    TokenSupply,
}

impl Series {
    pub const ALL: [Series; 8] = [
        Series::CollateralPrice,
        Series::Momentum,
        Series::BaseFee,
        Series::RedeemedAmount,
        Series::TokenPrice,
        Series::TokenDemand,
        Series::TroveIssuance,
        Series::TokenSupply,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CollateralPrice => "collateral_price",
            Self::Momentum => "momentum",
            Self::BaseFee => "base_fee",
            Self::RedeemedAmount => "redeemed_amount",
            Self::TokenPrice => "token_price",
            Self::TokenDemand => "token_demand",
            Self::TroveIssuance => "trove_issuance",
            Self::TokenSupply => "token_supply",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown series `{0}`")]
pub struct UnknownSeries(pub String);

impl FromStr for Series {
    type Err = UnknownSeries;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Series::ALL
            .iter()
            .copied()
            .find(|series| series.name() == s)
            .ok_or_else(|| UnknownSeries(s.to_string()))
    }
}

// ─── SimulationState ─────────────────────────────────────────────────────────

/// Append-only history of every tracked quantity.
///
/// All eight sequences always have the same length; index `i` of each refers
/// to step `i`. Only the driver appends, one full [`StepRecord`] at a time.
/// The state is always seeded with a step-0 row, so it is never empty.
/// Serialize-only: a state can be exported but never rebuilt from raw
/// sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    collateral_price: Vec<f64>,
    momentum: Vec<f64>,
    base_fee: Vec<f64>,
    redeemed_amount: Vec<f64>,
    token_price: Vec<f64>,
    token_demand: Vec<f64>,
    trove_issuance: Vec<f64>,
    token_supply: Vec<f64>,
    /// Current-state value, overwritten each step rather than appended.
    innate_token_demand: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationState {
    /// State seeded with the step-0 values of the reference model.
    pub fn new() -> Self {
        Self::from_seed(StepRecord::GENESIS, DEFAULT_INNATE_DEMAND)
    }

    /// State seeded with an arbitrary step-0 record.
    pub fn from_seed(seed: StepRecord, innate_token_demand: f64) -> Self {
        Self {
            collateral_price: vec![seed.collateral_price],
            momentum: vec![seed.momentum],
            base_fee: vec![seed.base_fee],
            redeemed_amount: vec![seed.redeemed_amount],
            token_price: vec![seed.token_price],
            token_demand: vec![seed.token_demand],
            trove_issuance: vec![seed.trove_issuance],
            token_supply: vec![seed.token_supply],
            innate_token_demand,
        }
    }

    pub(crate) fn push(&mut self, record: StepRecord) {
        self.collateral_price.push(record.collateral_price);
        self.momentum.push(record.momentum);
        self.base_fee.push(record.base_fee);
        self.redeemed_amount.push(record.redeemed_amount);
        self.token_price.push(record.token_price);
        self.token_demand.push(record.token_demand);
        self.trove_issuance.push(record.trove_issuance);
        self.token_supply.push(record.token_supply);
    }

    pub(crate) fn set_innate_token_demand(&mut self, demand: f64) {
        self.innate_token_demand = demand;
    }

    /// Number of recorded steps, including step 0.
    pub fn len(&self) -> usize {
        self.collateral_price.len()
    }

    /// Always false; kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.collateral_price.is_empty()
    }

    fn last_index(&self) -> usize {
        self.len() - 1
    }

    pub fn innate_token_demand(&self) -> f64 {
        self.innate_token_demand
    }

    pub fn series(&self, series: Series) -> &[f64] {
        match series {
            Series::CollateralPrice => &self.collateral_price,
            Series::Momentum => &self.momentum,
            Series::BaseFee => &self.base_fee,
            Series::RedeemedAmount => &self.redeemed_amount,
            Series::TokenPrice => &self.token_price,
            Series::TokenDemand => &self.token_demand,
            Series::TroveIssuance => &self.trove_issuance,
            Series::TokenSupply => &self.token_supply,
        }
    }

    pub fn series_by_name(&self, name: &str) -> Option<&[f64]> {
        name.parse::<Series>().ok().map(|s| self.series(s))
    }

    pub fn collateral_prices(&self) -> &[f64] {
        &self.collateral_price
    }

    /// Row at step `index`.
    pub fn record(&self, index: usize) -> Option<StepRecord> {
        (index < self.len()).then(|| self.row(index))
    }

    fn row(&self, index: usize) -> StepRecord {
        StepRecord {
            collateral_price: self.collateral_price[index],
            momentum: self.momentum[index],
            base_fee: self.base_fee[index],
            redeemed_amount: self.redeemed_amount[index],
            token_price: self.token_price[index],
            token_demand: self.token_demand[index],
            trove_issuance: self.trove_issuance[index],
            token_supply: self.token_supply[index],
        }
    }

    pub fn records(&self) -> impl Iterator<Item = StepRecord> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// Most recent row; the seed row before the first step.
    pub fn last_record(&self) -> StepRecord {
        self.row(self.last_index())
    }

    /// Whether every sequence has the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.len();
        Series::ALL.iter().all(|&s| self.series(s).len() == n)
    }

    // Last-value accessors used by the step update.

    pub(crate) fn last_price(&self) -> f64 {
        self.token_price[self.last_index()]
    }

    pub(crate) fn last_base_fee(&self) -> f64 {
        self.base_fee[self.last_index()]
    }

    pub(crate) fn last_supply(&self) -> f64 {
        self.token_supply[self.last_index()]
    }

    pub(crate) fn last_issuance(&self) -> f64 {
        self.trove_issuance[self.last_index()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_seeded() {
        let state = SimulationState::new();
        assert_eq!(state.len(), 1);
        assert!(state.is_aligned());
        assert_eq!(state.last_record(), StepRecord::GENESIS);
        assert_eq!(state.innate_token_demand(), 100.0);
        assert_eq!(state.series(Series::CollateralPrice), &[500.0]);
        assert_eq!(state.series(Series::TokenPrice), &[1.0]);
        assert_eq!(state.series(Series::TokenSupply), &[100.0]);
    }

    #[test]
    fn test_push_keeps_series_aligned() {
        let mut state = SimulationState::new();
        let record = StepRecord { collateral_price: 510.0, token_price: 0.98, ..StepRecord::GENESIS };
        state.push(record);
        state.push(record);
        assert_eq!(state.len(), 3);
        assert!(state.is_aligned());
        assert_eq!(state.record(2), Some(record));
        assert_eq!(state.records().count(), 3);
        assert!(state.record(3).is_none());
    }

    #[test]
    fn test_last_values_follow_latest_row() {
        let mut state = SimulationState::new();
        assert_eq!(state.last_price(), 1.0);
        assert_eq!(state.last_supply(), 100.0);

        let record = StepRecord {
            base_fee: 0.25,
            token_price: 1.1,
            trove_issuance: 100.5,
            token_supply: 50.5,
            ..StepRecord::GENESIS
        };
        state.push(record);
        assert_eq!(state.last_record(), record);
        assert_eq!(state.last_price(), 1.1);
        assert_eq!(state.last_base_fee(), 0.25);
        assert_eq!(state.last_issuance(), 100.5);
        assert_eq!(state.last_supply(), 50.5);
    }

    #[test]
    fn test_series_lookup_by_name() {
        let state = SimulationState::new();
        for series in Series::ALL {
            let by_name = state
                .series_by_name(series.name())
                .expect("test: every series name resolves");
            assert_eq!(by_name, state.series(series));
        }
        assert!(state.series_by_name("bnb_price").is_none());
    }

    #[test]
    fn test_series_parse_error_names_input() {
        let err = "volume".parse::<Series>().expect_err("test: unknown name");
        assert_eq!(err.to_string(), "unknown series `volume`");
    }

    #[test]
    fn test_first_non_finite() {
        assert!(StepRecord::GENESIS.first_non_finite().is_none());
        let bad = StepRecord { base_fee: f64::NAN, ..StepRecord::GENESIS };
        let (series, value) = bad.first_non_finite().expect("test: NaN detected");
        assert_eq!(series, Series::BaseFee);
        assert!(value.is_nan());
    }

    #[test]
    fn test_state_serializes_with_series_names() {
        let mut state = SimulationState::new();
        state.push(StepRecord::GENESIS);
        let json = serde_json::to_value(&state).expect("test: serialize");
        for series in Series::ALL {
            assert_eq!(json[series.name()].as_array().map(Vec::len), Some(2), "{}", series);
        }
        assert_eq!(json["innate_token_demand"], 100.0);
    }
}
