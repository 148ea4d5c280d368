// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite - Simulation Core

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

use crate::config::RunConfig;
use crate::params::{ModelParams, ParamError};
use crate::price_feed::{FeedError, PriceFeed, PriceFeedConfig};
use crate::state::{Series, SimulationState, StepRecord};
use crate::step;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("numeric fault at step {step}: {quantity} = {value}")]
    NumericFault { step: u64, quantity: Series, value: f64 },

    #[error("run aborted after a numeric fault at step {step}")]
    Aborted { step: u64 },
}

// ─── RunStatus ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Advancing,
    Complete,
    /// A step produced a non-finite value; nothing further is appended.
    Faulted { step: u64 },
}

// ─── SimulationDriver ────────────────────────────────────────────────────────

/// Owns the state for one run and advances it step by step.
#[wasm_bindgen]
pub struct SimulationDriver {
    pub(crate) params: ModelParams,
    pub(crate) feed_config: PriceFeedConfig,
    pub(crate) feed: PriceFeed,
    pub(crate) state: SimulationState,
    pub(crate) horizon: u64,
    pub(crate) status: RunStatus,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl SimulationDriver {
    /// Validate `params` and `feed` and seed a fresh state.
    pub fn new(
        params: ModelParams,
        feed: PriceFeedConfig,
        horizon: u64,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        let live_feed = PriceFeed::from_config(&feed)?;
        Ok(Self {
            params,
            feed_config: feed,
            feed: live_feed,
            state: SimulationState::new(),
            horizon,
            status: if horizon == 0 { RunStatus::Complete } else { RunStatus::Advancing },
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, SimulationError> {
        Self::new(config.params.clone(), config.feed.clone(), config.horizon)
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn feed_config(&self) -> &PriceFeedConfig {
        &self.feed_config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn into_state(self) -> SimulationState {
        self.state
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Steps appended so far, not counting the seed.
    pub fn steps_taken(&self) -> u64 {
        (self.state.len() as u64).saturating_sub(1)
    }

    /// Advance one step. Returns `Ok(None)` once the horizon is reached.
    pub fn step(&mut self) -> Result<Option<StepRecord>, SimulationError> {
        match self.status {
            RunStatus::Complete => return Ok(None),
            RunStatus::Faulted { step } => return Err(SimulationError::Aborted { step }),
            RunStatus::Advancing => {}
        }

        let index = self.steps_taken() + 1;
        let record = self.compute_step(index);

        if let Some((quantity, value)) = record.first_non_finite() {
            warn!(target: "peg.run", step = index, %quantity, value, "numeric fault, run aborted");
            self.status = RunStatus::Faulted { step: index };
            return Err(SimulationError::NumericFault { step: index, quantity, value });
        }

        self.state.push(record);
        debug!(
            target: "peg.step",
            step = index,
            collateral_price = record.collateral_price,
            momentum = record.momentum,
            redeemed = record.redeemed_amount,
            base_fee = record.base_fee,
            token_price = record.token_price,
            token_demand = record.token_demand,
            trove_issuance = record.trove_issuance,
            token_supply = record.token_supply,
            "step advanced"
        );

        if index >= self.horizon {
            self.status = RunStatus::Complete;
            info!(
                target: "peg.run",
                steps = index,
                feed = self.feed_config.kind(),
                final_price = record.token_price,
                final_supply = record.token_supply,
                "run complete"
            );
        }
        Ok(Some(record))
    }

    /// Advance until the horizon is reached.
    pub fn run_to_completion(&mut self) -> Result<&SimulationState, SimulationError> {
        while self.step()?.is_some() {}
        Ok(&self.state)
    }

    /// Run the full horizon and hand back the finished history.
    pub fn run(mut self) -> Result<SimulationState, SimulationError> {
        self.run_to_completion()?;
        Ok(self.state)
    }

    /// Rebuild the feed from its config and reseed the state.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        *self = Self::new(self.params.clone(), self.feed_config.clone(), self.horizon)?;
        Ok(())
    }

    // Order matters: each quantity reads the ones computed before it.
    fn compute_step(&mut self, index: u64) -> StepRecord {
        let params = &self.params;
        let collateral_price = self.feed.next_price(self.state.collateral_prices(), index);

        let momentum = step::momentum(self.state.collateral_prices(), params, collateral_price);
        let redeemed_amount = step::redeemed_amount(&self.state, params);
        let base_fee = step::base_fee(&self.state, params, redeemed_amount);

        self.state
            .set_innate_token_demand(step::innate_token_demand(params, index));

        let token_price = step::token_price(&self.state, params, redeemed_amount, momentum);
        let token_demand = step::token_demand(&self.state, params, token_price, momentum);
        let trove_issuance = step::trove_issuance(&self.state, params, token_price, momentum);
        let token_supply = step::token_supply(trove_issuance, redeemed_amount);

        StepRecord {
            collateral_price,
            momentum,
            base_fee,
            redeemed_amount,
            token_price,
            token_demand,
            trove_issuance,
            token_supply,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_driver(horizon: u64) -> SimulationDriver {
        SimulationDriver::new(ModelParams::without_momentum(), PriceFeedConfig::Constant, horizon)
            .expect("test: valid driver")
    }

    #[test]
    fn test_first_step_values() {
        let mut sim = constant_driver(3);
        let record = sim.step().expect("test: step ok").expect("test: not complete");
        assert_eq!(record.collateral_price, 500.0);
        assert_eq!(record.momentum, 0.0);
        assert_eq!(record.redeemed_amount, 50.0);
        assert_eq!(record.base_fee, 0.25);
        assert_eq!(record.token_price, 1.1);
        assert!((record.token_demand - 99.85).abs() < 1e-12);
        assert_eq!(record.trove_issuance, 100.5);
        assert_eq!(record.token_supply, 50.5);
        assert_eq!(sim.steps_taken(), 1);
        assert_eq!(sim.status(), RunStatus::Advancing);
    }

    #[test]
    fn test_completes_at_horizon() {
        let mut sim = constant_driver(2);
        assert!(sim.step().expect("test: step 1").is_some());
        assert!(sim.step().expect("test: step 2").is_some());
        assert_eq!(sim.status(), RunStatus::Complete);
        assert!(sim.step().expect("test: complete").is_none());
        assert_eq!(sim.state().len(), 3);
    }

    #[test]
    fn test_zero_horizon_is_complete() {
        let sim = constant_driver(0);
        assert_eq!(sim.status(), RunStatus::Complete);
        let state = sim.run().expect("test: run");
        assert_eq!(state, SimulationState::new());
    }

    #[test]
    fn test_invalid_params_rejected_before_first_step() {
        let params = ModelParams { base_fee_decay: 1.0, ..ModelParams::default() };
        let err = SimulationDriver::new(params, PriceFeedConfig::Constant, 10);
        assert!(matches!(err, Err(SimulationError::Params(_))));

        let feed = PriceFeedConfig::Sublinear { steepness: -1.0 };
        let err = SimulationDriver::new(ModelParams::default(), feed, 10);
        assert!(matches!(err, Err(SimulationError::Feed(_))));
    }

    #[test]
    fn test_numeric_fault_aborts_without_partial_step() {
        // Quadratic growth overflows to infinity well before this horizon.
        let feed = PriceFeedConfig::Quadratic { scale: f64::MAX / 4.0 };
        let mut sim = SimulationDriver::new(ModelParams::without_momentum(), feed, 10)
            .expect("test: valid driver");
        let err = sim.run_to_completion().expect_err("test: overflow must fault");
        match err {
            SimulationError::NumericFault { step, quantity, value } => {
                assert_eq!(step, 3);
                assert_eq!(quantity, Series::CollateralPrice);
                assert!(value.is_infinite());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sim.status(), RunStatus::Faulted { step: 3 });
        assert_eq!(sim.state().len(), 3);
        assert!(sim.state().is_aligned());
        assert_eq!(sim.step(), Err(SimulationError::Aborted { step: 3 }));
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut sim = SimulationDriver::new(
            ModelParams::default(),
            PriceFeedConfig::random_walk(11),
            25,
        )
        .expect("test: valid driver");
        let first = sim.run_to_completion().expect("test: run").clone();
        sim.reset().expect("test: reset");
        assert_eq!(sim.steps_taken(), 0);
        let second = sim.run_to_completion().expect("test: rerun");
        assert_eq!(&first, second);
    }
}
