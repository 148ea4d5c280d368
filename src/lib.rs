// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite

pub mod params;
pub mod state;
pub mod price_feed;
pub mod step;
pub mod simulation;
pub mod config;

pub use config::{ConfigError, RunConfig};
pub use params::{ModelParams, ParamError, RedemptionCap};
pub use price_feed::{FeedError, PriceFeed, PriceFeedConfig};
pub use simulation::{RunStatus, SimulationDriver, SimulationError};
pub use state::{Series, SimulationState, StepRecord};

use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl SimulationDriver {
    /// Build a driver from a JSON-encoded [`RunConfig`].
    #[wasm_bindgen(constructor)]
    pub fn from_json(config_json: &str) -> Result<SimulationDriver, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = RunConfig::from_json_str(config_json).map_err(to_js_error)?;
        SimulationDriver::from_config(&config).map_err(to_js_error)
    }

    /// Advance one step; returns the appended record, or `null` once complete.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        match self.step().map_err(to_js_error)? {
            Some(record) => serde_wasm_bindgen::to_value(&record).map_err(to_js_error),
            None => Ok(JsValue::NULL),
        }
    }

    /// Run up to `steps` steps without returning intermediate records.
    pub fn run_batch(&mut self, steps: u32) -> Result<(), JsValue> {
        for _ in 0..steps {
            if self.step().map_err(to_js_error)?.is_none() {
                break;
            }
        }
        Ok(())
    }

    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.state).unwrap_or(JsValue::NULL)
    }

    pub fn get_series(&self, name: &str) -> Option<Vec<f64>> {
        self.state.series_by_name(name).map(<[f64]>::to_vec)
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    pub fn steps_completed(&self) -> u32 {
        self.steps_taken().min(u32::MAX as u64) as u32
    }

    /// Reset to the seed state with the same configuration.
    #[wasm_bindgen(js_name = reset)]
    pub fn restart(&mut self) -> Result<(), JsValue> {
        self.reset().map_err(to_js_error)
    }
}
