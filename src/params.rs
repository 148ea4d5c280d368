// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite - Model Parameters

//! Immutable parameter bundle read by every step update.
//!
//! A [`ModelParams`] is built once per run and validated before the first
//! step. The driver never mutates it; a new run needs a new instance.

use serde::{Deserialize, Serialize};

/// Upper bound of the decay multiplier range (exclusive).
const DECAY_MAX: f64 = 1.0;
/// Innate token demand used by the reference model.
pub const DEFAULT_INNATE_DEMAND: f64 = 100.0;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Rejections raised while validating a [`ModelParams`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("clearing price undefined: demand_price_weight + issuance_price_weight = {sum}")]
    DegenerateClearing { sum: f64 },
}

// ---------------------------------------------------------------------------
// RedemptionCap
// ---------------------------------------------------------------------------

/// How the per-step redemption bound is combined with the uncapped amount.
///
/// `Floor` reproduces the reference model, which takes `max(raw, cap)` and so
/// never lets redemptions fall below the bound once any redemption pressure
/// exists. `Ceiling` takes `min(raw, cap)` and must be requested explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionCap {
    #[default]
    Floor,
    Ceiling,
}

impl RedemptionCap {
    pub fn apply(&self, raw: f64, max_redeemable: f64) -> f64 {
        match self {
            Self::Floor => raw.max(max_redeemable),
            Self::Ceiling => raw.min(max_redeemable),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelParams
// ---------------------------------------------------------------------------

/// Sensitivities and policy knobs for the peg model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// D: multiplier applied to the prior base fee each step, in (0, 1).
    pub base_fee_decay: f64,
    /// A: demand sensitivity to token price change.
    pub demand_price_weight: f64,
    /// B: demand sensitivity to collateral momentum.
    pub demand_momentum_weight: f64,
    /// T: issuance sensitivity to token price deviation from the peg.
    pub issuance_price_weight: f64,
    /// F: issuance sensitivity to collateral momentum.
    pub issuance_momentum_weight: f64,
    /// Steps back used for momentum; 0 disables momentum.
    pub lookback: usize,
    /// Fraction of last supply redeemable in one step, in [0, 1].
    pub max_redemption_fraction: f64,
    pub redemption_cap: RedemptionCap,
    /// Value returned by the innate demand hook each step.
    pub innate_demand: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            base_fee_decay: 0.1,
            demand_price_weight: 1.5,
            demand_momentum_weight: 1.5,
            issuance_price_weight: 5.0,
            issuance_momentum_weight: 5.0,
            lookback: 5,
            max_redemption_fraction: 0.5,
            redemption_cap: RedemptionCap::Floor,
            innate_demand: DEFAULT_INNATE_DEMAND,
        }
    }
}

impl ModelParams {
    /// Reference parameters with momentum switched off.
    pub fn without_momentum() -> Self {
        Self { lookback: 0, ..Self::default() }
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ParamError> {
        let d = self.base_fee_decay;
        if !d.is_finite() || d <= 0.0 || d >= DECAY_MAX {
            return Err(ParamError::InvalidParameter {
                name: "base_fee_decay",
                value: d,
                reason: "must lie in (0, 1)",
            });
        }

        for (name, value) in [
            ("demand_price_weight", self.demand_price_weight),
            ("demand_momentum_weight", self.demand_momentum_weight),
            ("issuance_price_weight", self.issuance_price_weight),
            ("issuance_momentum_weight", self.issuance_momentum_weight),
            ("innate_demand", self.innate_demand),
        ] {
            if !value.is_finite() {
                return Err(ParamError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        let fraction = self.max_redemption_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ParamError::InvalidParameter {
                name: "max_redemption_fraction",
                value: fraction,
                reason: "must lie in [0, 1]",
            });
        }

        let sum = self.demand_price_weight + self.issuance_price_weight;
        if sum == 0.0 {
            return Err(ParamError::DegenerateClearing { sum });
        }
        Ok(())
    }

    /// `-1 / (A + T)`, the scale of the one-step clearing equation.
    pub fn clearing_factor(&self) -> f64 {
        -1.0 / (self.demand_price_weight + self.issuance_price_weight)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_reference_model() {
        let p = ModelParams::default();
        assert_eq!(p.base_fee_decay, 0.1);
        assert_eq!(p.demand_price_weight, 1.5);
        assert_eq!(p.demand_momentum_weight, 1.5);
        assert_eq!(p.issuance_price_weight, 5.0);
        assert_eq!(p.issuance_momentum_weight, 5.0);
        assert_eq!(p.lookback, 5);
        assert_eq!(p.max_redemption_fraction, 0.5);
        assert_eq!(p.redemption_cap, RedemptionCap::Floor);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn decay_outside_open_interval_rejected() {
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let p = ModelParams { base_fee_decay: bad, ..ModelParams::default() };
            assert!(
                matches!(
                    p.validate(),
                    Err(ParamError::InvalidParameter { name: "base_fee_decay", .. })
                ),
                "decay {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn redemption_fraction_bounds() {
        let edge_low = ModelParams { max_redemption_fraction: 0.0, ..ModelParams::default() };
        let edge_high = ModelParams { max_redemption_fraction: 1.0, ..ModelParams::default() };
        assert!(edge_low.validate().is_ok());
        assert!(edge_high.validate().is_ok());

        let over = ModelParams { max_redemption_fraction: 1.01, ..ModelParams::default() };
        let err = over.validate().expect_err("test: 1.01 must be rejected");
        assert!(err.to_string().contains("max_redemption_fraction"));
    }

    #[test]
    fn cancelling_price_weights_rejected() {
        let p = ModelParams {
            demand_price_weight: 2.0,
            issuance_price_weight: -2.0,
            ..ModelParams::default()
        };
        assert_eq!(p.validate(), Err(ParamError::DegenerateClearing { sum: 0.0 }));
    }

    #[test]
    fn non_finite_weight_rejected() {
        let p = ModelParams { issuance_momentum_weight: f64::INFINITY, ..ModelParams::default() };
        assert!(matches!(
            p.validate(),
            Err(ParamError::InvalidParameter { name: "issuance_momentum_weight", .. })
        ));
    }

    #[test]
    fn clearing_factor_default() {
        let p = ModelParams::default();
        assert!((p.clearing_factor() + 1.0 / 6.5).abs() < 1e-15);
    }

    #[test]
    fn redemption_cap_modes() {
        assert_eq!(RedemptionCap::Floor.apply(2.5, 50.0), 50.0);
        assert_eq!(RedemptionCap::Ceiling.apply(2.5, 50.0), 2.5);
        assert_eq!(RedemptionCap::Floor.apply(80.0, 50.0), 80.0);
        assert_eq!(RedemptionCap::Ceiling.apply(80.0, 50.0), 50.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let p: ModelParams = toml::from_str("lookback = 0\nredemption_cap = \"ceiling\"")
            .expect("test: partial params should parse");
        assert_eq!(p.lookback, 0);
        assert_eq!(p.redemption_cap, RedemptionCap::Ceiling);
        assert_eq!(p.base_fee_decay, 0.1);
    }
}
