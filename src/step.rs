// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite - Step Update

//! Per-step economic update.
//!
//! Every function here is pure: it reads the history recorded so far plus
//! the parameters and returns one new value. The driver calls them in a
//! fixed order because later quantities consume earlier ones from the same
//! step:
//!
//! ```text
//! price feed -> momentum -> redemption -> base fee -> innate demand
//!            -> clearing price -> demand, issuance -> supply
//! ```

use crate::params::ModelParams;
use crate::state::SimulationState;

/// Hard ceiling on the market-clearing token price.
pub const MAX_TOKEN_PRICE: f64 = 1.1;
/// Target token price.
pub const PEG: f64 = 1.0;

/// Relative change of the collateral price against the price `lookback`
/// steps back. Returns 0 when momentum is disabled.
pub fn momentum(history: &[f64], params: &ModelParams, new_price: f64) -> f64 {
    if params.lookback == 0 {
        return 0.0;
    }
    let Some(past) = reference_price(history, params.lookback) else {
        return 0.0;
    };
    (new_price - past) / past
}

/// Price at `len - lookback - 1`, or the earliest price when the lookback
/// exceeds the history. A lookback equal to the history length wraps to the
/// latest price. A zero reference is replaced by 1.
pub fn reference_price(history: &[f64], lookback: usize) -> Option<f64> {
    let n = history.len();
    let past = if lookback > n {
        *history.first()?
    } else if lookback == n {
        *history.last()?
    } else {
        history[n - lookback - 1]
    };
    Some(if past == 0.0 { 1.0 } else { past })
}

/// Tokens redeemed this step.
///
/// Redemption pressure is half the supply scaled by how far price plus fee
/// sit below the peg. Under [`RedemptionCap::Floor`](crate::RedemptionCap)
/// any non-negative pressure redeems at least `supply * max_fraction`.
pub fn redeemed_amount(state: &SimulationState, params: &ModelParams) -> f64 {
    let supply = state.last_supply();
    let max_redeemable = supply * params.max_redemption_fraction;
    if max_redeemable == 0.0 {
        return 0.0;
    }

    let raw = (1.0 - state.last_price() - state.last_base_fee()) * supply / 2.0;
    if raw < 0.0 {
        return 0.0;
    }
    params.redemption_cap.apply(raw, max_redeemable)
}

/// Decayed prior fee plus this step's redemptions relative to supply.
pub fn base_fee(state: &SimulationState, params: &ModelParams, redeemed: f64) -> f64 {
    let supply = state.last_supply();
    if supply == 0.0 {
        return 0.0;
    }
    state.last_base_fee() * params.base_fee_decay + (redeemed / (2.0 * supply))
}

/// Innate component of demand for holding the token. Constant for now;
/// `step` is the index of the step being computed.
pub fn innate_token_demand(params: &ModelParams, _step: u64) -> f64 {
    params.innate_demand
}

/// Market-clearing token price, clamped to `[0, MAX_TOKEN_PRICE]`.
///
/// Solves issuance = demand for one step using the innate demand already
/// set on `state`. An earlier form substituted last step's realised demand
/// and `(A + T) * last_price` for the innate demand and `A * last_price + T`
/// terms; it is not used.
pub fn token_price(
    state: &SimulationState,
    params: &ModelParams,
    redeemed: f64,
    momentum: f64,
) -> f64 {
    let a = params.demand_price_weight;
    let t = params.issuance_price_weight;
    let b = params.demand_momentum_weight;
    let f = params.issuance_momentum_weight;

    let price = (state.last_issuance()
        - state.innate_token_demand()
        - (a * state.last_price())
        - t
        + ((b + f) * momentum)
        - redeemed)
        * params.clearing_factor();

    // NaN falls through unclamped so the driver can reject it.
    if price < 0.0 {
        0.0
    } else if price > MAX_TOKEN_PRICE {
        MAX_TOKEN_PRICE
    } else {
        price
    }
}

pub fn token_demand(
    state: &SimulationState,
    params: &ModelParams,
    token_price: f64,
    momentum: f64,
) -> f64 {
    let demand = state.innate_token_demand()
        - params.demand_price_weight * (token_price - state.last_price())
        - params.demand_momentum_weight * momentum;
    floor_at_zero(demand)
}

pub fn trove_issuance(
    state: &SimulationState,
    params: &ModelParams,
    token_price: f64,
    momentum: f64,
) -> f64 {
    let issuance = state.last_issuance()
        + params.issuance_price_weight * (token_price - PEG)
        + params.issuance_momentum_weight * momentum;
    floor_at_zero(issuance)
}

pub fn token_supply(issuance: f64, redeemed: f64) -> f64 {
    floor_at_zero(issuance - redeemed)
}

fn floor_at_zero(v: f64) -> f64 {
    if v < 0.0 {
        0.0
    } else {
        v
    }
}

// ===========================================================================
// Tests
// ===========================================================================
