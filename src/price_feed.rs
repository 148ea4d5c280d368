// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Peg Model Simulation Suite - Exogenous Collateral Price Feeds

//! Collateral price paths consumed by the driver.
//!
//! A [`PriceFeedConfig`] is the serializable selection made once per run;
//! [`PriceFeed`] is the live feed built from it, holding the PRNG for the
//! random-walk variant.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};

const DEFAULT_WALK_SCALE: f64 = 5.0;
const DEFAULT_JUMP_THRESHOLD: f64 = 1.5;
const DEFAULT_JUMP_MULTIPLIER: f64 = 20.0;

fn default_walk_scale() -> f64 {
    DEFAULT_WALK_SCALE
}

fn default_jump_threshold() -> f64 {
    DEFAULT_JUMP_THRESHOLD
}

fn default_jump_multiplier() -> f64 {
    DEFAULT_JUMP_MULTIPLIER
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("invalid {feed} feed parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        feed: &'static str,
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

// ---------------------------------------------------------------------------
// PriceFeedConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceFeedConfig {
    /// Repeats the last price.
    Constant,
    /// Normal increments with occasional large jumps, floored at zero.
    RandomWalk {
        #[serde(default)]
        seed: u64,
        #[serde(default = "default_walk_scale")]
        scale: f64,
        #[serde(default = "default_jump_threshold")]
        jump_threshold: f64,
        #[serde(default = "default_jump_multiplier")]
        jump_multiplier: f64,
    },
    LinearIncreasing { gradient: f64 },
    LinearDecreasing { gradient: f64 },
    /// `min + magnitude + magnitude * sin(step)`.
    Oscillating { min: f64, magnitude: f64 },
    /// `scale * step^2`, independent of prior prices.
    Quadratic { scale: f64 },
    /// `last + 1 / (2 * sqrt(steepness * (step + 1)))`.
    Sublinear { steepness: f64 },
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self::Sublinear { steepness: 10.0 }
    }
}

impl PriceFeedConfig {
    pub fn random_walk(seed: u64) -> Self {
        Self::RandomWalk {
            seed,
            scale: DEFAULT_WALK_SCALE,
            jump_threshold: DEFAULT_JUMP_THRESHOLD,
            jump_multiplier: DEFAULT_JUMP_MULTIPLIER,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::RandomWalk { .. } => "random_walk",
            Self::LinearIncreasing { .. } => "linear_increasing",
            Self::LinearDecreasing { .. } => "linear_decreasing",
            Self::Oscillating { .. } => "oscillating",
            Self::Quadratic { .. } => "quadratic",
            Self::Sublinear { .. } => "sublinear",
        }
    }

    /// Whether repeated runs can differ by seed.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Self::RandomWalk { .. })
    }

    /// Same feed with its seed replaced. Deterministic feeds are unchanged.
    pub fn with_seed(&self, new_seed: u64) -> Self {
        match self {
            Self::RandomWalk { scale, jump_threshold, jump_multiplier, .. } => Self::RandomWalk {
                seed: new_seed,
                scale: *scale,
                jump_threshold: *jump_threshold,
                jump_multiplier: *jump_multiplier,
            },
            other => other.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), FeedError> {
        let feed = self.kind();
        let finite = |name: &'static str, value: f64| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(FeedError::InvalidParameter { feed, name, value, reason: "must be finite" })
            }
        };
        match *self {
            Self::Constant => Ok(()),
            Self::RandomWalk { scale, jump_threshold, jump_multiplier, .. } => {
                finite("scale", scale)?;
                finite("jump_threshold", jump_threshold)?;
                finite("jump_multiplier", jump_multiplier)?;
                if scale < 0.0 {
                    return Err(FeedError::InvalidParameter {
                        feed,
                        name: "scale",
                        value: scale,
                        reason: "must be non-negative",
                    });
                }
                Ok(())
            }
            Self::LinearIncreasing { gradient } | Self::LinearDecreasing { gradient } => {
                finite("gradient", gradient)
            }
            Self::Oscillating { min, magnitude } => {
                finite("min", min)?;
                finite("magnitude", magnitude)
            }
            Self::Quadratic { scale } => finite("scale", scale),
            Self::Sublinear { steepness } => {
                finite("steepness", steepness)?;
                if steepness <= 0.0 {
                    return Err(FeedError::InvalidParameter {
                        feed,
                        name: "steepness",
                        value: steepness,
                        reason: "must be positive",
                    });
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PriceFeed
// ---------------------------------------------------------------------------

/// Seeded jump-diffusion state for [`PriceFeed::RandomWalk`].
#[derive(Debug, Clone)]
pub struct RandomWalk {
    rng: ChaCha8Rng,
    increment: Normal<f64>,
    jump_threshold: f64,
    jump_multiplier: f64,
}

impl RandomWalk {
    fn next(&mut self, last: f64) -> f64 {
        // Jump chance is drawn before the increment.
        let chance: f64 = self.rng.sample(StandardNormal);
        let jump = if chance > self.jump_threshold || chance < -self.jump_threshold {
            chance * self.jump_multiplier
        } else {
            0.0
        };
        let price = last + self.increment.sample(&mut self.rng) + jump;
        if price < 0.0 {
            0.0
        } else {
            price
        }
    }
}

/// Live collateral price feed. Exactly one variant is active per run.
#[derive(Debug, Clone)]
pub enum PriceFeed {
    Constant,
    RandomWalk(RandomWalk),
    LinearIncreasing { gradient: f64 },
    LinearDecreasing { gradient: f64 },
    Oscillating { min: f64, magnitude: f64 },
    Quadratic { scale: f64 },
    Sublinear { steepness: f64 },
}

impl PriceFeed {
    pub fn from_config(config: &PriceFeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        let feed = match *config {
            PriceFeedConfig::Constant => Self::Constant,
            PriceFeedConfig::RandomWalk { seed, scale, jump_threshold, jump_multiplier } => {
                let increment = Normal::new(0.0, scale).map_err(|_| FeedError::InvalidParameter {
                    feed: "random_walk",
                    name: "scale",
                    value: scale,
                    reason: "not a valid standard deviation",
                })?;
                Self::RandomWalk(RandomWalk {
                    rng: ChaCha8Rng::seed_from_u64(seed),
                    increment,
                    jump_threshold,
                    jump_multiplier,
                })
            }
            PriceFeedConfig::LinearIncreasing { gradient } => Self::LinearIncreasing { gradient },
            PriceFeedConfig::LinearDecreasing { gradient } => Self::LinearDecreasing { gradient },
            PriceFeedConfig::Oscillating { min, magnitude } => Self::Oscillating { min, magnitude },
            PriceFeedConfig::Quadratic { scale } => Self::Quadratic { scale },
            PriceFeedConfig::Sublinear { steepness } => Self::Sublinear { steepness },
        };
        Ok(feed)
    }

    /// Next exogenous price for step `step` given the prices recorded so far.
    pub fn next_price(&mut self, prior_prices: &[f64], step: u64) -> f64 {
        let last = prior_prices.last().copied().unwrap_or(0.0);
        let i = step as f64;
        match self {
            Self::Constant => last,
            Self::RandomWalk(walk) => walk.next(last),
            Self::LinearIncreasing { gradient } => last + *gradient,
            Self::LinearDecreasing { gradient } => last - *gradient,
            Self::Oscillating { min, magnitude } => *min + *magnitude + *magnitude * i.sin(),
            Self::Quadratic { scale } => *scale * (i * i),
            Self::Sublinear { steepness } => last + 1.0 / (2.0 * (*steepness * (i + 1.0)).sqrt()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
