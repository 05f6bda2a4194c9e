//! Temporal Variance Decay
//!
//! Inflates a learner's topic variance according to the time elapsed since the topic
//! was last updated, modelling forgetting. Applied before every pairwise update.
//!
//! Every strategy satisfies:
//! - zero (or negative) elapsed time is a no-op
//! - the result is never below the input variance
//! - the result is non-decreasing in elapsed time
//!
//! Built-in shapes:
//! - Linear:      σ² + rate·Δt, capped at `max_variance`
//! - Exponential: σ²·e^(rate·Δt), capped at `max_variance`
//! - Saturating:  σ² + (max - σ²)·(1 - 2^(-Δt/half_life))

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{KnowledgeTraceError, Result};
use crate::sanitize::{ensure_finite, ensure_positive};

/// Pluggable variance inflation
///
/// Implementations only need to be monotone in `elapsed`; [`DecayStrategy::apply`]
/// guards the no-op and never-decrease rules around them.
pub trait VarianceDecay: Debug + Send + Sync {
    fn decay(&self, variance: f64, elapsed: f64) -> f64;
}

/// Decay strategy selection
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayStrategy {
    /// No forgetting
    #[default]
    None,
    Linear {
        rate: f64,
        max_variance: f64,
    },
    Exponential {
        rate: f64,
        max_variance: f64,
    },
    Saturating {
        half_life: f64,
        max_variance: f64,
    },
    /// User-supplied curve; not serializable
    #[serde(skip)]
    Custom(Arc<dyn VarianceDecay>),
}

impl DecayStrategy {
    pub fn custom<D: VarianceDecay + 'static>(decay: D) -> Self {
        DecayStrategy::Custom(Arc::new(decay))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DecayStrategy::None)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            DecayStrategy::None | DecayStrategy::Custom(_) => Ok(()),
            DecayStrategy::Linear { rate, max_variance }
            | DecayStrategy::Exponential { rate, max_variance } => {
                let rate = ensure_finite("decay rate", *rate)?;
                if rate < 0.0 {
                    return Err(KnowledgeTraceError::InvalidParameter(format!(
                        "decay rate must be >= 0, got {rate}"
                    )));
                }
                ensure_positive("max_variance", *max_variance)?;
                Ok(())
            }
            DecayStrategy::Saturating {
                half_life,
                max_variance,
            } => {
                ensure_positive("half_life", *half_life)?;
                ensure_positive("max_variance", *max_variance)?;
                Ok(())
            }
        }
    }

    /// Variance after `elapsed` time units without observations
    pub fn apply(&self, variance: f64, elapsed: f64) -> f64 {
        if elapsed.is_nan() || elapsed <= 0.0 {
            return variance;
        }
        let decayed = match self {
            DecayStrategy::None => variance,
            DecayStrategy::Linear { rate, max_variance } => {
                (variance + rate * elapsed).min(*max_variance)
            }
            DecayStrategy::Exponential { rate, max_variance } => {
                (variance * (rate * elapsed).exp()).min(*max_variance)
            }
            DecayStrategy::Saturating {
                half_life,
                max_variance,
            } => {
                if variance >= *max_variance {
                    variance
                } else {
                    let progress = 1.0 - (-elapsed / half_life).exp2();
                    variance + (max_variance - variance) * progress
                }
            }
            DecayStrategy::Custom(decay) => decay.decay(variance, elapsed),
        };
        if decayed.is_nan() {
            return variance;
        }
        decayed.max(variance)
    }
}

impl VarianceDecay for DecayStrategy {
    fn decay(&self, variance: f64, elapsed: f64) -> f64 {
        self.apply(variance, elapsed)
    }
}
