//! Pairwise Bayesian Update
//!
//! TrueSkill-style update of one learner belief against one content belief for a single
//! topic. The learner's latent performance is compared with the content's difficulty
//! draw; the observed outcome truncates the Gaussian of their difference and the
//! learner belief is moment-matched to the truncated posterior.
//!
//! Mathematical formulas:
//! - c² = σ_l² + σ_c² + β²
//! - t = (μ_l - μ_c) / c
//! - Win:  μ' = μ_l + (σ_l²/c)·v(t),   σ'² = σ_l²·(1 - (σ_l²/c²)·w(t))
//! - Loss: μ' = μ_l - (σ_l²/c)·v(-t),  σ'² = σ_l²·(1 - (σ_l²/c²)·w(-t))
//! - Draw: two-sided truncation to `[-ε/c, ε/c]`
//!
//! The posterior variance is floored at a positive constant; this is the only place
//! numeric drift could push a learner variance to zero.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{KnowledgeTraceError, Result};
use crate::gaussian::{cdf, draw_margin, v_draw, v_win, w_draw, w_win};
use crate::sanitize::{ensure_finite, ensure_positive, ensure_variance, floor_variance};
use crate::types::{DEFAULT_BETA, DEFAULT_DRAW_FACTOR, MIN_VARIANCE};

// ==================== Types ====================

/// Observed outcome of a learner/content comparison
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Learner performance exceeded the content draw
    Win,
    /// Content draw exceeded the learner performance
    Loss,
    /// Performances within the draw margin of each other
    Draw,
}

impl Outcome {
    /// Win on engagement, loss otherwise
    pub fn from_engaged(engaged: bool) -> Self {
        if engaged {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

/// Gaussian belief `N(mean, variance)` stripped of any bookkeeping
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub mean: f64,
    pub variance: f64,
}

impl Belief {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self { mean, variance }
    }
}

/// Pairwise update configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseConfig {
    /// Performance noise standard deviation β, must be > 0
    pub beta: f64,
    /// Probability that learner and content performances tie; sets the draw margin ε
    pub draw_probability: f64,
    /// Lower bound for the posterior learner variance
    pub variance_floor: f64,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            draw_probability: DEFAULT_DRAW_FACTOR,
            variance_floor: MIN_VARIANCE,
        }
    }
}

impl PairwiseConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("beta", self.beta)?;
        let p = ensure_finite("draw_probability", self.draw_probability)?;
        if !(0.0..1.0).contains(&p) {
            return Err(KnowledgeTraceError::InvalidParameter(format!(
                "draw_probability must be in [0, 1), got {p}"
            )));
        }
        ensure_positive("variance_floor", self.variance_floor)?;
        Ok(())
    }
}

// ==================== Model ====================

/// Validated pairwise update model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairwiseModel {
    beta: f64,
    draw_margin: f64,
    variance_floor: f64,
}

impl Default for PairwiseModel {
    fn default() -> Self {
        let config = PairwiseConfig::default();
        Self {
            beta: config.beta,
            draw_margin: draw_margin(config.draw_probability, config.beta),
            variance_floor: config.variance_floor,
        }
    }
}

impl PairwiseModel {
    /// Build from a config; fails with `InvalidParameter` when `β <= 0`
    pub fn new(config: &PairwiseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            beta: config.beta,
            draw_margin: draw_margin(config.draw_probability, config.beta),
            variance_floor: config.variance_floor,
        })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Draw margin ε on the performance scale
    pub fn draw_margin(&self) -> f64 {
        self.draw_margin
    }

    pub fn variance_floor(&self) -> f64 {
        self.variance_floor
    }

    /// c² = σ_l² + σ_c² + β²
    pub fn combined_variance(&self, learner: Belief, content: Belief) -> f64 {
        learner.variance + content.variance + self.beta * self.beta
    }

    /// Standardized skill difference t = (μ_l - μ_c) / c
    pub fn standardized_difference(&self, learner: Belief, content: Belief) -> f64 {
        let c = self.combined_variance(learner, content).sqrt();
        (learner.mean - content.mean) / c
    }

    /// Posterior learner belief after observing `outcome`
    ///
    /// Fails with `InvalidParameter` on a negative or non-finite input belief.
    pub fn update(&self, learner: Belief, content: Belief, outcome: Outcome) -> Result<Belief> {
        ensure_finite("mean", learner.mean)?;
        ensure_variance(learner.variance)?;
        ensure_finite("mean", content.mean)?;
        ensure_variance(content.variance)?;

        let c2 = self.combined_variance(learner, content);
        let c = c2.sqrt();
        let t = (learner.mean - content.mean) / c;

        let (v, w) = match outcome {
            Outcome::Win => (v_win(t), w_win(t)),
            Outcome::Loss => (-v_win(-t), w_win(-t)),
            Outcome::Draw => {
                let margin = self.draw_margin / c;
                (v_draw(t, margin), w_draw(t, margin))
            }
        };

        let mean = learner.mean + learner.variance / c * v;
        let raw_variance = learner.variance * (1.0 - learner.variance / c2 * w);
        let variance = floor_variance(raw_variance, self.variance_floor);

        trace!(
            ?outcome,
            t,
            v,
            w,
            prior_mean = learner.mean,
            posterior_mean = mean,
            "pairwise update"
        );

        Ok(Belief { mean, variance })
    }

    /// P(learner performance > content draw) = Φ(t)
    pub fn win_probability(&self, learner: Belief, content: Belief) -> f64 {
        cdf(self.standardized_difference(learner, content))
    }

    /// P(|learner performance - content draw| <= ε)
    pub fn draw_probability(&self, learner: Belief, content: Belief) -> f64 {
        let c = self.combined_variance(learner, content).sqrt();
        let d = learner.mean - content.mean;
        let p = cdf((self.draw_margin - d) / c) - cdf((-self.draw_margin - d) / c);
        p.clamp(0.0, 1.0)
    }

    /// Match quality in (0, 1]: the draw likelihood relative to two perfectly known,
    /// equally skilled players
    ///
    /// q = √(β²/c²) · exp(-(μ_l - μ_c)² / 2c²)
    ///
    /// Reaches 1 only when both beliefs are certain and the means coincide, so it
    /// rises as repeated observations sharpen the learner's belief.
    pub fn match_quality(&self, learner: Belief, content: Belief) -> f64 {
        let c2 = self.combined_variance(learner, content);
        let d = learner.mean - content.mean;
        let q = (self.beta * self.beta / c2).sqrt() * (-d * d / (2.0 * c2)).exp();
        if q.is_nan() {
            0.0
        } else {
            q.clamp(0.0, 1.0)
        }
    }
}
