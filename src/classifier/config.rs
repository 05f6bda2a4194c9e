//! Classifier configuration

use serde::{Deserialize, Serialize};

use crate::decay::DecayStrategy;
use crate::error::{KnowledgeTraceError, Result};
use crate::sanitize::{ensure_finite, ensure_positive, ensure_probability};
use crate::trueskill::PairwiseConfig;
use crate::types::{
    DEFAULT_BETA, DEFAULT_DRAW_FACTOR, DEFAULT_INIT_SKILL, DEFAULT_INIT_VARIANCE,
    DEFAULT_THRESHOLD, MIN_VARIANCE,
};

/// How per-topic scores are combined into one event score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Plain mean over topics
    Uniform,
    /// Weighted by the content component's `weight()` (topic share within the resource)
    ContentWeighted,
    /// Weighted by the inverse combined variance 1/c² of each comparison
    #[default]
    PrecisionWeighted,
}

/// Configuration shared by the Bayesian classifiers
///
/// Missing fields take their defaults when deserialized.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Mean of a freshly seeded learner component
    pub init_skill: f64,
    /// Variance of a freshly seeded learner component
    pub init_variance: f64,
    /// Performance noise standard deviation β
    pub beta: f64,
    /// Only update knowledge on engagement
    pub positive_only: bool,
    /// Tie probability used by the novelty classifier
    pub draw_probability: f64,
    pub decay: DecayStrategy,
    pub aggregation: Aggregation,
    /// `predict` returns true when `predict_proba >= threshold`
    pub threshold: f64,
    /// Reject events older than a topic's last update
    pub strict_ordering: bool,
    /// Lower bound for learner posterior variances
    pub variance_floor: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            init_skill: DEFAULT_INIT_SKILL,
            init_variance: DEFAULT_INIT_VARIANCE,
            beta: DEFAULT_BETA,
            positive_only: true,
            draw_probability: DEFAULT_DRAW_FACTOR,
            decay: DecayStrategy::None,
            aggregation: Aggregation::PrecisionWeighted,
            threshold: DEFAULT_THRESHOLD,
            strict_ordering: true,
            variance_floor: MIN_VARIANCE,
        }
    }
}

impl ClassifierConfig {
    /// Parse a JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("init_skill", self.init_skill)?;
        ensure_positive("init_variance", self.init_variance)?;
        ensure_probability("threshold", self.threshold)?;
        self.pairwise().validate()?;
        if self.variance_floor >= self.init_variance {
            return Err(KnowledgeTraceError::InvalidParameter(format!(
                "variance_floor ({}) must be below init_variance ({})",
                self.variance_floor, self.init_variance
            )));
        }
        self.decay.validate()?;
        Ok(())
    }

    pub fn pairwise(&self) -> PairwiseConfig {
        PairwiseConfig {
            beta: self.beta,
            draw_probability: self.draw_probability,
            variance_floor: self.variance_floor,
        }
    }
}
