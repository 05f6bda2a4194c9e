//! Common Types and Constants
//!
//! Shared records used across all algorithm modules: the event snapshot, the
//! per-learner state and the per-learner fusion weights.

use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::knowledge::{GaussianComponent, Knowledge, TopicKey};

// ==================== Constants ====================

/// Default learner mean for a topic seen for the first time
pub const DEFAULT_INIT_SKILL: f64 = 0.0;

/// Default learner variance for a topic seen for the first time
pub const DEFAULT_INIT_VARIANCE: f64 = 0.5;

/// Default performance noise β (standard deviation, β² must be > 0)
pub const DEFAULT_BETA: f64 = 0.1;

/// Default draw probability factor for novelty
pub const DEFAULT_DRAW_FACTOR: f64 = 0.1;

/// Default decision threshold for `predict`
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default mean of a fusion weight
pub const DEFAULT_WEIGHT_MEAN: f64 = 0.0;

/// Default variance of a fusion weight
pub const DEFAULT_WEIGHT_VARIANCE: f64 = 0.5;

/// Default floor for fusion-weight variances
pub const DEFAULT_WEIGHT_VARIANCE_FLOOR: f64 = 1e-4;

/// Hard lower bound for any learner-side posterior variance
pub const MIN_VARIANCE: f64 = 1e-9;

/// Upper bound for any variance
pub const MAX_VARIANCE: f64 = 1e9;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Event ====================

/// A learning event: the topic composition of a resource and when it happened
///
/// Owned by the caller; classifiers only read it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, C: Serialize",
    deserialize = "K: Deserialize<'de> + Eq + Hash, C: Deserialize<'de>"
))]
pub struct EventModel<K: TopicKey = String, C = GaussianComponent> {
    pub knowledge: Knowledge<K, C>,
    pub event_time: Option<f64>,
}

impl<K: TopicKey, C> Default for EventModel<K, C> {
    fn default() -> Self {
        Self {
            knowledge: Knowledge::new(),
            event_time: None,
        }
    }
}

impl<K: TopicKey, C> EventModel<K, C> {
    pub fn new(knowledge: Knowledge<K, C>, event_time: Option<f64>) -> Self {
        Self {
            knowledge,
            event_time,
        }
    }
}

// ==================== Learner ====================

/// Durable state of one learner, mutated in place by `fit`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, C: Serialize",
    deserialize = "K: Deserialize<'de> + Eq + Hash, C: Deserialize<'de>"
))]
pub struct LearnerModel<K: TopicKey = String, C = GaussianComponent> {
    #[serde(default)]
    pub knowledge: Knowledge<K, C>,
    #[serde(default)]
    pub number_of_engagements: u64,
    #[serde(default)]
    pub number_of_non_engagements: u64,
}

impl<K: TopicKey, C> Default for LearnerModel<K, C> {
    fn default() -> Self {
        Self {
            knowledge: Knowledge::new(),
            number_of_engagements: 0,
            number_of_non_engagements: 0,
        }
    }
}

impl<K: TopicKey, C> LearnerModel<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_knowledge(knowledge: Knowledge<K, C>) -> Self {
        Self {
            knowledge,
            ..Self::default()
        }
    }

    /// Count one observed label
    pub fn record_label(&mut self, engaged: bool) {
        if engaged {
            self.number_of_engagements += 1;
        } else {
            self.number_of_non_engagements += 1;
        }
    }

    pub fn total_events(&self) -> u64 {
        self.number_of_engagements + self.number_of_non_engagements
    }

    /// Share of engaged events, `None` before any label
    pub fn engagement_rate(&self) -> Option<f64> {
        let total = self.total_events();
        if total == 0 {
            None
        } else {
            Some(self.number_of_engagements as f64 / total as f64)
        }
    }
}

// ==================== Fusion Weights ====================

/// Gaussian belief about one fusion weight
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub mean: f64,
    pub variance: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            mean: DEFAULT_WEIGHT_MEAN,
            variance: DEFAULT_WEIGHT_VARIANCE,
        }
    }
}

impl Weights {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self { mean, variance }
    }
}

/// Learner-specific fusion parameters, one independent Gaussian per signal
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerMetaWeights {
    pub novelty_weights: Weights,
    pub interest_weights: Weights,
    pub bias_weights: Weights,
}

// ==================== Diagnostics ====================

/// Health report for a learner's knowledge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub is_healthy: bool,
    pub has_nan: bool,
    pub has_inf: bool,
    pub topic_count: u32,
    pub degenerate_topics: u32,
    pub min_variance: f64,
    pub max_variance: f64,
    pub message: String,
}

// ==================== Tests ====================
