//! Meta-Weight Fusion
//!
//! Combines the novelty and interest probabilities of one event with a bias signal
//! through a per-learner Bayesian logistic regression with independent Gaussian
//! weights.
//!
//! Mathematical formulas:
//! - p = σ(Σ μᵢ·xᵢ)
//! - 1/σᵢ'² = 1/σᵢ² + p·(1 - p)·xᵢ²
//! - μᵢ' = μᵢ + σᵢ'²·(y - p)·xᵢ
//!
//! Weights with larger variance take larger corrections; every update shrinks the
//! variance down to `variance_floor` at most. The output stays strictly inside (0, 1)
//! for any finite weights.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{Classifier, InterestClassifier, NoveltyClassifier};
use crate::error::Result;
use crate::gaussian::logistic;
use crate::knowledge::{GaussianComponent, KnowledgeComponent, TopicKey};
use crate::sanitize::{clamp_probability, ensure_finite, ensure_positive, ensure_probability};
use crate::types::{
    EventModel, LearnerMetaWeights, Weights, DEFAULT_THRESHOLD, DEFAULT_WEIGHT_VARIANCE_FLOOR,
};

/// Constant input paired with the bias weight
pub const BIAS_SIGNAL: f64 = 1.0;

// ==================== Config ====================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Lower bound for every weight variance
    pub variance_floor: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            variance_floor: DEFAULT_WEIGHT_VARIANCE_FLOOR,
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("variance_floor", self.variance_floor)?;
        Ok(())
    }
}

/// Signals for one event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FusionInput {
    pub novelty: f64,
    pub interest: f64,
    pub bias: f64,
}

impl FusionInput {
    pub fn new(novelty: f64, interest: f64) -> Self {
        Self {
            novelty,
            interest,
            bias: BIAS_SIGNAL,
        }
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }
}

// ==================== Fusion ====================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaWeightFusion {
    weights: LearnerMetaWeights,
    config: FusionConfig,
}

impl MetaWeightFusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from stored weights
    pub fn with_weights(weights: LearnerMetaWeights, config: FusionConfig) -> Result<Self> {
        config.validate()?;
        for (name, w) in [
            ("novelty_weights", weights.novelty_weights),
            ("interest_weights", weights.interest_weights),
            ("bias_weights", weights.bias_weights),
        ] {
            ensure_finite(name, w.mean)?;
            ensure_positive(name, w.variance)?;
        }
        Ok(Self { weights, config })
    }

    pub fn weights(&self) -> &LearnerMetaWeights {
        &self.weights
    }

    pub fn into_weights(self) -> LearnerMetaWeights {
        self.weights
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    fn linear(&self, input: &FusionInput) -> f64 {
        self.weights.novelty_weights.mean * input.novelty
            + self.weights.interest_weights.mean * input.interest
            + self.weights.bias_weights.mean * input.bias
    }

    /// Fused engagement probability; inputs are clamped into [0, 1]
    pub fn predict_proba(&self, input: FusionInput) -> f64 {
        let input = FusionInput {
            novelty: clamp_probability(input.novelty),
            interest: clamp_probability(input.interest),
            bias: if input.bias.is_finite() { input.bias } else { BIAS_SIGNAL },
        };
        logistic(self.linear(&input))
    }

    /// Absorb one observed label; returns the prediction made before the update
    pub fn fit(&mut self, input: FusionInput, engaged: bool) -> Result<f64> {
        let novelty = ensure_probability("novelty probability", input.novelty)?;
        let interest = ensure_probability("interest probability", input.interest)?;
        let bias = ensure_finite("bias signal", input.bias)?;

        let p = logistic(self.linear(&input));
        let y = if engaged { 1.0 } else { 0.0 };
        let curvature = p * (1.0 - p);
        let floor = self.config.variance_floor;

        let step = |w: Weights, x: f64| -> Weights {
            let precision = 1.0 / w.variance + curvature * x * x;
            let variance = (1.0 / precision).max(floor);
            Weights {
                mean: w.mean + variance * (y - p) * x,
                variance,
            }
        };

        self.weights = LearnerMetaWeights {
            novelty_weights: step(self.weights.novelty_weights, novelty),
            interest_weights: step(self.weights.interest_weights, interest),
            bias_weights: step(self.weights.bias_weights, bias),
        };

        debug!(
            engaged,
            predicted = p,
            novelty_mean = self.weights.novelty_weights.mean,
            interest_mean = self.weights.interest_weights.mean,
            bias_mean = self.weights.bias_weights.mean,
            "fusion weights updated"
        );

        Ok(p)
    }
}

// ==================== Combined Classifier ====================

/// Novelty + interest + bias, fused per learner
#[derive(Clone, Debug)]
pub struct InkClassifier<K: TopicKey = String, C: KnowledgeComponent = GaussianComponent> {
    novelty: NoveltyClassifier<K, C>,
    interest: InterestClassifier<K, C>,
    fusion: MetaWeightFusion,
    threshold: f64,
}

impl<K: TopicKey, C: KnowledgeComponent> Default for InkClassifier<K, C> {
    fn default() -> Self {
        Self {
            novelty: NoveltyClassifier::new(),
            interest: InterestClassifier::new(),
            fusion: MetaWeightFusion::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl<K: TopicKey, C: KnowledgeComponent> InkClassifier<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        novelty: NoveltyClassifier<K, C>,
        interest: InterestClassifier<K, C>,
        fusion: MetaWeightFusion,
    ) -> Self {
        Self {
            novelty,
            interest,
            fusion,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        self.threshold = ensure_probability("threshold", threshold)?;
        Ok(self)
    }

    pub fn novelty(&self) -> &NoveltyClassifier<K, C> {
        &self.novelty
    }

    pub fn interest(&self) -> &InterestClassifier<K, C> {
        &self.interest
    }

    pub fn fusion(&self) -> &MetaWeightFusion {
        &self.fusion
    }

    pub fn meta_weights(&self) -> &LearnerMetaWeights {
        self.fusion.weights()
    }

    fn signals(&self, event: &EventModel<K, C>) -> FusionInput {
        FusionInput::new(
            self.novelty.predict_proba(event),
            self.interest.predict_proba(event),
        )
    }
}

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for InkClassifier<K, C> {
    /// The fusion learns from the sub-classifiers' pre-fit probabilities. All three
    /// parts are fitted on copies and swapped in together, so a rejected event leaves
    /// the whole learner state untouched.
    fn fit(&mut self, event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self> {
        let signals = self.signals(event);

        let mut novelty = self.novelty.clone();
        let mut interest = self.interest.clone();
        let mut fusion = self.fusion.clone();
        novelty.fit(event, engaged)?;
        interest.fit(event, engaged)?;
        fusion.fit(signals, engaged)?;

        self.novelty = novelty;
        self.interest = interest;
        self.fusion = fusion;
        Ok(self)
    }

    fn predict_proba(&self, event: &EventModel<K, C>) -> f64 {
        self.fusion.predict_proba(self.signals(event))
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;
    use crate::error::KnowledgeTraceError;
    use crate::knowledge::Knowledge;

    fn event(topic: &str, mean: f64, time: f64) -> EventModel {
        let knowledge: Knowledge =
            vec![(topic.to_string(), GaussianComponent::new(mean, 1e-9).unwrap())]
                .into_iter()
                .collect();
        EventModel::new(knowledge, Some(time))
    }

    // ==================== MetaWeightFusion Tests ====================

    #[test]
    fn test_default_prior_is_neutral() {
        let fusion = MetaWeightFusion::new();
        assert_eq!(fusion.predict_proba(FusionInput::new(0.9, 0.1)), 0.5);
    }

    #[test]
    fn test_three_signals_strictly_inside_unit_interval() {
        let fusion = MetaWeightFusion::new();
        let p = fusion.predict_proba(FusionInput::new(0.9, 0.1).with_bias(0.5));
        assert!(p > 0.0 && p < 1.0, "p = {}", p);
    }

    #[test]
    fn test_fit_moves_toward_label() {
        let mut fusion = MetaWeightFusion::new();
        let input = FusionInput::new(0.9, 0.1);
        let before = fusion.predict_proba(input);
        let predicted = fusion.fit(input, true).unwrap();
        assert_eq!(predicted, before);
        assert!(fusion.predict_proba(input) > before);

        let w = fusion.weights();
        assert!(w.novelty_weights.mean > w.interest_weights.mean);
        assert!(w.bias_weights.mean > 0.0);
    }

    #[test]
    fn test_variance_shrinks_to_floor() {
        let config = FusionConfig {
            variance_floor: 1e-2,
        };
        let mut fusion = MetaWeightFusion::with_weights(LearnerMetaWeights::default(), config).unwrap();
        let input = FusionInput::new(1.0, 1.0);
        let mut prev = fusion.weights().bias_weights.variance;
        for i in 0..2_000 {
            fusion.fit(input, i % 2 == 0).unwrap();
            let v = fusion.weights().bias_weights.variance;
            assert!(v <= prev, "variance grew at step {}", i);
            assert!(v >= 1e-2);
            prev = v;
        }
        assert!((prev - 1e-2).abs() < 1e-12, "variance = {}", prev);
    }

    #[test]
    fn test_zero_signal_leaves_weight() {
        let mut fusion = MetaWeightFusion::new();
        fusion.fit(FusionInput::new(0.0, 0.7), false).unwrap();
        assert_eq!(fusion.weights().novelty_weights, Weights::default());
        assert!(fusion.weights().interest_weights.mean < 0.0);
    }

    #[test]
    fn test_larger_variance_larger_step() {
        let confident = LearnerMetaWeights {
            novelty_weights: Weights::new(0.0, 0.05),
            ..Default::default()
        };
        let mut a = MetaWeightFusion::new();
        let mut b = MetaWeightFusion::with_weights(confident, FusionConfig::default()).unwrap();
        let input = FusionInput::new(0.8, 0.0);
        a.fit(input, true).unwrap();
        b.fit(input, true).unwrap();
        assert!(a.weights().novelty_weights.mean > b.weights().novelty_weights.mean);
    }

    #[test]
    fn test_extreme_weights_stay_bounded() {
        let weights = LearnerMetaWeights {
            bias_weights: Weights::new(1e6, 0.5),
            ..Default::default()
        };
        let fusion = MetaWeightFusion::with_weights(weights, FusionConfig::default()).unwrap();
        let p = fusion.predict_proba(FusionInput::new(1.0, 1.0));
        assert!(p < 1.0 && p > 0.0);
    }

    #[test]
    fn test_fit_rejects_bad_probability() {
        let mut fusion = MetaWeightFusion::new();
        let err = fusion.fit(FusionInput::new(1.2, 0.5), true).unwrap_err();
        assert!(matches!(err, KnowledgeTraceError::InvalidParameter(_)));
        assert_eq!(fusion.weights(), &LearnerMetaWeights::default());
    }

    #[test]
    fn test_with_weights_validation() {
        let bad = LearnerMetaWeights {
            interest_weights: Weights::new(0.0, 0.0),
            ..Default::default()
        };
        assert!(MetaWeightFusion::with_weights(bad, FusionConfig::default()).is_err());
        let bad_config = FusionConfig {
            variance_floor: 0.0,
        };
        assert!(MetaWeightFusion::with_weights(LearnerMetaWeights::default(), bad_config).is_err());
    }

    // ==================== InkClassifier Tests ====================

    #[test]
    fn test_ink_before_fit_is_neutral() {
        let clf: InkClassifier = InkClassifier::new();
        assert_eq!(clf.predict_proba(&event("T1", 0.0, 0.0)), 0.5);
    }

    #[test]
    fn test_ink_fit_updates_all_parts() {
        let mut clf: InkClassifier = InkClassifier::new();
        clf.fit(&event("T1", 0.0, 1.0), true).unwrap();
        assert_eq!(clf.novelty().learner_model().number_of_engagements, 1);
        assert_eq!(clf.interest().learner_model().number_of_engagements, 1);
        assert_ne!(clf.meta_weights(), &LearnerMetaWeights::default());
    }

    #[test]
    fn test_ink_learns_engaging_learner() {
        let mut clf: InkClassifier = InkClassifier::new();
        for i in 0..30 {
            clf.fit(&event("T1", 0.0, i as f64), true).unwrap();
        }
        let p = clf.predict_proba(&event("T1", 0.0, 31.0));
        assert!(p > 0.5, "p = {}", p);
        assert!(clf.predict(&event("T1", 0.0, 31.0)));
    }

    #[test]
    fn test_ink_rejects_out_of_order_without_touching_fusion() {
        let mut clf: InkClassifier = InkClassifier::new();
        clf.fit(&event("T1", 0.0, 10.0), true).unwrap();
        let weights = *clf.meta_weights();
        assert!(clf.fit(&event("T1", 0.0, 1.0), true).is_err());
        assert_eq!(clf.meta_weights(), &weights);
    }

    #[test]
    fn test_ink_rejected_fit_leaves_every_part_untouched() {
        let lenient = ClassifierConfig {
            strict_ordering: false,
            ..Default::default()
        };
        let mut clf: InkClassifier = InkClassifier::from_parts(
            NoveltyClassifier::with_config(lenient).unwrap(),
            InterestClassifier::new(),
            MetaWeightFusion::new(),
        );
        clf.fit(&event("T1", 0.0, 10.0), true).unwrap();
        let novelty = clf.novelty().learner_model().clone();
        let interest = clf.interest().learner_model().clone();
        let weights = *clf.meta_weights();

        // novelty accepts the stale event, interest rejects it
        let err = clf.fit(&event("T1", 0.0, 5.0), true).unwrap_err();
        assert!(matches!(err, KnowledgeTraceError::OrderingViolation { .. }));
        assert_eq!(clf.novelty().learner_model(), &novelty);
        assert_eq!(clf.interest().learner_model(), &interest);
        assert_eq!(clf.meta_weights(), &weights);
        assert_eq!(clf.novelty().learner_model().number_of_engagements, 1);
    }

    #[test]
    fn test_ink_threshold() {
        assert!(InkClassifier::<String>::new().with_threshold(1.5).is_err());
        let clf: InkClassifier = InkClassifier::new().with_threshold(0.4).unwrap();
        assert!(clf.predict(&event("T1", 0.0, 0.0)));
    }
}
