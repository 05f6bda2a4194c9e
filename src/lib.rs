//! # knowledge-tracing - Bayesian learner engagement modelling
//!
//! Online, per-learner Bayesian models that predict whether a learner will engage
//! with a learning resource:
//!
//! - **Pairwise update** - TrueSkill-style Gaussian update of a learner's topic belief
//!   against a resource's topic depth
//! - **Variance decay** - forgetting modelled as variance growth between observations
//! - **Classifiers** - knowledge, interest and novelty models plus simple baselines
//! - **Meta-weight fusion** - per-learner Bayesian logistic regression over the
//!   sub-classifier probabilities
//!
//! ## Design
//!
//! - Each learner's stream is processed sequentially; learners are independent and
//!   can be fitted in parallel ([`fit_batch`])
//! - Learner-side variances never reach zero
//! - Predicting before any fit uses the configured priors and never fails
//!
//! ## Modules
//!
//! - [`knowledge`] - knowledge components and the topic → component container
//! - [`trueskill`] - pairwise win / loss / draw update
//! - [`decay`] - variance decay strategies
//! - [`classifier`] - classifier contract and implementations
//! - [`fusion`] - meta-weight fusion and the combined classifier
//! - [`gaussian`] - normal distribution helpers and the logistic link
//! - [`sanitize`] - numeric validation and diagnostics
//! - [`types`] - shared records and constants
//!
//! ## Example
//!
//! ```rust
//! use knowledge_tracing::{Classifier, EventModel, GaussianComponent, Knowledge, KnowledgeClassifier};
//!
//! let mut classifier: KnowledgeClassifier = KnowledgeClassifier::new();
//!
//! let mut knowledge = Knowledge::new();
//! knowledge.set("algebra".to_string(), GaussianComponent::new(0.0, 1e-9)?);
//! let event = EventModel::new(knowledge, Some(1_700_000_000.0));
//!
//! classifier.fit(&event, true)?;
//! assert!(classifier.predict_proba(&event) > 0.5);
//! # Ok::<(), knowledge_tracing::KnowledgeTraceError>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod classifier;
pub mod decay;
pub mod error;
pub mod fusion;
pub mod gaussian;
pub mod knowledge;
pub mod sanitize;
pub mod trueskill;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use error::{KnowledgeTraceError, Result};

pub use knowledge::{
    ComponentUpdate, ExportFormat, Exported, GaussianComponent, HistoryAwareComponent,
    HistoryEntry, Knowledge, KnowledgeComponent, RankedComponent, TopicKey,
};

pub use trueskill::{Belief, Outcome, PairwiseConfig, PairwiseModel};

pub use decay::{DecayStrategy, VarianceDecay};

pub use classifier::{
    fit_batch, Aggregation, BatchFitResult, Classifier, ClassifierConfig, EngageClassifier,
    InterestClassifier, KnowledgeClassifier, MajorityClassifier, NoveltyClassifier,
    PersistentClassifier,
};

pub use fusion::{FusionConfig, FusionInput, InkClassifier, MetaWeightFusion};
