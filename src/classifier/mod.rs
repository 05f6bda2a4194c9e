//! Engagement Classifiers
//!
//! Every classifier honours the same online contract:
//! - `fit(event, engaged)` consumes one labelled event
//! - `predict_proba(event)` returns the engagement probability in [0, 1]
//! - `predict(event)` thresholds `predict_proba`
//!
//! Predicting before any fit uses the configured priors and never fails.
//!
//! Variants:
//! - [`PersistentClassifier`] - repeats the last label
//! - [`EngageClassifier`] - always predicts engagement
//! - [`MajorityClassifier`] - predicts the majority label seen so far
//! - [`KnowledgeClassifier`] - learner skill against content depth
//! - [`InterestClassifier`] - learner interest against topic coverage
//! - [`NoveltyClassifier`] - engagement when content is neither too easy nor too hard

mod base;
mod config;
mod engage;
mod interest;
mod knowledge;
mod majority;
mod novelty;
mod persistent;

use rayon::prelude::*;
use tracing::warn;

use crate::error::{KnowledgeTraceError, Result};
use crate::knowledge::{GaussianComponent, KnowledgeComponent, TopicKey};
use crate::types::{EventModel, DEFAULT_THRESHOLD};

pub use config::{Aggregation, ClassifierConfig};
pub use engage::EngageClassifier;
pub use interest::InterestClassifier;
pub use knowledge::KnowledgeClassifier;
pub use majority::MajorityClassifier;
pub use novelty::NoveltyClassifier;
pub use persistent::PersistentClassifier;

/// Online binary engagement classifier
pub trait Classifier<K: TopicKey = String, C: KnowledgeComponent = GaussianComponent> {
    /// Consume one labelled event
    fn fit(&mut self, event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self>;

    /// Engagement probability in [0, 1]
    fn predict_proba(&self, event: &EventModel<K, C>) -> f64;

    fn threshold(&self) -> f64 {
        DEFAULT_THRESHOLD
    }

    fn predict(&self, event: &EventModel<K, C>) -> bool {
        self.predict_proba(event) >= self.threshold()
    }
}

// ==================== Batch ====================

/// Outcome of fitting one learner's event stream
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFitResult {
    /// Events consumed before the stream ended or failed
    pub fitted: usize,
    pub error: Option<KnowledgeTraceError>,
}

impl BatchFitResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Fit many independent learners in parallel
///
/// Each learner's stream is consumed in order on one thread; a failing event stops
/// that learner's stream only.
pub fn fit_batch<T, K, C>(jobs: &mut [(T, Vec<(EventModel<K, C>, bool)>)]) -> Vec<BatchFitResult>
where
    T: Classifier<K, C> + Send,
    K: TopicKey,
    C: KnowledgeComponent,
{
    jobs.par_iter_mut()
        .map(|(classifier, stream)| {
            let mut fitted = 0;
            for (event, engaged) in stream.iter() {
                if let Err(e) = classifier.fit(event, *engaged) {
                    warn!(error = %e, fitted, "learner stream stopped");
                    return BatchFitResult {
                        fitted,
                        error: Some(e),
                    };
                }
                fitted += 1;
            }
            BatchFitResult {
                fitted,
                error: None,
            }
        })
        .collect()
}
