//! Majority-label baseline

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::knowledge::{KnowledgeComponent, TopicKey};
use crate::types::EventModel;

use super::Classifier;

/// Predicts the label seen most often so far; ties and cold start favour engagement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorityClassifier {
    engagement: u64,
    non_engagement: u64,
}

impl MajorityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from stored counters (e.g. a persisted `LearnerModel`)
    pub fn from_counts(engagement: u64, non_engagement: u64) -> Self {
        Self {
            engagement,
            non_engagement,
        }
    }

    pub fn engagement(&self) -> u64 {
        self.engagement
    }

    pub fn non_engagement(&self) -> u64 {
        self.non_engagement
    }
}

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for MajorityClassifier {
    fn fit(&mut self, _event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self> {
        if engaged {
            self.engagement += 1;
        } else {
            self.non_engagement += 1;
        }
        Ok(self)
    }

    fn predict_proba(&self, _event: &EventModel<K, C>) -> f64 {
        if self.engagement >= self.non_engagement {
            1.0
        } else {
            0.0
        }
    }
}
