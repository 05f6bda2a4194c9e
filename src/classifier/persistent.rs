//! Last-label baseline

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::knowledge::{KnowledgeComponent, TopicKey};
use crate::types::EventModel;

use super::Classifier;

/// Predicts whatever the learner did with the previous resource
///
/// The event's knowledge is ignored entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentClassifier {
    engage_with_last: bool,
}

impl PersistentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the learner engaged with the last resource
    pub fn engage_with_last(&self) -> bool {
        self.engage_with_last
    }
}

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for PersistentClassifier {
    fn fit(&mut self, _event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self> {
        self.engage_with_last = engaged;
        Ok(self)
    }

    fn predict_proba(&self, _event: &EventModel<K, C>) -> f64 {
        if self.engage_with_last {
            1.0
        } else {
            0.0
        }
    }
}
