//! Always-engage baseline

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::knowledge::{KnowledgeComponent, TopicKey};
use crate::types::EventModel;

use super::Classifier;

/// Predicts engagement for every event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngageClassifier;

impl EngageClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for EngageClassifier {
    fn fit(&mut self, _event: &EventModel<K, C>, _engaged: bool) -> Result<&mut Self> {
        Ok(self)
    }

    fn predict_proba(&self, _event: &EventModel<K, C>) -> f64 {
        1.0
    }
}
