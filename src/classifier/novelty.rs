//! Novelty classifier
//!
//! A learner engages with a resource that is neither too easy nor too hard for them:
//! engagement is modelled as a draw between learner skill and content depth. A
//! non-engagement is a win when the learner is ahead of the content (too easy) and a
//! loss when behind (too hard).
//!
//! `predict_proba` aggregates the per-topic log-odds of the match quality, the draw
//! likelihood relative to a perfectly known, equally skilled pair. A fresh learner
//! scores low everywhere; engagement at a matching depth sharpens the belief and
//! pushes the score toward 1.

use crate::error::Result;
use crate::gaussian::logit;
use crate::knowledge::{GaussianComponent, KnowledgeComponent, TopicKey};
use crate::trueskill::Outcome;
use crate::types::{EventModel, LearnerModel};

use super::base::BayesianCore;
use super::config::ClassifierConfig;
use super::Classifier;

#[derive(Clone, Debug)]
pub struct NoveltyClassifier<K: TopicKey = String, C: KnowledgeComponent = GaussianComponent> {
    core: BayesianCore<K, C>,
}

impl<K: TopicKey, C: KnowledgeComponent> Default for NoveltyClassifier<K, C> {
    fn default() -> Self {
        Self {
            core: BayesianCore::with_defaults(),
        }
    }
}

impl<K: TopicKey, C: KnowledgeComponent> NoveltyClassifier<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Result<Self> {
        Self::with_learner(LearnerModel::new(), config)
    }

    pub fn with_learner(learner: LearnerModel<K, C>, config: ClassifierConfig) -> Result<Self> {
        Ok(Self {
            core: BayesianCore::new(learner, config)?,
        })
    }

    pub fn learner_model(&self) -> &LearnerModel<K, C> {
        &self.core.learner
    }

    pub fn into_learner_model(self) -> LearnerModel<K, C> {
        self.core.learner
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.core.config
    }
}

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for NoveltyClassifier<K, C> {
    fn fit(&mut self, event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self> {
        self.core.fit_topics(event, engaged, |_, learner, content| {
            if engaged {
                Some(Outcome::Draw)
            } else if learner.mean > content.mean {
                Some(Outcome::Win)
            } else {
                Some(Outcome::Loss)
            }
        })?;
        Ok(self)
    }

    fn predict_proba(&self, event: &EventModel<K, C>) -> f64 {
        self.core.aggregate(event, |model, learner, content| {
            logit(model.match_quality(learner, content))
        })
    }

    fn threshold(&self) -> f64 {
        self.core.config.threshold
    }
}
