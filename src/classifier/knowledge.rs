//! Knowledge classifier
//!
//! A learner engages when their skill on the resource's topics exceeds the resource's
//! depth. Engagement is a win for the learner against the content, non-engagement a
//! loss. With `positive_only` (the default) only engagements update the beliefs, since
//! a skipped resource says little about what the learner knows.

use crate::error::Result;
use crate::gaussian::PROBIT_TO_LOGIT;
use crate::knowledge::{GaussianComponent, KnowledgeComponent, TopicKey};
use crate::trueskill::Outcome;
use crate::types::{EventModel, LearnerModel};

use super::base::BayesianCore;
use super::config::ClassifierConfig;
use super::Classifier;

#[derive(Clone, Debug)]
pub struct KnowledgeClassifier<K: TopicKey = String, C: KnowledgeComponent = GaussianComponent> {
    core: BayesianCore<K, C>,
}

impl<K: TopicKey, C: KnowledgeComponent> Default for KnowledgeClassifier<K, C> {
    fn default() -> Self {
        Self {
            core: BayesianCore::with_defaults(),
        }
    }
}

impl<K: TopicKey, C: KnowledgeComponent> KnowledgeClassifier<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Result<Self> {
        Self::with_learner(LearnerModel::new(), config)
    }

    /// Resume from an existing learner state
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

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for KnowledgeClassifier<K, C> {
    fn fit(&mut self, event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self> {
        if !engaged && self.core.config.positive_only {
            self.core.fit_topics(event, engaged, |_, _, _| None)?;
        } else {
            let outcome = Outcome::from_engaged(engaged);
            self.core.fit_topics(event, engaged, |_, _, _| Some(outcome))?;
        }
        Ok(self)
    }

    fn predict_proba(&self, event: &EventModel<K, C>) -> f64 {
        self.core.aggregate(event, |model, learner, content| {
            PROBIT_TO_LOGIT * model.standardized_difference(learner, content)
        })
    }

    fn threshold(&self) -> f64 {
        self.core.config.threshold
    }
}
