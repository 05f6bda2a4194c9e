//! Interest classifier
//!
//! Content components describe how strongly a resource covers each topic; learner
//! components describe how interested the learner is in it. Engagement means the
//! learner's interest beat the coverage draw. Both labels are informative here, so
//! every fit updates the beliefs and `positive_only` is not consulted.

use crate::error::Result;
use crate::gaussian::PROBIT_TO_LOGIT;
use crate::knowledge::{GaussianComponent, KnowledgeComponent, TopicKey};
use crate::trueskill::Outcome;
use crate::types::{EventModel, LearnerModel};

use super::base::BayesianCore;
use super::config::ClassifierConfig;
use super::Classifier;

#[derive(Clone, Debug)]
pub struct InterestClassifier<K: TopicKey = String, C: KnowledgeComponent = GaussianComponent> {
    core: BayesianCore<K, C>,
}

impl<K: TopicKey, C: KnowledgeComponent> Default for InterestClassifier<K, C> {
    fn default() -> Self {
        Self {
            core: BayesianCore::with_defaults(),
        }
    }
}

impl<K: TopicKey, C: KnowledgeComponent> InterestClassifier<K, C> {
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

impl<K: TopicKey, C: KnowledgeComponent> Classifier<K, C> for InterestClassifier<K, C> {
    fn fit(&mut self, event: &EventModel<K, C>, engaged: bool) -> Result<&mut Self> {
        let outcome = Outcome::from_engaged(engaged);
        self.core.fit_topics(event, engaged, |_, _, _| Some(outcome))?;
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
