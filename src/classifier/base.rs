//! Shared per-topic machinery of the Bayesian classifiers
//!
//! Fit pipeline for every topic of an event:
//! 1. look up the learner component, seeding it from the content component when unseen
//! 2. inflate its variance by the decay strategy for the elapsed time
//! 3. apply the pairwise update for the outcome chosen by the classifier
//! 4. write mean, variance and timestamp back
//!
//! Every updated component is built and validated before anything is written, so a
//! failing fit leaves the learner untouched.

use tracing::{debug, warn};

use crate::error::{KnowledgeTraceError, Result};
use crate::gaussian::logistic;
use crate::knowledge::{ComponentUpdate, KnowledgeComponent, TopicKey};
use crate::trueskill::{Belief, Outcome, PairwiseModel};
use crate::types::{EventModel, LearnerModel, EPSILON};

use super::config::{Aggregation, ClassifierConfig};

/// Learner state plus validated configuration
#[derive(Clone, Debug)]
pub(crate) struct BayesianCore<K: TopicKey, C: KnowledgeComponent> {
    pub(crate) learner: LearnerModel<K, C>,
    pub(crate) config: ClassifierConfig,
    pub(crate) pairwise: PairwiseModel,
}

impl<K: TopicKey, C: KnowledgeComponent> BayesianCore<K, C> {
    pub(crate) fn new(learner: LearnerModel<K, C>, config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let pairwise = PairwiseModel::new(&config.pairwise())?;
        Ok(Self {
            learner,
            config,
            pairwise,
        })
    }

    /// Default configuration, which is always valid
    pub(crate) fn with_defaults() -> Self {
        Self {
            learner: LearnerModel::new(),
            config: ClassifierConfig::default(),
            pairwise: PairwiseModel::default(),
        }
    }

    fn prior(&self) -> Belief {
        Belief::new(self.config.init_skill, self.config.init_variance)
    }

    /// Learner belief for `topic` as of `event_time`, decayed but not stored
    fn current_belief(&self, topic: &K, event_time: Option<f64>) -> Belief {
        match self.learner.knowledge.get(topic) {
            None => self.prior(),
            Some(kc) => {
                let elapsed = match (event_time, kc.timestamp()) {
                    (Some(now), Some(last)) => now - last,
                    _ => 0.0,
                };
                Belief::new(kc.mean(), self.config.decay.apply(kc.variance(), elapsed))
            }
        }
    }

    /// Run the fit pipeline over every topic of `event`
    ///
    /// `choose` picks the outcome from the decayed learner belief and the content
    /// belief; `None` skips the topic.
    pub(crate) fn fit_topics<F>(
        &mut self,
        event: &EventModel<K, C>,
        engaged: bool,
        choose: F,
    ) -> Result<()>
    where
        F: Fn(&PairwiseModel, Belief, Belief) -> Option<Outcome>,
    {
        let event_time = event.event_time;
        let mut staged: Vec<(K, C)> = Vec::with_capacity(event.knowledge.len());

        for (topic, content_kc) in event.knowledge.iter() {
            let existing = self.learner.knowledge.get(topic);

            let mut timestamp = event_time;
            if let (Some(now), Some(last)) = (event_time, existing.and_then(|kc| kc.timestamp())) {
                if now < last {
                    if self.config.strict_ordering {
                        warn!(%topic, previous = last, current = now, "out-of-order event rejected");
                        return Err(KnowledgeTraceError::OrderingViolation {
                            topic: topic.to_string(),
                            previous: last,
                            current: now,
                        });
                    }
                    timestamp = Some(last);
                }
            }

            let learner = self.current_belief(topic, event_time);
            let content = Belief::new(content_kc.mean(), content_kc.variance());

            let posterior = match choose(&self.pairwise, learner, content) {
                Some(outcome) => {
                    let posterior = self.pairwise.update(learner, content, outcome)?;
                    debug!(
                        %topic,
                        ?outcome,
                        prior_mean = learner.mean,
                        prior_variance = learner.variance,
                        posterior_mean = posterior.mean,
                        posterior_variance = posterior.variance,
                        "topic updated"
                    );
                    posterior
                }
                None => continue,
            };

            let mut kc = match existing {
                Some(kc) => kc.clone(),
                None => {
                    let prior = self.prior();
                    debug!(%topic, mean = prior.mean, variance = prior.variance, "seeding unseen topic");
                    content_kc.clone_with(prior.mean, prior.variance, None)?
                }
            };
            let mut update = ComponentUpdate::new()
                .mean(posterior.mean)
                .variance(posterior.variance);
            if let Some(ts) = timestamp {
                update = update.timestamp(ts);
            }
            kc.update(update)?;

            staged.push((topic.clone(), kc));
        }

        for (topic, kc) in staged {
            self.learner.knowledge.set(topic, kc);
        }

        self.learner.record_label(engaged);
        Ok(())
    }

    /// Aggregate per-topic log-odds scores and map them to a probability
    ///
    /// Events without topics give the neutral 0.5.
    pub(crate) fn aggregate<F>(&self, event: &EventModel<K, C>, score: F) -> f64
    where
        F: Fn(&PairwiseModel, Belief, Belief) -> f64,
    {
        if event.knowledge.is_empty() {
            return 0.5;
        }

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut plain = 0.0;

        for (topic, content_kc) in event.knowledge.iter() {
            let learner = self.current_belief(topic, event.event_time);
            let content = Belief::new(content_kc.mean(), content_kc.variance());
            let s = score(&self.pairwise, learner, content);
            let weight = match self.config.aggregation {
                Aggregation::Uniform => 1.0,
                Aggregation::ContentWeighted => content_kc.weight(),
                Aggregation::PrecisionWeighted => {
                    1.0 / self.pairwise.combined_variance(learner, content)
                }
            };
            weighted += weight * s;
            total_weight += weight;
            plain += s;
        }

        let combined = if total_weight > EPSILON {
            weighted / total_weight
        } else {
            // all weights zero: fall back to the plain mean
            plain / event.knowledge.len() as f64
        };
        logistic(combined)
    }
}
