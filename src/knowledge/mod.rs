//! Knowledge Representation
//!
//! [`Knowledge`] maps topic identifiers to exactly one knowledge component each.
//! It is the full multi-topic belief state of a learner, or the topic composition
//! of a learning resource.
//!
//! `get` on an unknown topic returns `None` rather than a default component, so callers
//! can tell "never seen" apart from "seen with the default belief".

mod component;

use std::collections::hash_map::{self, HashMap};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub use component::{
    ComponentUpdate, ExportFormat, Exported, GaussianComponent, HistoryAwareComponent,
    HistoryEntry, KnowledgeComponent, RankedComponent,
};

/// Bound for topic identifiers: any hashable, comparable, printable key
pub trait TopicKey: Eq + Hash + Clone + Debug + Display + Send + Sync {}

impl<T: Eq + Hash + Clone + Debug + Display + Send + Sync> TopicKey for T {}

/// Topic → knowledge component mapping
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize, C: Serialize",
    deserialize = "K: Deserialize<'de> + Eq + Hash, C: Deserialize<'de>"
))]
pub struct Knowledge<K = String, C = GaussianComponent> {
    components: HashMap<K, C>,
}

impl<K: TopicKey, C> Default for Knowledge<K, C> {
    fn default() -> Self {
        Self {
            components: HashMap::new(),
        }
    }
}

impl<K: TopicKey, C: PartialEq> PartialEq for Knowledge<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl<K: TopicKey, C> Knowledge<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Component for `topic`, or `None` if the topic was never seen
    pub fn get(&self, topic: &K) -> Option<&C> {
        self.components.get(topic)
    }

    pub fn get_mut(&mut self, topic: &K) -> Option<&mut C> {
        self.components.get_mut(topic)
    }

    /// Insert or replace the component for `topic`, returning the previous one
    pub fn set(&mut self, topic: K, kc: C) -> Option<C> {
        self.components.insert(topic, kc)
    }

    pub fn remove(&mut self, topic: &K) -> Option<C> {
        self.components.remove(topic)
    }

    pub fn contains(&self, topic: &K) -> bool {
        self.components.contains_key(topic)
    }

    /// Topic identifiers in unspecified order
    pub fn topics(&self) -> impl Iterator<Item = &K> {
        self.components.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, C> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Mutable component for `topic`, seeding it with `seed()` when absent
    pub fn get_or_insert_with<F>(&mut self, topic: K, seed: F) -> &mut C
    where
        F: FnOnce() -> C,
    {
        self.components.entry(topic).or_insert_with(seed)
    }
}

impl<K: TopicKey, C> FromIterator<(K, C)> for Knowledge<K, C> {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl<'a, K: TopicKey, C> IntoIterator for &'a Knowledge<K, C> {
    type Item = (&'a K, &'a C);
    type IntoIter = hash_map::Iter<'a, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl<K: TopicKey, C> IntoIterator for Knowledge<K, C> {
    type Item = (K, C);
    type IntoIter = hash_map::IntoIter<K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.into_iter()
    }
}
