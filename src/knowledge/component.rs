//! Knowledge Components
//!
//! A knowledge component (KC) is a Gaussian belief `N(mean, variance)` about one topic,
//! plus the POSIX timestamp of its last update.
//!
//! Content-side components carry a small fixed variance (the resource's depth is assumed
//! to be measured accurately). Learner-side components carry a variance that shrinks as
//! evidence accumulates and grows again through decay.
//!
//! Variants:
//! - [`GaussianComponent`] - plain belief with optional descriptive metadata
//! - [`HistoryAwareComponent`] - also keeps a bounded log of pre-update snapshots
//! - [`RankedComponent`] - also carries an importance weight within a resource

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{KnowledgeTraceError, Result};
use crate::sanitize::{ensure_finite, ensure_variance};

// ==================== Update Options ====================

/// Partial update of a knowledge component
///
/// Every absent field leaves the corresponding attribute unchanged; an all-absent
/// update is a legal no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentUpdate {
    pub mean: Option<f64>,
    pub variance: Option<f64>,
    pub timestamp: Option<f64>,
}

impl ComponentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(mut self, mean: f64) -> Self {
        self.mean = Some(mean);
        self
    }

    pub fn variance(mut self, variance: f64) -> Self {
        self.variance = Some(variance);
        self
    }

    pub fn timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_none() && self.variance.is_none() && self.timestamp.is_none()
    }

    /// Check every present field before anything is written
    pub fn validate(&self) -> Result<()> {
        if let Some(mean) = self.mean {
            ensure_finite("mean", mean)?;
        }
        if let Some(variance) = self.variance {
            ensure_variance(variance)?;
        }
        if let Some(timestamp) = self.timestamp {
            ensure_finite("timestamp", timestamp)?;
        }
        Ok(())
    }
}

// ==================== Export ====================

/// Supported export formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Flat record (JSON object)
    Dict,
    /// The flat record serialized to a JSON string
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Dict, ExportFormat::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Dict => "dict",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = KnowledgeTraceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dict" => Ok(ExportFormat::Dict),
            "json" => Ok(ExportFormat::Json),
            other => Err(KnowledgeTraceError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`KnowledgeComponent::export`]
#[derive(Clone, Debug, PartialEq)]
pub enum Exported {
    Dict(Map<String, Value>),
    Json(String),
}

impl Exported {
    pub fn as_dict(&self) -> Option<&Map<String, Value>> {
        match self {
            Exported::Dict(map) => Some(map),
            Exported::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&str> {
        match self {
            Exported::Json(s) => Some(s),
            Exported::Dict(_) => None,
        }
    }
}

// ==================== Capability Trait ====================

/// Capability set shared by every knowledge-component kind
pub trait KnowledgeComponent:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned
{
    fn mean(&self) -> f64;

    fn variance(&self) -> f64;

    /// POSIX time of the last update, absent before any timed update
    fn timestamp(&self) -> Option<f64>;

    /// Importance of this topic within its owner; 1.0 unless the kind tracks one
    fn weight(&self) -> f64 {
        1.0
    }

    /// Apply a partial update; fails with `InvalidParameter` without modifying `self`
    fn update(&mut self, update: ComponentUpdate) -> Result<()>;

    /// A new component of the same kind with the given belief
    fn clone_with(&self, mean: f64, variance: f64, timestamp: Option<f64>) -> Result<Self>;

    /// Export into one of the formats named by [`ExportFormat`]
    fn export(&self, format: &str) -> Result<Exported> {
        let format: ExportFormat = format.parse()?;
        let record = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(KnowledgeTraceError::Serialization(format!(
                    "component did not serialize to a record: {other}"
                )))
            }
        };
        match format {
            ExportFormat::Dict => Ok(Exported::Dict(record)),
            ExportFormat::Json => Ok(Exported::Json(serde_json::to_string(&record)?)),
        }
    }

    /// Rebuild a component from its `"dict"` export
    fn from_record(record: &Map<String, Value>) -> Result<Self> {
        let kc: Self = serde_json::from_value(Value::Object(record.clone()))?;
        ensure_finite("mean", kc.mean())?;
        ensure_variance(kc.variance())?;
        if let Some(ts) = kc.timestamp() {
            ensure_finite("timestamp", ts)?;
        }
        Ok(kc)
    }
}

// ==================== Gaussian Component ====================

/// Plain Gaussian knowledge component
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianComponent {
    mean: f64,
    variance: f64,
    timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl GaussianComponent {
    pub fn new(mean: f64, variance: f64) -> Result<Self> {
        Ok(Self {
            mean: ensure_finite("mean", mean)?,
            variance: ensure_variance(variance)?,
            timestamp: None,
            title: None,
            description: None,
            url: None,
        })
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Result<Self> {
        self.timestamp = Some(ensure_finite("timestamp", timestamp)?);
        Ok(self)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Copy with new numbers; metadata is carried over
    fn rebased(&self, mean: f64, variance: f64, timestamp: Option<f64>) -> Result<Self> {
        if let Some(ts) = timestamp {
            ensure_finite("timestamp", ts)?;
        }
        Ok(Self {
            mean: ensure_finite("mean", mean)?,
            variance: ensure_variance(variance)?,
            timestamp,
            title: self.title.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
        })
    }
}

impl KnowledgeComponent for GaussianComponent {
    fn mean(&self) -> f64 {
        self.mean
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    fn update(&mut self, update: ComponentUpdate) -> Result<()> {
        update.validate()?;
        if let Some(mean) = update.mean {
            self.mean = mean;
        }
        if let Some(variance) = update.variance {
            self.variance = variance;
        }
        if let Some(timestamp) = update.timestamp {
            self.timestamp = Some(timestamp);
        }
        Ok(())
    }

    fn clone_with(&self, mean: f64, variance: f64, timestamp: Option<f64>) -> Result<Self> {
        self.rebased(mean, variance, timestamp)
    }
}

// ==================== History-Aware Component ====================

/// Snapshot of a component taken right before an update
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub mean: f64,
    pub variance: f64,
    pub timestamp: Option<f64>,
}

/// Knowledge component that remembers its previous states
///
/// Each non-empty update pushes the pre-update state. With a `history_limit` the
/// oldest entries are evicted first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryAwareComponent {
    #[serde(flatten)]
    inner: GaussianComponent,
    #[serde(default)]
    history_limit: Option<usize>,
    #[serde(default)]
    history: VecDeque<HistoryEntry>,
}

impl HistoryAwareComponent {
    pub fn new(mean: f64, variance: f64, history_limit: Option<usize>) -> Result<Self> {
        Ok(Self {
            inner: GaussianComponent::new(mean, variance)?,
            history_limit,
            history: VecDeque::new(),
        })
    }

    pub fn from_component(inner: GaussianComponent, history_limit: Option<usize>) -> Self {
        Self {
            inner,
            history_limit,
            history: VecDeque::new(),
        }
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    pub fn inner(&self) -> &GaussianComponent {
        &self.inner
    }

    fn record(&mut self) {
        if self.history_limit == Some(0) {
            return;
        }
        self.history.push_back(HistoryEntry {
            mean: self.inner.mean,
            variance: self.inner.variance,
            timestamp: self.inner.timestamp,
        });
        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }
}

impl KnowledgeComponent for HistoryAwareComponent {
    fn mean(&self) -> f64 {
        self.inner.mean
    }

    fn variance(&self) -> f64 {
        self.inner.variance
    }

    fn timestamp(&self) -> Option<f64> {
        self.inner.timestamp
    }

    fn update(&mut self, update: ComponentUpdate) -> Result<()> {
        update.validate()?;
        if update.is_empty() {
            return Ok(());
        }
        self.record();
        self.inner.update(update)
    }

    fn clone_with(&self, mean: f64, variance: f64, timestamp: Option<f64>) -> Result<Self> {
        Ok(Self {
            inner: self.inner.rebased(mean, variance, timestamp)?,
            history_limit: self.history_limit,
            history: VecDeque::new(),
        })
    }
}

// ==================== Ranked Component ====================

/// Knowledge component with an importance weight among the topics of its owner
///
/// For content this is typically the topic's share (or rank score) within the
/// resource; content-weighted aggregation uses it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedComponent {
    #[serde(flatten)]
    inner: GaussianComponent,
    weight: f64,
}

impl RankedComponent {
    pub fn new(mean: f64, variance: f64, weight: f64) -> Result<Self> {
        Ok(Self {
            inner: GaussianComponent::new(mean, variance)?,
            weight: ensure_weight(weight)?,
        })
    }

    pub fn from_component(inner: GaussianComponent, weight: f64) -> Result<Self> {
        Ok(Self {
            inner,
            weight: ensure_weight(weight)?,
        })
    }

    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        self.weight = ensure_weight(weight)?;
        Ok(())
    }

    pub fn inner(&self) -> &GaussianComponent {
        &self.inner
    }
}

fn ensure_weight(weight: f64) -> Result<f64> {
    let weight = ensure_finite("weight", weight)?;
    if weight < 0.0 {
        return Err(KnowledgeTraceError::InvalidParameter(format!(
            "weight must be >= 0, got {weight}"
        )));
    }
    Ok(weight)
}

impl KnowledgeComponent for RankedComponent {
    fn mean(&self) -> f64 {
        self.inner.mean
    }

    fn variance(&self) -> f64 {
        self.inner.variance
    }

    fn timestamp(&self) -> Option<f64> {
        self.inner.timestamp
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn update(&mut self, update: ComponentUpdate) -> Result<()> {
        self.inner.update(update)
    }

    fn clone_with(&self, mean: f64, variance: f64, timestamp: Option<f64>) -> Result<Self> {
        Ok(Self {
            inner: self.inner.rebased(mean, variance, timestamp)?,
            weight: self.weight,
        })
    }

    fn from_record(record: &Map<String, Value>) -> Result<Self> {
        let kc: Self = serde_json::from_value(Value::Object(record.clone()))?;
        ensure_finite("mean", kc.mean())?;
        ensure_variance(kc.variance())?;
        ensure_weight(kc.weight)?;
        Ok(kc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kc(mean: f64, variance: f64) -> GaussianComponent {
        GaussianComponent::new(mean, variance).unwrap()
    }

    // ==================== GaussianComponent Tests ====================

    #[test]
    fn test_new_rejects_negative_variance() {
        let err = GaussianComponent::new(0.0, -0.1).unwrap_err();
        assert!(matches!(err, KnowledgeTraceError::InvalidParameter(_)));
    }

    #[test]
    fn test_new_rejects_nan_mean() {
        assert!(GaussianComponent::new(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut c = kc(0.3, 0.4).with_timestamp(10.0).unwrap();
        let before = c.clone();
        c.update(ComponentUpdate::new()).unwrap();
        assert_eq!(c, before);
    }

    #[test]
    fn test_partial_update() {
        let mut c = kc(0.3, 0.4);
        c.update(ComponentUpdate::new().mean(1.0)).unwrap();
        assert_eq!(c.mean(), 1.0);
        assert_eq!(c.variance(), 0.4);
        assert_eq!(c.timestamp(), None);

        c.update(ComponentUpdate::new().variance(0.1).timestamp(5.0))
            .unwrap();
        assert_eq!(c.mean(), 1.0);
        assert_eq!(c.variance(), 0.1);
        assert_eq!(c.timestamp(), Some(5.0));
    }

    #[test]
    fn test_update_rejects_negative_variance_atomically() {
        let mut c = kc(0.3, 0.4);
        let err = c
            .update(ComponentUpdate::new().mean(9.0).variance(-1.0))
            .unwrap_err();
        assert!(matches!(err, KnowledgeTraceError::InvalidParameter(_)));
        assert_eq!(c.mean(), 0.3, "failed update must not write any field");
        assert_eq!(c.variance(), 0.4);
    }

    #[test]
    fn test_clone_with_keeps_metadata() {
        let c = kc(0.3, 0.4).with_title("Algebra").with_url("https://example.org/a");
        let cloned = c.clone_with(1.0, 0.2, Some(7.0)).unwrap();
        assert_eq!(cloned.mean(), 1.0);
        assert_eq!(cloned.variance(), 0.2);
        assert_eq!(cloned.timestamp(), Some(7.0));
        assert_eq!(cloned.title(), Some("Algebra"));
        assert_eq!(cloned.url(), Some("https://example.org/a"));
        // original untouched
        assert_eq!(c.mean(), 0.3);
    }

    #[test]
    fn test_clone_with_rejects_negative_variance() {
        let c = kc(0.3, 0.4);
        assert!(matches!(
            c.clone_with(0.0, -0.5, None),
            Err(KnowledgeTraceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_export_dict() {
        let c = kc(0.25, 0.5).with_timestamp(100.0).unwrap().with_title("T");
        let exported = c.export("dict").unwrap();
        let map = exported.as_dict().unwrap();
        assert_eq!(map["mean"], 0.25);
        assert_eq!(map["variance"], 0.5);
        assert_eq!(map["timestamp"], 100.0);
        assert_eq!(map["title"], "T");
        assert!(!map.contains_key("url"));
    }

    #[test]
    fn test_export_json() {
        let c = kc(0.25, 0.5);
        let exported = c.export("json").unwrap();
        let text = exported.as_json().unwrap();
        assert!(text.contains("\"mean\":0.25"));
        assert!(text.contains("\"timestamp\":null"));
    }

    #[test]
    fn test_export_unsupported_format() {
        let c = kc(0.0, 1.0);
        let err = c.export("yaml").unwrap_err();
        assert_eq!(err, KnowledgeTraceError::UnsupportedFormat("yaml".into()));
        assert!(c.export("").is_err());
        assert!(c.export("DICT").is_err());
    }

    #[test]
    fn test_export_round_trip() {
        let c = kc(0.123_456_789, 0.000_321).with_timestamp(1_700_000_000.5).unwrap();
        let exported = c.export("dict").unwrap();
        let restored = GaussianComponent::from_record(exported.as_dict().unwrap()).unwrap();
        assert_eq!(restored.mean().to_bits(), c.mean().to_bits());
        assert_eq!(restored.variance().to_bits(), c.variance().to_bits());
        assert_eq!(restored.timestamp(), c.timestamp());
    }

    #[test]
    fn test_from_record_rejects_negative_variance() {
        let mut map = Map::new();
        map.insert("mean".into(), 0.0.into());
        map.insert("variance".into(), (-1.0).into());
        map.insert("timestamp".into(), Value::Null);
        assert!(matches!(
            GaussianComponent::from_record(&map),
            Err(KnowledgeTraceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_export_format_parse() {
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>().unwrap(), format);
        }
    }

    // ==================== HistoryAwareComponent Tests ====================

    #[test]
    fn test_history_records_previous_state() {
        let mut c = HistoryAwareComponent::new(0.0, 0.5, None).unwrap();
        c.update(ComponentUpdate::new().mean(0.2).timestamp(1.0)).unwrap();
        c.update(ComponentUpdate::new().mean(0.4).timestamp(2.0)).unwrap();

        let history: Vec<_> = c.history().iter().copied().collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].mean, 0.0);
        assert_eq!(history[0].timestamp, None);
        assert_eq!(history[1].mean, 0.2);
        assert_eq!(history[1].timestamp, Some(1.0));
        assert_eq!(c.mean(), 0.4);
    }

    #[test]
    fn test_history_limit_evicts_oldest() {
        let mut c = HistoryAwareComponent::new(0.0, 0.5, Some(2)).unwrap();
        for i in 1..=5 {
            c.update(ComponentUpdate::new().mean(i as f64)).unwrap();
        }
        let means: Vec<f64> = c.history().iter().map(|h| h.mean).collect();
        assert_eq!(means, vec![3.0, 4.0]);
    }

    #[test]
    fn test_history_noop_update_not_recorded() {
        let mut c = HistoryAwareComponent::new(0.0, 0.5, None).unwrap();
        c.update(ComponentUpdate::new()).unwrap();
        assert!(c.history().is_empty());
    }

    #[test]
    fn test_history_failed_update_not_recorded() {
        let mut c = HistoryAwareComponent::new(0.0, 0.5, None).unwrap();
        assert!(c.update(ComponentUpdate::new().variance(-2.0)).is_err());
        assert!(c.history().is_empty());
        assert_eq!(c.variance(), 0.5);
    }

    #[test]
    fn test_history_clone_starts_empty() {
        let mut c = HistoryAwareComponent::new(0.0, 0.5, Some(3)).unwrap();
        c.update(ComponentUpdate::new().mean(1.0)).unwrap();
        let cloned = c.clone_with(2.0, 0.1, None).unwrap();
        assert!(cloned.history().is_empty());
        assert_eq!(cloned.history_limit(), Some(3));
    }

    #[test]
    fn test_history_export_round_trip() {
        let mut c = HistoryAwareComponent::new(0.0, 0.5, Some(4)).unwrap();
        c.update(ComponentUpdate::new().mean(0.7).variance(0.3).timestamp(3.0))
            .unwrap();
        let exported = c.export("dict").unwrap();
        let map = exported.as_dict().unwrap();
        assert_eq!(map["mean"], 0.7);
        assert!(map.contains_key("history"));
        let restored = HistoryAwareComponent::from_record(map).unwrap();
        assert_eq!(restored, c);
    }

    // ==================== RankedComponent Tests ====================

    #[test]
    fn test_ranked_weight() {
        let c = RankedComponent::new(0.5, 1e-9, 0.75).unwrap();
        assert_eq!(c.weight(), 0.75);
        assert!(RankedComponent::new(0.5, 1e-9, -0.1).is_err());
    }

    #[test]
    fn test_ranked_clone_keeps_weight() {
        let c = RankedComponent::new(0.5, 1e-9, 0.75).unwrap();
        let cloned = c.clone_with(0.0, 0.5, None).unwrap();
        assert_eq!(cloned.weight(), 0.75);
        assert_eq!(cloned.variance(), 0.5);
    }

    #[test]
    fn test_ranked_export_round_trip() {
        let c = RankedComponent::new(0.5, 0.01, 2.0).unwrap();
        let exported = c.export("dict").unwrap();
        let map = exported.as_dict().unwrap();
        assert_eq!(map["weight"], 2.0);
        let restored = RankedComponent::from_record(map).unwrap();
        assert_eq!(restored, c);
    }

    #[test]
    fn test_default_weight_is_one() {
        assert_eq!(kc(0.0, 1.0).weight(), 1.0);
    }
}
