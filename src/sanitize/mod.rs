//! Data Sanitization
//!
//! Numerical stability utilities.
//!
//! Functions:
//! - Parameter validation (finite, non-negative variance)
//! - Posterior variance flooring
//! - Probability clamping
//! - Learner state diagnostics

use tracing::warn;

use crate::error::{KnowledgeTraceError, Result};
use crate::knowledge::{Knowledge, KnowledgeComponent, TopicKey};
use crate::types::{DiagnosticResult, MAX_VARIANCE, MIN_VARIANCE};

/// Reject NaN / ±∞ for a named parameter
pub fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(KnowledgeTraceError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Reject negative or non-finite variances
pub fn ensure_variance(value: f64) -> Result<f64> {
    let value = ensure_finite("variance", value)?;
    if value < 0.0 {
        return Err(KnowledgeTraceError::InvalidParameter(format!(
            "variance must be >= 0, got {value}"
        )));
    }
    Ok(value)
}

/// Reject variances that are not strictly positive
pub fn ensure_positive(name: &str, value: f64) -> Result<f64> {
    let value = ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(KnowledgeTraceError::InvalidParameter(format!(
            "{name} must be > 0, got {value}"
        )));
    }
    Ok(value)
}

/// Reject probabilities outside [0, 1]
pub fn ensure_probability(name: &str, value: f64) -> Result<f64> {
    let value = ensure_finite(name, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(KnowledgeTraceError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(value)
}

/// Keep a posterior variance positive: at least `floor`, at most MAX_VARIANCE
///
/// NaN collapses to the floor; the floor is always at least MIN_VARIANCE.
pub fn floor_variance(variance: f64, floor: f64) -> f64 {
    let floor = floor.max(MIN_VARIANCE);
    if variance.is_nan() || variance < floor {
        if !variance.is_nan() && variance < floor * 0.5 {
            warn!(variance, floor, "posterior variance clamped to floor");
        }
        return floor;
    }
    variance.min(MAX_VARIANCE)
}

/// Clamp a probability into [0, 1], mapping NaN to the neutral 0.5
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.5
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Health check over a learner's knowledge state
pub fn diagnose_knowledge<K, C>(knowledge: &Knowledge<K, C>) -> DiagnosticResult
where
    K: TopicKey,
    C: KnowledgeComponent,
{
    let mut has_nan = false;
    let mut has_inf = false;
    let mut min_variance = f64::MAX;
    let mut max_variance = f64::MIN;
    let mut degenerate_topics = 0u32;

    for (_, kc) in knowledge.iter() {
        let values = [kc.mean(), kc.variance()];
        for v in values {
            if v.is_nan() {
                has_nan = true;
            }
            if v.is_infinite() {
                has_inf = true;
            }
        }
        let var = kc.variance();
        if var.is_finite() {
            min_variance = min_variance.min(var);
            max_variance = max_variance.max(var);
        }
        if var.is_nan() || var <= 0.0 {
            degenerate_topics += 1;
        }
    }

    let is_healthy = !has_nan && !has_inf && degenerate_topics == 0;

    let message = if is_healthy {
        "Knowledge is healthy".to_string()
    } else if has_nan {
        "Knowledge contains NaN values".to_string()
    } else if has_inf {
        "Knowledge contains infinite values".to_string()
    } else {
        format!("Knowledge has {degenerate_topics} topic(s) with non-positive variance")
    };

    DiagnosticResult {
        is_healthy,
        has_nan,
        has_inf,
        topic_count: knowledge.len() as u32,
        degenerate_topics,
        min_variance: if min_variance == f64::MAX {
            0.0
        } else {
            min_variance
        },
        max_variance: if max_variance == f64::MIN {
            0.0
        } else {
            max_variance
        },
        message,
    }
}
