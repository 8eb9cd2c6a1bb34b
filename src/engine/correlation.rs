//! Cross-layer correlation over trend analyses.
//!
//! The coefficient is a direction/magnitude heuristic, not a Pearson
//! correlation; strength and causality labels come from the same threshold
//! ladder, so a strong correlation is always labelled likely-causal.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::trends::{TrendAnalysis, TrendDirection};

/// Pairs below this absolute coefficient are dropped without a record.
const SIGNIFICANCE_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CausalityHint {
    None,
    Potential,
    Likely,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossDomainCorrelation {
    pub correlation_id: Uuid,
    pub primary_trend: TrendAnalysis,
    pub secondary_trend: TrendAnalysis,
    pub correlation_coefficient: f64,
    pub strength: CorrelationStrength,
    pub causality: CausalityHint,
}

pub struct CorrelationDetector;

impl CorrelationDetector {
    pub fn new() -> Self {
        Self
    }

    /// Compare every unordered pair of trends from different layers.
    /// Same-layer pairs are never compared.
    pub fn detect(&self, trends: &[TrendAnalysis]) -> Vec<CrossDomainCorrelation> {
        let mut correlations = Vec::new();

        for i in 0..trends.len() {
            for j in (i + 1)..trends.len() {
                let primary = &trends[i];
                let secondary = &trends[j];

                if primary.layer == secondary.layer {
                    continue;
                }

                let coefficient = coefficient(primary, secondary);
                if coefficient.abs() < SIGNIFICANCE_THRESHOLD {
                    continue;
                }

                correlations.push(CrossDomainCorrelation {
                    correlation_id: correlation_id(primary, secondary),
                    primary_trend: primary.clone(),
                    secondary_trend: secondary.clone(),
                    correlation_coefficient: coefficient,
                    strength: strength_for(coefficient.abs()),
                    causality: causality_for(coefficient.abs()),
                });
            }
        }

        debug!("Detected {} cross-layer correlations", correlations.len());
        correlations
    }
}

impl Default for CorrelationDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic id over the pair identity, so identical inputs always
/// produce identical records.
fn correlation_id(primary: &TrendAnalysis, secondary: &TrendAnalysis) -> Uuid {
    let name = format!("correlation:{}|{}", primary.key(), secondary.key());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

fn coefficient(primary: &TrendAnalysis, secondary: &TrendAnalysis) -> f64 {
    let base = 0.6 + primary.magnitude.min(secondary.magnitude) * 0.4;

    if primary.direction == secondary.direction {
        base
    } else if is_opposite(primary.direction, secondary.direction) {
        -base
    } else {
        0.0
    }
}

fn is_opposite(a: TrendDirection, b: TrendDirection) -> bool {
    matches!(
        (a, b),
        (TrendDirection::Increasing, TrendDirection::Decreasing)
            | (TrendDirection::Decreasing, TrendDirection::Increasing)
    )
}

fn strength_for(magnitude: f64) -> CorrelationStrength {
    if magnitude < 0.5 {
        CorrelationStrength::Weak
    } else if magnitude < 0.7 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    }
}

fn causality_for(magnitude: f64) -> CausalityHint {
    if magnitude < 0.5 {
        CausalityHint::None
    } else if magnitude < 0.7 {
        CausalityHint::Potential
    } else {
        CausalityHint::Likely
    }
}
