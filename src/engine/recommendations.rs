//! Rule-based recommendation synthesis over cross-layer correlations.
//!
//! Each recommendation derives from exactly one correlation. Rules match in
//! priority order: the cost-vs-performance special case first, then a
//! generic category by layer.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::correlation::{CorrelationStrength, CrossDomainCorrelation};
use super::stats;
use super::trends::TrendDirection;
use crate::signals::layers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationCategory {
    CostOptimization,
    PerformanceImprovement,
    GovernanceCompliance,
    StrategicInitiative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeHorizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedImpact {
    pub cost_savings: f64,
    pub performance_gain: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicRecommendation {
    pub recommendation_id: Uuid,
    pub category: RecommendationCategory,
    pub priority: RecommendationPriority,
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub supporting_correlations: Vec<Uuid>,
    pub supporting_trends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_impact: Option<ExpectedImpact>,
    pub confidence: f64,
    pub time_horizon: TimeHorizon,
}

/// Caller-facing output filters, applied after sorting: category filter,
/// then confidence filter, then truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_categories: Option<Vec<RecommendationCategory>>,
    #[serde(default)]
    pub min_confidence: f64,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_max_recommendations() -> usize {
    10
}

impl Default for RecommendationFilters {
    fn default() -> Self {
        Self {
            focus_categories: None,
            min_confidence: 0.0,
            max_recommendations: default_max_recommendations(),
        }
    }
}

pub struct RecommendationSynthesizer;

impl RecommendationSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// One candidate recommendation per correlation, sorted by priority
    /// (critical first) with ties broken by confidence descending.
    pub fn synthesize(
        &self,
        correlations: &[CrossDomainCorrelation],
    ) -> Vec<StrategicRecommendation> {
        let mut recommendations: Vec<StrategicRecommendation> =
            correlations.iter().map(build_recommendation).collect();

        recommendations.sort_by(|a, b| {
            a.priority.cmp(&b.priority).then(
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        });

        debug!("Synthesized {} recommendations", recommendations.len());
        recommendations
    }

    pub fn apply_filters(
        &self,
        mut recommendations: Vec<StrategicRecommendation>,
        filters: &RecommendationFilters,
    ) -> Vec<StrategicRecommendation> {
        if let Some(categories) = &filters.focus_categories {
            recommendations.retain(|r| categories.contains(&r.category));
        }
        recommendations.retain(|r| r.confidence >= filters.min_confidence);
        recommendations.truncate(filters.max_recommendations);
        recommendations
    }

    /// Mean confidence of the final recommendation list; 0 when empty.
    pub fn overall_confidence(recommendations: &[StrategicRecommendation]) -> f64 {
        if recommendations.is_empty() {
            return 0.0;
        }
        stats::mean(
            &recommendations
                .iter()
                .map(|r| r.confidence)
                .collect::<Vec<f64>>(),
        )
    }
}

impl Default for RecommendationSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_recommendation(correlation: &CrossDomainCorrelation) -> StrategicRecommendation {
    let primary = &correlation.primary_trend;
    let secondary = &correlation.secondary_trend;

    let cost_vs_performance = primary.layer == layers::COST_OPS
        && primary.direction == TrendDirection::Increasing
        && secondary.layer == layers::OBSERVATORY
        && secondary.direction == TrendDirection::Decreasing;

    let (category, title, description, rationale, expected_impact, time_horizon) =
        if cost_vs_performance {
            (
                RecommendationCategory::CostOptimization,
                format!(
                    "Contain rising {} spend amid declining {}",
                    primary.metric_type, secondary.metric_type
                ),
                "Cost is climbing while observed performance falls; spend is not \
                 translating into throughput. Review provider allocation and \
                 right-size the most expensive call paths."
                    .to_string(),
                format!(
                    "cost-ops/{} is increasing (magnitude {:.2}) while observatory/{} \
                     is decreasing (magnitude {:.2})",
                    primary.metric_type,
                    primary.magnitude,
                    secondary.metric_type,
                    secondary.magnitude
                ),
                Some(ExpectedImpact {
                    cost_savings: primary.magnitude * 0.3,
                    performance_gain: secondary.magnitude * 0.2,
                }),
                TimeHorizon::ShortTerm,
            )
        } else {
            let category = category_for(&primary.layer, &secondary.layer);
            (
                category,
                format!(
                    "Align {} and {} trajectories",
                    primary.key(),
                    secondary.key()
                ),
                format!(
                    "Correlated movement detected between {} and {} (coefficient {:.2}). \
                     Investigate whether one metric is driving the other before the \
                     divergence widens.",
                    primary.key(),
                    secondary.key(),
                    correlation.correlation_coefficient
                ),
                format!(
                    "{} correlation with {:?} causality across layers {} and {}",
                    correlation.correlation_coefficient.abs(),
                    correlation.causality,
                    primary.layer,
                    secondary.layer
                ),
                None,
                TimeHorizon::MediumTerm,
            )
        };

    StrategicRecommendation {
        recommendation_id: Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("recommendation:{}", correlation.correlation_id).as_bytes(),
        ),
        category,
        priority: priority_for(correlation.strength, primary.magnitude),
        title,
        description,
        rationale,
        supporting_correlations: vec![correlation.correlation_id],
        supporting_trends: vec![primary.key(), secondary.key()],
        expected_impact,
        confidence: (primary.confidence + secondary.confidence) / 2.0,
        time_horizon,
    }
}

/// First matching layer wins, in fixed priority order.
fn category_for(primary_layer: &str, secondary_layer: &str) -> RecommendationCategory {
    let has = |layer: &str| primary_layer == layer || secondary_layer == layer;

    if has(layers::COST_OPS) {
        RecommendationCategory::CostOptimization
    } else if has(layers::OBSERVATORY) {
        RecommendationCategory::PerformanceImprovement
    } else if has(layers::GOVERNANCE) {
        RecommendationCategory::GovernanceCompliance
    } else {
        RecommendationCategory::StrategicInitiative
    }
}

fn priority_for(strength: CorrelationStrength, magnitude: f64) -> RecommendationPriority {
    match strength {
        CorrelationStrength::Strong if magnitude > 0.7 => RecommendationPriority::Critical,
        CorrelationStrength::Strong => RecommendationPriority::High,
        CorrelationStrength::Moderate if magnitude > 0.6 => RecommendationPriority::High,
        CorrelationStrength::Moderate => RecommendationPriority::Medium,
        CorrelationStrength::Weak => RecommendationPriority::Low,
    }
}
