pub mod consensus;
pub mod correlation;
pub mod decision;
pub mod recommendations;
pub mod stats;
pub mod trends;

pub use consensus::{
    AggregationMethod, ConfidenceWeighting, ConsensusEngine, ConsensusOptions, ConsensusResult,
};
pub use correlation::{CorrelationDetector, CrossDomainCorrelation};
pub use decision::{DecisionRecord, DecisionRecordBuilder};
pub use recommendations::{
    RecommendationFilters, RecommendationSynthesizer, StrategicRecommendation,
};
pub use trends::{TrendAnalysis, TrendAnalyzer};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::core::Config;
use crate::signals::Signal;

/// Summary output of the trend/correlation/recommendation path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisSummary {
    pub recommendations: Vec<StrategicRecommendation>,
    pub total_signals_analyzed: usize,
    pub trends_identified: usize,
    pub correlations_found: usize,
    pub overall_confidence: f64,
}

/// Linear, synchronous pipeline over one immutable signal snapshot.
///
/// Either path (consensus, or trends → correlations → recommendations)
/// terminates in exactly one decision record. No state survives an
/// invocation.
pub struct SynthesisEngine {
    consensus: ConsensusEngine,
    trends: TrendAnalyzer,
    correlations: CorrelationDetector,
    recommendations: RecommendationSynthesizer,
    records: DecisionRecordBuilder,
}

impl SynthesisEngine {
    pub fn new(agent_id: &str, agent_version: &str) -> Self {
        Self {
            consensus: ConsensusEngine::new(),
            trends: TrendAnalyzer::new(),
            correlations: CorrelationDetector::new(),
            recommendations: RecommendationSynthesizer::new(),
            records: DecisionRecordBuilder::new(agent_id, agent_version),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.agent.agent_id, &config.agent.agent_version)
    }

    /// Consensus path: one consensus result wrapped in a decision record.
    pub fn compute_consensus(
        &self,
        signals: &[Signal],
        options: &ConsensusOptions,
    ) -> Result<DecisionRecord> {
        let result = self.consensus.compute(signals, options);

        info!(
            "Consensus computed: {} of {} signals agree, confidence {}",
            result.agreement_count, result.total_signals, result.confidence
        );

        let mut constraints = vec![format!(
            "minAgreementThreshold: {}",
            options.min_agreement_threshold
        )];
        if let Some(scope) = &options.scope_filter {
            constraints.push(format!("scope: {}", scope.join(",")));
        }

        let confidence = result.confidence;
        self.records.build(
            "consensus",
            &(signals, options),
            &result,
            confidence,
            constraints,
        )
    }

    /// Trend path: trends → correlations → ranked recommendations, wrapped
    /// in a decision record.
    pub fn synthesize(
        &self,
        signals: &[Signal],
        filters: &RecommendationFilters,
    ) -> Result<DecisionRecord> {
        let grouped = TrendAnalyzer::group_by_layer(signals);
        let trends = self.trends.analyze(&grouped);
        let correlations = self.correlations.detect(&trends);
        let recommendations = self.recommendations.apply_filters(
            self.recommendations.synthesize(&correlations),
            filters,
        );
        let overall_confidence =
            RecommendationSynthesizer::overall_confidence(&recommendations);

        info!(
            "Synthesis complete: {} trends, {} correlations, {} recommendations",
            trends.len(),
            correlations.len(),
            recommendations.len()
        );

        let summary = SynthesisSummary {
            total_signals_analyzed: signals.len(),
            trends_identified: trends.len(),
            correlations_found: correlations.len(),
            overall_confidence,
            recommendations,
        };

        let mut constraints = vec![
            format!("minConfidence: {}", filters.min_confidence),
            format!("maxRecommendations: {}", filters.max_recommendations),
        ];
        if let Some(categories) = &filters.focus_categories {
            constraints.push(format!("focusCategories: {}", categories.len()));
        }

        self.records.build(
            "synthesis",
            &(signals, filters),
            &summary,
            overall_confidence,
            constraints,
        )
    }
}
