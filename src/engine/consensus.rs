//! Consensus computation over a flat signal set.
//!
//! Numeric and structured signals are aggregated separately and never mixed.
//! Empty or fully-filtered input degrades to a zero result instead of
//! erroring, so callers branch on `total_signals` / `consensus_value` rather
//! than catching failures.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats;
use crate::signals::{Signal, SignalValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Mean,
    Median,
    Mode,
    WeightedMean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceWeighting {
    Uniform,
    Proportional,
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusOptions {
    pub aggregation_method: AggregationMethod,
    pub confidence_weighting: ConfidenceWeighting,
    pub min_agreement_threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_filter: Option<Vec<String>>,
    #[serde(default)]
    pub include_divergent_analysis: bool,
}

impl Default for ConsensusOptions {
    fn default() -> Self {
        Self {
            aggregation_method: AggregationMethod::WeightedMean,
            confidence_weighting: ConfidenceWeighting::Proportional,
            min_agreement_threshold: 0.7,
            scope_filter: None,
            include_divergent_analysis: true,
        }
    }
}

/// Descriptive statistics over the numeric signal values, computed
/// unconditionally whenever numeric signals are present. Always unweighted,
/// even under non-uniform confidence weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub variance: f64,
}

/// A signal whose agreement score fell below the configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergentSignal {
    pub signal_id: String,
    pub source_layer: String,
    pub value: SignalValue,
    pub divergence: f64,
    pub agreement_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResult {
    pub consensus_value: Option<SignalValue>,
    pub agreement_level: f64,
    pub agreement_count: usize,
    pub total_signals: usize,
    pub divergent_signals: Vec<DivergentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<SignalStatistics>,
    pub confidence: f64,
    pub method: AggregationMethod,
}

impl ConsensusResult {
    fn empty(method: AggregationMethod) -> Self {
        Self {
            consensus_value: None,
            agreement_level: 0.0,
            agreement_count: 0,
            total_signals: 0,
            divergent_signals: Vec::new(),
            statistics: None,
            confidence: 0.0,
            method,
        }
    }
}

pub struct ConsensusEngine;

impl ConsensusEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, signals: &[Signal], options: &ConsensusOptions) -> ConsensusResult {
        let filtered: Vec<&Signal> = signals
            .iter()
            .filter(|s| match &options.scope_filter {
                Some(layers) => layers.iter().any(|l| l == &s.source_layer),
                None => true,
            })
            .collect();

        if filtered.is_empty() {
            return ConsensusResult::empty(options.aggregation_method);
        }

        let numeric: Vec<(&Signal, f64)> = filtered
            .iter()
            .filter_map(|s| s.value.as_numeric().map(|v| (*s, v)))
            .collect();
        let structured: Vec<&Signal> = filtered
            .iter()
            .filter(|s| !s.value.is_numeric())
            .copied()
            .collect();

        let mut statistics = None;
        let consensus_value = if !numeric.is_empty() {
            let values: Vec<f64> = numeric.iter().map(|(_, v)| *v).collect();
            let weights: Vec<f64> = numeric
                .iter()
                .map(|(s, _)| weight_for(options.confidence_weighting, s.confidence))
                .collect();

            statistics = Some(SignalStatistics {
                mean: stats::mean(&values),
                median: stats::median(&values),
                std_dev: stats::std_dev(&values),
                variance: stats::variance(&values),
            });

            Some(SignalValue::Numeric(aggregate(
                options.aggregation_method,
                &values,
                &weights,
            )))
        } else {
            // Structured consensus: the single highest-confidence structured
            // signal, first one wins on ties.
            let mut best: Option<&Signal> = None;
            for &signal in &structured {
                if best.map_or(true, |b| signal.confidence > b.confidence) {
                    best = Some(signal);
                }
            }
            best.map(|s| s.value.clone())
        };

        let mut agreement_scores = Vec::with_capacity(filtered.len());
        let mut agreement_count = 0;
        let mut divergent_signals = Vec::new();

        for signal in &filtered {
            let divergence = match &consensus_value {
                Some(consensus) => divergence(&signal.value, consensus),
                None => 1.0,
            };
            let agreement_score = 1.0 - divergence;
            agreement_scores.push(agreement_score);

            if agreement_score >= options.min_agreement_threshold {
                agreement_count += 1;
            } else if options.include_divergent_analysis {
                divergent_signals.push(DivergentSignal {
                    signal_id: signal.signal_id.clone(),
                    source_layer: signal.source_layer.clone(),
                    value: signal.value.clone(),
                    divergence,
                    agreement_score,
                });
            }
        }

        let agreement_level = stats::round3(stats::mean(&agreement_scores));

        let weight_sum: f64 = filtered
            .iter()
            .map(|s| weight_for(options.confidence_weighting, s.confidence))
            .sum();
        let weighted_confidence = if weight_sum > 0.0 {
            filtered
                .iter()
                .map(|s| s.confidence * weight_for(options.confidence_weighting, s.confidence))
                .sum::<f64>()
                / weight_sum
        } else {
            0.0
        };
        let confidence = stats::round3(weighted_confidence * agreement_level);

        debug!(
            "Consensus over {} signals: agreement={}, confidence={}",
            filtered.len(),
            agreement_level,
            confidence
        );

        ConsensusResult {
            consensus_value,
            agreement_level,
            agreement_count,
            total_signals: filtered.len(),
            divergent_signals,
            statistics,
            confidence,
            method: options.aggregation_method,
        }
    }
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn weight_for(weighting: ConfidenceWeighting, confidence: f64) -> f64 {
    match weighting {
        ConfidenceWeighting::Uniform => 1.0,
        ConfidenceWeighting::Proportional => confidence,
        ConfidenceWeighting::Exponential => confidence * confidence,
    }
}

fn aggregate(method: AggregationMethod, values: &[f64], weights: &[f64]) -> f64 {
    match method {
        // Plain mean deliberately ignores weights regardless of the
        // configured weighting.
        AggregationMethod::Mean => stats::mean(values),
        AggregationMethod::Median => stats::median(values),
        AggregationMethod::Mode => mode(values),
        AggregationMethod::WeightedMean => {
            let weight_sum: f64 = weights.iter().sum();
            if weight_sum > 0.0 {
                values
                    .iter()
                    .zip(weights)
                    .map(|(v, w)| v * w)
                    .sum::<f64>()
                    / weight_sum
            } else {
                stats::mean(values)
            }
        }
    }
}

/// Most frequent value after rounding to 2 decimals; first-seen wins ties.
fn mode(values: &[f64]) -> f64 {
    let mut buckets: Vec<(f64, usize)> = Vec::new();

    for value in values {
        let rounded = stats::round2(*value);
        match buckets.iter_mut().find(|(v, _)| *v == rounded) {
            Some((_, count)) => *count += 1,
            None => buckets.push((rounded, 1)),
        }
    }

    let mut best = (0.0, 0usize);
    for (value, count) in buckets {
        if count > best.1 {
            best = (value, count);
        }
    }
    best.0
}

/// Normalized distance between a signal value and the consensus, in [0, 1].
fn divergence(value: &SignalValue, consensus: &SignalValue) -> f64 {
    match (value, consensus) {
        (SignalValue::Numeric(s), SignalValue::Numeric(c)) => {
            if *c == 0.0 {
                if *s == 0.0 {
                    0.0
                } else {
                    1.0
                }
            } else {
                ((s - c).abs() / c.abs()).min(1.0)
            }
        }
        (SignalValue::Structured(s), SignalValue::Structured(c)) => {
            let same = serde_json::to_string(s).ok() == serde_json::to_string(c).ok();
            if same {
                0.0
            } else {
                1.0
            }
        }
        // Mismatched kinds are maximally divergent.
        _ => 1.0,
    }
}
