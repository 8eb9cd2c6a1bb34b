//! Per-(layer, metric) trend analysis.
//!
//! Fits an ordinary-least-squares slope over evenly-spaced indices, labels
//! the direction, and flags statistical outliers. Groups with fewer than two
//! numeric points produce no trend; that is a documented omission, not an
//! error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::stats;
use crate::signals::Signal;

/// Coefficient-of-variation bound above which a series is volatile.
const VOLATILITY_CV_THRESHOLD: f64 = 0.3;
/// Slope magnitude below which a non-volatile series is stable.
const STABLE_SLOPE_THRESHOLD: f64 = 0.05;
/// Z-score above which a point is anomalous.
const ANOMALY_Z_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    Spike,
    Drop,
    HighValue,
    LowValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A point that deviates more than two standard deviations from its group
/// mean, classified by shape and severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnomaly {
    pub signal_id: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub deviation: f64,
    pub kind: AnomalyKind,
    pub severity: AnomalySeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub metric_type: String,
    pub layer: String,
    pub direction: TrendDirection,
    pub magnitude: f64,
    pub velocity: f64,
    pub data_points: usize,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<TrendAnomaly>>,
}

impl TrendAnalysis {
    /// Stable identity key for correlation and recommendation references.
    pub fn key(&self) -> String {
        format!("{}/{}", self.layer, self.metric_type)
    }
}

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic grouping of numeric signals by source layer. Structured
    /// signals carry no fittable value and are excluded up front.
    pub fn group_by_layer(signals: &[Signal]) -> BTreeMap<String, Vec<Signal>> {
        let mut grouped: BTreeMap<String, Vec<Signal>> = BTreeMap::new();
        for signal in signals {
            if signal.value.is_numeric() {
                grouped
                    .entry(signal.source_layer.clone())
                    .or_default()
                    .push(signal.clone());
            }
        }
        grouped
    }

    pub fn analyze(&self, signals_by_layer: &BTreeMap<String, Vec<Signal>>) -> Vec<TrendAnalysis> {
        let mut trends = Vec::new();

        for (layer, signals) in signals_by_layer {
            let mut by_metric: BTreeMap<&str, Vec<&Signal>> = BTreeMap::new();
            for signal in signals {
                if signal.value.is_numeric() {
                    by_metric
                        .entry(signal.metric_type.as_str())
                        .or_default()
                        .push(signal);
                }
            }

            for (metric_type, group) in by_metric {
                if let Some(trend) = Self::analyze_group(layer, metric_type, group) {
                    trends.push(trend);
                }
            }
        }

        debug!("Identified {} trends", trends.len());
        trends
    }

    fn analyze_group(layer: &str, metric_type: &str, mut group: Vec<&Signal>) -> Option<TrendAnalysis> {
        if group.len() < 2 {
            return None;
        }

        group.sort_by_key(|s| s.timestamp);

        let values: Vec<f64> = group
            .iter()
            .filter_map(|s| s.value.as_numeric())
            .collect();

        let slope = ols_slope(&values);
        let magnitude = slope.abs().min(1.0);

        let mean = stats::mean(&values);
        let std_dev = stats::std_dev(&values);
        let cv_denominator = if mean == 0.0 { 1.0 } else { mean.abs() };
        let coefficient_of_variation = std_dev / cv_denominator;

        // Volatility wins over slope: a volatile-but-flat series is
        // volatile, not stable.
        let direction = if coefficient_of_variation > VOLATILITY_CV_THRESHOLD {
            TrendDirection::Volatile
        } else if slope.abs() < STABLE_SLOPE_THRESHOLD {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        let anomalies = detect_anomalies(&group, &values, mean, std_dev);

        let first = group.first()?;
        let last = group.last()?;
        let span_hours =
            (last.timestamp - first.timestamp).num_milliseconds() as f64 / 3_600_000.0;
        let velocity = if span_hours == 0.0 {
            0.0
        } else {
            (values[values.len() - 1] - values[0]) / span_hours
        };

        let confidence =
            stats::mean(&group.iter().map(|s| s.confidence).collect::<Vec<f64>>());

        Some(TrendAnalysis {
            metric_type: metric_type.to_string(),
            layer: layer.to_string(),
            direction,
            magnitude,
            velocity,
            data_points: group.len(),
            confidence,
            anomalies,
        })
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// OLS slope over (index, value) pairs. The index is the independent
/// variable: timestamps are assumed evenly spaced.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_sum: f64 = (0..values.len()).map(|i| i as f64).sum();
    let y_sum: f64 = values.iter().sum();
    let xy_sum: f64 = values.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let x_squared_sum: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * x_squared_sum - x_sum.powi(2);
    if denominator == 0.0 {
        return 0.0;
    }
    (n * xy_sum - x_sum * y_sum) / denominator
}

fn detect_anomalies(
    group: &[&Signal],
    values: &[f64],
    mean: f64,
    std_dev: f64,
) -> Option<Vec<TrendAnomaly>> {
    let denominator = if std_dev == 0.0 { 1.0 } else { std_dev };
    let mut anomalies = Vec::new();

    for (i, (signal, &value)) in group.iter().zip(values).enumerate() {
        let deviation = (value - mean).abs() / denominator;
        if deviation <= ANOMALY_Z_THRESHOLD {
            continue;
        }

        let previous = if i > 0 { Some(values[i - 1]) } else { None };
        let kind = classify_anomaly(value, mean, previous);

        anomalies.push(TrendAnomaly {
            signal_id: signal.signal_id.clone(),
            timestamp: signal.timestamp,
            value,
            deviation,
            kind,
            severity: severity_for(deviation),
        });
    }

    if anomalies.is_empty() {
        None
    } else {
        Some(anomalies)
    }
}

fn classify_anomaly(value: f64, mean: f64, previous: Option<f64>) -> AnomalyKind {
    if value > mean {
        match previous {
            Some(prev) if value > prev * 1.5 => AnomalyKind::Spike,
            _ => AnomalyKind::HighValue,
        }
    } else {
        match previous {
            Some(prev) if value < prev * 0.5 => AnomalyKind::Drop,
            _ => AnomalyKind::LowValue,
        }
    }
}

fn severity_for(deviation: f64) -> AnomalySeverity {
    match deviation {
        d if d > 5.0 => AnomalySeverity::Critical,
        d if d > 4.0 => AnomalySeverity::High,
        d if d > 3.0 => AnomalySeverity::Medium,
        _ => AnomalySeverity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::layers;
    use chrono::Duration;

    fn series(layer: &str, metric: &str, values: &[f64]) -> Vec<Signal> {
        let start = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Signal::numeric(
                    &format!("{}-{}", metric, i),
                    layer,
                    metric,
                    start + Duration::hours(i as i64),
                    v,
                    0.9,
                )
            })
            .collect()
    }

    fn analyze(signals: Vec<Signal>) -> Vec<TrendAnalysis> {
        let analyzer = TrendAnalyzer::new();
        analyzer.analyze(&TrendAnalyzer::group_by_layer(&signals))
    }

    #[test]
    fn test_flat_two_point_series_is_stable() {
        let trends = analyze(series(layers::OBSERVATORY, "latency", &[5.0, 5.0]));

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Stable);
        assert_eq!(trends[0].velocity, 0.0);
        assert_eq!(trends[0].magnitude, 0.0);
        assert_eq!(trends[0].data_points, 2);
        assert!(trends[0].anomalies.is_none());
    }

    #[test]
    fn test_single_point_group_is_skipped() {
        let trends = analyze(series(layers::OBSERVATORY, "latency", &[5.0]));
        assert!(trends.is_empty());
    }

    #[test]
    fn test_increasing_series() {
        let trends = analyze(series(
            layers::COST_OPS,
            "hourly-spend",
            &[10.0, 10.8, 11.6, 12.4],
        ));

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Increasing);
        assert!((trends[0].magnitude - 0.8).abs() < 1e-9);
        // 2.4 units over 3 hours.
        assert!((trends[0].velocity - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_decreasing_series() {
        let trends = analyze(series(
            layers::OBSERVATORY,
            "throughput",
            &[10.0, 9.4, 8.8, 8.2],
        ));

        assert_eq!(trends[0].direction, TrendDirection::Decreasing);
        assert!((trends[0].magnitude - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_volatile_wins_over_stable() {
        // Alternating series: the high spread keeps it volatile no matter
        // what the fitted slope says.
        let trends = analyze(series(
            layers::OBSERVATORY,
            "error-rate",
            &[1.0, 9.0, 1.0, 9.0, 1.0, 9.0],
        ));

        assert_eq!(trends[0].direction, TrendDirection::Volatile);
    }

    #[test]
    fn test_anomaly_detection_and_classification() {
        // Long flat run with one extreme spike at the end.
        let mut values = vec![10.0; 12];
        values.push(100.0);
        let trends = analyze(series(layers::OBSERVATORY, "latency", &values));

        let anomalies = trends[0].anomalies.as_ref().expect("anomaly expected");
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].deviation > 2.0);
        assert_eq!(anomalies[0].kind, AnomalyKind::Spike);
        assert!(anomalies[0].severity >= AnomalySeverity::Medium);
    }

    #[test]
    fn test_groups_split_by_layer_and_metric() {
        let mut signals = series(layers::OBSERVATORY, "latency", &[1.0, 1.0, 1.0]);
        signals.extend(series(layers::OBSERVATORY, "throughput", &[2.0, 2.0]));
        signals.extend(series(layers::COST_OPS, "latency", &[3.0, 3.0]));

        let trends = analyze(signals);
        assert_eq!(trends.len(), 3);
    }

    #[test]
    fn test_structured_signals_are_excluded() {
        let mut signals = series(layers::GOVERNANCE, "violations", &[1.0]);
        signals.push(Signal::structured(
            "s-1",
            layers::GOVERNANCE,
            "violations",
            Utc::now(),
            serde_json::json!({"rule": "budget"}),
            0.9,
        ));

        // One numeric point plus one structured point never reaches the
        // two-numeric-point minimum.
        let trends = analyze(signals);
        assert!(trends.is_empty());
    }

    #[test]
    fn test_group_confidence_is_mean_of_signal_confidences() {
        let start = Utc::now();
        let signals = vec![
            Signal::numeric("a", layers::OBSERVATORY, "latency", start, 1.0, 0.6),
            Signal::numeric(
                "b",
                layers::OBSERVATORY,
                "latency",
                start + Duration::hours(1),
                1.0,
                1.0,
            ),
        ];

        let trends = analyze(signals);
        assert!((trends[0].confidence - 0.8).abs() < 1e-9);
    }
}
