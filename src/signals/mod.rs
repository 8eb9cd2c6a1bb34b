pub mod store;

pub use store::{InMemorySignalStore, SignalStore, TimeWindow};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known upstream layer identifiers.
pub mod layers {
    pub const OBSERVATORY: &str = "observatory";
    pub const COST_OPS: &str = "cost-ops";
    pub const GOVERNANCE: &str = "governance";
}

/// One timestamped observation emitted by an upstream analytical layer.
///
/// Signals are produced and validated upstream; the engine only reads them.
/// `confidence` is the emitting layer's self-reported certainty in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub signal_id: String,
    pub source_layer: String,
    pub timestamp: DateTime<Utc>,
    pub metric_type: String,
    pub value: SignalValue,
    pub confidence: f64,
}

/// Signal payload: either a plain number or a structured JSON object.
///
/// Numeric and structured signals are never aggregated together; keeping the
/// two shapes in one tagged union makes that a type-level guarantee rather
/// than a runtime inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Numeric(f64),
    Structured(serde_json::Value),
}

impl SignalValue {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            SignalValue::Numeric(v) => Some(*v),
            SignalValue::Structured(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SignalValue::Numeric(_))
    }
}

impl Signal {
    pub fn numeric(
        signal_id: &str,
        source_layer: &str,
        metric_type: &str,
        timestamp: DateTime<Utc>,
        value: f64,
        confidence: f64,
    ) -> Self {
        Self {
            signal_id: signal_id.to_string(),
            source_layer: source_layer.to_string(),
            timestamp,
            metric_type: metric_type.to_string(),
            value: SignalValue::Numeric(value),
            confidence,
        }
    }

    pub fn structured(
        signal_id: &str,
        source_layer: &str,
        metric_type: &str,
        timestamp: DateTime<Utc>,
        value: serde_json::Value,
        confidence: f64,
    ) -> Self {
        Self {
            signal_id: signal_id.to_string(),
            source_layer: source_layer.to_string(),
            timestamp,
            metric_type: metric_type.to_string(),
            value: SignalValue::Structured(value),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_value_untagged_roundtrip() {
        let numeric: SignalValue = serde_json::from_str("42.5").unwrap();
        assert_eq!(numeric.as_numeric(), Some(42.5));

        let structured: SignalValue =
            serde_json::from_str(r#"{"status": "degraded"}"#).unwrap();
        assert!(!structured.is_numeric());
    }

    #[test]
    fn test_signal_wire_format_is_camel_case() {
        let signal = Signal::numeric(
            "sig-1",
            layers::OBSERVATORY,
            "latency-p95",
            Utc::now(),
            120.0,
            0.9,
        );

        let json = serde_json::to_value(&signal).unwrap();
        assert!(json.get("signalId").is_some());
        assert!(json.get("sourceLayer").is_some());
        assert!(json.get("metricType").is_some());
    }

    #[test]
    fn test_integer_values_parse_as_numeric() {
        let value: SignalValue = serde_json::from_str("7").unwrap();
        assert_eq!(value.as_numeric(), Some(7.0));
    }
}
