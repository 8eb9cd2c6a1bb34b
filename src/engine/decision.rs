//! Decision record assembly.
//!
//! One record per invocation, carrying the agent identity, a deterministic
//! hash of the inputs, and the constraints that were actually applied. The
//! inputs hash is reproducible: identical payloads always hash identically
//! because serde_json serializes object keys in sorted order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Truncated hash length in hex characters.
const INPUTS_HASH_LEN: usize = 16;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub agent_id: String,
    pub agent_version: String,
    pub decision_type: String,
    pub inputs_hash: String,
    pub outputs: serde_json::Value,
    pub confidence: f64,
    pub constraints_applied: Vec<String>,
    pub execution_ref: Uuid,
    pub timestamp: DateTime<Utc>,
}

pub struct DecisionRecordBuilder {
    agent_id: String,
    agent_version: String,
}

impl DecisionRecordBuilder {
    pub fn new(agent_id: &str, agent_version: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            agent_version: agent_version.to_string(),
        }
    }

    pub fn build<I: Serialize, O: Serialize>(
        &self,
        decision_type: &str,
        inputs: &I,
        outputs: &O,
        confidence: f64,
        constraints_applied: Vec<String>,
    ) -> Result<DecisionRecord> {
        let inputs_value = serde_json::to_value(inputs)?;

        Ok(DecisionRecord {
            agent_id: self.agent_id.clone(),
            agent_version: self.agent_version.clone(),
            decision_type: decision_type.to_string(),
            inputs_hash: hash_inputs(&inputs_value),
            outputs: serde_json::to_value(outputs)?,
            confidence,
            constraints_applied,
            execution_ref: Uuid::new_v4(),
            timestamp: Utc::now(),
        })
    }
}

/// SHA-256 over the canonical JSON form, truncated to 16 hex chars.
fn hash_inputs(inputs: &serde_json::Value) -> String {
    let canonical = inputs.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)[..INPUTS_HASH_LEN].to_string()
}
