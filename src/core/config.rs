use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub agent: AgentConfig,
    pub synthesis: SynthesisConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    pub agent_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    pub min_agreement_threshold: f64,
    pub min_confidence: f64,
    pub max_recommendations: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            agent: AgentConfig {
                agent_id: env::var("AGENT_ID")
                    .unwrap_or_else(|_| "synthesis-agent".to_string()),
                agent_version: env::var("AGENT_VERSION")
                    .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            },
            synthesis: SynthesisConfig {
                min_agreement_threshold: env::var("MIN_AGREEMENT_THRESHOLD")
                    .unwrap_or_else(|_| "0.7".to_string())
                    .parse()
                    .unwrap_or(0.7),
                min_confidence: env::var("MIN_CONFIDENCE")
                    .unwrap_or_else(|_| "0.0".to_string())
                    .parse()
                    .unwrap_or(0.0),
                max_recommendations: env::var("MAX_RECOMMENDATIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            monitoring: MonitoringConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}
