use anyhow::Result;
use serde::Deserialize;
use std::io::Read;

use synthesis_engine::core::{self, Config, RequestError};
use synthesis_engine::engine::{ConsensusOptions, RecommendationFilters, SynthesisEngine};
use synthesis_engine::signals::Signal;

/// One invocation request, read as a single JSON document from stdin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisRequest {
    mode: String,
    signals: Vec<Signal>,
    #[serde(default)]
    options: Option<ConsensusOptions>,
    #[serde(default)]
    filters: Option<RecommendationFilters>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    core::logging::init_logging(&config.monitoring.log_level);

    tracing::info!("🧠 Synthesis Engine starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Agent: {}", config.agent.agent_id);

    let mut payload = String::new();
    std::io::stdin().read_to_string(&mut payload)?;
    let request: SynthesisRequest =
        serde_json::from_str(&payload).map_err(RequestError::MalformedPayload)?;

    tracing::info!(
        "Received {} request with {} signals",
        request.mode,
        request.signals.len()
    );

    let engine = SynthesisEngine::from_config(&config);

    let record = match request.mode.as_str() {
        "consensus" => {
            let options = request.options.unwrap_or(ConsensusOptions {
                min_agreement_threshold: config.synthesis.min_agreement_threshold,
                ..ConsensusOptions::default()
            });
            engine.compute_consensus(&request.signals, &options)?
        }
        "synthesis" => {
            let filters = request.filters.unwrap_or(RecommendationFilters {
                focus_categories: None,
                min_confidence: config.synthesis.min_confidence,
                max_recommendations: config.synthesis.max_recommendations,
            });
            engine.synthesize(&request.signals, &filters)?
        }
        other => return Err(RequestError::UnsupportedMode(other.to_string()).into()),
    };

    println!("{}", serde_json::to_string_pretty(&record)?);

    tracing::info!("✅ Decision record {} emitted", record.execution_ref);

    Ok(())
}
