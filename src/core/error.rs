use thiserror::Error;

/// Boundary contract violations. The engine itself degrades to empty results
/// on thin input; only malformed requests surface as errors, and the shim
/// decides the user-visible behavior.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),
}
