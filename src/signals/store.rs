use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::Signal;

/// Inclusive time bounds applied when fetching signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Boundary to whatever system materializes signals for the engine.
///
/// The engine treats the result as an immutable, already-time-bounded
/// snapshot; fetching is the only async step in an invocation.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Fetch signals, optionally bounded by a time window and a set of
    /// source layers.
    async fn fetch(
        &self,
        window: Option<&TimeWindow>,
        layers: Option<&[String]>,
    ) -> Result<Vec<Signal>>;
}

/// In-memory signal store used by tests and embedded callers.
pub struct InMemorySignalStore {
    signals: Arc<RwLock<Vec<Signal>>>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self {
            signals: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn ingest(&self, signal: Signal) {
        self.signals.write().await.push(signal);
    }

    pub async fn ingest_batch(&self, batch: Vec<Signal>) {
        let mut signals = self.signals.write().await;
        tracing::debug!("Ingesting {} signals", batch.len());
        signals.extend(batch);
    }

    pub async fn len(&self) -> usize {
        self.signals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.signals.read().await.is_empty()
    }
}

impl Default for InMemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn fetch(
        &self,
        window: Option<&TimeWindow>,
        layers: Option<&[String]>,
    ) -> Result<Vec<Signal>> {
        let signals = self.signals.read().await;

        Ok(signals
            .iter()
            .filter(|s| window.map_or(true, |w| w.contains(s.timestamp)))
            .filter(|s| {
                layers.map_or(true, |l| l.iter().any(|layer| layer == &s.source_layer))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::layers;
    use chrono::Duration;

    fn sample(id: &str, layer: &str, offset_minutes: i64) -> Signal {
        Signal::numeric(
            id,
            layer,
            "request-rate",
            Utc::now() - Duration::minutes(offset_minutes),
            1.0,
            0.9,
        )
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let store = InMemorySignalStore::new();
        store.ingest(sample("a", layers::OBSERVATORY, 0)).await;
        store.ingest(sample("b", layers::COST_OPS, 0)).await;

        let signals = store.fetch(None, None).await.unwrap();
        assert_eq!(signals.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_filters_by_layer() {
        let store = InMemorySignalStore::new();
        store.ingest(sample("a", layers::OBSERVATORY, 0)).await;
        store.ingest(sample("b", layers::COST_OPS, 0)).await;

        let only = vec![layers::COST_OPS.to_string()];
        let signals = store.fetch(None, Some(&only)).await.unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].source_layer, layers::COST_OPS);
    }

    #[tokio::test]
    async fn test_fetch_filters_by_window() {
        let store = InMemorySignalStore::new();
        store.ingest(sample("old", layers::OBSERVATORY, 120)).await;
        store.ingest(sample("new", layers::OBSERVATORY, 5)).await;

        let window = TimeWindow {
            start: Utc::now() - Duration::hours(1),
            end: Utc::now(),
        };
        let signals = store.fetch(Some(&window), None).await.unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_id, "new");
    }
}
