//! Stateless synthesis engine for cross-layer analytical signals.
//!
//! Ingests numeric and structured signals emitted by upstream layers
//! (observatory, cost-ops, governance, ...) and derives a consensus value,
//! per-metric trend analyses, cross-layer correlations, and a prioritized
//! recommendation list. Every invocation is a pure computation over an
//! immutable snapshot and emits exactly one decision record.

pub mod core;
pub mod engine;
pub mod signals;
