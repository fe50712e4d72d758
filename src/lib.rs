#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Read-only product catalog and queries.
pub mod catalog;
/// Runtime configuration types.
pub mod config;
/// Centralized constants used across catalog, trace, history, and scan code.
pub mod constants;
/// Reusable demo runners shared by the `demos/` entry points.
pub mod demo_apps;
/// Detail fields and their value generators.
pub mod details;
/// Scan history persistence.
pub mod history;
/// Pluggable random sources.
pub mod random;
/// Scan request resolution and the scan flow.
pub mod scan;
/// Stage template pools.
pub mod templates;
/// Trace chain generation, caching, and statistics.
pub mod trace;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use catalog::{Category, CategoryFilter, Nutrition, Product, ProductCatalog};
pub use config::TraceConfig;
pub use details::DetailField;
pub use errors::TraceError;
pub use history::{
    FileHistoryBackend, HistoryBackend, MemoryHistoryBackend, ScanHistory, ScanRecord,
};
pub use random::{DeterministicRng, RandomSource, SequenceRandom, SystemRandom};
pub use scan::{ScanOutcome, ScanRequest, ScanService, parse_qr_payload, resolve_product};
pub use templates::{NodeCategory, StagePool, StatusKind, TemplatePool, TraceNodeTemplate};
pub use trace::{Clock, TraceChain, TraceGenerator, TraceNode, TraceStats};
pub use types::{
    CategoryId, DetailValue, FieldLabel, ProductId, QrPayload, ScanRecordId, TimestampText,
};
