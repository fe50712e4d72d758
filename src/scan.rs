use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Product, ProductCatalog};
use crate::constants::qr::{QR_PREFIX, QR_SEPARATOR};
use crate::history::{HistoryBackend, ScanHistory, ScanRecord};
use crate::random::RandomSource;
use crate::trace::{TraceChain, TraceGenerator, TraceStats};
use crate::types::{ProductId, QrPayload};
use crate::utils::normalize_inline_whitespace;

/// What the user scanned or tapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanRequest {
    /// Simulated scan with no payload; any product may come up.
    Random,
    /// Product tapped in the catalog.
    ProductId(ProductId),
    /// Raw payload read from a QR code.
    QrPayload(QrPayload),
}

/// Everything a result screen needs after a scan.
#[derive(Clone, Debug, Serialize)]
pub struct ScanOutcome {
    /// Resolved (or substituted) product.
    pub product: Product,
    /// Shared with the generator cache.
    pub chain: Arc<TraceChain>,
    /// Stats of `chain`.
    pub stats: TraceStats,
    /// Entry written to the scan history.
    pub record: ScanRecord,
    /// True when the request did not resolve and a random product was used.
    pub substituted: bool,
}

/// Decode `TRACE-<ID>-<YEAR>` (the year suffix is optional).
pub fn parse_qr_payload(payload: &str) -> Option<ProductId> {
    let normalized = normalize_inline_whitespace(payload);
    let body = normalized.strip_prefix(QR_PREFIX)?;
    let id = match body.rsplit_once(QR_SEPARATOR) {
        Some((id, suffix))
            if !suffix.is_empty() && suffix.chars().all(|ch| ch.is_ascii_digit()) =>
        {
            id
        }
        _ => body,
    };
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

/// Resolve a request to a catalog product, substituting a random one on a miss.
///
/// Returns the product and whether it was substituted.
pub fn resolve_product<'a>(
    catalog: &'a ProductCatalog,
    request: &ScanRequest,
    rng: &mut dyn RandomSource,
) -> (&'a Product, bool) {
    let found = match request {
        ScanRequest::Random => return (catalog.get_random(rng), false),
        ScanRequest::ProductId(id) => catalog.get_by_id(id),
        ScanRequest::QrPayload(payload) => catalog.get_by_qr_code(payload).or_else(|| {
            parse_qr_payload(payload).and_then(|id| catalog.get_by_id(&id))
        }),
    };
    match found {
        Some(product) => (product, false),
        None => {
            let product = catalog.get_random(rng);
            debug!(request = ?request, substitute = %product.id, "scan did not resolve; using random product");
            (product, true)
        }
    }
}

/// Ties the catalog, the trace generator, and the scan history together.
pub struct ScanService<'a, B: HistoryBackend> {
    catalog: &'a ProductCatalog,
    tracer: &'a TraceGenerator,
    history: ScanHistory<B>,
    rng: Box<dyn RandomSource>,
}

impl<'a, B: HistoryBackend> ScanService<'a, B> {
    /// Service over borrowed catalog and tracer, owning `history`.
    pub fn new(
        catalog: &'a ProductCatalog,
        tracer: &'a TraceGenerator,
        history: ScanHistory<B>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            catalog,
            tracer,
            history,
            rng,
        }
    }

    /// Scan history written by `scan`.
    pub fn history(&self) -> &ScanHistory<B> {
        &self.history
    }

    /// Scan at the current time.
    pub fn scan(&mut self, request: ScanRequest) -> ScanOutcome {
        self.scan_at(request, Utc::now())
    }

    /// Resolve, trace, and record a scan made at `scan_time`.
    pub fn scan_at(&mut self, request: ScanRequest, scan_time: DateTime<Utc>) -> ScanOutcome {
        let (product, substituted) = resolve_product(self.catalog, &request, self.rng.as_mut());
        let chain = self.tracer.get_chain(&product.id);
        let stats = TraceStats::from_chain(&chain);
        let record = self.history.append(product, scan_time);
        ScanOutcome {
            product: product.clone(),
            chain,
            stats,
            record,
            substituted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    #[test]
    fn parses_payload_with_and_without_year() {
        assert_eq!(parse_qr_payload("TRACE-FISH003-2025").as_deref(), Some("FISH003"));
        assert_eq!(parse_qr_payload(" TRACE-FISH003 ").as_deref(), Some("FISH003"));
        assert_eq!(parse_qr_payload("TRACE-LOT-A-7").as_deref(), Some("LOT-A"));
        assert_eq!(parse_qr_payload("TRACE-LOT-A").as_deref(), Some("LOT-A"));
    }

    #[test]
    fn rejects_foreign_payloads() {
        assert_eq!(parse_qr_payload("FISH003"), None);
        assert_eq!(parse_qr_payload("TRACE-"), None);
        assert_eq!(parse_qr_payload("TRACE--2025"), None);
        assert_eq!(parse_qr_payload("https://example.com"), None);
    }

    #[test]
    fn resolves_known_requests_without_substitution() {
        let catalog = ProductCatalog::builtin();
        let mut rng = SequenceRandom::constant(0.0);
        let (product, substituted) =
            resolve_product(&catalog, &ScanRequest::ProductId("FISH004".into()), &mut rng);
        assert_eq!(product.id, "FISH004");
        assert!(!substituted);

        let (product, substituted) = resolve_product(
            &catalog,
            &ScanRequest::QrPayload("TRACE-FISH006".into()),
            &mut rng,
        );
        assert_eq!(product.id, "FISH006");
        assert!(!substituted);
    }

    #[test]
    fn unknown_requests_fall_back_to_random() {
        let catalog = ProductCatalog::builtin();
        let mut rng = SequenceRandom::constant(0.5);
        let (product, substituted) =
            resolve_product(&catalog, &ScanRequest::ProductId("FISH999".into()), &mut rng);
        assert_eq!(product.id, "FISH004");
        assert!(substituted);

        let (_, substituted) =
            resolve_product(&catalog, &ScanRequest::QrPayload("garbage".into()), &mut rng);
        assert!(substituted);
    }

    #[test]
    fn random_request_is_not_a_substitution() {
        let catalog = ProductCatalog::builtin();
        let mut rng = SequenceRandom::constant(0.2);
        let (product, substituted) = resolve_product(&catalog, &ScanRequest::Random, &mut rng);
        assert_eq!(product.id, "FISH002");
        assert!(!substituted);
    }
}
