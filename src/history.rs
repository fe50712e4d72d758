use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;

use crate::catalog::Product;
use crate::constants::history::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_DIR, HISTORY_FILE_EXTENSION, HISTORY_STORAGE_KEY,
    SCAN_RECORD_ID_PREFIX,
};
use crate::errors::TraceError;
use crate::types::{ProductId, QrPayload, ScanRecordId};

/// One entry of the scan history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// `TRACE_<scan millis>`.
    pub id: ScanRecordId,
    /// Scanned product.
    pub product_id: ProductId,
    /// Product name at scan time.
    pub product_name: String,
    /// Product origin at scan time.
    pub origin: String,
    /// Product QR payload.
    pub qr_code: QrPayload,
    /// When the scan happened.
    pub scan_time: DateTime<Utc>,
}

impl ScanRecord {
    /// Record for a scan of `product` at `scan_time`.
    pub fn for_product(product: &Product, scan_time: DateTime<Utc>) -> Self {
        Self {
            id: format!("{SCAN_RECORD_ID_PREFIX}{}", scan_time.timestamp_millis()),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            origin: product.origin.clone(),
            qr_code: product.qr_code.clone(),
            scan_time,
        }
    }
}

/// Storage backend for the scan history list.
///
/// Implementations persist the whole list at once, newest record first.
pub trait HistoryBackend: Send + Sync {
    /// Load the stored list; a missing store is an empty list.
    fn load(&self) -> Result<Vec<ScanRecord>, TraceError>;
    /// Replace the stored list.
    fn store(&self, records: &[ScanRecord]) -> Result<(), TraceError>;
    /// Remove the stored list.
    fn clear(&self) -> Result<(), TraceError>;
}

/// In-process backend; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryHistoryBackend {
    records: RwLock<Vec<ScanRecord>>,
}

impl MemoryHistoryBackend {
    /// Empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryBackend for MemoryHistoryBackend {
    fn load(&self) -> Result<Vec<ScanRecord>, TraceError> {
        self.records
            .read()
            .map_err(|_| TraceError::HistoryStorage("history lock poisoned".into()))
            .map(|guard| guard.clone())
    }

    fn store(&self, records: &[ScanRecord]) -> Result<(), TraceError> {
        *self
            .records
            .write()
            .map_err(|_| TraceError::HistoryStorage("history lock poisoned".into()))? =
            records.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<(), TraceError> {
        self.store(&[])
    }
}

/// JSON-file backend keyed by the fixed history storage key.
pub struct FileHistoryBackend {
    path: PathBuf,
}

impl fmt::Debug for FileHistoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHistoryBackend")
            .field("path", &self.path)
            .finish()
    }
}

impl FileHistoryBackend {
    /// Open (or prepare) the history file inside `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, TraceError> {
        Self::open_path(Self::default_path_in_dir(dir))
    }

    /// Open (or prepare) a history file at an explicit `path`.
    pub fn open_path<P: Into<PathBuf>>(path: P) -> Result<Self, TraceError> {
        let path = path.into();
        ensure_parent_dir(&path)?;
        Ok(Self { path })
    }

    /// Default history file path under the crate's default directory.
    pub fn default_path() -> PathBuf {
        Self::default_path_in_dir(DEFAULT_HISTORY_DIR)
    }

    /// Default history file path inside a custom directory.
    pub fn default_path_in_dir<P: AsRef<Path>>(dir: P) -> PathBuf {
        dir.as_ref()
            .join(format!("{HISTORY_STORAGE_KEY}.{HISTORY_FILE_EXTENSION}"))
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryBackend for FileHistoryBackend {
    fn load(&self) -> Result<Vec<ScanRecord>, TraceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes).map_err(|err| {
            TraceError::HistoryStorage(format!(
                "failed to decode {}: {err}",
                self.path.display()
            ))
        })
    }

    fn store(&self, records: &[ScanRecord]) -> Result<(), TraceError> {
        let payload = serde_json::to_vec_pretty(records).map_err(|err| {
            TraceError::HistoryStorage(format!("failed to encode scan history: {err}"))
        })?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TraceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Capped, newest-first scan history de-duplicated by product id.
///
/// Storage failures are logged and swallowed; losing history never fails a scan.
pub struct ScanHistory<B: HistoryBackend> {
    backend: B,
    capacity: usize,
}

impl<B: HistoryBackend> ScanHistory<B> {
    /// History with the default capacity.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// History retaining at most `capacity` records (must be non-zero).
    pub fn with_capacity(backend: B, capacity: usize) -> Result<Self, TraceError> {
        if capacity == 0 {
            return Err(TraceError::Configuration(
                "scan history capacity must be at least 1".into(),
            ));
        }
        Ok(Self { backend, capacity })
    }

    /// Max records kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Underlying storage.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Record a scan of `product`, moving an existing entry for it to the front.
    pub fn append(&self, product: &Product, scan_time: DateTime<Utc>) -> ScanRecord {
        let record = ScanRecord::for_product(product, scan_time);
        let mut records = self.list();
        records.retain(|existing| existing.product_id != record.product_id);
        records.insert(0, record.clone());
        records.truncate(self.capacity);
        if let Err(err) = self.backend.store(&records) {
            warn!(product_id = %record.product_id, error = %err, "failed to save scan history");
        }
        record
    }

    /// Stored records, newest first. Unreadable storage reads as empty.
    pub fn list(&self) -> Vec<ScanRecord> {
        match self.backend.load() {
            Ok(mut records) => {
                records.truncate(self.capacity);
                records
            }
            Err(err) => {
                warn!(error = %err, "failed to read scan history");
                Vec::new()
            }
        }
    }

    /// Drop all records.
    pub fn clear(&self) {
        if let Err(err) = self.backend.clear() {
            warn!(error = %err, "failed to clear scan history");
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.list().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), TraceError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductCatalog;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 23, 9, minute, 0).unwrap()
    }

    struct FailingBackend;

    impl HistoryBackend for FailingBackend {
        fn load(&self) -> Result<Vec<ScanRecord>, TraceError> {
            Err(TraceError::HistoryStorage("quota exceeded".into()))
        }

        fn store(&self, _records: &[ScanRecord]) -> Result<(), TraceError> {
            Err(TraceError::HistoryStorage("quota exceeded".into()))
        }

        fn clear(&self) -> Result<(), TraceError> {
            Err(TraceError::HistoryStorage("quota exceeded".into()))
        }
    }

    #[test]
    fn append_puts_newest_first() {
        let catalog = ProductCatalog::builtin();
        let history = ScanHistory::new(MemoryHistoryBackend::new());
        history.append(&catalog.products()[0], at(0));
        history.append(&catalog.products()[1], at(1));
        let ids: Vec<String> = history.list().into_iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec!["FISH002", "FISH001"]);
    }

    #[test]
    fn duplicate_scan_moves_to_front_with_new_time() {
        let catalog = ProductCatalog::builtin();
        let history = ScanHistory::new(MemoryHistoryBackend::new());
        for (minute, product) in catalog.products().iter().take(3).enumerate() {
            history.append(product, at(minute as u32));
        }
        let record = history.append(&catalog.products()[0], at(30));
        let list = history.list();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], record);
        assert_eq!(list[0].scan_time, at(30));
        assert_eq!(
            list.iter().filter(|r| r.product_id == "FISH001").count(),
            1
        );
    }

    #[test]
    fn storage_failures_do_not_propagate() {
        let catalog = ProductCatalog::builtin();
        let history = ScanHistory::new(FailingBackend);
        let record = history.append(&catalog.products()[0], at(0));
        assert_eq!(record.product_id, "FISH001");
        assert!(history.list().is_empty());
        history.clear();
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            ScanHistory::with_capacity(MemoryHistoryBackend::new(), 0),
            Err(TraceError::Configuration(_))
        ));
    }

    #[test]
    fn file_backend_round_trips_and_clears() {
        let dir = tempdir().unwrap();
        let backend = FileHistoryBackend::open(dir.path().join("nested")).unwrap();
        assert!(backend.path().ends_with("fish_trace_history.json"));
        assert!(backend.load().unwrap().is_empty());

        let catalog = ProductCatalog::builtin();
        let record = ScanRecord::for_product(&catalog.products()[2], at(5));
        backend.store(std::slice::from_ref(&record)).unwrap();
        assert_eq!(backend.load().unwrap(), vec![record]);

        backend.clear().unwrap();
        assert!(backend.load().unwrap().is_empty());
        backend.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_empty_history() {
        let dir = tempdir().unwrap();
        let backend = FileHistoryBackend::open(dir.path()).unwrap();
        fs::write(backend.path(), b"{not json").unwrap();
        assert!(matches!(backend.load(), Err(TraceError::HistoryStorage(_))));

        let history = ScanHistory::new(backend);
        assert!(history.is_empty());
        let catalog = ProductCatalog::builtin();
        history.append(&catalog.products()[0], at(1));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn record_id_uses_scan_millis() {
        let catalog = ProductCatalog::builtin();
        let record = ScanRecord::for_product(&catalog.products()[0], at(0));
        assert_eq!(record.id, format!("TRACE_{}", at(0).timestamp_millis()));
        assert_eq!(record.qr_code, "TRACE-FISH001-2025");
    }
}
