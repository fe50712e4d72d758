use chrono::{DateTime, Duration, TimeZone, Utc};

use unagi_trace::{
    FileHistoryBackend, HistoryBackend, MemoryHistoryBackend, Product, ProductCatalog,
    ScanHistory,
};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap()
}

fn synthetic_product(template: &Product, idx: usize) -> Product {
    Product {
        id: format!("LOT{idx:03}"),
        name: format!("Lot {idx}"),
        qr_code: format!("TRACE-LOT{idx:03}-2025"),
        ..template.clone()
    }
}

#[test]
fn history_keeps_only_the_fifty_newest() {
    let catalog = ProductCatalog::builtin();
    let template = &catalog.products()[0];
    let history = ScanHistory::new(MemoryHistoryBackend::new());
    assert_eq!(history.capacity(), 50);

    for idx in 0..51 {
        let product = synthetic_product(template, idx);
        history.append(&product, base_time() + Duration::minutes(idx as i64));
    }

    let records = history.list();
    assert_eq!(records.len(), 50);
    assert_eq!(records[0].product_id, "LOT050");
    assert_eq!(records[49].product_id, "LOT001");
    assert!(records.iter().all(|record| record.product_id != "LOT000"));
}

#[test]
fn rescanning_moves_entry_to_front() {
    let catalog = ProductCatalog::builtin();
    let history = ScanHistory::new(MemoryHistoryBackend::new());
    for (idx, product) in catalog.products().iter().enumerate() {
        history.append(product, base_time() + Duration::minutes(idx as i64));
    }
    let rescanned = &catalog.products()[2];
    let later = base_time() + Duration::hours(3);
    history.append(rescanned, later);

    let records = history.list();
    assert_eq!(records.len(), catalog.len());
    assert_eq!(records[0].product_id, rescanned.id);
    assert_eq!(records[0].scan_time, later);
    assert_eq!(
        records
            .iter()
            .filter(|record| record.product_id == rescanned.id)
            .count(),
        1
    );
}

#[test]
fn file_history_survives_reopen() {
    let temp = tempfile::tempdir().unwrap();
    let catalog = ProductCatalog::builtin();
    {
        let backend = FileHistoryBackend::open(temp.path()).unwrap();
        let history = ScanHistory::new(backend);
        history.append(&catalog.products()[0], base_time());
        history.append(&catalog.products()[1], base_time() + Duration::minutes(1));
    }

    let reopened = ScanHistory::new(FileHistoryBackend::open(temp.path()).unwrap());
    let ids: Vec<String> = reopened
        .list()
        .into_iter()
        .map(|record| record.product_id)
        .collect();
    assert_eq!(ids, vec!["FISH002", "FISH001"]);

    reopened.clear();
    assert!(reopened.is_empty());
    assert!(!FileHistoryBackend::default_path_in_dir(temp.path()).exists());
}

#[test]
fn custom_capacity_is_enforced_on_write() {
    let catalog = ProductCatalog::builtin();
    let history = ScanHistory::with_capacity(MemoryHistoryBackend::new(), 2).unwrap();
    for (idx, product) in catalog.products().iter().enumerate() {
        history.append(product, base_time() + Duration::minutes(idx as i64));
    }
    let stored = history.backend().load().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].product_id, "FISH006");
    assert_eq!(stored[1].product_id, "FISH005");
}
