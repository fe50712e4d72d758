use unagi_trace::{ProductCatalog, TraceError};

fn ids(products: &[&unagi_trace::Product]) -> Vec<String> {
    products.iter().map(|product| product.id.clone()).collect()
}

#[test]
fn empty_search_and_all_filter_return_whole_catalog() {
    let catalog = ProductCatalog::builtin();
    let everything: Vec<String> = catalog.products().iter().map(|p| p.id.clone()).collect();

    assert_eq!(ids(&catalog.search("")), everything);
    assert_eq!(ids(&catalog.search("   ")), everything);
    assert_eq!(ids(&catalog.filter_by_category("all")), everything);
}

#[test]
fn category_partitions_cover_catalog() {
    let catalog = ProductCatalog::builtin();
    let mut covered = 0;
    for category in catalog.categories() {
        if category.id == "all" {
            continue;
        }
        let members = catalog.filter_by_category(&category.id);
        assert!(members.iter().all(|p| p.category == category.id));
        covered += members.len();
    }
    assert_eq!(covered, catalog.len());
    assert!(catalog.filter_by_category("frozen").is_empty());
}

#[test]
fn search_is_case_insensitive_over_name_and_origin() {
    let catalog = ProductCatalog::builtin();
    assert_eq!(ids(&catalog.search("KABAYAKI")), vec!["FISH002", "FISH004"]);
    let by_origin = catalog.search(&catalog.products()[0].origin.to_uppercase());
    assert!(by_origin.iter().any(|p| p.id == "FISH001"));
    assert!(catalog.search("no such eel anywhere").is_empty());
}

#[test]
fn construction_rejects_bad_inputs() {
    let builtin = ProductCatalog::builtin();
    let categories = builtin.categories().to_vec();

    let err = ProductCatalog::new(Vec::new(), categories.clone()).unwrap_err();
    assert!(matches!(err, TraceError::EmptyCatalog));

    let first = builtin.products()[0].clone();
    let err = ProductCatalog::new(vec![first.clone(), first], categories).unwrap_err();
    assert!(matches!(err, TraceError::DuplicateProduct(id) if id == "FISH001"));
}
