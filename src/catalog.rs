use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::catalog::ALL_CATEGORIES;
use crate::errors::TraceError;
use crate::random::RandomSource;
use crate::types::{CategoryId, ProductId, QrPayload};
use crate::utils::fold_keyword;

/// Nutrition facts per 100g, as display strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    /// Grams of protein.
    pub protein: String,
    /// Grams of fat.
    pub fat: String,
    /// Energy, kcal.
    pub calories: String,
    /// Omega-3 content.
    pub omega3: String,
}

/// A sellable product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique id, e.g. `FISH001`.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// One-line tagline.
    pub subtitle: String,
    /// Current price.
    pub price: f64,
    /// List price before discount.
    pub original_price: f64,
    /// Sales unit (`500g/piece`).
    pub unit: String,
    /// Marketing tags.
    pub tags: Vec<String>,
    /// Browsing category id.
    pub category: CategoryId,
    /// Place of origin.
    pub origin: String,
    /// Producing company.
    pub producer: String,
    /// Date the lot was produced.
    pub production_date: NaiveDate,
    /// Shelf life, as display text.
    pub shelf_life: String,
    /// Storage instructions.
    pub storage: String,
    /// Nutrition facts.
    pub nutrition: Nutrition,
    /// Long description; searched by keyword.
    pub description: String,
    /// Units sold.
    pub sales: u32,
    /// Average rating out of 5.
    pub rating: f32,
    /// Units in stock.
    pub stock: u32,
    /// Payload printed in the product's QR code.
    pub qr_code: QrPayload,
}

/// Browsing category shown in the storefront.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id; `all` is reserved.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Icon token.
    pub icon: String,
}

/// Parsed category filter; `all` means no filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filtering.
    All,
    /// Products whose category equals the tag.
    Tag(CategoryId),
}

impl CategoryFilter {
    /// `all` maps to `All`, anything else to a tag.
    pub fn parse(tag: &str) -> Self {
        if tag == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Tag(tag.to_string())
        }
    }

    fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Tag(tag) => product.category == *tag,
        }
    }
}

/// Read-only product catalog (non-empty, unique ids).
#[derive(Clone, Debug)]
pub struct ProductCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl ProductCatalog {
    /// Build a catalog, rejecting empty product lists and duplicate ids.
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Result<Self, TraceError> {
        if products.is_empty() {
            return Err(TraceError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.id.as_str()) {
                return Err(TraceError::DuplicateProduct(product.id.clone()));
            }
        }
        Ok(Self {
            products,
            categories,
        })
    }

    /// Products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Browsing categories, `all` first.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Always false; construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Exact id match.
    pub fn get_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Exact QR payload match.
    pub fn get_by_qr_code(&self, payload: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.qr_code == payload)
    }

    /// Uniform pick over the whole catalog.
    pub fn get_random(&self, rng: &mut dyn RandomSource) -> &Product {
        &self.products[rng.index(self.products.len())]
    }

    /// Products in `tag` (or everything for `all`), in catalog order.
    pub fn filter_by_category(&self, tag: &str) -> Vec<&Product> {
        let filter = CategoryFilter::parse(tag);
        self.products
            .iter()
            .filter(|product| filter.matches(product))
            .collect()
    }

    /// Case-insensitive substring match over name, description, and origin.
    pub fn search(&self, keyword: &str) -> Vec<&Product> {
        let needle = fold_keyword(keyword);
        if needle.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|product| {
                [&product.name, &product.description, &product.origin]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Built-in eel product line.
    pub fn builtin() -> Self {
        let date = |month: u32, day: u32| {
            NaiveDate::from_ymd_opt(2025, month, day).unwrap_or(NaiveDate::MIN)
        };
        let nutrition = |protein: &str, fat: &str, calories: &str, omega3: &str| Nutrition {
            protein: protein.to_string(),
            fat: fat.to_string(),
            calories: calories.to_string(),
            omega3: omega3.to_string(),
        };
        let tags = |values: [&str; 2]| -> Vec<String> {
            values.iter().map(|tag| tag.to_string()).collect()
        };

        let products = vec![
            Product {
                id: "FISH001".into(),
                name: "Yangchun Specialty Live Eel".into(),
                subtitle: "Eco-farmed, tender and fresh".into(),
                price: 128.0,
                original_price: 168.0,
                unit: "about 500g each".into(),
                tags: tags(["Best seller", "Organic certified"]),
                category: "fresh".into(),
                origin: "Yangchun Town, Jiang'an County, Yibin, Sichuan".into(),
                producer: "Qicaihu Specialty Aquaculture Co.".into(),
                production_date: date(1, 23),
                shelf_life: "3 days chilled / 30 days frozen".into(),
                storage: "Keep chilled at 0-4°C".into(),
                nutrition: nutrition("18.2g", "12.5g", "189kcal", "2.1g"),
                description: "Premium eel from Yangchun Town in Jiang'an, Sichuan, raised in clean \
                    water for delicate, fresh flesh. Rich in quality protein and Omega-3 fatty acids."
                    .into(),
                sales: 2341,
                rating: 4.9,
                stock: 156,
                qr_code: "TRACE-FISH001-2025".into(),
            },
            Product {
                id: "FISH002".into(),
                name: "Japanese Kabayaki Eel".into(),
                subtitle: "Ready to eat, just open the bag".into(),
                price: 89.0,
                original_price: 118.0,
                unit: "200g per bag".into(),
                tags: tags(["Ready to eat", "Fan favorite"]),
                category: "processed".into(),
                origin: "Hangzhou, Zhejiang".into(),
                producer: "Hangzhou Manxiang Foods Co.".into(),
                production_date: date(1, 20),
                shelf_life: "180 days frozen".into(),
                storage: "Keep frozen below -18°C".into(),
                nutrition: nutrition("16.5g", "15.2g", "245kcal", "1.8g"),
                description: "Selected eel grilled with a traditional Japanese kabayaki glaze. \
                    Microwave for 3 minutes and serve over rice."
                    .into(),
                sales: 5621,
                rating: 4.8,
                stock: 328,
                qr_code: "TRACE-FISH002-2025".into(),
            },
            Product {
                id: "FISH003".into(),
                name: "Wild Deep-Sea Eel Steaks".into(),
                subtitle: "Deep-sea caught, naturally flavorful".into(),
                price: 198.0,
                original_price: 258.0,
                unit: "about 600g per pack".into(),
                tags: tags(["Wild", "Limited"]),
                category: "fresh".into(),
                origin: "Xiapu County, Ningde, Fujian".into(),
                producer: "Xiapu Haiyuan Aquatic Products Co.".into(),
                production_date: date(1, 22),
                shelf_life: "2 days chilled / 30 days frozen".into(),
                storage: "Keep chilled at 0-4°C".into(),
                nutrition: nutrition("19.8g", "10.2g", "175kcal", "2.5g"),
                description: "Wild eel from the East China Sea with firm, nutritious flesh. \
                    Limited daily supply, delivered fresh."
                    .into(),
                sales: 892,
                rating: 4.95,
                stock: 45,
                qr_code: "TRACE-FISH003-2025".into(),
            },
            Product {
                id: "FISH004".into(),
                name: "Organic Black Eel Gift Box".into(),
                subtitle: "A premium gift".into(),
                price: 388.0,
                original_price: 488.0,
                unit: "1000g gift box".into(),
                tags: tags(["Gift box", "Organic certified"]),
                category: "gift".into(),
                origin: "Taishan, Guangdong".into(),
                producer: "Taishan Lvyuan Eco Fishery".into(),
                production_date: date(1, 21),
                shelf_life: "90 days frozen".into(),
                storage: "Keep frozen below -18°C".into(),
                nutrition: nutrition("20.1g", "11.8g", "192kcal", "2.3g"),
                description: "Certified organic Taishan black eel in a gift box for holidays \
                    and business gifts. Two whole eels with a kabayaki sauce pack."
                    .into(),
                sales: 456,
                rating: 4.85,
                stock: 78,
                qr_code: "TRACE-FISH004-2025".into(),
            },
            Product {
                id: "FISH005".into(),
                name: "Eel Sushi Topping".into(),
                subtitle: "Made for the kitchen".into(),
                price: 68.0,
                original_price: 88.0,
                unit: "150g per box".into(),
                tags: tags(["Cooking", "Special offer"]),
                category: "processed".into(),
                origin: "Nantong, Jiangsu".into(),
                producer: "Nantong Haiweifang Foods".into(),
                production_date: date(1, 19),
                shelf_life: "365 days frozen".into(),
                storage: "Keep frozen below -18°C".into(),
                nutrition: nutrition("15.2g", "14.5g", "228kcal", "1.6g"),
                description: "Evenly sliced, pre-seasoned eel designed for sushi. Thaw and use \
                    for restaurant-grade eel sushi at home."
                    .into(),
                sales: 3256,
                rating: 4.7,
                stock: 512,
                qr_code: "TRACE-FISH005-2025".into(),
            },
            Product {
                id: "FISH006".into(),
                name: "Whole Steamed Eel".into(),
                subtitle: "Light and wholesome for all ages".into(),
                price: 158.0,
                original_price: 198.0,
                unit: "about 450g each".into(),
                tags: tags(["Wellness", "Recommended"]),
                category: "fresh".into(),
                origin: "Poyang Lake, Jiangxi".into(),
                producer: "Poyang Lake Eco Fishery Cooperative".into(),
                production_date: date(1, 23),
                shelf_life: "3 days chilled / 30 days frozen".into(),
                storage: "Keep chilled at 0-4°C".into(),
                nutrition: nutrition("17.8g", "11.2g", "178kcal", "2.0g"),
                description: "Raised in the natural waters of Poyang Lake. Ideal for steaming \
                    or soups that keep the eel's original flavor."
                    .into(),
                sales: 1823,
                rating: 4.85,
                stock: 203,
                qr_code: "TRACE-FISH006-2025".into(),
            },
        ];

        let category = |id: &str, name: &str, icon: &str| Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
        };
        let categories = vec![
            category(ALL_CATEGORIES, "All", "🐟"),
            category("fresh", "Fresh", "🌊"),
            category("processed", "Processed", "🍱"),
            category("gift", "Gift boxes", "🎁"),
        ];

        Self {
            products,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|product| product.id.clone()).collect()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = ProductCatalog::builtin();
        let rebuilt =
            ProductCatalog::new(catalog.products().to_vec(), catalog.categories().to_vec())
                .expect("builtin catalog passes validation");
        assert_eq!(rebuilt.len(), 6);
        assert!(!rebuilt.is_empty());
        assert_eq!(catalog.categories()[0].id, ALL_CATEGORIES);
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(
            ProductCatalog::new(Vec::new(), Vec::new()),
            Err(TraceError::EmptyCatalog)
        ));
        let first = ProductCatalog::builtin().products()[0].clone();
        let err = ProductCatalog::new(vec![first.clone(), first], Vec::new()).unwrap_err();
        assert!(matches!(err, TraceError::DuplicateProduct(id) if id == "FISH001"));
    }

    #[test]
    fn lookup_by_id_and_qr() {
        let catalog = ProductCatalog::builtin();
        assert_eq!(catalog.get_by_id("FISH003").unwrap().id, "FISH003");
        assert!(catalog.get_by_id("fish003").is_none());
        assert!(catalog.get_by_id("FISH999").is_none());
        assert_eq!(
            catalog.get_by_qr_code("TRACE-FISH005-2025").unwrap().id,
            "FISH005"
        );
    }

    #[test]
    fn random_pick_covers_bounds() {
        let catalog = ProductCatalog::builtin();
        let mut rng = SequenceRandom::new([0.0, 0.999]);
        assert_eq!(catalog.get_random(&mut rng).id, "FISH001");
        assert_eq!(catalog.get_random(&mut rng).id, "FISH006");
    }

    #[test]
    fn filter_keeps_catalog_order() {
        let catalog = ProductCatalog::builtin();
        assert_eq!(
            ids(&catalog.filter_by_category("fresh")),
            vec!["FISH001", "FISH003", "FISH006"]
        );
        assert_eq!(ids(&catalog.filter_by_category("gift")), vec!["FISH004"]);
        assert!(catalog.filter_by_category("frozen").is_empty());
        let all: Vec<&Product> = catalog.products().iter().collect();
        assert_eq!(catalog.filter_by_category("all"), all);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let catalog = ProductCatalog::builtin();
        assert_eq!(ids(&catalog.search("KABAYAKI")), vec!["FISH002", "FISH004"]);
        assert_eq!(ids(&catalog.search("jiangxi")), vec!["FISH006"]);
        assert_eq!(ids(&catalog.search("sushi")), vec!["FISH005"]);
        assert!(catalog.search("salmon").is_empty());
    }

    #[test]
    fn empty_search_returns_whole_catalog() {
        let catalog = ProductCatalog::builtin();
        let all: Vec<&Product> = catalog.products().iter().collect();
        assert_eq!(catalog.search(""), all);
        assert_eq!(catalog.search("   "), all);
    }

    #[test]
    fn category_filter_parses_all() {
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("fresh"),
            CategoryFilter::Tag("fresh".into())
        );
    }
}
