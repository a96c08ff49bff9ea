//! Listing import pipeline
//!
//! Normalizes scraped marketplace listings into catalog products. Payloads
//! arrive messy: prices as numbers or strings, variant entries with missing
//! ids or specification maps, image fields of the wrong shape. Everything
//! here is lenient on data and strict on the request envelope.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::catalog::Catalog;
use crate::domain::aggregates::{ImportStatus, Product, Variant};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::Money;
use crate::{Error, Result};

/// NATS subject catalog import events are published on.
pub const IMPORT_SUBJECT: &str = "storefront.catalog.imported";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportRequest {
    #[validate(url)]
    pub source_url: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[validate(length(min = 1))]
    pub images: Vec<String>,
    /// Marketplace price as scraped; reference only.
    #[serde(default)]
    pub price: Value,
    /// Storefront selling price.
    #[serde(default)]
    pub local_price: Value,
    #[serde(default)]
    pub external_id: Option<String>,
    /// Free-form scrape payload whose `variants` array carries the
    /// purchasable configurations.
    #[serde(default)]
    pub specifications: Option<Value>,
}

pub struct Importer {
    catalog: Arc<dyn Catalog>,
    currency: String,
}

impl Importer {
    pub fn new(catalog: Arc<dyn Catalog>, currency: &str) -> Self {
        Self { catalog, currency: currency.to_string() }
    }

    /// Imports one listing, upserting by external id. Every import lands as
    /// a draft with zero stock, re-imports included: a re-scraped listing
    /// keeps its id and slug but goes back through review. Only id, slug
    /// and created-at survive a re-import.
    pub fn import(&self, request: ImportRequest) -> Result<(Product, Vec<DomainEvent>)> {
        request.validate().map_err(|e| Error::InvalidImport(e.to_string()))?;

        let external_id = resolve_external_id(request.external_id.as_deref(), &request.source_url);
        let variants = self.parse_variants(request.specifications.as_ref());
        let selling_price = Money::lenient(&request.local_price, &self.currency);
        let original_price =
            (!request.price.is_null()).then(|| Money::lenient(&request.price, &self.currency));

        let existing = self.catalog.find_by_external_id(&external_id)?;
        let created = existing.is_none();
        let mut product = match existing {
            Some(product) => product,
            None => {
                let slug = self.unique_slug(&request.title)?;
                let mut product = Product::draft(generate_product_id(), request.title.clone(), slug, selling_price.clone());
                product.external_id = Some(external_id.clone());
                product
            }
        };

        product.name = request.title;
        product.description = request.description;
        product.category = request.category;
        product.image = request.images.first().cloned();
        product.images = request.images;
        product.price = selling_price;
        product.original_price = original_price;
        product.source_url = Some(request.source_url);
        product.variants = variants;
        product.stock = 0;
        product.import_status = ImportStatus::Draft;
        product.is_active = true;
        product.touch();

        if created {
            product.raise_event(DomainEvent::Product(ProductEvent::Imported {
                product_id: product.id.clone(),
                external_id: external_id.clone(),
                variant_count: product.variants.len(),
            }));
        } else {
            product.raise_event(DomainEvent::Product(ProductEvent::Updated {
                product_id: product.id.clone(),
            }));
        }

        let events = product.take_events();
        self.catalog.upsert(product.clone())?;
        tracing::info!(
            product_id = %product.id,
            external_id = %external_id,
            variants = product.variants.len(),
            created,
            "listing imported"
        );
        Ok((product, events))
    }

    fn unique_slug(&self, title: &str) -> Result<String> {
        let base = generate_slug(title);
        match self.catalog.find_by_slug(&base)? {
            None => Ok(base),
            Some(_) => Ok(format!("{base}-{}", Utc::now().timestamp_millis())),
        }
    }

    fn parse_variants(&self, specifications: Option<&Value>) -> Vec<Variant> {
        let Some(list) = specifications.and_then(|s| s.get("variants")).and_then(Value::as_array) else {
            return vec![];
        };
        list.iter().filter_map(|raw| self.parse_variant(raw)).collect()
    }

    /// One scraped variant entry: non-objects are dropped, missing ids get
    /// generated, only string specification values are kept.
    fn parse_variant(&self, raw: &Value) -> Option<Variant> {
        let obj = raw.as_object()?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let specifications = obj
            .get("specifications")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        let price = Money::lenient(obj.get("price").unwrap_or(&Value::Null), &self.currency);
        let sku = obj.get("sku").and_then(Value::as_str).map(str::to_string);
        let image = obj.get("image").and_then(Value::as_str).map(str::to_string);
        let images = obj
            .get("images")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        Some(Variant { id, specifications, price, sku, image, images })
    }
}

/// External identity of a listing: the explicit id when the scraper sends
/// one, else whatever the source URL encodes, else a token from the URL.
pub fn resolve_external_id(explicit: Option<&str>, source_url: &str) -> String {
    if let Some(id) = explicit {
        let id = id.trim();
        if !id.is_empty() {
            return id.to_string();
        }
    }
    query_param(source_url, "id")
        .or_else(|| trailing_item_id(source_url))
        .unwrap_or_else(|| encoded_url_id(source_url))
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    for pair in query.split('&') {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if k == name && !v.is_empty() {
            return Some(v.to_string());
        }
    }
    None
}

/// Matches marketplace detail URLs ending in `/<digits>.htm(l)`.
fn trailing_item_id(url: &str) -> Option<String> {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let stem = segment.strip_suffix(".html").or_else(|| segment.strip_suffix(".htm"))?;
    if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
        Some(stem.to_string())
    } else {
        None
    }
}

fn encoded_url_id(url: &str) -> String {
    let encoded = BASE64.encode(url);
    let trimmed = &encoded[..encoded.len().min(50)];
    format!("url-{trimmed}")
}

/// URL slug from a listing title: ASCII alphanumerics and CJK ideographs
/// kept, separator runs collapsed, the rest dropped; a title with nothing
/// usable falls back to a timestamped name.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::new();
    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&c) {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        format!("product-{}", Utc::now().timestamp_millis())
    } else {
        slug.to_string()
    }
}

pub fn generate_product_id() -> String {
    let now = Utc::now();
    format!("PROD-{}-{:06}", now.format("%Y%m%d"), now.timestamp_millis() % 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn importer() -> (Importer, Arc<InMemoryCatalog>) {
        let catalog = Arc::new(InMemoryCatalog::new());
        (Importer::new(catalog.clone(), "TWD"), catalog)
    }

    fn request(url: &str, title: &str) -> ImportRequest {
        ImportRequest {
            source_url: url.into(),
            title: title.into(),
            description: Some("scraped description".into()),
            category: Some("bags".into()),
            images: vec!["img-1.jpg".into(), "img-2.jpg".into()],
            price: json!(36.5),
            local_price: json!("128.50"),
            external_id: None,
            specifications: None,
        }
    }

    #[test]
    fn test_external_id_prefers_explicit() {
        assert_eq!(
            resolve_external_id(Some("abc-123"), "https://market.example/item?id=998877"),
            "abc-123"
        );
        assert_eq!(
            resolve_external_id(Some("  "), "https://market.example/item?id=998877"),
            "998877"
        );
    }

    #[test]
    fn test_external_id_from_query_param() {
        assert_eq!(
            resolve_external_id(None, "https://market.example/detail?spm=a21&id=7654321&skuId=9"),
            "7654321"
        );
    }

    #[test]
    fn test_external_id_from_trailing_path_segment() {
        assert_eq!(
            resolve_external_id(None, "https://market.example/products/123456.html"),
            "123456"
        );
        assert_eq!(
            resolve_external_id(None, "https://market.example/products/123456.htm?from=feed"),
            "123456"
        );
    }

    #[test]
    fn test_external_id_fallback_is_deterministic() {
        let a = resolve_external_id(None, "https://market.example/fancy-listing");
        let b = resolve_external_id(None, "https://market.example/fancy-listing");
        assert_eq!(a, b);
        assert!(a.starts_with("url-"));
        assert!(a.len() <= 54);
    }

    #[test]
    fn test_generate_slug_keeps_cjk_and_collapses_runs() {
        assert_eq!(generate_slug("日本 限定  Tote Bag!"), "日本-限定-tote-bag");
        assert_eq!(generate_slug("Multi--Hyphen   Title"), "multi-hyphen-title");
    }

    #[test]
    fn test_generate_slug_falls_back_when_nothing_usable() {
        assert!(generate_slug("!!! ***").starts_with("product-"));
    }

    #[test]
    fn test_generate_product_id_shape() {
        let id = generate_product_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts[0], "PROD");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
    }

    #[test]
    fn test_import_creates_draft_with_coerced_prices() {
        let (importer, catalog) = importer();
        let (product, events) = importer
            .import(request("https://market.example/item?id=998877", "Canvas Tote"))
            .unwrap();
        assert_eq!(product.external_id.as_deref(), Some("998877"));
        assert_eq!(product.slug, "canvas-tote");
        assert_eq!(product.stock, 0);
        assert!(!product.is_published());
        assert_eq!(product.price.amount(), Decimal::new(12850, 2));
        assert_eq!(product.original_price.as_ref().map(|m| m.amount()), Some(Decimal::new(365, 1)));
        assert_eq!(product.image.as_deref(), Some("img-1.jpg"));
        assert_eq!(events.len(), 1);
        assert!(catalog.get(&product.id).unwrap().is_some());
    }

    #[test]
    fn test_import_tolerates_malformed_variant_entries() {
        let (importer, _) = importer();
        let mut req = request("https://market.example/item?id=5", "Scarf");
        req.specifications = Some(json!({
            "variants": [
                { "id": "v1", "specifications": { "Color": "Red", "Weight": 12 }, "price": "88", "images": ["red.jpg"] },
                { "specifications": null, "price": { "bad": true }, "images": "not-an-array" },
                "junk-entry"
            ]
        }));
        let (product, _) = importer.import(req).unwrap();
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].id, "v1");
        assert_eq!(product.variants[0].specifications.len(), 1);
        assert_eq!(product.variants[0].price.amount(), Decimal::new(88, 0));
        assert_eq!(product.variants[0].images, vec!["red.jpg"]);
        assert!(!product.variants[1].id.is_empty());
        assert!(product.variants[1].specifications.is_empty());
        assert_eq!(product.variants[1].price.amount(), Decimal::ZERO);
        assert!(product.variants[1].images.is_empty());
    }

    #[test]
    fn test_reimport_updates_in_place() {
        let (importer, _) = importer();
        let (first, _) = importer
            .import(request("https://market.example/item?id=998877", "Canvas Tote"))
            .unwrap();

        let mut again = request("https://market.example/item?id=998877", "Canvas Tote (2025)");
        again.local_price = json!(140);
        let (second, events) = importer.import(again).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.slug, first.slug);
        assert_eq!(second.name, "Canvas Tote (2025)");
        assert_eq!(second.price.amount(), Decimal::new(140, 0));
        assert!(matches!(
            events[0],
            DomainEvent::Product(ProductEvent::Updated { .. })
        ));
    }

    #[test]
    fn test_reimport_sends_published_listing_back_to_draft() {
        let (importer, catalog) = importer();
        let (first, _) = importer
            .import(request("https://market.example/item?id=998877", "Canvas Tote"))
            .unwrap();

        let mut live = catalog.get(&first.id).unwrap().unwrap();
        live.stock = 7;
        live.publish().unwrap();
        live.take_events();
        catalog.upsert(live).unwrap();

        let (again, _) = importer
            .import(request("https://market.example/item?id=998877", "Canvas Tote"))
            .unwrap();
        assert_eq!(again.id, first.id);
        assert!(!again.is_published());
        assert_eq!(again.stock, 0);
        assert_eq!(catalog.get(&first.id).unwrap().unwrap().import_status, ImportStatus::Draft);
    }

    #[test]
    fn test_slug_collision_gets_suffix() {
        let (importer, _) = importer();
        let (first, _) = importer
            .import(request("https://market.example/item?id=1", "Canvas Tote"))
            .unwrap();
        let (second, _) = importer
            .import(request("https://market.example/item?id=2", "Canvas Tote"))
            .unwrap();
        assert_eq!(first.slug, "canvas-tote");
        assert_ne!(second.slug, first.slug);
        assert!(second.slug.starts_with("canvas-tote-"));
    }

    #[test]
    fn test_import_rejects_invalid_requests() {
        let (importer, _) = importer();
        let mut bad_url = request("not a url", "Canvas Tote");
        bad_url.external_id = Some("x".into());
        assert!(importer.import(bad_url).is_err());

        let empty_title = request("https://market.example/item?id=9", "");
        assert!(importer.import(empty_title).is_err());

        let mut no_images = request("https://market.example/item?id=9", "Canvas Tote");
        no_images.images.clear();
        assert!(importer.import(no_images).is_err());
    }
}
