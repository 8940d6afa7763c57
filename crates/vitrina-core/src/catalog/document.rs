//! Codec for the persisted catalog document.
//!
//! The canonical document is a JSON array of products, newest first. Older
//! bot versions wrote Spanish keys and, at times, an object keyed by product
//! id; both are accepted on read and normalized on the next write.

use serde_json::Value;
use vitrina_types::error::DocumentError;
use vitrina_types::product::{Product, ProductId, ProductRecord};

/// Products decoded from a document, plus what had to be patched up.
#[derive(Debug, Default)]
pub struct DecodedCatalog {
    pub products: Vec<Product>,
    /// Products whose stored price could not be read and was set to zero.
    pub unreadable_prices: Vec<ProductId>,
    /// Entries that were not JSON objects and were dropped.
    pub skipped: usize,
}

/// Decode a catalog document.
///
/// Blank input is an empty catalog. Anything that is not JSON, or JSON that
/// is neither an array nor an object, is an error.
pub fn decode(contents: &str) -> Result<DecodedCatalog, DocumentError> {
    if contents.trim().is_empty() {
        return Ok(DecodedCatalog::default());
    }
    let root: Value =
        serde_json::from_str(contents).map_err(|e| DocumentError::Malformed(e.to_string()))?;

    let entries: Vec<(Value, String)> = match root {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, format!("prod_{i}")))
            .collect(),
        Value::Object(map) => map.into_iter().map(|(k, v)| (v, k)).collect(),
        Value::Null => return Err(DocumentError::UnexpectedShape("null")),
        Value::Bool(_) => return Err(DocumentError::UnexpectedShape("a boolean")),
        Value::Number(_) => return Err(DocumentError::UnexpectedShape("a number")),
        Value::String(_) => return Err(DocumentError::UnexpectedShape("a string")),
    };

    let mut decoded = DecodedCatalog::default();
    for (value, fallback_id) in entries {
        if !value.is_object() {
            decoded.skipped += 1;
            continue;
        }
        let record: ProductRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(_) => {
                decoded.skipped += 1;
                continue;
            }
        };
        let unreadable = record.has_unreadable_price();
        let product = record.into_product(|| fallback_id);
        if unreadable {
            decoded.unreadable_prices.push(product.id.clone());
        }
        decoded.products.push(product);
    }
    Ok(decoded)
}

/// Sort newest first; ties broken by id, also descending.
pub fn sort_newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Render products as the canonical document: a pretty-printed array in
/// write order with a trailing newline.
pub fn encode(mut products: Vec<Product>) -> Result<String, DocumentError> {
    sort_newest_first(&mut products);
    let mut rendered = serde_json::to_string_pretty(&products)
        .map_err(|e| DocumentError::Malformed(e.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}
