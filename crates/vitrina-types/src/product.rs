use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::price::Price;

/// Prefix shared by every generated product id (and the legacy ones).
const ID_PREFIX: &str = "producto_";

/// Unique identifier of a catalog product.
///
/// Generated ids embed a UUID v7, so lexicographic order equals creation
/// order. Ids read from older documents are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Generate a fresh, time-sortable id.
    pub fn generate() -> Self {
        Self(format!("{ID_PREFIX}{}", Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in legacy `producto_<unix seconds>` ids.
    fn legacy_timestamp(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.0.strip_prefix(ID_PREFIX)?.parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Sneakers,
    Clothing,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Sneakers, Category::Clothing];

    /// Payload carried by the category selector button.
    pub fn button_payload(&self) -> String {
        format!("cat_{self}")
    }

    /// Parse a selector payload (`cat_sneakers`, legacy `cat_zapatillas`).
    pub fn from_button_payload(payload: &str) -> Option<Self> {
        payload.strip_prefix("cat_")?.parse().ok()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Sneakers => write!(f, "sneakers"),
            Category::Clothing => write!(f, "clothing"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sneakers" | "zapatillas" => Ok(Category::Sneakers),
            "clothing" | "ropa" => Ok(Category::Clothing),
            other => Err(format!("invalid category: '{other}'")),
        }
    }
}

/// A product field that can be edited after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditField {
    Name,
    Price,
    Description,
    Sizes,
    Category,
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditField::Name => write!(f, "nombre"),
            EditField::Price => write!(f, "precio"),
            EditField::Description => write!(f, "descripcion"),
            EditField::Sizes => write!(f, "tallas"),
            EditField::Category => write!(f, "categoria"),
        }
    }
}

impl FromStr for EditField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nombre" | "name" => Ok(EditField::Name),
            "precio" | "price" => Ok(EditField::Price),
            "descripcion" | "descripción" | "description" => Ok(EditField::Description),
            "tallas" | "sizes" => Ok(EditField::Sizes),
            "categoria" | "categoría" | "category" => Ok(EditField::Category),
            other => Err(format!("invalid field: '{other}'")),
        }
    }
}

/// Kind of a media item attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A product in the catalog.
///
/// Either fully present in the store or absent: partially captured data
/// lives in the wizard draft, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProductRecord")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    pub sizes: String,
    pub category: Category,
    /// Legacy single-image slot: the first accepted image.
    pub primary_media: Option<String>,
    pub extra_images: Vec<String>,
    pub videos: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Display name of the admin who created the product.
    pub created_by: Option<String>,
    /// Fields written by other tools, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Product {
    /// Number of images (primary + extra).
    pub fn image_count(&self) -> usize {
        usize::from(self.primary_media.is_some()) + self.extra_images.len()
    }

    pub fn media_count(&self) -> usize {
        self.image_count() + self.videos.len()
    }

    /// All image URLs in submission order.
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.primary_media
            .iter()
            .chain(self.extra_images.iter())
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Persisted record (current and legacy shapes)
// ---------------------------------------------------------------------------

/// One string or a list of strings (the legacy `imagen`/`video` fields).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Lenient on-disk representation of a product.
///
/// Accepts the canonical camelCase shape as well as the Spanish keys written
/// by earlier versions of the bot (`nombre`, `precio`, `imagen`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<serde_json::Value>,
    pub description: Option<String>,
    pub sizes: Option<String>,
    pub category: Option<String>,
    pub primary_media: Option<String>,
    #[serde(default)]
    pub extra_images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    pub created_at: Option<String>,
    pub created_by: Option<String>,

    // Legacy keys.
    nombre: Option<String>,
    precio: Option<serde_json::Value>,
    descripcion: Option<String>,
    tallas: Option<String>,
    categoria: Option<String>,
    imagen: Option<OneOrMany>,
    video: Option<OneOrMany>,
    fecha: Option<String>,
    #[serde(rename = "agregado_por")]
    agregado_por: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProductRecord {
    /// Whether the record carried a price that could not be interpreted.
    pub fn has_unreadable_price(&self) -> bool {
        match self.price.as_ref().or(self.precio.as_ref()) {
            Some(value) => price_from_json(value).is_none(),
            None => false,
        }
    }

    /// Convert into a canonical product, using `fallback_id` when the record
    /// carries no id of its own.
    pub fn into_product(self, fallback_id: impl FnOnce() -> String) -> Product {
        let id = ProductId(
            self.id
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(fallback_id),
        );

        let price = self
            .price
            .or(self.precio)
            .as_ref()
            .and_then(price_from_json)
            .unwrap_or(Price::ZERO);

        let category = self
            .category
            .or(self.categoria)
            .and_then(|c| c.parse().ok())
            .unwrap_or_default();

        let mut images: Vec<String> = Vec::new();
        images.extend(self.primary_media.filter(|s| !s.trim().is_empty()));
        images.extend(self.imagen.map(OneOrMany::into_vec).unwrap_or_default());
        images.extend(self.extra_images);
        let mut images = images.into_iter();
        let primary_media = images.next();
        let extra_images: Vec<String> = images.collect();

        let mut videos = self.videos;
        videos.extend(self.video.map(OneOrMany::into_vec).unwrap_or_default());

        let created_at = self
            .created_at
            .or(self.fecha)
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| id.legacy_timestamp())
            .unwrap_or(DateTime::UNIX_EPOCH);

        Product {
            name: self.name.or(self.nombre).unwrap_or_default(),
            price,
            description: self.description.or(self.descripcion).unwrap_or_default(),
            sizes: self.sizes.or(self.tallas).unwrap_or_default(),
            category,
            primary_media,
            extra_images,
            videos,
            created_at,
            created_by: self
                .created_by
                .or(self.agregado_por)
                .filter(|s| !s.trim().is_empty()),
            extra: self.extra,
            id,
        }
    }
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        record.into_product(|| ProductId::generate().0)
    }
}

fn price_from_json(value: &serde_json::Value) -> Option<Price> {
    match value {
        serde_json::Value::String(s) => Price::parse_stored(s).ok(),
        serde_json::Value::Number(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// Parse RFC 3339 timestamps, or naive ISO timestamps interpreted as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
