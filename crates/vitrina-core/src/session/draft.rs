//! The partially captured product held by a wizard session.
//!
//! The current wizard step is never stored: it is derived from which draft
//! fields are still missing, in canonical order. That single derivation
//! drives prompting, input routing and skip.

use chrono::{DateTime, Utc};
use vitrina_types::error::ValidationError;
use vitrina_types::price::Price;
use vitrina_types::product::{Category, MediaKind, Product, ProductId};
use vitrina_types::reply::WizardStep;

/// Minimum product name length, in characters, after trimming.
pub const MIN_NAME_CHARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub description: Option<String>,
    pub sizes: Option<String>,
    pub category: Option<Category>,
    pub primary_media: Option<String>,
    pub extra_images: Vec<String>,
    pub videos: Vec<String>,
    /// Set once the admin closes the media loop.
    pub media_done: bool,
}

impl ProductDraft {
    /// The first step whose field is still missing.
    pub fn next_step(&self) -> WizardStep {
        if self.name.is_none() {
            WizardStep::Name
        } else if self.price.is_none() {
            WizardStep::Price
        } else if self.description.is_none() {
            WizardStep::Description
        } else if self.sizes.is_none() {
            WizardStep::Sizes
        } else if self.category.is_none() {
            WizardStep::Category
        } else if !self.media_done {
            WizardStep::Media
        } else {
            WizardStep::Finalize
        }
    }

    /// Fill the first missing field with its default.
    ///
    /// Refused at `Name` and `Price`, which have no default. A no-op once the
    /// draft is complete.
    pub fn skip(&mut self) -> Result<WizardStep, WizardStep> {
        match self.next_step() {
            step @ (WizardStep::Name | WizardStep::Price) => return Err(step),
            WizardStep::Description => self.description = Some(String::new()),
            WizardStep::Sizes => self.sizes = Some(String::new()),
            WizardStep::Category => self.category = Some(Category::default()),
            WizardStep::Media => self.media_done = true,
            WizardStep::Finalize => {}
        }
        Ok(self.next_step())
    }

    pub fn set_name(&mut self, input: &str) -> Result<(), ValidationError> {
        self.name = Some(validate_name(input)?);
        Ok(())
    }

    pub fn set_price(&mut self, input: &str) -> Result<(), ValidationError> {
        self.price = Some(Price::parse_input(input)?);
        Ok(())
    }

    pub fn image_count(&self) -> usize {
        usize::from(self.primary_media.is_some()) + self.extra_images.len()
    }

    pub fn media_count(&self) -> usize {
        self.image_count() + self.videos.len()
    }

    /// Append one media item, primary slot first. Refused beyond `limit`.
    pub fn push_media(
        &mut self,
        kind: MediaKind,
        url: String,
        limit: usize,
    ) -> Result<(), ValidationError> {
        if self.media_count() >= limit {
            return Err(ValidationError::MediaLimitReached(limit));
        }
        self.add_media(kind, url);
        Ok(())
    }

    /// Append one media URL without checking the cap: the first image fills
    /// `primary_media`, later ones go to `extra_images`.
    pub fn add_media(&mut self, kind: MediaKind, url: String) {
        match kind {
            MediaKind::Video => self.videos.push(url),
            MediaKind::Image if self.primary_media.is_none() => self.primary_media = Some(url),
            MediaKind::Image => self.extra_images.push(url),
        }
    }

    /// Assemble the final product. `None` while name or price is missing;
    /// every other field falls back to its default.
    pub fn into_product(
        self,
        id: ProductId,
        created_at: DateTime<Utc>,
        created_by: Option<String>,
    ) -> Option<Product> {
        Some(Product {
            id,
            name: self.name?,
            price: self.price?,
            description: self.description.unwrap_or_default(),
            sizes: self.sizes.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            primary_media: self.primary_media,
            extra_images: self.extra_images,
            videos: self.videos,
            created_at,
            created_by,
            extra: Default::default(),
        })
    }
}

/// Trim and check the minimum length of a product name.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::NameTooShort {
            min: MIN_NAME_CHARS,
        });
    }
    Ok(name.to_string())
}
