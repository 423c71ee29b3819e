//! Storefront catalog: products and the display entities around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;
use super::money::Money;

/// Text shown in both storefront languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Localized {
    pub en: String,
    pub hi: String,
}

impl Localized {
    pub fn validate(&self, field: &str) -> Result<(), DomainError> {
        if self.en.trim().is_empty() {
            return Err(DomainError::invalid(format!("{} (en) is required", field)));
        }
        Ok(())
    }

    /// Hindi falls back to English when left blank.
    pub fn normalized(self) -> Localized {
        let hi = if self.hi.trim().is_empty() {
            self.en.clone()
        } else {
            self.hi
        };
        Localized { en: self.en, hi }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub title: Localized,
    pub description: Option<Localized>,
    #[schema(value_type = f64)]
    pub price: Money,
    pub stock: i32,
    pub category_id: Option<String>,
    pub artisan_id: Option<String>,
    pub featured: bool,
    pub best_seller: bool,
    pub new_arrival: bool,
    pub trending: bool,
    pub rating: f64,
    pub review_count: i32,
    pub view_count: i32,
    pub sales_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub id: Option<String>,
    pub slug: String,
    pub title: Localized,
    pub description: Option<Localized>,
    #[schema(value_type = f64)]
    pub price: Money,
    #[serde(default)]
    pub stock: i32,
    pub category_id: Option<String>,
    pub artisan_id: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub best_seller: bool,
    #[serde(default)]
    pub new_arrival: bool,
    #[serde(default)]
    pub trending: bool,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_slug(&self.slug)?;
        self.title.validate("title")?;
        if !self.price.is_positive() {
            return Err(DomainError::invalid("Price must be greater than zero"));
        }
        if self.stock < 0 {
            return Err(DomainError::invalid("Stock cannot be negative"));
        }
        Ok(())
    }
}

/// Partial product edit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub slug: Option<String>,
    pub title: Option<Localized>,
    pub description: Option<Localized>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Money>,
    pub stock: Option<i32>,
    pub category_id: Option<String>,
    pub artisan_id: Option<String>,
    pub featured: Option<bool>,
    pub best_seller: Option<bool>,
    pub new_arrival: Option<bool>,
    pub trending: Option<bool>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        if let Some(title) = &self.title {
            title.validate("title")?;
        }
        if self.price.as_ref().is_some_and(|p| !p.is_positive()) {
            return Err(DomainError::invalid("Price must be greater than zero"));
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(DomainError::invalid("Stock cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub page: i64,
    pub limit: i64,
}

impl ProductQuery {
    pub fn cache_key(&self) -> String {
        format!(
            "products:c={}:f={}:p={}:l={}",
            self.category.as_deref().unwrap_or("*"),
            self.featured.map(|f| f.to_string()).as_deref().unwrap_or("*"),
            self.page,
            self.limit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
}

// ── Display entities ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name: Localized,
    pub description: Option<Localized>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub id: Option<String>,
    pub slug: String,
    pub name: Localized,
    pub description: Option<Localized>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_slug(&self.slug)?;
        self.name.validate("name")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artisan {
    pub id: String,
    pub slug: String,
    pub name: Localized,
    pub bio: Option<Localized>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanInput {
    pub id: Option<String>,
    pub slug: String,
    pub name: Localized,
    pub bio: Option<Localized>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl ArtisanInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_slug(&self.slug)?;
        self.name.validate("name")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub title: Localized,
    pub subtitle: Option<Localized>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerInput {
    pub id: Option<String>,
    pub title: Localized,
    pub subtitle: Option<Localized>,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl BannerInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        self.title.validate("title")?;
        if self.image_url.trim().is_empty() {
            return Err(DomainError::invalid("imageUrl is required"));
        }
        Ok(())
    }
}

fn active() -> bool {
    true
}

fn validate_slug(slug: &str) -> Result<(), DomainError> {
    let ok = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !ok {
        return Err(DomainError::invalid(
            "Slug may only contain lowercase letters, digits and hyphens",
        ));
    }
    Ok(())
}

/// Identifier for a new catalog row when the caller did not pick one.
pub fn derive_id(prefix: &str, requested: Option<String>, slug: &str) -> String {
    requested
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("{}-{}", prefix, slug))
}
