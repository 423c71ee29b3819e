use std::sync::Arc;

use chrono::Duration;

use crate::domain::catalog::{
    derive_id, Artisan, ArtisanInput, Banner, BannerInput, Category, CategoryInput, NewProduct,
    Product, ProductPage, ProductPatch, ProductQuery,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogEntity, CatalogRepository, Clock};

use super::cache::TtlCache;

/// Storefront reads and back-office edits of the catalog. Product listings
/// are served from a TTL cache that every product write clears.
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    listings: TtlCache<ProductPage>,
}

impl CatalogService {
    pub fn new(
        repo: Arc<dyn CatalogRepository>,
        listing_ttl: Duration,
        listing_capacity: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            listings: TtlCache::new(listing_ttl, listing_capacity, clock),
        }
    }

    pub fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, DomainError> {
        let key = query.cache_key();
        if let Some(page) = self.listings.get(&key) {
            log::debug!("Product listing cache hit for {}", key);
            return Ok(page);
        }
        let page = self.repo.list_products(query)?;
        self.listings.insert(key, page.clone());
        Ok(page)
    }

    /// Forgets cached listings, e.g. after a checkout moved stock.
    pub fn invalidate_listings(&self) {
        self.listings.clear();
    }

    /// Drops expired listings; called from the periodic maintenance tick.
    pub fn purge_expired_listings(&self) -> usize {
        self.listings.purge_expired()
    }

    pub fn product(&self, slug: &str) -> Result<Product, DomainError> {
        self.repo
            .view_product(slug)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn create_product(&self, mut input: NewProduct) -> Result<Product, DomainError> {
        input.validate()?;
        let id = derive_id("prod", input.id.take(), &input.slug);
        let product = self.repo.create_product(id, input)?;
        self.listings.clear();
        log::info!("Product {} created", product.id);
        Ok(product)
    }

    pub fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product, DomainError> {
        patch.validate()?;
        let product = self
            .repo
            .update_product(id, patch)?
            .ok_or(DomainError::NotFound("Product"))?;
        self.listings.clear();
        Ok(product)
    }

    pub fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories()
    }

    pub fn create_category(&self, mut input: CategoryInput) -> Result<Category, DomainError> {
        input.validate()?;
        let id = derive_id("cat", input.id.take(), &input.slug);
        self.repo.create_category(id, input)
    }

    pub fn update_category(&self, id: &str, input: CategoryInput) -> Result<Category, DomainError> {
        input.validate()?;
        let category = self
            .repo
            .update_category(id, input)?
            .ok_or(DomainError::NotFound("Category"))?;
        // Listings filter on category slugs.
        self.listings.clear();
        Ok(category)
    }

    pub fn artisans(&self) -> Result<Vec<Artisan>, DomainError> {
        self.repo.list_artisans()
    }

    pub fn create_artisan(&self, mut input: ArtisanInput) -> Result<Artisan, DomainError> {
        input.validate()?;
        let id = derive_id("artisan", input.id.take(), &input.slug);
        self.repo.create_artisan(id, input)
    }

    pub fn update_artisan(&self, id: &str, input: ArtisanInput) -> Result<Artisan, DomainError> {
        input.validate()?;
        self.repo
            .update_artisan(id, input)?
            .ok_or(DomainError::NotFound("Artisan"))
    }

    pub fn banners(&self) -> Result<Vec<Banner>, DomainError> {
        self.repo.list_banners()
    }

    pub fn create_banner(&self, mut input: BannerInput) -> Result<Banner, DomainError> {
        input.validate()?;
        let slug = slug_of(&input.title.en);
        let id = derive_id("banner", input.id.take(), &slug);
        self.repo.create_banner(id, input)
    }

    pub fn update_banner(&self, id: &str, input: BannerInput) -> Result<Banner, DomainError> {
        input.validate()?;
        self.repo
            .update_banner(id, input)?
            .ok_or(DomainError::NotFound("Banner"))
    }

    /// Soft delete: the row stays but drops out of every storefront read.
    pub fn remove(&self, entity: CatalogEntity, id: &str) -> Result<(), DomainError> {
        if !self.repo.deactivate(entity, id)? {
            return Err(DomainError::NotFound(entity_name(entity)));
        }
        if matches!(entity, CatalogEntity::Product | CatalogEntity::Category) {
            self.listings.clear();
        }
        log::info!("{} {} deactivated", entity_name(entity), id);
        Ok(())
    }
}

fn entity_name(entity: CatalogEntity) -> &'static str {
    match entity {
        CatalogEntity::Product => "Product",
        CatalogEntity::Category => "Category",
        CatalogEntity::Artisan => "Artisan",
        CatalogEntity::Banner => "Banner",
    }
}

/// Banners have no slug of their own; one is derived from the English title.
fn slug_of(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
