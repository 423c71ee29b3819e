use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::catalog::{
    Artisan, ArtisanInput, Banner, BannerInput, Category, CategoryInput, Localized, NewProduct,
    Product, ProductPage, ProductPatch, ProductQuery,
};
use crate::domain::errors::DomainError;
use crate::domain::paging;
use crate::domain::ports::{CatalogEntity, CatalogRepository};
use crate::schema::{artisans, banners, categories, products};

use super::models::{
    ArtisanRecord, ArtisanRow, BannerRecord, BannerRow, CategoryRecord, CategoryRow,
    NewProductRow, ProductChangeset, ProductRow,
};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn split(text: Localized) -> (String, String) {
    let text = text.normalized();
    (text.en, text.hi)
}

fn split_optional(text: Option<Localized>) -> (Option<String>, Option<String>) {
    match text {
        Some(text) => {
            let (en, hi) = split(text);
            (Some(en), Some(hi))
        }
        None => (None, None),
    }
}

/// Accepts either a category id or its slug.
fn resolve_category(conn: &mut PgConnection, key: &str) -> QueryResult<String> {
    let id = categories::table
        .filter(categories::slug.eq(key).or(categories::id.eq(key)))
        .select(categories::id)
        .first::<String>(conn)
        .optional()?;
    Ok(id.unwrap_or_else(|| key.to_string()))
}

impl From<CategoryInput> for CategoryRecord {
    fn from(input: CategoryInput) -> Self {
        let (name_en, name_hi) = split(input.name);
        let (description_en, description_hi) = split_optional(input.description);
        CategoryRecord {
            slug: input.slug,
            name_en,
            name_hi,
            description_en,
            description_hi,
            image_url: input.image_url,
            sort_order: input.sort_order,
            is_active: input.is_active,
        }
    }
}

impl From<ArtisanInput> for ArtisanRecord {
    fn from(input: ArtisanInput) -> Self {
        let (name_en, name_hi) = split(input.name);
        let (bio_en, bio_hi) = split_optional(input.bio);
        ArtisanRecord {
            slug: input.slug,
            name_en,
            name_hi,
            bio_en,
            bio_hi,
            location: input.location,
            image_url: input.image_url,
            sort_order: input.sort_order,
            is_active: input.is_active,
        }
    }
}

impl From<BannerInput> for BannerRecord {
    fn from(input: BannerInput) -> Self {
        let (title_en, title_hi) = split(input.title);
        let (subtitle_en, subtitle_hi) = split_optional(input.subtitle);
        BannerRecord {
            title_en,
            title_hi,
            subtitle_en,
            subtitle_hi,
            image_url: input.image_url,
            link_url: input.link_url,
            sort_order: input.sort_order,
            is_active: input.is_active,
        }
    }
}

impl From<ProductPatch> for ProductChangeset {
    fn from(patch: ProductPatch) -> Self {
        let (title_en, title_hi) = match patch.title.map(split) {
            Some((en, hi)) => (Some(en), Some(hi)),
            None => (None, None),
        };
        let (description_en, description_hi) = match patch.description.map(split) {
            Some((en, hi)) => (Some(Some(en)), Some(Some(hi))),
            None => (None, None),
        };
        ProductChangeset {
            slug: patch.slug,
            title_en,
            title_hi,
            description_en,
            description_hi,
            price: patch.price.map(|p| p.into_inner()),
            stock: patch.stock,
            category_id: patch.category_id.map(Some),
            artisan_id: patch.artisan_id.map(Some),
            featured: patch.featured,
            best_seller: patch.best_seller,
            new_arrival: patch.new_arrival,
            trending: patch.trending,
            is_active: patch.is_active,
            updated_at: Some(Utc::now()),
        }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let category = query
                .category
                .as_deref()
                .map(|key| resolve_category(conn, key))
                .transpose()?;

            let mut count = products::table.filter(products::is_active.eq(true)).into_boxed();
            let mut page = products::table.filter(products::is_active.eq(true)).into_boxed();
            if let Some(category) = category {
                count = count.filter(products::category_id.eq(category.clone()));
                page = page.filter(products::category_id.eq(category));
            }
            if let Some(featured) = query.featured {
                count = count.filter(products::featured.eq(featured));
                page = page.filter(products::featured.eq(featured));
            }

            let total: i64 = count.count().get_result(conn)?;
            let rows = page
                .select(ProductRow::as_select())
                .order(products::created_at.desc())
                .limit(query.limit)
                .offset(paging::offset(query.page, query.limit))
                .load(conn)?;

            Ok(ProductPage {
                items: rows.into_iter().map(Product::from).collect(),
                total,
            })
        })
    }

    fn view_product(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(
            products::table
                .filter(products::slug.eq(slug))
                .filter(products::is_active.eq(true)),
        )
        .set(products::view_count.eq(products::view_count + 1))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .optional()?;
        Ok(row.map(Product::from))
    }

    fn create_product(&self, id: String, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let (title_en, title_hi) = split(product.title);
        let (description_en, description_hi) = split_optional(product.description);
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id,
                slug: product.slug,
                title_en,
                title_hi,
                description_en,
                description_hi,
                price: product.price.into_inner(),
                stock: product.stock,
                category_id: product.category_id,
                artisan_id: product.artisan_id,
                featured: product.featured,
                best_seller: product.best_seller,
                new_arrival: product.new_arrival,
                trending: product.trending,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(products::table.filter(products::id.eq(id)))
            .set(&ProductChangeset::from(patch))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .filter(categories::is_active.eq(true))
            .order((categories::sort_order.asc(), categories::id.asc()))
            .select(CategoryRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn create_category(&self, id: String, input: CategoryInput) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(categories::table)
            .values((categories::id.eq(id), CategoryRecord::from(input)))
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_category(&self, id: &str, input: CategoryInput) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(categories::table.filter(categories::id.eq(id)))
            .set((CategoryRecord::from(input), categories::updated_at.eq(Utc::now())))
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn list_artisans(&self) -> Result<Vec<Artisan>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = artisans::table
            .filter(artisans::is_active.eq(true))
            .order((artisans::sort_order.asc(), artisans::id.asc()))
            .select(ArtisanRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Artisan::from).collect())
    }

    fn create_artisan(&self, id: String, input: ArtisanInput) -> Result<Artisan, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(artisans::table)
            .values((artisans::id.eq(id), ArtisanRecord::from(input)))
            .returning(ArtisanRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_artisan(&self, id: &str, input: ArtisanInput) -> Result<Option<Artisan>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(artisans::table.filter(artisans::id.eq(id)))
            .set((ArtisanRecord::from(input), artisans::updated_at.eq(Utc::now())))
            .returning(ArtisanRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Artisan::from))
    }

    fn list_banners(&self) -> Result<Vec<Banner>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = banners::table
            .filter(banners::is_active.eq(true))
            .order((banners::sort_order.asc(), banners::id.asc()))
            .select(BannerRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    fn create_banner(&self, id: String, input: BannerInput) -> Result<Banner, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(banners::table)
            .values((banners::id.eq(id), BannerRecord::from(input)))
            .returning(BannerRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_banner(&self, id: &str, input: BannerInput) -> Result<Option<Banner>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(banners::table.filter(banners::id.eq(id)))
            .set((BannerRecord::from(input), banners::updated_at.eq(Utc::now())))
            .returning(BannerRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Banner::from))
    }

    fn deactivate(&self, entity: CatalogEntity, id: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();
        let updated = match entity {
            CatalogEntity::Product => diesel::update(products::table.filter(products::id.eq(id)))
                .set((products::is_active.eq(false), products::updated_at.eq(now)))
                .execute(&mut conn)?,
            CatalogEntity::Category => diesel::update(categories::table.filter(categories::id.eq(id)))
                .set((categories::is_active.eq(false), categories::updated_at.eq(now)))
                .execute(&mut conn)?,
            CatalogEntity::Artisan => diesel::update(artisans::table.filter(artisans::id.eq(id)))
                .set((artisans::is_active.eq(false), artisans::updated_at.eq(now)))
                .execute(&mut conn)?,
            CatalogEntity::Banner => diesel::update(banners::table.filter(banners::id.eq(id)))
                .set((banners::is_active.eq(false), banners::updated_at.eq(now)))
                .execute(&mut conn)?,
        };
        Ok(updated > 0)
    }
}
