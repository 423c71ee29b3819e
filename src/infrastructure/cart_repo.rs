use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::domain::shopping::{CartItem, WishlistItem};
use crate::schema::{cart_items, products, wishlist_items};

use super::models::{CartItemRow, WishlistItemRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn ensure_active(conn: &mut PgConnection, product_id: &str) -> Result<(), DomainError> {
    let found = products::table
        .filter(products::id.eq(product_id))
        .filter(products::is_active.eq(true))
        .select(products::id)
        .first::<String>(conn)
        .optional()?;
    found.map(|_| ()).ok_or(DomainError::NotFound("Product"))
}

impl CartRepository for DieselCartRepository {
    fn cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<CartItemRow> = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::created_at.asc())
            .select(CartItemRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    fn add_to_cart(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            ensure_active(conn, product_id)?;
            let row: CartItemRow = diesel::insert_into(cart_items::table)
                .values(&CartItemRow {
                    id: Uuid::new_v4(),
                    user_id,
                    product_id: product_id.to_string(),
                    quantity,
                    created_at: Utc::now(),
                })
                .on_conflict((cart_items::user_id, cart_items::product_id))
                .do_update()
                .set((
                    cart_items::quantity.eq(cart_items::quantity + quantity),
                    cart_items::updated_at.eq(Utc::now()),
                ))
                .returning(CartItemRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
    }

    fn set_cart_quantity(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            ensure_active(conn, product_id)?;
            let row: CartItemRow = diesel::insert_into(cart_items::table)
                .values(&CartItemRow {
                    id: Uuid::new_v4(),
                    user_id,
                    product_id: product_id.to_string(),
                    quantity,
                    created_at: Utc::now(),
                })
                .on_conflict((cart_items::user_id, cart_items::product_id))
                .do_update()
                .set((
                    cart_items::quantity.eq(quantity),
                    cart_items::updated_at.eq(Utc::now()),
                ))
                .returning(CartItemRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
    }

    fn remove_from_cart(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn clear_cart(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id))).execute(&mut conn)?)
    }

    fn wishlist_items(&self, user_id: Uuid) -> Result<Vec<WishlistItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<WishlistItemRow> = wishlist_items::table
            .filter(wishlist_items::user_id.eq(user_id))
            .order(wishlist_items::created_at.desc())
            .select(WishlistItemRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(WishlistItem::from).collect())
    }

    fn add_to_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<WishlistItem, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            ensure_active(conn, product_id)?;
            diesel::insert_into(wishlist_items::table)
                .values(&WishlistItemRow {
                    id: Uuid::new_v4(),
                    user_id,
                    product_id: product_id.to_string(),
                    created_at: Utc::now(),
                })
                .on_conflict((wishlist_items::user_id, wishlist_items::product_id))
                .do_nothing()
                .execute(conn)?;
            let row: WishlistItemRow = wishlist_items::table
                .filter(wishlist_items::user_id.eq(user_id))
                .filter(wishlist_items::product_id.eq(product_id))
                .select(WishlistItemRow::as_select())
                .first(conn)?;
            Ok(row.into())
        })
    }

    fn remove_from_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            wishlist_items::table
                .filter(wishlist_items::user_id.eq(user_id))
                .filter(wishlist_items::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn clear_wishlist(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(diesel::delete(wishlist_items::table.filter(wishlist_items::user_id.eq(user_id)))
            .execute(&mut conn)?)
    }
}
