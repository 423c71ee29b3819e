use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::domain::shopping::{unit_count, CartItem, WishlistItem};

/// A customer's saved cart and wishlist.
pub struct ShoppingService {
    repo: Arc<dyn CartRepository>,
}

fn product_key(product_id: &str) -> Result<&str, DomainError> {
    let id = product_id.trim();
    if id.is_empty() {
        return Err(DomainError::invalid("Product ID is required"));
    }
    Ok(id)
}

impl ShoppingService {
    pub fn new(repo: Arc<dyn CartRepository>) -> Self {
        Self { repo }
    }

    pub fn cart(&self, user_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        self.repo.cart_items(user_id)
    }

    pub fn add_to_cart(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError> {
        if product_id.trim().is_empty() || quantity < 1 {
            return Err(DomainError::invalid("Product ID and quantity are required"));
        }
        self.repo.add_to_cart(user_id, product_id.trim(), quantity)
    }

    /// Sets a line's quantity. Zero or less removes the line and yields `None`.
    pub fn update_cart(
        &self,
        user_id: Uuid,
        product_id: &str,
        quantity: i32,
    ) -> Result<Option<CartItem>, DomainError> {
        let product_id = product_key(product_id)?;
        if quantity <= 0 {
            self.repo.remove_from_cart(user_id, product_id)?;
            return Ok(None);
        }
        self.repo.set_cart_quantity(user_id, product_id, quantity).map(Some)
    }

    pub fn remove_from_cart(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError> {
        self.repo.remove_from_cart(user_id, product_key(product_id)?)
    }

    pub fn cart_count(&self, user_id: Uuid) -> Result<i64, DomainError> {
        Ok(unit_count(&self.repo.cart_items(user_id)?))
    }

    pub fn clear_cart(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let removed = self.repo.clear_cart(user_id)?;
        log::debug!("Cleared {} cart line(s) for {}", removed, user_id);
        Ok(removed)
    }

    pub fn wishlist(&self, user_id: Uuid) -> Result<Vec<WishlistItem>, DomainError> {
        self.repo.wishlist_items(user_id)
    }

    pub fn add_to_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<WishlistItem, DomainError> {
        self.repo.add_to_wishlist(user_id, product_key(product_id)?)
    }

    pub fn remove_from_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError> {
        self.repo.remove_from_wishlist(user_id, product_key(product_id)?)
    }

    pub fn wishlist_count(&self, user_id: Uuid) -> Result<usize, DomainError> {
        Ok(self.repo.wishlist_items(user_id)?.len())
    }

    pub fn clear_wishlist(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.repo.clear_wishlist(user_id)
    }
}
