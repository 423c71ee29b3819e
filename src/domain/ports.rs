use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::catalog::{
    Artisan, ArtisanInput, Banner, BannerInput, Category, CategoryInput, NewProduct, Product,
    ProductPage, ProductPatch, ProductQuery,
};
use super::coupon::{Coupon, NewCoupon};
use super::errors::DomainError;
use super::inbox::{InboxNotification, InboxPage, InboxQuery, NewInboxNotification};
use super::notification::{EmailMessage, OutboxMessage, PendingNotification, PushMessage};
use super::order::{ListResult, NewOrder, OrderFilter, OrderUpdate, OrderView, PaymentMethod};
use super::payment::{ChargeRequest, PaymentOutcome, VerificationClaim};
use super::shopping::{CartItem, WishlistItem};
use super::user::{Caller, FailedLogin, NewUser, UserAccount};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists the order with its address, items, stock movements, first
    /// history entry, coupon redemption and `outbox` rows, and drops the
    /// ordered products from the customer's cart, all or nothing.
    fn create(&self, order: NewOrder, outbox: Vec<OutboxMessage>) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError>;
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
    fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError>;
    /// Applies an admin edit and queues its notifications in one transaction.
    fn apply_update(
        &self,
        id: Uuid,
        update: &OrderUpdate,
        outbox: Vec<OutboxMessage>,
    ) -> Result<(), DomainError>;
    /// Marks the order paid and confirmed.
    fn confirm_payment(&self, id: Uuid, payment_id: &str) -> Result<(), DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError>;
    fn create(&self, user: NewUser) -> Result<UserAccount, DomainError>;
    fn list_admins(&self) -> Result<Vec<Caller>, DomainError>;
    fn record_login_failure(&self, id: Uuid, failure: FailedLogin) -> Result<(), DomainError>;
    fn record_login_success(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    fn clear_lock(&self, id: Uuid) -> Result<(), DomainError>;
    fn record_security_event(
        &self,
        user_id: Option<Uuid>,
        event_type: &str,
        details: serde_json::Value,
    ) -> Result<(), DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, DomainError>;
    /// Looks up an active product and counts the view.
    fn view_product(&self, slug: &str) -> Result<Option<Product>, DomainError>;
    fn create_product(&self, id: String, product: NewProduct) -> Result<Product, DomainError>;
    fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, DomainError>;

    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn create_category(&self, id: String, input: CategoryInput) -> Result<Category, DomainError>;
    fn update_category(&self, id: &str, input: CategoryInput) -> Result<Option<Category>, DomainError>;

    fn list_artisans(&self) -> Result<Vec<Artisan>, DomainError>;
    fn create_artisan(&self, id: String, input: ArtisanInput) -> Result<Artisan, DomainError>;
    fn update_artisan(&self, id: &str, input: ArtisanInput) -> Result<Option<Artisan>, DomainError>;

    fn list_banners(&self) -> Result<Vec<Banner>, DomainError>;
    fn create_banner(&self, id: String, input: BannerInput) -> Result<Banner, DomainError>;
    fn update_banner(&self, id: &str, input: BannerInput) -> Result<Option<Banner>, DomainError>;

    /// Soft delete. Returns false when no such row exists.
    fn deactivate(&self, entity: CatalogEntity, id: &str) -> Result<bool, DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntity {
    Product,
    Category,
    Artisan,
    Banner,
}

/// Cart and wishlist lines, keyed by user and product.
pub trait CartRepository: Send + Sync + 'static {
    fn cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>, DomainError>;
    /// Adds units to the line, creating it when absent. Unknown or inactive
    /// products are `NotFound`.
    fn add_to_cart(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError>;
    /// Sets the line's quantity, creating it when absent.
    fn set_cart_quantity(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError>;
    fn remove_from_cart(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError>;
    fn clear_cart(&self, user_id: Uuid) -> Result<usize, DomainError>;

    fn wishlist_items(&self, user_id: Uuid) -> Result<Vec<WishlistItem>, DomainError>;
    /// Returns the existing line when the product is already listed.
    fn add_to_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<WishlistItem, DomainError>;
    fn remove_from_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError>;
    fn clear_wishlist(&self, user_id: Uuid) -> Result<usize, DomainError>;
}

pub trait CouponRepository: Send + Sync + 'static {
    /// Looks up a normalized (upper-case) code.
    fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError>;
    /// Active coupons inside their validity window, newest first.
    fn list_live_coupons(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>, DomainError>;
    fn create_coupon(&self, id: Uuid, coupon: NewCoupon) -> Result<Coupon, DomainError>;
    fn redemptions_by(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64, DomainError>;
}

/// In-app notifications. Every operation is scoped to one user's rows.
pub trait InboxRepository: Send + Sync + 'static {
    fn list_notifications(&self, user_id: Uuid, query: &InboxQuery) -> Result<InboxPage, DomainError>;
    fn create_notification(
        &self,
        user_id: Uuid,
        notification: NewInboxNotification,
    ) -> Result<InboxNotification, DomainError>;
    /// Returns how many rows changed.
    fn set_read(&self, user_id: Uuid, ids: &[Uuid], read: bool) -> Result<usize, DomainError>;
    fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError>;
    fn delete_notifications(&self, user_id: Uuid, ids: &[Uuid]) -> Result<usize, DomainError>;
}

pub trait OutboxRepository: Send + Sync + 'static {
    fn pending_for_aggregate(
        &self,
        aggregate_id: &str,
        max_attempts: i32,
    ) -> Result<Vec<PendingNotification>, DomainError>;
    fn pending(&self, limit: i64, max_attempts: i32) -> Result<Vec<PendingNotification>, DomainError>;
    /// Takes the row for delivery. False when it was already sent or another
    /// worker claimed it less than `lease` ago.
    fn claim(&self, id: Uuid, now: DateTime<Utc>, lease: Duration) -> Result<bool, DomainError>;
    fn mark_dispatched(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError>;
}

pub trait EmailSender: Send + Sync + 'static {
    fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}

pub trait PushSender: Send + Sync + 'static {
    fn send(&self, recipient: &str, message: &PushMessage) -> Result<(), DomainError>;
}

pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, DomainError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}

pub trait TokenIssuer: Send + Sync + 'static {
    fn issue(&self, caller: &Caller, now: DateTime<Utc>) -> Result<String, DomainError>;
    fn verify(&self, token: &str) -> Result<Caller, DomainError>;
}

pub trait PaymentGateway: Send + Sync + 'static {
    fn method(&self) -> PaymentMethod;
    /// Whether real provider credentials are present.
    fn is_configured(&self) -> bool;
    fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, DomainError>;
    fn verify(&self, claim: &VerificationClaim) -> Result<bool, DomainError>;
}
