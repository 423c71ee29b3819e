//! In-memory port implementations shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::catalog::{
    Artisan, ArtisanInput, Banner, BannerInput, Category, CategoryInput, Localized, NewProduct,
    Product, ProductPage, ProductPatch, ProductQuery,
};
use crate::domain::coupon::{Coupon, CouponKind, NewCoupon};
use crate::domain::errors::DomainError;
use crate::domain::inbox::{InboxNotification, InboxPage, InboxQuery, NewInboxNotification};
use crate::domain::money::Money;
use crate::domain::notification::{EmailMessage, OutboxMessage, PendingNotification, PushMessage};
use crate::domain::paging;
use crate::domain::order::{
    generate_order_number, verify_subtotal, ListResult, NewOrder, OrderFilter, OrderItemView,
    OrderStatus, OrderUpdate, OrderView, PaymentMethod, PaymentStatus, PricedLine,
};
use crate::domain::ports::{
    CartRepository, CatalogEntity, CatalogRepository, Clock, CouponRepository, EmailSender,
    InboxRepository, OrderRepository, OutboxRepository, PasswordHasher, PushSender,
    UserRepository,
};
use crate::domain::shopping::{CartItem, WishlistItem};
use crate::domain::user::{Caller, FailedLogin, Language, NewUser, Role, UserAccount};

// ── Clock ────────────────────────────────────────────────────────────────────

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── Senders and hasher ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EmailSender for RecordingEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("smtp unavailable".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPushSender {
    sent: Mutex<Vec<(String, PushMessage)>>,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl RecordingPushSender {
    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl PushSender for RecordingPushSender {
    fn send(&self, recipient: &str, message: &PushMessage) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("push service unavailable".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        Ok(())
    }
}

/// Reversible "hash" so tests skip argon2's cost.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        Ok(hash == format!("plain:{}", password))
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct OutboxEntry {
    row: PendingNotification,
    dispatched_at: Option<DateTime<Utc>>,
    claimed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

#[derive(Clone, Default)]
struct State {
    users: Vec<UserAccount>,
    security_events: Vec<(Option<Uuid>, String)>,
    products: Vec<Product>,
    categories: Vec<Category>,
    artisans: Vec<Artisan>,
    banners: Vec<Banner>,
    orders: Vec<OrderView>,
    outbox: Vec<OutboxEntry>,
    cart: Vec<CartItem>,
    wishlist: Vec<WishlistItem>,
    coupons: Vec<Coupon>,
    /// (coupon, user, order)
    redemptions: Vec<(Uuid, Uuid, Uuid)>,
    inbox: Vec<InboxNotification>,
}

impl State {
    fn order_mut(&mut self, id: Uuid) -> Result<&mut OrderView, DomainError> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound("Order"))
    }

    fn user_mut(&mut self, id: Uuid) -> Result<&mut UserAccount, DomainError> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::NotFound("User"))
    }

    fn active_product(&self, id: &str) -> Result<(), DomainError> {
        if self.products.iter().any(|p| p.id == id && p.is_active) {
            Ok(())
        } else {
            Err(DomainError::NotFound("Product"))
        }
    }

    fn enqueue(&mut self, messages: Vec<OutboxMessage>) {
        self.outbox.extend(messages.into_iter().map(|m| OutboxEntry {
            row: PendingNotification {
                id: m.id,
                aggregate_id: m.aggregate_id,
                channel: m.channel,
                kind: m.kind,
                recipient: m.recipient,
                payload: m.payload,
                attempts: 0,
            },
            dispatched_at: None,
            claimed_at: None,
            last_error: None,
        }));
    }
}

/// Every repository port over one mutex-guarded state. Multi-step writes
/// work on a copy that replaces the state only when every step succeeded.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    listing_queries: AtomicUsize,
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

impl InMemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn transaction<T>(&self, f: impl FnOnce(&mut State) -> Result<T, DomainError>) -> Result<T, DomainError> {
        let mut guard = self.state();
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        *guard = draft;
        Ok(value)
    }

    pub fn add_user(&self, role: Role) -> Caller {
        let mut state = self.state();
        let n = state.users.len() + 1;
        let account = UserAccount {
            id: Uuid::new_v4(),
            email: format!("user{}@example.com", n),
            name: format!("User {}", n),
            phone: None,
            password_hash: "plain:unused".into(),
            role,
            preferred_language: Language::En,
            failed_login_attempts: 0,
            locked_until: None,
            mfa_enabled: false,
            last_login_at: None,
            created_at: fixed_time(),
        };
        let caller = Caller {
            id: account.id,
            role,
            email: account.email.clone(),
            name: account.name.clone(),
        };
        state.users.push(account);
        caller
    }

    pub fn user(&self, id: Uuid) -> UserAccount {
        self.state()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .expect("user exists")
    }

    pub fn security_events(&self, user_id: Uuid) -> Vec<String> {
        self.state()
            .security_events
            .iter()
            .filter(|(id, _)| *id == Some(user_id))
            .map(|(_, kind)| kind.clone())
            .collect()
    }

    pub fn add_product(&self, id: &str, price: i64, stock: i32) {
        self.state().products.push(Product {
            id: id.into(),
            slug: id.into(),
            title: Localized {
                en: format!("Product {}", id),
                hi: format!("उत्पाद {}", id),
            },
            description: None,
            price: Money::from_rupees(price),
            stock,
            category_id: None,
            artisan_id: None,
            featured: false,
            best_seller: false,
            new_arrival: false,
            trending: false,
            rating: 0.0,
            review_count: 0,
            view_count: 0,
            sales_count: 0,
            is_active: true,
            created_at: fixed_time(),
        });
    }

    pub fn product(&self, id: &str) -> Product {
        self.state()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("product exists")
    }

    pub fn product_stock(&self, id: &str) -> i32 {
        self.product(id).stock
    }

    /// How many times the product listing was read from the store.
    pub fn listing_queries(&self) -> usize {
        self.listing_queries.load(Ordering::SeqCst)
    }

    /// A pending cash-on-delivery order for 899.00 with one line.
    pub fn seed_order(&self, owner: &Caller) -> OrderView {
        let id = Uuid::new_v4();
        let now = fixed_time();
        let order = OrderView {
            id,
            order_number: generate_order_number(now, &mut rand::thread_rng()),
            user_id: owner.id,
            subtotal: Money::from_rupees(899),
            shipping_cost: Money::zero(),
            tax_amount: Money::zero(),
            discount_amount: Money::zero(),
            total_amount: Money::from_rupees(899),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cod,
            payment_id: None,
            coupon_code: None,
            shipping_address: "Asha Verma, 12 Arera Colony, Bhopal, Madhya Pradesh - 462001".into(),
            shipping_method: None,
            estimated_delivery: now + Duration::days(7),
            tracking_number: None,
            delivery_agent_name: None,
            delivery_agent_phone: None,
            created_at: now,
            updated_at: now,
            items: vec![OrderItemView {
                id: Uuid::new_v4(),
                product_id: "prod-001".into(),
                product_name: "Gond Painting".into(),
                price: Money::from_rupees(899),
                quantity: 1,
                total: Money::from_rupees(899),
            }],
        };
        self.state().orders.push(order.clone());
        order
    }

    pub fn find_order(&self, id: Uuid) -> OrderView {
        self.state()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .expect("order exists")
    }

    pub fn order_count(&self) -> usize {
        self.state().orders.len()
    }

    pub fn enqueue(&self, message: OutboxMessage) {
        self.state().enqueue(vec![message]);
    }

    /// Undelivered rows of one aggregate, whatever their attempt count.
    pub fn outbox_for(&self, aggregate_id: &str) -> Vec<PendingNotification> {
        self.state()
            .outbox
            .iter()
            .filter(|e| e.row.aggregate_id == aggregate_id && e.dispatched_at.is_none())
            .map(|e| e.row.clone())
            .collect()
    }

    pub fn all_outbox(&self) -> Vec<PendingNotification> {
        self.state().outbox.iter().map(|e| e.row.clone()).collect()
    }

    /// A live coupon valid through 2026, one use per customer.
    pub fn add_coupon(&self, code: &str, kind: CouponKind, value: i64) -> Coupon {
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: code.into(),
            title: format!("{} offer", code),
            description: None,
            kind,
            value: Money::from_rupees(value),
            min_order_value: None,
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            user_limit: 1,
            is_active: true,
            start_date: fixed_time(),
            end_date: Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap(),
            created_at: fixed_time(),
        };
        self.state().coupons.push(coupon.clone());
        coupon
    }

    pub fn set_coupon_usage(&self, code: &str, usage_limit: Option<i32>, used_count: i32) {
        let mut state = self.state();
        let coupon = state
            .coupons
            .iter_mut()
            .find(|c| c.code == code)
            .expect("coupon exists");
        coupon.usage_limit = usage_limit;
        coupon.used_count = used_count;
    }

    pub fn coupon(&self, code: &str) -> Coupon {
        self.state()
            .coupons
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .expect("coupon exists")
    }
}

impl OrderRepository for InMemoryStore {
    fn create(&self, order: NewOrder, outbox: Vec<OutboxMessage>) -> Result<OrderView, DomainError> {
        self.transaction(|state| {
            let priced = order
                .lines
                .iter()
                .map(|line| {
                    let product = state
                        .products
                        .iter()
                        .find(|p| p.id == line.product_id && p.is_active)
                        .ok_or_else(|| {
                            DomainError::invalid(format!("Product '{}' is not available", line.product_id))
                        })?;
                    Ok(PricedLine {
                        product_id: product.id.clone(),
                        product_name: product.title.en.clone(),
                        unit_price: product.price.clone(),
                        quantity: line.quantity,
                    })
                })
                .collect::<Result<Vec<_>, DomainError>>()?;
            verify_subtotal(&priced, &order.subtotal)?;

            if let Some(redemption) = &order.coupon {
                let coupon = state
                    .coupons
                    .iter_mut()
                    .find(|c| c.id == redemption.coupon_id)
                    .filter(|c| c.usage_limit.map_or(true, |limit| c.used_count < limit))
                    .ok_or_else(|| DomainError::invalid("Coupon usage limit reached"))?;
                coupon.used_count += 1;
                state
                    .redemptions
                    .push((redemption.coupon_id, order.user_id, order.id));
            }

            for line in &priced {
                let product = state
                    .products
                    .iter_mut()
                    .find(|p| p.id == line.product_id && p.stock >= line.quantity)
                    .ok_or_else(|| {
                        DomainError::invalid(format!("Insufficient stock for product '{}'", line.product_id))
                    })?;
                product.stock -= line.quantity;
                product.sales_count += line.quantity;
            }

            let now = Utc::now();
            let view = OrderView {
                id: order.id,
                order_number: order.order_number.clone(),
                user_id: order.user_id,
                subtotal: order.subtotal.clone(),
                shipping_cost: order.shipping_cost.clone(),
                tax_amount: order.tax_amount.clone(),
                discount_amount: order.discount_amount.clone(),
                total_amount: order.total_amount.clone(),
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Pending,
                payment_method: order.payment_method,
                payment_id: None,
                coupon_code: order.coupon.as_ref().map(|c| c.code.clone()),
                shipping_address: order.address.one_line(),
                shipping_method: order.shipping_method.clone(),
                estimated_delivery: order.estimated_delivery,
                tracking_number: None,
                delivery_agent_name: None,
                delivery_agent_phone: None,
                created_at: now,
                updated_at: now,
                items: priced
                    .iter()
                    .map(|line| OrderItemView {
                        id: Uuid::new_v4(),
                        product_id: line.product_id.clone(),
                        product_name: line.product_name.clone(),
                        price: line.unit_price.clone(),
                        quantity: line.quantity,
                        total: line.total(),
                    })
                    .collect(),
            };
            if state.orders.iter().any(|o| o.order_number == view.order_number) {
                return Err(DomainError::invalid("Duplicate value: order_number"));
            }
            state.orders.push(view.clone());
            state.cart.retain(|item| {
                item.user_id != order.user_id
                    || !priced.iter().any(|line| line.product_id == item.product_id)
            });
            state.enqueue(outbox);
            Ok(view)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.state().orders.iter().find(|o| o.id == id).cloned())
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        Ok(self
            .state()
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        Ok(self
            .state()
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError> {
        let state = self.state();
        let matching: Vec<&OrderView> = state
            .orders
            .iter()
            .rev()
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .collect();
        let skip = paging::offset(filter.page, filter.limit) as usize;
        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(skip)
                .take(filter.limit.max(0) as usize)
                .cloned()
                .collect(),
        })
    }

    fn apply_update(
        &self,
        id: Uuid,
        update: &OrderUpdate,
        outbox: Vec<OutboxMessage>,
    ) -> Result<(), DomainError> {
        self.transaction(|state| {
            let order = state.order_mut(id)?;
            *order = update.project(order);
            order.updated_at = Utc::now();
            state.enqueue(outbox);
            Ok(())
        })
    }

    fn confirm_payment(&self, id: Uuid, payment_id: &str) -> Result<(), DomainError> {
        self.transaction(|state| {
            let order = state.order_mut(id)?;
            order.payment_status = PaymentStatus::Paid;
            order.status = OrderStatus::Confirmed;
            order.payment_id = Some(payment_id.to_string());
            Ok(())
        })
    }
}

impl UserRepository for InMemoryStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.state().users.iter().find(|u| u.email == email).cloned())
    }

    fn create(&self, user: NewUser) -> Result<UserAccount, DomainError> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::invalid("Duplicate value: email"));
        }
        let account = UserAccount {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            password_hash: user.password_hash,
            role: user.role,
            preferred_language: user.preferred_language,
            failed_login_attempts: 0,
            locked_until: None,
            mfa_enabled: false,
            last_login_at: None,
            created_at: fixed_time(),
        };
        state.users.push(account.clone());
        Ok(account)
    }

    fn list_admins(&self) -> Result<Vec<Caller>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| u.role.is_staff_admin())
            .map(|u| Caller {
                id: u.id,
                role: u.role,
                email: u.email.clone(),
                name: u.name.clone(),
            })
            .collect())
    }

    fn record_login_failure(&self, id: Uuid, failure: FailedLogin) -> Result<(), DomainError> {
        let mut state = self.state();
        let user = state.user_mut(id)?;
        user.failed_login_attempts = failure.attempts;
        user.locked_until = failure.locked_until;
        Ok(())
    }

    fn record_login_success(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.state();
        let user = state.user_mut(id)?;
        user.failed_login_attempts = 0;
        user.locked_until = None;
        user.last_login_at = Some(at);
        Ok(())
    }

    fn clear_lock(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state();
        let user = state.user_mut(id)?;
        user.failed_login_attempts = 0;
        user.locked_until = None;
        Ok(())
    }

    fn record_security_event(
        &self,
        user_id: Option<Uuid>,
        event_type: &str,
        _details: serde_json::Value,
    ) -> Result<(), DomainError> {
        self.state()
            .security_events
            .push((user_id, event_type.to_string()));
        Ok(())
    }
}

impl OutboxRepository for InMemoryStore {
    fn pending_for_aggregate(
        &self,
        aggregate_id: &str,
        max_attempts: i32,
    ) -> Result<Vec<PendingNotification>, DomainError> {
        Ok(self
            .state()
            .outbox
            .iter()
            .filter(|e| {
                e.row.aggregate_id == aggregate_id
                    && e.dispatched_at.is_none()
                    && e.row.attempts < max_attempts
            })
            .map(|e| e.row.clone())
            .collect())
    }

    fn pending(&self, limit: i64, max_attempts: i32) -> Result<Vec<PendingNotification>, DomainError> {
        Ok(self
            .state()
            .outbox
            .iter()
            .filter(|e| e.dispatched_at.is_none() && e.row.attempts < max_attempts)
            .take(limit.max(0) as usize)
            .map(|e| e.row.clone())
            .collect())
    }

    fn claim(&self, id: Uuid, now: DateTime<Utc>, lease: Duration) -> Result<bool, DomainError> {
        let mut state = self.state();
        let Some(entry) = state.outbox.iter_mut().find(|e| e.row.id == id) else {
            return Ok(false);
        };
        let free = entry.claimed_at.map_or(true, |at| at < now - lease);
        if entry.dispatched_at.is_some() || !free {
            return Ok(false);
        }
        entry.claimed_at = Some(now);
        Ok(true)
    }

    fn mark_dispatched(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.state();
        if let Some(entry) = state.outbox.iter_mut().find(|e| e.row.id == id) {
            entry.dispatched_at = Some(at);
            entry.last_error = None;
        }
        Ok(())
    }

    fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        let mut state = self.state();
        if let Some(entry) = state.outbox.iter_mut().find(|e| e.row.id == id) {
            entry.row.attempts += 1;
            entry.last_error = Some(error.to_string());
            entry.claimed_at = None;
        }
        Ok(())
    }
}

impl CartRepository for InMemoryStore {
    fn cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        Ok(self
            .state()
            .cart
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    fn add_to_cart(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError> {
        let mut state = self.state();
        state.active_product(product_id)?;
        if let Some(item) = state
            .cart
            .iter_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            item.quantity += quantity;
            return Ok(item.clone());
        }
        let item = CartItem {
            id: Uuid::new_v4(),
            user_id,
            product_id: product_id.into(),
            quantity,
            created_at: Utc::now(),
        };
        state.cart.push(item.clone());
        Ok(item)
    }

    fn set_cart_quantity(&self, user_id: Uuid, product_id: &str, quantity: i32) -> Result<CartItem, DomainError> {
        let mut state = self.state();
        state.active_product(product_id)?;
        if let Some(item) = state
            .cart
            .iter_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            item.quantity = quantity;
            return Ok(item.clone());
        }
        let item = CartItem {
            id: Uuid::new_v4(),
            user_id,
            product_id: product_id.into(),
            quantity,
            created_at: Utc::now(),
        };
        state.cart.push(item.clone());
        Ok(item)
    }

    fn remove_from_cart(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.cart.len();
        state
            .cart
            .retain(|i| !(i.user_id == user_id && i.product_id == product_id));
        Ok(state.cart.len() < before)
    }

    fn clear_cart(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.state();
        let before = state.cart.len();
        state.cart.retain(|i| i.user_id != user_id);
        Ok(before - state.cart.len())
    }

    fn wishlist_items(&self, user_id: Uuid) -> Result<Vec<WishlistItem>, DomainError> {
        Ok(self
            .state()
            .wishlist
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    fn add_to_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<WishlistItem, DomainError> {
        let mut state = self.state();
        state.active_product(product_id)?;
        if let Some(item) = state
            .wishlist
            .iter()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            return Ok(item.clone());
        }
        let item = WishlistItem {
            id: Uuid::new_v4(),
            user_id,
            product_id: product_id.into(),
            created_at: Utc::now(),
        };
        state.wishlist.push(item.clone());
        Ok(item)
    }

    fn remove_from_wishlist(&self, user_id: Uuid, product_id: &str) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.wishlist.len();
        state
            .wishlist
            .retain(|i| !(i.user_id == user_id && i.product_id == product_id));
        Ok(state.wishlist.len() < before)
    }

    fn clear_wishlist(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.state();
        let before = state.wishlist.len();
        state.wishlist.retain(|i| i.user_id != user_id);
        Ok(before - state.wishlist.len())
    }
}

impl CouponRepository for InMemoryStore {
    fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        Ok(self.state().coupons.iter().find(|c| c.code == code).cloned())
    }

    fn list_live_coupons(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>, DomainError> {
        Ok(self
            .state()
            .coupons
            .iter()
            .rev()
            .filter(|c| c.is_live(now))
            .cloned()
            .collect())
    }

    fn create_coupon(&self, id: Uuid, coupon: NewCoupon) -> Result<Coupon, DomainError> {
        let mut state = self.state();
        if state.coupons.iter().any(|c| c.code == coupon.code) {
            return Err(DomainError::invalid("Duplicate value: coupon code"));
        }
        let created = Coupon {
            id,
            code: coupon.code,
            title: coupon.title,
            description: coupon.description,
            kind: coupon.kind,
            value: coupon.value,
            min_order_value: coupon.min_order_value,
            max_discount: coupon.max_discount,
            usage_limit: coupon.usage_limit,
            used_count: 0,
            user_limit: coupon.user_limit,
            is_active: coupon.is_active,
            start_date: coupon.start_date,
            end_date: coupon.end_date,
            created_at: Utc::now(),
        };
        state.coupons.push(created.clone());
        Ok(created)
    }

    fn redemptions_by(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64, DomainError> {
        Ok(self
            .state()
            .redemptions
            .iter()
            .filter(|(c, u, _)| *c == coupon_id && *u == user_id)
            .count() as i64)
    }
}

impl InboxRepository for InMemoryStore {
    fn list_notifications(&self, user_id: Uuid, query: &InboxQuery) -> Result<InboxPage, DomainError> {
        let state = self.state();
        let matching: Vec<&InboxNotification> = state
            .inbox
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && !(query.unread_only && n.read))
            .collect();
        Ok(InboxPage {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(query.offset.max(0) as usize)
                .take(query.limit.max(0) as usize)
                .cloned()
                .collect(),
        })
    }

    fn create_notification(
        &self,
        user_id: Uuid,
        notification: NewInboxNotification,
    ) -> Result<InboxNotification, DomainError> {
        let created = InboxNotification {
            id: Uuid::new_v4(),
            user_id,
            kind: notification.kind_or_default(),
            title: notification.title,
            message: notification.message,
            read: false,
            reference_id: notification.reference_id,
            reference_type: notification.reference_type,
            created_at: Utc::now(),
        };
        self.state().inbox.push(created.clone());
        Ok(created)
    }

    fn set_read(&self, user_id: Uuid, ids: &[Uuid], read: bool) -> Result<usize, DomainError> {
        let mut state = self.state();
        let mut changed = 0;
        for n in state
            .inbox
            .iter_mut()
            .filter(|n| n.user_id == user_id && ids.contains(&n.id))
        {
            n.read = read;
            changed += 1;
        }
        Ok(changed)
    }

    fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.state();
        let mut changed = 0;
        for n in state
            .inbox
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    fn delete_notifications(&self, user_id: Uuid, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut state = self.state();
        let before = state.inbox.len();
        state
            .inbox
            .retain(|n| !(n.user_id == user_id && ids.contains(&n.id)));
        Ok(before - state.inbox.len())
    }
}

fn normalized(text: Option<Localized>) -> Option<Localized> {
    text.map(Localized::normalized)
}

impl CatalogRepository for InMemoryStore {
    fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, DomainError> {
        self.listing_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        let category = query.category.as_deref().map(|key| {
            state
                .categories
                .iter()
                .find(|c| c.slug == key || c.id == key)
                .map_or(key.to_string(), |c| c.id.clone())
        });
        let matching: Vec<&Product> = state
            .products
            .iter()
            .rev()
            .filter(|p| p.is_active)
            .filter(|p| category.is_none() || p.category_id == category)
            .filter(|p| query.featured.map_or(true, |f| p.featured == f))
            .collect();
        let skip = paging::offset(query.page, query.limit) as usize;
        Ok(ProductPage {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(skip)
                .take(query.limit.max(0) as usize)
                .cloned()
                .collect(),
        })
    }

    fn view_product(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let mut state = self.state();
        Ok(state
            .products
            .iter_mut()
            .find(|p| p.slug == slug && p.is_active)
            .map(|p| {
                p.view_count += 1;
                p.clone()
            }))
    }

    fn create_product(&self, id: String, product: NewProduct) -> Result<Product, DomainError> {
        let mut state = self.state();
        if state.products.iter().any(|p| p.id == id || p.slug == product.slug) {
            return Err(DomainError::invalid("Duplicate value: product"));
        }
        let created = Product {
            id,
            slug: product.slug,
            title: product.title.normalized(),
            description: normalized(product.description),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            artisan_id: product.artisan_id,
            featured: product.featured,
            best_seller: product.best_seller,
            new_arrival: product.new_arrival,
            trending: product.trending,
            rating: 0.0,
            review_count: 0,
            view_count: 0,
            sales_count: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        state.products.push(created.clone());
        Ok(created)
    }

    fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, DomainError> {
        let mut state = self.state();
        let Some(p) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(slug) = patch.slug {
            p.slug = slug;
        }
        if let Some(title) = patch.title {
            p.title = title.normalized();
        }
        if let Some(description) = patch.description {
            p.description = Some(description.normalized());
        }
        if let Some(price) = patch.price {
            p.price = price;
        }
        if let Some(stock) = patch.stock {
            p.stock = stock;
        }
        if let Some(category_id) = patch.category_id {
            p.category_id = Some(category_id);
        }
        if let Some(artisan_id) = patch.artisan_id {
            p.artisan_id = Some(artisan_id);
        }
        p.featured = patch.featured.unwrap_or(p.featured);
        p.best_seller = patch.best_seller.unwrap_or(p.best_seller);
        p.new_arrival = patch.new_arrival.unwrap_or(p.new_arrival);
        p.trending = patch.trending.unwrap_or(p.trending);
        p.is_active = patch.is_active.unwrap_or(p.is_active);
        Ok(Some(p.clone()))
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut items: Vec<Category> = self
            .state()
            .categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn create_category(&self, id: String, input: CategoryInput) -> Result<Category, DomainError> {
        let mut state = self.state();
        if state.categories.iter().any(|c| c.id == id || c.slug == input.slug) {
            return Err(DomainError::invalid("Duplicate value: category"));
        }
        let category = category_from(id, input);
        state.categories.push(category.clone());
        Ok(category)
    }

    fn update_category(&self, id: &str, input: CategoryInput) -> Result<Option<Category>, DomainError> {
        let mut state = self.state();
        Ok(state.categories.iter_mut().find(|c| c.id == id).map(|c| {
            *c = category_from(id.to_string(), input);
            c.clone()
        }))
    }

    fn list_artisans(&self) -> Result<Vec<Artisan>, DomainError> {
        let mut items: Vec<Artisan> = self
            .state()
            .artisans
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn create_artisan(&self, id: String, input: ArtisanInput) -> Result<Artisan, DomainError> {
        let mut state = self.state();
        if state.artisans.iter().any(|a| a.id == id || a.slug == input.slug) {
            return Err(DomainError::invalid("Duplicate value: artisan"));
        }
        let artisan = artisan_from(id, input);
        state.artisans.push(artisan.clone());
        Ok(artisan)
    }

    fn update_artisan(&self, id: &str, input: ArtisanInput) -> Result<Option<Artisan>, DomainError> {
        let mut state = self.state();
        Ok(state.artisans.iter_mut().find(|a| a.id == id).map(|a| {
            *a = artisan_from(id.to_string(), input);
            a.clone()
        }))
    }

    fn list_banners(&self) -> Result<Vec<Banner>, DomainError> {
        let mut items: Vec<Banner> = self
            .state()
            .banners
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn create_banner(&self, id: String, input: BannerInput) -> Result<Banner, DomainError> {
        let mut state = self.state();
        if state.banners.iter().any(|b| b.id == id) {
            return Err(DomainError::invalid("Duplicate value: banner"));
        }
        let banner = banner_from(id, input);
        state.banners.push(banner.clone());
        Ok(banner)
    }

    fn update_banner(&self, id: &str, input: BannerInput) -> Result<Option<Banner>, DomainError> {
        let mut state = self.state();
        Ok(state.banners.iter_mut().find(|b| b.id == id).map(|b| {
            *b = banner_from(id.to_string(), input);
            b.clone()
        }))
    }

    fn deactivate(&self, entity: CatalogEntity, id: &str) -> Result<bool, DomainError> {
        let mut state = self.state();
        let flag = match entity {
            CatalogEntity::Product => state.products.iter_mut().find(|p| p.id == id).map(|p| &mut p.is_active),
            CatalogEntity::Category => state.categories.iter_mut().find(|c| c.id == id).map(|c| &mut c.is_active),
            CatalogEntity::Artisan => state.artisans.iter_mut().find(|a| a.id == id).map(|a| &mut a.is_active),
            CatalogEntity::Banner => state.banners.iter_mut().find(|b| b.id == id).map(|b| &mut b.is_active),
        };
        Ok(match flag {
            Some(active) => {
                *active = false;
                true
            }
            None => false,
        })
    }
}

fn category_from(id: String, input: CategoryInput) -> Category {
    Category {
        id,
        slug: input.slug,
        name: input.name.normalized(),
        description: normalized(input.description),
        image_url: input.image_url,
        sort_order: input.sort_order,
        is_active: input.is_active,
    }
}

fn artisan_from(id: String, input: ArtisanInput) -> Artisan {
    Artisan {
        id,
        slug: input.slug,
        name: input.name.normalized(),
        bio: normalized(input.bio),
        location: input.location,
        image_url: input.image_url,
        sort_order: input.sort_order,
        is_active: input.is_active,
    }
}

fn banner_from(id: String, input: BannerInput) -> Banner {
    Banner {
        id,
        title: input.title.normalized(),
        subtitle: normalized(input.subtitle),
        image_url: input.image_url,
        link_url: input.link_url,
        sort_order: input.sort_order,
        is_active: input.is_active,
    }
}

pub mod fixture {
    use std::sync::Arc;

    use chrono::Duration;

    use super::{InMemoryStore, ManualClock, PlainHasher, RecordingEmailSender, RecordingPushSender};
    use crate::application::auth_service::AuthService;
    use crate::application::catalog_service::CatalogService;
    use crate::application::checkout_service::CheckoutService;
    use crate::application::coupon_service::CouponService;
    use crate::application::inbox_service::InboxService;
    use crate::application::notification_dispatcher::NotificationDispatcher;
    use crate::application::order_status_service::OrderStatusService;
    use crate::application::payment_service::PaymentService;
    use crate::application::shopping_service::ShoppingService;
    use crate::domain::notification::Brand;
    use crate::domain::ports::{Clock, TokenIssuer};
    use crate::domain::templates::TemplateContext;
    use crate::domain::user::Caller;
    use crate::infrastructure::jwt::JwtTokenIssuer;
    use crate::infrastructure::payment_gateways::{CashOnDelivery, Razorpay, Stripe};
    use crate::state::AppState;

    pub const TOKEN_SECRET: &str = "test-secret";

    pub fn templates() -> TemplateContext {
        TemplateContext {
            brand: Brand::Pachmarhi,
            base_url: "https://pachmarhi.example".into(),
        }
    }

    /// Application services wired over one store, as `main` wires them over Postgres.
    pub struct Harness {
        pub store: Arc<InMemoryStore>,
        pub clock: Arc<ManualClock>,
        pub email: Arc<RecordingEmailSender>,
        pub push: Arc<RecordingPushSender>,
        pub state: AppState,
    }

    impl Harness {
        pub fn new() -> Self {
            let store = Arc::new(InMemoryStore::default());
            let clock = Arc::new(ManualClock::default());
            let email = Arc::new(RecordingEmailSender::default());
            let push = Arc::new(RecordingPushSender::default());
            let tokens = Arc::new(JwtTokenIssuer::new(
                TOKEN_SECRET,
                Duration::minutes(15),
                clock.clone(),
            ));

            let state = AppState {
                auth: AuthService::new(store.clone(), Arc::new(PlainHasher), tokens, clock.clone()),
                checkout: CheckoutService::new(
                    store.clone(),
                    store.clone(),
                    store.clone(),
                    clock.clone(),
                    templates(),
                ),
                order_status: OrderStatusService::new(
                    store.clone(),
                    store.clone(),
                    clock.clone(),
                    templates(),
                ),
                payments: PaymentService::new(
                    Arc::new(CashOnDelivery),
                    Arc::new(Razorpay::new(None)),
                    Arc::new(Stripe::new(None)),
                    store.clone(),
                    clock.clone(),
                ),
                catalog: CatalogService::new(store.clone(), Duration::minutes(5), 256, clock.clone()),
                shopping: ShoppingService::new(store.clone()),
                coupons: CouponService::new(store.clone(), clock.clone()),
                inbox: InboxService::new(store.clone()),
                notifications: NotificationDispatcher::new(
                    store.clone(),
                    email.clone(),
                    push.clone(),
                    clock.clone(),
                    5,
                ),
            };

            Harness {
                store,
                clock,
                email,
                push,
                state,
            }
        }

        pub fn token_for(&self, caller: &Caller) -> String {
            JwtTokenIssuer::new(TOKEN_SECRET, Duration::minutes(15), self.clock.clone())
                .issue(caller, self.clock.now())
                .expect("token")
        }
    }
}
