use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::coupon::{self, normalize_code, Redemption};
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::notification::{NotificationKind, OutboxMessage};
use crate::domain::order::{
    estimated_delivery, generate_order_number, CheckoutInput, NewOrder, OrderView,
};
use crate::domain::ports::{Clock, CouponRepository, OrderRepository, UserRepository};
use crate::domain::rbac::{can_access_resource, OwnedResource, Permission};
use crate::domain::templates::{render_email, OrderFacts, TemplateContext};
use crate::domain::user::Caller;

/// Customer-facing order operations.
pub struct CheckoutService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    coupons: Arc<dyn CouponRepository>,
    clock: Arc<dyn Clock>,
    templates: TemplateContext,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        coupons: Arc<dyn CouponRepository>,
        clock: Arc<dyn Clock>,
        templates: TemplateContext,
    ) -> Self {
        Self {
            orders,
            users,
            coupons,
            clock,
            templates,
        }
    }

    /// Validates the cart and persists the order together with its
    /// confirmation email. Delivery of the email happens after commit.
    pub fn place_order(&self, caller: &Caller, input: CheckoutInput) -> Result<OrderView, DomainError> {
        input.validate()?;

        let customer = self
            .users
            .find_by_id(caller.id)?
            .ok_or(DomainError::NotFound("User"))?;

        let now = self.clock.now();
        let redemption = input
            .coupon_code
            .as_deref()
            .map(|code| self.redeem(customer.id, code, &input, now))
            .transpose()?;

        let id = Uuid::new_v4();
        let order_number = generate_order_number(now, &mut rand::thread_rng());
        let delivery_by = estimated_delivery(now);

        let confirmation = render_email(
            NotificationKind::OrderConfirmation,
            &self.templates,
            &OrderFacts {
                customer_name: customer.name.clone(),
                customer_email: customer.email.clone(),
                language: customer.preferred_language,
                order_number: order_number.clone(),
                event_date: now,
                estimated_delivery: delivery_by,
                tracking_number: None,
                shipping_partner: input.shipping_method.clone(),
                delivery_agent: None,
                total_amount: input.total_amount.clone(),
            },
        );
        let outbox = vec![OutboxMessage::email(
            id.to_string(),
            NotificationKind::OrderConfirmation,
            &confirmation,
        )?];

        let order = NewOrder {
            id,
            order_number,
            user_id: customer.id,
            address: input.shipping_address,
            lines: input.items,
            subtotal: input.subtotal,
            shipping_cost: input.shipping_cost,
            tax_amount: Money::zero(),
            discount_amount: input.discount_amount,
            total_amount: input.total_amount,
            payment_method: input.payment_method,
            shipping_method: input.shipping_method,
            coupon: redemption,
            estimated_delivery: delivery_by,
        };

        let created = self.orders.create(order, outbox)?;
        log::info!(
            "Order {} placed by user {} for {}",
            created.order_number,
            customer.id,
            created.total_amount
        );
        Ok(created)
    }

    /// Resolves the coupon for this customer and checks the submitted
    /// discount against what it grants.
    fn redeem(
        &self,
        user_id: Uuid,
        code: &str,
        input: &CheckoutInput,
        now: DateTime<Utc>,
    ) -> Result<Redemption, DomainError> {
        let code = normalize_code(code);
        let coupon = self
            .coupons
            .find_coupon(&code)?
            .ok_or_else(|| DomainError::invalid("Invalid or expired coupon code"))?;
        let used = self.coupons.redemptions_by(coupon.id, user_id)?;
        let discount = coupon::quote(&coupon, used, now, &input.subtotal, &input.shipping_cost)?;
        if discount != input.discount_amount {
            return Err(DomainError::invalid(format!(
                "Discount {} does not match coupon {} ({})",
                input.discount_amount, code, discount
            )));
        }
        Ok(Redemption {
            coupon_id: coupon.id,
            code,
        })
    }

    /// The caller's own orders, newest first.
    pub fn orders_for(&self, caller: &Caller) -> Result<Vec<OrderView>, DomainError> {
        self.orders.list_for_user(caller.id)
    }

    pub fn order_for(&self, caller: &Caller, order_number: &str) -> Result<OrderView, DomainError> {
        let order = self
            .orders
            .find_by_number(order_number)?
            .ok_or(DomainError::NotFound("Order"))?;

        let resource = OwnedResource::order(order.user_id);
        if !can_access_resource(caller.role, caller.id, &resource, Permission::OrdersRead) {
            log::warn!(
                "User {} ({}) denied access to order {}",
                caller.id,
                caller.role,
                order.order_number
            );
            return Err(DomainError::Forbidden("You cannot view this order".into()));
        }
        Ok(order)
    }
}
