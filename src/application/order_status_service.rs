use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::{NotificationKind, OutboxMessage};
use crate::domain::order::{ListResult, OrderFilter, OrderStatus, OrderUpdate, OrderView};
use crate::domain::ports::{Clock, OrderRepository, UserRepository};
use crate::domain::templates::{render_email, render_push, OrderFacts, TemplateContext};
use crate::domain::user::UserAccount;

/// Back-office order management.
pub struct OrderStatusService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    templates: TemplateContext,
}

impl OrderStatusService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        templates: TemplateContext,
    ) -> Self {
        Self {
            orders,
            users,
            clock,
            templates,
        }
    }

    pub fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError> {
        self.orders.list(filter)
    }

    pub fn get(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.orders
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    /// Applies an admin edit. Any status may be set regardless of the current
    /// one. Shipping-leg statuses queue one push and one email for the owner.
    pub fn update(&self, id: Uuid, update: OrderUpdate) -> Result<OrderView, DomainError> {
        if update.is_empty() {
            return Err(DomainError::invalid("Nothing to update"));
        }

        let current = self.get(id)?;
        let projected = update.project(&current);

        let mut outbox = Vec::new();
        if let Some(kind) = update.status.and_then(NotificationKind::for_status) {
            match self.users.find_by_id(current.user_id)? {
                Some(customer) => outbox = self.customer_notifications(kind, &customer, &projected)?,
                None => log::warn!(
                    "Order {} has no customer account; skipping {} notifications",
                    current.order_number,
                    kind
                ),
            }
        }

        self.orders.apply_update(id, &update, outbox)?;

        let updated = self
            .orders
            .find_by_id(id)?
            .ok_or_else(|| DomainError::Internal("Failed to fetch updated order".into()))?;

        if let Some(status) = update.status {
            self.announce_to_admins(&updated, status);
        }
        Ok(updated)
    }

    fn customer_notifications(
        &self,
        kind: NotificationKind,
        customer: &UserAccount,
        order: &OrderView,
    ) -> Result<Vec<OutboxMessage>, DomainError> {
        let aggregate_id = order.id.to_string();
        let mut messages = Vec::with_capacity(2);

        if let Some(push) = render_push(kind, customer.preferred_language, &order.order_number) {
            messages.push(OutboxMessage::push(&*aggregate_id, kind, customer.id, &push)?);
        }

        let facts = OrderFacts {
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            language: customer.preferred_language,
            order_number: order.order_number.clone(),
            event_date: self.clock.now(),
            estimated_delivery: order.estimated_delivery,
            tracking_number: order.tracking_number.clone(),
            shipping_partner: order.shipping_method.clone(),
            delivery_agent: order.delivery_agent_name.clone(),
            total_amount: order.total_amount.clone(),
        };
        let email = render_email(kind, &self.templates, &facts);
        messages.push(OutboxMessage::email(aggregate_id, kind, &email)?);

        Ok(messages)
    }

    // Admin notifications are not persisted; the intent is logged only.
    fn announce_to_admins(&self, order: &OrderView, status: OrderStatus) {
        match self.users.list_admins() {
            Ok(admins) => {
                for admin in admins {
                    log::info!(
                        "Admin notification for {} ({}): Order {} status updated to {}",
                        admin.name,
                        admin.email,
                        order.order_number,
                        status
                    );
                }
            }
            Err(e) => log::warn!("Could not list admins for order {}: {}", order.order_number, e),
        }
    }
}
