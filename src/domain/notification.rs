//! Customer notifications and the outbox rows that carry them.
//!
//! Messages are rendered when the business write happens and stored as JSON
//! next to it; delivery happens after commit and may be retried.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::OrderStatus;
use super::user::Language;

pub const ORDER_AGGREGATE: &str = "Order";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Push,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Push => "push",
        }
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "push" => Ok(Channel::Push),
            other => Err(DomainError::Internal(format!("unknown channel '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    OrderConfirmation,
    OrderShipped,
    OrderOutForDelivery,
    OrderDelivered,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderConfirmation => "order_confirmation",
            NotificationKind::OrderShipped => "order_shipped",
            NotificationKind::OrderOutForDelivery => "order_out_for_delivery",
            NotificationKind::OrderDelivered => "order_delivered",
        }
    }

    /// The customer-facing notification for a status, if that status has one.
    pub fn for_status(status: OrderStatus) -> Option<NotificationKind> {
        match status {
            OrderStatus::Shipped => Some(NotificationKind::OrderShipped),
            OrderStatus::OutForDelivery => Some(NotificationKind::OrderOutForDelivery),
            OrderStatus::Delivered => Some(NotificationKind::OrderDelivered),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_confirmation" => Ok(NotificationKind::OrderConfirmation),
            "order_shipped" => Ok(NotificationKind::OrderShipped),
            "order_out_for_delivery" => Ok(NotificationKind::OrderOutForDelivery),
            "order_delivered" => Ok(NotificationKind::OrderDelivered),
            other => Err(DomainError::Internal(format!(
                "unknown notification kind '{}'",
                other
            ))),
        }
    }
}

/// Storefront the deployment is skinned as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Brand {
    #[default]
    Pachmarhi,
    Lettex,
    SoniFashion,
}

impl Brand {
    pub fn short_name(&self, language: Language) -> &'static str {
        match (self, language) {
            (Brand::Pachmarhi, Language::En) => "Pachmarhi",
            (Brand::Pachmarhi, Language::Hi) => "पचमढ़ी",
            (Brand::Lettex, Language::En) => "Lettex",
            (Brand::Lettex, Language::Hi) => "लेटेक्स",
            (Brand::SoniFashion, Language::En) => "Soni Fashion",
            (Brand::SoniFashion, Language::Hi) => "सोनी फैशन",
        }
    }

    pub fn marketplace_name(&self, language: Language) -> &'static str {
        match (self, language) {
            (Brand::Pachmarhi, Language::En) => "Pachmarhi Tribal Art Marketplace",
            (Brand::Pachmarhi, Language::Hi) => "पचमढ़ी जनजातीय कला बाजार",
            (Brand::Lettex, Language::En) => "Lettex Marketplace",
            (Brand::Lettex, Language::Hi) => "लेटेक्स बाजार",
            (Brand::SoniFashion, Language::En) => "Soni Fashion Store",
            (Brand::SoniFashion, Language::Hi) => "सोनी फैशन स्टोर",
        }
    }
}

impl FromStr for Brand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pachmarhi" => Ok(Brand::Pachmarhi),
            "lettex" => Ok(Brand::Lettex),
            "soni" | "soni_fashion" => Ok(Brand::SoniFashion),
            other => Err(format!("unknown store brand '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub click_target: String,
}

/// A notification queued for delivery alongside the write that caused it.
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub aggregate_id: String,
    pub channel: Channel,
    pub kind: NotificationKind,
    pub recipient: String,
    pub payload: serde_json::Value,
}

impl OutboxMessage {
    pub fn email(
        aggregate_id: impl Into<String>,
        kind: NotificationKind,
        message: &EmailMessage,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id: aggregate_id.into(),
            channel: Channel::Email,
            kind,
            recipient: message.to.clone(),
            payload: to_payload(message)?,
        })
    }

    /// Push messages are addressed to the customer account, not a device.
    pub fn push(
        aggregate_id: impl Into<String>,
        kind: NotificationKind,
        recipient: Uuid,
        message: &PushMessage,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id: aggregate_id.into(),
            channel: Channel::Push,
            kind,
            recipient: recipient.to_string(),
            payload: to_payload(message)?,
        })
    }
}

fn to_payload<T: Serialize>(message: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(message).map_err(|e| DomainError::Internal(e.to_string()))
}

/// An undelivered outbox row as read back for dispatch.
#[derive(Debug, Clone)]
pub struct PendingNotification {
    pub id: Uuid,
    pub aggregate_id: String,
    pub channel: Channel,
    pub kind: NotificationKind,
    pub recipient: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn merge(self, other: DispatchReport) -> DispatchReport {
        DispatchReport {
            sent: self.sent + other.sent,
            failed: self.failed + other.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_shipping_statuses_have_a_notification() {
        assert_eq!(
            NotificationKind::for_status(OrderStatus::Shipped),
            Some(NotificationKind::OrderShipped)
        );
        assert_eq!(NotificationKind::for_status(OrderStatus::Processing), None);
        assert_eq!(NotificationKind::for_status(OrderStatus::Cancelled), None);
    }

    #[test]
    fn brand_codes() {
        assert_eq!("Lettex".parse::<Brand>().unwrap(), Brand::Lettex);
        assert_eq!("soni".parse::<Brand>().unwrap(), Brand::SoniFashion);
        assert!("acme".parse::<Brand>().is_err());
    }

    #[test]
    fn push_outbox_row_is_addressed_to_the_account() {
        let user = Uuid::new_v4();
        let msg = PushMessage {
            title: "Order Shipped".into(),
            body: "Your order #ORD-1 has been shipped!".into(),
            tag: "order-shipped-ORD-1".into(),
            click_target: "/track-order?orderNumber=ORD-1".into(),
        };
        let row = OutboxMessage::push("ORD-1", NotificationKind::OrderShipped, user, &msg).unwrap();
        assert_eq!(row.channel, Channel::Push);
        assert_eq!(row.recipient, user.to_string());
        assert_eq!(row.payload["click_target"], "/track-order?orderNumber=ORD-1");
    }
}
