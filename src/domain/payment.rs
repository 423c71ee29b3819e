use chrono::{DateTime, Utc};

use super::money::Money;
use super::order::PaymentMethod;

/// One charge attempt against a gateway.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: Money,
    /// Order number or id the charge is made for.
    pub reference: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub payment_id: Option<String>,
}

impl PaymentOutcome {
    pub fn succeeded(transaction_id: String, payment_id: Option<String>) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id),
            payment_id,
        }
    }

    /// The identifier recorded on the order once paid.
    pub fn recorded_id(&self) -> Option<&str> {
        self.payment_id
            .as_deref()
            .or(self.transaction_id.as_deref())
    }
}

/// A client's claim that a payment went through.
#[derive(Debug, Clone)]
pub struct VerificationClaim {
    pub payment_id: String,
    pub order_reference: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub reference: String,
    pub method: PaymentMethod,
    pub amount: Money,
    pub outcome: PaymentOutcome,
    pub estimated_delivery: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayReport {
    pub razorpay_configured: bool,
    pub stripe_configured: bool,
}
