//! Stand-ins for the card and UPI providers. None of them talk to a network;
//! with credentials absent they return `MOCK_` transaction ids.

use crate::domain::errors::DomainError;
use crate::domain::order::PaymentMethod;
use crate::domain::payment::{ChargeRequest, PaymentOutcome, VerificationClaim};
use crate::domain::ports::PaymentGateway;

pub struct CashOnDelivery;

impl PaymentGateway for CashOnDelivery {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Cod
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, DomainError> {
        let transaction_id = format!(
            "COD-{}-{}",
            request.reference,
            request.requested_at.timestamp_millis()
        );
        Ok(PaymentOutcome::succeeded(transaction_id, None))
    }

    fn verify(&self, _claim: &VerificationClaim) -> Result<bool, DomainError> {
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct RazorpayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

pub struct Razorpay {
    credentials: Option<RazorpayCredentials>,
}

impl Razorpay {
    pub fn new(credentials: Option<RazorpayCredentials>) -> Self {
        Self { credentials }
    }
}

impl PaymentGateway for Razorpay {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Razorpay
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, DomainError> {
        let prefix = if self.is_configured() { "RZP" } else { "MOCK_RAZORPAY" };
        let id = format!(
            "{}_{}_{}",
            prefix,
            request.reference,
            request.requested_at.timestamp_millis()
        );
        Ok(PaymentOutcome::succeeded(id.clone(), Some(id)))
    }

    // Signature checking against the key secret is not implemented; any
    // signed claim is accepted.
    fn verify(&self, claim: &VerificationClaim) -> Result<bool, DomainError> {
        let signed = claim.signature.as_deref().is_some_and(|s| !s.is_empty());
        if signed {
            log::warn!(
                "Razorpay payment {} accepted without signature verification",
                claim.payment_id
            );
        }
        Ok(signed)
    }
}

pub struct Stripe {
    secret_key: Option<String>,
}

impl Stripe {
    pub fn new(secret_key: Option<String>) -> Self {
        Self { secret_key }
    }
}

impl PaymentGateway for Stripe {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Stripe
    }

    fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    fn charge(&self, request: &ChargeRequest) -> Result<PaymentOutcome, DomainError> {
        let prefix = if self.is_configured() { "STRIPE" } else { "MOCK_STRIPE" };
        let id = format!(
            "{}_{}_{}",
            prefix,
            request.reference,
            request.requested_at.timestamp_millis()
        );
        Ok(PaymentOutcome::succeeded(id.clone(), Some(id)))
    }

    fn verify(&self, claim: &VerificationClaim) -> Result<bool, DomainError> {
        log::warn!(
            "Stripe payment {} accepted without checking the payment intent",
            claim.payment_id
        );
        Ok(true)
    }
}
