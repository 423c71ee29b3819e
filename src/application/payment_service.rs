use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::order::{estimated_delivery, generate_payment_reference, OrderView, PaymentMethod};
use crate::domain::payment::{ChargeRequest, GatewayReport, PaymentReceipt, VerificationClaim};
use crate::domain::ports::{Clock, OrderRepository, PaymentGateway};
use crate::domain::rbac::{can_access_resource, OwnedResource, Permission};
use crate::domain::user::Caller;

/// Routes charges and verification claims to the configured gateways.
pub struct PaymentService {
    cod: Arc<dyn PaymentGateway>,
    razorpay: Arc<dyn PaymentGateway>,
    stripe: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderRepository>,
    clock: Arc<dyn Clock>,
}

impl PaymentService {
    pub fn new(
        cod: Arc<dyn PaymentGateway>,
        razorpay: Arc<dyn PaymentGateway>,
        stripe: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cod,
            razorpay,
            stripe,
            orders,
            clock,
        }
    }

    pub fn report(&self) -> GatewayReport {
        GatewayReport {
            razorpay_configured: self.razorpay.is_configured(),
            stripe_configured: self.stripe.is_configured(),
        }
    }

    /// `online` has no gateway of its own and is settled as cash on delivery.
    fn gateway(&self, method: PaymentMethod) -> &Arc<dyn PaymentGateway> {
        match method {
            PaymentMethod::Razorpay => &self.razorpay,
            PaymentMethod::Stripe => &self.stripe,
            PaymentMethod::Cod | PaymentMethod::Online => &self.cod,
        }
    }

    pub fn process(
        &self,
        caller: &Caller,
        method: PaymentMethod,
        amount: Money,
        order_reference: Option<&str>,
    ) -> Result<PaymentReceipt, DomainError> {
        if !amount.is_positive() {
            return Err(DomainError::invalid("Amount must be greater than zero"));
        }

        let now = self.clock.now();
        let order = order_reference
            .map(|reference| self.owned_order(caller, reference))
            .transpose()?;
        // Transaction ids echo the reference exactly as the client sent it.
        let reference = match order_reference {
            Some(reference) => reference.to_string(),
            None => generate_payment_reference(now, &mut rand::thread_rng()),
        };

        let outcome = self.gateway(method).charge(&ChargeRequest {
            amount: amount.clone(),
            reference: reference.clone(),
            requested_at: now,
        })?;
        if !outcome.success {
            return Err(DomainError::invalid(
                "Payment could not be processed. Please try again or use another payment method.",
            ));
        }

        if let (Some(order), Some(recorded)) = (&order, outcome.recorded_id()) {
            self.orders.confirm_payment(order.id, recorded)?;
            log::info!("Order {} paid via {}", order.order_number, method.as_str());
        }

        Ok(PaymentReceipt {
            reference,
            method,
            amount,
            outcome,
            estimated_delivery: order
                .map(|o| o.estimated_delivery)
                .unwrap_or_else(|| estimated_delivery(now)),
        })
    }

    /// Checks a client's payment claim and, when it holds, marks the order paid.
    /// Unknown methods and `online` are never verified.
    pub fn verify(
        &self,
        caller: &Caller,
        method: &str,
        claim: VerificationClaim,
    ) -> Result<OrderView, DomainError> {
        let Some(reference) = claim.order_reference.as_deref() else {
            return Err(DomainError::invalid("Missing required fields"));
        };

        let verified = match method.parse::<PaymentMethod>() {
            Ok(PaymentMethod::Online) | Err(_) => false,
            Ok(method) => self.gateway(method).verify(&claim)?,
        };
        if !verified {
            return Err(DomainError::invalid("Payment verification failed"));
        }

        let order = self.owned_order(caller, reference)?;
        self.orders.confirm_payment(order.id, &claim.payment_id)?;
        self.orders
            .find_by_id(order.id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    fn owned_order(&self, caller: &Caller, reference: &str) -> Result<OrderView, DomainError> {
        let order = match Uuid::parse_str(reference) {
            Ok(id) => self.orders.find_by_id(id)?,
            Err(_) => self.orders.find_by_number(reference)?,
        }
        .ok_or(DomainError::NotFound("Order"))?;

        let resource = OwnedResource::order(order.user_id);
        if !can_access_resource(caller.role, caller.id, &resource, Permission::OrdersRead) {
            log::warn!("User {} attempted to pay for order {}", caller.id, order.order_number);
            return Err(DomainError::Forbidden("You cannot pay for this order".into()));
        }
        Ok(order)
    }
}
