//! Checkout DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, OrderId};
use domain_checkout::{PaymentMethodSelection, RecordedPayment};
use domain_payment::{Order, OrderLine, OrderStatus, PaymentState};

/// One checkout payment submission
#[derive(Debug, Deserialize)]
pub struct CheckoutPaymentRequest {
    pub order: OrderRequest,
    /// Method selections keyed by the client's method key
    pub payment: BTreeMap<String, PaymentMethodSelection>,
}

/// Order view submitted alongside the payment selections
///
/// The host platform owns the order; the request carries the slice the
/// payment core consumes. A resubmission names the previously returned
/// `id` so prior payments under the same method keys get voided.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    /// Present on resubmission of an already-known order
    #[serde(default)]
    pub id: Option<OrderId>,
    pub number: String,
    pub currency: Currency,
    pub lines: Vec<OrderLineRequest>,
    pub total_incl_tax: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub sku: String,
    pub quantity: u32,
}

impl OrderRequest {
    /// Builds a fresh order view in the pre-payment state
    pub fn into_order(self) -> Order {
        let currency = self.currency;
        let lines = self
            .lines
            .into_iter()
            .map(|line| OrderLine::new(line.sku, line.quantity))
            .collect();
        Order::new(
            self.number,
            currency,
            lines,
            Money::new(self.total_incl_tax, currency),
        )
    }
}

/// Response to a checkout submission
#[derive(Debug, Serialize)]
pub struct CheckoutPaymentResponse {
    pub order_id: OrderId,
    pub number: String,
    pub order_status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub payment_states: BTreeMap<String, PaymentStateResponse>,
}

impl CheckoutPaymentResponse {
    pub fn new(order: &Order, states: BTreeMap<String, RecordedPayment>) -> Self {
        Self {
            order_id: order.id,
            number: order.number.clone(),
            order_status: order.status,
            placed_at: order.placed_at,
            payment_states: states
                .into_iter()
                .map(|(key, recorded)| (key, recorded.into()))
                .collect(),
        }
    }
}

/// One method's state as reported to the client
#[derive(Debug, Serialize)]
pub struct PaymentStateResponse {
    pub method: String,
    #[serde(flatten)]
    pub state: PaymentState,
}

impl From<RecordedPayment> for PaymentStateResponse {
    fn from(recorded: RecordedPayment) -> Self {
        Self {
            method: recorded.method_code,
            state: recorded.state,
        }
    }
}

/// Response to a payment-state query
#[derive(Debug, Serialize)]
pub struct PaymentStatesResponse {
    pub order_id: OrderId,
    pub order_status: OrderStatus,
    pub payment_states: BTreeMap<String, PaymentStateResponse>,
}

/// Stripe webhook event types the core consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StripeEventType {
    #[serde(rename = "payment_intent.succeeded")]
    PaymentSucceeded,
    #[serde(rename = "payment_intent.payment_failed")]
    PaymentFailed,
    #[serde(rename = "charge.refunded")]
    Refunded,
}

/// Stripe webhook notification
#[derive(Debug, Deserialize)]
pub struct StripeWebhookRequest {
    #[serde(rename = "type")]
    pub event_type: StripeEventType,
    pub order_id: OrderId,
    /// Method key the payment was recorded under at checkout
    #[serde(default = "default_method_key")]
    pub method_key: String,
    /// Processor reference (payment intent id)
    #[serde(default)]
    pub reference: String,
}

fn default_method_key() -> String {
    "default".to_string()
}

/// Webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
}
