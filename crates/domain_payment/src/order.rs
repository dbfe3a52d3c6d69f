//! Order view model
//!
//! The order itself is owned by the host commerce platform; the checkout
//! core only consumes the fields it needs to record and settle payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, LineId, Money, OrderId};

/// Order status as far as payment is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, payment not yet settled
    Pending,
    /// Payment authorized, order may proceed to fulfillment
    Authorized,
    /// Payment processor declined the payment
    PaymentDeclined,
}

/// A single order line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: LineId,
    /// Product identifier as the storefront knows it
    pub sku: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: LineId::new_v7(),
            sku: sku.into(),
            quantity,
        }
    }
}

/// The slice of an order the payment core consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number
    pub number: String,
    pub currency: Currency,
    pub lines: Vec<OrderLine>,
    pub total_incl_tax: Money,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Creates an order view in the pre-payment state
    pub fn new(
        number: impl Into<String>,
        currency: Currency,
        lines: Vec<OrderLine>,
        total_incl_tax: Money,
    ) -> Self {
        Self {
            id: OrderId::new_v7(),
            number: number.into(),
            currency,
            lines,
            total_incl_tax,
            status: OrderStatus::Pending,
            placed_at: Utc::now(),
        }
    }

    /// Transitions the order to a new payment status
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Total quantity across all lines
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
