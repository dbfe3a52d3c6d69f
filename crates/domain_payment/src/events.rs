//! Append-only payment event trail
//!
//! Every ledger action that captures or returns funds is journaled as a
//! `PaymentEvent`, fanned out into one `PaymentEventQuantity` row per order
//! line. Events are created, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{LineId, Money, OrderId, PaymentEventId, SourceId};

use crate::order::Order;

/// The kind of ledger action an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventType {
    /// Funds reserved against a source
    Authorize,
    /// Funds captured
    Debit,
    /// Funds returned
    Refund,
}

/// Per-line fan-out of a payment event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEventQuantity {
    pub line_id: LineId,
    pub quantity: u32,
}

/// Immutable record of one ledger action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: PaymentEventId,
    pub order_id: OrderId,
    pub source_id: SourceId,
    pub event_type: PaymentEventType,
    pub amount: Money,
    pub reference: String,
    pub quantities: Vec<PaymentEventQuantity>,
    pub occurred_at: DateTime<Utc>,
}

impl PaymentEvent {
    /// Creates an event with no line fan-out
    pub fn new(
        order_id: OrderId,
        source_id: SourceId,
        event_type: PaymentEventType,
        amount: Money,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: PaymentEventId::new_v7(),
            order_id,
            source_id,
            event_type,
            amount,
            reference: reference.into(),
            quantities: Vec::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Creates an event covering every line of the order at full quantity
    pub fn for_order_lines(
        order: &Order,
        source_id: SourceId,
        event_type: PaymentEventType,
        amount: Money,
        reference: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(order.id, source_id, event_type, amount, reference);
        event.quantities = order
            .lines
            .iter()
            .map(|line| PaymentEventQuantity {
                line_id: line.id,
                quantity: line.quantity,
            })
            .collect();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use crate::order::OrderLine;
    use rust_decimal_macros::dec;

    #[test]
    fn test_for_order_lines_fans_out_per_line() {
        let order = Order::new(
            "100050",
            Currency::USD,
            vec![OrderLine::new("SKU-1", 2), OrderLine::new("SKU-2", 5)],
            Money::new(dec!(70.00), Currency::USD),
        );
        let source_id = SourceId::new();

        let event = PaymentEvent::for_order_lines(
            &order,
            source_id,
            PaymentEventType::Debit,
            Money::new(dec!(70.00), Currency::USD),
            "txn-1",
        );

        assert_eq!(event.quantities.len(), 2);
        assert_eq!(event.quantities[0].quantity, 2);
        assert_eq!(event.quantities[1].quantity, 5);
        assert_eq!(event.source_id, source_id);
        assert_eq!(event.event_type, PaymentEventType::Debit);
    }
}
