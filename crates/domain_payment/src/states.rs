//! Payment outcome states
//!
//! A `PaymentState` is what a payment method reports back after recording a
//! payment: the current standing of one method's contribution to an order.
//! States are values recomputed from the source ledger totals, not persisted
//! entities of their own.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, SourceId};

/// Outcome of recording (or settling) a payment against one method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PaymentState {
    /// Funds captured; nothing further owed by this method
    Complete { amount: Money, source_id: SourceId },
    /// Funds reserved with the processor, awaiting out-of-band settlement
    Pending { amount: Money, source_id: SourceId },
    /// Nothing authorized yet; payment will be collected later
    Deferred { amount: Money, source_id: SourceId },
    /// Processor rejected the payment
    Declined { amount: Money, source_id: SourceId },
    /// A previously reserved allocation was used up by another method
    Consumed { amount: Money, source_id: SourceId },
}

impl PaymentState {
    /// The amount this state accounts for
    pub fn amount(&self) -> Money {
        match self {
            PaymentState::Complete { amount, .. }
            | PaymentState::Pending { amount, .. }
            | PaymentState::Deferred { amount, .. }
            | PaymentState::Declined { amount, .. }
            | PaymentState::Consumed { amount, .. } => *amount,
        }
    }

    /// The ledger source this state was computed from
    pub fn source_id(&self) -> SourceId {
        match self {
            PaymentState::Complete { source_id, .. }
            | PaymentState::Pending { source_id, .. }
            | PaymentState::Deferred { source_id, .. }
            | PaymentState::Declined { source_id, .. }
            | PaymentState::Consumed { source_id, .. } => *source_id,
        }
    }

    /// Stable status code as serialized over the wire
    pub fn status_code(&self) -> &'static str {
        match self {
            PaymentState::Complete { .. } => "complete",
            PaymentState::Pending { .. } => "pending",
            PaymentState::Deferred { .. } => "deferred",
            PaymentState::Declined { .. } => "declined",
            PaymentState::Consumed { .. } => "consumed",
        }
    }

    /// True if this state still expects an out-of-band settlement callback
    pub fn awaits_settlement(&self) -> bool {
        matches!(
            self,
            PaymentState::Pending { .. } | PaymentState::Deferred { .. }
        )
    }

    /// True if this state blocks the order from being authorized
    pub fn is_declined(&self) -> bool {
        matches!(self, PaymentState::Declined { .. })
    }
}
