//! Payment domain errors

use core_kernel::{MoneyError, PortError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the payment ledger
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Money arithmetic failed (currency mismatch, etc.)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// An operation would leave a ledger balance negative
    #[error("Negative balance on source {source_id}: {field} would become {amount}")]
    NegativeBalance {
        source_id: String,
        field: &'static str,
        amount: Decimal,
    },

    /// Debits on a source may never exceed its allocation
    #[error("Debit exceeds allocation: debited={debited}, allocated={allocated}")]
    DebitExceedsAllocation { debited: Decimal, allocated: Decimal },

    /// Refunds on a source may never exceed its debits
    #[error("Refund exceeds debit: refunded={refunded}, debited={debited}")]
    RefundExceedsDebit { refunded: Decimal, debited: Decimal },

    /// Underlying store failure
    #[error("Port error: {0}")]
    Port(#[from] PortError),
}
