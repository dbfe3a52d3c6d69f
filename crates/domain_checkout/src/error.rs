//! Checkout domain errors

use core_kernel::{MoneyError, OrderId, PortError};
use domain_payment::PaymentError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::selection::FieldError;

/// Errors that can occur while recording or settling checkout payments
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// `record_payment` was called without an amount (or with a negative one)
    #[error("Amount must be specified")]
    AmountNotSpecified,

    /// The selection named a method code nobody registered
    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),

    /// One or more selections failed field validation; keyed by method key
    #[error("Invalid payment selection")]
    InvalidSelection(Vec<(String, Vec<FieldError>)>),

    /// A checkout submission must enable at least one payment method
    #[error("No payment method enabled")]
    NoMethodEnabled,

    /// At most one enabled method may pay the balance
    #[error("Only one payment method may pay the remaining balance")]
    MultiplePayBalance,

    /// Fixed amounts did not add up to the order total
    #[error("Payment amounts {submitted} do not match order total {total}")]
    AmountMismatch { submitted: Decimal, total: Decimal },

    /// Fixed amounts exceeded the order total
    #[error("Payment amounts {submitted} exceed order total {total}")]
    Overpayment { submitted: Decimal, total: Decimal },

    /// The order referenced by a settlement callback does not exist
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No payment was recorded under this method key
    #[error("No recorded payment for method key: {0}")]
    NoRecordedPayment(String),

    /// The method does not settle out of band
    #[error("Method {0} does not support out-of-band settlement")]
    UnsupportedSettlement(String),

    /// Ledger invariant failure
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Store failure; the unit of work was rolled back
    #[error("Port error: {0}")]
    Port(#[from] PortError),

    /// Money arithmetic failure
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}
