//! Checkout payment-method selection and validation
//!
//! One selection describes how a client wants one payment method applied to
//! the order: enabled or not, paying the remaining balance or a fixed
//! amount, with an optional processor reference. Validation produces
//! field-level errors so the API can surface them per field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

use crate::registry::MethodRegistry;

/// Longest accepted processor reference
pub const MAX_REFERENCE_LENGTH: usize = 128;

/// A field-level validation failure
///
/// `code` is a stable machine-readable identifier the API layer uses to
/// look up a localized message; `message` is the English fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

/// How much an enabled method should pay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAmount {
    /// Whatever remains owed after all fixed-amount methods
    Balance,
    /// Exactly this much
    Fixed(Money),
}

/// A client-submitted selection for one payment method
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentMethodSelection {
    pub method_type: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_pay_balance")]
    pub pay_balance: bool,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub reference: String,
}

fn default_pay_balance() -> bool {
    true
}

/// A selection that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedSelection {
    pub method_type: String,
    pub amount: PaymentAmount,
    pub reference: String,
}

impl PaymentMethodSelection {
    /// Validates this selection against the registered method codes
    ///
    /// Returns `Ok(None)` for disabled selections: they are well-formed but
    /// contribute nothing to the checkout. A selection paying the balance
    /// discards any explicit amount; a fixed-amount selection requires a
    /// strictly positive amount.
    pub fn validate(
        &self,
        registry: &MethodRegistry,
        currency: Currency,
    ) -> Result<Option<ValidatedSelection>, Vec<FieldError>> {
        let mut errors = Vec::new();

        if !registry.contains(&self.method_type) {
            errors.push(FieldError::new(
                "method_type",
                "invalid-method",
                format!("\"{}\" is not a valid payment method.", self.method_type),
            ));
        }

        if self.reference.len() > MAX_REFERENCE_LENGTH {
            errors.push(FieldError::new(
                "reference",
                "reference-too-long",
                format!(
                    "Reference may not be longer than {} characters.",
                    MAX_REFERENCE_LENGTH
                ),
            ));
        }

        if !self.enabled {
            return if errors.is_empty() {
                Ok(None)
            } else {
                Err(errors)
            };
        }

        let amount = if self.pay_balance {
            // Balance is computed by the orchestrator; an explicit amount
            // alongside pay_balance is discarded, not an error.
            PaymentAmount::Balance
        } else {
            match self.amount {
                Some(amount) if amount > Decimal::ZERO => {
                    PaymentAmount::Fixed(Money::new(amount, currency))
                }
                _ => {
                    errors.push(FieldError::new(
                        "amount",
                        "amount-invalid",
                        "Amount must be greater than 0.00 or pay_balance must be enabled.",
                    ));
                    PaymentAmount::Balance
                }
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Some(ValidatedSelection {
            method_type: self.method_type.clone(),
            amount,
            reference: self.reference.clone(),
        }))
    }
}
