//! Test data builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_checkout::PaymentMethodSelection;
use domain_payment::{Order, OrderLine};

use crate::fixtures::{MoneyFixtures, StringFixtures, DEFAULT_LINES};

/// Builder for the order view consumed by the payment core
pub struct TestOrderBuilder {
    number: String,
    currency: Currency,
    lines: Vec<OrderLine>,
    total_incl_tax: Money,
}

impl Default for TestOrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestOrderBuilder {
    /// Creates a builder with a random order number and the default lines
    pub fn new() -> Self {
        Self {
            number: StringFixtures::order_number(),
            currency: Currency::USD,
            lines: DEFAULT_LINES
                .iter()
                .map(|(sku, qty)| OrderLine::new(*sku, *qty))
                .collect(),
            total_incl_tax: MoneyFixtures::order_total(),
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_lines(mut self, lines: Vec<OrderLine>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total_incl_tax = total;
        self
    }

    pub fn build(self) -> Order {
        Order::new(self.number, self.currency, self.lines, self.total_incl_tax)
    }
}

/// Builder for client payment-method selections
pub struct SelectionBuilder {
    method_type: String,
    enabled: bool,
    pay_balance: bool,
    amount: Option<Decimal>,
    reference: String,
}

impl SelectionBuilder {
    /// An enabled pay-balance selection for the given method
    pub fn enabled(method_type: impl Into<String>) -> Self {
        Self {
            method_type: method_type.into(),
            enabled: true,
            pay_balance: true,
            amount: None,
            reference: String::new(),
        }
    }

    /// A disabled selection for the given method
    pub fn disabled(method_type: impl Into<String>) -> Self {
        Self {
            method_type: method_type.into(),
            enabled: false,
            pay_balance: true,
            amount: None,
            reference: String::new(),
        }
    }

    /// Switches to a fixed amount instead of paying the balance
    pub fn with_fixed_amount(mut self, amount: Decimal) -> Self {
        self.pay_balance = false;
        self.amount = Some(amount);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn build(self) -> PaymentMethodSelection {
        PaymentMethodSelection {
            method_type: self.method_type,
            enabled: self.enabled,
            pay_balance: self.pay_balance,
            amount: self.amount,
            reference: self.reference,
        }
    }
}
