//! Pre-built test data for common entities

use fake::Fake;
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};

/// Line items most order fixtures are built from
pub static DEFAULT_LINES: Lazy<Vec<(&'static str, u32)>> =
    Lazy::new(|| vec![("SKU-ESPRESSO", 2), ("SKU-GRINDER", 1)]);

/// Money fixtures in the storefront's base currency
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical order total
    pub fn order_total() -> Money {
        Money::new(dec!(64.50), Currency::USD)
    }

    /// A partial payment that does not cover the total
    pub fn partial_amount() -> Money {
        Money::new(dec!(20.00), Currency::USD)
    }

    pub fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }
}

/// String fixtures
pub struct StringFixtures;

impl StringFixtures {
    /// A random eight-digit order number
    pub fn order_number() -> String {
        (10_000_000..99_999_999).fake::<u32>().to_string()
    }

    /// A Stripe-shaped payment intent reference
    pub fn payment_intent_reference() -> String {
        format!("pi_{}", (100_000..999_999).fake::<u32>())
    }
}
