//! Custom assertion helpers for domain types

use rust_decimal::Decimal;

use domain_payment::PaymentState;

/// Asserts that a state is Complete with the expected amount
pub fn assert_complete(state: &PaymentState, expected: Decimal) {
    match state {
        PaymentState::Complete { amount, .. } => {
            assert_eq!(
                amount.amount(),
                expected,
                "complete state carries wrong amount"
            );
        }
        other => panic!("expected Complete state, got {other:?}"),
    }
}

/// Asserts that a state is Pending with the expected amount
pub fn assert_pending(state: &PaymentState, expected: Decimal) {
    match state {
        PaymentState::Pending { amount, .. } => {
            assert_eq!(
                amount.amount(),
                expected,
                "pending state carries wrong amount"
            );
        }
        other => panic!("expected Pending state, got {other:?}"),
    }
}

/// Asserts that a state is Deferred with a zero amount
pub fn assert_deferred_zero(state: &PaymentState) {
    match state {
        PaymentState::Deferred { amount, .. } => {
            assert!(amount.is_zero(), "deferred state should carry zero amount");
        }
        other => panic!("expected Deferred state, got {other:?}"),
    }
}
