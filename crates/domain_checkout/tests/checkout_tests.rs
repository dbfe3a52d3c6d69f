//! Comprehensive tests for domain_checkout

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, SourceId};
use domain_checkout::{
    Cash, CheckoutError, CheckoutProcessor, InMemoryStateStore, MethodRegistry, PayLater,
    PaymentMethod, PaymentMethodSelection, Stripe,
};
use domain_payment::{
    InMemoryPaymentStore, Order, OrderRepository, OrderStatus, PaymentEventType,
    PaymentSourceRepository, PaymentState,
};
use test_utils::{
    assert_complete, assert_deferred_zero, assert_pending, SelectionBuilder, TestOrderBuilder,
};

fn order() -> Order {
    // Total matches the default fixture lines: 64.50 across three units.
    TestOrderBuilder::new().build()
}

fn processor(store: &Arc<InMemoryPaymentStore>) -> CheckoutProcessor {
    CheckoutProcessor::new(
        MethodRegistry::with_default_methods(),
        store.clone(),
        store.clone(),
        Arc::new(InMemoryStateStore::new()),
    )
}

fn selections(
    entries: Vec<(&str, PaymentMethodSelection)>,
) -> BTreeMap<String, PaymentMethodSelection> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ============================================================================
// Cash
// ============================================================================

mod cash_tests {
    use super::*;

    #[tokio::test]
    async fn test_record_payment_debits_full_amount() {
        let store = InMemoryPaymentStore::new();
        let order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        let state = Cash
            .record_payment(&store, &order, "default", Some(amount), "")
            .await
            .unwrap();

        assert_complete(&state, dec!(64.50));
        let source = store.find_source(state.source_id()).await.unwrap().unwrap();
        assert_eq!(source.amount_debited.amount(), dec!(64.50));
        assert_eq!(source.amount_allocated.amount(), dec!(64.50));
    }

    #[tokio::test]
    async fn test_debit_event_has_one_quantity_per_line() {
        let store = InMemoryPaymentStore::new();
        let order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        Cash.record_payment(&store, &order, "default", Some(amount), "")
            .await
            .unwrap();

        let events = store.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, PaymentEventType::Debit);
        assert_eq!(events[0].quantities.len(), order.lines.len());
    }

    #[tokio::test]
    async fn test_second_identical_record_is_a_no_op() {
        let store = InMemoryPaymentStore::new();
        let order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        let first = Cash
            .record_payment(&store, &order, "default", Some(amount), "")
            .await
            .unwrap();
        let second = Cash
            .record_payment(&store, &order, "default", Some(amount), "")
            .await
            .unwrap();

        assert_eq!(first.source_id(), second.source_id());
        assert_complete(&second, dec!(64.50));

        let source = store.find_source(first.source_id()).await.unwrap().unwrap();
        assert_eq!(source.amount_debited.amount(), dec!(64.50));

        // No zero-delta event is journaled on the replay.
        let events = store.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_amount_is_rejected() {
        let store = InMemoryPaymentStore::new();
        let order = order();

        let result = Cash.record_payment(&store, &order, "default", None, "").await;
        assert!(matches!(result, Err(CheckoutError::AmountNotSpecified)));
    }

    #[tokio::test]
    async fn test_explicit_zero_amount_is_allowed() {
        let store = InMemoryPaymentStore::new();
        let order = order();

        let state = Cash
            .record_payment(
                &store,
                &order,
                "default",
                Some(Money::zero(Currency::USD)),
                "",
            )
            .await
            .unwrap();
        assert_complete(&state, dec!(0));
    }
}

// ============================================================================
// PayLater
// ============================================================================

mod pay_later_tests {
    use super::*;

    #[tokio::test]
    async fn test_record_payment_allocates_nothing() {
        let store = InMemoryPaymentStore::new();
        let order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        let state = PayLater
            .record_payment(&store, &order, "default", Some(amount), "")
            .await
            .unwrap();

        assert_deferred_zero(&state);
        let source = store.find_source(state.source_id()).await.unwrap().unwrap();
        assert!(source.amount_allocated.is_zero());
        assert!(source.amount_debited.is_zero());
    }
}

// ============================================================================
// Stripe
// ============================================================================

mod stripe_tests {
    use super::*;

    #[tokio::test]
    async fn test_record_payment_allocates_without_debit() {
        let store = InMemoryPaymentStore::new();
        let order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        let state = Stripe
            .record_payment(&store, &order, "card", Some(amount), "pi_123")
            .await
            .unwrap();

        assert_pending(&state, dec!(64.50));
        let source = store.find_source(state.source_id()).await.unwrap().unwrap();
        assert_eq!(source.amount_allocated.amount(), dec!(64.50));
        assert!(source.amount_debited.is_zero());
    }

    #[tokio::test]
    async fn test_success_callback_debits_total_and_authorizes() {
        let store = InMemoryPaymentStore::new();
        let mut order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        Stripe
            .record_payment(&store, &order, "card", Some(amount), "pi_123")
            .await
            .unwrap();

        let state = Stripe
            .order_payment_successful(&store, &mut order, "pi_123")
            .await
            .unwrap();

        assert_complete(&state, dec!(64.50));
        assert_eq!(order.status, OrderStatus::Authorized);

        let source = store.find_source(state.source_id()).await.unwrap().unwrap();
        assert_eq!(source.amount_debited.amount(), dec!(64.50));

        let events = store.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].quantities.len(), order.lines.len());
    }

    #[tokio::test]
    async fn test_success_callback_is_idempotent_under_redelivery() {
        let store = InMemoryPaymentStore::new();
        let mut order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        Stripe
            .record_payment(&store, &order, "card", Some(amount), "pi_123")
            .await
            .unwrap();
        Stripe
            .order_payment_successful(&store, &mut order, "pi_123")
            .await
            .unwrap();
        let replay = Stripe
            .order_payment_successful(&store, &mut order, "pi_123")
            .await
            .unwrap();

        assert_complete(&replay, dec!(64.50));
        let source = store
            .find_source(replay.source_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.amount_debited.amount(), dec!(64.50));
        // Only the first delivery journaled a debit.
        let events = store.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_callback_declines_order() {
        let store = InMemoryPaymentStore::new();
        let mut order = order();

        Stripe.order_payment_failed(&mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::PaymentDeclined);
        // Nothing was written to the ledger.
        let events = store.events_for_order(order.id).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_refund_returns_full_total() {
        let store = InMemoryPaymentStore::new();
        let mut order = order();
        let amount = Money::new(dec!(64.50), Currency::USD);

        Stripe
            .record_payment(&store, &order, "card", Some(amount), "pi_123")
            .await
            .unwrap();
        Stripe
            .order_payment_successful(&store, &mut order, "pi_123")
            .await
            .unwrap();
        Stripe.order_refund(&store, &order, "pi_123").await.unwrap();

        let source = store
            .get_or_create(&order, "Stripe", "pi_123")
            .await
            .unwrap();
        assert_eq!(source.amount_refunded.amount(), dec!(64.50));

        let events = store.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, PaymentEventType::Refund);
    }

    #[tokio::test]
    async fn test_callbacks_unsupported_on_plain_methods() {
        let store = InMemoryPaymentStore::new();
        let mut order = order();

        let result = Cash
            .order_payment_successful(&store, &mut order, "")
            .await;
        assert!(matches!(
            result,
            Err(CheckoutError::UnsupportedSettlement(_))
        ));
    }
}

// ============================================================================
// Voiding
// ============================================================================

mod void_tests {
    use super::*;

    #[tokio::test]
    async fn test_void_of_nonexistent_source_is_a_no_op() {
        let store = InMemoryPaymentStore::new();
        let order = order();
        let ghost = PaymentState::Pending {
            amount: Money::new(dec!(10.00), Currency::USD),
            source_id: SourceId::new(),
        };

        let result = Cash
            .void_existing_payment(&store, &order, "default", &ghost)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_void_decrements_allocation_floored_at_zero() {
        let store = InMemoryPaymentStore::new();
        let order = order();

        let state = Stripe
            .record_payment(
                &store,
                &order,
                "card",
                Some(Money::new(dec!(30.00), Currency::USD)),
                "pi_123",
            )
            .await
            .unwrap();

        let oversized = PaymentState::Pending {
            amount: Money::new(dec!(99.00), Currency::USD),
            source_id: state.source_id(),
        };
        Stripe
            .void_existing_payment(&store, &order, "card", &oversized)
            .await
            .unwrap();

        let source = store.find_source(state.source_id()).await.unwrap().unwrap();
        assert!(source.amount_allocated.is_zero());
    }
}

// ============================================================================
// Selection properties
// ============================================================================

mod selection_properties {
    use super::*;
    use proptest::prelude::*;
    use test_utils::submitted_amount_strategy;

    proptest! {
        #[test]
        fn any_positive_fixed_amount_validates(amount in submitted_amount_strategy()) {
            let selection = SelectionBuilder::enabled("cash")
                .with_fixed_amount(amount)
                .build();
            let validated = selection
                .validate(&MethodRegistry::with_default_methods(), Currency::USD)
                .unwrap();
            prop_assert!(validated.is_some());
        }

        #[test]
        fn overlong_references_are_rejected(len in 129usize..300usize) {
            let selection = SelectionBuilder::enabled("stripe")
                .with_reference("x".repeat(len))
                .build();
            let errors = selection
                .validate(&MethodRegistry::with_default_methods(), Currency::USD)
                .unwrap_err();
            prop_assert!(errors.iter().any(|e| e.code == "reference-too-long"));
        }
    }
}

// ============================================================================
// Checkout processor
// ============================================================================

mod processor_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_cash_method_authorizes_order() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        let states = processor
            .record_payments(
                &mut order,
                &selections(vec![("default", SelectionBuilder::enabled("cash").build())]),
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Authorized);
        assert_complete(&states["default"].state, dec!(64.50));
    }

    #[tokio::test]
    async fn test_split_between_fixed_cash_and_balance_card() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        let states = processor
            .record_payments(
                &mut order,
                &selections(vec![
                    (
                        "cash-part",
                        SelectionBuilder::enabled("cash")
                            .with_fixed_amount(dec!(20.00))
                            .build(),
                    ),
                    (
                        "card-part",
                        SelectionBuilder::enabled("stripe")
                            .with_reference("pi_777")
                            .build(),
                    ),
                ]),
            )
            .await
            .unwrap();

        assert_complete(&states["cash-part"].state, dec!(20.00));
        // Balance method absorbed the remainder.
        assert_pending(&states["card-part"].state, dec!(44.50));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_disabled_selections_are_ignored() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        let states = processor
            .record_payments(
                &mut order,
                &selections(vec![
                    ("default", SelectionBuilder::enabled("cash").build()),
                    ("unused", SelectionBuilder::disabled("stripe").build()),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(states.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_errors_are_keyed_by_method() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();

        let result = processor
            .record_payments(
                &mut order,
                &selections(vec![(
                    "default",
                    SelectionBuilder::enabled("cash")
                        .with_fixed_amount(dec!(0.00))
                        .build(),
                )]),
            )
            .await;

        match result {
            Err(CheckoutError::InvalidSelection(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].0, "default");
                assert_eq!(errors[0].1[0].field, "amount");
            }
            other => panic!("expected InvalidSelection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_enabled_method_is_rejected() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();

        let result = processor
            .record_payments(
                &mut order,
                &selections(vec![("default", SelectionBuilder::disabled("cash").build())]),
            )
            .await;
        assert!(matches!(result, Err(CheckoutError::NoMethodEnabled)));
    }

    #[tokio::test]
    async fn test_two_balance_methods_are_rejected() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();

        let result = processor
            .record_payments(
                &mut order,
                &selections(vec![
                    ("a", SelectionBuilder::enabled("cash").build()),
                    ("b", SelectionBuilder::enabled("pay-later").build()),
                ]),
            )
            .await;
        assert!(matches!(result, Err(CheckoutError::MultiplePayBalance)));
    }

    #[tokio::test]
    async fn test_fixed_amounts_exceeding_total_are_rejected() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();

        let result = processor
            .record_payments(
                &mut order,
                &selections(vec![
                    (
                        "a",
                        SelectionBuilder::enabled("cash")
                            .with_fixed_amount(dec!(60.00))
                            .build(),
                    ),
                    (
                        "b",
                        SelectionBuilder::enabled("stripe")
                            .with_fixed_amount(dec!(10.00))
                            .build(),
                    ),
                ]),
            )
            .await;
        assert!(matches!(result, Err(CheckoutError::AmountMismatch { .. })));
    }

    #[tokio::test]
    async fn test_fixed_amounts_below_total_without_balance_are_rejected() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();

        let result = processor
            .record_payments(
                &mut order,
                &selections(vec![(
                    "a",
                    SelectionBuilder::enabled("cash")
                        .with_fixed_amount(dec!(50.00))
                        .build(),
                )]),
            )
            .await;
        assert!(matches!(result, Err(CheckoutError::AmountMismatch { .. })));
    }

    #[tokio::test]
    async fn test_fixed_amounts_with_balance_exceeding_total_are_overpayment() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();

        let result = processor
            .record_payments(
                &mut order,
                &selections(vec![
                    (
                        "a",
                        SelectionBuilder::enabled("cash")
                            .with_fixed_amount(dec!(70.00))
                            .build(),
                    ),
                    ("b", SelectionBuilder::enabled("stripe").build()),
                ]),
            )
            .await;
        assert!(matches!(result, Err(CheckoutError::Overpayment { .. })));
    }

    #[tokio::test]
    async fn test_resubmission_voids_prior_allocation() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        // First submission reserves the full total on the card.
        let first = processor
            .record_payments(
                &mut order,
                &selections(vec![(
                    "default",
                    SelectionBuilder::enabled("stripe")
                        .with_reference("pi_1")
                        .build(),
                )]),
            )
            .await
            .unwrap();
        let first_source = first["default"].state.source_id();

        // Second submission switches the same key to cash.
        processor
            .record_payments(
                &mut order,
                &selections(vec![("default", SelectionBuilder::enabled("cash").build())]),
            )
            .await
            .unwrap();

        let source = store.find_source(first_source).await.unwrap().unwrap();
        assert!(
            source.amount_allocated.is_zero(),
            "prior card allocation should have been voided"
        );
        assert_eq!(order.status, OrderStatus::Authorized);
    }

    #[tokio::test]
    async fn test_cash_resubmission_with_lower_amount() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        // First submission pays the whole order in cash.
        let first = processor
            .record_payments(
                &mut order,
                &selections(vec![("default", SelectionBuilder::enabled("cash").build())]),
            )
            .await
            .unwrap();
        let cash_source = first["default"].state.source_id();

        // Customer changes their mind: 20.00 cash, the rest on the card.
        let states = processor
            .record_payments(
                &mut order,
                &selections(vec![
                    (
                        "default",
                        SelectionBuilder::enabled("cash")
                            .with_fixed_amount(dec!(20.00))
                            .build(),
                    ),
                    (
                        "card",
                        SelectionBuilder::enabled("stripe")
                            .with_reference("pi_555")
                            .build(),
                    ),
                ]),
            )
            .await
            .unwrap();

        assert_complete(&states["default"].state, dec!(20.00));
        assert_pending(&states["card"].state, dec!(44.50));

        let source = store.find_source(cash_source).await.unwrap().unwrap();
        assert_eq!(source.amount_allocated.amount(), dec!(20.00));
        assert_eq!(source.amount_debited.amount(), dec!(20.00));
    }

    #[tokio::test]
    async fn test_settlement_flow_through_processor() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        processor
            .record_payments(
                &mut order,
                &selections(vec![(
                    "card",
                    SelectionBuilder::enabled("stripe")
                        .with_reference("pi_42")
                        .build(),
                )]),
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let (settled_order, state) = processor
            .settle_payment_success(order.id, "card", "pi_42")
            .await
            .unwrap();

        assert_eq!(settled_order.status, OrderStatus::Authorized);
        assert_complete(&state, dec!(64.50));

        let states = processor.payment_states(order.id).await.unwrap();
        assert_eq!(states["card"].state.status_code(), "complete");
    }

    #[tokio::test]
    async fn test_settlement_failure_marks_declined() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);
        let mut order = order();
        store.save_order(&order).await.unwrap();

        processor
            .record_payments(
                &mut order,
                &selections(vec![(
                    "card",
                    SelectionBuilder::enabled("stripe")
                        .with_reference("pi_43")
                        .build(),
                )]),
            )
            .await
            .unwrap();

        let declined = processor
            .settle_payment_failure(order.id, "card")
            .await
            .unwrap();
        assert_eq!(declined.status, OrderStatus::PaymentDeclined);

        let states = processor.payment_states(order.id).await.unwrap();
        assert!(states["card"].state.is_declined());
    }

    #[tokio::test]
    async fn test_settlement_for_unknown_order_errors() {
        let store = Arc::new(InMemoryPaymentStore::new());
        let processor = processor(&store);

        let result = processor
            .settle_payment_success(core_kernel::OrderId::new(), "card", "pi_0")
            .await;
        assert!(matches!(result, Err(CheckoutError::OrderNotFound(_))));
    }
}
