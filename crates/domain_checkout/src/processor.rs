//! Checkout payment orchestration
//!
//! Takes a validated set of method selections, voids whatever those method
//! keys previously recorded, records each enabled method, and decides the
//! order's payment status from the resulting state map.

use std::collections::BTreeMap;
use std::sync::Arc;

use core_kernel::{Money, OrderId};
use domain_payment::{Order, OrderRepository, OrderStatus, PaymentSourceRepository, PaymentState};

use crate::error::CheckoutError;
use crate::registry::MethodRegistry;
use crate::selection::{PaymentAmount, PaymentMethodSelection, ValidatedSelection};
use crate::state_store::{PaymentStateStore, RecordedPayment};

/// Orchestrates payment recording and settlement for checkout submissions
pub struct CheckoutProcessor {
    registry: MethodRegistry,
    sources: Arc<dyn PaymentSourceRepository>,
    orders: Arc<dyn OrderRepository>,
    states: Arc<dyn PaymentStateStore>,
}

impl CheckoutProcessor {
    pub fn new(
        registry: MethodRegistry,
        sources: Arc<dyn PaymentSourceRepository>,
        orders: Arc<dyn OrderRepository>,
        states: Arc<dyn PaymentStateStore>,
    ) -> Self {
        Self {
            registry,
            sources,
            orders,
            states,
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Records one checkout submission against the order
    ///
    /// Validates every selection (collecting field errors per method key),
    /// resolves the pay-balance amount, voids prior states for the
    /// submitted keys, records each enabled method, and persists the new
    /// state map plus the resulting order status.
    pub async fn record_payments(
        &self,
        order: &mut Order,
        selections: &BTreeMap<String, PaymentMethodSelection>,
    ) -> Result<BTreeMap<String, RecordedPayment>, CheckoutError> {
        let validated = self.validate_selections(order, selections)?;
        let amounts = self.resolve_amounts(order, &validated)?;

        // Replacing a method key releases whatever it previously reserved.
        let prior = self.states.states_for_order(order.id).await?;
        for (key, _) in &validated {
            if let Some(previous) = prior.get(key.as_str()) {
                let method = self
                    .registry
                    .get(&previous.method_code)
                    .ok_or_else(|| CheckoutError::UnknownMethod(previous.method_code.clone()))?;
                method
                    .void_existing_payment(self.sources.as_ref(), order, key, &previous.state)
                    .await?;
            }
        }

        let mut states = prior;
        for ((key, selection), amount) in validated.iter().zip(amounts) {
            let method = self
                .registry
                .get(&selection.method_type)
                .ok_or_else(|| CheckoutError::UnknownMethod(selection.method_type.clone()))?;
            let state = method
                .record_payment(
                    self.sources.as_ref(),
                    order,
                    key,
                    Some(amount),
                    &selection.reference,
                )
                .await?;
            states.insert(
                key.clone(),
                RecordedPayment {
                    method_code: selection.method_type.clone(),
                    state,
                },
            );
        }

        order.set_status(decide_status(&states));
        self.orders.save_order(order).await?;
        self.states.set_states(order.id, states.clone()).await?;
        Ok(states)
    }

    /// Current payment states for an order
    pub async fn payment_states(
        &self,
        order_id: OrderId,
    ) -> Result<BTreeMap<String, RecordedPayment>, CheckoutError> {
        Ok(self.states.states_for_order(order_id).await?)
    }

    /// Processor success callback: settle the payment under `method_key`
    pub async fn settle_payment_success(
        &self,
        order_id: OrderId,
        method_key: &str,
        reference: &str,
    ) -> Result<(Order, PaymentState), CheckoutError> {
        let (mut order, recorded, method) = self.load_settlement(order_id, method_key).await?;
        let state = method
            .order_payment_successful(self.sources.as_ref(), &mut order, reference)
            .await?;
        self.orders.save_order(&order).await?;
        self.states
            .update_state(
                order_id,
                method_key,
                RecordedPayment {
                    method_code: recorded.method_code,
                    state,
                },
            )
            .await?;
        Ok((order, state))
    }

    /// Processor failure callback: decline the order
    pub async fn settle_payment_failure(
        &self,
        order_id: OrderId,
        method_key: &str,
    ) -> Result<Order, CheckoutError> {
        let (mut order, recorded, method) = self.load_settlement(order_id, method_key).await?;
        method.order_payment_failed(&mut order).await?;
        self.orders.save_order(&order).await?;
        self.states
            .update_state(
                order_id,
                method_key,
                RecordedPayment {
                    method_code: recorded.method_code,
                    state: PaymentState::Declined {
                        amount: recorded.state.amount(),
                        source_id: recorded.state.source_id(),
                    },
                },
            )
            .await?;
        Ok(order)
    }

    /// Processor refund callback
    pub async fn refund_payment(
        &self,
        order_id: OrderId,
        method_key: &str,
        reference: &str,
    ) -> Result<(), CheckoutError> {
        let (order, _, method) = self.load_settlement(order_id, method_key).await?;
        method
            .order_refund(self.sources.as_ref(), &order, reference)
            .await
    }

    async fn load_settlement(
        &self,
        order_id: OrderId,
        method_key: &str,
    ) -> Result<
        (
            Order,
            RecordedPayment,
            Arc<dyn crate::methods::PaymentMethod>,
        ),
        CheckoutError,
    > {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;
        let recorded = self
            .states
            .states_for_order(order_id)
            .await?
            .remove(method_key)
            .ok_or_else(|| CheckoutError::NoRecordedPayment(method_key.to_string()))?;
        let method = self
            .registry
            .get(&recorded.method_code)
            .ok_or_else(|| CheckoutError::UnknownMethod(recorded.method_code.clone()))?;
        Ok((order, recorded, method))
    }

    fn validate_selections(
        &self,
        order: &Order,
        selections: &BTreeMap<String, PaymentMethodSelection>,
    ) -> Result<Vec<(String, ValidatedSelection)>, CheckoutError> {
        let mut errors = Vec::new();
        let mut validated = Vec::new();

        for (key, selection) in selections {
            match selection.validate(&self.registry, order.currency) {
                Ok(Some(v)) => validated.push((key.clone(), v)),
                Ok(None) => {}
                Err(field_errors) => errors.push((key.clone(), field_errors)),
            }
        }

        if !errors.is_empty() {
            return Err(CheckoutError::InvalidSelection(errors));
        }
        if validated.is_empty() {
            return Err(CheckoutError::NoMethodEnabled);
        }
        Ok(validated)
    }

    /// Resolves each enabled selection to a concrete amount
    ///
    /// At most one selection may pay the balance; it absorbs whatever the
    /// fixed amounts leave of the order total, and overshooting that
    /// remainder is an overpayment. Without a balance method the fixed
    /// amounts must add up to the total exactly, and any mismatch in
    /// either direction is reported as such.
    fn resolve_amounts(
        &self,
        order: &Order,
        validated: &[(String, ValidatedSelection)],
    ) -> Result<Vec<Money>, CheckoutError> {
        let total = order.total_incl_tax;
        let mut fixed_total = Money::zero(order.currency);
        let mut balance_count = 0usize;

        for (_, selection) in validated {
            match selection.amount {
                PaymentAmount::Balance => balance_count += 1,
                PaymentAmount::Fixed(amount) => {
                    fixed_total = fixed_total.checked_add(&amount)?;
                }
            }
        }

        if balance_count > 1 {
            return Err(CheckoutError::MultiplePayBalance);
        }

        let remainder = total.checked_sub(&fixed_total)?;
        if balance_count == 0 {
            if !remainder.is_zero() {
                return Err(CheckoutError::AmountMismatch {
                    submitted: fixed_total.amount(),
                    total: total.amount(),
                });
            }
        } else if remainder.is_negative() {
            return Err(CheckoutError::Overpayment {
                submitted: fixed_total.amount(),
                total: total.amount(),
            });
        }

        Ok(validated
            .iter()
            .map(|(_, selection)| match selection.amount {
                PaymentAmount::Balance => remainder,
                PaymentAmount::Fixed(amount) => amount,
            })
            .collect())
    }
}

/// Order status implied by a payment-state map
///
/// Any declined method declines the order; any method still pending keeps
/// it pending; otherwise everything is settled or deferred and the order
/// may proceed to fulfillment.
fn decide_status(states: &BTreeMap<String, RecordedPayment>) -> OrderStatus {
    if states.values().any(|r| r.state.is_declined()) {
        OrderStatus::PaymentDeclined
    } else if states
        .values()
        .any(|r| matches!(r.state, PaymentState::Pending { .. }))
    {
        OrderStatus::Pending
    } else {
        OrderStatus::Authorized
    }
}
