//! Payment method strategies
//!
//! Each method is a stateless strategy identified by a `code`. The trait
//! provides `record_payment` (amount check + dispatch) and
//! `void_existing_payment`; concrete methods implement `apply_payment`
//! with their own allocate/debit behavior. All ledger mutations go through
//! the repository's atomic `commit`.
//!
//! Amounts are always applied as deltas against the source's current
//! totals, so recording the same target amount twice changes nothing the
//! second time.

use async_trait::async_trait;

use core_kernel::Money;
use domain_payment::{
    Order, OrderStatus, PaymentEvent, PaymentEventType, PaymentSource, PaymentSourceRepository,
    PaymentState,
};

use crate::error::CheckoutError;

/// Capability shared by every checkout payment method
#[async_trait]
pub trait PaymentMethod: Send + Sync {
    /// Display name, used as the source-type name on the ledger
    fn name(&self) -> &'static str;

    /// Stable code clients select the method by
    fn code(&self) -> &'static str;

    /// Records a payment of exactly `amount` against the order
    ///
    /// Implementations receive a validated, non-negative amount and must
    /// produce the method's outcome state from the resulting ledger totals.
    async fn apply_payment(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        method_key: &str,
        amount: Money,
        reference: &str,
    ) -> Result<PaymentState, CheckoutError>;

    /// Validates the amount and dispatches to `apply_payment`
    ///
    /// `None` means the caller never specified an amount, which is an
    /// error; an explicit zero is allowed (zero-amount authorization).
    async fn record_payment(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        method_key: &str,
        amount: Option<Money>,
        reference: &str,
    ) -> Result<PaymentState, CheckoutError> {
        let amount = match amount {
            Some(amount) if !amount.is_negative() => amount,
            _ => return Err(CheckoutError::AmountNotSpecified),
        };
        tracing::debug!(
            order = %order.number,
            method_key,
            method = self.code(),
            amount = %amount,
            "recording payment"
        );
        self.apply_payment(sources, order, method_key, amount, reference)
            .await
    }

    /// Releases the allocation behind a previously recorded state
    ///
    /// A state whose source no longer exists is voided as a no-op: the
    /// void racing a cleanup is expected, so it is logged and swallowed.
    async fn void_existing_payment(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        method_key: &str,
        state_to_void: &PaymentState,
    ) -> Result<(), CheckoutError> {
        let Some(mut source) = sources.find_source(state_to_void.source_id()).await? else {
            tracing::warn!(
                order = %order.number,
                method_key,
                "attempted to void payment source, but no source was found"
            );
            return Ok(());
        };

        source.void(state_to_void.amount())?;
        sources.commit(source, vec![]).await?;
        tracing::info!(
            order = %order.number,
            method_key,
            amount = %state_to_void.amount(),
            "voided amount from payment source"
        );
        Ok(())
    }

    /// Fetches or creates this method's ledger source for the order
    async fn get_source(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        reference: &str,
    ) -> Result<PaymentSource, CheckoutError> {
        Ok(sources.get_or_create(order, self.name(), reference).await?)
    }

    /// Out-of-band settlement success (processor callback)
    ///
    /// Only processor-backed methods settle out of band; the default is an
    /// error so misrouted callbacks surface loudly.
    async fn order_payment_successful(
        &self,
        _sources: &dyn PaymentSourceRepository,
        _order: &mut Order,
        _reference: &str,
    ) -> Result<PaymentState, CheckoutError> {
        Err(CheckoutError::UnsupportedSettlement(self.code().to_string()))
    }

    /// Out-of-band settlement failure (processor callback)
    async fn order_payment_failed(&self, _order: &mut Order) -> Result<(), CheckoutError> {
        Err(CheckoutError::UnsupportedSettlement(self.code().to_string()))
    }

    /// Out-of-band refund (processor callback)
    async fn order_refund(
        &self,
        _sources: &dyn PaymentSourceRepository,
        _order: &Order,
        _reference: &str,
    ) -> Result<(), CheckoutError> {
        Err(CheckoutError::UnsupportedSettlement(self.code().to_string()))
    }
}

/// Cash collected directly by an employee
///
/// Does nothing beyond recording the transaction: the full amount is
/// allocated and immediately debited, and the order is settled on the
/// spot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cash;

#[async_trait]
impl PaymentMethod for Cash {
    fn name(&self) -> &'static str {
        "Cash"
    }

    fn code(&self) -> &'static str {
        "cash"
    }

    async fn apply_payment(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        _method_key: &str,
        amount: Money,
        reference: &str,
    ) -> Result<PaymentState, CheckoutError> {
        let mut source = self.get_source(sources, order, reference).await?;

        let to_allocate = amount.checked_sub(&source.amount_allocated)?;
        let to_debit = amount.checked_sub(&source.amount_debited)?;

        // A target below what was previously debited (a resubmission after
        // the old payment was voided) must shrink the debit first, or the
        // smaller allocation could not cover it.
        if to_debit.is_negative() {
            source.debit(to_debit)?;
        }
        source.allocate(to_allocate)?;

        let mut events = Vec::new();
        if to_debit.is_positive() {
            source.debit(to_debit)?;
            events.push(PaymentEvent::for_order_lines(
                order,
                source.id,
                PaymentEventType::Debit,
                to_debit,
                reference,
            ));
        }

        let state = PaymentState::Complete {
            amount: source.amount_debited,
            source_id: source.id,
        };
        sources.commit(source, events).await?;
        Ok(state)
    }
}

/// Customer failover when the normal processor is down
///
/// Differentiates two kinds of not-really-authorized orders: `Cash` is for
/// employees collecting payment by other means, `PayLater` lets a customer
/// place the order now and complete authorization later. Nothing is
/// allocated.
#[derive(Debug, Default, Clone, Copy)]
pub struct PayLater;

#[async_trait]
impl PaymentMethod for PayLater {
    fn name(&self) -> &'static str {
        "Pay Later"
    }

    fn code(&self) -> &'static str {
        "pay-later"
    }

    async fn apply_payment(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        _method_key: &str,
        _amount: Money,
        reference: &str,
    ) -> Result<PaymentState, CheckoutError> {
        let source = self.get_source(sources, order, reference).await?;
        Ok(PaymentState::Deferred {
            amount: Money::zero(order.currency),
            source_id: source.id,
        })
    }
}

/// Stripe-backed card payment
///
/// `apply_payment` only reserves funds; the capture happens when the
/// processor's webhook delivers the settlement callbacks below.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stripe;

#[async_trait]
impl PaymentMethod for Stripe {
    fn name(&self) -> &'static str {
        "Stripe"
    }

    fn code(&self) -> &'static str {
        "stripe"
    }

    async fn apply_payment(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        _method_key: &str,
        amount: Money,
        reference: &str,
    ) -> Result<PaymentState, CheckoutError> {
        let mut source = self.get_source(sources, order, reference).await?;

        let to_allocate = amount.checked_sub(&source.amount_allocated)?;
        source.allocate(to_allocate)?;

        let state = PaymentState::Pending {
            amount: source.amount_allocated,
            source_id: source.id,
        };
        sources.commit(source, vec![]).await?;
        Ok(state)
    }

    /// Captures the full order total and authorizes the order
    ///
    /// Delivered at least once; the delta computation makes redelivery a
    /// no-op. Any allocation shortfall is topped up before the debit so
    /// captures never outrun reservations on the ledger.
    async fn order_payment_successful(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &mut Order,
        reference: &str,
    ) -> Result<PaymentState, CheckoutError> {
        let mut source = self.get_source(sources, order, reference).await?;
        let total = order.total_incl_tax;

        let to_allocate = total.checked_sub(&source.amount_allocated)?;
        if to_allocate.is_positive() {
            source.allocate(to_allocate)?;
        }

        let to_debit = total.checked_sub(&source.amount_debited)?;
        let mut events = Vec::new();
        if to_debit.is_positive() {
            source.debit(to_debit)?;
            events.push(PaymentEvent::for_order_lines(
                order,
                source.id,
                PaymentEventType::Debit,
                to_debit,
                reference,
            ));
        }

        let state = PaymentState::Complete {
            amount: source.amount_debited,
            source_id: source.id,
        };
        sources.commit(source, events).await?;
        order.set_status(OrderStatus::Authorized);
        tracing::info!(order = %order.number, reference, "payment settled, order authorized");
        Ok(state)
    }

    async fn order_payment_failed(&self, order: &mut Order) -> Result<(), CheckoutError> {
        order.set_status(OrderStatus::PaymentDeclined);
        tracing::info!(order = %order.number, "payment declined by processor");
        Ok(())
    }

    /// Refunds the full order total
    async fn order_refund(
        &self,
        sources: &dyn PaymentSourceRepository,
        order: &Order,
        reference: &str,
    ) -> Result<(), CheckoutError> {
        let mut source = self.get_source(sources, order, reference).await?;

        let to_refund = order.total_incl_tax.checked_sub(&source.amount_refunded)?;
        let mut events = Vec::new();
        if to_refund.is_positive() {
            source.refund(to_refund)?;
            events.push(PaymentEvent::for_order_lines(
                order,
                source.id,
                PaymentEventType::Refund,
                to_refund,
                reference,
            ));
        }

        sources.commit(source, events).await?;
        tracing::info!(order = %order.number, reference, "payment refunded");
        Ok(())
    }
}
